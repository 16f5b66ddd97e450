//! Identifier case helpers.

/// Upper-case the first character ("user" -> "User").
pub fn upper_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        None => String::new(),
        Some(c) => c.to_uppercase().chain(chars).collect(),
    }
}

/// Lower-case the first character ("UserRole" -> "userRole").
pub fn lower_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        None => String::new(),
        Some(c) => c.to_lowercase().chain(chars).collect(),
    }
}

/// Whether `s` matches `^\w+$` in the ASCII sense Go's regexp uses.
pub fn is_word(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Whether `s` can name a Go package.
pub fn is_go_package(s: &str) -> bool {
    is_word(s) && !s.starts_with(|c: char| c.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_char_helpers() {
        assert_eq!(upper_first("user"), "User");
        assert_eq!(lower_first("UserRole"), "userRole");
        assert_eq!(lower_first(""), "");
    }

    #[test]
    fn test_is_word() {
        assert!(is_word("User_1"));
        assert!(!is_word("User-1"));
        assert!(!is_word(""));
        assert!(is_go_package("db"));
        assert!(!is_go_package("1db"));
    }
}
