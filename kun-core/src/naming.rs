//! Schema name to Go identifier conversion.
//!
//! [`GormNaming`] follows the conventions GORM applies when it maps a table to
//! a model: optional table prefix, singular model names, title-cased words and
//! upper-cased common initialisms.

use std::{str::FromStr, sync::LazyLock};

use regex::Regex;
use serde::Deserialize;

use crate::case::upper_first;

/// Converts schema names (tables, columns) into Go identifiers.
pub trait NamingStrategy: Send + Sync {
    /// Model name for a table, e.g. `user_roles` -> `UserRole`.
    fn struct_name(&self, table: &str) -> String;

    /// Field name for a column, e.g. `user_ids` -> `UserID`.
    fn field_name(&self, column: &str) -> String;
}

const COMMON_INITIALISMS: &[&str] = &[
    "API", "ASCII", "CPU", "CSS", "DNS", "EOF", "GUID", "HTML", "HTTP", "HTTPS", "ID", "IP",
    "JSON", "LHS", "QPS", "RAM", "RHS", "RPC", "SLA", "SMTP", "SSH", "TLS", "TTL", "UID", "UI",
    "UUID", "URI", "URL", "UTF8", "VM", "XML", "XSRF", "XSS",
];

static INITIALISM_PATTERNS: LazyLock<Vec<(Regex, String)>> = LazyLock::new(|| {
    COMMON_INITIALISMS
        .iter()
        .filter_map(|initialism| {
            let titled = upper_first(&initialism.to_lowercase());
            let pattern = Regex::new(&format!("{titled}([A-Z]|$|_)")).ok()?;
            Some((pattern, format!("{initialism}${{1}}")))
        })
        .collect()
});

const UNCOUNTABLE: &[&str] = &[
    "data",
    "equipment",
    "fish",
    "information",
    "metadata",
    "money",
    "news",
    "rice",
    "series",
    "sheep",
    "species",
];

const IRREGULAR: &[(&str, &str)] = &[
    ("children", "child"),
    ("feet", "foot"),
    ("geese", "goose"),
    ("men", "man"),
    ("mice", "mouse"),
    ("people", "person"),
    ("teeth", "tooth"),
    ("women", "woman"),
];

/// Singular form of the last word of `name` (`user_roles` -> `user_role`).
pub fn singularize(name: &str) -> String {
    let split = name.rfind('_').map_or(0, |i| i + 1);
    let (head, word) = name.split_at(split);
    let lower = word.to_lowercase();

    if lower.is_empty() || UNCOUNTABLE.contains(&lower.as_str()) {
        return name.to_string();
    }
    if let Some((_, singular)) = IRREGULAR.iter().find(|(plural, _)| *plural == lower) {
        return format!("{head}{singular}");
    }

    let strip = |suffix: &str, keep: &str| {
        format!("{head}{}{keep}", &word[..word.len() - suffix.len()])
    };
    if lower.len() > 3 && lower.ends_with("ies") {
        return strip("ies", "y");
    }
    for suffix in ["sses", "shes", "ches", "xes", "uses"] {
        if lower.ends_with(suffix) {
            return strip("es", "");
        }
    }
    if ["ss", "us", "is"].iter().any(|s| lower.ends_with(s)) {
        return name.to_string();
    }
    if lower.ends_with('s') {
        return strip("s", "");
    }
    name.to_string()
}

/// Title-case `_`/space separated words and upper-case common initialisms.
fn to_schema_name(name: &str) -> String {
    let mut result: String = name.split(['_', ' ']).map(upper_first).collect();
    for (pattern, replacement) in INITIALISM_PATTERNS.iter() {
        result = pattern.replace_all(&result, replacement.as_str()).into_owned();
    }
    result
}

/// GORM-compatible naming.
#[derive(Debug, Clone, Default)]
pub struct GormNaming {
    /// Stripped from table names before conversion.
    pub table_prefix: String,
    /// Table names are already singular; skip singularization.
    pub singular_table: bool,
}

impl GormNaming {
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            table_prefix: prefix.into(),
            ..Self::default()
        }
    }
}

impl NamingStrategy for GormNaming {
    fn struct_name(&self, table: &str) -> String {
        let table = table.strip_prefix(&self.table_prefix).unwrap_or(table);
        if self.singular_table {
            to_schema_name(table)
        } else {
            to_schema_name(&singularize(table))
        }
    }

    /// Columns go through the same path as tables, as GORM's `SchemaName` does.
    fn field_name(&self, column: &str) -> String {
        self.struct_name(column)
    }
}

/// How `ID` inside generated field names is rewritten to `Id`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdCasing {
    /// Every `ID` substring, so `UUID` becomes `UUId`.
    #[default]
    Legacy,
    /// Only an `ID` that forms its own word (`UserID`, `IDCard`, `ID`).
    Boundary,
}

impl IdCasing {
    pub fn apply(self, name: &str) -> String {
        match self {
            IdCasing::Legacy => name.replace("ID", "Id"),
            IdCasing::Boundary => {
                let chars: Vec<char> = name.chars().collect();
                let mut out = String::with_capacity(name.len());
                let mut i = 0;
                while i < chars.len() {
                    let is_id = chars[i] == 'I' && chars.get(i + 1) == Some(&'D');
                    let starts_word = i == 0 || !chars[i - 1].is_ascii_uppercase();
                    let ends_word = chars.get(i + 2).is_none_or(|c| !c.is_ascii_lowercase());
                    if is_id && starts_word && ends_word {
                        out.push_str("Id");
                        i += 2;
                    } else {
                        out.push(chars[i]);
                        i += 1;
                    }
                }
                out
            }
        }
    }
}

impl FromStr for IdCasing {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "legacy" => Ok(IdCasing::Legacy),
            "boundary" => Ok(IdCasing::Boundary),
            other => Err(format!(
                "unknown id casing '{other}', expected 'legacy' or 'boundary'"
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_singularize() {
        assert_eq!(singularize("users"), "user");
        assert_eq!(singularize("user_roles"), "user_role");
        assert_eq!(singularize("categories"), "category");
        assert_eq!(singularize("addresses"), "address");
        assert_eq!(singularize("boxes"), "box");
        assert_eq!(singularize("statuses"), "status");
        assert_eq!(singularize("status"), "status");
        assert_eq!(singularize("news"), "news");
        assert_eq!(singularize("people"), "person");
        assert_eq!(singularize("user_info"), "user_info");
    }

    #[test]
    fn test_struct_name() {
        let naming = GormNaming::default();
        assert_eq!(naming.struct_name("users"), "User");
        assert_eq!(naming.struct_name("user_roles"), "UserRole");
        assert_eq!(naming.struct_name("api_keys"), "APIKey");
    }

    #[test]
    fn test_struct_name_strips_prefix() {
        let naming = GormNaming::with_prefix("t_");
        assert_eq!(naming.struct_name("t_orders"), "Order");
        assert_eq!(naming.struct_name("orders"), "Order");
    }

    #[test]
    fn test_struct_name_singular_table() {
        let naming = GormNaming {
            singular_table: true,
            ..GormNaming::default()
        };
        assert_eq!(naming.struct_name("users"), "Users");
    }

    #[test]
    fn test_field_name_initialisms() {
        let naming = GormNaming::default();
        assert_eq!(naming.field_name("id"), "ID");
        assert_eq!(naming.field_name("user_id"), "UserID");
        assert_eq!(naming.field_name("identity"), "Identity");
        assert_eq!(naming.field_name("avatar_url"), "AvatarURL");
        assert_eq!(naming.field_name("uuid"), "UUID");
        assert_eq!(naming.field_name("status"), "Status");
    }

    #[test]
    fn test_field_name_follows_table_rules() {
        let naming = GormNaming::with_prefix("t_");
        assert_eq!(naming.field_name("tags"), "Tag");
        assert_eq!(naming.field_name("user_ids"), "UserID");
        assert_eq!(naming.field_name("t_notes"), "Note");
        assert_eq!(naming.field_name("news"), "News");

        let singular = GormNaming {
            singular_table: true,
            ..GormNaming::default()
        };
        assert_eq!(singular.field_name("tags"), "Tags");
    }

    #[test]
    fn test_id_casing_legacy_replaces_every_substring() {
        assert_eq!(IdCasing::Legacy.apply("UserID"), "UserId");
        assert_eq!(IdCasing::Legacy.apply("UUID"), "UUId");
    }

    #[test]
    fn test_id_casing_boundary_keeps_other_initialisms() {
        assert_eq!(IdCasing::Boundary.apply("ID"), "Id");
        assert_eq!(IdCasing::Boundary.apply("UserID"), "UserId");
        assert_eq!(IdCasing::Boundary.apply("IDCard"), "IdCard");
        assert_eq!(IdCasing::Boundary.apply("UUID"), "UUID");
        assert_eq!(IdCasing::Boundary.apply("GUIDs"), "GUIDs");
        assert_eq!(IdCasing::Boundary.apply("Identity"), "Identity");
    }

    #[test]
    fn test_id_casing_from_str() {
        assert_eq!("Boundary".parse::<IdCasing>().unwrap(), IdCasing::Boundary);
        assert!("word".parse::<IdCasing>().is_err());
    }
}
