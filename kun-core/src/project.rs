//! Go module discovery.

use std::{io, path::Path};

/// Module path declared by `<dir>/go.mod`, or `None` when there is no go.mod.
pub fn go_module(dir: &Path) -> io::Result<Option<String>> {
    let content = match std::fs::read_to_string(dir.join("go.mod")) {
        Ok(content) => content,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e),
    };
    Ok(parse_module(&content))
}

fn parse_module(content: &str) -> Option<String> {
    content.lines().find_map(|line| {
        let rest = line.trim().strip_prefix("module")?;
        if !rest.starts_with(char::is_whitespace) {
            return None;
        }
        let module = rest.split("//").next()?.trim().trim_matches('"');
        (!module.is_empty()).then(|| module.to_string())
    })
}
