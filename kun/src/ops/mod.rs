//! Core operations.
//!
//! Business logic for kun commands, separated from argument parsing and
//! output rendering.

pub mod repo;
pub mod scaffold;
pub mod wire;

use std::path::Path;

use kun_codegen::{CommandFormatter, Formatter, Passthrough};
use kun_core::project::go_module;

pub use repo::{RepoOptions, generate_repositories};
pub use scaffold::{ScaffoldOptions, scaffold};
pub use wire::{find_wire_dirs, run_wire};

/// Formatter for `program`, and a warning when it had to fall back to
/// writing unformatted source.
pub fn formatter(program: &str) -> (Box<dyn Formatter>, Option<String>) {
    if program == "none" {
        return (Box::new(Passthrough), None);
    }
    let command = CommandFormatter::new(program);
    if command.is_available() {
        (Box::new(command), None)
    } else {
        (
            Box::new(Passthrough),
            Some(format!("{program} not found, generated files are left unformatted")),
        )
    }
}

/// Go module path of the project in `dir`, and a warning when unknown.
pub fn project_name(dir: &Path) -> (String, Option<String>) {
    match go_module(dir) {
        Ok(Some(module)) => (module, None),
        Ok(None) => (String::new(), Some("go.mod does not exist".to_string())),
        Err(e) => (String::new(), Some(format!("read go.mod error: {e}"))),
    }
}
