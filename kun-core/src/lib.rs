//! Core utilities for kun.
//!
//! - [`file`] - write rules for generated files (always overwrite vs create once)
//! - [`case`] - identifier case helpers
//! - [`naming`] - table/column to Go identifier conversion
//! - [`project`] - Go module discovery
//! - [`config`] - the `kun.toml` configuration file

pub mod case;
pub mod config;
mod error;
pub mod file;
pub mod naming;
pub mod project;

pub use config::{FormatConfig, KunToml, RepoConfig, TemplatesConfig};
pub use error::{Error, Result, SourceContext};
pub use file::{FileRules, GeneratedFile, Overwrite, WriteError, WriteResult};
pub use naming::{GormNaming, IdCasing, NamingStrategy};
