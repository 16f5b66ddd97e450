//! The optional `kun.toml` project configuration.
//!
//! ```toml
//! [templates]
//! path = "tpl"
//!
//! [format]
//! program = "goimports"
//!
//! [repo]
//! out = "internal/repository/db"
//! package = "db"
//! prefix = "t_"
//! coverable = true
//! id_casing = "boundary"
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::{
    Error, Result, SourceContext,
    case::is_go_package,
    naming::IdCasing,
};

pub const DEFAULT_REPO_OUT: &str = "./internal/repository/db";
pub const DEFAULT_REPO_PACKAGE: &str = "db";
pub const DEFAULT_FORMAT_PROGRAM: &str = "gofmt";

/// Parsed `kun.toml`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct KunToml {
    #[serde(default)]
    pub templates: TemplatesConfig,
    #[serde(default)]
    pub format: FormatConfig,
    #[serde(default)]
    pub repo: RepoConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TemplatesConfig {
    /// Directory whose `<kind>.tpl` files override the built-in templates.
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FormatConfig {
    /// `gofmt`, `goimports`, or `none`.
    pub program: String,
}

impl Default for FormatConfig {
    fn default() -> Self {
        Self {
            program: DEFAULT_FORMAT_PROGRAM.to_string(),
        }
    }
}

/// Defaults for `kun create repo`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RepoConfig {
    pub out: PathBuf,
    pub package: String,
    pub prefix: String,
    pub nullable: bool,
    pub coverable: bool,
    pub signable: bool,
    pub index_tag: bool,
    pub type_tag: bool,
    pub wire: bool,
    pub id_casing: IdCasing,
}

impl Default for RepoConfig {
    fn default() -> Self {
        Self {
            out: PathBuf::from(DEFAULT_REPO_OUT),
            package: DEFAULT_REPO_PACKAGE.to_string(),
            prefix: String::new(),
            nullable: true,
            coverable: false,
            signable: false,
            index_tag: true,
            type_tag: true,
            wire: true,
            id_casing: IdCasing::default(),
        }
    }
}

impl KunToml {
    /// Load `path`, falling back to defaults when the file does not exist.
    pub fn load(path: &Path) -> Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(content) => Self::parse(&content, &path.display().to_string()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(source) => Err(Box::new(Error::Io {
                path: path.to_path_buf(),
                source,
            })),
        }
    }

    pub fn parse(content: &str, filename: &str) -> Result<Self> {
        let ctx = SourceContext::new(content, filename);
        let config: Self = toml::from_str(ctx.src()).map_err(|e| ctx.parse_error(e))?;
        config.validate(&ctx)?;
        Ok(config)
    }

    fn validate(&self, ctx: &SourceContext) -> Result<()> {
        let package = &self.repo.package;
        let is_path = package.contains(['/', '\\']);
        if package.is_empty() || (!is_path && !is_go_package(package)) {
            return Err(ctx.validation_error(
                format!("'{package}' is not a valid Go package name"),
                "package",
            ));
        }
        if !matches!(self.format.program.as_str(), "gofmt" | "goimports" | "none") {
            return Err(ctx.validation_error(
                format!(
                    "unknown formatter '{}', expected gofmt, goimports or none",
                    self.format.program
                ),
                "program",
            ));
        }
        Ok(())
    }
}
