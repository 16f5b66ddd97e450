use std::path::{Path, PathBuf};

use miette::Diagnostic;
use thiserror::Error;

/// Failure to put a generated file on disk.
#[derive(Debug, Error, Diagnostic)]
#[error("failed to write '{}'", path.display())]
#[diagnostic(code(kun::write))]
pub struct WriteError {
    pub path: PathBuf,
    #[source]
    pub source: std::io::Error,
}

/// A file produced by a generator.
///
/// Content is rendered lazily: an [`Overwrite::IfMissing`] file whose target
/// already exists is never rendered.
pub trait GeneratedFile {
    type Error: From<WriteError>;

    /// Target path below `base`.
    fn path(&self, base: &Path) -> PathBuf;

    fn rules(&self) -> FileRules;

    fn render(&self) -> Result<String, Self::Error>;

    fn write(&self, base: &Path) -> Result<WriteResult, Self::Error> {
        let path = self.path(base);
        let rules = self.rules();

        if rules.overwrite == Overwrite::IfMissing && path.exists() {
            return Ok(WriteResult::Skipped);
        }

        let content = rules.apply_header(self.render()?);
        write_file(&path, &content)?;
        Ok(WriteResult::Written)
    }
}

fn write_file(path: &Path, content: &str) -> Result<(), WriteError> {
    let wrap = |source| WriteError {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(wrap)?;
    }
    std::fs::write(path, content).map_err(wrap)
}

/// Result of a write operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteResult {
    Written,
    /// Target existed and the rules said to keep it.
    Skipped,
}

/// Rules that determine how a file should be written
#[derive(Debug, Clone, Default)]
pub struct FileRules {
    pub overwrite: Overwrite,
    /// Line prepended to the content, e.g. a "do not edit" banner.
    pub header: Option<&'static str>,
}

impl FileRules {
    /// Regenerated on every run, carrying `header` on top.
    pub fn generated(header: &'static str) -> Self {
        Self {
            overwrite: Overwrite::Always,
            header: Some(header),
        }
    }

    pub fn create_once() -> Self {
        Self {
            overwrite: Overwrite::IfMissing,
            header: None,
        }
    }

    fn apply_header(&self, content: String) -> String {
        match self.header {
            Some(header) if !content.starts_with(header) => format!("{header}\n{content}"),
            _ => content,
        }
    }
}

/// How to handle existing files
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Overwrite {
    /// Regenerable artifacts.
    #[default]
    Always,
    /// Customization artifacts, created once and then owned by the developer.
    IfMissing,
}
