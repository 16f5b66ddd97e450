use std::{fmt, path::PathBuf};

use kun_core::WriteError;
use miette::{Diagnostic, LabeledSpan, SourceCode};
use thiserror::Error;

use crate::{format::FormatError, wiring::WireError};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    #[error("invalid struct name '{name}' for table '{table}'")]
    #[diagnostic(
        code(kun::codegen::invalid_name),
        help("struct names may only contain letters, digits and '_' and must start with an upper-case letter")
    )]
    InvalidStructName { table: String, name: String },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Schema(#[from] kun_schema::Error),

    #[error("failed to render template '{name}'")]
    #[diagnostic(code(kun::codegen::template))]
    Template {
        name: String,
        #[source]
        source: minijinja::Error,
    },

    #[error("failed to read template '{}'", path.display())]
    #[diagnostic(code(kun::codegen::template_read))]
    TemplateRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot render '{struct_name}': {reason}")]
    #[diagnostic(code(kun::codegen::context))]
    InvalidContext { struct_name: String, reason: String },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Format(#[from] FormatError),

    #[error("'{program}' could not format '{}': {message}", path.display())]
    #[diagnostic(
        code(kun::codegen::formatter),
        help("install the Go toolchain or set `program = \"none\"` under [format] in kun.toml")
    )]
    Formatter {
        program: String,
        path: PathBuf,
        message: String,
    },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Write(#[from] WriteError),

    #[error("failed to create output directory '{}'", path.display())]
    #[diagnostic(code(kun::codegen::create_dir))]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot resolve repository package path '{}'", path.display())]
    #[diagnostic(code(kun::codegen::output_path))]
    OutputPath {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Emit(#[from] EmitError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Wire(#[from] WireError),

    #[error("cancelled after an earlier failure")]
    #[diagnostic(code(kun::codegen::cancelled))]
    Cancelled,
}

/// Failure of a concurrent emission.
///
/// Reports as the first failure; failures observed afterwards by sibling
/// workers are attached as related diagnostics.
#[derive(Debug)]
pub struct EmitError {
    pub first: Box<Error>,
    pub others: Vec<Error>,
}

impl EmitError {
    /// Build from errors in arrival order; `None` when there are none.
    pub fn from_errors(errors: Vec<Error>) -> Option<Self> {
        let mut errors = errors.into_iter();
        let first = errors.next()?;
        Some(Self {
            first: Box::new(first),
            others: errors.filter(|e| !matches!(e, Error::Cancelled)).collect(),
        })
    }
}

impl fmt::Display for EmitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.first)?;
        if !self.others.is_empty() {
            write!(f, " (and {} more)", self.others.len())?;
        }
        Ok(())
    }
}

impl std::error::Error for EmitError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        std::error::Error::source(&*self.first)
    }
}

impl Diagnostic for EmitError {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        self.first.code()
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        self.first.help()
    }

    fn source_code(&self) -> Option<&dyn SourceCode> {
        self.first.source_code()
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        self.first.labels()
    }

    fn related<'a>(&'a self) -> Option<Box<dyn Iterator<Item = &'a dyn Diagnostic> + 'a>> {
        if self.others.is_empty() {
            return None;
        }
        Some(Box::new(self.others.iter().map(|e| e as &dyn Diagnostic)))
    }
}
