//! Source formatting.
//!
//! Rendered Go code goes through `gofmt` (or `goimports`) before it is
//! written. A syntax error reported by the tool becomes a [`FormatError`]
//! that points at the offending line of the rendered source.

use std::{
    io::{self, Write},
    path::{Path, PathBuf},
    process::{Command, Stdio},
    sync::LazyLock,
};

use miette::{Diagnostic, NamedSource, SourceSpan};
use regex::Regex;
use thiserror::Error;
use tracing::debug;

use crate::{Error, Result};

/// Lines shown on each side of a format error.
const CONTEXT_RADIUS: usize = 5;

static DIAGNOSTIC_LINE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r":(\d+):(\d+):\s*(.*)").ok());

/// A formatter could not accept the source.
#[derive(Debug)]
pub enum FormatFailure {
    /// The source does not parse.
    Syntax {
        line: usize,
        column: usize,
        message: String,
    },
    /// The tool itself failed (missing binary, crash, unparsable output).
    Tool(String),
}

/// Canonicalizes generated source.
pub trait Formatter: Send + Sync {
    fn name(&self) -> &str;

    /// `path` is the file the source is going to be written to.
    fn format(&self, path: &Path, source: &str) -> std::result::Result<String, FormatFailure>;
}

/// Leaves source untouched.
#[derive(Debug, Default, Clone, Copy)]
pub struct Passthrough;

impl Formatter for Passthrough {
    fn name(&self) -> &str {
        "none"
    }

    fn format(&self, _path: &Path, source: &str) -> std::result::Result<String, FormatFailure> {
        Ok(source.to_string())
    }
}

/// Pipes source through an external Go formatter.
#[derive(Debug, Clone)]
pub struct CommandFormatter {
    program: String,
}

impl CommandFormatter {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn gofmt() -> Self {
        Self::new("gofmt")
    }

    /// Also adds missing and removes unused imports.
    pub fn goimports() -> Self {
        Self::new("goimports")
    }

    /// Whether the program can be started at all.
    pub fn is_available(&self) -> bool {
        Command::new(&self.program)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .is_ok()
    }

    fn command(&self, path: &Path) -> Command {
        let mut command = Command::new(&self.program);
        if self.program.ends_with("goimports") {
            if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
                command.arg("-srcdir").arg(dir);
            }
        }
        command
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        command
    }
}

impl Formatter for CommandFormatter {
    fn name(&self) -> &str {
        &self.program
    }

    fn format(&self, path: &Path, source: &str) -> std::result::Result<String, FormatFailure> {
        let tool = |e: io::Error| FormatFailure::Tool(e.to_string());
        let mut child = self.command(path).spawn().map_err(tool)?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| FormatFailure::Tool("stdin unavailable".to_string()))?;
        // write from a second thread so a full stdout pipe cannot stall us
        let (written, output) = std::thread::scope(|scope| {
            let writer = scope.spawn(move || stdin.write_all(source.as_bytes()));
            let output = child.wait_with_output();
            let written = writer
                .join()
                .unwrap_or_else(|_| Err(io::Error::other("writer panicked")));
            (written, output)
        });
        let output = output.map_err(tool)?;

        if output.status.success() {
            // a successful exit on partial input is not a formatted file
            written.map_err(tool)?;
            return String::from_utf8(output.stdout)
                .map_err(|e| FormatFailure::Tool(e.to_string()));
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        debug!(program = %self.program, %stderr, "formatter rejected source");
        Err(parse_diagnostic(&stderr)
            .unwrap_or_else(|| FormatFailure::Tool(stderr.trim().to_string())))
    }
}

/// First `<file>:LINE:COL: message` line of a Go tool's stderr.
fn parse_diagnostic(stderr: &str) -> Option<FormatFailure> {
    stderr.lines().find_map(|line| {
        let caps = DIAGNOSTIC_LINE.as_ref()?.captures(line)?;
        Some(FormatFailure::Syntax {
            line: caps[1].parse().ok()?,
            column: caps[2].parse().ok()?,
            message: caps[3].trim().to_string(),
        })
    })
}

/// Rendered source that failed to format.
#[derive(Debug, Error, Diagnostic)]
#[error("cannot format '{}': line {line}: {message}", path.display())]
#[diagnostic(code(kun::codegen::format))]
pub struct FormatError {
    pub path: PathBuf,
    pub line: usize,
    pub column: usize,
    pub message: String,
    #[source_code]
    pub src: NamedSource<String>,
    #[label("{message}")]
    pub span: Option<SourceSpan>,
    /// The offending line with its neighbours, numbered.
    #[help]
    pub excerpt: String,
}

impl FormatError {
    pub fn new(path: &Path, source: &str, line: usize, column: usize, message: String) -> Self {
        Self {
            path: path.to_path_buf(),
            line,
            column,
            span: span_of(source, line, column),
            excerpt: excerpt(source, line, CONTEXT_RADIUS),
            src: NamedSource::new(path.display().to_string(), source.to_string()),
            message,
        }
    }
}

/// Byte span of the rest of `line` starting at `column` (both 1-based).
fn span_of(source: &str, line: usize, column: usize) -> Option<SourceSpan> {
    let offset: usize = source
        .split_inclusive('\n')
        .take(line.checked_sub(1)?)
        .map(str::len)
        .sum();
    let text = source[offset..].lines().next()?;
    let start = column.saturating_sub(1).min(text.len());
    Some(SourceSpan::from((offset + start, text.len() - start)))
}

/// Lines `line - radius ..= line + radius` (1-based, clamped), numbered, with
/// the offending line marked.
pub fn excerpt(source: &str, line: usize, radius: usize) -> String {
    let lines: Vec<&str> = source.lines().collect();
    if lines.is_empty() {
        return String::new();
    }
    let target = line.clamp(1, lines.len());
    let start = target.saturating_sub(radius).max(1);
    let end = (target + radius).min(lines.len());
    let width = end.to_string().len();

    (start..=end)
        .map(|n| {
            let marker = if n == target { '>' } else { ' ' };
            format!("{marker} {n:>width$} | {}", lines[n - 1])
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Run `formatter` over `source` destined for `path`.
pub fn format_source(formatter: &dyn Formatter, path: &Path, source: &str) -> Result<String> {
    formatter.format(path, source).map_err(|failure| match failure {
        FormatFailure::Syntax {
            line,
            column,
            message,
        } => Error::Format(FormatError::new(path, source, line, column, message)),
        FormatFailure::Tool(message) => Error::Formatter {
            program: formatter.name().to_string(),
            path: path.to_path_buf(),
            message,
        },
    })
}
