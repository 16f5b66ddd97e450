//! Marker-based patching of dependency-injection provider files.
//!
//! A DI file lists constructors, closed by a sentinel comment:
//!
//! ```go
//! var ProviderSet = wire.NewSet(
//!     db.NewUserDb,
//!     // ==== Add Repo before this line, don't edit this line.====
//! )
//! ```
//!
//! New entries are inserted right above the sentinel. Applying the same
//! insertion twice leaves the file unchanged.

use std::{
    fmt, fs,
    path::{Path, PathBuf},
};

use miette::Diagnostic;
use thiserror::Error;
use tracing::{debug, info};

pub const REPO_MARKER: &str = "// ==== Add Repo before this line, don't edit this line.====";
pub const CONTROLLER_MARKER: &str =
    "// ==== Add Controller before this line, don't edit this line.====";
pub const SERVICE_MARKER: &str = "// ==== Add Service before this line, don't edit this line.====";
pub const CACHE_MARKER: &str = "// ==== Add Cache before this line, don't edit this line.====";

const INDENT: &str = "    ";

#[derive(Debug, Error, Diagnostic)]
pub enum WireError {
    #[error("failed to read DI directory '{}'", path.display())]
    #[diagnostic(code(kun::wire::read_dir))]
    ReadDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("no DI file found in '{}'", dir.display())]
    #[diagnostic(
        code(kun::wire::no_di_file),
        help("the directory above the generated package should hold the provider set file")
    )]
    NoDiFile { dir: PathBuf },

    #[error("marker appears on lines {} of '{}'", join_lines(lines), path.display())]
    #[diagnostic(
        code(kun::wire::ambiguous_marker),
        help("keep exactly one `{marker}` line in the file")
    )]
    AmbiguousMarker {
        path: PathBuf,
        marker: String,
        lines: Vec<usize>,
    },

    #[error("failed to read '{}'", path.display())]
    #[diagnostic(code(kun::wire::read))]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write '{}'", path.display())]
    #[diagnostic(code(kun::wire::write))]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

fn join_lines(lines: &[usize]) -> String {
    lines
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Text to insert above a marker line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Insertion {
    pub marker: String,
    pub text: String,
}

impl Insertion {
    pub fn new(marker: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            marker: marker.into(),
            text: text.into(),
        }
    }

    /// `    <package>.New<Struct>Db,` above the repository marker.
    pub fn repository(package: &str, struct_name: &str) -> Self {
        Self::new(REPO_MARKER, format!("{INDENT}{package}.New{struct_name}Db,"))
    }

    /// `    <constructor>,` above `marker`.
    pub fn provider(marker: &str, constructor: &str) -> Self {
        Self::new(marker, format!("{INDENT}{constructor},"))
    }
}

/// What happened to one insertion in one file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Patch {
    Inserted { line: usize },
    AlreadyPresent,
    NoMarker,
}

impl fmt::Display for Patch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Patch::Inserted { line } => write!(f, "inserted at line {line}"),
            Patch::AlreadyPresent => f.write_str("already present"),
            Patch::NoMarker => f.write_str("no marker"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchOutcome {
    pub path: PathBuf,
    pub text: String,
    pub patch: Patch,
}

/// Apply `insertion` to `content` in memory.
///
/// Lines are compared trimmed. The text counts as already applied when any of
/// its non-blank lines occurs anywhere in `content`.
pub fn patch_content(
    path: &Path,
    content: &str,
    insertion: &Insertion,
) -> Result<(String, Patch), WireError> {
    let present = insertion
        .text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .any(|line| content.contains(line));
    if present {
        return Ok((content.to_string(), Patch::AlreadyPresent));
    }

    let marker = insertion.marker.trim();
    let lines: Vec<&str> = content.split('\n').collect();
    let positions: Vec<usize> = lines
        .iter()
        .enumerate()
        .filter(|(_, line)| line.trim() == marker)
        .map(|(i, _)| i)
        .collect();

    match positions.as_slice() {
        [] => Ok((content.to_string(), Patch::NoMarker)),
        [at] => {
            // the new line takes the marker line's terminator
            let text = if lines[*at].ends_with('\r') {
                format!("{}\r", insertion.text)
            } else {
                insertion.text.clone()
            };
            let mut patched: Vec<&str> = Vec::with_capacity(lines.len() + 1);
            patched.extend_from_slice(&lines[..*at]);
            patched.push(&text);
            patched.extend_from_slice(&lines[*at..]);
            Ok((patched.join("\n"), Patch::Inserted { line: at + 1 }))
        }
        many => Err(WireError::AmbiguousMarker {
            path: path.to_path_buf(),
            marker: marker.to_string(),
            lines: many.iter().map(|i| i + 1).collect(),
        }),
    }
}

/// Every regular file next to `target`, in name order.
fn candidates(target: &Path) -> Result<Vec<PathBuf>, WireError> {
    let dir = match target.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let read_dir = |source| WireError::ReadDir {
        path: dir.to_path_buf(),
        source,
    };

    let mut files = Vec::new();
    for entry in fs::read_dir(dir).map_err(read_dir)? {
        let entry = entry.map_err(read_dir)?;
        if entry.file_type().map_err(read_dir)?.is_file() {
            files.push(entry.path());
        }
    }
    if files.is_empty() {
        return Err(WireError::NoDiFile {
            dir: dir.to_path_buf(),
        });
    }
    files.sort();
    Ok(files)
}

/// Patch every file in the directory holding `target`.
///
/// All insertions are applied to a file in memory and the file is rewritten
/// once, only if something was inserted. An ambiguous marker aborts before
/// anything is written to that file.
pub fn patch_di(target: &Path, insertions: &[Insertion]) -> Result<Vec<PatchOutcome>, WireError> {
    let mut outcomes = Vec::new();

    for path in candidates(target)? {
        let original = fs::read_to_string(&path).map_err(|source| WireError::Read {
            path: path.clone(),
            source,
        })?;

        let mut content = original.clone();
        for insertion in insertions {
            let (patched, patch) = patch_content(&path, &content, insertion)?;
            debug!(file = %path.display(), text = insertion.text.trim(), %patch);
            content = patched;
            outcomes.push(PatchOutcome {
                path: path.clone(),
                text: insertion.text.clone(),
                patch,
            });
        }

        if content != original {
            fs::write(&path, &content).map_err(|source| WireError::Write {
                path: path.clone(),
                source,
            })?;
            info!(file = %path.display(), "updated DI file");
        }
    }

    Ok(outcomes)
}

/// Insertions that found no marker line in any candidate file.
pub fn unplaced<'a>(insertions: &'a [Insertion], outcomes: &[PatchOutcome]) -> Vec<&'a Insertion> {
    insertions
        .iter()
        .filter(|insertion| {
            outcomes
                .iter()
                .filter(|outcome| outcome.text == insertion.text)
                .all(|outcome| outcome.patch == Patch::NoMarker)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    const DI_FILE: &str = "package repository

var ProviderSet = wire.NewSet(
    NewData,
    // ==== Add Repo before this line, don't edit this line.====
)
";

    fn setup() -> (TempDir, PathBuf) {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("repository.go"), DI_FILE).unwrap();
        let target = temp.path().join("db");
        fs::create_dir(&target).unwrap();
        (temp, target)
    }

    #[test]
    fn test_inserts_before_marker() {
        let (temp, target) = setup();

        let outcomes = patch_di(&target, &[Insertion::repository("db", "User")]).unwrap();

        assert_eq!(outcomes.len(), 1);
        assert_eq!(outcomes[0].patch, Patch::Inserted { line: 5 });
        let content = fs::read_to_string(temp.path().join("repository.go")).unwrap();
        assert!(content.contains(
            "    NewData,\n    db.NewUserDb,\n    // ==== Add Repo before this line"
        ));
        assert!(content.ends_with(")\n"));
    }

    #[test]
    fn test_second_application_is_a_noop() {
        let (temp, target) = setup();
        let insertion = Insertion::repository("db", "User");

        patch_di(&target, &[insertion.clone()]).unwrap();
        let once = fs::read_to_string(temp.path().join("repository.go")).unwrap();
        let outcomes = patch_di(&target, &[insertion]).unwrap();
        let twice = fs::read_to_string(temp.path().join("repository.go")).unwrap();

        assert_eq!(once, twice);
        assert_eq!(outcomes[0].patch, Patch::AlreadyPresent);
    }

    #[test]
    fn test_batched_insertions_keep_order() {
        let (temp, target) = setup();

        patch_di(
            &target,
            &[
                Insertion::repository("db", "User"),
                Insertion::repository("db", "Order"),
            ],
        )
        .unwrap();

        let content = fs::read_to_string(temp.path().join("repository.go")).unwrap();
        let user = content.find("db.NewUserDb,").unwrap();
        let order = content.find("db.NewOrderDb,").unwrap();
        let marker = content.find(REPO_MARKER).unwrap();
        assert!(user < order && order < marker);
    }

    #[test]
    fn test_missing_marker_leaves_file_untouched() {
        let content = "package repository\n";
        let (patched, patch) =
            patch_content(Path::new("x.go"), content, &Insertion::repository("db", "User"))
                .unwrap();

        assert_eq!(patch, Patch::NoMarker);
        assert_eq!(patched, content);
    }

    #[test]
    fn test_marker_must_be_the_whole_line() {
        let content = format!("x := 1 {REPO_MARKER}\n");
        let (_, patch) =
            patch_content(Path::new("x.go"), &content, &Insertion::repository("db", "User"))
                .unwrap();
        assert_eq!(patch, Patch::NoMarker);
    }

    #[test]
    fn test_unplaced_insertions() {
        let (temp, target) = setup();
        fs::write(temp.path().join("other.go"), "package repository\n").unwrap();
        let insertions = [
            Insertion::repository("db", "User"),
            Insertion::provider(CACHE_MARKER, "NewUserCache"),
        ];

        let outcomes = patch_di(&target, &insertions).unwrap();
        let missing = unplaced(&insertions, &outcomes);

        assert_eq!(missing, [&insertions[1]]);
    }

    #[test]
    fn test_multiple_markers_are_rejected() {
        let (temp, target) = setup();
        let path = temp.path().join("repository.go");
        fs::write(&path, format!("{DI_FILE}\t{REPO_MARKER}\n")).unwrap();

        let err = patch_di(&target, &[Insertion::repository("db", "User")]).unwrap_err();

        match err {
            WireError::AmbiguousMarker { lines, .. } => assert_eq!(lines, [5, 7]),
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(!fs::read_to_string(&path).unwrap().contains("NewUserDb"));
    }

    #[test]
    fn test_crlf_lines_keep_terminators() {
        let content = format!("a\r\n    {REPO_MARKER}\r\n)\r\n");
        let (patched, _) =
            patch_content(Path::new("x.go"), &content, &Insertion::repository("db", "User"))
                .unwrap();
        assert_eq!(patched, format!("a\r\n    db.NewUserDb,\r\n    {REPO_MARKER}\r\n)\r\n"));
        assert!(!patched.replace("\r\n", "").contains('\n'));
    }

    #[test]
    fn test_no_files_is_an_error() {
        let temp = TempDir::new().unwrap();
        let target = temp.path().join("db");
        fs::create_dir(&target).unwrap();

        assert!(matches!(
            patch_di(&target, &[Insertion::repository("db", "User")]),
            Err(WireError::NoDiFile { .. })
        ));
    }

    #[test]
    fn test_unreadable_directory_is_an_error() {
        let temp = TempDir::new().unwrap();
        let target = temp.path().join("missing").join("db");

        assert!(matches!(
            patch_di(&target, &[]),
            Err(WireError::ReadDir { .. })
        ));
    }
}
