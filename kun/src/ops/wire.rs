//! Locating wire.go files and running `wire`.

use std::{
    io,
    path::{Path, PathBuf},
    process::Command,
};

use tracing::debug;

use crate::reports::WireRun;

const SKIPPED_DIRS: &[&str] = &[".git", ".idea", "tmp", "vendor", "node_modules"];

/// Directories below `base` holding a `wire.go`, sorted.
pub fn find_wire_dirs(base: &Path) -> io::Result<Vec<PathBuf>> {
    let mut dirs = Vec::new();
    collect_wire_dirs(base, &mut dirs)?;
    dirs.sort();
    Ok(dirs)
}

fn collect_wire_dirs(dir: &Path, dirs: &mut Vec<PathBuf>) -> io::Result<()> {
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        let file_type = entry.file_type()?;

        if file_type.is_dir() {
            let name = entry.file_name();
            if !SKIPPED_DIRS.iter().any(|skip| name == *skip) {
                collect_wire_dirs(&path, dirs)?;
            }
        } else if entry.file_name() == "wire.go" {
            debug!(dir = %dir.display(), "found wire.go");
            dirs.push(dir.to_path_buf());
        }
    }
    Ok(())
}

/// Run `wire` in `dir`; a failing run is reported, not returned as an error.
pub fn run_wire(dir: &Path) -> io::Result<WireRun> {
    let output = Command::new("wire").current_dir(dir).output()?;
    let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
    text.push_str(&String::from_utf8_lossy(&output.stderr));

    Ok(WireRun {
        dir: dir.to_path_buf(),
        success: output.status.success(),
        output: text.trim().to_string(),
    })
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_find_wire_dirs() {
        let temp = TempDir::new().unwrap();
        for dir in ["cmd/server/wire", "cmd/task/wire", "vendor/x/wire", ".git/wire"] {
            let dir = temp.path().join(dir);
            fs::create_dir_all(&dir).unwrap();
            fs::write(dir.join("wire.go"), "package wire\n").unwrap();
        }
        fs::write(temp.path().join("cmd/server/main.go"), "package main\n").unwrap();

        let dirs = find_wire_dirs(temp.path()).unwrap();

        assert_eq!(
            dirs,
            [
                temp.path().join("cmd/server/wire"),
                temp.path().join("cmd/task/wire")
            ]
        );
    }

    #[test]
    fn test_find_wire_dirs_empty() {
        let temp = TempDir::new().unwrap();
        assert!(find_wire_dirs(temp.path()).unwrap().is_empty());
    }
}
