//! `wire` run report.

use std::path::PathBuf;

use super::output::{Output, Report};

#[derive(Debug)]
pub struct WireRun {
    pub dir: PathBuf,
    pub success: bool,
    /// Combined stdout and stderr of `wire`.
    pub output: String,
}

#[derive(Debug, Default)]
pub struct WireReport {
    pub runs: Vec<WireRun>,
}

impl Report for WireReport {
    fn render(&self, out: &mut dyn Output) {
        for run in &self.runs {
            out.success(&format!("wire.go path: {}", run.dir.display()));
            if run.success {
                if !run.output.is_empty() {
                    out.preformatted(&run.output);
                }
            } else {
                out.error(&format!("wire fail: {}", run.output));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reports::testing::Captured;

    #[test]
    fn test_render_runs() {
        let report = WireReport {
            runs: vec![
                WireRun {
                    dir: PathBuf::from("cmd/server/wire"),
                    success: true,
                    output: "wire: wrote wire_gen.go".into(),
                },
                WireRun {
                    dir: PathBuf::from("cmd/task/wire"),
                    success: false,
                    output: "inject: no provider found".into(),
                },
            ],
        };

        let mut out = Captured::default();
        report.render(&mut out);

        assert_eq!(out.lines_with("error: "), ["wire fail: inject: no provider found"]);
        assert_eq!(out.lines_with("ok: ").len(), 2);
        assert!(out.0.iter().any(|line| line == "wire: wrote wire_gen.go"));
    }
}
