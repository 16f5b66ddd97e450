//! Scaffolding report.

use kun_codegen::{Patch, ScaffoldAction, ScaffoldOutcome};

use super::output::{Output, Report};

#[derive(Debug)]
pub struct ScaffoldReport {
    pub warnings: Vec<String>,
    pub outcomes: Vec<ScaffoldOutcome>,
}

impl Report for ScaffoldReport {
    fn render(&self, out: &mut dyn Output) {
        for warning in &self.warnings {
            out.warning(warning);
        }
        for outcome in &self.outcomes {
            let path = outcome.path.display();
            match outcome.action {
                ScaffoldAction::Created => out.success(&format!("Created new {}: {path}", outcome.kind)),
                ScaffoldAction::Skipped => out.warning(&format!("file {path} already exists.")),
            }
            for warning in &outcome.warnings {
                out.warning(warning);
            }
            for patched in outcome.wiring.iter().filter(|o| matches!(o.patch, Patch::Inserted { .. })) {
                out.success(&format!(
                    "insert {} into DI file {}",
                    patched.text.trim().trim_end_matches(','),
                    patched.path.display()
                ));
            }
        }
    }
}
