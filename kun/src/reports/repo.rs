//! Repository generation report.

use kun_codegen::{FileAction, GenerateReport, Patch};

use super::output::{Output, Report};

#[derive(Debug)]
pub struct RepoReport {
    /// DSN with the password masked.
    pub dsn: String,
    /// Warnings raised before generation started.
    pub warnings: Vec<String>,
    pub generated: GenerateReport,
}

impl Report for RepoReport {
    fn render(&self, out: &mut dyn Output) {
        let generated = &self.generated;
        for warning in self.warnings.iter().chain(&generated.warnings) {
            out.warning(warning);
        }
        for table in &generated.ignored {
            out.warning(&format!("ignore table <{table}>: no columns"));
        }
        for failure in &generated.failed {
            out.error(&format!(
                "generate struct for table <{}> failed: {}",
                failure.table, failure.error
            ));
        }

        for file in &generated.files {
            let message = format!(
                "generate repository file(table <{}> -> {{{}.{}}}): {}",
                file.table,
                file.package,
                file.struct_name,
                file.path.display()
            );
            match file.action {
                FileAction::Preserved => out.list_item(&format!("kept {}", file.path.display())),
                _ => out.success(&message),
            }
        }

        for outcome in &generated.wiring {
            if let Patch::Inserted { .. } = outcome.patch {
                out.success(&format!(
                    "insert {} into DI file {}",
                    outcome.text.trim().trim_end_matches(','),
                    outcome.path.display()
                ));
            }
        }

        if generated.is_empty() && generated.failed.is_empty() {
            out.warning(&format!("nothing generated from {}", self.dsn));
        }
    }
}
