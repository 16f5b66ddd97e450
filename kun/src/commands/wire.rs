use std::path::{Path, PathBuf};

use clap::Args;
use dialoguer::{Select, theme::ColorfulTheme};
use eyre::{Context, Result, bail};

use crate::{
    ops,
    reports::{Report, TerminalOutput, WireReport},
};

#[derive(Args)]
pub struct WireCommand {
    /// Directory holding wire.go, or `all` for every one found
    pub dir: Option<String>,
}

impl WireCommand {
    pub fn run(&self) -> Result<()> {
        let dirs = match self.dir.as_deref() {
            Some("all") => Self::candidates()?,
            Some(dir) => vec![PathBuf::from(dir)],
            None => Self::choose(Self::candidates()?)?.into_iter().collect(),
        };

        let mut report = WireReport::default();
        for dir in &dirs {
            let run = ops::run_wire(dir)
                .wrap_err_with(|| format!("Failed to run wire in {}", dir.display()))?;
            report.runs.push(run);
        }
        report.render(&mut TerminalOutput::new());
        Ok(())
    }

    fn candidates() -> Result<Vec<PathBuf>> {
        let base = std::env::current_dir().wrap_err("Failed to read the working directory")?;
        let dirs = ops::find_wire_dirs(&base).wrap_err("Failed to search for wire.go")?;
        if dirs.is_empty() {
            bail!("The wire.go cannot be found in the current directory");
        }
        Ok(dirs)
    }

    /// Ask which directory to use when there is more than one.
    fn choose(mut dirs: Vec<PathBuf>) -> Result<Option<PathBuf>> {
        if dirs.len() == 1 {
            return Ok(dirs.pop());
        }
        let base = std::env::current_dir().unwrap_or_default();
        let items: Vec<String> = dirs
            .iter()
            .map(|dir| relative(dir, &base).join("wire.go").display().to_string())
            .collect();
        let selection = Select::with_theme(&ColorfulTheme::default())
            .with_prompt("Which directory do you want to run?")
            .items(&items)
            .default(0)
            .max_length(10)
            .interact_opt()
            .wrap_err("Failed to get directory selection")?;

        Ok(selection.map(|index| dirs.swap_remove(index)))
    }
}

fn relative<'a>(path: &'a Path, base: &Path) -> &'a Path {
    path.strip_prefix(base).unwrap_or(path)
}
