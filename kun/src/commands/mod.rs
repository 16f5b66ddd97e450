mod create;
mod wire;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use create::CreateCommand;
use eyre::Result;
use kun_core::KunToml;
use wire::WireCommand;

/// Exit with a rendered diagnostic instead of an eyre report.
pub(crate) trait UnwrapOrExit<T> {
    fn unwrap_or_exit(self) -> T;
}

fn exit_with(report: miette::Report) -> ! {
    eprintln!("{report:?}");
    std::process::exit(1);
}

impl<T> UnwrapOrExit<T> for kun_core::Result<T> {
    fn unwrap_or_exit(self) -> T {
        self.unwrap_or_else(|e| exit_with(miette::Report::new(*e)))
    }
}

impl<T> UnwrapOrExit<T> for kun_schema::Result<T> {
    fn unwrap_or_exit(self) -> T {
        self.unwrap_or_else(|e| exit_with(miette::Report::new(e)))
    }
}

impl<T> UnwrapOrExit<T> for kun_codegen::Result<T> {
    fn unwrap_or_exit(self) -> T {
        self.unwrap_or_else(|e| exit_with(miette::Report::new(e)))
    }
}

#[derive(Parser)]
#[command(name = "kun")]
#[command(version)]
#[command(about = "Scaffold Go backend code and generate GORM repositories")]
pub(crate) struct Cli {
    /// Path to kun.toml; a missing file means defaults
    #[arg(short, long, global = true, default_value = "kun.toml")]
    pub config: PathBuf,

    /// Show debug logs
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    pub fn run(&self) -> Result<()> {
        let config = KunToml::load(&self.config).unwrap_or_exit();
        match &self.command {
            Commands::Create(cmd) => cmd.run(&config),
            Commands::Wire(cmd) => cmd.run(),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create a controller, service, router, cache or database repositories
    Create(CreateCommand),

    /// Run `wire` in the directory holding wire.go
    Wire(WireCommand),
}
