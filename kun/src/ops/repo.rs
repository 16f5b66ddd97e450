//! Repository generation from a live database.

use std::path::Path;

use kun_codegen::{Generator, GeneratorConfig, Result, TableFilter, TemplateSource};
use kun_core::RepoConfig;
use kun_schema::{Database, Dialect, Dsn};
use tracing::info;

use super::{formatter, project_name};
use crate::reports::RepoReport;

/// Options for the repository generation.
pub struct RepoOptions<'a> {
    pub dsn: &'a str,
    /// Overrides the dialect guessed from the DSN.
    pub dialect: Option<Dialect>,
    pub tables: TableFilter,
    pub repo: RepoConfig,
    pub templates: TemplateSource,
    /// `gofmt`, `goimports` or `none`.
    pub format: &'a str,
    pub workers: Option<usize>,
}

/// Connect, introspect the selected tables and write their repositories.
pub fn generate_repositories(opts: RepoOptions) -> Result<RepoReport> {
    let dsn = Dsn::parse(opts.dsn, opts.dialect)?;
    info!(dsn = %dsn.redacted(), "connecting");
    let database = Database::connect(&dsn)?;
    let tables = opts.tables.resolve(&database)?;

    let mut warnings = Vec::new();
    let (project, warning) = project_name(Path::new("."));
    warnings.extend(warning);
    let (formatter, warning) = formatter(opts.format);
    warnings.extend(warning);

    let config = GeneratorConfig {
        templates: opts.templates,
        project,
        workers: opts.workers,
        ..GeneratorConfig::from_repo(&opts.repo)
    };
    let mut generator = Generator::new(&database, config);
    generator.generate_tables(&tables);
    let generated = generator.execute(formatter.as_ref())?;

    Ok(RepoReport {
        dsn: dsn.redacted(),
        warnings,
        generated,
    })
}
