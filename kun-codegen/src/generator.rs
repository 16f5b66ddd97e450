//! Table selection, metadata collection and the full generation run.

use std::{
    path::{Path, PathBuf},
    str::FromStr,
};

use indexmap::IndexMap;
use kun_core::{GormNaming, NamingStrategy, RepoConfig};
use kun_schema::SchemaSource;
use tracing::{info, warn};

use crate::{
    Error, Result,
    emitter::{EmittedFile, Emitter},
    format::Formatter,
    meta::{FieldOptions, MetaBuilder, StructMeta},
    templates::{Renderer, TemplateSource},
    wiring::{Insertion, PatchOutcome, patch_di, unplaced},
};

/// Which tables to generate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableFilter {
    All,
    Named(Vec<String>),
}

impl TableFilter {
    /// Table names to generate, listing the database for [`TableFilter::All`].
    pub fn resolve<S: SchemaSource + ?Sized>(&self, source: &S) -> Result<Vec<String>> {
        match self {
            TableFilter::All => Ok(source.tables()?),
            TableFilter::Named(tables) => Ok(tables.clone()),
        }
    }
}

impl FromStr for TableFilter {
    type Err = std::convert::Infallible;

    /// `*` or empty for every table, otherwise a comma separated list.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() || s == "*" {
            return Ok(TableFilter::All);
        }
        Ok(TableFilter::Named(
            s.split(',')
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(String::from)
                .collect(),
        ))
    }
}

#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    /// Repository output directory, e.g. `./internal/repository/db`.
    pub out_path: PathBuf,
    /// Package name, or a package directory when it contains a separator.
    pub package_name: String,
    pub field: FieldOptions,
    pub naming: GormNaming,
    pub templates: TemplateSource,
    /// Register constructors in the DI file next to the package.
    pub wire: bool,
    /// Go module path, see [`kun_core::project::go_module`].
    pub project: String,
    /// Worker count; the host's parallelism when unset.
    pub workers: Option<usize>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self::from_repo(&RepoConfig::default())
    }
}

impl GeneratorConfig {
    pub fn from_repo(repo: &RepoConfig) -> Self {
        Self {
            out_path: repo.out.clone(),
            package_name: repo.package.clone(),
            field: FieldOptions {
                nullable: repo.nullable,
                coverable: repo.coverable,
                signable: repo.signable,
                with_index_tag: repo.index_tag,
                with_type_tag: repo.type_tag,
                id_casing: repo.id_casing,
            },
            naming: GormNaming::with_prefix(repo.prefix.clone()),
            templates: TemplateSource::Embedded,
            wire: repo.wire,
            project: String::new(),
            workers: None,
        }
    }

    /// Directory the repository package is written to.
    ///
    /// A package given as a path is used as is (made absolute); a bare
    /// package name is placed next to the configured output directory.
    pub fn output_dir(&self) -> Result<PathBuf> {
        if self.package_name.contains(['/', '\\']) {
            let path = Path::new(&self.package_name);
            return std::path::absolute(path).map_err(|source| Error::OutputPath {
                path: path.to_path_buf(),
                source,
            });
        }
        let parent = self.out_path.parent().unwrap_or(Path::new(""));
        Ok(parent.join(&self.package_name))
    }

    /// Go package clause for the generated files.
    pub fn go_package(&self) -> String {
        Path::new(&self.package_name)
            .file_name()
            .map_or_else(|| self.package_name.clone(), |name| name.to_string_lossy().into_owned())
    }
}

/// Result of [`Generator::generate_table`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableOutcome {
    Added { struct_name: String, columns: usize },
    /// Empty struct name or no columns: nothing to generate.
    Ignored,
}

/// A table that could not be turned into a model.
#[derive(Debug)]
pub struct TableFailure {
    pub table: String,
    pub error: Error,
}

#[derive(Debug, Default)]
pub struct GenerateReport {
    /// Tables that produced a model.
    pub tables: Vec<String>,
    pub ignored: Vec<String>,
    pub failed: Vec<TableFailure>,
    pub files: Vec<EmittedFile>,
    pub wiring: Vec<PatchOutcome>,
    pub warnings: Vec<String>,
}

impl GenerateReport {
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty() && self.files.is_empty()
    }
}

/// Generates GORM repositories for tables of one database.
pub struct Generator<'a, S: ?Sized> {
    source: &'a S,
    config: GeneratorConfig,
    models: IndexMap<String, StructMeta>,
    report: GenerateReport,
}

impl<'a, S: SchemaSource + ?Sized> Generator<'a, S> {
    pub fn new(source: &'a S, config: GeneratorConfig) -> Self {
        Self {
            source,
            config,
            models: IndexMap::new(),
            report: GenerateReport::default(),
        }
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Models collected so far, keyed by struct name.
    pub fn models(&self) -> &IndexMap<String, StructMeta> {
        &self.models
    }

    /// Introspect `table` and queue its model.
    pub fn generate_table(&mut self, table: &str) -> Result<TableOutcome> {
        let struct_name = self.config.naming.struct_name(table);
        let builder = MetaBuilder::new(
            self.source,
            &self.config.naming,
            self.config.field,
            self.config.go_package(),
        );
        let built = builder.build(table, &struct_name)?;
        self.report.warnings.extend(built.warnings);

        let Some(meta) = built.meta else {
            info!("ignore table <{table}>: nothing to generate");
            self.report.ignored.push(table.to_string());
            return Ok(TableOutcome::Ignored);
        };

        let columns = meta.fields.len();
        info!("got {columns} columns from table <{table}>");
        self.report.tables.push(table.to_string());
        self.models.insert(struct_name.clone(), meta);
        Ok(TableOutcome::Added {
            struct_name,
            columns,
        })
    }

    /// [`Self::generate_table`] for each table; failures are recorded and skipped.
    pub fn generate_tables<T: AsRef<str>>(&mut self, tables: &[T]) {
        for table in tables {
            let table = table.as_ref();
            if let Err(error) = self.generate_table(table) {
                warn!("generate struct for table <{table}> failed: {error}");
                self.report.failed.push(TableFailure {
                    table: table.to_string(),
                    error,
                });
            }
        }
    }

    /// Write every queued model and register the constructors.
    pub fn execute(self, formatter: &dyn Formatter) -> Result<GenerateReport> {
        let Self {
            config,
            models,
            mut report,
            ..
        } = self;
        if models.is_empty() {
            info!("no model to generate");
            return Ok(report);
        }

        let dir = config.output_dir()?;
        std::fs::create_dir_all(&dir).map_err(|source| Error::CreateDir {
            path: dir.clone(),
            source,
        })?;

        let renderer = Renderer::new(config.templates.clone());
        let mut emitter = Emitter::new(&renderer, formatter).with_project(config.project.as_str());
        if let Some(workers) = config.workers {
            emitter = emitter.with_pool_size(workers);
        }
        report.files = emitter.emit(&dir, &models)?;

        if config.wire {
            let insertions: Vec<Insertion> = models
                .values()
                .map(|meta| Insertion::repository(&meta.package_name, &meta.struct_name))
                .collect();
            match patch_di(&dir, &insertions) {
                Ok(outcomes) => {
                    for insertion in unplaced(&insertions, &outcomes) {
                        warn!("no DI marker for {}", insertion.text.trim());
                        report
                            .warnings
                            .push(format!("no `{}` line found for {}", insertion.marker, insertion.text.trim()));
                    }
                    report.wiring = outcomes;
                }
                Err(error) => {
                    warn!("insert repositories into DI file failed: {error}");
                    report.warnings.push(format!("DI file not updated: {error}"));
                }
            }
        }

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use kun_schema::{Column, Dialect, StaticSchema};
    use tempfile::TempDir;

    use super::*;
    use crate::format::Passthrough;

    fn schema() -> StaticSchema {
        StaticSchema::new(Dialect::Mysql)
            .table(
                "users",
                vec![
                    Column::new("users", "id", "bigint")
                        .primary_key()
                        .auto_increment(),
                    Column::new("users", "name", "varchar").not_null(),
                ],
                vec![],
            )
            .table("empty", vec![], vec![])
    }

    fn config(temp: &TempDir) -> GeneratorConfig {
        GeneratorConfig {
            out_path: temp.path().join("repository").join("db"),
            wire: false,
            workers: Some(2),
            ..GeneratorConfig::default()
        }
    }

    #[test]
    fn test_table_filter_from_str() {
        assert_eq!("*".parse::<TableFilter>().unwrap(), TableFilter::All);
        assert_eq!("".parse::<TableFilter>().unwrap(), TableFilter::All);
        assert_eq!(
            "users, orders,".parse::<TableFilter>().unwrap(),
            TableFilter::Named(vec!["users".into(), "orders".into()])
        );
    }

    #[test]
    fn test_table_filter_resolve_lists_tables() {
        let tables = TableFilter::All.resolve(&schema()).unwrap();
        assert_eq!(tables, ["empty", "users"]);
    }

    #[test]
    fn test_output_dir_next_to_out_path() {
        let config = GeneratorConfig {
            out_path: PathBuf::from("./internal/repository/db"),
            package_name: "model".into(),
            ..GeneratorConfig::default()
        };
        assert_eq!(config.output_dir().unwrap(), PathBuf::from("./internal/repository/model"));
        assert_eq!(config.go_package(), "model");
    }

    #[test]
    fn test_output_dir_from_package_path() {
        let config = GeneratorConfig {
            package_name: "internal/dal/query".into(),
            ..GeneratorConfig::default()
        };
        let dir = config.output_dir().unwrap();
        assert!(dir.is_absolute());
        assert!(dir.ends_with("internal/dal/query"));
        assert_eq!(config.go_package(), "query");
    }

    #[test]
    fn test_generate_table_outcomes() {
        let temp = TempDir::new().unwrap();
        let schema = schema();
        let mut generator = Generator::new(&schema, config(&temp));

        assert_eq!(
            generator.generate_table("users").unwrap(),
            TableOutcome::Added {
                struct_name: "User".into(),
                columns: 2
            }
        );
        assert_eq!(generator.generate_table("empty").unwrap(), TableOutcome::Ignored);
        assert_eq!(generator.models().len(), 1);
    }

    #[test]
    fn test_invalid_struct_name_fails_only_that_table() {
        let temp = TempDir::new().unwrap();
        let schema = schema().table(
            "user-logs",
            vec![Column::new("user-logs", "id", "int").primary_key()],
            vec![],
        );
        let mut generator = Generator::new(&schema, config(&temp));

        generator.generate_tables(&["user-logs", "users"]);
        let report = generator.execute(&Passthrough).unwrap();

        assert_eq!(report.tables, ["users"]);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].table, "user-logs");
        assert!(matches!(report.failed[0].error, Error::InvalidStructName { .. }));
        assert_eq!(report.files.len(), 2);
    }

    #[test]
    fn test_execute_without_models_writes_nothing() {
        let temp = TempDir::new().unwrap();
        let schema = schema();
        let mut generator = Generator::new(&schema, config(&temp));
        generator.generate_tables(&["empty"]);

        let report = generator.execute(&Passthrough).unwrap();

        assert!(report.is_empty());
        assert_eq!(report.ignored, ["empty"]);
        assert!(!temp.path().join("repository").exists());
    }

    #[test]
    fn test_missing_di_file_is_a_warning() {
        let temp = TempDir::new().unwrap();
        let schema = schema();
        let mut generator = Generator::new(
            &schema,
            GeneratorConfig {
                wire: true,
                ..config(&temp)
            },
        );
        generator.generate_tables(&["users"]);

        let report = generator.execute(&Passthrough).unwrap();

        assert_eq!(report.files.len(), 2);
        assert!(report.wiring.is_empty());
        assert_eq!(report.warnings.len(), 1);
        assert!(report.warnings[0].starts_with("DI file not updated"));
    }
}
