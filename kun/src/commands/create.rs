use std::path::PathBuf;

use clap::{Args, Subcommand};
use eyre::Result;
use kun_codegen::{ScaffoldKind, ScaffoldName, TableFilter, TemplateSource};
use kun_core::{IdCasing, KunToml, RepoConfig};
use kun_schema::Dialect;

use super::UnwrapOrExit;
use crate::{
    ops::{self, RepoOptions, ScaffoldOptions},
    reports::{Report, TerminalOutput},
};

#[derive(Args)]
pub struct CreateCommand {
    #[command(subcommand)]
    target: CreateTarget,
}

#[derive(Subcommand)]
enum CreateTarget {
    /// Create a new controller
    #[command(name = "ctl")]
    Controller(ScaffoldArgs),

    /// Create a new service
    #[command(name = "svc")]
    Service(ScaffoldArgs),

    /// Create a new router
    Router(ScaffoldArgs),

    /// Create a new cache repository
    Cache(ScaffoldArgs),

    /// Create a new controller & service
    All(ScaffoldArgs),

    /// Generate GORM repositories from database tables
    Repo(RepoArgs),
}

#[derive(Args)]
struct ScaffoldArgs {
    /// Name, optionally inside a directory (e.g. `admin/user`)
    #[arg(value_parser = parse_name)]
    name: ScaffoldName,

    /// Directory with template overrides
    #[arg(short, long)]
    tpl_path: Option<PathBuf>,

    /// Do not register the constructor in the provider set
    #[arg(long)]
    no_wire: bool,

    /// Formatter for the created file
    #[arg(long, value_parser = ["gofmt", "goimports", "none"])]
    format: Option<String>,
}

fn parse_name(arg: &str) -> std::result::Result<ScaffoldName, String> {
    ScaffoldName::parse(arg).ok_or_else(|| format!("'{arg}' does not contain a file name"))
}

#[derive(Args)]
struct RepoArgs {
    /// Data source, e.g. "user:pass@tcp(127.0.0.1:3306)/shop" or "postgres://..."
    dsn: String,

    /// `*` for every table, or a comma separated list
    #[arg(default_value = "*")]
    tables: String,

    /// Directory with template overrides
    #[arg(short, long)]
    tpl_path: Option<PathBuf>,

    /// Database kind, when it cannot be told from the DSN
    #[arg(long)]
    dialect: Option<Dialect>,

    /// Repository output directory
    #[arg(short, long)]
    out: Option<PathBuf>,

    /// Package name or package directory
    #[arg(short, long)]
    package: Option<String>,

    /// Table prefix left out of model names
    #[arg(long)]
    prefix: Option<String>,

    /// Pointer fields for nullable columns
    #[arg(long, overrides_with = "no_nullable")]
    nullable: bool,

    #[arg(long, overrides_with = "nullable")]
    no_nullable: bool,

    /// Pointer fields for columns with a default value
    #[arg(long)]
    coverable: bool,

    /// Unsigned Go types for unsigned columns
    #[arg(long)]
    signable: bool,

    /// Leave index clauses out of gorm tags
    #[arg(long)]
    no_index_tag: bool,

    /// Leave column types out of gorm tags
    #[arg(long)]
    no_type_tag: bool,

    /// Do not register constructors in the DI file
    #[arg(long)]
    no_wire: bool,

    /// How `ID` in field names becomes `Id`
    #[arg(long)]
    id_casing: Option<IdCasing>,

    /// Formatter for generated files
    #[arg(long, value_parser = ["gofmt", "goimports", "none"])]
    format: Option<String>,

    /// Tables written at once (defaults to available parallelism)
    #[arg(short, long)]
    jobs: Option<usize>,
}

impl RepoArgs {
    /// `repo` with the flags given on the command line applied.
    fn merge(&self, repo: &RepoConfig) -> RepoConfig {
        let mut merged = repo.clone();
        if let Some(out) = &self.out {
            merged.out = out.clone();
        }
        if let Some(package) = &self.package {
            merged.package = package.clone();
        }
        if let Some(prefix) = &self.prefix {
            merged.prefix = prefix.clone();
        }
        if self.nullable {
            merged.nullable = true;
        }
        if self.no_nullable {
            merged.nullable = false;
        }
        merged.coverable |= self.coverable;
        merged.signable |= self.signable;
        merged.index_tag &= !self.no_index_tag;
        merged.type_tag &= !self.no_type_tag;
        merged.wire &= !self.no_wire;
        if let Some(id_casing) = self.id_casing {
            merged.id_casing = id_casing;
        }
        merged
    }
}

/// The `-t` flag wins over `[templates] path`.
fn templates(flag: Option<&PathBuf>, config: &KunToml) -> TemplateSource {
    TemplateSource::from_option(flag.or(config.templates.path.as_ref()).map(PathBuf::as_path))
}

impl CreateCommand {
    pub fn run(&self, config: &KunToml) -> Result<()> {
        let (kinds, args) = match &self.target {
            CreateTarget::Controller(args) => (vec![ScaffoldKind::Controller], args),
            CreateTarget::Service(args) => (vec![ScaffoldKind::Service], args),
            CreateTarget::Router(args) => (vec![ScaffoldKind::Router], args),
            CreateTarget::Cache(args) => (vec![ScaffoldKind::Cache], args),
            CreateTarget::All(args) => (vec![ScaffoldKind::Controller, ScaffoldKind::Service], args),
            CreateTarget::Repo(args) => return Self::run_repo(args, config),
        };

        let root = std::env::current_dir()?;
        let report = ops::scaffold(
            &kinds,
            &args.name,
            ScaffoldOptions {
                root: &root,
                templates: templates(args.tpl_path.as_ref(), config),
                format: args.format.as_deref().unwrap_or(&config.format.program),
                wire: !args.no_wire,
            },
        )
        .unwrap_or_exit();

        report.render(&mut TerminalOutput::new());
        Ok(())
    }

    fn run_repo(args: &RepoArgs, config: &KunToml) -> Result<()> {
        let tables: TableFilter = match args.tables.parse() {
            Ok(tables) => tables,
            Err(never) => match never {},
        };
        let report = ops::generate_repositories(RepoOptions {
            dsn: &args.dsn,
            dialect: args.dialect,
            tables,
            repo: args.merge(&config.repo),
            templates: templates(args.tpl_path.as_ref(), config),
            format: args.format.as_deref().unwrap_or(&config.format.program),
            workers: args.jobs,
        })
        .unwrap_or_exit();

        report.render(&mut TerminalOutput::new());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    #[derive(Parser)]
    struct TestCli {
        #[command(subcommand)]
        target: CreateTarget,
    }

    fn repo_args(args: &[&str]) -> RepoArgs {
        let cli = TestCli::try_parse_from(["create", "repo", "sqlite:dev.db"].iter().chain(args)).unwrap();
        match cli.target {
            CreateTarget::Repo(args) => args,
            _ => panic!("expected repo arguments"),
        }
    }

    #[test]
    fn test_flags_override_config() {
        let args = repo_args(&[
            "users,orders",
            "--no-nullable",
            "--coverable",
            "--no-wire",
            "-p",
            "model",
            "--id-casing",
            "boundary",
        ]);
        let merged = args.merge(&RepoConfig::default());

        assert_eq!(args.tables, "users,orders");
        assert!(!merged.nullable);
        assert!(merged.coverable);
        assert!(!merged.wire);
        assert!(merged.index_tag);
        assert_eq!(merged.package, "model");
        assert_eq!(merged.id_casing, IdCasing::Boundary);
    }

    #[test]
    fn test_config_kept_without_flags() {
        let config = RepoConfig {
            nullable: false,
            prefix: "t_".into(),
            ..RepoConfig::default()
        };
        let merged = repo_args(&[]).merge(&config);

        assert!(!merged.nullable);
        assert_eq!(merged.prefix, "t_");
    }

    #[test]
    fn test_scaffold_name_is_validated() {
        let cli = TestCli::try_parse_from(["create", "ctl", "admin/user.go"]).unwrap();
        let CreateTarget::Controller(args) = cli.target else {
            panic!("expected controller arguments");
        };
        assert_eq!(args.name.name, "User");

        assert!(TestCli::try_parse_from(["create", "svc", "admin/"]).is_err());
    }

    #[test]
    fn test_template_flag_wins() {
        let config = KunToml::parse("[templates]\npath = \"tpl\"\n", "kun.toml").unwrap();

        assert_eq!(
            templates(None, &config),
            TemplateSource::Directory(PathBuf::from("tpl"))
        );
        assert_eq!(
            templates(Some(&PathBuf::from("mine")), &config),
            TemplateSource::Directory(PathBuf::from("mine"))
        );
        assert_eq!(templates(None, &KunToml::default()), TemplateSource::Embedded);
    }
}
