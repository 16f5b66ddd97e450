//! Boilerplate files created from a name: controllers, services, routers and
//! cache repositories.

use std::{
    fmt,
    path::{Path, PathBuf},
};

use kun_core::{FileRules, GeneratedFile, WriteResult, case::{lower_first, upper_first}};
use tracing::{info, warn};

use crate::{
    Result,
    context::{CONTEXT_VERSION, ScaffoldContext},
    format::{Formatter, format_source},
    templates::{Renderer, TemplateKind},
    wiring::{
        CACHE_MARKER, CONTROLLER_MARKER, Insertion, PatchOutcome, SERVICE_MARKER, patch_di, unplaced,
    },
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScaffoldKind {
    Controller,
    Service,
    Router,
    Cache,
}

impl ScaffoldKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ScaffoldKind::Controller => "controller",
            ScaffoldKind::Service => "service",
            ScaffoldKind::Router => "router",
            ScaffoldKind::Cache => "cache",
        }
    }

    /// Default directory, relative to the project root.
    pub fn default_dir(self) -> PathBuf {
        match self {
            ScaffoldKind::Cache => Path::new("internal").join("repository").join("cache"),
            kind => Path::new("internal").join(kind.as_str()),
        }
    }

    fn template(self) -> TemplateKind {
        match self {
            ScaffoldKind::Controller => TemplateKind::Controller,
            ScaffoldKind::Service => TemplateKind::Service,
            ScaffoldKind::Router => TemplateKind::Router,
            ScaffoldKind::Cache => TemplateKind::Cache,
        }
    }

    /// Marker and constructor suffix of the kind's provider set, if it has one.
    fn provider(self) -> Option<(&'static str, &'static str)> {
        match self {
            ScaffoldKind::Controller => Some((CONTROLLER_MARKER, "Controller")),
            ScaffoldKind::Service => Some((SERVICE_MARKER, "Service")),
            ScaffoldKind::Cache => Some((CACHE_MARKER, "Cache")),
            ScaffoldKind::Router => None,
        }
    }
}

impl fmt::Display for ScaffoldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A name argument such as `user` or `admin/user.go`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScaffoldName {
    /// Directory part, if one was given.
    pub dir: Option<PathBuf>,
    /// `User`
    pub name: String,
    /// `user`
    pub lower_name: String,
    /// `u`
    pub first_char: String,
}

impl ScaffoldName {
    /// `None` when no name is left once the directory and `.go` are removed.
    pub fn parse(arg: &str) -> Option<Self> {
        let (dir, file) = match arg.rfind(['/', '\\']) {
            Some(i) => (Some(PathBuf::from(&arg[..=i])), &arg[i + 1..]),
            None => (None, arg),
        };
        let name = upper_first(file).replace(".go", "");
        if name.is_empty() {
            return None;
        }
        let lower_name = lower_first(&name);
        let first_char = lower_name.chars().next()?.to_string();
        Some(Self {
            dir,
            name,
            lower_name,
            first_char,
        })
    }

    pub fn file_name(&self) -> String {
        format!("{}.go", self.name.to_lowercase())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScaffoldAction {
    Created,
    /// The file already existed and was left alone.
    Skipped,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScaffoldOutcome {
    pub kind: ScaffoldKind,
    pub path: PathBuf,
    pub action: ScaffoldAction,
    pub wiring: Vec<PatchOutcome>,
    pub warnings: Vec<String>,
}

struct ScaffoldFile<'a> {
    scaffolder: &'a Scaffolder<'a>,
    kind: ScaffoldKind,
    name: &'a ScaffoldName,
    path: PathBuf,
}

impl ScaffoldFile<'_> {
    fn context(&self) -> ScaffoldContext {
        let package = self
            .path
            .parent()
            .and_then(Path::file_name)
            .map_or_else(|| self.kind.as_str().to_string(), |p| p.to_string_lossy().into_owned());
        ScaffoldContext {
            version: CONTEXT_VERSION,
            project: self.scaffolder.project.clone(),
            package,
            kind: self.kind.as_str().to_string(),
            name: self.name.name.clone(),
            lower_name: self.name.lower_name.clone(),
            first_char: self.name.first_char.clone(),
        }
    }
}

impl GeneratedFile for ScaffoldFile<'_> {
    type Error = crate::Error;

    fn path(&self, _base: &Path) -> PathBuf {
        self.path.clone()
    }

    fn rules(&self) -> FileRules {
        FileRules::create_once()
    }

    fn render(&self) -> Result<String> {
        let context = self.context();
        context.validate()?;
        let source = self.scaffolder.renderer.render(self.kind.template(), &context)?;
        format_source(self.scaffolder.formatter, &self.path, &source)
    }
}

/// Creates boilerplate files below a project root.
pub struct Scaffolder<'a> {
    root: PathBuf,
    renderer: &'a Renderer,
    formatter: &'a dyn Formatter,
    project: String,
    wire: bool,
}

impl<'a> Scaffolder<'a> {
    pub fn new(root: impl Into<PathBuf>, renderer: &'a Renderer, formatter: &'a dyn Formatter) -> Self {
        Self {
            root: root.into(),
            renderer,
            formatter,
            project: String::new(),
            wire: true,
        }
    }

    pub fn with_project(mut self, project: impl Into<String>) -> Self {
        self.project = project.into();
        self
    }

    /// Whether new constructors are added to the provider set next to them.
    pub fn with_wire(mut self, wire: bool) -> Self {
        self.wire = wire;
        self
    }

    /// Where `name` of `kind` is written.
    pub fn path_of(&self, kind: ScaffoldKind, name: &ScaffoldName) -> PathBuf {
        let dir = name.dir.clone().unwrap_or_else(|| kind.default_dir());
        self.root.join(dir).join(name.file_name())
    }

    /// Create the file unless it exists, then register its constructor.
    pub fn create(&self, kind: ScaffoldKind, name: &ScaffoldName) -> Result<ScaffoldOutcome> {
        let file = ScaffoldFile {
            scaffolder: self,
            kind,
            name,
            path: self.path_of(kind, name),
        };
        let mut outcome = ScaffoldOutcome {
            kind,
            path: file.path.clone(),
            action: ScaffoldAction::Skipped,
            wiring: Vec::new(),
            warnings: Vec::new(),
        };

        if file.write(&self.root)? == WriteResult::Skipped {
            warn!("file {} already exists", outcome.path.display());
            return Ok(outcome);
        }
        outcome.action = ScaffoldAction::Created;
        info!("Created new {kind}: {}", outcome.path.display());

        if let Some((marker, suffix)) = kind.provider().filter(|_| self.wire) {
            let constructor = format!("New{}{suffix}", name.name);
            let insertions = [Insertion::provider(marker, &constructor)];
            match patch_di(&outcome.path, &insertions) {
                Ok(wiring) => {
                    if !unplaced(&insertions, &wiring).is_empty() {
                        warn!("no DI marker for {constructor}");
                        outcome
                            .warnings
                            .push(format!("no `{marker}` line found for {constructor}"));
                    }
                    outcome.wiring = wiring;
                }
                Err(error) => {
                    warn!("insert {constructor} into DI file failed: {error}");
                    outcome.warnings.push(format!("DI file not updated: {error}"));
                }
            }
        }
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;
    use crate::{format::Passthrough, wiring::Patch};

    #[test]
    fn test_parse_name() {
        let name = ScaffoldName::parse("user").unwrap();
        assert_eq!(name.dir, None);
        assert_eq!(name.name, "User");
        assert_eq!(name.lower_name, "user");
        assert_eq!(name.first_char, "u");
        assert_eq!(name.file_name(), "user.go");

        let name = ScaffoldName::parse("admin/OrderItem.go").unwrap();
        assert_eq!(name.dir, Some(PathBuf::from("admin/")));
        assert_eq!(name.name, "OrderItem");
        assert_eq!(name.lower_name, "orderItem");
        assert_eq!(name.file_name(), "orderitem.go");

        assert!(ScaffoldName::parse("admin/").is_none());
        assert!(ScaffoldName::parse(".go").is_none());
    }

    #[test]
    fn test_default_dirs() {
        assert_eq!(ScaffoldKind::Controller.default_dir(), PathBuf::from("internal/controller"));
        assert_eq!(ScaffoldKind::Cache.default_dir(), PathBuf::from("internal/repository/cache"));
    }

    #[test]
    fn test_create_then_skip() {
        let temp = TempDir::new().unwrap();
        let renderer = Renderer::default();
        let scaffolder = Scaffolder::new(temp.path(), &renderer, &Passthrough)
            .with_project("github.com/acme/shop");
        let name = ScaffoldName::parse("user").unwrap();

        let created = scaffolder.create(ScaffoldKind::Service, &name).unwrap();
        assert_eq!(created.action, ScaffoldAction::Created);
        let path = temp.path().join("internal/service/user.go");
        assert_eq!(created.path, path);
        let content = fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("package service\n"));
        assert!(content.contains("func NewUserService(service *Service) UserService {"));

        fs::write(&path, "package service\n").unwrap();
        let skipped = scaffolder.create(ScaffoldKind::Service, &name).unwrap();
        assert_eq!(skipped.action, ScaffoldAction::Skipped);
        assert_eq!(fs::read_to_string(&path).unwrap(), "package service\n");
    }

    #[test]
    fn test_create_registers_constructor() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("internal/controller");
        fs::create_dir_all(&dir).unwrap();
        fs::write(
            dir.join("controller.go"),
            format!("package controller\n\nvar ProviderSet = wire.NewSet(\n    NewController,\n    {CONTROLLER_MARKER}\n)\n"),
        )
        .unwrap();
        let renderer = Renderer::default();
        let scaffolder = Scaffolder::new(temp.path(), &renderer, &Passthrough);

        let outcome = scaffolder
            .create(ScaffoldKind::Controller, &ScaffoldName::parse("user").unwrap())
            .unwrap();

        assert!(outcome.warnings.is_empty());
        assert!(
            outcome
                .wiring
                .iter()
                .any(|o| o.path.ends_with("controller.go") && o.patch == Patch::Inserted { line: 5 })
        );
        let di = fs::read_to_string(dir.join("controller.go")).unwrap();
        assert!(di.contains("    NewController,\n    NewUserController,\n"));
    }

    #[test]
    fn test_router_is_not_wired() {
        let temp = TempDir::new().unwrap();
        let renderer = Renderer::default();
        let scaffolder = Scaffolder::new(temp.path(), &renderer, &Passthrough);

        let outcome = scaffolder
            .create(ScaffoldKind::Router, &ScaffoldName::parse("admin/user").unwrap())
            .unwrap();

        assert_eq!(outcome.path, temp.path().join("admin/user.go"));
        assert!(outcome.wiring.is_empty());
        let content = fs::read_to_string(&outcome.path).unwrap();
        assert!(content.starts_with("package admin\n"));
    }
}
