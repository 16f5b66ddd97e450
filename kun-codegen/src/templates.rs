//! Template lookup and rendering.

use std::{
    borrow::Cow,
    fmt,
    path::{Path, PathBuf},
};

use minijinja::{Environment, UndefinedBehavior};
use serde::Serialize;
use tracing::debug;

use crate::{Error, Result};

/// Every template kun renders, keyed by `<kind>.tpl`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TemplateKind {
    /// Model and generated queries, rewritten on every run.
    RepoGen,
    /// Repository interface for hand-written queries, created once.
    RepoCustom,
    Controller,
    Service,
    Router,
    Cache,
}

impl TemplateKind {
    pub const ALL: [TemplateKind; 6] = [
        TemplateKind::RepoGen,
        TemplateKind::RepoCustom,
        TemplateKind::Controller,
        TemplateKind::Service,
        TemplateKind::Router,
        TemplateKind::Cache,
    ];

    pub fn key(self) -> &'static str {
        match self {
            TemplateKind::RepoGen => "repo_gen.tpl",
            TemplateKind::RepoCustom => "repo_custom.tpl",
            TemplateKind::Controller => "controller.tpl",
            TemplateKind::Service => "service.tpl",
            TemplateKind::Router => "router.tpl",
            TemplateKind::Cache => "cache.tpl",
        }
    }

    fn embedded(self) -> &'static str {
        match self {
            TemplateKind::RepoGen => include_str!("../templates/repo_gen.tpl"),
            TemplateKind::RepoCustom => include_str!("../templates/repo_custom.tpl"),
            TemplateKind::Controller => include_str!("../templates/controller.tpl"),
            TemplateKind::Service => include_str!("../templates/service.tpl"),
            TemplateKind::Router => include_str!("../templates/router.tpl"),
            TemplateKind::Cache => include_str!("../templates/cache.tpl"),
        }
    }
}

impl fmt::Display for TemplateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Where template bodies come from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TemplateSource {
    /// Bodies compiled into the binary.
    #[default]
    Embedded,
    /// `<dir>/<kind>.tpl` when present, the embedded body otherwise.
    Directory(PathBuf),
}

impl TemplateSource {
    pub fn from_option(dir: Option<&Path>) -> Self {
        match dir {
            Some(dir) if !dir.as_os_str().is_empty() => TemplateSource::Directory(dir.to_path_buf()),
            _ => TemplateSource::Embedded,
        }
    }

    /// Body of `kind`.
    pub fn body(&self, kind: TemplateKind) -> Result<Cow<'static, str>> {
        let TemplateSource::Directory(dir) = self else {
            return Ok(Cow::Borrowed(kind.embedded()));
        };
        let path = dir.join(kind.key());
        match std::fs::read_to_string(&path) {
            Ok(body) => {
                debug!(template = %path.display(), "using template override");
                Ok(Cow::Owned(body))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Cow::Borrowed(kind.embedded())),
            Err(source) => Err(Error::TemplateRead { path, source }),
        }
    }
}

/// Renders templates with a serializable context.
#[derive(Debug, Clone, Default)]
pub struct Renderer {
    source: TemplateSource,
}

impl Renderer {
    pub fn new(source: TemplateSource) -> Self {
        Self { source }
    }

    pub fn source(&self) -> &TemplateSource {
        &self.source
    }

    pub fn render<C: Serialize>(&self, kind: TemplateKind, context: &C) -> Result<String> {
        let body = self.source.body(kind)?;
        let template_error = |source| Error::Template {
            name: kind.key().to_string(),
            source,
        };

        let mut env = Environment::new();
        env.set_trim_blocks(true);
        env.set_lstrip_blocks(true);
        env.set_keep_trailing_newline(true);
        env.set_undefined_behavior(UndefinedBehavior::Strict);
        env.add_template(kind.key(), &body).map_err(template_error)?;
        env.get_template(kind.key())
            .and_then(|template| template.render(context))
            .map_err(template_error)
    }
}
