//! Concurrent rendering and writing of repository files.

use std::{
    fmt,
    path::{Path, PathBuf},
    sync::mpsc,
    thread,
};

use indexmap::IndexMap;
use kun_core::{FileRules, GeneratedFile, WriteResult};
use tracing::{debug, info};

use crate::{
    EmitError, Error, Result,
    context::RenderContext,
    format::{Formatter, format_source},
    meta::StructMeta,
    pool::{CancelToken, Pool},
    templates::{Renderer, TemplateKind},
};

/// First line of every regenerated file.
pub const GENERATED_HEADER: &str = "// Code generated by kun. DO NOT EDIT.";

/// What happened to one file on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileAction {
    /// Regenerable file, written on every run.
    Regenerated,
    /// Customization file written for the first time.
    Created,
    /// Customization file left as the developer had it.
    Preserved,
}

impl fmt::Display for FileAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileAction::Regenerated => f.write_str("regenerated"),
            FileAction::Created => f.write_str("created"),
            FileAction::Preserved => f.write_str("preserved"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmittedFile {
    pub table: String,
    pub package: String,
    pub struct_name: String,
    pub path: PathBuf,
    pub action: FileAction,
}

/// One of the two files generated per table.
struct RepoFile<'a> {
    emitter: &'a Emitter<'a>,
    meta: &'a StructMeta,
    dir: &'a Path,
    kind: TemplateKind,
}

impl GeneratedFile for RepoFile<'_> {
    type Error = Error;

    fn path(&self, base: &Path) -> PathBuf {
        match self.kind {
            TemplateKind::RepoGen => base.join(format!("{}_gen.go", self.meta.file_name)),
            _ => base.join(format!("{}.go", self.meta.file_name)),
        }
    }

    fn rules(&self) -> FileRules {
        match self.kind {
            TemplateKind::RepoGen => FileRules::generated(GENERATED_HEADER),
            _ => FileRules::create_once(),
        }
    }

    fn render(&self) -> Result<String> {
        let context = RenderContext::new(self.meta, &self.emitter.project);
        context.validate()?;
        let source = self.emitter.renderer.render(self.kind, &context)?;
        format_source(self.emitter.formatter, &self.path(self.dir), &source)
    }
}

/// Writes the repository files of many models on a bounded set of threads.
pub struct Emitter<'a> {
    renderer: &'a Renderer,
    formatter: &'a dyn Formatter,
    project: String,
    pool_size: Option<usize>,
}

impl<'a> Emitter<'a> {
    pub fn new(renderer: &'a Renderer, formatter: &'a dyn Formatter) -> Self {
        Self {
            renderer,
            formatter,
            project: String::new(),
            pool_size: None,
        }
    }

    /// Go module path made available to templates.
    pub fn with_project(mut self, project: impl Into<String>) -> Self {
        self.project = project.into();
        self
    }

    /// Number of tables processed at once; defaults to the host's parallelism.
    pub fn with_pool_size(mut self, size: usize) -> Self {
        self.pool_size = Some(size);
        self
    }

    fn pool(&self) -> Pool {
        match self.pool_size {
            Some(size) => Pool::new(size),
            None => Pool::with_available_parallelism(),
        }
    }

    /// Write both files of every model into `dir`.
    ///
    /// Submission blocks while the pool is saturated. The first failure stops
    /// further submissions and signals running workers; the call returns once
    /// every started worker is done, with all failures collected.
    pub fn emit(&self, dir: &Path, models: &IndexMap<String, StructMeta>) -> Result<Vec<EmittedFile>> {
        let pool = self.pool();
        let cancel = CancelToken::new();
        let (tx, rx) = mpsc::channel();
        debug!(models = models.len(), workers = pool.size(), "emitting repositories");

        thread::scope(|scope| {
            for (index, meta) in models.values().enumerate() {
                let permit = pool.acquire();
                if cancel.is_cancelled() {
                    break;
                }
                let tx = tx.clone();
                let cancel = cancel.clone();
                scope.spawn(move || {
                    let _permit = permit;
                    let result = self.emit_one(dir, meta, &cancel);
                    if result.is_err() {
                        cancel.cancel();
                    }
                    // the receiver outlives the scope
                    let _ = tx.send((index, result));
                });
            }
        });
        drop(tx);

        let mut emitted = Vec::new();
        let mut errors = Vec::new();
        for (index, result) in rx {
            match result {
                Ok(files) => emitted.push((index, files)),
                Err(Error::Cancelled) => {}
                Err(e) => errors.push(e),
            }
        }
        if let Some(err) = EmitError::from_errors(errors) {
            return Err(err.into());
        }

        emitted.sort_by_key(|(index, _)| *index);
        Ok(emitted.into_iter().flat_map(|(_, files)| files).collect())
    }

    fn emit_one(&self, dir: &Path, meta: &StructMeta, cancel: &CancelToken) -> Result<Vec<EmittedFile>> {
        let mut files = Vec::with_capacity(2);

        for kind in [TemplateKind::RepoGen, TemplateKind::RepoCustom] {
            if cancel.is_cancelled() {
                return Err(Error::Cancelled);
            }
            let file = RepoFile {
                emitter: self,
                meta,
                dir,
                kind,
            };
            let path = file.path(dir);
            let action = match (kind, file.write(dir)?) {
                (TemplateKind::RepoGen, _) => FileAction::Regenerated,
                (_, WriteResult::Written) => FileAction::Created,
                (_, WriteResult::Skipped) => FileAction::Preserved,
            };
            if action != FileAction::Preserved {
                info!(
                    "generate repository file(table <{}> -> {{{}.{}}}): {}",
                    meta.table_name,
                    meta.package_name,
                    meta.struct_name,
                    path.display()
                );
            }
            files.push(EmittedFile {
                table: meta.table_name.clone(),
                package: meta.package_name.clone(),
                struct_name: meta.struct_name.clone(),
                path,
                action,
            });
        }

        Ok(files)
    }
}
