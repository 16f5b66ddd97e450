//! Boilerplate creation.

use std::path::Path;

use kun_codegen::{Renderer, Result, ScaffoldKind, ScaffoldName, Scaffolder, TemplateSource};

use super::{formatter, project_name};
use crate::reports::ScaffoldReport;

pub struct ScaffoldOptions<'a> {
    /// Project root, where go.mod lives.
    pub root: &'a Path,
    pub templates: TemplateSource,
    pub format: &'a str,
    pub wire: bool,
}

/// Create one file per kind for `name`.
pub fn scaffold(kinds: &[ScaffoldKind], name: &ScaffoldName, opts: ScaffoldOptions) -> Result<ScaffoldReport> {
    let mut warnings = Vec::new();
    let (project, warning) = project_name(opts.root);
    warnings.extend(warning);
    let (formatter, warning) = formatter(opts.format);
    warnings.extend(warning);

    let renderer = Renderer::new(opts.templates);
    let scaffolder = Scaffolder::new(opts.root, &renderer, formatter.as_ref())
        .with_project(project)
        .with_wire(opts.wire);

    let outcomes = kinds
        .iter()
        .map(|kind| scaffolder.create(*kind, name))
        .collect::<Result<Vec<_>>>()?;

    Ok(ScaffoldReport { warnings, outcomes })
}
