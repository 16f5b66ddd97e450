//! GORM repository generation for kun.
//!
//! A run goes table by table: the schema is introspected, each table becomes
//! a [`StructMeta`], and the models are then rendered, formatted and written
//! concurrently before the new constructors are registered in the DI file.
//!
//! # Module Organization
//!
//! - [`type_mapper`] - SQL type to Go type resolution
//! - [`meta`] - Column to field derivation (`StructMeta`, `Field`)
//! - [`context`] - Versioned template contexts
//! - [`templates`] - Embedded and overridable templates
//! - [`format`] - `gofmt`/`goimports` integration
//! - [`pool`] - Bounded worker admission and cancellation
//! - [`emitter`] - Concurrent file emission
//! - [`wiring`] - DI file patching
//! - [`generator`] - The whole run ([`Generator`])
//! - [`scaffold`] - Controller, service, router and cache boilerplate

pub mod context;
pub mod emitter;
mod error;
pub mod format;
pub mod generator;
pub mod meta;
pub mod pool;
pub mod scaffold;
pub mod templates;
pub mod type_mapper;
pub mod wiring;

pub use emitter::{EmittedFile, Emitter, FileAction};
pub use error::{EmitError, Error, Result};
pub use format::{CommandFormatter, Formatter, Passthrough};
pub use generator::{
    GenerateReport, Generator, GeneratorConfig, TableFailure, TableFilter, TableOutcome,
};
pub use meta::{FieldOptions, StructMeta};
pub use scaffold::{ScaffoldAction, ScaffoldKind, ScaffoldName, ScaffoldOutcome, Scaffolder};
pub use templates::{Renderer, TemplateKind, TemplateSource};
pub use wiring::{Insertion, Patch, PatchOutcome, WireError, patch_di, unplaced};
