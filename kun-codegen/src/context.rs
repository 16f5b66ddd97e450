//! Versioned values handed to templates.
//!
//! Templates never see internal structures directly: a [`RenderContext`] or
//! [`ScaffoldContext`] is built and validated first, and that is all a
//! template can reference.

use std::collections::BTreeSet;

use kun_core::case::{is_go_package, is_word};
use serde::Serialize;

use crate::{Error, Result, meta::StructMeta};

/// Bumped whenever a field is renamed or removed.
pub const CONTEXT_VERSION: u32 = 1;

/// Go import paths, deduplicated and sorted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct GoImports(BTreeSet<String>);

impl GoImports {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, path: &str) {
        self.0.insert(path.to_string());
    }

    pub fn contains(&self, path: &str) -> bool {
        self.0.contains(path)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Imports a model with the given field types needs.
    pub fn for_field_types<'a>(types: impl IntoIterator<Item = &'a str>) -> Self {
        let mut imports = Self::new();
        imports.add("context");
        imports.add("gorm.io/gorm");
        for ty in types {
            if ty.contains("time.") {
                imports.add("time");
            }
            if ty.contains("json.RawMessage") {
                imports.add("encoding/json");
            }
        }
        imports
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldContext {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
    pub column: String,
    /// Full struct tag body, e.g. `gorm:"column:id" json:"id"`.
    pub tags: String,
    /// `// comment` or empty.
    pub comment: String,
    pub is_primary_key: bool,
}

/// Everything the repository templates can reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderContext {
    pub version: u32,
    /// Go module path from go.mod, empty when unknown.
    pub project: String,
    pub package: String,
    pub file_name: String,
    pub interface_name: String,
    pub struct_name: String,
    pub table_name: String,
    pub struct_comment: String,
    pub primary_key_type: String,
    /// Go name of the primary key field, `ID` when there is none.
    pub primary_key_field: String,
    /// Column of the primary key, `id` when there is none.
    pub primary_key_column: String,
    pub imports: GoImports,
    pub fields: Vec<FieldContext>,
}

impl RenderContext {
    pub fn new(meta: &StructMeta, project: &str) -> Self {
        let fields: Vec<FieldContext> = meta
            .fields
            .iter()
            .map(|f| FieldContext {
                name: f.name.clone(),
                ty: f.ty.clone(),
                column: f.column.clone(),
                tags: f.tags(),
                comment: f.comment_line(),
                is_primary_key: f.is_primary_key,
            })
            .collect();

        Self {
            version: CONTEXT_VERSION,
            project: project.to_string(),
            package: meta.package_name.clone(),
            file_name: meta.file_name.clone(),
            interface_name: meta.interface_name.clone(),
            struct_name: meta.struct_name.clone(),
            table_name: meta.table_name.clone(),
            struct_comment: meta.struct_comment(),
            primary_key_type: meta.primary_key_type.clone(),
            primary_key_field: meta
                .primary_key()
                .map_or_else(|| "ID".to_string(), |f| f.name.clone()),
            primary_key_column: meta
                .primary_key()
                .map_or_else(|| "id".to_string(), |f| f.column.clone()),
            imports: GoImports::for_field_types(fields.iter().map(|f| f.ty.as_str())),
            fields,
        }
    }

    /// Reject contexts no template could turn into valid Go.
    pub fn validate(&self) -> Result<()> {
        let invalid = |reason: String| Error::InvalidContext {
            struct_name: self.struct_name.clone(),
            reason,
        };

        if !is_word(&self.struct_name) || !self.struct_name.starts_with(|c: char| c.is_ascii_uppercase()) {
            return Err(invalid(format!("'{}' is not an exported Go identifier", self.struct_name)));
        }
        if !is_go_package(&self.package) {
            return Err(invalid(format!("'{}' is not a valid package name", self.package)));
        }
        if self.fields.is_empty() {
            return Err(invalid("no fields".to_string()));
        }
        if let Some(field) = self.fields.iter().find(|f| !is_word(&f.name)) {
            return Err(invalid(format!("field '{}' is not a Go identifier", field.name)));
        }
        Ok(())
    }
}

/// Everything the boilerplate templates can reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScaffoldContext {
    pub version: u32,
    pub project: String,
    /// Go package of the generated file (its directory name).
    pub package: String,
    /// `controller`, `service`, `router` or `cache`.
    pub kind: String,
    /// Name with an upper-case first letter, e.g. `User`.
    pub name: String,
    /// Name with a lower-case first letter, e.g. `user`.
    pub lower_name: String,
    /// First letter of `lower_name`, used as method receiver.
    pub first_char: String,
}

impl ScaffoldContext {
    pub fn validate(&self) -> Result<()> {
        if !is_word(&self.name) || !self.name.starts_with(|c: char| c.is_ascii_uppercase()) {
            return Err(Error::InvalidContext {
                struct_name: self.name.clone(),
                reason: "name must be a Go identifier".to_string(),
            });
        }
        if !is_go_package(&self.package) {
            return Err(Error::InvalidContext {
                struct_name: self.name.clone(),
                reason: format!("'{}' is not a valid package name", self.package),
            });
        }
        Ok(())
    }
}
