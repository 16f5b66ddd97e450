use std::error::Error as _;

use tracing::{debug, warn};

use crate::{Column, ColumnIndex, Dialect, Index, Result};

/// A database the generator can read structure from.
pub trait SchemaSource {
    fn dialect(&self) -> Dialect;

    /// All base tables, sorted by name.
    fn tables(&self) -> Result<Vec<String>>;

    /// Columns of `table` in declaration order; empty when the table is unknown.
    fn columns(&self, table: &str) -> Result<Vec<Column>>;

    /// Indexes of `table`, including the primary key.
    fn indexes(&self, table: &str) -> Result<Vec<Index>>;
}

/// Columns of one table, ready for the metadata builder.
#[derive(Debug, Clone, Default)]
pub struct Introspection {
    pub columns: Vec<Column>,
    /// Non-fatal problems, e.g. indexes that could not be read.
    pub warnings: Vec<String>,
}

/// Read the columns of `table` and, when `with_indexes` is set, attach the
/// indexes covering each column.
///
/// Failing to read columns is an error. Failing to read indexes is only a
/// warning: the columns come back without index information.
pub fn introspect<S: SchemaSource + ?Sized>(
    source: &S,
    table: &str,
    with_indexes: bool,
) -> Result<Introspection> {
    let mut columns = source.columns(table)?;
    let prefers_scan_type = source.dialect().prefers_scan_type();
    for column in &mut columns {
        column.use_scan_type = prefers_scan_type && column.scan_type.is_some();
    }
    debug!(table, columns = columns.len(), "read columns");

    let mut warnings = Vec::new();
    if with_indexes && !columns.is_empty() {
        match source.indexes(table) {
            Ok(indexes) => attach_indexes(&mut columns, &indexes),
            Err(e) => {
                let reason = e.source().map(|s| format!("{e}: {s}")).unwrap_or_else(|| e.to_string());
                warn!(table, %reason, "continuing without index tags");
                warnings.push(format!("GetIndexes for {table} error: {reason}"));
            }
        }
    }

    Ok(Introspection { columns, warnings })
}

/// Attach every index to the columns it covers, with the column's 1-based
/// position in the index as priority.
pub fn attach_indexes(columns: &mut [Column], indexes: &[Index]) {
    for index in indexes {
        for column in columns.iter_mut() {
            if let Some(priority) = index.priority_of(&column.name) {
                column.indexes.push(ColumnIndex {
                    name: index.name.clone(),
                    unique: index.unique,
                    primary_key: index.primary_key,
                    priority,
                });
            }
        }
    }
}
