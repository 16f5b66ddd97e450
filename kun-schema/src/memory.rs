//! In-memory schema source.
//!
//! Only available with the `testing` feature or during tests.

use std::collections::HashSet;

use indexmap::IndexMap;

use crate::{Column, Dialect, Error, Index, Result, SchemaSource};

/// A fixed set of tables held in memory.
#[derive(Debug, Clone)]
pub struct StaticSchema {
    dialect: Dialect,
    tables: IndexMap<String, (Vec<Column>, Vec<Index>)>,
    failing_indexes: HashSet<String>,
}

impl StaticSchema {
    pub fn new(dialect: Dialect) -> Self {
        Self {
            dialect,
            tables: IndexMap::new(),
            failing_indexes: HashSet::new(),
        }
    }

    pub fn table(mut self, name: &str, columns: Vec<Column>, indexes: Vec<Index>) -> Self {
        self.tables.insert(name.to_string(), (columns, indexes));
        self
    }

    /// Make `indexes(table)` fail.
    pub fn fail_indexes(mut self, table: &str) -> Self {
        self.failing_indexes.insert(table.to_string());
        self
    }
}

impl SchemaSource for StaticSchema {
    fn dialect(&self) -> Dialect {
        self.dialect
    }

    fn tables(&self) -> Result<Vec<String>> {
        let mut names: Vec<String> = self.tables.keys().cloned().collect();
        names.sort();
        Ok(names)
    }

    fn columns(&self, table: &str) -> Result<Vec<Column>> {
        Ok(self
            .tables
            .get(table)
            .map(|(columns, _)| columns.clone())
            .unwrap_or_default())
    }

    fn indexes(&self, table: &str) -> Result<Vec<Index>> {
        if self.failing_indexes.contains(table) {
            return Err(Error::Query {
                what: "indexes",
                table: table.to_string(),
                source: sqlx::Error::Protocol("index metadata unavailable".into()),
            });
        }
        Ok(self
            .tables
            .get(table)
            .map(|(_, indexes)| indexes.clone())
            .unwrap_or_default())
    }
}
