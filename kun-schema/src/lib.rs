//! Database schema introspection for kun.
//!
//! [`SchemaSource`] is the seam between the generator and a live database.
//! [`Database`] implements it over sqlx for MySQL, PostgreSQL and SQLite;
//! [`StaticSchema`] is an in-memory implementation for tests.

mod column;
mod database;
mod dialect;
mod error;
mod introspect;
#[cfg(any(test, feature = "testing"))]
mod memory;
mod scan;

pub use column::{Column, ColumnIndex, Index};
pub use database::Database;
pub use dialect::{Dialect, Dsn};
pub use error::{Error, Result};
pub use introspect::{Introspection, SchemaSource, attach_indexes, introspect};
#[cfg(any(test, feature = "testing"))]
pub use memory::StaticSchema;
pub use scan::{ScanKind, ScanType};
