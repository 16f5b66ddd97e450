//! sqlx-backed [`SchemaSource`].
//!
//! The generator core is synchronous, so [`Database`] owns a current-thread
//! tokio runtime and blocks on each query.

mod mysql;
mod postgres;
mod sqlite;

use std::future::Future;

use sqlx::{MySql, MySqlPool, PgPool, Postgres, Sqlite, SqlitePool, pool::PoolOptions};
use tokio::runtime::Runtime;
use tracing::debug;

use crate::{Column, Dialect, Dsn, Error, Index, Result, SchemaSource};

enum Pool {
    Mysql(MySqlPool),
    Postgres(PgPool),
    Sqlite(SqlitePool),
}

/// A live database connection.
pub struct Database {
    // dropped before the runtime it was created on
    pool: Pool,
    runtime: Runtime,
}

impl Database {
    pub fn connect(dsn: &Dsn) -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(Error::Runtime)?;

        let dialect = dsn.dialect();
        debug!(%dialect, url = %dsn.redacted(), "connecting");
        let pool = runtime
            .block_on(async {
                match dialect {
                    Dialect::Mysql => PoolOptions::<MySql>::new()
                        .max_connections(1)
                        .connect(dsn.url())
                        .await
                        .map(Pool::Mysql),
                    Dialect::Postgres => PoolOptions::<Postgres>::new()
                        .max_connections(1)
                        .connect(dsn.url())
                        .await
                        .map(Pool::Postgres),
                    Dialect::Sqlite => PoolOptions::<Sqlite>::new()
                        .max_connections(1)
                        .connect(dsn.url())
                        .await
                        .map(Pool::Sqlite),
                }
            })
            .map_err(|source| Error::Connect { dialect, source })?;

        Ok(Self { pool, runtime })
    }

    fn block_on<F: Future>(&self, future: F) -> F::Output {
        self.runtime.block_on(future)
    }
}

impl SchemaSource for Database {
    fn dialect(&self) -> Dialect {
        match self.pool {
            Pool::Mysql(_) => Dialect::Mysql,
            Pool::Postgres(_) => Dialect::Postgres,
            Pool::Sqlite(_) => Dialect::Sqlite,
        }
    }

    fn tables(&self) -> Result<Vec<String>> {
        self.block_on(async {
            match &self.pool {
                Pool::Mysql(pool) => mysql::tables(pool).await,
                Pool::Postgres(pool) => postgres::tables(pool).await,
                Pool::Sqlite(pool) => sqlite::tables(pool).await,
            }
        })
        .map_err(|source| Error::ListTables { source })
    }

    fn columns(&self, table: &str) -> Result<Vec<Column>> {
        self.block_on(async {
            match &self.pool {
                Pool::Mysql(pool) => mysql::columns(pool, table).await,
                Pool::Postgres(pool) => postgres::columns(pool, table).await,
                Pool::Sqlite(pool) => sqlite::columns(pool, table).await,
            }
        })
        .map_err(|source| Error::Query {
            what: "columns",
            table: table.to_string(),
            source,
        })
    }

    fn indexes(&self, table: &str) -> Result<Vec<Index>> {
        self.block_on(async {
            match &self.pool {
                Pool::Mysql(pool) => mysql::indexes(pool, table).await,
                Pool::Postgres(pool) => postgres::indexes(pool, table).await,
                Pool::Sqlite(pool) => sqlite::indexes(pool, table).await,
            }
        })
        .map_err(|source| Error::Query {
            what: "indexes",
            table: table.to_string(),
            source,
        })
    }
}

impl Drop for Database {
    fn drop(&mut self) {
        let pool = &self.pool;
        self.runtime.block_on(async {
            match pool {
                Pool::Mysql(pool) => pool.close().await,
                Pool::Postgres(pool) => pool.close().await,
                Pool::Sqlite(pool) => pool.close().await,
            }
        });
    }
}

/// Group `(index, column, unique, primary)` rows, already in key order, into indexes.
fn group_indexes(rows: impl IntoIterator<Item = (String, String, bool, bool)>) -> Vec<Index> {
    let mut grouped: indexmap::IndexMap<String, Index> = indexmap::IndexMap::new();
    for (name, column, unique, primary_key) in rows {
        grouped
            .entry(name.clone())
            .or_insert_with(|| Index {
                name,
                unique,
                primary_key,
                columns: Vec::new(),
            })
            .columns
            .push(column);
    }
    grouped.into_values().collect()
}

/// Split a declared type like `VARCHAR(64)` into its base name.
fn base_type(declared: &str) -> &str {
    declared
        .split(['(', ' '])
        .next()
        .unwrap_or(declared)
        .trim()
}
