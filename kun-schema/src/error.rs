use miette::Diagnostic;
use thiserror::Error;

use crate::Dialect;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    #[error("dsn cannot be empty")]
    #[diagnostic(code(kun::schema::empty_dsn))]
    EmptyDsn,

    #[error("unsupported data source '{scheme}'")]
    #[diagnostic(
        code(kun::schema::unsupported_dsn),
        help("use a mysql://, postgres:// or sqlite: url, a user:pass@tcp(host:port)/db dsn, or pass --dialect")
    )]
    UnsupportedDsn { scheme: String },

    #[error("failed to connect to {dialect} database")]
    #[diagnostic(code(kun::schema::connect))]
    Connect {
        dialect: Dialect,
        #[source]
        source: sqlx::Error,
    },

    #[error("failed to read {what} of table '{table}'")]
    #[diagnostic(code(kun::schema::query))]
    Query {
        what: &'static str,
        table: String,
        #[source]
        source: sqlx::Error,
    },

    #[error("failed to list tables")]
    #[diagnostic(code(kun::schema::list_tables))]
    ListTables {
        #[source]
        source: sqlx::Error,
    },

    #[error("failed to start the database runtime")]
    #[diagnostic(code(kun::schema::runtime))]
    Runtime(#[source] std::io::Error),
}
