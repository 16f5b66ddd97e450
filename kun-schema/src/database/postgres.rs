use sqlx::{PgPool, Row};

use super::group_indexes;
use crate::{Column, Index, ScanType};

pub(super) async fn tables(pool: &PgPool) -> sqlx::Result<Vec<String>> {
    sqlx::query_scalar(
        "SELECT table_name::text FROM information_schema.tables \
         WHERE table_schema = current_schema() AND table_type = 'BASE TABLE' \
         ORDER BY table_name",
    )
    .fetch_all(pool)
    .await
}

pub(super) async fn columns(pool: &PgPool, table: &str) -> sqlx::Result<Vec<Column>> {
    let rows = sqlx::query(
        "SELECT c.column_name::text AS column_name, \
                c.data_type::text AS data_type, \
                c.udt_name::text AS udt_name, \
                c.character_maximum_length::int4 AS char_length, \
                c.numeric_precision::int4 AS numeric_precision, \
                c.numeric_scale::int4 AS numeric_scale, \
                c.is_nullable::text AS is_nullable, \
                c.column_default::text AS column_default, \
                c.is_identity::text AS is_identity, \
                col_description( \
                    (quote_ident(c.table_schema) || '.' || quote_ident(c.table_name))::regclass, \
                    c.ordinal_position::int \
                ) AS column_comment, \
                EXISTS ( \
                    SELECT 1 FROM information_schema.table_constraints tc \
                    JOIN information_schema.key_column_usage kcu \
                      ON tc.constraint_name = kcu.constraint_name \
                     AND tc.table_schema = kcu.table_schema \
                     AND tc.table_name = kcu.table_name \
                    WHERE tc.constraint_type = 'PRIMARY KEY' \
                      AND tc.table_schema = c.table_schema \
                      AND tc.table_name = c.table_name \
                      AND kcu.column_name = c.column_name \
                ) AS is_primary \
         FROM information_schema.columns c \
         WHERE c.table_schema = current_schema() AND c.table_name = $1 \
         ORDER BY c.ordinal_position",
    )
    .bind(table)
    .fetch_all(pool)
    .await?;

    rows.iter()
        .map(|row| -> sqlx::Result<Column> {
            let udt: String = row.try_get("udt_name")?;
            let nullable: String = row.try_get("is_nullable")?;
            let identity: Option<String> = row.try_get("is_identity")?;
            let raw_default: Option<String> = row.try_get("column_default")?;
            let (default, serial) = normalize_default(raw_default);
            let column_type = declared_type(
                &udt,
                row.try_get("char_length")?,
                row.try_get("numeric_precision")?,
                row.try_get("numeric_scale")?,
            );

            Ok(Column {
                table: table.to_string(),
                name: row.try_get("column_name")?,
                database_type: row.try_get("data_type")?,
                column_type,
                nullable: nullable == "YES",
                default,
                primary_key: row.try_get("is_primary")?,
                auto_increment: serial || identity.as_deref() == Some("YES"),
                comment: row
                    .try_get::<Option<String>, _>("column_comment")?
                    .unwrap_or_default(),
                scan_type: Some(ScanType::new(scan_type(&udt))),
                use_scan_type: false,
                indexes: Vec::new(),
            })
        })
        .collect()
}

pub(super) async fn indexes(pool: &PgPool, table: &str) -> sqlx::Result<Vec<Index>> {
    let rows = sqlx::query(
        "SELECT i.relname::text AS index_name, \
                a.attname::text AS column_name, \
                ix.indisunique AS is_unique, \
                ix.indisprimary AS is_primary \
         FROM pg_class t \
         JOIN pg_namespace n ON n.oid = t.relnamespace \
         JOIN pg_index ix ON t.oid = ix.indrelid \
         JOIN pg_class i ON i.oid = ix.indexrelid \
         JOIN LATERAL unnest(ix.indkey) WITH ORDINALITY AS k(attnum, ordinality) ON true \
         JOIN pg_attribute a ON a.attrelid = t.oid AND a.attnum = k.attnum \
         WHERE t.relname = $1 AND n.nspname = current_schema() \
         ORDER BY i.relname, k.ordinality",
    )
    .bind(table)
    .fetch_all(pool)
    .await?;

    let rows = rows
        .iter()
        .map(|row| -> sqlx::Result<(String, String, bool, bool)> {
            Ok((
                row.try_get("index_name")?,
                row.try_get("column_name")?,
                row.try_get("is_unique")?,
                row.try_get("is_primary")?,
            ))
        })
        .collect::<sqlx::Result<Vec<_>>>()?;
    Ok(group_indexes(rows))
}

/// Strip `::type` casts and quotes; a `nextval(...)` default marks a serial column.
fn normalize_default(raw: Option<String>) -> (Option<String>, bool) {
    let Some(raw) = raw else {
        return (None, false);
    };
    if raw.starts_with("nextval(") {
        return (None, true);
    }
    let value = match raw.rfind("::") {
        Some(cast) if !raw[cast..].contains('\'') => &raw[..cast],
        _ => raw.as_str(),
    };
    let value = value
        .strip_prefix('\'')
        .and_then(|v| v.strip_suffix('\''))
        .unwrap_or(value);
    (Some(value.to_string()), false)
}

fn declared_type(
    udt: &str,
    char_length: Option<i32>,
    precision: Option<i32>,
    scale: Option<i32>,
) -> String {
    match (udt, char_length, precision, scale) {
        (_, Some(len), _, _) => format!("{udt}({len})"),
        ("numeric", _, Some(p), Some(s)) => format!("numeric({p},{s})"),
        _ => udt.to_string(),
    }
}

/// Go type the pgx driver scans a `udt_name` into.
fn scan_type(udt: &str) -> &'static str {
    match udt {
        "int8" => "int64",
        "int4" => "int32",
        "int2" => "int16",
        "float4" => "float32",
        "float8" | "numeric" => "float64",
        "bool" => "bool",
        "bytea" => "[]uint8",
        "date" | "time" | "timetz" | "timestamp" | "timestamptz" => "time.Time",
        _ => "string",
    }
}
