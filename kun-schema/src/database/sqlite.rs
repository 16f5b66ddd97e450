use sqlx::{Row, SqlitePool};

use super::{base_type, group_indexes};
use crate::{Column, Index};

pub(super) async fn tables(pool: &SqlitePool) -> sqlx::Result<Vec<String>> {
    sqlx::query_scalar(
        "SELECT name FROM sqlite_master \
         WHERE type = 'table' AND name NOT LIKE 'sqlite_%' \
         ORDER BY name",
    )
    .fetch_all(pool)
    .await
}

fn quote(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

pub(super) async fn columns(pool: &SqlitePool, table: &str) -> sqlx::Result<Vec<Column>> {
    let rows = sqlx::query(&format!("PRAGMA table_info({})", quote(table)))
        .fetch_all(pool)
        .await?;

    let primary_keys = rows
        .iter()
        .map(|row| row.try_get::<i64, _>("pk"))
        .collect::<sqlx::Result<Vec<_>>>()?
        .into_iter()
        .filter(|pk| *pk > 0)
        .count();

    rows.iter()
        .map(|row| -> sqlx::Result<Column> {
            let declared: String = row.try_get("type")?;
            let not_null: i64 = row.try_get("notnull")?;
            let pk: i64 = row.try_get("pk")?;
            let default: Option<String> = row.try_get("dflt_value")?;
            let database_type = base_type(&declared).to_uppercase();
            let primary_key = pk > 0;

            Ok(Column {
                table: table.to_string(),
                name: row.try_get("name")?,
                auto_increment: primary_key
                    && primary_keys == 1
                    && database_type.eq_ignore_ascii_case("INTEGER"),
                database_type,
                column_type: declared.to_lowercase(),
                nullable: not_null == 0 && !primary_key,
                default: default.map(|d| unquote(&d)),
                primary_key,
                comment: String::new(),
                scan_type: None,
                use_scan_type: false,
                indexes: Vec::new(),
            })
        })
        .collect()
}

pub(super) async fn indexes(pool: &SqlitePool, table: &str) -> sqlx::Result<Vec<Index>> {
    let list = sqlx::query(&format!("PRAGMA index_list({})", quote(table)))
        .fetch_all(pool)
        .await?;

    let mut entries = Vec::new();
    for row in &list {
        let name: String = row.try_get("name")?;
        let unique: i64 = row.try_get("unique")?;
        let origin: String = row.try_get("origin")?;
        let info = sqlx::query(&format!("PRAGMA index_info({})", quote(&name)))
            .fetch_all(pool)
            .await?;
        for key in &info {
            // expression key parts report a NULL name
            if let Some(column) = key.try_get::<Option<String>, _>("name")? {
                entries.push((name.clone(), column, unique != 0, origin == "pk"));
            }
        }
    }
    Ok(group_indexes(entries))
}

fn unquote(value: &str) -> String {
    for quote in ['\'', '"'] {
        if let Some(inner) = value
            .strip_prefix(quote)
            .and_then(|v| v.strip_suffix(quote))
        {
            return inner.to_string();
        }
    }
    value.to_string()
}
