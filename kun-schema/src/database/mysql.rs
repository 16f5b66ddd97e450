use sqlx::{MySqlPool, Row};

use super::group_indexes;
use crate::{Column, Index};

pub(super) async fn tables(pool: &MySqlPool) -> sqlx::Result<Vec<String>> {
    sqlx::query_scalar(
        "SELECT CAST(TABLE_NAME AS CHAR) FROM information_schema.TABLES \
         WHERE TABLE_SCHEMA = DATABASE() AND TABLE_TYPE = 'BASE TABLE' \
         ORDER BY TABLE_NAME",
    )
    .fetch_all(pool)
    .await
}

pub(super) async fn columns(pool: &MySqlPool, table: &str) -> sqlx::Result<Vec<Column>> {
    let rows = sqlx::query(
        "SELECT CAST(COLUMN_NAME AS CHAR) AS column_name, \
                CAST(DATA_TYPE AS CHAR) AS data_type, \
                CAST(COLUMN_TYPE AS CHAR) AS column_type, \
                CAST(IS_NULLABLE AS CHAR) AS is_nullable, \
                CAST(COLUMN_DEFAULT AS CHAR) AS column_default, \
                CAST(COLUMN_KEY AS CHAR) AS column_key, \
                CAST(EXTRA AS CHAR) AS extra, \
                CAST(COLUMN_COMMENT AS CHAR) AS column_comment \
         FROM information_schema.COLUMNS \
         WHERE TABLE_SCHEMA = DATABASE() AND TABLE_NAME = ? \
         ORDER BY ORDINAL_POSITION",
    )
    .bind(table)
    .fetch_all(pool)
    .await?;

    rows.iter()
        .map(|row| -> sqlx::Result<Column> {
            let extra: String = row.try_get("extra")?;
            let key: String = row.try_get("column_key")?;
            let nullable: String = row.try_get("is_nullable")?;
            Ok(Column {
                table: table.to_string(),
                name: row.try_get("column_name")?,
                database_type: row.try_get::<String, _>("data_type")?.to_uppercase(),
                column_type: row.try_get("column_type")?,
                nullable: nullable.eq_ignore_ascii_case("YES"),
                default: row.try_get("column_default")?,
                primary_key: key == "PRI",
                auto_increment: extra.to_lowercase().contains("auto_increment"),
                comment: row.try_get("column_comment")?,
                scan_type: None,
                use_scan_type: false,
                indexes: Vec::new(),
            })
        })
        .collect()
}

pub(super) async fn indexes(pool: &MySqlPool, table: &str) -> sqlx::Result<Vec<Index>> {
    let rows = sqlx::query(
        "SELECT CAST(INDEX_NAME AS CHAR) AS index_name, \
                CAST(COLUMN_NAME AS CHAR) AS column_name, \
                CAST(NON_UNIQUE AS SIGNED) AS non_unique \
         FROM information_schema.STATISTICS \
         WHERE TABLE_SCHEMA = DATABASE() AND TABLE_NAME = ? \
         ORDER BY INDEX_NAME, SEQ_IN_INDEX",
    )
    .bind(table)
    .fetch_all(pool)
    .await?;

    let mut entries = Vec::with_capacity(rows.len());
    for row in &rows {
        // functional key parts have no column
        let Some(column) = row.try_get::<Option<String>, _>("column_name")? else {
            continue;
        };
        let name: String = row.try_get("index_name")?;
        let non_unique: i64 = row.try_get("non_unique")?;
        let primary_key = name == "PRIMARY";
        entries.push((name, column, non_unique == 0, primary_key));
    }
    Ok(group_indexes(entries))
}
