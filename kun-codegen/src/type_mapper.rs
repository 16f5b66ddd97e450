//! SQL type to Go type resolution.

pub const GO_BOOL: &str = "bool";
pub const GO_INT32: &str = "int32";
pub const GO_INT64: &str = "int64";
pub const GO_FLOAT64: &str = "float64";
pub const GO_STRING: &str = "string";
pub const GO_BYTES: &str = "[]byte";
pub const GO_BITS: &str = "[]uint8";
pub const GO_TIME: &str = "time.Time";
/// GORM's soft-delete column type.
pub const GO_SOFT_DELETE: &str = "gorm.DeletedAt";

/// Go type for a column, from the driver's type name and the declared type.
///
/// Lookup is case-insensitive and never fails: unknown types map to `string`.
pub fn resolve(database_type: &str, detail: &str) -> &'static str {
    match database_type.to_lowercase().as_str() {
        "numeric" | "integer" | "int" | "smallint" | "mediumint" | "bigint" | "year" => GO_INT64,
        "float" | "real" | "double" | "decimal" => GO_FLOAT64,
        "char" | "varchar" | "tinytext" | "mediumtext" | "longtext" | "text" | "json" | "enum" => {
            GO_STRING
        }
        "binary" | "varbinary" | "tinyblob" | "blob" | "mediumblob" | "longblob" => GO_BYTES,
        "time" | "date" | "datetime" | "timestamp" => GO_TIME,
        "bit" => GO_BITS,
        "boolean" => GO_BOOL,
        "tinyint" => {
            if detail.trim().to_lowercase().starts_with("tinyint(1)") {
                GO_BOOL
            } else {
                GO_INT32
            }
        }
        _ => GO_STRING,
    }
}
