//! Per-table structure derived from introspected columns.

use kun_core::{
    IdCasing, NamingStrategy,
    case::{is_word, lower_first},
};
use kun_schema::{Column, ScanKind, SchemaSource, introspect};
use serde::Serialize;

use crate::{
    Error, Result,
    type_mapper::{self, GO_INT64, GO_SOFT_DELETE, GO_TIME},
};

/// How columns become Go fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldOptions {
    /// Wrap nullable columns in a pointer.
    pub nullable: bool,
    /// Wrap columns with a non-trivial default in a pointer, so a zero value
    /// can still be written.
    pub coverable: bool,
    /// Use `uint*` for unsigned integer columns.
    pub signable: bool,
    pub with_index_tag: bool,
    pub with_type_tag: bool,
    pub id_casing: IdCasing,
}

impl Default for FieldOptions {
    fn default() -> Self {
        Self {
            nullable: true,
            coverable: false,
            signable: false,
            with_index_tag: true,
            with_type_tag: true,
            id_casing: IdCasing::Legacy,
        }
    }
}

/// One generated struct field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Field {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
    pub column: String,
    pub gorm_tag: String,
    pub json_tag: String,
    pub comment: String,
    pub is_primary_key: bool,
}

impl Field {
    /// Struct tag body: `gorm:"..." json:"..."`.
    pub fn tags(&self) -> String {
        let mut parts = Vec::with_capacity(2);
        if !self.gorm_tag.is_empty() {
            parts.push(format!("gorm:\"{}\"", self.gorm_tag));
        }
        if !self.json_tag.is_empty() {
            parts.push(format!("json:\"{}\"", self.json_tag));
        }
        parts.join(" ")
    }

    /// Trailing `// comment`, empty when the column has none.
    pub fn comment_line(&self) -> String {
        if self.comment.is_empty() {
            String::new()
        } else {
            format!("// {}", self.comment.replace(['\r', '\n'], " "))
        }
    }
}

/// One generated model, derived from one table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructMeta {
    /// Base name of the generated files.
    pub file_name: String,
    pub interface_name: String,
    pub struct_name: String,
    pub table_name: String,
    pub package_name: String,
    pub primary_key_type: String,
    pub fields: Vec<Field>,
}

impl StructMeta {
    pub fn struct_comment(&self) -> String {
        if self.table_name.is_empty() {
            "mapped from object".to_string()
        } else {
            format!("mapped from table <{}>", self.table_name)
        }
    }

    pub fn primary_key(&self) -> Option<&Field> {
        self.fields.iter().find(|f| f.is_primary_key)
    }
}

/// `Ok(false)` for an empty name (skip the table), `Ok(true)` for a usable one.
pub fn check_struct_name(table: &str, name: &str) -> Result<bool> {
    if name.is_empty() {
        return Ok(false);
    }
    if !is_word(name) || !name.starts_with(|c: char| c.is_ascii_uppercase()) {
        return Err(Error::InvalidStructName {
            table: table.to_string(),
            name: name.to_string(),
        });
    }
    Ok(true)
}

/// Default value as written into the `default:` tag.
fn default_tag_value(column: &Column) -> String {
    match column.default.as_deref() {
        None => String::new(),
        Some(value) if !value.is_empty() && value.trim().is_empty() => format!("'{value}'"),
        Some(value) => value.to_string(),
    }
}

/// Whether a default is worth declaring, given the column's scan kind.
fn needs_default_tag(column: &Column, kind: ScanKind, value: &str) -> bool {
    if value.is_empty() {
        return false;
    }
    match kind {
        ScanKind::Bool => value != "false",
        kind if kind.is_numeric() => value != "0",
        ScanKind::String => true,
        ScanKind::Struct => !value.trim_matches(['\'', '0', ':', '-', ' ']).is_empty(),
        _ => !column.name.eq_ignore_ascii_case("created_at")
            && !column.name.eq_ignore_ascii_case("updated_at"),
    }
}

/// Kind of value the driver scans `column` into.
///
/// MySQL reads `tinyint`, `tinyint(1)` included, as an 8-bit integer.
fn scan_kind(column: &Column, base: &str) -> ScanKind {
    match &column.scan_type {
        Some(scan) => scan.kind,
        None if column.database_type.eq_ignore_ascii_case("tinyint") => ScanKind::Int,
        None => ScanKind::of_go_type(base),
    }
}

/// Go type of `column` before any pointer wrapping.
fn base_type(column: &Column, options: &FieldOptions) -> String {
    let ty = match &column.scan_type {
        Some(scan) if column.use_scan_type => scan.name.clone(),
        _ => type_mapper::resolve(&column.database_type, &column.column_type).to_string(),
    };
    if options.signable && column.column_type.contains("unsigned") && ty.starts_with("int") {
        format!("u{ty}")
    } else {
        ty
    }
}

fn gorm_tag(column: &Column, options: &FieldOptions, default: Option<&str>) -> String {
    let mut tag = format!("column:{}", column.name);
    if options.with_type_tag {
        tag.push_str(";type:");
        tag.push_str(&column.column_type);
    }

    if column.primary_key {
        tag.push_str(";primaryKey");
        tag.push_str(&format!(";autoIncrement:{}", column.auto_increment));
    } else if !column.nullable {
        tag.push_str(";not null");
    }

    if options.with_index_tag {
        for index in column.indexes.iter().filter(|i| !i.primary_key) {
            let kind = if index.unique { "uniqueIndex" } else { "index" };
            tag.push_str(&format!(";{kind}:{},priority:{}", index.name, index.priority));
        }
    }

    if let Some(value) = default {
        tag.push_str(&format!(";default:{value}"));
    }
    tag
}

/// Derive the field for one column.
pub fn to_field(column: &Column, naming: &dyn NamingStrategy, options: &FieldOptions) -> Field {
    let base = base_type(column, options);
    let kind = scan_kind(column, &base);
    let default_value = default_tag_value(column);
    let has_default = needs_default_tag(column, kind, &default_value);

    let ty = if column.name == "deleted_at" && base == GO_TIME {
        GO_SOFT_DELETE.to_string()
    } else if (options.coverable && has_default) || (options.nullable && column.nullable) {
        format!("*{base}")
    } else {
        base
    };

    let tag_default = (has_default && !column.primary_key).then_some(default_value.as_str());
    let name = options.id_casing.apply(&naming.field_name(&column.name));

    Field {
        json_tag: lower_first(&name),
        name,
        ty,
        column: column.name.clone(),
        gorm_tag: gorm_tag(column, options, tag_default),
        comment: column.comment.clone(),
        is_primary_key: column.primary_key,
    }
}

/// Assemble a [`StructMeta`] from already introspected columns.
///
/// `Ok(None)` when there is nothing to generate (empty struct name or no columns).
pub fn build_struct_meta(
    table: &str,
    struct_name: &str,
    package_name: &str,
    columns: &[Column],
    naming: &dyn NamingStrategy,
    options: &FieldOptions,
) -> Result<Option<StructMeta>> {
    if !check_struct_name(table, struct_name)? || columns.is_empty() {
        return Ok(None);
    }

    let fields: Vec<Field> = columns
        .iter()
        .map(|column| to_field(column, naming, options))
        .collect();
    let primary_key_type = fields
        .iter()
        .find(|f| f.is_primary_key)
        .map_or_else(|| GO_INT64.to_string(), |f| f.ty.clone());
    let file_name = lower_first(struct_name);

    Ok(Some(StructMeta {
        interface_name: file_name.clone(),
        file_name,
        struct_name: struct_name.to_string(),
        table_name: table.to_string(),
        package_name: package_name.to_string(),
        primary_key_type,
        fields,
    }))
}

/// A table turned into metadata, plus non-fatal findings along the way.
#[derive(Debug, Clone, Default)]
pub struct Built {
    pub meta: Option<StructMeta>,
    pub warnings: Vec<String>,
}

/// Builds [`StructMeta`]s straight from a schema source.
pub struct MetaBuilder<'a, S: ?Sized> {
    source: &'a S,
    naming: &'a dyn NamingStrategy,
    options: FieldOptions,
    package_name: String,
}

impl<'a, S: SchemaSource + ?Sized> MetaBuilder<'a, S> {
    pub fn new(
        source: &'a S,
        naming: &'a dyn NamingStrategy,
        options: FieldOptions,
        package_name: impl Into<String>,
    ) -> Self {
        Self {
            source,
            naming,
            options,
            package_name: package_name.into(),
        }
    }

    /// Validate the name, introspect `table` and derive its fields.
    pub fn build(&self, table: &str, struct_name: &str) -> Result<Built> {
        if !check_struct_name(table, struct_name)? {
            return Ok(Built::default());
        }
        let introspection = introspect(self.source, table, self.options.with_index_tag)?;
        let meta = build_struct_meta(
            table,
            struct_name,
            &self.package_name,
            &introspection.columns,
            self.naming,
            &self.options,
        )?;
        Ok(Built {
            meta,
            warnings: introspection.warnings,
        })
    }
}

#[cfg(test)]
mod tests {
    use kun_core::GormNaming;
    use kun_schema::{Dialect, Index, ScanType, StaticSchema};

    use super::*;

    fn field(column: Column, options: FieldOptions) -> Field {
        to_field(&column, &GormNaming::default(), &options)
    }

    fn coverable() -> FieldOptions {
        FieldOptions {
            coverable: true,
            nullable: false,
            ..FieldOptions::default()
        }
    }

    #[test]
    fn test_check_struct_name() {
        assert!(check_struct_name("users", "User").unwrap());
        assert!(!check_struct_name("users", "").unwrap());
        assert!(matches!(
            check_struct_name("users", "user"),
            Err(Error::InvalidStructName { .. })
        ));
        assert!(check_struct_name("users", "User-1").is_err());
    }

    #[test]
    fn test_bool_default_triviality() {
        let flag = |default: &str| {
            Column::new("t", "enabled", "boolean")
                .not_null()
                .default_value(default)
        };
        assert_eq!(field(flag("false"), coverable()).ty, "bool");
        assert_eq!(field(flag("true"), coverable()).ty, "*bool");
    }

    #[test]
    fn test_tinyint_bool_default_is_an_integer() {
        let flag = |default: &str| {
            Column::new("t", "is_admin", "tinyint")
                .declared_type("tinyint(1)")
                .not_null()
                .default_value(default)
        };

        let zero = field(flag("0"), coverable());
        assert_eq!(zero.ty, "bool");
        assert_eq!(zero.gorm_tag, "column:is_admin;type:tinyint(1);not null");

        let one = field(flag("1"), coverable());
        assert_eq!(one.ty, "*bool");
        assert!(one.gorm_tag.ends_with(";default:1"));
    }

    #[test]
    fn test_driver_scan_kind_decides_default() {
        let flag = |default: &str| {
            let mut column = Column::new("t", "active", "bool")
                .not_null()
                .default_value(default)
                .scan_type(ScanType::new("bool"));
            column.use_scan_type = true;
            column
        };

        let off = field(flag("false"), coverable());
        assert_eq!(off.ty, "bool");
        assert!(!off.gorm_tag.contains("default"));
        assert_eq!(field(flag("true"), coverable()).ty, "*bool");
    }

    #[test]
    fn test_int_default_triviality() {
        let count = |default: &str| {
            Column::new("t", "count", "int")
                .not_null()
                .default_value(default)
        };
        let zero = field(count("0"), coverable());
        assert_eq!(zero.ty, "int64");
        assert!(!zero.gorm_tag.contains("default"));

        let five = field(count("5"), coverable());
        assert_eq!(five.ty, "*int64");
        assert!(five.gorm_tag.ends_with(";default:5"));
    }

    #[test]
    fn test_struct_default_trims_zero_dates() {
        let at = |default: &str| {
            Column::new("t", "published_at", "datetime")
                .not_null()
                .default_value(default)
        };
        assert_eq!(field(at("'0000-00-00 00:00:00'"), coverable()).ty, "time.Time");
        assert_eq!(field(at("CURRENT_TIMESTAMP"), coverable()).ty, "*time.Time");
    }

    #[test]
    fn test_whitespace_default_is_quoted() {
        let column = Column::new("t", "sep", "varchar")
            .not_null()
            .default_value(" ");
        let f = field(column, coverable());
        assert_eq!(f.ty, "*string");
        assert!(f.gorm_tag.ends_with(";default:' '"));
    }

    #[test]
    fn test_deleted_at_is_soft_delete() {
        let column = Column::new("t", "deleted_at", "datetime");
        let options = FieldOptions {
            coverable: true,
            ..FieldOptions::default()
        };
        assert_eq!(field(column, options).ty, "gorm.DeletedAt");
    }

    #[test]
    fn test_nullable_wrapping() {
        let column = Column::new("t", "nickname", "varchar");
        assert_eq!(field(column.clone(), FieldOptions::default()).ty, "*string");
        let options = FieldOptions {
            nullable: false,
            ..FieldOptions::default()
        };
        assert_eq!(field(column, options).ty, "string");
    }

    #[test]
    fn test_signable() {
        let column = Column::new("t", "views", "int")
            .declared_type("int(10) unsigned")
            .not_null();
        let options = FieldOptions {
            signable: true,
            ..FieldOptions::default()
        };
        assert_eq!(field(column.clone(), options).ty, "uint64");
        assert_eq!(field(column, FieldOptions::default()).ty, "int64");
    }

    #[test]
    fn test_scan_type_preferred_when_enabled() {
        let mut column = Column::new("t", "id", "integer")
            .not_null()
            .scan_type(ScanType::new("int32"));
        assert_eq!(field(column.clone(), FieldOptions::default()).ty, "int64");
        column.use_scan_type = true;
        assert_eq!(field(column, FieldOptions::default()).ty, "int32");
    }

    #[test]
    fn test_gorm_tag_indexes_and_type() {
        let schema = StaticSchema::new(Dialect::Mysql).table(
            "orders",
            vec![Column::new("orders", "sku", "varchar")
                .declared_type("varchar(32)")
                .not_null()],
            vec![
                Index::new("idx_user_sku", &["user_id", "sku"]),
                Index::new("uk_sku", &["sku"]).unique(),
            ],
        );
        let columns = introspect(&schema, "orders", true).unwrap().columns;
        let naming = GormNaming::default();

        let f = to_field(&columns[0], &naming, &FieldOptions::default());
        assert_eq!(
            f.gorm_tag,
            "column:sku;type:varchar(32);not null;index:idx_user_sku,priority:2;uniqueIndex:uk_sku,priority:1"
        );

        let options = FieldOptions {
            with_type_tag: false,
            with_index_tag: false,
            ..FieldOptions::default()
        };
        assert_eq!(to_field(&columns[0], &naming, &options).gorm_tag, "column:sku;not null");
    }

    #[test]
    fn test_primary_key_never_gets_default() {
        let column = Column::new("t", "code", "varchar")
            .primary_key()
            .default_value("x");
        let f = field(column, coverable());
        assert_eq!(f.gorm_tag, "column:code;type:varchar;primaryKey;autoIncrement:false");
    }

    #[test]
    fn test_field_naming_and_json() {
        let column = Column::new("t", "user_id", "bigint").not_null();
        let f = field(column, FieldOptions::default());
        assert_eq!(f.name, "UserId");
        assert_eq!(f.json_tag, "userId");
        assert_eq!(f.tags(), "gorm:\"column:user_id;type:bigint;not null\" json:\"userId\"");
    }

    #[test]
    fn test_plural_column_is_singular_field() {
        let f = field(Column::new("t", "tags", "json"), FieldOptions::default());
        assert_eq!(f.name, "Tag");
        assert_eq!(f.json_tag, "tag");
        assert_eq!(f.column, "tags");

        let f = field(Column::new("t", "user_ids", "json"), FieldOptions::default());
        assert_eq!(f.name, "UserId");
    }

    #[test]
    fn test_json_tag_lowers_first_letter_only() {
        let f = field(Column::new("t", "ip_address", "varchar"), FieldOptions::default());
        assert_eq!(f.name, "IPAddress");
        assert_eq!(f.json_tag, "iPAddress");
    }

    #[test]
    fn test_id_casing_boundary() {
        let column = Column::new("t", "uuid", "char").not_null();
        let legacy = field(column.clone(), FieldOptions::default());
        let boundary = field(
            column,
            FieldOptions {
                id_casing: IdCasing::Boundary,
                ..FieldOptions::default()
            },
        );
        assert_eq!(legacy.name, "UUId");
        assert_eq!(legacy.json_tag, "uUId");
        assert_eq!(boundary.name, "UUID");
        assert_eq!(boundary.json_tag, "uUID");
    }

    #[test]
    fn test_comment_line() {
        let f = field(
            Column::new("t", "name", "varchar").comment("display\nname"),
            FieldOptions::default(),
        );
        assert_eq!(f.comment_line(), "// display name");
        let f = field(Column::new("t", "name", "varchar"), FieldOptions::default());
        assert_eq!(f.comment_line(), "");
    }

    fn users() -> StaticSchema {
        StaticSchema::new(Dialect::Mysql).table(
            "users",
            vec![
                Column::new("users", "id", "bigint")
                    .declared_type("bigint(20)")
                    .primary_key()
                    .auto_increment(),
                Column::new("users", "name", "varchar")
                    .declared_type("varchar(64)")
                    .not_null(),
                Column::new("users", "deleted_at", "datetime"),
            ],
            vec![Index::new("PRIMARY", &["id"]).primary()],
        )
    }

    #[test]
    fn test_users_end_to_end() {
        let schema = users();
        let naming = GormNaming::default();
        let builder = MetaBuilder::new(&schema, &naming, FieldOptions::default(), "db");

        let meta = builder.build("users", "User").unwrap().meta.unwrap();

        assert_eq!(meta.fields.len(), 3);
        assert_eq!(meta.primary_key_type, "int64");
        assert_eq!(meta.file_name, "user");
        assert_eq!(meta.interface_name, "user");
        assert_eq!(meta.struct_comment(), "mapped from table <users>");
        assert_eq!(meta.fields[2].ty, "gorm.DeletedAt");
        let id = meta.primary_key().unwrap();
        assert!(id.gorm_tag.contains("primaryKey"));
        assert!(id.gorm_tag.contains("autoIncrement:true"));
        assert_eq!(meta.fields[1].ty, "string");
    }

    #[test]
    fn test_build_skips_empty_name_and_missing_table() {
        let schema = users();
        let naming = GormNaming::default();
        let builder = MetaBuilder::new(&schema, &naming, FieldOptions::default(), "db");

        assert!(builder.build("users", "").unwrap().meta.is_none());
        assert!(builder.build("ghosts", "Ghost").unwrap().meta.is_none());
        assert!(builder.build("users", "user").is_err());
    }

    #[test]
    fn test_default_primary_key_type() {
        let columns = vec![Column::new("logs", "message", "text")];
        let meta = build_struct_meta(
            "logs",
            "Log",
            "db",
            &columns,
            &GormNaming::default(),
            &FieldOptions::default(),
        )
        .unwrap()
        .unwrap();
        assert_eq!(meta.primary_key_type, "int64");
        assert!(meta.primary_key().is_none());
    }
}
