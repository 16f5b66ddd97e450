use crate::ScanType;

/// One reflected column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub table: String,
    pub name: String,
    /// Type name as reported by the driver, e.g. `VARCHAR`.
    pub database_type: String,
    /// Full declared type, e.g. `varchar(64)` or `int(10) unsigned`.
    pub column_type: String,
    pub nullable: bool,
    /// `None` when the column has no default.
    pub default: Option<String>,
    pub primary_key: bool,
    pub auto_increment: bool,
    pub comment: String,
    pub scan_type: Option<ScanType>,
    /// Whether the dialect prefers `scan_type` over the generic mapping.
    pub use_scan_type: bool,
    pub indexes: Vec<ColumnIndex>,
}

impl Column {
    /// A nullable column without default whose declared type equals `database_type`.
    pub fn new(
        table: impl Into<String>,
        name: impl Into<String>,
        database_type: impl Into<String>,
    ) -> Self {
        let database_type = database_type.into();
        Self {
            table: table.into(),
            name: name.into(),
            column_type: database_type.to_lowercase(),
            database_type,
            nullable: true,
            default: None,
            primary_key: false,
            auto_increment: false,
            comment: String::new(),
            scan_type: None,
            use_scan_type: false,
            indexes: Vec::new(),
        }
    }

    pub fn declared_type(mut self, column_type: impl Into<String>) -> Self {
        self.column_type = column_type.into();
        self
    }

    pub fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self.nullable = false;
        self
    }

    pub fn auto_increment(mut self) -> Self {
        self.auto_increment = true;
        self
    }

    pub fn default_value(mut self, value: impl Into<String>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = comment.into();
        self
    }

    pub fn scan_type(mut self, scan_type: ScanType) -> Self {
        self.scan_type = Some(scan_type);
        self
    }
}

/// One index as stored in the database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Index {
    pub name: String,
    pub unique: bool,
    pub primary_key: bool,
    /// Member columns in key order.
    pub columns: Vec<String>,
}

impl Index {
    pub fn new(name: impl Into<String>, columns: &[&str]) -> Self {
        Self {
            name: name.into(),
            unique: false,
            primary_key: false,
            columns: columns.iter().map(|c| c.to_string()).collect(),
        }
    }

    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    pub fn primary(mut self) -> Self {
        self.primary_key = true;
        self.unique = true;
        self
    }

    /// 1-based position of `column` in this index.
    pub fn priority_of(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == column).map(|i| i + 1)
    }
}

/// An index as seen from one of its member columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnIndex {
    pub name: String,
    pub unique: bool,
    pub primary_key: bool,
    pub priority: usize,
}
