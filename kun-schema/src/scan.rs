/// Broad classification of a Go type, used by default-value policies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScanKind {
    Bool,
    Int,
    Uint,
    Float,
    String,
    Bytes,
    /// Structured values such as `time.Time`.
    Struct,
    Other,
}

impl ScanKind {
    /// Classify a Go type name (`*T` is classified as `T`).
    pub fn of_go_type(go_type: &str) -> Self {
        match go_type.trim_start_matches('*') {
            "bool" => ScanKind::Bool,
            "int" | "int8" | "int16" | "int32" | "int64" => ScanKind::Int,
            "uint" | "uint8" | "uint16" | "uint32" | "uint64" => ScanKind::Uint,
            "float32" | "float64" => ScanKind::Float,
            "string" => ScanKind::String,
            "[]byte" | "[]uint8" => ScanKind::Bytes,
            "time.Time" => ScanKind::Struct,
            _ => ScanKind::Other,
        }
    }

    pub fn is_numeric(self) -> bool {
        matches!(self, ScanKind::Int | ScanKind::Uint | ScanKind::Float)
    }
}

/// The Go type a driver would naturally scan a column into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanType {
    pub name: String,
    pub kind: ScanKind,
}

impl ScanType {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let kind = ScanKind::of_go_type(&name);
        Self { name, kind }
    }
}
