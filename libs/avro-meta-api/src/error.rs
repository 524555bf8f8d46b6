/// Category of an attribute store error. Lets the caller decide whether
/// a retry at the transaction layer makes sense.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreErrorKind {
    /// Invalid store configuration; permanent.
    Config,
    /// Store unreachable or I/O failure; transient.
    Io,
    /// Stored data could not be decoded.
    Format,
    /// Logical error (invalid state, generic).
    Logic,
}

impl std::fmt::Display for StoreErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreErrorKind::Config => f.write_str("config"),
            StoreErrorKind::Io => f.write_str("io"),
            StoreErrorKind::Format => f.write_str("format"),
            StoreErrorKind::Logic => f.write_str("logic"),
        }
    }
}

/// Error returned by every `AttributeStore` method.
///
/// `From` impls assign the kind automatically so store implementations
/// can use `?` on std and serde errors.
#[derive(Clone, PartialEq, Eq)]
pub struct StoreError {
    kind: StoreErrorKind,
    message: String,
}

impl StoreError {
    pub fn new(msg: impl Into<String>) -> Self {
        Self { kind: StoreErrorKind::Logic, message: msg.into() }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self { kind: StoreErrorKind::Config, message: msg.into() }
    }

    pub fn io(msg: impl Into<String>) -> Self {
        Self { kind: StoreErrorKind::Io, message: msg.into() }
    }

    pub fn format_err(msg: impl Into<String>) -> Self {
        Self { kind: StoreErrorKind::Format, message: msg.into() }
    }

    pub fn kind(&self) -> StoreErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Debug for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.kind, self.message)
    }
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for StoreError {}

impl From<std::io::Error> for StoreError {
    fn from(e: std::io::Error) -> Self { Self { kind: StoreErrorKind::Io, message: e.to_string() } }
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self { Self { kind: StoreErrorKind::Format, message: e.to_string() } }
}
