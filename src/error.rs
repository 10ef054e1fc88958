//! Error type shared by the readers, writers and the conversion driver.

/// Broad category of a [`ConvertError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The input file does not look like what the reader expects
    /// (header signature mismatch, missing required token).
    MalformedInput,
    /// The file system refused: missing input, existing output directory,
    /// failed write.
    Environment,
    /// The requested (input, output) format pair has no reader or writer.
    Unsupported,
}

#[derive(Debug, Clone)]
pub struct ConvertError {
    pub kind: ErrorKind,
    pub message: String,
}

impl ConvertError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self { kind, message: message.into() }
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::MalformedInput, message)
    }

    pub fn environment(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Environment, message)
    }

    pub fn unsupported(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unsupported, message)
    }
}

impl std::fmt::Display for ConvertError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ConvertError {}

impl From<std::io::Error> for ConvertError {
    fn from(error: std::io::Error) -> Self {
        Self::environment(format!("IO Error: {error}"))
    }
}

/// Attach the offending path to an I/O error.
pub(crate) fn io_error(path: &std::path::Path, error: std::io::Error) -> ConvertError {
    ConvertError::environment(format!("{}: {error}", path.display()))
}
