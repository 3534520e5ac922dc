//! Error types for codevec.

use std::fmt;

/// Errors that can occur while building, searching, merging, or persisting an index.
#[derive(Debug)]
pub enum CodevecError {
    /// A vector's length did not match the index's configured dimensionality.
    DimensionMismatch { expected: usize, actual: usize },
    /// A merge source's model id did not match the merger's target model id.
    IncompatibleModel { expected: String, actual: String },
    /// The first four bytes of a stream did not match a known format magic.
    InvalidMagic { found: [u8; 4] },
    /// The stream's format_version is not one this build knows how to read.
    UnsupportedFormatVersion { found: u16, supported: u16 },
    /// A textual search was requested but no `EmbeddingProvider` was configured.
    MissingEmbeddingProvider,
    /// A long-running operation was interrupted cooperatively; work already
    /// applied up to the interruption point is retained.
    Interrupted,
    /// A merger's `build()` was called with no successful `add_index` and no
    /// explicit target dimensions, so the output dimensionality is unknown.
    DimensionUndetermined,
    /// Underlying I/O failure while reading or writing a stream.
    Io(std::io::Error),
    /// Chunk metadata failed to serialize or deserialize as JSON.
    Json(serde_json::Error),
}

impl fmt::Display for CodevecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CodevecError::DimensionMismatch { expected, actual } => write!(
                f,
                "dimension mismatch: index expects {} dimensions, got {}",
                expected, actual
            ),
            CodevecError::IncompatibleModel { expected, actual } => write!(
                f,
                "incompatible model: target is {:?}, source is {:?}",
                expected, actual
            ),
            CodevecError::InvalidMagic { found } => {
                write!(f, "invalid magic bytes: {:?}", found)
            }
            CodevecError::UnsupportedFormatVersion { found, supported } => write!(
                f,
                "unsupported format version {} (this build supports up to {})",
                found, supported
            ),
            CodevecError::MissingEmbeddingProvider => {
                write!(f, "textual search requires an embedding provider")
            }
            CodevecError::Interrupted => write!(f, "operation interrupted"),
            CodevecError::DimensionUndetermined => write!(
                f,
                "merger has no sources and no explicit target dimensions"
            ),
            CodevecError::Io(e) => write!(f, "io error: {}", e),
            CodevecError::Json(e) => write!(f, "json error: {}", e),
        }
    }
}

impl std::error::Error for CodevecError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CodevecError::Io(e) => Some(e),
            CodevecError::Json(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for CodevecError {
    fn from(e: std::io::Error) -> Self {
        CodevecError::Io(e)
    }
}

impl From<serde_json::Error> for CodevecError {
    fn from(e: serde_json::Error) -> Self {
        CodevecError::Json(e)
    }
}

pub type Result<T> = std::result::Result<T, CodevecError>;
