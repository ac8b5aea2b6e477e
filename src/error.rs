//! Error types for telegraph-content.
//!
//! The conversion pipeline itself is infallible: malformed HTML degrades
//! instead of failing. Errors only arise at the JSON text boundary.

/// Error type for conversion operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The node tree could not be read from or written to JSON text.
    #[error("Invalid node tree JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for conversion operations.
pub type Result<T> = std::result::Result<T, Error>;
