//! Error types for observation-table operations.

use thiserror::Error;

/// Errors raised by [`Frame`](crate::frame::Frame) operations.
#[derive(Error, Debug)]
pub enum FrameError {
    /// Column not found
    #[error("Column '{name}' not found in frame")]
    ColumnNotFound { name: String },

    /// Column exists but holds the wrong type
    #[error("Type mismatch for column '{column}': expected {expected}, got {actual}")]
    TypeMismatch {
        column: String,
        expected: String,
        actual: String,
    },

    /// Column length does not match the frame's row count
    #[error("Column '{column}' has {actual} values, frame has {expected} rows")]
    LengthMismatch {
        column: String,
        expected: usize,
        actual: usize,
    },

    /// Column name already present
    #[error("Column '{name}' already exists in frame")]
    DuplicateColumn { name: String },

    /// Frames being combined do not share a schema
    #[error("Incompatible frame schemas: {message}")]
    SchemaMismatch { message: String },

    /// Row index out of bounds
    #[error("Row index {index} out of bounds for frame with {rows} rows")]
    RowOutOfBounds { index: usize, rows: usize },

    /// A grouping column must hold discrete values
    #[error("Column '{column}' cannot be used as a grouping key: {reason}")]
    InvalidGroupKey { column: String, reason: String },
}
