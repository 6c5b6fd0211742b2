//! # Error Types
//!
//! Structured error types for bolt_core. Every failure in the layout core is
//! locally recoverable: the front end shows the message and the model is left
//! exactly as it was before the call.
//!
//! ## Example
//!
//! ```rust
//! use bolt_core::errors::{LayoutError, LayoutResult};
//!
//! fn require_material(material: &str) -> LayoutResult<()> {
//!     if material.trim().is_empty() {
//!         return Err(LayoutError::invalid_input("material", material, "Material is required"));
//!     }
//!     Ok(())
//! }
//!
//! assert!(require_material("").is_err());
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for bolt_core operations
pub type LayoutResult<T> = Result<T, LayoutError>;

/// Structured error type for layout operations.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "details")]
pub enum LayoutError {
    /// Numeric text did not match the fraction grammar
    #[error("Cannot parse '{input}': {reason}")]
    ParseError { input: String, reason: String },

    /// Adding the requested values would overflow a row
    #[error("Row {diameter} cannot hold {requested} entries (capacity {capacity})")]
    CapacityExceeded {
        diameter: String,
        requested: usize,
        capacity: usize,
    },

    /// Too many distinct diameters for the chosen bin size
    #[error("Maximum {max_rows} diameters reached")]
    RowLimitExceeded { max_rows: usize },

    /// Undo requested with an empty history
    #[error("Nothing to undo")]
    NothingToUndo,

    /// An input value is invalid (name, phone, empty selection, ...)
    #[error("Invalid input for '{field}': {value} - {reason}")]
    InvalidInput {
        field: String,
        value: String,
        reason: String,
    },

    /// File I/O error
    #[error("File error: {operation} on '{path}' - {reason}")]
    FileError {
        operation: String,
        path: String,
        reason: String,
    },

    /// Another process is writing the same file
    #[error("File locked: '{path}' is being written by another process")]
    FileLocked { path: String },

    /// JSON/TOML serialization or deserialization error
    #[error("Serialization error: {reason}")]
    SerializationError { reason: String },

    /// PDF report could not be produced
    #[error("Render error: {reason}")]
    RenderError { reason: String },
}

impl LayoutError {
    /// Create a ParseError
    pub fn parse(input: impl Into<String>, reason: impl Into<String>) -> Self {
        LayoutError::ParseError {
            input: input.into(),
            reason: reason.into(),
        }
    }

    /// Create an InvalidInput error
    pub fn invalid_input(field: impl Into<String>, value: impl Into<String>, reason: impl Into<String>) -> Self {
        LayoutError::InvalidInput {
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Create a FileError
    pub fn file_error(operation: impl Into<String>, path: impl Into<String>, reason: impl Into<String>) -> Self {
        LayoutError::FileError {
            operation: operation.into(),
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a SerializationError
    pub fn serialization(reason: impl ToString) -> Self {
        LayoutError::SerializationError {
            reason: reason.to_string(),
        }
    }

    /// Whether retrying the same call later can succeed
    pub fn is_recoverable(&self) -> bool {
        matches!(self, LayoutError::FileLocked { .. })
    }

    /// Get a short error code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            LayoutError::ParseError { .. } => "PARSE_ERROR",
            LayoutError::CapacityExceeded { .. } => "CAPACITY_EXCEEDED",
            LayoutError::RowLimitExceeded { .. } => "ROW_LIMIT_EXCEEDED",
            LayoutError::NothingToUndo => "NOTHING_TO_UNDO",
            LayoutError::InvalidInput { .. } => "INVALID_INPUT",
            LayoutError::FileError { .. } => "FILE_ERROR",
            LayoutError::FileLocked { .. } => "FILE_LOCKED",
            LayoutError::SerializationError { .. } => "SERIALIZATION_ERROR",
            LayoutError::RenderError { .. } => "RENDER_ERROR",
        }
    }
}
