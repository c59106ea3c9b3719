//! # Error Types
//!
//! Domain-specific error types for till-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  till-core errors (this file)                                          │
//! │  ├── JsonError        - Malformed JSON text (first error wins)         │
//! │  ├── ValidationError  - Field-level input failures                     │
//! │  └── CoreError        - Everything an operation can return             │
//! │                                                                         │
//! │  till-ffi errors (separate crate)                                      │
//! │  └── FfiError         - Null pointers, bad handles, allocation         │
//! │                                                                         │
//! │  Flow: JsonError/ValidationError → CoreError → FfiError → Status code  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (item id, line index, byte offset)
//! 3. The `Display` text is the human-readable diagnostic shown to hosts

use thiserror::Error;

// =============================================================================
// JSON Error
// =============================================================================

/// A syntax error found while parsing JSON text.
///
/// Parsing stops at the first problem, so `message` always describes the
/// earliest error in the input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} (at byte {offset})")]
pub struct JsonError {
    /// What went wrong.
    pub message: &'static str,
    /// Byte offset where the parser stopped.
    pub offset: usize,
}

impl JsonError {
    pub(crate) const fn new(message: &'static str, offset: usize) -> Self {
        JsonError { message, offset }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Used for early validation before any state is touched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field has the wrong JSON type.
    #[error("{field} must be {expected}")]
    InvalidType {
        field: String,
        expected: &'static str,
    },

    /// Numeric field was written with a fraction or exponent.
    #[error("{field} must be an integer")]
    NotInteger { field: String },

    /// Value must be positive.
    #[error("{field} must be greater than zero")]
    MustBePositive { field: String },

    /// Value must be zero or more.
    #[error("{field} must be non-negative")]
    MustBeNonNegative { field: String },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Duplicate value (e.g., duplicate catalog id).
    #[error("{field} '{value}' already exists")]
    Duplicate { field: String, value: String },
}

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// Every public operation in this crate returns `CoreResult<T>`. Nothing is
/// mutated when an operation returns `Err`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// Input text was not valid JSON.
    #[error("Invalid JSON: {0}")]
    Json(#[from] JsonError),

    /// Catalog document has the wrong overall shape.
    ///
    /// ## When This Occurs
    /// - Root is not an object
    /// - `items` is missing or not an array
    /// - An entry of `items` is not an object
    #[error("Invalid catalog: {0}")]
    InvalidCatalog(String),

    /// A single catalog entry failed validation.
    #[error("Invalid catalog item at index {index}: {source}")]
    CatalogItem {
        index: usize,
        #[source]
        source: ValidationError,
    },

    /// Item id is not present in the current catalog.
    #[error("Unknown item_id: {0}")]
    ItemNotFound(String),

    /// Cart line index outside `[0, len)`.
    #[error("line_index {index} out of range (cart has {len} lines)")]
    LineOutOfRange { index: i64, len: usize },

    /// A quantity or amount would no longer fit in 64 bits.
    #[error("Amount overflow: {0}")]
    AmountOverflow(&'static str),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Invariant violation that should be unreachable.
    #[error("Internal error: {0}")]
    Internal(String),
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
