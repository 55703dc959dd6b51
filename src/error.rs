//! # Error Types
//!
//! Error handling for the layout codecs and the type handler registry.
//!
//! Every failure is unrecoverable for the call that raised it: a failed decode
//! yields no object, and a failed stream decode leaves the reader at a position
//! the caller must treat as invalid.
//!
//! ## Error Categories
//! - **Resolution Errors**: no handler anywhere in a type's ancestor chain
//! - **Declaration Errors**: missing size declarations, unbounded fixed layouts
//! - **Buffer Errors**: reads or writes past the end of the supplied buffer
//! - **Value Errors**: type mismatches, unknown fields, invalid enum discriminants
//! - **I/O Errors**: failures of the underlying stream
//!
//! ## Example Usage
//! ```rust
//! use layout_codec::error::{CodecError, Result};
//!
//! fn require_size(size: Option<usize>) -> Result<usize> {
//!     size.ok_or(CodecError::MissingSize { field: "name" })
//! }
//!
//! assert!(require_size(None).is_err());
//! ```

use std::io;
use thiserror::Error;

/// Error message constants to reduce allocations in error paths.
pub mod constants {
    /// Registry lock errors
    pub const ERR_REGISTRY_WRITE_LOCK: &str = "Failed to acquire write lock on type handler registry";
    pub const ERR_REGISTRY_READ_LOCK: &str = "Failed to acquire read lock on type handler registry";

    /// Value conversion errors
    pub const ERR_NOT_A_RECORD: &str = "value is not a nested record";
    pub const ERR_RECORD_DOWNCAST: &str = "nested record has an unexpected concrete type";

    /// Configuration errors
    pub const ERR_CONFIG_OPEN: &str = "Failed to open config file";
    pub const ERR_CONFIG_PARSE: &str = "Failed to parse TOML";
    pub const ERR_CONFIG_WRITE: &str = "Failed to write config file";

    /// Logging errors
    pub const ERR_LOGGING_INIT: &str = "Failed to install tracing subscriber";
}

/// CodecError is the error type for every registry and codec operation.
#[derive(Error, Debug)]
pub enum CodecError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// No encode/decode strategy is resolvable through the ancestor walk.
    #[error("no handler registered for type '{type_name}' or any of its ancestors")]
    HandlerNotFound { type_name: &'static str },

    /// A string or byte-array field lacks its required size declaration.
    #[error("field '{field}' requires a size declaration")]
    MissingSize { field: &'static str },

    /// The buffer or stream ended before the field could be read in full.
    #[error(
        "buffer exhausted reading field '{field}': needed {needed} bytes at offset {offset}, {available} available"
    )]
    MalformedBuffer {
        field: &'static str,
        offset: usize,
        needed: usize,
        available: usize,
    },

    /// The destination buffer is too small for the field being written.
    #[error(
        "buffer too small writing field '{field}': needed {needed} bytes at offset {offset}, {available} available"
    )]
    BufferOverflow {
        field: &'static str,
        offset: usize,
        needed: usize,
        available: usize,
    },

    /// An array element failed to encode or decode.
    #[error("array field '{field}' element {index}: {source}")]
    InvalidArrayElement {
        field: &'static str,
        index: usize,
        #[source]
        source: Box<CodecError>,
    },

    #[error("type mismatch: expected {expected}, found {found}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },

    #[error("record '{record}' has no field named '{field}'")]
    UnknownField { record: &'static str, field: String },

    #[error("{value} is not a valid discriminant for enum '{type_name}'")]
    InvalidEnumValue { type_name: &'static str, value: i64 },

    #[error("record nesting exceeds the maximum depth of {depth}")]
    NestingTooDeep { depth: usize },

    /// A "consume to end" read would exceed the configured limit.
    #[error("field '{field}' would read {len} bytes, limit is {limit}")]
    ReadLimitExceeded {
        field: &'static str,
        len: usize,
        limit: usize,
    },

    /// The layout cannot be sized because a field has no fixed width.
    #[error("field '{field}' has no fixed width, layout length is unbounded")]
    UnboundedLayout { field: &'static str },

    #[error("Synchronization primitive poisoned: {0}")]
    LockPoisoned(&'static str),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl CodecError {
    /// Wraps an element failure with the array field and index it came from.
    pub fn in_array(self, field: &'static str, index: usize) -> Self {
        CodecError::InvalidArrayElement {
            field,
            index,
            source: Box::new(self),
        }
    }
}

/// Type alias for Results using CodecError
pub type Result<T> = std::result::Result<T, CodecError>;
