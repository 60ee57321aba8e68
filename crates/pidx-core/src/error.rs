//! # Error Types — Shared Error Hierarchy
//!
//! Defines the error type used by pidx core types. All errors use
//! `thiserror` for derive-based `Display` and `Error` implementations.
//!
//! ## Design
//!
//! - Construction errors carry the offending input so callers can report
//!   exactly what was rejected.
//! - Whole-document validation does **not** use this type: the validator in
//!   `pidx-document` accumulates structured violations instead of stopping
//!   at the first error.

use thiserror::Error;

/// Top-level error type for pidx core types.
#[derive(Error, Debug)]
pub enum PidxError {
    /// A project name failed the index naming rule.
    #[error("invalid project name: {0}")]
    InvalidName(String),

    /// A version string could not be parsed under the versioning scheme.
    #[error("invalid version string: {0}")]
    InvalidVersion(String),

    /// A timestamp failed parsing or carries no usable UTC offset.
    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(String),

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
