//! # pidx-core — Foundational Types for the pidx Toolkit
//!
//! This crate defines the domain primitives the rest of the workspace is
//! built on. Every other crate depends on `pidx-core`; it depends on
//! nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **Newtype wrappers for domain primitives.** `ProjectName`,
//!    `VersionId`, `UploadedAt` — all newtypes with validated constructors.
//!    No bare strings for names, versions, or timestamps.
//!
//! 2. **Invalid values are unrepresentable.** Serde deserialization routes
//!    through the validated constructors, so a deserialized value carries
//!    the same guarantees as a constructed one.
//!
//! 3. **UTC-only timestamps.** `UploadedAt` enforces UTC with a literal `Z`
//!    suffix and exactly six fractional digits; offset-bearing and naive
//!    inputs are rejected at construction with distinct errors.
//!
//! 4. **Normalization-aware equality.** `VersionId` equality and hashing
//!    treat equivalent spellings (`1.0.0` / `1.0`, `1.0-ALPHA1` / `1.0a1`)
//!    as the same version, so sets deduplicate correctly.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `pidx-*` crates (this is the leaf of the DAG).
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests and static regex
//!   initialization.
//! - All public types derive `Debug` and `Clone`, and implement
//!   `Serialize`/`Deserialize` where they appear on the wire.

pub mod error;
pub mod name;
pub mod temporal;
pub mod version;

// Re-export primary types for ergonomic imports.
pub use error::PidxError;
pub use name::ProjectName;
pub use temporal::{TimestampError, UploadedAt};
pub use version::{LocalSegment, PreTag, VersionId};
