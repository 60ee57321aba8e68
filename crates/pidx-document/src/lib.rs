//! # pidx-document — Project Metadata Documents
//!
//! The document layer of the pidx toolkit: a typed model of the JSON
//! document a package index serves per project, a validator that checks a
//! generic parsed JSON tree and reports **every** violated rule with a
//! stable code, and a builder that constructs conformant documents and
//! fails fast when the inputs cannot satisfy the invariants.
//!
//! ## Disclosure Invariants
//!
//! - If any file entry carries `size`, every file entry in the document
//!   must carry `size`; likewise for `upload_time`. The two rules are
//!   independent of each other.
//! - When `versions` is disclosed, every version a file belongs to must be
//!   a member; versions with no files are allowed.
//! - Underscore-prefixed fields are private extensions: passed through by
//!   the model, ignored by the validator.
//!
//! Both operations are pure, synchronous functions over in-memory data —
//! callers may run any number of them concurrently with no coordination.

pub mod build;
pub mod model;
pub mod validate;

// Re-export primary types for ergonomic imports.
pub use build::{BuildError, DocumentBuilder, FileSpec};
pub use model::{FileEntry, ProjectDocument, META_API_VERSION};
pub use validate::{validate_document, ValidationReport, Violation, ViolationCode};
