//! # Project Metadata Document Model
//!
//! Typed model of the JSON document a package index serves per project:
//! the project name, an opaque `meta` object, the ordered list of
//! downloadable files, and optionally the full list of published version
//! strings.
//!
//! ## Extension Pass-Through
//!
//! Field names beginning with an underscore are reserved for private
//! extensions, and unknown fields may be added by future protocol
//! revisions. Both structs keep a flattened `extra` map so every such
//! field survives a deserialize/serialize round trip byte-for-byte in
//! value terms — nothing is dropped and nothing is validated.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use pidx_core::{PidxError, ProjectName, UploadedAt, VersionId};

/// The protocol revision the builder stamps into `meta` by default.
pub const META_API_VERSION: &str = "1.1";

/// One downloadable artifact belonging to a project.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileEntry {
    /// Artifact filename as served by the index.
    pub filename: String,

    /// Download URL.
    pub url: String,

    /// Hash digests keyed by algorithm name (e.g. `sha256`).
    pub hashes: BTreeMap<String, String>,

    /// The version this file belongs to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<VersionId>,

    /// File size in bytes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,

    /// Upload instant in the fixed UTC wire format.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upload_time: Option<UploadedAt>,

    /// Whether the file is yanked: `true`, or a string giving the reason.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub yanked: Option<Value>,

    /// Unrecognized and underscore-prefixed fields, passed through untouched.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl FileEntry {
    /// A minimal entry with the required base fields only.
    pub fn new(filename: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            url: url.into(),
            hashes: BTreeMap::new(),
            version: None,
            size: None,
            upload_time: None,
            yanked: None,
            extra: Map::new(),
        }
    }
}

/// A project metadata document.
///
/// Produced fresh per query by [`crate::build::DocumentBuilder`]; consumed
/// one per call by [`crate::validate::validate_document`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectDocument {
    /// Project name.
    pub name: ProjectName,

    /// Response metadata; opaque beyond being an object.
    pub meta: Map<String, Value>,

    /// Downloadable files, in the order the index lists them.
    pub files: Vec<FileEntry>,

    /// All published version strings, including versions with no files.
    /// Omitted entirely when the index does not disclose versions.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub versions: Option<Vec<VersionId>>,

    /// Unrecognized and underscore-prefixed fields, passed through untouched.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ProjectDocument {
    /// Convert to a generic JSON tree.
    pub fn to_value(&self) -> Result<Value, PidxError> {
        Ok(serde_json::to_value(self)?)
    }

    /// Parse from a generic JSON tree.
    pub fn from_value(value: Value) -> Result<Self, PidxError> {
        Ok(serde_json::from_value(value)?)
    }

    /// Serialize to a JSON string, pretty-printed or compact.
    pub fn to_json_string(&self, pretty: bool) -> Result<String, PidxError> {
        let out = if pretty {
            serde_json::to_string_pretty(self)?
        } else {
            serde_json::to_string(self)?
        };
        Ok(out)
    }

    /// Parse from a JSON string.
    pub fn from_json_str(s: &str) -> Result<Self, PidxError> {
        Ok(serde_json::from_str(s)?)
    }
}
