//! # Document Builder
//!
//! Constructs conformant project metadata documents from a caller-supplied
//! file set and version set.
//!
//! ## Fail-Fast Policy
//!
//! The builder is constructing, not diagnosing: it stops at the first
//! unsatisfiable precondition instead of accumulating errors. In
//! particular, supplying size or upload-time information for some files
//! but not all fails outright — the all-or-nothing disclosure rule is
//! enforced at the boundary, never repaired by silently dropping fields
//! from a subset.

use std::collections::{BTreeMap, HashSet};

use serde_json::{Map, Value};
use thiserror::Error;

use pidx_core::{ProjectName, UploadedAt, VersionId};

use crate::model::{FileEntry, ProjectDocument, META_API_VERSION};

/// Caller-supplied description of one file.
#[derive(Debug, Clone)]
pub struct FileSpec {
    /// Artifact filename.
    pub filename: String,
    /// Download URL.
    pub url: String,
    /// Hash digests keyed by algorithm name.
    pub hashes: BTreeMap<String, String>,
    /// The version this file belongs to.
    pub version: Option<VersionId>,
    /// File size in bytes.
    pub size: Option<u64>,
    /// Upload instant. Construct via [`UploadedAt::parse_lenient()`] when
    /// ingesting external timestamps; naive inputs are rejected there.
    pub upload_time: Option<UploadedAt>,
}

impl FileSpec {
    /// A spec with the required base fields only.
    pub fn new(filename: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            url: url.into(),
            hashes: BTreeMap::new(),
            version: None,
            size: None,
            upload_time: None,
        }
    }
}

/// Error constructing a document.
#[derive(Error, Debug)]
pub enum BuildError {
    /// An optional field was supplied for some files but not all.
    #[error("`{field}` is set on {with} of {total} files; supply it for every file or none")]
    MixedFieldCoverage {
        /// The field with partial coverage (`size` or `upload_time`).
        field: &'static str,
        /// How many files carry the field.
        with: usize,
        /// Total number of files.
        total: usize,
    },

    /// The supplied version set lists the same version twice.
    #[error("duplicate version `{0}` in the supplied version set")]
    DuplicateVersion(String),

    /// A file belongs to a version missing from the supplied version set.
    #[error("file `{filename}` belongs to version `{version}`, which is not in the supplied version set")]
    UnknownVersion {
        /// The offending file.
        filename: String,
        /// The canonical form of the missing version.
        version: String,
    },
}

/// Builder for conformant project metadata documents.
///
/// `files` preserves insertion order; `versions`, when supplied, is
/// emitted in insertion order.
#[derive(Debug)]
pub struct DocumentBuilder {
    name: ProjectName,
    meta: Map<String, Value>,
    files: Vec<FileSpec>,
    versions: Option<Vec<VersionId>>,
}

impl DocumentBuilder {
    /// Start a document for the named project. `meta` defaults to
    /// `{"api-version": "1.1"}`.
    pub fn new(name: ProjectName) -> Self {
        let mut meta = Map::new();
        meta.insert(
            "api-version".to_string(),
            Value::String(META_API_VERSION.to_string()),
        );
        Self {
            name,
            meta,
            files: Vec::new(),
            versions: None,
        }
    }

    /// Replace the `meta` object.
    pub fn meta(mut self, meta: Map<String, Value>) -> Self {
        self.meta = meta;
        self
    }

    /// Append one file.
    pub fn file(mut self, spec: FileSpec) -> Self {
        self.files.push(spec);
        self
    }

    /// Append several files, preserving order.
    pub fn files(mut self, specs: impl IntoIterator<Item = FileSpec>) -> Self {
        self.files.extend(specs);
        self
    }

    /// Disclose the full version list.
    pub fn versions(mut self, versions: impl IntoIterator<Item = VersionId>) -> Self {
        self.versions = Some(versions.into_iter().collect());
        self
    }

    /// Construct the document, failing fast on the first unsatisfiable
    /// precondition.
    pub fn build(self) -> Result<ProjectDocument, BuildError> {
        let total = self.files.len();

        let with_size = self.files.iter().filter(|f| f.size.is_some()).count();
        if with_size != 0 && with_size != total {
            return Err(BuildError::MixedFieldCoverage {
                field: "size",
                with: with_size,
                total,
            });
        }

        let with_time = self.files.iter().filter(|f| f.upload_time.is_some()).count();
        if with_time != 0 && with_time != total {
            return Err(BuildError::MixedFieldCoverage {
                field: "upload_time",
                with: with_time,
                total,
            });
        }

        if let Some(versions) = &self.versions {
            let mut seen = HashSet::new();
            for version in versions {
                if !seen.insert(version.clone()) {
                    return Err(BuildError::DuplicateVersion(version.canonical()));
                }
            }
            for file in &self.files {
                if let Some(version) = &file.version {
                    if !seen.contains(version) {
                        return Err(BuildError::UnknownVersion {
                            filename: file.filename.clone(),
                            version: version.canonical(),
                        });
                    }
                }
            }
        }

        let files = self
            .files
            .into_iter()
            .map(|spec| FileEntry {
                filename: spec.filename,
                url: spec.url,
                hashes: spec.hashes,
                version: spec.version,
                size: spec.size,
                upload_time: spec.upload_time,
                yanked: None,
                extra: Map::new(),
            })
            .collect();

        Ok(ProjectDocument {
            name: self.name,
            meta: self.meta,
            files,
            versions: self.versions,
            extra: Map::new(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validate::validate_document;

    fn name(s: &str) -> ProjectName {
        ProjectName::parse(s).unwrap()
    }

    fn version(s: &str) -> VersionId {
        VersionId::parse(s).unwrap()
    }

    fn full_spec(filename: &str, ver: &str, size: u64, time: &str) -> FileSpec {
        let mut spec = FileSpec::new(filename, format!("https://example.com/files/{filename}"));
        spec.hashes.insert("sha256".to_string(), "deadbeef".to_string());
        spec.version = Some(version(ver));
        spec.size = Some(size);
        spec.upload_time = Some(UploadedAt::parse(time).unwrap());
        spec
    }

    #[test]
    fn built_document_validates() {
        let doc = DocumentBuilder::new(name("pkg"))
            .file(full_spec(
                "pkg-1.0.tar.gz",
                "1.0",
                1024,
                "2022-01-01T00:00:00.000000Z",
            ))
            .versions([version("1.0")])
            .build()
            .unwrap();
        let report = validate_document(&doc.to_value().unwrap());
        assert!(report.is_valid(), "builder output failed validation:\n{report}");
        assert!(report.anomalies().is_empty());
    }

    #[test]
    fn default_meta_carries_api_version() {
        let doc = DocumentBuilder::new(name("pkg")).build().unwrap();
        assert_eq!(doc.meta["api-version"], Value::String("1.1".to_string()));
    }

    #[test]
    fn size_and_upload_time_are_independent() {
        // Omitting size everywhere while keeping upload_time is fine.
        let mut spec = full_spec("pkg-1.0.tar.gz", "1.0", 0, "2022-01-01T00:00:00.000000Z");
        spec.size = None;
        let doc = DocumentBuilder::new(name("pkg"))
            .file(spec)
            .versions([version("1.0")])
            .build()
            .unwrap();
        assert!(validate_document(&doc.to_value().unwrap()).is_valid());
    }

    #[test]
    fn mixed_size_coverage_fails() {
        let with = full_spec("pkg-1.0.tar.gz", "1.0", 1024, "2022-01-01T00:00:00.000000Z");
        let mut without = full_spec("pkg-2.0.tar.gz", "2.0", 0, "2022-01-01T00:00:00.000000Z");
        without.size = None;
        let err = DocumentBuilder::new(name("pkg"))
            .files([with, without])
            .versions([version("1.0"), version("2.0")])
            .build()
            .unwrap_err();
        match err {
            BuildError::MixedFieldCoverage { field, with, total } => {
                assert_eq!(field, "size");
                assert_eq!((with, total), (1, 2));
            }
            other => panic!("expected MixedFieldCoverage, got {other}"),
        }
    }

    #[test]
    fn mixed_upload_time_coverage_fails() {
        let with = full_spec("pkg-1.0.tar.gz", "1.0", 1024, "2022-01-01T00:00:00.000000Z");
        let mut without = full_spec("pkg-2.0.tar.gz", "2.0", 2048, "2022-01-01T00:00:00.000000Z");
        without.upload_time = None;
        let err = DocumentBuilder::new(name("pkg"))
            .files([with, without])
            .versions([version("1.0"), version("2.0")])
            .build()
            .unwrap_err();
        assert!(matches!(
            err,
            BuildError::MixedFieldCoverage { field: "upload_time", .. }
        ));
    }

    #[test]
    fn duplicate_versions_fail() {
        // `1.0` and `1.0.0` are the same version.
        let err = DocumentBuilder::new(name("pkg"))
            .versions([version("1.0"), version("1.0.0")])
            .build()
            .unwrap_err();
        assert!(matches!(err, BuildError::DuplicateVersion(_)));
    }

    #[test]
    fn file_version_outside_set_fails() {
        let err = DocumentBuilder::new(name("pkg"))
            .file(full_spec(
                "pkg-3.0.tar.gz",
                "3.0",
                1024,
                "2022-01-01T00:00:00.000000Z",
            ))
            .versions([version("1.0"), version("2.0")])
            .build()
            .unwrap_err();
        match err {
            BuildError::UnknownVersion { filename, version } => {
                assert_eq!(filename, "pkg-3.0.tar.gz");
                assert_eq!(version, "3.0");
            }
            other => panic!("expected UnknownVersion, got {other}"),
        }
    }

    #[test]
    fn file_versions_unchecked_without_version_set() {
        let doc = DocumentBuilder::new(name("pkg"))
            .file(full_spec(
                "pkg-3.0.tar.gz",
                "3.0",
                1024,
                "2022-01-01T00:00:00.000000Z",
            ))
            .build()
            .unwrap();
        assert!(doc.versions.is_none());
    }

    #[test]
    fn version_set_may_exceed_file_versions() {
        // A version with no uploaded artifacts is legitimate.
        let doc = DocumentBuilder::new(name("pkg"))
            .file(full_spec(
                "pkg-1.0.tar.gz",
                "1.0",
                1024,
                "2022-01-01T00:00:00.000000Z",
            ))
            .versions([version("1.0"), version("2.0rc1")])
            .build()
            .unwrap();
        assert!(validate_document(&doc.to_value().unwrap()).is_valid());
    }

    #[test]
    fn file_order_is_preserved() {
        let doc = DocumentBuilder::new(name("pkg"))
            .files([
                FileSpec::new("b-2.0.tar.gz", "https://example.com/b-2.0.tar.gz"),
                FileSpec::new("a-1.0.tar.gz", "https://example.com/a-1.0.tar.gz"),
            ])
            .build()
            .unwrap();
        let filenames: Vec<&str> = doc.files.iter().map(|f| f.filename.as_str()).collect();
        assert_eq!(filenames, ["b-2.0.tar.gz", "a-1.0.tar.gz"]);
    }

    #[test]
    fn version_order_is_preserved() {
        let doc = DocumentBuilder::new(name("pkg"))
            .versions([version("2.0"), version("1.0")])
            .build()
            .unwrap();
        let rendered: Vec<String> = doc
            .versions
            .unwrap()
            .iter()
            .map(VersionId::canonical)
            .collect();
        assert_eq!(rendered, ["2.0", "1.0"]);
    }

    #[test]
    fn empty_document_builds_and_validates() {
        let doc = DocumentBuilder::new(name("pkg")).build().unwrap();
        assert!(validate_document(&doc.to_value().unwrap()).is_valid());
    }
}
