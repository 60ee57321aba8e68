//! # Document Validator
//!
//! Validates a candidate project metadata document, given as a generic
//! parsed JSON tree. The validator is a pure function: no side effects,
//! no state, and the same input always yields the same report.
//!
//! ## Accumulation Invariant
//!
//! Every violated rule is reported, not just the first, and each carries a
//! stable [`ViolationCode`] so callers can report all problems in one
//! pass. Underscore-prefixed fields are reserved for private extensions
//! and are ignored entirely; other unknown fields are surfaced as
//! informational [`Anomaly`] notes that never fail validation.

use std::collections::HashSet;
use std::fmt;

use serde::Serialize;
use serde_json::{Map, Value};

use pidx_core::{TimestampError, UploadedAt, VersionId};

/// Stable identifying code for a validation rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationCode {
    /// A required field is absent.
    MissingRequiredField,
    /// A field is present with the wrong JSON type.
    TypeMismatch,
    /// A version string does not parse under the versioning scheme.
    InvalidVersionString,
    /// The `versions` list contains the same version twice.
    DuplicateVersion,
    /// An `upload_time` value does not match the fixed wire pattern.
    InvalidTimestampFormat,
    /// An `upload_time` value is valid RFC 3339 but not UTC-with-`Z`.
    NonUtcTimestamp,
    /// A `size` value is negative.
    NegativeSize,
    /// An optional field appears on some file entries but not all.
    InconsistentOptionalFieldCoverage,
    /// A file's version is not listed in `versions`.
    UnlistedVersionReference,
}

impl ViolationCode {
    /// The stable snake_case identifier, matching the serde form.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MissingRequiredField => "missing_required_field",
            Self::TypeMismatch => "type_mismatch",
            Self::InvalidVersionString => "invalid_version_string",
            Self::DuplicateVersion => "duplicate_version",
            Self::InvalidTimestampFormat => "invalid_timestamp_format",
            Self::NonUtcTimestamp => "non_utc_timestamp",
            Self::NegativeSize => "negative_size",
            Self::InconsistentOptionalFieldCoverage => "inconsistent_optional_field_coverage",
            Self::UnlistedVersionReference => "unlisted_version_reference",
        }
    }
}

impl fmt::Display for ViolationCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single violated rule with its location in the document.
#[derive(Debug, Clone, Serialize)]
pub struct Violation {
    /// The violated rule.
    pub code: ViolationCode,
    /// JSON-Pointer-style path to the violating value.
    pub path: String,
    /// Human-readable description of the violation.
    pub message: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "  (root) [{}]: {}", self.code, self.message)
        } else {
            write!(f, "  {} [{}]: {}", self.path, self.code, self.message)
        }
    }
}

/// An informational note that does not fail validation.
#[derive(Debug, Clone, Serialize)]
pub struct Anomaly {
    /// JSON-Pointer-style path to the field.
    pub path: String,
    /// Human-readable description.
    pub message: String,
}

impl fmt::Display for Anomaly {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "  note: {}: {}", self.path, self.message)
    }
}

/// The outcome of validating one document: every violation and every
/// informational anomaly, in document order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ValidationReport {
    violations: Vec<Violation>,
    anomalies: Vec<Anomaly>,
}

impl ValidationReport {
    /// Whether the document conforms. Anomalies do not affect validity.
    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }

    /// All violations, in document order.
    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    /// All informational anomalies, in document order.
    pub fn anomalies(&self) -> &[Anomaly] {
        &self.anomalies
    }

    /// Whether any violation carries the given code.
    pub fn has(&self, code: ViolationCode) -> bool {
        self.violations.iter().any(|v| v.code == code)
    }

    fn violation(&mut self, code: ViolationCode, path: impl Into<String>, message: impl Into<String>) {
        self.violations.push(Violation {
            code,
            path: path.into(),
            message: message.into(),
        });
    }

    fn anomaly(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.anomalies.push(Anomaly {
            path: path.into(),
            message: message.into(),
        });
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for v in &self.violations {
            if !first {
                writeln!(f)?;
            }
            write!(f, "{v}")?;
            first = false;
        }
        for a in &self.anomalies {
            if !first {
                writeln!(f)?;
            }
            write!(f, "{a}")?;
            first = false;
        }
        Ok(())
    }
}

/// Top-level fields defined by the protocol.
const KNOWN_PROJECT_FIELDS: &[&str] = &["name", "files", "meta", "versions"];

/// File-entry fields defined by the protocol (base fields included).
const KNOWN_FILE_FIELDS: &[&str] = &[
    "filename",
    "url",
    "hashes",
    "version",
    "size",
    "upload_time",
    "requires-python",
    "core-metadata",
    "gpg-sig",
    "yanked",
];

/// Per-document counters for the all-or-nothing coverage rules.
#[derive(Debug, Default)]
struct Coverage {
    entries: usize,
    with_size: usize,
    with_upload_time: usize,
}

/// Validate a candidate project metadata document.
///
/// The input is a generic parsed JSON tree; nothing is assumed about it.
/// Returns a report enumerating every violated rule and every
/// informational anomaly.
pub fn validate_document(doc: &Value) -> ValidationReport {
    let mut report = ValidationReport::default();

    let Some(obj) = doc.as_object() else {
        report.violation(
            ViolationCode::TypeMismatch,
            "",
            "document must be a JSON object",
        );
        return report;
    };

    check_top_level_shape(obj, &mut report);
    let declared = check_versions(obj, &mut report);
    check_files(obj, declared.as_ref(), &mut report);
    check_unknown_fields(obj, "", KNOWN_PROJECT_FIELDS, &mut report);

    report
}

fn check_top_level_shape(obj: &Map<String, Value>, report: &mut ValidationReport) {
    match obj.get("name") {
        None => report.violation(
            ViolationCode::MissingRequiredField,
            "/name",
            "`name` is required",
        ),
        Some(Value::String(_)) => {}
        Some(_) => report.violation(
            ViolationCode::TypeMismatch,
            "/name",
            "`name` must be a string",
        ),
    }

    match obj.get("meta") {
        None => report.violation(
            ViolationCode::MissingRequiredField,
            "/meta",
            "`meta` is required",
        ),
        Some(Value::Object(_)) => {}
        Some(_) => report.violation(
            ViolationCode::TypeMismatch,
            "/meta",
            "`meta` must be an object",
        ),
    }
}

/// Check the optional `versions` list; returns the successfully parsed
/// versions for the membership rule when the list is present.
fn check_versions(
    obj: &Map<String, Value>,
    report: &mut ValidationReport,
) -> Option<HashSet<VersionId>> {
    let raw = obj.get("versions")?;

    let Some(items) = raw.as_array() else {
        report.violation(
            ViolationCode::TypeMismatch,
            "/versions",
            "`versions` must be an array of strings",
        );
        return None;
    };

    let mut declared = HashSet::new();
    for (i, item) in items.iter().enumerate() {
        let path = format!("/versions/{i}");
        let Some(s) = item.as_str() else {
            report.violation(
                ViolationCode::TypeMismatch,
                path,
                "version entries must be strings",
            );
            continue;
        };
        match VersionId::parse(s) {
            Ok(version) => {
                if !declared.insert(version.clone()) {
                    report.violation(
                        ViolationCode::DuplicateVersion,
                        path,
                        format!("version `{}` (canonical `{}`) appears more than once", s, version),
                    );
                }
            }
            Err(_) => report.violation(
                ViolationCode::InvalidVersionString,
                path,
                format!("`{s}` is not a valid version string"),
            ),
        }
    }
    Some(declared)
}

fn check_files(
    obj: &Map<String, Value>,
    declared: Option<&HashSet<VersionId>>,
    report: &mut ValidationReport,
) {
    let files = match obj.get("files") {
        None => {
            report.violation(
                ViolationCode::MissingRequiredField,
                "/files",
                "`files` is required",
            );
            return;
        }
        Some(Value::Array(files)) => files,
        Some(_) => {
            report.violation(
                ViolationCode::TypeMismatch,
                "/files",
                "`files` must be an array",
            );
            return;
        }
    };

    let mut coverage = Coverage::default();
    for (i, entry) in files.iter().enumerate() {
        check_file_entry(i, entry, declared, &mut coverage, report);
    }

    check_coverage(&coverage, "size", coverage.with_size, report);
    check_coverage(&coverage, "upload_time", coverage.with_upload_time, report);
}

fn check_coverage(
    coverage: &Coverage,
    field: &str,
    with: usize,
    report: &mut ValidationReport,
) {
    if with > 0 && with < coverage.entries {
        report.violation(
            ViolationCode::InconsistentOptionalFieldCoverage,
            "/files",
            format!(
                "`{field}` is present on {with} of {} file entries; it must appear on all entries or none",
                coverage.entries
            ),
        );
    }
}

fn check_file_entry(
    index: usize,
    value: &Value,
    declared: Option<&HashSet<VersionId>>,
    coverage: &mut Coverage,
    report: &mut ValidationReport,
) {
    let path = format!("/files/{index}");
    let Some(entry) = value.as_object() else {
        report.violation(
            ViolationCode::TypeMismatch,
            path,
            "file entries must be objects",
        );
        return;
    };
    coverage.entries += 1;

    for field in ["filename", "url"] {
        match entry.get(field) {
            None => report.violation(
                ViolationCode::MissingRequiredField,
                format!("{path}/{field}"),
                format!("`{field}` is required on every file entry"),
            ),
            Some(Value::String(_)) => {}
            Some(_) => report.violation(
                ViolationCode::TypeMismatch,
                format!("{path}/{field}"),
                format!("`{field}` must be a string"),
            ),
        }
    }

    match entry.get("hashes") {
        None => report.violation(
            ViolationCode::MissingRequiredField,
            format!("{path}/hashes"),
            "`hashes` is required on every file entry",
        ),
        Some(Value::Object(hashes)) => {
            for (algorithm, digest) in hashes {
                if !digest.is_string() {
                    report.violation(
                        ViolationCode::TypeMismatch,
                        format!("{path}/hashes/{algorithm}"),
                        "hash digests must be strings",
                    );
                }
            }
        }
        Some(_) => report.violation(
            ViolationCode::TypeMismatch,
            format!("{path}/hashes"),
            "`hashes` must be an object",
        ),
    }

    if let Some(size) = entry.get("size") {
        coverage.with_size += 1;
        check_size(&format!("{path}/size"), size, report);
    }

    if let Some(time) = entry.get("upload_time") {
        coverage.with_upload_time += 1;
        check_upload_time(&format!("{path}/upload_time"), time, report);
    }

    if let Some(version) = entry.get("version") {
        check_file_version(&format!("{path}/version"), version, declared, report);
    }

    check_unknown_fields(entry, &path, KNOWN_FILE_FIELDS, report);
}

fn check_size(path: &str, value: &Value, report: &mut ValidationReport) {
    let Some(number) = value.as_number() else {
        report.violation(
            ViolationCode::TypeMismatch,
            path,
            "`size` must be a non-negative integer",
        );
        return;
    };
    let negative =
        number.as_i64().is_some_and(|n| n < 0) || number.as_f64().is_some_and(|n| n < 0.0);
    if negative {
        report.violation(
            ViolationCode::NegativeSize,
            path,
            format!("`size` must be non-negative, got {number}"),
        );
    } else if number.as_u64().is_none() {
        report.violation(
            ViolationCode::TypeMismatch,
            path,
            format!("`size` must be an integer representable in 64 bits, got {number}"),
        );
    }
}

fn check_upload_time(path: &str, value: &Value, report: &mut ValidationReport) {
    let Some(s) = value.as_str() else {
        report.violation(
            ViolationCode::TypeMismatch,
            path,
            "`upload_time` must be a string",
        );
        return;
    };
    match UploadedAt::parse(s) {
        Ok(_) => {}
        Err(err @ TimestampError::NonUtc(_)) => {
            report.violation(ViolationCode::NonUtcTimestamp, path, err.to_string());
        }
        Err(err) => {
            report.violation(ViolationCode::InvalidTimestampFormat, path, err.to_string());
        }
    }
}

fn check_file_version(
    path: &str,
    value: &Value,
    declared: Option<&HashSet<VersionId>>,
    report: &mut ValidationReport,
) {
    let Some(s) = value.as_str() else {
        report.violation(
            ViolationCode::TypeMismatch,
            path,
            "`version` must be a string",
        );
        return;
    };
    match VersionId::parse(s) {
        Ok(version) => {
            if let Some(declared) = declared {
                if !declared.contains(&version) {
                    report.violation(
                        ViolationCode::UnlistedVersionReference,
                        path,
                        format!("version `{version}` is not listed in `versions`"),
                    );
                }
            }
        }
        Err(_) => report.violation(
            ViolationCode::InvalidVersionString,
            path,
            format!("`{s}` is not a valid version string"),
        ),
    }
}

fn check_unknown_fields(
    obj: &Map<String, Value>,
    base: &str,
    known: &[&str],
    report: &mut ValidationReport,
) {
    for key in obj.keys() {
        // Underscore-prefixed fields are reserved for private extensions.
        if key.starts_with('_') {
            continue;
        }
        if !known.contains(&key.as_str()) {
            report.anomaly(
                format!("{base}/{key}"),
                format!("unknown field `{key}`; tolerated for forward compatibility"),
            );
        }
    }
}
