//! # Build Subcommand
//!
//! Builds a project metadata document from a build manifest: a small JSON
//! file naming the project, its published versions, and its files.
//!
//! ## Manifest Format
//!
//! ```json
//! {
//!   "name": "holygrail",
//!   "versions": ["1.0", "2.0"],
//!   "files": [
//!     {
//!       "filename": "holygrail-1.0.tar.gz",
//!       "url": "https://files.example.com/holygrail-1.0.tar.gz",
//!       "hashes": {"sha256": "…"},
//!       "version": "1.0",
//!       "size": 1024,
//!       "upload_time": "2022-01-01T05:00:00+05:00"
//!     }
//!   ]
//! }
//! ```
//!
//! Manifest timestamps may carry any explicit UTC offset; they are
//! converted to UTC on ingest. Offset-free timestamps are rejected.

use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use serde::Deserialize;
use serde_json::{Map, Value};

use pidx_core::{ProjectName, UploadedAt, VersionId};
use pidx_document::{DocumentBuilder, FileSpec, ProjectDocument};

/// Arguments for the build subcommand.
#[derive(Args, Debug)]
pub struct BuildArgs {
    /// Path to the build manifest (JSON).
    pub manifest: PathBuf,

    /// Write the document here instead of stdout.
    #[arg(long)]
    pub out: Option<PathBuf>,

    /// Emit compact JSON instead of pretty-printed.
    #[arg(long)]
    pub compact: bool,
}

/// A build manifest as read from disk.
#[derive(Deserialize, Debug)]
struct BuildManifest {
    name: String,
    #[serde(default)]
    meta: Option<Map<String, Value>>,
    #[serde(default)]
    versions: Option<Vec<String>>,
    files: Vec<ManifestFile>,
}

/// One file description in the manifest.
#[derive(Deserialize, Debug)]
struct ManifestFile {
    filename: String,
    url: String,
    #[serde(default)]
    hashes: BTreeMap<String, String>,
    #[serde(default)]
    version: Option<String>,
    #[serde(default)]
    size: Option<u64>,
    #[serde(default)]
    upload_time: Option<String>,
}

/// Execute the build subcommand.
pub fn run_build(args: &BuildArgs) -> Result<u8> {
    let content = std::fs::read_to_string(&args.manifest)
        .with_context(|| format!("failed to read {}", args.manifest.display()))?;
    let manifest: BuildManifest = serde_json::from_str(&content)
        .with_context(|| format!("{} is not a valid build manifest", args.manifest.display()))?;

    let document = build_from_manifest(manifest)?;
    let text = document.to_json_string(!args.compact)?;

    match &args.out {
        Some(out) => {
            std::fs::write(out, text.as_bytes())
                .with_context(|| format!("failed to write {}", out.display()))?;
            tracing::info!(out = %out.display(), "document written");
        }
        None => println!("{text}"),
    }

    Ok(0)
}

/// Turn a parsed manifest into a conformant document.
fn build_from_manifest(manifest: BuildManifest) -> Result<ProjectDocument> {
    let name = ProjectName::parse(&manifest.name)?;
    let mut builder = DocumentBuilder::new(name);

    if let Some(meta) = manifest.meta {
        builder = builder.meta(meta);
    }

    if let Some(versions) = manifest.versions {
        let versions = versions
            .iter()
            .map(|raw| {
                VersionId::parse(raw).with_context(|| format!("in `versions`: bad entry {raw:?}"))
            })
            .collect::<Result<Vec<VersionId>>>()?;
        builder = builder.versions(versions);
    }

    for file in manifest.files {
        builder = builder.file(file_spec(file)?);
    }

    Ok(builder.build()?)
}

fn file_spec(file: ManifestFile) -> Result<FileSpec> {
    let version = file
        .version
        .as_deref()
        .map(VersionId::parse)
        .transpose()
        .with_context(|| format!("file `{}`: bad version", file.filename))?;

    let upload_time = file
        .upload_time
        .as_deref()
        .map(UploadedAt::parse_lenient)
        .transpose()
        .with_context(|| format!("file `{}`: bad upload_time", file.filename))?;

    Ok(FileSpec {
        filename: file.filename,
        url: file.url,
        hashes: file.hashes,
        version,
        size: file.size,
        upload_time,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pidx_document::validate_document;
    use serde_json::json;

    fn manifest(value: Value) -> BuildManifest {
        serde_json::from_value(value).unwrap()
    }

    fn sample_manifest() -> Value {
        json!({
            "name": "holygrail",
            "versions": ["1.0"],
            "files": [
                {
                    "filename": "holygrail-1.0.tar.gz",
                    "url": "https://files.example.com/holygrail-1.0.tar.gz",
                    "hashes": {"sha256": "deadbeef"},
                    "version": "1.0",
                    "size": 1024,
                    "upload_time": "2022-01-01T05:00:00+05:00"
                }
            ]
        })
    }

    #[test]
    fn manifest_builds_valid_document() {
        let document = build_from_manifest(manifest(sample_manifest())).unwrap();
        let report = validate_document(&document.to_value().unwrap());
        assert!(report.is_valid(), "manifest output failed validation:\n{report}");
    }

    #[test]
    fn manifest_timestamps_are_converted_to_utc() {
        let document = build_from_manifest(manifest(sample_manifest())).unwrap();
        assert_eq!(
            document.files[0].upload_time.unwrap().to_wire(),
            "2022-01-01T00:00:00.000000Z"
        );
    }

    #[test]
    fn naive_timestamp_is_rejected() {
        let mut value = sample_manifest();
        value["files"][0]["upload_time"] = json!("2022-01-01T00:00:00");
        let err = build_from_manifest(manifest(value)).unwrap_err();
        let chain = format!("{err:#}");
        assert!(chain.contains("upload_time"), "unexpected error: {chain}");
        assert!(chain.contains("no UTC offset"), "unexpected error: {chain}");
    }

    #[test]
    fn bad_version_names_the_file() {
        let mut value = sample_manifest();
        value["files"][0]["version"] = json!("not-a-version");
        let err = build_from_manifest(manifest(value)).unwrap_err();
        assert!(format!("{err:#}").contains("holygrail-1.0.tar.gz"));
    }

    #[test]
    fn mixed_size_coverage_propagates_builder_error() {
        let mut value = sample_manifest();
        value["versions"] = json!(["1.0", "2.0"]);
        value["files"].as_array_mut().unwrap().push(json!({
            "filename": "holygrail-2.0.tar.gz",
            "url": "https://files.example.com/holygrail-2.0.tar.gz",
            "hashes": {"sha256": "cafebabe"},
            "version": "2.0",
            "upload_time": "2022-02-01T00:00:00Z"
        }));
        let err = build_from_manifest(manifest(value)).unwrap_err();
        assert!(format!("{err:#}").contains("`size`"));
    }

    #[test]
    fn run_build_writes_output_file() {
        let dir = tempfile::tempdir().unwrap();
        let manifest_path = dir.path().join("manifest.json");
        std::fs::write(
            &manifest_path,
            serde_json::to_string(&sample_manifest()).unwrap(),
        )
        .unwrap();
        let out_path = dir.path().join("document.json");

        let code = run_build(&BuildArgs {
            manifest: manifest_path,
            out: Some(out_path.clone()),
            compact: false,
        })
        .unwrap();
        assert_eq!(code, 0);

        let written = std::fs::read_to_string(&out_path).unwrap();
        let doc: Value = serde_json::from_str(&written).unwrap();
        assert!(validate_document(&doc).is_valid());
        assert_eq!(doc["name"], "holygrail");
    }

    #[test]
    fn run_build_rejects_missing_manifest() {
        let args = BuildArgs {
            manifest: PathBuf::from("/nonexistent/manifest.json"),
            out: None,
            compact: true,
        };
        assert!(run_build(&args).is_err());
    }
}
