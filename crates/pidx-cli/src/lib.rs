//! # pidx-cli — CLI Tool for the pidx Toolkit
//!
//! Provides the `pidx` command-line interface.
//!
//! ## Subcommands
//!
//! - `pidx validate <file.json>` — Validate a project metadata document,
//!   printing every violation and anomaly; `--json` emits the report as
//!   JSON. Exit code 0 when the document conforms, 1 when it does not.
//! - `pidx build <manifest.json>` — Build a conformant document from a
//!   build manifest; `--out` writes to a file, `--compact` skips
//!   pretty-printing.

pub mod build;
pub mod validate;
