//! # pidx CLI entry point
//!
//! Parses command-line arguments and dispatches to subcommand handlers.

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use pidx_cli::build::{run_build, BuildArgs};
use pidx_cli::validate::{run_validate, ValidateArgs};

/// pidx — project metadata document toolkit.
///
/// Validates project metadata documents against the index protocol rules
/// and builds conformant documents from a manifest.
#[derive(Parser, Debug)]
#[command(name = "pidx", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Validate a project metadata document, reporting every violation.
    Validate(ValidateArgs),

    /// Build a project metadata document from a build manifest.
    Build(BuildArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize tracing based on verbosity level.
    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let result = match cli.command {
        Commands::Validate(args) => run_validate(&args),
        Commands::Build(args) => run_build(&args),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn cli_parse_validate_basic() {
        let cli = Cli::try_parse_from(["pidx", "validate", "doc.json"]).unwrap();
        assert!(matches!(cli.command, Commands::Validate(_)));
        if let Commands::Validate(args) = cli.command {
            assert_eq!(args.path, PathBuf::from("doc.json"));
            assert!(!args.json);
        }
    }

    #[test]
    fn cli_parse_validate_json_flag() {
        let cli = Cli::try_parse_from(["pidx", "validate", "doc.json", "--json"]).unwrap();
        if let Commands::Validate(args) = cli.command {
            assert!(args.json);
        }
    }

    #[test]
    fn cli_parse_build_basic() {
        let cli = Cli::try_parse_from(["pidx", "build", "manifest.json"]).unwrap();
        if let Commands::Build(args) = cli.command {
            assert_eq!(args.manifest, PathBuf::from("manifest.json"));
            assert!(args.out.is_none());
            assert!(!args.compact);
        }
    }

    #[test]
    fn cli_parse_build_with_all_options() {
        let cli = Cli::try_parse_from([
            "pidx",
            "build",
            "manifest.json",
            "--out",
            "document.json",
            "--compact",
        ])
        .unwrap();
        if let Commands::Build(args) = cli.command {
            assert_eq!(args.out, Some(PathBuf::from("document.json")));
            assert!(args.compact);
        }
    }

    #[test]
    fn cli_parse_verbose_levels() {
        let cli0 = Cli::try_parse_from(["pidx", "validate", "d.json"]).unwrap();
        assert_eq!(cli0.verbose, 0);

        let cli1 = Cli::try_parse_from(["pidx", "-v", "validate", "d.json"]).unwrap();
        assert_eq!(cli1.verbose, 1);

        let cli3 = Cli::try_parse_from(["pidx", "-vvv", "validate", "d.json"]).unwrap();
        assert_eq!(cli3.verbose, 3);
    }

    #[test]
    fn cli_parse_no_subcommand_errors() {
        assert!(Cli::try_parse_from(["pidx"]).is_err());
    }

    #[test]
    fn cli_parse_unknown_subcommand_errors() {
        assert!(Cli::try_parse_from(["pidx", "nonexistent"]).is_err());
    }

    #[test]
    fn cli_debug_impl() {
        let cli = Cli::try_parse_from(["pidx", "validate", "d.json"]).unwrap();
        assert!(format!("{cli:?}").contains("Validate"));
    }
}
