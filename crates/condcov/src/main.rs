//! Binary entry point for the condcov CLI.
//!
//! ## Usage
//!
//! ```bash
//! # Instrument a package into a sibling directory
//! condcov instrument ./pkg ./pkg-instrumented
//!
//! # Branch coverage only, including test files
//! condcov instrument ./pkg ./out --branch --cover-test
//!
//! # Cross-target build constraints, JSON summary
//! condcov instrument ./pkg ./out --goos windows --goarch arm64 --json
//! ```

use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;

use condcov_instrument::{instrument_package, InstrumentError, Options, Summary};

// ============================================================================
// CLI Structure
// ============================================================================

/// Branch and condition coverage instrumentation for Go packages.
#[derive(Parser, Debug)]
#[command(name = "condcov", version, about = "Branch/condition coverage instrumenter")]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,
    #[command(subcommand)]
    command: Command,
}

/// Global arguments shared by all subcommands.
#[derive(Parser, Debug)]
struct GlobalArgs {
    /// Log level for tracing output.
    #[arg(long, global = true, value_enum, default_value = "warn")]
    log_level: LogLevel,
}

/// Log level for tracing output.
#[derive(Clone, Copy, Debug, ValueEnum)]
enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    fn to_tracing_level(self) -> tracing::Level {
        match self {
            LogLevel::Trace => tracing::Level::TRACE,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Error => tracing::Level::ERROR,
        }
    }
}

/// CLI subcommands.
#[derive(Subcommand, Debug)]
enum Command {
    /// Instrument a package directory into a destination directory.
    Instrument {
        /// Source package directory.
        src: PathBuf,
        /// Destination directory for the instrumented copy.
        dst: PathBuf,
        /// Instrument whole controlling conditions only (default: every condition).
        #[arg(long)]
        branch: bool,
        /// Instrument `_test.go` files as well.
        #[arg(long)]
        cover_test: bool,
        /// Persist coverage counts after every condition evaluation.
        #[arg(long)]
        immediately: bool,
        /// Report fully covered conditions too, not only the gaps.
        #[arg(long)]
        list_all: bool,
        /// Target operating system for build constraint evaluation.
        #[arg(long)]
        goos: Option<String>,
        /// Target architecture for build constraint evaluation.
        #[arg(long)]
        goarch: Option<String>,
        /// Print a JSON summary instead of per-file lines.
        #[arg(long)]
        json: bool,
    },
}

/// JSON summary printed by `instrument --json`.
#[derive(Serialize)]
struct JsonSummary<'a> {
    files: usize,
    conditions: usize,
    skipped: &'a [String],
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    init_tracing(cli.global.log_level);

    match execute(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("condcov: {err}");
            ExitCode::from(1)
        }
    }
}

/// Initialize tracing subscriber.
fn init_tracing(level: LogLevel) {
    use tracing_subscriber::fmt::format::FmtSpan;
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.to_tracing_level().to_string()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_span_events(FmtSpan::CLOSE)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

/// Execute the CLI command.
fn execute(cli: Cli) -> Result<(), InstrumentError> {
    match cli.command {
        Command::Instrument {
            src,
            dst,
            branch,
            cover_test,
            immediately,
            list_all,
            goos,
            goarch,
            json,
        } => {
            let host = Options::default();
            let options = Options {
                branch_coverage: branch,
                cover_test,
                immediately,
                list_all,
                goos: goos.unwrap_or(host.goos),
                goarch: goarch.unwrap_or(host.goarch),
            };
            let summary = instrument_package(&src, &dst, &options)?;
            report(&summary, json);
            Ok(())
        }
    }
}

/// Print the instrumentation summary to stdout.
fn report(summary: &Summary, json: bool) {
    if json {
        let out = JsonSummary {
            files: summary.instrumented.len(),
            conditions: summary.conditions,
            skipped: &summary.skipped,
        };
        if let Ok(text) = serde_json::to_string(&out) {
            println!("{text}");
        }
    } else {
        for file in &summary.instrumented {
            println!("instrumented {file}");
        }
        for file in &summary.skipped {
            println!("skipped {file} (build constraints)");
        }
        println!(
            "{} file(s), {} condition(s)",
            summary.instrumented.len(),
            summary.conditions
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_structure_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn instrument_command_writes_the_expected_file_set() {
        let src = tempfile::TempDir::new().unwrap();
        let dst = tempfile::TempDir::new().unwrap();
        std::fs::write(
            src.path().join("demo.go"),
            "package demo\n\nfunc Positive(i int) bool {\n\treturn i > 0\n}\n",
        )
        .unwrap();

        let cli = Cli {
            global: GlobalArgs {
                log_level: LogLevel::Warn,
            },
            command: Command::Instrument {
                src: src.path().to_path_buf(),
                dst: dst.path().to_path_buf(),
                branch: false,
                cover_test: false,
                immediately: false,
                list_all: false,
                goos: Some("linux".to_string()),
                goarch: Some("amd64".to_string()),
                json: true,
            },
        };
        execute(cli).expect("instrument");

        for name in [
            "demo.go",
            "condcov_fixed.go",
            "condcov_variable.go",
            "condcov_no_testmain_test.go",
        ] {
            assert!(dst.path().join(name).is_file(), "missing {name}");
        }
        let demo = std::fs::read_to_string(dst.path().join("demo.go")).unwrap();
        assert!(demo.contains("condcovCover(0, i > 0)"));
    }

    #[test]
    fn bad_flags_are_rejected_by_the_parser() {
        let result = Cli::try_parse_from(["condcov", "instrument", "only-one-path"]);
        assert!(result.is_err());
    }
}
