//! Binary entry point for the slipform CLI.
//!
//! ## Usage
//!
//! ```bash
//! # Print the translated definition
//! slipform translate model.py
//!
//! # Show what translation changed
//! slipform translate model.py --format diff
//!
//! # Build the graph and print it as JSON
//! slipform build model.py
//! ```

use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};

use slipform::cli::{run_build, run_translate, TranslateFormat};
use slipform::config::{CliOverrides, SlipformConfig};
use slipform_core::error::{OutputErrorCode, SlipformError};
use slipform_core::output::{emit_response, ErrorResponse};
use slipform_translate::DEBUG_TARGET;

// ============================================================================
// CLI Structure
// ============================================================================

/// Rewrite imperative definitions into dataflow-graph builders.
#[derive(Parser, Debug)]
#[command(name = "slipform", version, about = "Rewrite definitions into graph builders")]
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

    /// Format of log lines written to stderr.
    #[arg(long, global = true, value_enum, default_value = "text")]
    log_format: LogFormat,

    /// Settings file (TOML).
    #[arg(long, global = true)]
    config: Option<PathBuf>,
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

/// Format of log lines.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum LogFormat {
    Text,
    Json,
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

/// Translation flags shared by the subcommands.
#[derive(clap::Args, Debug)]
struct TranslateArgs {
    /// Source file holding exactly one definition.
    file: PathBuf,
    /// Identifier of the graph-building namespace.
    #[arg(long)]
    namespace: Option<String>,
    /// Log the translated source on the `slipform::debug` target.
    #[arg(long)]
    debug: bool,
}

impl TranslateArgs {
    fn overrides(&self) -> CliOverrides {
        CliOverrides {
            namespace: self.namespace.clone(),
            debug: self.debug,
        }
    }
}

/// CLI subcommands.
#[derive(Subcommand, Debug)]
enum Command {
    /// Translate a definition and print the result.
    Translate {
        #[command(flatten)]
        args: TranslateArgs,
        /// Output format.
        #[arg(long, value_enum, default_value = "text")]
        format: TranslateFormat,
    },
    /// Translate, compile and instantiate a definition; print its graph.
    Build {
        #[command(flatten)]
        args: TranslateArgs,
    },
}

// ============================================================================
// Main Entry Point
// ============================================================================

fn main() -> ExitCode {
    let cli = Cli::parse();

    match execute(cli) {
        Ok(output) => {
            print!("{output}");
            if !output.ends_with('\n') {
                println!();
            }
            let _ = io::stdout().flush();
            ExitCode::SUCCESS
        }
        Err(err) => {
            let error_code = OutputErrorCode::from(&err);
            let response = ErrorResponse::from_error(&err);

            // Errors go to stdout as JSON.
            let _ = emit_response(&response, &mut io::stdout());
            let _ = io::stdout().flush();

            ExitCode::from(error_code.code())
        }
    }
}

/// Initialize tracing subscriber.
///
/// With `debug` set, the `slipform::debug` target is enabled at info level
/// regardless of `level`.
fn init_tracing(level: LogLevel, format: LogFormat, debug: bool) {
    use tracing_subscriber::EnvFilter;

    let mut filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.to_tracing_level().to_string()));
    if debug {
        if let Ok(directive) = format!("{DEBUG_TARGET}=info").parse() {
            filter = filter.add_directive(directive);
        }
    }

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(io::stderr);
    match format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}

/// Execute the CLI command.
fn execute(cli: Cli) -> Result<String, SlipformError> {
    let config = SlipformConfig::resolve(cli.global.config.as_deref())?;
    let args = match &cli.command {
        Command::Translate { args, .. } | Command::Build { args } => args,
    };
    let options = config.translate_options(&args.overrides());

    init_tracing(cli.global.log_level, cli.global.log_format, options.debug);

    match &cli.command {
        Command::Translate { args, format } => run_translate(&args.file, &options, *format),
        Command::Build { args } => run_build(&args.file, &options),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_translate_with_overrides() {
        let cli = Cli::try_parse_from([
            "slipform",
            "--log-level",
            "debug",
            "--log-format",
            "json",
            "translate",
            "f.py",
            "--format",
            "json",
            "--namespace",
            "pf",
        ])
        .unwrap();
        assert_eq!(cli.global.log_format, LogFormat::Json);
        match cli.command {
            Command::Translate { args, format } => {
                assert_eq!(format, TranslateFormat::Json);
                assert_eq!(args.namespace.as_deref(), Some("pf"));
                assert!(!args.debug);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn log_level_converts_to_tracing_level() {
        assert_eq!(LogLevel::Trace.to_tracing_level(), tracing::Level::TRACE);
        assert_eq!(LogLevel::Warn.to_tracing_level(), tracing::Level::WARN);
    }
}
