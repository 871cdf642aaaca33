//! octavalidate command-line front end
//!
//! ## CLI Usage
//!
//! ```bash
//! # Validate a payload against a schema
//! octavalidate validate --schema signup.json --payload request.yaml --strict
//!
//! # Compile a schema and list its fields
//! octavalidate check --schema signup.json --format json
//!
//! # Try a built-in semantic rule
//! octavalidate pattern strongPassword 'Abcdefg1'
//!
//! # Convert a size string to bytes
//! octavalidate size 5MB
//! ```
//!
//! ## Exit Codes
//!
//! - 0: Success
//! - 1: Validation failed
//! - 3: Invalid input or arguments
//! - 4: File not found or inaccessible
//! - 5: Schema-related errors
//! - 10: Internal error

pub mod commands;
pub mod error;
pub mod output;

pub use commands::{Cli, Commands, LogFormat};
pub use error::CliError;
pub use output::OutputFormat;

use tracing_subscriber::EnvFilter;

/// Exit codes for CLI operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Successful execution, validation passed
    Success = 0,
    /// Validation failed
    ValidationFailed = 1,
    /// Invalid input or arguments
    InvalidInput = 3,
    /// File not found or inaccessible
    FileError = 4,
    /// Schema-related errors
    SchemaError = 5,
    /// Internal error
    InternalError = 10,
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code as i32
    }
}

impl ExitCode {
    /// Determine exit code from a validation verdict
    pub fn from_validation_result(valid: bool) -> Self {
        if valid {
            ExitCode::Success
        } else {
            ExitCode::ValidationFailed
        }
    }
}

/// Run the CLI with the given arguments
pub fn run(cli: Cli) -> Result<ExitCode, CliError> {
    commands::execute(cli)
}

/// Run the CLI, reporting errors on stderr
///
/// This is the main entry point for the binary.
///
/// ```rust,no_run
/// use clap::Parser;
/// use octavalidate_cli::{run_cli, Cli};
///
/// let cli = Cli::parse();
/// std::process::exit(run_cli(cli).into());
/// ```
pub fn run_cli(cli: Cli) -> ExitCode {
    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            tracing::debug!(error = %e, "command failed");
            eprintln!("Error: {}", e);
            e.exit_code()
        }
    }
}

/// Install the tracing subscriber
///
/// `RUST_LOG` directives are honoured; the base level is `warn`, raised by
/// each `-v`.
pub fn init_tracing(verbose: u8, format: LogFormat) {
    let level = match verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    let filter = EnvFilter::from_default_env().add_directive(level.into());
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);

    let installed = match format {
        LogFormat::Text => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
    if let Err(e) = installed {
        eprintln!("Warning: logging is unavailable: {}", e);
    }
}
