//! CLI command definitions for octavalidate
//!
//! Provides Clap-based commands for validating payloads against schemas,
//! checking schemas, testing semantic patterns and parsing size strings.

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use octavalidate_core::{
    parse_size, PatternLibrary, Schema, SemanticRule, Validator, ValidatorOptions,
};
use serde_json::Value;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::error::CliError;
use crate::output::{format_size, CheckOutput, OutputFormat, ValidationOutput};
use crate::ExitCode;

/// octavalidate CLI
///
/// Validate JSON, YAML or TOML payloads against declarative rule schemas.
#[derive(Parser, Debug)]
#[command(name = "octavalidate")]
#[command(about = "Validate payloads against declarative rule schemas", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Output verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Log line format
    #[arg(long, value_enum, default_value = "text", global = true)]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Log line formats
#[derive(Copy, Clone, PartialEq, Eq, ValueEnum, Debug, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Validate a payload against a schema
    ///
    /// Compiles the schema, validates the payload and prints the report.
    /// Exits with 1 when the payload fails validation.
    Validate {
        /// Path to the schema file
        #[arg(short, long)]
        schema: PathBuf,

        /// Path to the payload file
        #[arg(short, long)]
        payload: PathBuf,

        /// Session identifier the report is keyed by
        #[arg(long, default_value = "cli")]
        session: String,

        /// Enable strict mode
        #[arg(long)]
        strict: bool,

        /// Extra prohibited word for strict mode (repeatable)
        #[arg(long = "prohibited-word", value_name = "WORD")]
        prohibited_words: Vec<String>,

        /// Validator options file (JSON, YAML or TOML)
        #[arg(long, env = "OCTAVALIDATE_OPTIONS")]
        options: Option<PathBuf>,

        /// Output format for the report
        #[arg(long, value_enum, default_value = "table")]
        format: OutputFormat,
    },

    /// Compile a schema and list its fields
    Check {
        /// Path to the schema file
        #[arg(short, long)]
        schema: PathBuf,

        /// Output format
        #[arg(long, value_enum, default_value = "table")]
        format: OutputFormat,
    },

    /// Test a value against a built-in semantic rule
    Pattern {
        /// Rule name, such as email or strongPassword
        rule: String,

        /// Value to test
        value: String,
    },

    /// Print the byte count of a size string such as 5MB
    Size {
        /// Size string
        value: String,
    },
}

/// Arguments of the validate command
#[derive(Debug, Clone)]
pub struct ValidateArgs {
    pub schema: PathBuf,
    pub payload: PathBuf,
    pub session: String,
    pub strict: bool,
    pub prohibited_words: Vec<String>,
    pub options: Option<PathBuf>,
    pub format: OutputFormat,
    pub quiet: bool,
}

/// Execute the validate command
pub fn execute_validate<W: Write>(args: ValidateArgs, out: &mut W) -> Result<ExitCode, CliError> {
    let options = resolve_options(&args)?;
    let schema = load_document(&args.schema)?;
    let payload = load_document(&args.payload)?;

    let mut validator = Validator::with_options(args.session.as_str(), options)?;
    validator.compile(&schema)?;
    let valid = validator.validate(&payload)?;

    tracing::info!(
        session = %args.session,
        schema = %args.schema.display(),
        payload = %args.payload.display(),
        valid,
        "validation finished"
    );

    if !args.quiet {
        let output = ValidationOutput::from_report(&args.session, valid, validator.get_errors());
        output.render(args.format, out)?;
    }

    Ok(ExitCode::from_validation_result(valid))
}

/// Environment first, then the options file, then command-line flags
fn resolve_options(args: &ValidateArgs) -> Result<ValidatorOptions, CliError> {
    let mut options = ValidatorOptions::from_env();
    if let Some(path) = &args.options {
        options = options.merged_with(ValidatorOptions::from_file(path)?);
    }
    let flags = ValidatorOptions::builder()
        .strict_mode(args.strict)
        .prohibited_words(args.prohibited_words.iter().cloned())
        .build();
    Ok(options.merged_with(flags))
}

/// Execute the check command
pub fn execute_check<W: Write>(
    schema_path: &Path,
    format: OutputFormat,
    quiet: bool,
    out: &mut W,
) -> Result<ExitCode, CliError> {
    let raw = load_document(schema_path)?;
    let schema = Schema::compile(&raw, &PatternLibrary::new())?;

    if !quiet {
        CheckOutput::from_schema(&schema).render(format, out)?;
    }
    Ok(ExitCode::Success)
}

/// Execute the pattern command
pub fn execute_pattern<W: Write>(
    rule: &str,
    value: &str,
    quiet: bool,
    out: &mut W,
) -> Result<ExitCode, CliError> {
    let rule: SemanticRule = rule.parse().map_err(|e: String| {
        let known: Vec<&str> = SemanticRule::ALL.iter().map(|r| r.as_str()).collect();
        CliError::invalid_input(format!("{}. Known rules: {}", e, known.join(", ")))
    })?;

    let matched = rule.matches(value);
    if !quiet {
        if matched {
            writeln!(out, "{} '{}' satisfies {}", "+".green(), value, rule)?;
        } else {
            writeln!(
                out,
                "{} '{}' does not satisfy {}: {}",
                "x".red(),
                value,
                rule,
                rule.default_message()
            )?;
        }
    }
    Ok(ExitCode::from_validation_result(matched))
}

/// Execute the size command
pub fn execute_size<W: Write>(value: &str, quiet: bool, out: &mut W) -> Result<ExitCode, CliError> {
    let bytes = parse_size(value).map_err(|e| CliError::invalid_input(e.to_string()))?;
    if !quiet {
        writeln!(out, "{} ({})", bytes, format_size(bytes))?;
    }
    Ok(ExitCode::Success)
}

/// Dispatch a parsed command line, writing to stdout
pub fn execute(cli: Cli) -> Result<ExitCode, CliError> {
    let mut stdout = io::stdout();
    let quiet = cli.quiet;

    match cli.command {
        Commands::Validate {
            schema,
            payload,
            session,
            strict,
            prohibited_words,
            options,
            format,
        } => execute_validate(
            ValidateArgs {
                schema,
                payload,
                session,
                strict,
                prohibited_words,
                options,
                format,
                quiet,
            },
            &mut stdout,
        ),
        Commands::Check { schema, format } => execute_check(&schema, format, quiet, &mut stdout),
        Commands::Pattern { rule, value } => execute_pattern(&rule, &value, quiet, &mut stdout),
        Commands::Size { value } => execute_size(&value, quiet, &mut stdout),
    }
}

/// Load a JSON, YAML or TOML document, picking the format by extension
pub fn load_document(path: &Path) -> Result<Value, CliError> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        CliError::file_error(format!("Failed to read '{}': {}", path.display(), e))
    })?;

    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    match extension.as_str() {
        "json" => serde_json::from_str(&content)
            .map_err(|e| CliError::parse_error(format!("Invalid JSON in '{}': {}", path.display(), e))),
        "yaml" | "yml" => serde_yaml::from_str(&content)
            .map_err(|e| CliError::parse_error(format!("Invalid YAML in '{}': {}", path.display(), e))),
        "toml" => {
            let toml_value: toml::Value = toml::from_str(&content).map_err(|e| {
                CliError::parse_error(format!("Invalid TOML in '{}': {}", path.display(), e))
            })?;
            serde_json::to_value(toml_value)
                .map_err(|e| CliError::parse_error(format!("Conversion error: {}", e)))
        }
        _ => Err(CliError::invalid_input(format!(
            "Unsupported file format: {}. Supported formats: json, yaml, yml, toml",
            extension
        ))),
    }
}
