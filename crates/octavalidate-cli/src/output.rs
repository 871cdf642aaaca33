//! Output formatting for the octavalidate CLI
//!
//! Provides structured output in JSON, YAML and human-readable table formats
//! with colored pass/fail markers.

use clap::ValueEnum;
use colored::Colorize;
use octavalidate_core::{FieldKind, Report, Schema};
use serde::Serialize;
use std::io::Write;

use crate::error::CliError;

/// Output format options for CLI results
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug, Default)]
pub enum OutputFormat {
    /// Human-readable table format with colors
    #[default]
    Table,
    /// JSON format for machine processing
    Json,
    /// YAML format
    Yaml,
}

/// Result of the `validate` command
#[derive(Debug, Clone, Serialize)]
pub struct ValidationOutput {
    /// Overall validation status
    pub valid: bool,
    /// Session the payload was validated under
    pub session: String,
    /// Number of failing (field, rule) pairs
    pub error_count: usize,
    /// Failing rules, in report order
    pub errors: Vec<ErrorOutput>,
    /// Summary message
    pub summary: String,
}

/// One failing rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorOutput {
    pub field: String,
    pub rule: String,
    pub message: String,
}

impl ValidationOutput {
    /// Build output from a validation report
    pub fn from_report(session: &str, valid: bool, report: &Report) -> Self {
        let errors: Vec<ErrorOutput> = report
            .session(session)
            .into_iter()
            .flat_map(|errors| errors.iter())
            .flat_map(|(field, rules)| {
                rules.iter().map(move |(rule, message)| ErrorOutput {
                    field: field.to_string(),
                    rule: rule.to_string(),
                    message: message.to_string(),
                })
            })
            .collect();

        let error_count = errors.len();
        let summary = if valid {
            "Payload is valid".to_string()
        } else {
            let fields = report.session(session).map_or(0, |s| s.len());
            format!(
                "Payload has {} error(s) across {} field(s)",
                error_count, fields
            )
        };

        Self {
            valid,
            session: session.to_string(),
            error_count,
            errors,
            summary,
        }
    }

    /// Render output in the specified format
    pub fn render<W: Write>(&self, format: OutputFormat, out: &mut W) -> Result<(), CliError> {
        match format {
            OutputFormat::Json => render_json(self, out),
            OutputFormat::Yaml => render_yaml(self, out),
            OutputFormat::Table => self.render_table(out),
        }
    }

    fn render_table<W: Write>(&self, out: &mut W) -> Result<(), CliError> {
        writeln!(out)?;
        writeln!(out, "{}", "Validation Results".cyan().bold())?;
        writeln!(out, "{}", "=".repeat(60))?;
        writeln!(out)?;

        let status = if self.valid { "+".green() } else { "x".red() };
        writeln!(out, "{} {} (session '{}')", status, self.summary, self.session)?;

        if !self.errors.is_empty() {
            writeln!(out)?;
            writeln!(out, "{}", "Errors:".cyan().bold())?;
            writeln!(out, "{}", "-".repeat(60))?;
            for (index, error) in self.errors.iter().enumerate() {
                writeln!(
                    out,
                    "{:>3}. {} {} {}",
                    index + 1,
                    error.field.bold(),
                    format!("[{}]", error.rule).dimmed(),
                    error.message.red()
                )?;
            }
        }

        out.flush()?;
        Ok(())
    }
}

/// Result of the `check` command
#[derive(Debug, Clone, Serialize)]
pub struct CheckOutput {
    /// Number of declared fields
    pub field_count: usize,
    pub fields: Vec<FieldSummary>,
}

/// One compiled field
#[derive(Debug, Clone, Serialize)]
pub struct FieldSummary {
    pub name: String,
    pub kind: FieldKind,
    /// Compiled rules, in evaluation order
    pub rules: Vec<String>,
}

impl CheckOutput {
    pub fn from_schema(schema: &Schema) -> Self {
        let value_fields = schema.value_fields().map(|(name, field)| FieldSummary {
            name: name.to_string(),
            kind: FieldKind::Value,
            rules: field.rule_keys().iter().map(ToString::to_string).collect(),
        });
        let file_fields = schema.file_fields().map(|(name, field)| FieldSummary {
            name: name.to_string(),
            kind: FieldKind::File,
            rules: field.rule_keys().iter().map(ToString::to_string).collect(),
        });
        let fields: Vec<FieldSummary> = value_fields.chain(file_fields).collect();

        Self {
            field_count: fields.len(),
            fields,
        }
    }

    /// Render output in the specified format
    pub fn render<W: Write>(&self, format: OutputFormat, out: &mut W) -> Result<(), CliError> {
        match format {
            OutputFormat::Json => render_json(self, out),
            OutputFormat::Yaml => render_yaml(self, out),
            OutputFormat::Table => self.render_table(out),
        }
    }

    fn render_table<W: Write>(&self, out: &mut W) -> Result<(), CliError> {
        writeln!(out, "{} Schema is valid", "+".green())?;
        writeln!(out)?;
        writeln!(out, "{}", format!("Fields ({}):", self.field_count).cyan().bold())?;
        for field in &self.fields {
            let rules = if field.rules.is_empty() {
                "no rules".dimmed().to_string()
            } else {
                field.rules.join(", ")
            };
            writeln!(
                out,
                "  {} {} {}",
                "-".blue(),
                field.name.bold(),
                format!("({}) {}", field.kind, rules).dimmed()
            )?;
        }
        out.flush()?;
        Ok(())
    }
}

fn render_json<T: Serialize, W: Write>(value: &T, out: &mut W) -> Result<(), CliError> {
    let json = serde_json::to_string_pretty(value)?;
    writeln!(out, "{}", json)?;
    Ok(())
}

fn render_yaml<T: Serialize, W: Write>(value: &T, out: &mut W) -> Result<(), CliError> {
    let yaml = serde_yaml::to_string(value)?;
    write!(out, "{}", yaml)?;
    Ok(())
}

/// Format a byte count for display
pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 6] = ["bytes", "KB", "MB", "GB", "TB", "PB"];

    let mut size = bytes as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }

    if unit == 0 {
        format!("{} bytes", bytes)
    } else {
        format!("{:.2} {}", size, UNITS[unit])
    }
}
