//! Validation engine
//!
//! [`Executor`] runs a compiled [`Schema`] over one payload and writes the
//! outcome of every rule into a [`Report`]. [`Validator`] is the session-bound
//! facade most callers use: it owns the schema, the options, the custom
//! patterns and the report.

pub mod rules;

use serde_json::{Map, Value};
use std::borrow::Cow;

use crate::config::ValidatorOptions;
use crate::error::{EngineError, Result};
use crate::patterns::PatternLibrary;
use crate::report::Report;
use crate::schema::{FileField, RuleKey, Schema, ValueField};
use crate::value::{FieldValue, FileSet};

use rules::strict::ProhibitedWords;
use rules::{RuleContext, Verdict};

/// Message recorded when a declared field is missing from the payload
pub const FIELD_NOT_FOUND: &str = "field not found";

/// Runs a compiled schema against payloads
#[derive(Debug, Clone, Copy)]
pub struct Executor<'a> {
    session: &'a str,
    schema: &'a Schema,
    prohibited: Option<&'a ProhibitedWords>,
}

impl<'a> Executor<'a> {
    pub fn new(session: &'a str, schema: &'a Schema) -> Self {
        Self {
            session,
            schema,
            prohibited: None,
        }
    }

    /// Enable strict mode with the given word filter
    pub fn strict(mut self, prohibited: &'a ProhibitedWords) -> Self {
        self.prohibited = Some(prohibited);
        self
    }

    /// Validate a payload, recording failures in `report`
    ///
    /// Every rule evaluated on this pass either records or clears its entry,
    /// so the report reflects only the latest pass. Returns whether the
    /// session is free of errors afterwards.
    pub fn run(&self, payload: &Value, report: &mut Report) -> Result<bool> {
        let payload = payload.as_object().ok_or_else(|| {
            EngineError::input_error("payload must be an object mapping field names to values")
        })?;

        for (name, field) in self.schema.value_fields() {
            self.run_value_field(name, field, payload, report);
        }
        for (name, field) in self.schema.file_fields() {
            self.run_file_field(name, field, payload.get(name), report);
        }

        let valid = !report.has_errors(self.session);
        tracing::debug!(
            session = self.session,
            valid,
            fields = self.schema.len(),
            "validated payload"
        );
        Ok(valid)
    }

    fn run_value_field(
        &self,
        name: &str,
        field: &ValueField,
        payload: &Map<String, Value>,
        report: &mut Report,
    ) {
        let session = self.session;
        let messages = field.messages();
        let raw = payload.get(name);
        let value = FieldValue::new(raw);

        if raw.is_none() {
            let message = messages.resolve(RuleKey::InvalidField, FIELD_NOT_FOUND.to_string());
            report.add_error(session, name, RuleKey::InvalidField, message);
        } else {
            report.remove_error(session, name, RuleKey::InvalidField);
        }

        let hits = match (self.prohibited, raw) {
            (Some(filter), Some(raw)) if !value.is_empty() => {
                let text = value
                    .as_text()
                    .unwrap_or_else(|| Cow::Owned(raw.to_string()));
                filter.scan(&text)
            }
            _ => Vec::new(),
        };

        if !hits.is_empty() {
            let message =
                messages.resolve(RuleKey::ProhibitedWords, ProhibitedWords::message(&hits));
            report.add_error(session, name, RuleKey::ProhibitedWords, message);
            for rule in field.rules() {
                report.remove_error(session, name, rule.key());
            }
            return;
        }
        report.remove_error(session, name, RuleKey::ProhibitedWords);

        let ctx = RuleContext {
            field: name,
            payload,
            strict_mode: self.prohibited.is_some(),
        };

        let mut halted = false;
        for rule in field.rules() {
            let key = rule.key();
            if halted {
                report.remove_error(session, name, key);
                continue;
            }
            match rule.evaluate(value, &ctx) {
                Verdict::Pass => report.remove_error(session, name, key),
                Verdict::Fail(default) => {
                    report.add_error(session, name, key, messages.resolve(key, default));
                    halted = rule.halts_on_failure();
                }
            }
        }
    }

    fn run_file_field(&self, name: &str, field: &FileField, raw: Option<&Value>, report: &mut Report) {
        let session = self.session;
        let messages = field.messages();
        let files = FileSet::from_value(raw);

        let mut halted = false;
        for rule in field.rules() {
            let key = rule.key();
            if halted {
                report.remove_error(session, name, key);
                continue;
            }
            match rule.evaluate(&files) {
                Verdict::Pass => report.remove_error(session, name, key),
                Verdict::Fail(default) => {
                    report.add_error(session, name, key, messages.resolve(key, default));
                    halted = rule.halts_on_failure();
                }
            }
        }
    }
}

/// Session-bound validator
///
/// ```
/// use octavalidate_core::Validator;
/// use serde_json::json;
///
/// let mut validator = Validator::new("signup").unwrap();
/// validator
///     .compile(&json!({ "age": { "required": true, "maxLength": 2 } }))
///     .unwrap();
///
/// assert!(!validator.validate(&json!({ "age": "300" })).unwrap());
/// assert_eq!(validator.get_error(), Some("This field must have at most 2 characters"));
/// ```
#[derive(Debug)]
pub struct Validator {
    session_id: String,
    options: ValidatorOptions,
    prohibited: ProhibitedWords,
    patterns: PatternLibrary,
    schema: Option<Schema>,
    report: Report,
}

impl Validator {
    /// Create a validator with default options
    pub fn new(session_id: impl Into<String>) -> Result<Self> {
        Self::with_options(session_id, ValidatorOptions::default())
    }

    /// Create a validator with the given options
    pub fn with_options(session_id: impl Into<String>, options: ValidatorOptions) -> Result<Self> {
        let session_id = session_id.into();
        if session_id.trim().is_empty() {
            return Err(EngineError::invalid_session(
                "session identifier must not be empty",
            ));
        }
        let prohibited = ProhibitedWords::new(options.effective_prohibited_words())?;

        tracing::debug!(
            session = %session_id,
            strict_mode = options.strict_mode,
            "created validator"
        );
        Ok(Self {
            session_id,
            options,
            prohibited,
            patterns: PatternLibrary::new(),
            schema: None,
            report: Report::new(),
        })
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn options(&self) -> &ValidatorOptions {
        &self.options
    }

    /// The compiled schema, if any
    pub fn schema(&self) -> Option<&Schema> {
        self.schema.as_ref()
    }

    /// Register a named pattern usable as a `ruleTitle`
    ///
    /// Schemas compiled before the registration keep the patterns they were
    /// compiled with.
    pub fn custom_rule(&mut self, name: &str, pattern: &str) -> Result<()> {
        self.patterns.register(name, pattern)?;
        tracing::debug!(session = %self.session_id, rule = name, "registered custom rule");
        Ok(())
    }

    /// Register a mapping of names to patterns; all or nothing
    pub fn custom_rules(&mut self, rules: &Value) -> Result<()> {
        let map = rules
            .as_object()
            .filter(|map| !map.is_empty())
            .ok_or_else(|| {
                EngineError::schema_error("custom rules must be a non-empty mapping of names to patterns")
            })?;

        let mut patterns = self.patterns.clone();
        for (name, pattern) in map {
            let pattern = pattern.as_str().ok_or_else(|| {
                EngineError::schema_error(format!("custom rule '{}' must be a string pattern", name))
            })?;
            patterns.register(name, pattern)?;
        }
        self.patterns = patterns;
        tracing::debug!(session = %self.session_id, count = map.len(), "registered custom rules");
        Ok(())
    }

    /// Compile a schema and merge it into the session's rule sets
    ///
    /// Fails without side effects on any schema error. Report entries of
    /// re-declared fields are dropped.
    pub fn compile(&mut self, raw: &Value) -> Result<bool> {
        let compiled = Schema::compile(raw, &self.patterns)?;

        let merged = match self.schema.as_mut() {
            Some(schema) => schema.merge(compiled)?,
            None => {
                let names = compiled
                    .value_fields()
                    .map(|(name, _)| name.to_string())
                    .chain(compiled.file_fields().map(|(name, _)| name.to_string()))
                    .collect();
                self.schema = Some(compiled);
                names
            }
        };

        for name in &merged {
            self.report.clear_field(&self.session_id, name);
        }
        Ok(true)
    }

    /// Validate a payload against the compiled schema
    pub fn validate(&mut self, payload: &Value) -> Result<bool> {
        let schema = self
            .schema
            .as_ref()
            .ok_or_else(|| EngineError::schema_error("no schema has been compiled"))?;

        let mut executor = Executor::new(&self.session_id, schema);
        if self.options.strict_mode {
            executor = executor.strict(&self.prohibited);
        }
        executor.run(payload, &mut self.report)
    }

    /// The full report
    ///
    /// When the session has an entry but no failing field, the whole report
    /// is reset first.
    pub fn get_errors(&mut self) -> &Report {
        self.report.prune(&self.session_id);
        &self.report
    }

    /// The most recently recorded message
    pub fn get_error(&self) -> Option<&str> {
        self.report.last_message()
    }

    /// The report as it stands, without pruning
    pub fn report(&self) -> &Report {
        &self.report
    }

    pub fn into_report(self) -> Report {
        self.report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn test_validator_is_send_and_sync() {
        assert_send_sync::<Validator>();
        assert_send_sync::<Report>();
    }

    #[test]
    fn test_blank_session_is_rejected() {
        assert!(matches!(Validator::new(""), Err(EngineError::InvalidSession(_))));
        assert!(matches!(Validator::new("  "), Err(EngineError::InvalidSession(_))));
        assert_eq!(Validator::new("form").unwrap().session_id(), "form");
    }

    #[test]
    fn test_validate_requires_compiled_schema() {
        let mut validator = Validator::new("form").unwrap();
        let err = validator.validate(&json!({})).unwrap_err();
        assert!(matches!(err, EngineError::SchemaError(_)));
    }

    #[test]
    fn test_executor_against_external_report() {
        let schema = Schema::compile(
            &json!({ "name": { "required": true } }),
            &PatternLibrary::new(),
        )
        .unwrap();
        let mut report = Report::new();
        let executor = Executor::new("ext", &schema);

        assert!(!executor.run(&json!({ "name": "" }), &mut report).unwrap());
        assert_eq!(
            report.message("ext", "name", RuleKey::Required),
            Some("This field is required")
        );

        assert!(executor.run(&json!({ "name": "Ada" }), &mut report).unwrap());
        assert!(!report.has_errors("ext"));

        let err = executor.run(&json!(["name"]), &mut report).unwrap_err();
        assert!(matches!(err, EngineError::InputError(_)));
    }

    #[test]
    fn test_required_halts_and_clears_later_rules() {
        let mut validator = Validator::new("form").unwrap();
        validator
            .compile(&json!({ "code": { "minLength": 4, "required": true, "maxLength": 2 } }))
            .unwrap();

        assert!(!validator.validate(&json!({ "code": "abc" })).unwrap());
        let report = validator.report();
        assert!(report.message("form", "code", RuleKey::MinLength).is_some());
        assert!(report.message("form", "code", RuleKey::MaxLength).is_some());

        assert!(!validator.validate(&json!({ "code": " " })).unwrap());
        let report = validator.report();
        assert!(report.message("form", "code", RuleKey::Required).is_some());
        assert!(report.message("form", "code", RuleKey::MinLength).is_none());
        assert!(report.message("form", "code", RuleKey::MaxLength).is_none());
    }

    #[test]
    fn test_compile_is_atomic() {
        let mut validator = Validator::new("form").unwrap();
        validator.compile(&json!({ "a": { "required": true } })).unwrap();

        assert!(validator
            .compile(&json!({ "b": { "required": true }, "c": { "bogus": 1 } }))
            .is_err());
        let schema = validator.schema().unwrap();
        assert_eq!(schema.len(), 1);
        assert!(schema.field_kind("b").is_none());
    }

    #[test]
    fn test_recompile_drops_stale_entries() {
        let mut validator = Validator::new("form").unwrap();
        validator.compile(&json!({ "a": { "required": true } })).unwrap();
        assert!(!validator.validate(&json!({})).unwrap());
        assert!(validator.report().has_errors("form"));

        validator.compile(&json!({ "a": { "maxLength": 5 } })).unwrap();
        assert!(validator.report().session("form").unwrap().field("a").is_none());
    }

    #[test]
    fn test_custom_rules_are_all_or_nothing() {
        let mut validator = Validator::new("form").unwrap();
        let err = validator
            .custom_rules(&json!({ "zip": "^\\d{5}$", "email": ".*" }))
            .unwrap_err();
        assert!(matches!(err, EngineError::SchemaError(_)));
        assert!(validator
            .compile(&json!({ "z": { "ruleTitle": "zip" } }))
            .is_err());

        assert!(validator.custom_rules(&json!({})).is_err());
        assert!(validator.custom_rules(&json!({ "zip": 5 })).is_err());

        validator.custom_rules(&json!({ "zip": "^\\d{5}$" })).unwrap();
        validator.compile(&json!({ "z": { "ruleTitle": "zip" } })).unwrap();
        assert!(validator.validate(&json!({ "z": "12345" })).unwrap());
    }
}
