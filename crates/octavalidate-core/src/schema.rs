//! Schema compiler
//!
//! A schema is a JSON object mapping field names to rule sets. Compiling it
//! checks every rule key and value, classifies each field as a file or
//! non-file field (`type: "file"`), and turns each declared rule into a rule
//! object through the dispatch tables in [`crate::engine::rules`]. Rules keep
//! the order in which the schema declares them.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::engine::rules::{self, FileRule, RuleSpec, ValueRule};
use crate::error::{EngineError, Result};
use crate::ordered::OrderedMap;
use crate::patterns::PatternLibrary;

/// Every key that can appear in a rule set or in a report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RuleKey {
    Type,
    Required,
    Length,
    MinLength,
    MaxLength,
    RuleTitle,
    Pattern,
    Matches,
    EqualTo,
    ErrorMessage,
    MimeType,
    FileSize,
    MinFileSize,
    MaxFileSize,
    NumOfFiles,
    MinNumOfFiles,
    MaxNumOfFiles,
    /// Reported when a declared field is missing from the payload
    InvalidField,
    /// Reported when strict mode finds a prohibited word
    ProhibitedWords,
}

impl RuleKey {
    pub const ALL: [RuleKey; 19] = [
        RuleKey::Type,
        RuleKey::Required,
        RuleKey::Length,
        RuleKey::MinLength,
        RuleKey::MaxLength,
        RuleKey::RuleTitle,
        RuleKey::Pattern,
        RuleKey::Matches,
        RuleKey::EqualTo,
        RuleKey::ErrorMessage,
        RuleKey::MimeType,
        RuleKey::FileSize,
        RuleKey::MinFileSize,
        RuleKey::MaxFileSize,
        RuleKey::NumOfFiles,
        RuleKey::MinNumOfFiles,
        RuleKey::MaxNumOfFiles,
        RuleKey::InvalidField,
        RuleKey::ProhibitedWords,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RuleKey::Type => "type",
            RuleKey::Required => "required",
            RuleKey::Length => "length",
            RuleKey::MinLength => "minLength",
            RuleKey::MaxLength => "maxLength",
            RuleKey::RuleTitle => "ruleTitle",
            RuleKey::Pattern => "pattern",
            RuleKey::Matches => "matches",
            RuleKey::EqualTo => "equalTo",
            RuleKey::ErrorMessage => "errorMessage",
            RuleKey::MimeType => "mimeType",
            RuleKey::FileSize => "fileSize",
            RuleKey::MinFileSize => "minFileSize",
            RuleKey::MaxFileSize => "maxFileSize",
            RuleKey::NumOfFiles => "numOfFiles",
            RuleKey::MinNumOfFiles => "minNumOfFiles",
            RuleKey::MaxNumOfFiles => "maxNumOfFiles",
            RuleKey::InvalidField => "invalidField",
            RuleKey::ProhibitedWords => "prohibitedWords",
        }
    }

    /// Whether the key may be declared in a rule set of the given kind
    pub fn is_declarable(&self, kind: FieldKind) -> bool {
        if *self == RuleKey::ErrorMessage {
            return true;
        }
        match kind {
            FieldKind::Value => rules::value_rule_builder(*self).is_some(),
            FieldKind::File => rules::file_rule_builder(*self).is_some(),
        }
    }

    /// Whether a custom message may be supplied for the key on the given kind
    fn accepts_message(&self, kind: FieldKind) -> bool {
        match self {
            RuleKey::ErrorMessage => false,
            RuleKey::InvalidField | RuleKey::ProhibitedWords => kind == FieldKind::Value,
            other => other.is_declarable(kind),
        }
    }
}

impl fmt::Display for RuleKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RuleKey {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        RuleKey::ALL
            .iter()
            .copied()
            .find(|key| key.as_str() == s)
            .ok_or_else(|| format!("Unknown rule key: {}", s))
    }
}

/// Value types accepted by the `type` rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    String,
    Number,
    Boolean,
    File,
}

impl ValueType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValueType::String => "string",
            ValueType::Number => "number",
            ValueType::Boolean => "boolean",
            ValueType::File => "file",
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ValueType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "string" => Ok(ValueType::String),
            "number" => Ok(ValueType::Number),
            "boolean" => Ok(ValueType::Boolean),
            "file" => Ok(ValueType::File),
            _ => Err(format!("Unknown type: {}", s)),
        }
    }
}

/// Whether a field holds scalar values or file uploads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    Value,
    File,
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldKind::Value => write!(f, "non-file"),
            FieldKind::File => write!(f, "file"),
        }
    }
}

/// Custom messages from a field's `errorMessage` mapping
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorMessages {
    overrides: HashMap<RuleKey, String>,
}

impl ErrorMessages {
    fn compile(field: &str, kind: FieldKind, value: &Value) -> Result<Self> {
        let map = value.as_object().ok_or_else(|| {
            EngineError::schema_error(format!(
                "errorMessage on field '{}' must be a mapping of rule keys to messages",
                field
            ))
        })?;

        let mut overrides = HashMap::with_capacity(map.len());
        for (key, message) in map {
            let rule = key
                .parse::<RuleKey>()
                .ok()
                .filter(|rule| rule.accepts_message(kind))
                .ok_or_else(|| {
                    EngineError::schema_error(format!(
                        "errorMessage on field '{}' names unknown rule '{}'",
                        field, key
                    ))
                })?;
            let message = message.as_str().ok_or_else(|| {
                EngineError::schema_error(format!(
                    "errorMessage.{} on field '{}' must be a string",
                    key, field
                ))
            })?;
            overrides.insert(rule, message.to_string());
        }

        Ok(Self { overrides })
    }

    /// Custom message for a rule, if one was supplied
    pub fn get(&self, rule: RuleKey) -> Option<&str> {
        self.overrides.get(&rule).map(String::as_str)
    }

    /// Custom message for a rule, or the rule's default
    pub fn resolve(&self, rule: RuleKey, default: String) -> String {
        match self.overrides.get(&rule) {
            Some(custom) => custom.clone(),
            None => default,
        }
    }
}

/// One compiled field: its rules in declaration order and its messages
#[derive(Debug)]
pub struct CompiledField<R: ?Sized> {
    rules: Vec<Box<R>>,
    messages: ErrorMessages,
}

impl<R: ?Sized> CompiledField<R> {
    pub fn rules(&self) -> &[Box<R>] {
        &self.rules
    }

    pub fn messages(&self) -> &ErrorMessages {
        &self.messages
    }
}

impl CompiledField<dyn ValueRule> {
    /// Keys of the compiled rules, in evaluation order
    pub fn rule_keys(&self) -> Vec<RuleKey> {
        self.rules.iter().map(|rule| rule.key()).collect()
    }
}

impl CompiledField<dyn FileRule> {
    /// Keys of the compiled rules, in evaluation order
    pub fn rule_keys(&self) -> Vec<RuleKey> {
        self.rules.iter().map(|rule| rule.key()).collect()
    }
}

/// Compiled non-file field
pub type ValueField = CompiledField<dyn ValueRule>;

/// Compiled file field
pub type FileField = CompiledField<dyn FileRule>;

/// Compiled schema, partitioned into non-file and file fields
#[derive(Debug, Default)]
pub struct Schema {
    value_fields: OrderedMap<String, ValueField>,
    file_fields: OrderedMap<String, FileField>,
}

impl Schema {
    /// Create an empty schema
    pub fn new() -> Self {
        Self::default()
    }

    /// Compile a JSON schema document
    pub fn compile(raw: &Value, patterns: &PatternLibrary) -> Result<Self> {
        let fields = raw.as_object().ok_or_else(|| {
            EngineError::schema_error("schema must be a mapping of field names to rule sets")
        })?;
        if fields.is_empty() {
            return Err(EngineError::schema_error(
                "schema must declare at least one field",
            ));
        }

        let mut schema = Schema::new();
        for (name, rule_set) in fields {
            if name.trim().is_empty() {
                return Err(EngineError::schema_error("field names must not be empty"));
            }
            match compile_field(name, rule_set, patterns)? {
                Compiled::Value(field) => {
                    schema.value_fields.insert(name.clone(), field);
                }
                Compiled::File(field) => {
                    schema.file_fields.insert(name.clone(), field);
                }
            }
        }

        tracing::debug!(
            fields = schema.value_fields.len(),
            file_fields = schema.file_fields.len(),
            "compiled schema"
        );
        Ok(schema)
    }

    /// Merge another schema into this one, last write wins per field
    ///
    /// A field keeps its position when redeclared. Redeclaring a field with
    /// the other classification is rejected and leaves `self` unchanged.
    /// Returns the names of the merged fields.
    pub fn merge(&mut self, other: Schema) -> Result<Vec<String>> {
        for (name, _) in other.value_fields.iter() {
            if self.file_fields.contains_key(name) {
                return Err(reclassified(name, FieldKind::File));
            }
        }
        for (name, _) in other.file_fields.iter() {
            if self.value_fields.contains_key(name) {
                return Err(reclassified(name, FieldKind::Value));
            }
        }

        let mut merged = Vec::with_capacity(other.len());
        for (name, field) in other.value_fields {
            merged.push(name.clone());
            self.value_fields.insert(name, field);
        }
        for (name, field) in other.file_fields {
            merged.push(name.clone());
            self.file_fields.insert(name, field);
        }
        Ok(merged)
    }

    /// Non-file fields in declaration order
    pub fn value_fields(&self) -> impl Iterator<Item = (&str, &ValueField)> + '_ {
        self.value_fields.iter().map(|(name, field)| (name.as_str(), field))
    }

    /// File fields in declaration order
    pub fn file_fields(&self) -> impl Iterator<Item = (&str, &FileField)> + '_ {
        self.file_fields.iter().map(|(name, field)| (name.as_str(), field))
    }

    /// Classification of a declared field
    pub fn field_kind(&self, name: &str) -> Option<FieldKind> {
        if self.value_fields.contains_key(name) {
            Some(FieldKind::Value)
        } else if self.file_fields.contains_key(name) {
            Some(FieldKind::File)
        } else {
            None
        }
    }

    /// Number of declared fields
    pub fn len(&self) -> usize {
        self.value_fields.len() + self.file_fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn reclassified(name: &str, existing: FieldKind) -> EngineError {
    EngineError::schema_error(format!(
        "field '{}' is already declared as a {} field and cannot change classification",
        name, existing
    ))
}

enum Compiled {
    Value(ValueField),
    File(FileField),
}

fn compile_field(name: &str, rule_set: &Value, patterns: &PatternLibrary) -> Result<Compiled> {
    let declared = rule_set.as_object().ok_or_else(|| {
        EngineError::schema_error(format!(
            "rules for field '{}' must be a mapping of rule keys to values",
            name
        ))
    })?;

    let kind = match declared.get("type").and_then(Value::as_str) {
        Some("file") => FieldKind::File,
        _ => FieldKind::Value,
    };

    let mut messages = ErrorMessages::default();
    let mut value_rules: Vec<Box<dyn ValueRule>> = Vec::new();
    let mut file_rules: Vec<Box<dyn FileRule>> = Vec::new();

    for (key, value) in declared {
        let rule_key = key
            .parse::<RuleKey>()
            .ok()
            .filter(|rule_key| rule_key.is_declarable(kind))
            .ok_or_else(|| {
                EngineError::schema_error(format!(
                    "unknown rule key '{}' on {} field '{}'",
                    key, kind, name
                ))
            })?;

        if value.is_null() {
            return Err(EngineError::schema_error(format!(
                "rule '{}' on field '{}' has no value",
                key, name
            )));
        }

        if rule_key == RuleKey::ErrorMessage {
            messages = ErrorMessages::compile(name, kind, value)?;
            continue;
        }

        let spec = RuleSpec {
            field: name,
            key: rule_key,
            value,
            patterns,
        };
        match kind {
            FieldKind::Value => {
                if let Some(build) = rules::value_rule_builder(rule_key) {
                    value_rules.extend(build(&spec)?);
                }
            }
            FieldKind::File => {
                if let Some(build) = rules::file_rule_builder(rule_key) {
                    file_rules.extend(build(&spec)?);
                }
            }
        }
    }

    Ok(match kind {
        FieldKind::Value => Compiled::Value(CompiledField {
            rules: value_rules,
            messages,
        }),
        FieldKind::File => Compiled::File(CompiledField {
            rules: file_rules,
            messages,
        }),
    })
}
