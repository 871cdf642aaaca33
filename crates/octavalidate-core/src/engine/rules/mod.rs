//! Rule framework for payload validation
//!
//! Every rule a schema can declare compiles into a boxed rule object. Rules
//! for non-file fields implement [`ValueRule`], rules for file fields
//! implement [`FileRule`]. Both are built from a [`RuleSpec`] through the
//! `RuleKey`-keyed dispatch tables in this module.

pub mod bounds;
pub mod enum_check;
pub mod files;
pub mod pattern;
pub mod required;
pub mod strict;
pub mod type_check;

use serde_json::{Map, Value};
use std::fmt;

use crate::error::{EngineError, Result};
use crate::patterns::PatternLibrary;
use crate::schema::RuleKey;
use crate::size::ByteSize;
use crate::value::{FieldValue, FileSet};

/// Outcome of evaluating one rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Pass,
    /// Failed, with the rule's default message
    Fail(String),
}

impl Verdict {
    pub fn is_pass(&self) -> bool {
        matches!(self, Verdict::Pass)
    }

    /// Fail unless `ok` holds
    pub fn check(ok: bool, message: impl FnOnce() -> String) -> Self {
        if ok {
            Verdict::Pass
        } else {
            Verdict::Fail(message())
        }
    }
}

/// Context provided to rules during evaluation
#[derive(Debug, Clone, Copy)]
pub struct RuleContext<'a> {
    /// Name of the field being validated
    pub field: &'a str,
    /// The whole payload, for rules that look at sibling fields
    pub payload: &'a Map<String, Value>,
    /// Whether the validator runs in strict mode
    pub strict_mode: bool,
}

/// Rule over the value of a non-file field
///
/// Rules are pure: they inspect the value and return a verdict without
/// touching the report.
pub trait ValueRule: Send + Sync + fmt::Debug {
    /// Key the rule reports under
    fn key(&self) -> RuleKey;

    /// Whether a failure stops evaluation of the field's remaining rules
    fn halts_on_failure(&self) -> bool {
        false
    }

    fn evaluate(&self, value: FieldValue<'_>, ctx: &RuleContext<'_>) -> Verdict;
}

/// Rule over the files supplied for a file field
pub trait FileRule: Send + Sync + fmt::Debug {
    /// Key the rule reports under
    fn key(&self) -> RuleKey;

    /// Whether a failure stops evaluation of the field's remaining rules
    fn halts_on_failure(&self) -> bool {
        false
    }

    fn evaluate(&self, files: &FileSet) -> Verdict;
}

/// A declared rule, as handed to the rule builders
#[derive(Debug, Clone, Copy)]
pub struct RuleSpec<'a> {
    /// Field the rule is declared on
    pub field: &'a str,
    pub key: RuleKey,
    /// Raw value from the schema, never `null`
    pub value: &'a Value,
    /// Patterns `ruleTitle` may refer to
    pub patterns: &'a PatternLibrary,
}

impl RuleSpec<'_> {
    /// Schema error naming this rule
    pub fn invalid(&self, expected: &str) -> EngineError {
        EngineError::schema_error(format!(
            "rule '{}' on field '{}' must be {}",
            self.key, self.field, expected
        ))
    }

    pub fn as_bool(&self) -> Result<bool> {
        self.value.as_bool().ok_or_else(|| self.invalid("a boolean"))
    }

    /// Non-negative integer
    pub fn as_count(&self) -> Result<usize> {
        self.value
            .as_u64()
            .and_then(|n| usize::try_from(n).ok())
            .ok_or_else(|| self.invalid("a non-negative integer"))
    }

    pub fn as_str(&self) -> Result<&str> {
        self.value.as_str().ok_or_else(|| self.invalid("a string"))
    }

    /// Size string such as `"5MB"`, or a plain byte count
    pub fn as_size(&self) -> Result<ByteSize> {
        match self.value {
            Value::String(s) => ByteSize::parse(s),
            Value::Number(n) => n
                .as_u64()
                .map(ByteSize::from_bytes)
                .ok_or_else(|| self.invalid("a size such as \"5MB\"")),
            _ => Err(self.invalid("a size such as \"5MB\"")),
        }
    }
}

/// Comparison applied by the length, count and size rules
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    Exact,
    Min,
    Max,
}

impl Bound {
    pub fn check<T: PartialOrd>(&self, actual: T, target: T) -> bool {
        match self {
            Bound::Exact => actual == target,
            Bound::Min => actual >= target,
            Bound::Max => actual <= target,
        }
    }

    pub fn describe(&self) -> &'static str {
        match self {
            Bound::Exact => "exactly",
            Bound::Min => "at least",
            Bound::Max => "at most",
        }
    }
}

/// Builds a value rule; `None` when the declaration is a no-op
pub type ValueRuleBuilder = fn(&RuleSpec<'_>) -> Result<Option<Box<dyn ValueRule>>>;

/// Builds a file rule; `None` when the declaration is a no-op
pub type FileRuleBuilder = fn(&RuleSpec<'_>) -> Result<Option<Box<dyn FileRule>>>;

const VALUE_RULES: &[(RuleKey, ValueRuleBuilder)] = &[
    (RuleKey::Type, type_check::build),
    (RuleKey::Required, required::build),
    (RuleKey::Length, bounds::build),
    (RuleKey::MinLength, bounds::build),
    (RuleKey::MaxLength, bounds::build),
    (RuleKey::RuleTitle, pattern::build_rule_title),
    (RuleKey::Pattern, pattern::build_pattern),
    (RuleKey::Matches, enum_check::build_matches),
    (RuleKey::EqualTo, enum_check::build_equal_to),
];

const FILE_RULES: &[(RuleKey, FileRuleBuilder)] = &[
    (RuleKey::Type, files::build_type),
    (RuleKey::Required, required::build_file),
    (RuleKey::MimeType, files::build_mime_type),
    (RuleKey::FileSize, files::build_size),
    (RuleKey::MinFileSize, files::build_size),
    (RuleKey::MaxFileSize, files::build_size),
    (RuleKey::NumOfFiles, files::build_count),
    (RuleKey::MinNumOfFiles, files::build_count),
    (RuleKey::MaxNumOfFiles, files::build_count),
];

/// Builder for a rule key on non-file fields
pub fn value_rule_builder(key: RuleKey) -> Option<ValueRuleBuilder> {
    VALUE_RULES
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(_, build)| *build)
}

/// Builder for a rule key on file fields
pub fn file_rule_builder(key: RuleKey) -> Option<FileRuleBuilder> {
    FILE_RULES
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(_, build)| *build)
}

/// `"1 file"` / `"3 files"`
pub(crate) fn plural(count: usize, noun: &str) -> String {
    if count == 1 {
        format!("{} {}", count, noun)
    } else {
        format!("{} {}s", count, noun)
    }
}
