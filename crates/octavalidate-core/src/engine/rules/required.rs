//! Required field validation rules
//!
//! `required: true` fails on empty values (see [`FieldValue::is_empty`]) and
//! on file fields with no file at all. `required: false` compiles to nothing.

use super::{FileRule, RuleContext, RuleSpec, ValueRule, Verdict};
use crate::error::Result;
use crate::schema::RuleKey;
use crate::value::{FieldValue, FileSet};

/// Rule for non-file fields that must hold a value
#[derive(Debug, Clone, Copy, Default)]
pub struct RequiredValueRule;

impl ValueRule for RequiredValueRule {
    fn key(&self) -> RuleKey {
        RuleKey::Required
    }

    fn halts_on_failure(&self) -> bool {
        true
    }

    fn evaluate(&self, value: FieldValue<'_>, _ctx: &RuleContext<'_>) -> Verdict {
        Verdict::check(!value.is_empty(), || "This field is required".to_string())
    }
}

/// Rule for file fields that must carry at least one file
#[derive(Debug, Clone, Copy, Default)]
pub struct RequiredFileRule;

impl FileRule for RequiredFileRule {
    fn key(&self) -> RuleKey {
        RuleKey::Required
    }

    fn halts_on_failure(&self) -> bool {
        true
    }

    fn evaluate(&self, files: &FileSet) -> Verdict {
        Verdict::check(!files.is_empty(), || "Please upload a file".to_string())
    }
}

pub fn build(spec: &RuleSpec<'_>) -> Result<Option<Box<dyn ValueRule>>> {
    Ok(spec
        .as_bool()?
        .then(|| Box::new(RequiredValueRule) as Box<dyn ValueRule>))
}

pub fn build_file(spec: &RuleSpec<'_>) -> Result<Option<Box<dyn FileRule>>> {
    Ok(spec
        .as_bool()?
        .then(|| Box::new(RequiredFileRule) as Box<dyn FileRule>))
}
