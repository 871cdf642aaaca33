//! Allowed-value rules: `matches` and `equalTo`

use serde_json::Value;

use super::{RuleContext, RuleSpec, ValueRule, Verdict};
use crate::error::Result;
use crate::schema::RuleKey;
use crate::value::FieldValue;

/// Value must equal one entry of a list
///
/// Comparison is case-sensitive only in strict mode. Empty values are judged
/// like any other.
#[derive(Debug, Clone)]
pub struct MatchesRule {
    allowed: Vec<String>,
}

impl MatchesRule {
    pub fn new(allowed: Vec<String>) -> Self {
        Self { allowed }
    }

    fn is_allowed(&self, text: &str, case_sensitive: bool) -> bool {
        if case_sensitive {
            self.allowed.iter().any(|candidate| candidate == text)
        } else {
            let text = text.to_lowercase();
            self.allowed
                .iter()
                .any(|candidate| candidate.to_lowercase() == text)
        }
    }
}

impl ValueRule for MatchesRule {
    fn key(&self) -> RuleKey {
        RuleKey::Matches
    }

    fn evaluate(&self, value: FieldValue<'_>, ctx: &RuleContext<'_>) -> Verdict {
        let allowed = value
            .as_text()
            .is_some_and(|text| self.is_allowed(&text, ctx.strict_mode));
        Verdict::check(allowed, || {
            format!("Value must be one of: {}", self.allowed.join(", "))
        })
    }
}

/// Value must equal another field of the same payload
#[derive(Debug, Clone)]
pub struct EqualToRule {
    other: String,
}

impl EqualToRule {
    pub fn new(other: impl Into<String>) -> Self {
        Self {
            other: other.into(),
        }
    }
}

impl ValueRule for EqualToRule {
    fn key(&self) -> RuleKey {
        RuleKey::EqualTo
    }

    fn evaluate(&self, value: FieldValue<'_>, ctx: &RuleContext<'_>) -> Verdict {
        let Some(raw) = value.raw().filter(|_| !value.is_empty()) else {
            return Verdict::Pass;
        };
        let equal = ctx.payload.get(&self.other).is_some_and(|other| other == raw);
        Verdict::check(equal, || format!("This field must match '{}'", self.other))
    }
}

pub fn build_matches(spec: &RuleSpec<'_>) -> Result<Option<Box<dyn ValueRule>>> {
    let items = spec
        .value
        .as_array()
        .ok_or_else(|| spec.invalid("a list of strings"))?;

    let allowed = items
        .iter()
        .map(|item| match item {
            Value::String(s) => Ok(s.clone()),
            Value::Number(n) => Ok(n.to_string()),
            _ => Err(spec.invalid("a list of strings")),
        })
        .collect::<Result<Vec<_>>>()?;

    if allowed.is_empty() {
        return Ok(None);
    }
    Ok(Some(Box::new(MatchesRule::new(allowed))))
}

pub fn build_equal_to(spec: &RuleSpec<'_>) -> Result<Option<Box<dyn ValueRule>>> {
    let other = spec.as_str()?.trim();
    if other.is_empty() {
        return Err(spec.invalid("the name of another field"));
    }
    if other == spec.field {
        return Err(spec.invalid("the name of a different field"));
    }
    Ok(Some(Box::new(EqualToRule::new(other))))
}
