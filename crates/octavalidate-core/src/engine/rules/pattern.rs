//! Regular-expression rules: `pattern` and `ruleTitle`
//!
//! Both only look at non-empty values. A value without a text form (array or
//! object) never matches.

use regex::Regex;

use super::{RuleContext, RuleSpec, ValueRule, Verdict};
use crate::error::Result;
use crate::patterns::{compile_pattern, PatternMatcher};
use crate::schema::RuleKey;
use crate::value::FieldValue;

/// Caller-supplied regular expression
#[derive(Debug, Clone)]
pub struct PatternRule {
    regex: Regex,
}

impl PatternRule {
    pub fn new(regex: Regex) -> Self {
        Self { regex }
    }
}

impl ValueRule for PatternRule {
    fn key(&self) -> RuleKey {
        RuleKey::Pattern
    }

    fn halts_on_failure(&self) -> bool {
        true
    }

    fn evaluate(&self, value: FieldValue<'_>, _ctx: &RuleContext<'_>) -> Verdict {
        if value.is_empty() {
            return Verdict::Pass;
        }
        let matched = value
            .as_text()
            .is_some_and(|text| self.regex.is_match(&text));
        Verdict::check(matched, || {
            "This field does not match the required format".to_string()
        })
    }
}

/// Named semantic or custom pattern
#[derive(Debug, Clone)]
pub struct RuleTitleRule {
    matcher: PatternMatcher,
}

impl RuleTitleRule {
    pub fn new(matcher: PatternMatcher) -> Self {
        Self { matcher }
    }
}

impl ValueRule for RuleTitleRule {
    fn key(&self) -> RuleKey {
        RuleKey::RuleTitle
    }

    fn evaluate(&self, value: FieldValue<'_>, _ctx: &RuleContext<'_>) -> Verdict {
        if value.is_empty() {
            return Verdict::Pass;
        }
        let matched = value
            .as_text()
            .is_some_and(|text| self.matcher.matches(&text));
        Verdict::check(matched, || self.matcher.default_message())
    }
}

pub fn build_pattern(spec: &RuleSpec<'_>) -> Result<Option<Box<dyn ValueRule>>> {
    let source = spec.as_str()?;
    if source.is_empty() {
        return Err(spec.invalid("a non-empty regular expression"));
    }
    let regex = compile_pattern(source).map_err(|e| spec.invalid(&format!("a valid regular expression ({})", e)))?;
    Ok(Some(Box::new(PatternRule::new(regex))))
}

pub fn build_rule_title(spec: &RuleSpec<'_>) -> Result<Option<Box<dyn ValueRule>>> {
    let name = spec.as_str()?;
    let matcher = spec
        .patterns
        .resolve(name)
        .ok_or_else(|| spec.invalid(&format!("a built-in or custom rule name, got '{}'", name)))?;
    Ok(Some(Box::new(RuleTitleRule::new(matcher))))
}
