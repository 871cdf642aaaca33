//! Length bounds rules: `length`, `minLength`, `maxLength`
//!
//! Length is counted in characters for scalars and in elements for arrays
//! (see [`FieldValue::length`]). Empty values are left to `required`.

use super::{plural, Bound, RuleContext, RuleSpec, ValueRule, Verdict};
use crate::error::Result;
use crate::schema::RuleKey;
use crate::value::FieldValue;

#[derive(Debug, Clone, Copy)]
pub struct LengthRule {
    bound: Bound,
    target: usize,
}

impl LengthRule {
    pub fn new(bound: Bound, target: usize) -> Self {
        Self { bound, target }
    }

    pub fn exact(target: usize) -> Self {
        Self::new(Bound::Exact, target)
    }

    pub fn min(target: usize) -> Self {
        Self::new(Bound::Min, target)
    }

    pub fn max(target: usize) -> Self {
        Self::new(Bound::Max, target)
    }
}

impl ValueRule for LengthRule {
    fn key(&self) -> RuleKey {
        match self.bound {
            Bound::Exact => RuleKey::Length,
            Bound::Min => RuleKey::MinLength,
            Bound::Max => RuleKey::MaxLength,
        }
    }

    fn evaluate(&self, value: FieldValue<'_>, _ctx: &RuleContext<'_>) -> Verdict {
        if value.is_empty() {
            return Verdict::Pass;
        }
        let Some(length) = value.length() else {
            return Verdict::Pass;
        };
        let unit = if value.raw().is_some_and(|raw| raw.is_array()) {
            "item"
        } else {
            "character"
        };
        Verdict::check(self.bound.check(length, self.target), || {
            format!(
                "This field must have {} {}",
                self.bound.describe(),
                plural(self.target, unit)
            )
        })
    }
}

pub fn build(spec: &RuleSpec<'_>) -> Result<Option<Box<dyn ValueRule>>> {
    let target = spec.as_count()?;
    let rule = match spec.key {
        RuleKey::MinLength => LengthRule::min(target),
        RuleKey::MaxLength => LengthRule::max(target),
        _ => LengthRule::exact(target),
    };
    Ok(Some(Box::new(rule)))
}
