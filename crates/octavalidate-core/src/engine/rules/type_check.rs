//! Type correctness rule
//!
//! Every value is judged, absent and `null` ones included. Booleans are the
//! literal strings `"true"` and `"false"`.

use serde_json::Value;

use super::{RuleContext, RuleSpec, ValueRule, Verdict};
use crate::error::Result;
use crate::schema::{RuleKey, ValueType};
use crate::value::FieldValue;

#[derive(Debug, Clone, Copy)]
pub struct TypeCheckRule {
    expected: ValueType,
}

impl TypeCheckRule {
    pub fn new(expected: ValueType) -> Self {
        Self { expected }
    }

    fn type_matches(&self, value: Option<&Value>) -> bool {
        let Some(value) = value else {
            return false;
        };
        match self.expected {
            ValueType::String => value.is_string(),
            ValueType::Number => value.is_number(),
            ValueType::Boolean => value.as_str().is_some_and(|s| s == "true" || s == "false"),
            ValueType::File => false,
        }
    }
}

impl ValueRule for TypeCheckRule {
    fn key(&self) -> RuleKey {
        RuleKey::Type
    }

    fn evaluate(&self, value: FieldValue<'_>, _ctx: &RuleContext<'_>) -> Verdict {
        Verdict::check(self.type_matches(value.raw()), || {
            format!("This field must be a {}", self.expected)
        })
    }
}

pub fn build(spec: &RuleSpec<'_>) -> Result<Option<Box<dyn ValueRule>>> {
    let expected = spec
        .as_str()?
        .parse::<ValueType>()
        .map_err(|_| spec.invalid("one of string, number, boolean, file"))?;
    Ok(Some(Box::new(TypeCheckRule::new(expected))))
}
