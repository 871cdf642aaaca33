//! Property tests for the validation engine

use octavalidate_core::{parse_size, EngineError, Report, RuleKey, Validator};
use proptest::prelude::*;
use serde_json::{json, Map, Value};
use std::collections::BTreeSet;

/// Scalar payload values, including empty and whitespace strings
fn scalar() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i32>().prop_map(|n| json!(n)),
        "[a-zA-Z0-9_ !@#.]{0,16}".prop_map(Value::String),
    ]
}

fn payload() -> impl Strategy<Value = Value> {
    prop::collection::btree_map(
        prop_oneof![Just("name"), Just("age"), Just("color"), Just("other")],
        scalar(),
        0..4,
    )
    .prop_map(|fields| {
        let map: Map<String, Value> = fields
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect();
        Value::Object(map)
    })
}

/// Report contents without their insertion order
fn entries(report: &Report) -> BTreeSet<(String, String, String)> {
    report
        .iter()
        .flat_map(|(_, session)| session.iter())
        .flat_map(|(field, errors)| {
            errors
                .iter()
                .map(move |(rule, message)| (field.to_string(), rule.to_string(), message.to_string()))
        })
        .collect()
}

fn validator() -> Validator {
    let mut validator = Validator::new("prop").unwrap();
    validator
        .compile(&json!({
            "name": { "required": true, "ruleTitle": "alphaSpaces", "maxLength": 8 },
            "age": { "type": "number" },
            "color": { "matches": ["red", "green"] }
        }))
        .unwrap();
    validator
}

const UNITS: [(&str, u64); 6] = [
    ("bytes", 1),
    ("kb", 1 << 10),
    ("mb", 1 << 20),
    ("gb", 1 << 30),
    ("tb", 1 << 40),
    ("pb", 1 << 50),
];

proptest! {
    /// Validating the same payload twice gives the same verdict and report.
    #[test]
    fn validate_is_deterministic(payload in payload()) {
        let mut first = validator();
        let a = first.validate(&payload).unwrap();
        let report_a = first.report().clone();

        let b = first.validate(&payload).unwrap();
        prop_assert_eq!(a, b);
        prop_assert_eq!(&report_a, first.report());

        let mut fresh = validator();
        prop_assert_eq!(fresh.validate(&payload).unwrap(), a);
        prop_assert_eq!(fresh.report(), &report_a);
    }

    /// The report only ever reflects the latest payload.
    #[test]
    fn report_tracks_latest_payload(before in payload(), after in payload()) {
        let mut reused = validator();
        reused.validate(&before).unwrap();
        let verdict = reused.validate(&after).unwrap();

        let mut fresh = validator();
        prop_assert_eq!(fresh.validate(&after).unwrap(), verdict);
        prop_assert_eq!(entries(reused.get_errors()), entries(fresh.get_errors()));
    }

    /// Whitespace-only strings never satisfy `required`.
    #[test]
    fn whitespace_is_empty(blank in "[ \t\n]{0,8}") {
        let mut validator = validator();
        let ok = validator.validate(&json!({ "name": blank, "age": 1, "color": "red" })).unwrap();
        prop_assert!(!ok);
        prop_assert!(validator.report().message("prop", "name", RuleKey::Required).is_some());
    }

    /// Numbers and booleans always satisfy `required`.
    #[test]
    fn scalars_are_never_empty(n in any::<i64>(), b in any::<bool>()) {
        let mut validator = Validator::new("prop").unwrap();
        validator.compile(&json!({ "n": { "required": true }, "b": { "required": true } })).unwrap();
        let ok = validator.validate(&json!({ "n": n, "b": b })).unwrap();
        prop_assert!(ok);
    }

    /// Whole amounts scale by the unit, whatever the case and spacing.
    #[test]
    fn size_scales_by_unit(amount in 0u64..10_000, unit in 0usize..6, upper in any::<bool>(), gap in " {0,2}") {
        let (suffix, multiplier) = UNITS[unit];
        let suffix = if upper { suffix.to_uppercase() } else { suffix.to_string() };
        let input = format!("{}{}{}", amount, gap, suffix);
        prop_assert_eq!(parse_size(&input).unwrap(), amount * multiplier);
    }

    /// Unknown units are rejected instead of read as zero.
    #[test]
    fn unknown_units_fail(amount in 0u64..100_000, unit in "(b|xb|kib|mib|k|m|bit|byte)") {
        let err = parse_size(&format!("{}{}", amount, unit)).unwrap_err();
        prop_assert!(matches!(err, EngineError::FormatError(_)));
    }
}
