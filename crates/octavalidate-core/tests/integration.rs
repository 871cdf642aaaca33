//! Integration tests for the validation engine
//!
//! Exercises the public API end to end:
//! - schema compilation and merging
//! - non-file and file field validation
//! - custom messages and self-cleaning reports
//! - strict mode, custom rules and `equalTo`

use octavalidate_core::{
    EngineError, RuleKey, Validator, ValidatorOptions, FIELD_NOT_FOUND, VERSION,
};
use serde_json::{json, Value};

/// Signup schema with custom messages on every field
fn signup_schema() -> Value {
    json!({
        "username": {
            "required": true,
            "ruleTitle": "userName",
            "type": "string",
            "errorMessage": {
                "required": "Your username is required",
                "ruleTitle": "Your username contains invalid characters",
                "type": "Your username must be a string"
            }
        },
        "phone": {
            "required": true,
            "pattern": "/^\\+234[789]\\d{9}$/",
            "type": "string",
            "errorMessage": {
                "required": "Your phone number is required",
                "pattern": "Invalid phone number format"
            }
        },
        "password": {
            "required": true,
            "type": "string",
            "ruleTitle": "strongPassword",
            "errorMessage": {
                "required": "Your password is required",
                "type": "Your password must be a string",
                "ruleTitle": "The password you entered is not strong enough"
            }
        },
        "email": {
            "required": true,
            "type": "string",
            "pattern": "/^[a-zA-Z0-9.!#$%&'*+/=?^_{|}~-]+@[a-zA-Z0-9-]+(?:\\.[a-zA-Z0-9-]+)+$/",
            "errorMessage": {
                "pattern": "The email address you provided is invalid!",
                "required": "Your email is required",
                "type": "Your email must be a string"
            }
        }
    })
}

fn signup_validator() -> Validator {
    let mut validator = Validator::new("test").unwrap();
    assert!(validator.compile(&signup_schema()).unwrap());
    validator
}

#[test]
fn test_valid_payload_passes() {
    let mut validator = signup_validator();
    let payload = json!({
        "username": "user123",
        "phone": "+2347012345678",
        "password": "StrongPass123!",
        "email": "user@example.com"
    });

    assert!(validator.validate(&payload).unwrap());
    assert!(validator.get_error().is_none());
    assert!(validator.get_errors().is_empty());
}

#[test]
fn test_invalid_payload_reports_custom_messages() {
    let mut validator = signup_validator();
    let payload = json!({
        "username": "",
        "phone": "07012345678",
        "password": 123456,
        "email": "userexample.com"
    });

    assert!(!validator.validate(&payload).unwrap());
    let report = validator.get_errors();
    assert_eq!(
        report.message("test", "username", RuleKey::Required),
        Some("Your username is required")
    );
    assert_eq!(
        report.message("test", "phone", RuleKey::Pattern),
        Some("Invalid phone number format")
    );
    assert_eq!(
        report.message("test", "password", RuleKey::RuleTitle),
        Some("The password you entered is not strong enough")
    );
    assert_eq!(
        report.message("test", "password", RuleKey::Type),
        Some("Your password must be a string")
    );
    assert_eq!(
        report.message("test", "email", RuleKey::Pattern),
        Some("The email address you provided is invalid!")
    );
}

#[test]
fn test_edge_case_payload() {
    let mut validator = signup_validator();
    let payload = json!({
        "username": "user_!@#",
        "password": "",
        "email": "",
        "phone": ""
    });

    assert!(!validator.validate(&payload).unwrap());
    let report = validator.get_errors();
    assert_eq!(
        report.message("test", "username", RuleKey::RuleTitle),
        Some("Your username contains invalid characters")
    );
    assert_eq!(
        report.message("test", "password", RuleKey::Required),
        Some("Your password is required")
    );
    assert_eq!(
        report.message("test", "email", RuleKey::Required),
        Some("Your email is required")
    );
    assert_eq!(
        report.message("test", "phone", RuleKey::Required),
        Some("Your phone number is required")
    );
}

#[test]
fn test_passing_rules_clear_previous_failures() {
    let mut validator = signup_validator();
    let bad = json!({
        "username": "user_!@#",
        "phone": "",
        "password": "weak",
        "email": "nope"
    });
    let good = json!({
        "username": "user123",
        "phone": "+2347012345678",
        "password": "StrongPass123!",
        "email": "user@example.com"
    });

    assert!(!validator.validate(&bad).unwrap());
    assert!(validator.get_error().is_some());

    assert!(validator.validate(&good).unwrap());
    assert!(validator.get_error().is_none());
    assert!(validator.get_errors().is_empty());
}

#[test]
fn test_max_length_scenario() {
    let mut validator = Validator::new("form").unwrap();
    validator
        .compile(&json!({ "age": { "maxLength": 2, "required": true } }))
        .unwrap();

    assert!(!validator.validate(&json!({ "age": "300" })).unwrap());
    let report = validator.get_errors();
    assert!(report.message("form", "age", RuleKey::MaxLength).is_some());
    assert!(report.message("form", "age", RuleKey::Required).is_none());
}

#[test]
fn test_missing_field_is_reported() {
    let mut validator = Validator::new("form").unwrap();
    validator
        .compile(&json!({
            "name": { "type": "string" },
            "nickname": { "type": "string", "errorMessage": { "invalidField": "Send a nickname" } }
        }))
        .unwrap();

    assert!(!validator.validate(&json!({})).unwrap());
    let report = validator.report();
    assert_eq!(
        report.message("form", "name", RuleKey::InvalidField),
        Some(FIELD_NOT_FOUND)
    );
    assert_eq!(
        report.message("form", "nickname", RuleKey::InvalidField),
        Some("Send a nickname")
    );

    assert!(validator
        .validate(&json!({ "name": "Ada", "nickname": "ada" }))
        .unwrap());
}

#[test]
fn test_matches_case_handling() {
    let schema = json!({ "color": { "matches": ["red", "green"] } });

    let mut relaxed = Validator::new("form").unwrap();
    relaxed.compile(&schema).unwrap();
    assert!(relaxed.validate(&json!({ "color": "RED" })).unwrap());
    assert!(!relaxed.validate(&json!({ "color": "blue" })).unwrap());

    let options = ValidatorOptions::builder().strict_mode(true).build();
    let mut strict = Validator::with_options("form", options).unwrap();
    strict.compile(&schema).unwrap();
    assert!(!strict.validate(&json!({ "color": "RED" })).unwrap());
    assert!(strict.validate(&json!({ "color": "red" })).unwrap());
}

#[test]
fn test_type_and_matches_judge_empty_values() {
    let mut validator = Validator::new("form").unwrap();
    validator
        .compile(&json!({
            "bio": { "minLength": 3 },
            "color": { "matches": ["red", "green"] },
            "age": { "type": "number" },
            "flag": { "type": "boolean" }
        }))
        .unwrap();

    let payload = json!({ "bio": "", "color": "", "age": null, "flag": true });
    assert!(!validator.validate(&payload).unwrap());
    let report = validator.report();
    assert!(report.message("form", "bio", RuleKey::MinLength).is_none());
    assert_eq!(
        report.message("form", "color", RuleKey::Matches),
        Some("Value must be one of: red, green")
    );
    assert_eq!(
        report.message("form", "age", RuleKey::Type),
        Some("This field must be a number")
    );
    assert_eq!(
        report.message("form", "flag", RuleKey::Type),
        Some("This field must be a boolean")
    );

    assert!(validator
        .validate(&json!({ "bio": "", "color": "red", "age": 7, "flag": "false" }))
        .unwrap());
}

#[test]
fn test_strict_mode_prohibited_words() {
    let options = ValidatorOptions::builder()
        .strict_mode(true)
        .prohibited_word("drop")
        .build();
    let mut validator = Validator::with_options("form", options).unwrap();
    validator
        .compile(&json!({ "comment": { "required": true, "maxLength": 5 } }))
        .unwrap();

    assert!(!validator.validate(&json!({ "comment": "toolong" })).unwrap());
    assert!(validator
        .report()
        .message("form", "comment", RuleKey::MaxLength)
        .is_some());

    // a hit replaces the field's other failures for this pass
    assert!(!validator
        .validate(&json!({ "comment": "Please DROP the NULL table" }))
        .unwrap());
    let field = validator.report().session("form").unwrap().field("comment").unwrap();
    assert_eq!(
        field.get(RuleKey::ProhibitedWords),
        Some("Please remove or replace 'null,drop'")
    );
    assert_eq!(field.len(), 1);

    assert!(validator.validate(&json!({ "comment": "fine" })).unwrap());
    assert!(validator.get_errors().is_empty());
}

#[test]
fn test_strict_mode_off_ignores_words() {
    let mut validator = Validator::new("form").unwrap();
    validator.compile(&json!({ "comment": { "required": true } })).unwrap();
    assert!(validator.validate(&json!({ "comment": "null" })).unwrap());
}

#[test]
fn test_equal_to() {
    let mut validator = Validator::new("signup").unwrap();
    validator
        .compile(&json!({
            "password": { "required": true },
            "confirm": {
                "required": true,
                "equalTo": "password",
                "errorMessage": { "equalTo": "Passwords do not match" }
            }
        }))
        .unwrap();

    assert!(validator
        .validate(&json!({ "password": "Secret1!", "confirm": "Secret1!" }))
        .unwrap());
    assert!(!validator
        .validate(&json!({ "password": "Secret1!", "confirm": "Secret2!" }))
        .unwrap());
    assert_eq!(validator.get_error(), Some("Passwords do not match"));
}

#[test]
fn test_custom_rule_in_schema() {
    let mut validator = Validator::new("form").unwrap();
    validator.custom_rule("zipCode", r"^\d{5}$").unwrap();
    validator
        .compile(&json!({ "zip": { "ruleTitle": "zipCode" } }))
        .unwrap();

    assert!(validator.validate(&json!({ "zip": "90210" })).unwrap());
    assert!(!validator.validate(&json!({ "zip": "9021" })).unwrap());
    assert_eq!(
        validator.get_error(),
        Some("This field does not satisfy the 'zipCode' rule")
    );
}

#[test]
fn test_file_min_count_scenario() {
    let mut validator = Validator::new("upload").unwrap();
    validator
        .compile(&json!({ "photos": { "type": "file", "minNumOfFiles": 2 } }))
        .unwrap();

    let payload = json!({ "photos": { "name": "a.png", "size": 100, "mimetype": "image/png" } });
    assert!(!validator.validate(&payload).unwrap());
    let message = validator
        .report()
        .message("upload", "photos", RuleKey::MinNumOfFiles)
        .unwrap()
        .to_string();
    assert!(message.contains("1 file provided"), "{}", message);
}

#[test]
fn test_file_rules() {
    let mut validator = Validator::new("upload").unwrap();
    validator
        .compile(&json!({
            "avatar": {
                "type": "file",
                "required": true,
                "mimeType": "image/png, image/jpeg",
                "maxFileSize": "1MB",
                "errorMessage": { "required": "Upload an avatar" }
            },
            "attachments": {
                "type": "file",
                "maxNumOfFiles": 2,
                "mimeType": "application/*"
            }
        }))
        .unwrap();

    // missing files are not `invalidField` errors
    assert!(!validator.validate(&json!({})).unwrap());
    let session = validator.report().session("upload").unwrap();
    assert_eq!(
        session.field("avatar").unwrap().get(RuleKey::Required),
        Some("Upload an avatar")
    );
    assert!(session.field("attachments").is_none());

    let payload = json!({
        "avatar": { "name": "me.gif", "size": 2_000_000, "mimetype": "image/gif" },
        "attachments": [
            { "name": "a.pdf", "size": 10, "mimetype": "application/pdf" },
            { "name": "b.zip", "size": 10, "mimetype": "application/zip" },
            { "name": "c.txt", "size": 10, "mimetype": "text/plain" }
        ]
    });
    assert!(!validator.validate(&payload).unwrap());
    let session = validator.report().session("upload").unwrap();
    let avatar = session.field("avatar").unwrap();
    assert!(avatar.contains(RuleKey::MimeType));
    assert!(avatar.contains(RuleKey::MaxFileSize));
    assert!(!avatar.contains(RuleKey::Required));
    let attachments = session.field("attachments").unwrap();
    assert!(attachments.contains(RuleKey::MaxNumOfFiles));
    assert!(attachments.contains(RuleKey::MimeType));

    let payload = json!({
        "avatar": { "name": "me.png", "size": 1024, "mimetype": "image/PNG" },
        "attachments": [{ "name": "a.pdf", "size": 10, "mimetype": "application/pdf" }]
    });
    assert!(validator.validate(&payload).unwrap());
}

#[test]
fn test_schema_errors() {
    let mut validator = Validator::new("form").unwrap();

    let err = validator.compile(&json!({})).unwrap_err();
    assert!(err.is_schema_error());

    let err = validator
        .compile(&json!({ "name": { "requird": true } }))
        .unwrap_err();
    assert!(matches!(err, EngineError::SchemaError(_)));

    let err = validator
        .compile(&json!({ "doc": { "type": "file", "maxFileSize": "5XB" } }))
        .unwrap_err();
    assert!(matches!(err, EngineError::FormatError(_)));
    assert!(err.is_user_error());

    assert!(validator.schema().is_none());
}

#[test]
fn test_non_object_payload_is_input_error() {
    let mut validator = signup_validator();
    for payload in [json!([]), json!("x"), json!(null)] {
        let err = validator.validate(&payload).unwrap_err();
        assert!(matches!(err, EngineError::InputError(_)));
    }
}

#[test]
fn test_merge_keeps_field_order_in_report() {
    let mut validator = Validator::new("form").unwrap();
    validator
        .compile(&json!({ "a": { "required": true }, "b": { "required": true } }))
        .unwrap();
    validator
        .compile(&json!({ "a": { "required": true, "minLength": 3 } }))
        .unwrap();

    assert!(!validator.validate(&json!({ "a": "x", "b": "" })).unwrap());
    let fields: Vec<&str> = validator
        .report()
        .session("form")
        .unwrap()
        .iter()
        .map(|(name, _)| name)
        .collect();
    assert_eq!(fields, vec!["a", "b"]);
    assert_eq!(validator.get_error(), Some("This field is required"));

    let err = validator
        .compile(&json!({ "b": { "type": "file" } }))
        .unwrap_err();
    assert!(matches!(err, EngineError::SchemaError(_)));
}

#[test]
fn test_independent_sessions() {
    let schema = json!({ "name": { "required": true } });
    let mut first = Validator::new("first").unwrap();
    let mut second = Validator::new("second").unwrap();
    first.compile(&schema).unwrap();
    second.compile(&schema).unwrap();

    assert!(!first.validate(&json!({ "name": "" })).unwrap());
    assert!(second.validate(&json!({ "name": "x" })).unwrap());
    assert!(first.report().has_errors("first"));
    assert!(second.report().is_empty());
}

#[test]
fn test_report_serialization() {
    let mut validator = Validator::new("login").unwrap();
    validator
        .compile(&json!({ "email": { "required": true, "ruleTitle": "email" } }))
        .unwrap();
    validator.validate(&json!({ "email": "nope" })).unwrap();

    let value = serde_json::to_value(validator.get_errors()).unwrap();
    assert_eq!(
        value,
        json!({ "login": { "email": { "ruleTitle": "Please provide a valid email address" } } })
    );
}

#[test]
fn test_version_is_set() {
    assert!(!VERSION.is_empty());
}
