//! Tests for criteria errors and violations.

use reqguard::{
    ConfigError, ConfigErrors, Criteria, UnknownTypePolicy, ValidatorOptions, Verdict, Violation,
    ViolationKind, FieldPath,
};
use serde_json::json;
use stillwater::prelude::*;

#[test]
fn test_all_config_errors_reported() {
    let errors = Criteria::parse(&json!({
        "body": [{
            "a": { "$type": "integer" },
            "b": { "$pattern": "(" },
            "c": { "$max": 3 },
            "d": { "$req": "yes" }
        }],
        "query": {}
    }))
    .unwrap_err();

    let codes: Vec<&str> = errors.iter().map(ConfigError::code).collect();
    assert_eq!(
        codes,
        vec![
            "unknown_type_tag",
            "invalid_pattern",
            "unknown_directive",
            "invalid_directive_value",
            "criteria_not_a_sequence"
        ]
    );
    assert!(errors.to_string().contains("5 error(s)"));
}

#[test]
fn test_config_error_paths() {
    let errors = Criteria::parse(&json!({
        "body": [{ "user": { "name": { "$in": "admin" } } }]
    }))
    .unwrap_err();

    match errors.first() {
        ConfigError::InvalidDirectiveValue { path, directive, .. } => {
            assert_eq!(path.to_string(), "body.user.name");
            assert_eq!(directive, "$in");
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[test]
fn test_criteria_must_be_an_object() {
    let errors = Criteria::parse(&json!(["body"])).unwrap_err();
    assert_eq!(errors.first(), &ConfigError::CriteriaNotAnObject);
}

#[test]
fn test_unknown_type_ignored_by_policy() {
    let options = ValidatorOptions::new().with_unknown_type_policy(UnknownTypePolicy::Ignore);
    let criteria = Criteria::parse_with(&json!({ "body": [{ "a": { "$type": "uuid" } }] }), &options);
    assert!(criteria.is_ok());
}

#[test]
fn test_config_errors_combine() {
    let first = ConfigErrors::single(ConfigError::CriteriaNotAnObject);
    let combined = first.clone().combine(ConfigErrors::from(ConfigError::CriteriaNotASequence {
        section: "body".to_string(),
    }));

    assert_eq!(first.len(), 1);
    assert_eq!(combined.len(), 2);
    assert_eq!(combined.with_code("criteria_not_a_sequence").len(), 1);
    assert_eq!(combined.first(), &ConfigError::CriteriaNotAnObject);
}

#[test]
fn test_violation_display() {
    let violation = Violation::missing(FieldPath::parse("body.email").unwrap());
    assert_eq!(violation.kind, ViolationKind::MissingRequiredField);
    assert!(violation
        .to_string()
        .starts_with("body.email: Data in body.email is required"));
}

#[test]
fn test_verdict_into_result() {
    let violation = Violation::disallowed(FieldPath::from_field("kind"), "c", "one of [\"a\"]");
    let verdict = Verdict::Invalid(violation.clone());

    assert_eq!(verdict.into_result(), Err(violation));
    assert_eq!(Verdict::Valid.into_result(), Ok(()));
}
