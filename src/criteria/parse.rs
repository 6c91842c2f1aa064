//! Parsing raw JSON criteria into the typed tree.
//!
//! Every node is parsed even after an error has been found, and all errors
//! are combined, so one pass reports every defect in the schema.

use indexmap::IndexMap;
use regex::Regex;
use serde_json::{Map, Value};
use stillwater::prelude::*;
use stillwater::Validation;

use super::{Directive, Rule, RuleBody, RuleSet};
use crate::error::{ConfigError, ConfigErrors};
use crate::options::{UnknownTypePolicy, ValidatorOptions};
use crate::path::FieldPath;
use crate::types::TypeTag;

type Parsed<T> = Validation<T, ConfigErrors>;

fn fail<T>(error: ConfigError) -> Parsed<T> {
    Validation::Failure(ConfigErrors::single(error))
}

/// Collects successes in order, or combines every failure.
fn collect<T>(results: impl IntoIterator<Item = Parsed<T>>) -> Parsed<Vec<T>> {
    let mut values = Vec::new();
    let mut errors: Option<ConfigErrors> = None;

    for result in results {
        match result {
            Validation::Success(v) => values.push(v),
            Validation::Failure(e) => {
                errors = Some(match errors {
                    Some(acc) => acc.combine(e),
                    None => e,
                });
            }
        }
    }

    match errors {
        Some(e) => Validation::Failure(e),
        None => Validation::Success(values),
    }
}

pub(super) fn parse_criteria(
    raw: &Value,
    options: &ValidatorOptions,
) -> Parsed<IndexMap<String, Vec<RuleSet>>> {
    let Some(sections) = raw.as_object() else {
        return fail(ConfigError::CriteriaNotAnObject);
    };

    let parsed = sections
        .iter()
        .map(|(name, value)| parse_section(name, value, options).map(|sets| (name.clone(), sets)));

    collect(parsed).map(|pairs| pairs.into_iter().collect())
}

fn parse_section(name: &str, value: &Value, options: &ValidatorOptions) -> Parsed<Vec<RuleSet>> {
    let Some(items) = value.as_array() else {
        return fail(ConfigError::CriteriaNotASequence {
            section: name.to_string(),
        });
    };

    let section_path = FieldPath::from_field(name);
    collect(items.iter().enumerate().map(|(index, item)| match item.as_object() {
        Some(fields) => parse_fields(&section_path, fields, 1, options).map(RuleSet::new),
        None => fail(ConfigError::RuleSetNotAnObject {
            section: name.to_string(),
            index,
        }),
    }))
}

/// Parses an object of `field path -> rule` entries at the given depth.
fn parse_fields(
    parent: &FieldPath,
    fields: &Map<String, Value>,
    depth: usize,
    options: &ValidatorOptions,
) -> Parsed<IndexMap<FieldPath, Rule>> {
    let parsed = fields.iter().map(|(key, value)| {
        let Some(field) = FieldPath::parse(key) else {
            return fail(ConfigError::EmptyFieldPath {
                parent: parent.to_string(),
                key: key.clone(),
            });
        };
        let report_path = parent.join(&field);
        parse_rule(&report_path, value, depth, options).map(|rule| (field, rule))
    });

    collect(parsed).map(|pairs| pairs.into_iter().collect())
}

fn parse_rule(path: &FieldPath, raw: &Value, depth: usize, options: &ValidatorOptions) -> Parsed<Rule> {
    if depth > options.max_depth() {
        return fail(ConfigError::DepthExceeded {
            path: path.to_string(),
            depth,
            max_depth: options.max_depth(),
        });
    }

    let Some(entries) = raw.as_object() else {
        return fail(ConfigError::RuleNotAnObject {
            path: path.to_string(),
        });
    };

    let mut required = Validation::Success(false);
    let mut directives = Vec::new();
    let mut mixed_directive: Option<&str> = None;
    let mut nested = Map::new();

    for (key, value) in entries {
        match key.as_str() {
            "$req" | "$required" => required = parse_required(path, key, value),
            k if k.starts_with('$') => {
                if is_known_directive(k) && mixed_directive.is_none() {
                    mixed_directive = Some(k);
                }
                directives.push(parse_directive(path, key, value, options));
            }
            _ => {
                nested.insert(key.clone(), value.clone());
            }
        }
    }

    let mix_error = match mixed_directive {
        Some(directive) if !nested.is_empty() => fail(ConfigError::InvalidNestedDirectiveMix {
            path: path.to_string(),
            directive: directive.to_string(),
        }),
        _ => Validation::Success(()),
    };

    let body = if nested.is_empty() {
        collect(directives).map(|found| {
            let mut leaf: Vec<Directive> = found.into_iter().flatten().collect();
            leaf.sort_by_key(Directive::rank);
            RuleBody::Leaf(leaf)
        })
    } else {
        // Directive errors still surface next to nested ones.
        both(collect(directives), parse_fields(path, &nested, depth + 1, options))
            .map(|(_, children)| RuleBody::Nested(children))
    };

    both(both(required, mix_error), body).map(|((required, ()), body)| Rule::new(required, body))
}

/// Pairs two results, combining the errors when both fail.
fn both<A, B>(a: Parsed<A>, b: Parsed<B>) -> Parsed<(A, B)> {
    match (a, b) {
        (Validation::Success(a), Validation::Success(b)) => Validation::Success((a, b)),
        (Validation::Failure(e), Validation::Success(_))
        | (Validation::Success(_), Validation::Failure(e)) => Validation::Failure(e),
        (Validation::Failure(a), Validation::Failure(b)) => Validation::Failure(a.combine(b)),
    }
}

fn is_known_directive(key: &str) -> bool {
    matches!(
        key,
        "$type" | "$eq" | "$equals" | "$in" | "$oneOf" | "$pattern"
    )
}

fn parse_required(path: &FieldPath, key: &str, value: &Value) -> Parsed<bool> {
    match value.as_bool() {
        Some(flag) => Validation::Success(flag),
        None => fail(ConfigError::InvalidDirectiveValue {
            path: path.to_string(),
            directive: key.to_string(),
            expected: "a boolean",
        }),
    }
}

/// Parses one non-`$req` directive. `Success(None)` means the directive was
/// dropped under [`UnknownTypePolicy::Ignore`].
fn parse_directive(
    path: &FieldPath,
    key: &str,
    value: &Value,
    options: &ValidatorOptions,
) -> Parsed<Option<Directive>> {
    let invalid = |expected: &'static str| {
        fail(ConfigError::InvalidDirectiveValue {
            path: path.to_string(),
            directive: key.to_string(),
            expected,
        })
    };

    match key {
        "$type" => {
            let Some(name) = value.as_str() else {
                return invalid("a type tag string");
            };
            match (TypeTag::parse(name), options.unknown_type_policy()) {
                (Some(tag), _) => Validation::Success(Some(Directive::Type(tag))),
                (None, UnknownTypePolicy::Reject) => fail(ConfigError::UnknownTypeTag {
                    path: path.to_string(),
                    tag: name.to_string(),
                }),
                (None, UnknownTypePolicy::Ignore) => {
                    tracing::warn!(
                        target: "reqguard",
                        path = %path,
                        tag = name,
                        "ignoring unknown type tag, values at this path are not type checked"
                    );
                    Validation::Success(None)
                }
            }
        }
        "$eq" | "$equals" => Validation::Success(Some(Directive::Equals(value.clone()))),
        "$in" | "$oneOf" => match value.as_array() {
            Some(allowed) => Validation::Success(Some(Directive::OneOf(allowed.clone()))),
            None => invalid("an array of allowed values"),
        },
        "$pattern" => {
            let Some(pattern) = value.as_str() else {
                return invalid("a regular expression string");
            };
            match Regex::new(pattern) {
                Ok(regex) => Validation::Success(Some(Directive::Pattern(regex))),
                Err(e) => fail(ConfigError::InvalidPattern {
                    path: path.to_string(),
                    pattern: pattern.to_string(),
                    message: e.to_string(),
                }),
            }
        }
        other => fail(ConfigError::UnknownDirective {
            path: path.to_string(),
            directive: other.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::criteria::Criteria;
    use serde_json::json;

    fn parse_err(raw: Value) -> ConfigErrors {
        Criteria::parse(&raw).unwrap_err()
    }

    #[test]
    fn test_leaf_directives_sorted_into_evaluation_order() {
        let criteria = Criteria::parse(&json!({
            "body": [{ "code": { "$pattern": "^[A-Z]+$", "$in": ["AB"], "$eq": "AB", "$type": "string" } }]
        }))
        .unwrap();

        let rule = criteria.section("body").unwrap()[0].get("code").unwrap();
        let RuleBody::Leaf(directives) = rule.body() else {
            panic!("expected a leaf rule");
        };
        let ranks: Vec<u8> = directives.iter().map(Directive::rank).collect();
        assert_eq!(ranks, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_nested_rule_with_required() {
        let criteria = Criteria::parse(&json!({
            "body": [{ "address": { "$req": true, "city": { "$req": true } } }]
        }))
        .unwrap();

        let rule = criteria.section("body").unwrap()[0].get("address").unwrap();
        assert!(rule.is_required());
        assert!(matches!(rule.body(), RuleBody::Nested(children) if children.len() == 1));
        assert_eq!(criteria.depth(), 2);
    }

    #[test]
    fn test_aliases_are_accepted() {
        let criteria = Criteria::parse(&json!({
            "query": [{ "sort": { "$required": true, "$oneOf": ["asc", "desc"], "$equals": "asc" } }]
        }))
        .unwrap();
        let rule = criteria.section("query").unwrap()[0].get("sort").unwrap();
        assert!(rule.is_required());
    }

    #[test]
    fn test_root_must_be_object() {
        let errors = parse_err(json!([]));
        assert_eq!(errors.first(), &ConfigError::CriteriaNotAnObject);
    }

    #[test]
    fn test_section_must_be_array() {
        let errors = parse_err(json!({ "body": { "email": { "$req": true } } }));
        assert_eq!(
            errors.first(),
            &ConfigError::CriteriaNotASequence {
                section: "body".to_string()
            }
        );
    }

    #[test]
    fn test_rule_set_and_rule_shapes() {
        let errors = parse_err(json!({ "body": [42, { "email": true }] }));
        assert_eq!(errors.len(), 2);
        assert_eq!(errors.with_code("rule_set_not_an_object").len(), 1);
        assert_eq!(errors.with_code("rule_not_an_object").len(), 1);
    }

    #[test]
    fn test_nested_mixed_with_directive_is_rejected() {
        let errors = parse_err(json!({
            "body": [{ "address": { "city": { "$req": true }, "$type": "object" } }]
        }));
        assert_eq!(
            errors.first(),
            &ConfigError::InvalidNestedDirectiveMix {
                path: "body.address".to_string(),
                directive: "$type".to_string(),
            }
        );
    }

    #[test]
    fn test_unknown_type_tag_rejected_by_default() {
        let errors = parse_err(json!({ "body": [{ "age": { "$type": "numbr" } }] }));
        assert_eq!(
            errors.first(),
            &ConfigError::UnknownTypeTag {
                path: "body.age".to_string(),
                tag: "numbr".to_string(),
            }
        );
    }

    #[test]
    fn test_unknown_type_tag_dropped_when_ignored() {
        let options = ValidatorOptions::new().with_unknown_type_policy(UnknownTypePolicy::Ignore);
        let criteria =
            Criteria::parse_with(&json!({ "body": [{ "age": { "$type": "numbr" } }] }), &options)
                .unwrap();
        let rule = criteria.section("body").unwrap()[0].get("age").unwrap();
        assert!(matches!(rule.body(), RuleBody::Leaf(d) if d.is_empty()));
    }

    #[test]
    fn test_invalid_directive_values() {
        let errors = parse_err(json!({
            "body": [{
                "a": { "$req": "yes" },
                "b": { "$in": "xlsx" },
                "c": { "$pattern": 5 },
                "d": { "$type": 1 }
            }]
        }));
        assert_eq!(errors.len(), 4);
        assert_eq!(errors.with_code("invalid_directive_value").len(), 4);
    }

    #[test]
    fn test_invalid_pattern() {
        let errors = parse_err(json!({ "body": [{ "a": { "$pattern": "[unclosed" } }] }));
        assert_eq!(errors.first().code(), "invalid_pattern");
    }

    #[test]
    fn test_unknown_directive() {
        let errors = parse_err(json!({ "body": [{ "a": { "$min": 3 } }] }));
        assert_eq!(
            errors.first(),
            &ConfigError::UnknownDirective {
                path: "body.a".to_string(),
                directive: "$min".to_string(),
            }
        );
    }

    #[test]
    fn test_empty_field_path() {
        let errors = parse_err(json!({ "body": [{ "a..b": { "$req": true } }] }));
        assert_eq!(errors.first().code(), "empty_field_path");
    }

    #[test]
    fn test_depth_limit() {
        let raw = json!({ "body": [{ "a": { "b": { "c": { "$req": true } } } }] });
        let options = ValidatorOptions::new().with_max_depth(2);
        let errors = Criteria::parse_with(&raw, &options).unwrap_err();
        assert_eq!(
            errors.first(),
            &ConfigError::DepthExceeded {
                path: "body.a.b.c".to_string(),
                depth: 3,
                max_depth: 2,
            }
        );

        assert!(Criteria::parse_with(&raw, &ValidatorOptions::new().with_max_depth(3)).is_ok());
    }

    #[test]
    fn test_errors_accumulate_across_sections() {
        let errors = parse_err(json!({
            "body": [{ "a": { "$type": "numbr" } }],
            "query": "not an array",
            "params": [{ "b": { "c": { "$req": true }, "$eq": 1 } }]
        }));
        assert_eq!(errors.len(), 3);
        let codes: Vec<&str> = errors.iter().map(ConfigError::code).collect();
        assert_eq!(
            codes,
            vec!["unknown_type_tag", "criteria_not_a_sequence", "invalid_nested_directive_mix"]
        );
    }
}
