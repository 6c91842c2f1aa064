//! The recursive rule evaluator.
//!
//! For each rule-set in order, and each field of a rule-set in authoring
//! order, the evaluator:
//!
//! 1. resolves the field path against the current scope;
//! 2. rejects an absent field whose rule carries `$req`;
//! 3. skips the remaining checks of an absent field;
//! 4. descends into nested rules with the resolved value as the new scope;
//! 5. otherwise applies the leaf directives in the order `$type`, `$eq`,
//!    `$in`, `$pattern`.
//!
//! The first violation ends the whole evaluation.

use serde_json::Value;

use crate::criteria::{Directive, Rule, RuleBody, RuleSet};
use crate::error::{Verdict, Violation};
use crate::logging::{DebugSink, EvalEvent};
use crate::options::{EqualityMode, ValidatorOptions};
use crate::path::FieldPath;
use crate::types::string_form;

/// Evaluates parsed rule-sets against a data scope.
///
/// # Example
///
/// ```rust
/// use reqguard::{Criteria, Evaluator, FieldPath, NoopSink, ValidatorOptions};
/// use serde_json::json;
///
/// let criteria = Criteria::parse(&json!({
///     "body": [{ "address": { "$req": true, "city": { "$req": true } } }]
/// })).unwrap();
/// let options = ValidatorOptions::default();
/// let evaluator = Evaluator::new(&options, &NoopSink);
///
/// let verdict = evaluator.evaluate(
///     Some(&json!({ "address": {} })),
///     criteria.section("body").unwrap(),
///     &FieldPath::from_field("body"),
/// );
/// assert_eq!(verdict.violation().unwrap().path.to_string(), "body.address.city");
/// ```
pub struct Evaluator<'a> {
    options: &'a ValidatorOptions,
    sink: &'a dyn DebugSink,
}

impl<'a> Evaluator<'a> {
    pub fn new(options: &'a ValidatorOptions, sink: &'a dyn DebugSink) -> Self {
        Self { options, sink }
    }

    /// Evaluates `rule_sets` against `scope`, reporting paths under `report_path`.
    ///
    /// A `None` scope is a missing section: every field in it is absent.
    pub fn evaluate(
        &self,
        scope: Option<&Value>,
        rule_sets: &[RuleSet],
        report_path: &FieldPath,
    ) -> Verdict {
        rule_sets
            .iter()
            .try_for_each(|set| self.evaluate_fields(scope, set.iter(), report_path, 1))
            .into()
    }

    fn evaluate_fields<'r>(
        &self,
        scope: Option<&Value>,
        mut fields: impl Iterator<Item = (&'r FieldPath, &'r Rule)>,
        report_path: &FieldPath,
        depth: usize,
    ) -> Result<(), Violation> {
        fields.try_for_each(|(field, rule)| self.evaluate_rule(scope, field, rule, report_path, depth))
    }

    fn evaluate_rule(
        &self,
        scope: Option<&Value>,
        field: &FieldPath,
        rule: &Rule,
        report_path: &FieldPath,
        depth: usize,
    ) -> Result<(), Violation> {
        let path = report_path.join(field);
        let actual = field.resolve(scope);
        self.sink.debug(&EvalEvent::FieldResolved {
            path: &path,
            present: actual.is_some(),
        });

        let Some(actual) = actual else {
            return if rule.is_required() {
                Err(self.reject(Violation::missing(path)))
            } else {
                Ok(())
            };
        };

        match rule.body() {
            RuleBody::Nested(children) => {
                self.sink.debug(&EvalEvent::Descended { path: &path, depth });
                self.evaluate_fields(Some(actual), children.iter(), &path, depth + 1)
            }
            RuleBody::Leaf(directives) => directives
                .iter()
                .try_for_each(|directive| self.apply(directive, actual, &path)),
        }
    }

    fn apply(&self, directive: &Directive, actual: &Value, path: &FieldPath) -> Result<(), Violation> {
        let violation = match directive {
            Directive::Type(tag) => {
                if self.options.type_checker().check(Some(actual), *tag) {
                    return Ok(());
                }
                Violation::type_mismatch(path.clone(), tag, actual.to_string())
            }
            Directive::Equals(expected) => {
                if self.equal(actual, expected) {
                    return Ok(());
                }
                Violation::disallowed(path.clone(), string_form(actual), expected.to_string())
            }
            Directive::OneOf(allowed) => {
                if allowed.iter().any(|candidate| self.equal(actual, candidate)) {
                    return Ok(());
                }
                let listed: Vec<String> = allowed.iter().map(Value::to_string).collect();
                Violation::disallowed(
                    path.clone(),
                    string_form(actual),
                    format!("one of [{}]", listed.join(", ")),
                )
            }
            Directive::Pattern(regex) => {
                let text = string_form(actual);
                if regex.is_match(&text) {
                    return Ok(());
                }
                Violation::pattern_mismatch(path.clone(), regex.as_str(), text)
            }
        };
        Err(self.reject(violation))
    }

    fn equal(&self, actual: &Value, expected: &Value) -> bool {
        match (actual, expected) {
            // Integer pairs compare exactly; f64 would merge values above 2^53.
            (Value::Number(a), Value::Number(b)) if a.is_f64() || b.is_f64() => {
                a.as_f64() == b.as_f64()
            }
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::Array(_) | Value::Object(_), _) | (_, Value::Array(_) | Value::Object(_)) => {
                actual == expected
            }
            _ => match self.options.equality_mode() {
                EqualityMode::Strict => actual == expected,
                EqualityMode::Loose => string_form(actual) == string_form(expected),
            },
        }
    }

    fn reject(&self, violation: Violation) -> Violation {
        self.sink.debug(&EvalEvent::Rejected {
            violation: &violation,
        });
        violation
    }
}
