//! Validation across request sections.
//!
//! A [`Validator`] walks the sections of its criteria in authoring order and
//! runs the [`Evaluator`] once per section against the matching request
//! scope, stopping at the first section that fails.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::criteria::Criteria;
use crate::error::{ConfigErrors, Verdict};
use crate::evaluator::Evaluator;
use crate::logging::{DebugSink, EvalEvent, TracingSink};
use crate::options::ValidatorOptions;
use crate::path::FieldPath;
use crate::request::RequestSource;

/// Parsed criteria bundled with the options and sink used to evaluate them.
///
/// Cloning is cheap; the criteria are shared.
///
/// # Example
///
/// ```rust
/// use reqguard::Validator;
/// use serde_json::json;
///
/// let validator = Validator::from_raw(&json!({
///     "body": [{ "email": { "$req": true, "$pattern": "^[a-z0-9]+@[a-z0-9]+\\.com$" } }]
/// })).unwrap();
///
/// assert!(validator.validate(&json!({ "body": { "email": "a@b.com" } })).is_valid());
///
/// let verdict = validator.validate(&json!({ "body": {} }));
/// assert_eq!(verdict.violation().unwrap().path.to_string(), "body.email");
/// ```
#[derive(Clone)]
pub struct Validator {
    criteria: Arc<Criteria>,
    options: ValidatorOptions,
    sink: Arc<dyn DebugSink>,
}

impl Validator {
    /// Creates a validator with default options that logs through `tracing`.
    pub fn new(criteria: Criteria) -> Self {
        Self::with_options(criteria, ValidatorOptions::default())
    }

    /// Creates a validator with explicit evaluation options.
    ///
    /// Parse-time options (depth limit, unknown type policy) must already
    /// have been applied when `criteria` was parsed.
    pub fn with_options(criteria: Criteria, options: ValidatorOptions) -> Self {
        Self {
            criteria: Arc::new(criteria),
            options,
            sink: Arc::new(TracingSink),
        }
    }

    /// Parses raw criteria with default options.
    pub fn from_raw(raw: &Value) -> Result<Self, ConfigErrors> {
        Self::from_raw_with(raw, ValidatorOptions::default())
    }

    /// Parses raw criteria with `options` and keeps them for evaluation.
    pub fn from_raw_with(raw: &Value, options: ValidatorOptions) -> Result<Self, ConfigErrors> {
        let criteria = Criteria::parse_with(raw, &options)?;
        Ok(Self::with_options(criteria, options))
    }

    /// Replaces the debug sink.
    pub fn with_sink(mut self, sink: Arc<dyn DebugSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn criteria(&self) -> &Criteria {
        &self.criteria
    }

    pub fn options(&self) -> &ValidatorOptions {
        &self.options
    }

    /// Validates every section of the request, stopping at the first violation.
    ///
    /// Sections absent from the request are evaluated against an empty
    /// scope, so their required fields fail and everything else passes.
    pub fn validate<R: RequestSource + ?Sized>(&self, request: &R) -> Verdict {
        walk(&self.criteria, &self.options, self.sink.as_ref(), request)
    }
}

fn walk<R: RequestSource + ?Sized>(
    criteria: &Criteria,
    options: &ValidatorOptions,
    sink: &dyn DebugSink,
    request: &R,
) -> Verdict {
    let evaluator = Evaluator::new(options, sink);

    for (section, rule_sets) in criteria.sections() {
        sink.debug(&EvalEvent::SectionStarted { section });
        let verdict = evaluator.evaluate(
            request.section(section),
            rule_sets,
            &FieldPath::from_field(section),
        );
        if verdict.is_invalid() {
            return verdict;
        }
        sink.debug(&EvalEvent::SectionPassed { section });
    }

    Verdict::Valid
}

impl fmt::Debug for Validator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Validator")
            .field("criteria", &self.criteria)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

/// Validates a request against parsed criteria with default options.
pub fn validate_all<R: RequestSource + ?Sized>(criteria: &Criteria, request: &R) -> Verdict {
    walk(criteria, &ValidatorOptions::default(), &TracingSink, request)
}

/// Parses raw criteria and validates a request in one step.
///
/// Broken criteria come back as `Err`; a broken request comes back as
/// `Ok(Verdict::Invalid(..))`.
///
/// ```rust
/// use reqguard::validate_raw;
/// use serde_json::json;
///
/// let criteria = json!({ "body": { "email": { "$req": true } } });
/// assert!(validate_raw(&criteria, &json!({ "body": {} })).is_err());
/// ```
pub fn validate_raw<R: RequestSource + ?Sized>(
    raw: &Value,
    request: &R,
) -> Result<Verdict, ConfigErrors> {
    Ok(Validator::from_raw(raw)?.validate(request))
}

const _: () = {
    const fn assert_send<T: Send>() {}
    const fn assert_sync<T: Sync>() {}
    assert_send::<Validator>();
    assert_sync::<Validator>();
};
