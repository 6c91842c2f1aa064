//! Data validation failures and the verdict of a validation pass.
//!
//! A [`Violation`] describes the first rule a request broke. It is always
//! returned inside [`Verdict::Invalid`], never raised.

use std::fmt::{self, Display};

use serde::Serialize;

use crate::path::FieldPath;

/// The kind of rule a request violated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationKind {
    /// A `$req` field was absent.
    #[serde(rename = "required")]
    MissingRequiredField,
    /// A `$type` predicate rejected the value.
    TypeMismatch,
    /// A `$eq` or `$in` directive rejected the value.
    DisallowedValue,
    /// A `$pattern` directive did not match the value.
    PatternMismatch,
}

impl ViolationKind {
    /// Machine-readable code for programmatic handling.
    pub fn code(&self) -> &'static str {
        match self {
            ViolationKind::MissingRequiredField => "required",
            ViolationKind::TypeMismatch => "type_mismatch",
            ViolationKind::DisallowedValue => "disallowed_value",
            ViolationKind::PatternMismatch => "pattern_mismatch",
        }
    }
}

impl Display for ViolationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// The first rule violation found in a request.
///
/// # Example
///
/// ```rust
/// use reqguard::{FieldPath, Violation, ViolationKind};
///
/// let violation = Violation::missing(FieldPath::parse("body.email").unwrap());
///
/// assert_eq!(violation.kind, ViolationKind::MissingRequiredField);
/// assert_eq!(violation.path.to_string(), "body.email");
/// assert_eq!(violation.message, "Data in body.email is required");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Violation {
    /// Dotted path to the offending field, prefixed by the section name.
    pub path: FieldPath,
    /// Which directive failed.
    pub kind: ViolationKind,
    /// Human-readable error message.
    pub message: String,
    /// The actual value that was received, in string form.
    pub got: Option<String>,
    /// Description of what was expected.
    pub expected: Option<String>,
}

impl Violation {
    /// Creates a violation with an explicit message.
    pub fn new(path: FieldPath, kind: ViolationKind, message: impl Into<String>) -> Self {
        Self {
            path,
            kind,
            message: message.into(),
            got: None,
            expected: None,
        }
    }

    /// A required field was absent.
    pub fn missing(path: FieldPath) -> Self {
        let message = format!("Data in {} is required", path);
        Self::new(path, ViolationKind::MissingRequiredField, message).with_expected("value")
    }

    /// A value failed the predicate for the declared type tag.
    pub fn type_mismatch(path: FieldPath, tag: impl Display, got: impl Into<String>) -> Self {
        let message = format!("Data type mismatch for {} should be {}", path, tag);
        Self::new(path, ViolationKind::TypeMismatch, message)
            .with_expected(tag.to_string())
            .with_got(got)
    }

    /// A value is not equal to, or not a member of, the allowed values.
    pub fn disallowed(path: FieldPath, got: impl Into<String>, expected: impl Into<String>) -> Self {
        let got = got.into();
        let message = format!("Data in {} cannot be {}", path, got);
        Self::new(path, ViolationKind::DisallowedValue, message)
            .with_expected(expected)
            .with_got(got)
    }

    /// A value's string form does not match the pattern.
    pub fn pattern_mismatch(path: FieldPath, pattern: &str, got: impl Into<String>) -> Self {
        let message = format!("Data in {} does not match {}", path, pattern);
        Self::new(path, ViolationKind::PatternMismatch, message)
            .with_expected(format!("string matching '{}'", pattern))
            .with_got(got)
    }

    /// Sets the "got" field and returns self for chaining.
    pub fn with_got(mut self, got: impl Into<String>) -> Self {
        self.got = Some(got.into());
        self
    }

    /// Sets the "expected" field and returns self for chaining.
    pub fn with_expected(mut self, expected: impl Into<String>) -> Self {
        self.expected = Some(expected.into());
        self
    }

    /// Machine-readable code of the violated rule.
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }
}

impl Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.message)?;

        if let Some(ref expected) = self.expected {
            write!(f, " (expected: {})", expected)?;
        }
        if let Some(ref got) = self.got {
            write!(f, " (got: {})", got)?;
        }

        Ok(())
    }
}

impl std::error::Error for Violation {}

/// The outcome of one validation pass.
#[derive(Debug, Clone, PartialEq)]
pub enum Verdict {
    /// Every section passed.
    Valid,
    /// The first violation found in evaluation order.
    Invalid(Violation),
}

impl Verdict {
    /// Returns true if the request passed.
    pub fn is_valid(&self) -> bool {
        matches!(self, Verdict::Valid)
    }

    /// Returns true if the request failed.
    pub fn is_invalid(&self) -> bool {
        !self.is_valid()
    }

    /// Returns the violation, if any.
    pub fn violation(&self) -> Option<&Violation> {
        match self {
            Verdict::Valid => None,
            Verdict::Invalid(v) => Some(v),
        }
    }

    /// Converts the verdict into a `Result`.
    pub fn into_result(self) -> Result<(), Violation> {
        match self {
            Verdict::Valid => Ok(()),
            Verdict::Invalid(v) => Err(v),
        }
    }
}

impl From<Result<(), Violation>> for Verdict {
    fn from(result: Result<(), Violation>) -> Self {
        match result {
            Ok(()) => Verdict::Valid,
            Err(v) => Verdict::Invalid(v),
        }
    }
}

const _: () = {
    const fn assert_send<T: Send>() {}
    const fn assert_sync<T: Sync>() {}
    assert_send::<Verdict>();
    assert_sync::<Verdict>();
};
