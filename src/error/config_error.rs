//! Schema authoring errors.
//!
//! This module provides [`ConfigError`] for a single defect in a criteria
//! tree and [`ConfigErrors`] for the non-empty set of defects found while
//! parsing one. These are never downgraded to a [`Verdict`](crate::Verdict):
//! they describe a broken schema, not a broken request.

use std::fmt::{self, Display};

use stillwater::prelude::*;

/// A single defect in a criteria tree.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// The criteria root is not a JSON object.
    #[error("validation criteria must be an object mapping request sections to rule-set arrays")]
    CriteriaNotAnObject,

    /// A section maps to something other than an array of rule-sets.
    #[error("validation criteria for request section '{section}' must be an array")]
    CriteriaNotASequence { section: String },

    /// An element of a section's array is not an object.
    #[error("rule-set #{index} in section '{section}' must be an object")]
    RuleSetNotAnObject { section: String, index: usize },

    /// A field maps to something other than an object of directives and nested rules.
    #[error("rule for '{path}' must be an object")]
    RuleNotAnObject { path: String },

    /// A field key is empty or contains an empty dotted segment.
    #[error("invalid field path '{key}' under '{parent}'")]
    EmptyFieldPath { parent: String, key: String },

    /// Nested criteria share a level with a directive other than `$req`.
    #[error("nested criteria at '{path}' only validate $req for the parent, found {directive}")]
    InvalidNestedDirectiveMix { path: String, directive: String },

    /// A `$`-prefixed key outside the known directive set.
    #[error("unknown directive '{directive}' at '{path}'")]
    UnknownDirective { path: String, directive: String },

    /// A `$type` directive names a tag outside the known set.
    #[error("unknown type tag '{tag}' at '{path}'")]
    UnknownTypeTag { path: String, tag: String },

    /// A directive carries a value of the wrong shape.
    #[error("directive {directive} at '{path}' expects {expected}")]
    InvalidDirectiveValue {
        path: String,
        directive: String,
        expected: &'static str,
    },

    /// A `$pattern` directive is not a valid regular expression.
    #[error("invalid pattern '{pattern}' at '{path}': {message}")]
    InvalidPattern {
        path: String,
        pattern: String,
        message: String,
    },

    /// The criteria nest deeper than the configured limit.
    #[error("criteria at '{path}' nest {depth} levels deep, limit is {max_depth}")]
    DepthExceeded {
        path: String,
        depth: usize,
        max_depth: usize,
    },
}

impl ConfigError {
    /// Machine-readable code for programmatic handling.
    pub fn code(&self) -> &'static str {
        match self {
            ConfigError::CriteriaNotAnObject => "criteria_not_an_object",
            ConfigError::CriteriaNotASequence { .. } => "criteria_not_a_sequence",
            ConfigError::RuleSetNotAnObject { .. } => "rule_set_not_an_object",
            ConfigError::RuleNotAnObject { .. } => "rule_not_an_object",
            ConfigError::EmptyFieldPath { .. } => "empty_field_path",
            ConfigError::InvalidNestedDirectiveMix { .. } => "invalid_nested_directive_mix",
            ConfigError::UnknownDirective { .. } => "unknown_directive",
            ConfigError::UnknownTypeTag { .. } => "unknown_type_tag",
            ConfigError::InvalidDirectiveValue { .. } => "invalid_directive_value",
            ConfigError::InvalidPattern { .. } => "invalid_pattern",
            ConfigError::DepthExceeded { .. } => "depth_exceeded",
        }
    }
}

/// A non-empty collection of schema authoring errors.
///
/// Parsing a criteria tree reports every defect it finds, not just the
/// first, so a schema author can fix them in one round.
///
/// ```rust
/// use reqguard::{ConfigError, ConfigErrors};
/// use stillwater::prelude::*;
///
/// let errors = ConfigErrors::single(ConfigError::CriteriaNotAnObject).combine(
///     ConfigErrors::single(ConfigError::CriteriaNotASequence {
///         section: "body".to_string(),
///     }),
/// );
/// assert_eq!(errors.len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigErrors(NonEmptyVec<ConfigError>);

impl ConfigErrors {
    /// Creates a collection holding a single error.
    pub fn single(error: ConfigError) -> Self {
        Self(NonEmptyVec::singleton(error))
    }

    /// Returns the number of errors in this collection.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false; the collection is never empty.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Returns an iterator over the contained errors.
    pub fn iter(&self) -> impl Iterator<Item = &ConfigError> {
        self.0.iter()
    }

    /// Returns the first error in discovery order.
    pub fn first(&self) -> &ConfigError {
        self.0.head()
    }

    /// Returns all errors with the given code.
    pub fn with_code(&self, code: &str) -> Vec<&ConfigError> {
        self.0.iter().filter(|e| e.code() == code).collect()
    }
}

impl Semigroup for ConfigErrors {
    fn combine(self, other: Self) -> Self {
        ConfigErrors(self.0.combine(other.0))
    }
}

impl From<ConfigError> for ConfigErrors {
    fn from(error: ConfigError) -> Self {
        Self::single(error)
    }
}

impl Display for ConfigErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "invalid validation criteria, {} error(s):", self.len())?;
        for (i, error) in self.iter().enumerate() {
            writeln!(f, "  {}. {}", i + 1, error)?;
        }
        Ok(())
    }
}

impl std::error::Error for ConfigErrors {}

impl IntoIterator for ConfigErrors {
    type Item = ConfigError;
    type IntoIter = std::vec::IntoIter<ConfigError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_vec().into_iter()
    }
}

const _: () = {
    const fn assert_send<T: Send>() {}
    const fn assert_sync<T: Sync>() {}
    assert_send::<ConfigErrors>();
    assert_sync::<ConfigErrors>();
};
