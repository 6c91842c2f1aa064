//! Validator configuration.
//!
//! [`ValidatorOptions`] controls how criteria are parsed (depth limit,
//! handling of unknown type tags) and how they are evaluated (type
//! predicates, equality semantics).

use crate::types::TypeChecker;

/// Default limit on criteria nesting depth.
pub const DEFAULT_MAX_DEPTH: usize = 32;

/// What to do with a `$type` directive naming an unknown tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnknownTypePolicy {
    /// Reject the criteria with [`ConfigError::UnknownTypeTag`](crate::ConfigError::UnknownTypeTag).
    #[default]
    Reject,
    /// Drop the directive, so any present value passes, and log a warning.
    Ignore,
}

/// How `$eq` and `$in` compare a resolved value with the allowed values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EqualityMode {
    /// Type-sensitive JSON equality: `"5"` does not equal `5`.
    #[default]
    Strict,
    /// Scalars compare by string form, so `"5"` equals `5` and `"true"`
    /// equals `true`. Arrays and objects still compare structurally.
    Loose,
}

/// Options for parsing and evaluating criteria.
///
/// # Example
///
/// ```rust
/// use reqguard::{EqualityMode, UnknownTypePolicy, ValidatorOptions};
///
/// let options = ValidatorOptions::new()
///     .with_max_depth(8)
///     .with_unknown_type_policy(UnknownTypePolicy::Ignore)
///     .with_equality_mode(EqualityMode::Loose);
///
/// assert_eq!(options.max_depth(), 8);
/// ```
#[derive(Debug, Clone)]
pub struct ValidatorOptions {
    max_depth: usize,
    unknown_type_policy: UnknownTypePolicy,
    equality_mode: EqualityMode,
    type_checker: TypeChecker,
}

impl ValidatorOptions {
    /// Creates options with the defaults: depth limit 32, unknown type tags
    /// rejected, strict equality, built-in type predicates.
    pub fn new() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            unknown_type_policy: UnknownTypePolicy::default(),
            equality_mode: EqualityMode::default(),
            type_checker: TypeChecker::new(),
        }
    }

    /// Sets the maximum nesting depth accepted when parsing criteria.
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    /// Sets the policy for unknown `$type` tags.
    pub fn with_unknown_type_policy(mut self, policy: UnknownTypePolicy) -> Self {
        self.unknown_type_policy = policy;
        self
    }

    /// Sets the equality semantics of `$eq` and `$in`.
    pub fn with_equality_mode(mut self, mode: EqualityMode) -> Self {
        self.equality_mode = mode;
        self
    }

    /// Replaces the type predicates.
    pub fn with_type_checker(mut self, checker: TypeChecker) -> Self {
        self.type_checker = checker;
        self
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    pub fn unknown_type_policy(&self) -> UnknownTypePolicy {
        self.unknown_type_policy
    }

    pub fn equality_mode(&self) -> EqualityMode {
        self.equality_mode
    }

    pub fn type_checker(&self) -> &TypeChecker {
        &self.type_checker
    }
}

impl Default for ValidatorOptions {
    fn default() -> Self {
        Self::new()
    }
}
