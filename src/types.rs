//! Type tags and the pluggable predicates behind the `$type` directive.

use std::borrow::Cow;
use std::fmt::{self, Display};
use std::sync::Arc;

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

static NUMERIC_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[+-]?([0-9]*\.)?[0-9]+$").expect("static regex"));

static EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)+$")
        .expect("static regex")
});

/// The closed set of tags a `$type` directive may name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeTag {
    /// String form is numeric (`42`, `"-1.5"`).
    Number,
    /// String form is `true` or `false`.
    Boolean,
    /// A JSON string.
    String,
    /// A JSON object or array.
    Object,
    /// String form is an email address.
    Email,
    /// A JSON array.
    Array,
}

impl TypeTag {
    /// Every known tag.
    pub const ALL: [TypeTag; 6] = [
        TypeTag::Number,
        TypeTag::Boolean,
        TypeTag::String,
        TypeTag::Object,
        TypeTag::Email,
        TypeTag::Array,
    ];

    /// Parses a tag name as written in criteria, or `None` if it is unknown.
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|tag| tag.as_str() == name)
    }

    /// The tag name as written in criteria.
    pub fn as_str(&self) -> &'static str {
        match self {
            TypeTag::Number => "number",
            TypeTag::Boolean => "boolean",
            TypeTag::String => "string",
            TypeTag::Object => "object",
            TypeTag::Email => "email",
            TypeTag::Array => "array",
        }
    }
}

impl Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A predicate deciding whether a present value satisfies a type tag.
pub type TypePredicate = Arc<dyn Fn(&Value) -> bool + Send + Sync>;

/// Predicate dispatch keyed by [`TypeTag`].
///
/// Starts out with the built-in predicates; any of them can be replaced.
///
/// # Example
///
/// ```rust
/// use reqguard::{TypeChecker, TypeTag};
/// use serde_json::json;
///
/// let checker = TypeChecker::new();
/// assert!(checker.check(Some(&json!("42")), TypeTag::Number));
/// assert!(!checker.check(None, TypeTag::Number));
///
/// // Only accept real JSON numbers
/// let strict = TypeChecker::new().with_predicate(TypeTag::Number, |v| v.is_number());
/// assert!(!strict.check(Some(&json!("42")), TypeTag::Number));
/// ```
#[derive(Clone)]
pub struct TypeChecker {
    predicates: IndexMap<TypeTag, TypePredicate>,
}

impl TypeChecker {
    /// Creates a checker with the built-in predicates.
    pub fn new() -> Self {
        let mut predicates: IndexMap<TypeTag, TypePredicate> = IndexMap::new();
        predicates.insert(TypeTag::Number, Arc::new(|v: &Value| is_numeric(&string_form(v))));
        predicates.insert(TypeTag::Boolean, Arc::new(|v: &Value| is_boolean(&string_form(v))));
        predicates.insert(TypeTag::String, Arc::new(Value::is_string));
        predicates.insert(TypeTag::Object, Arc::new(|v: &Value| v.is_object() || v.is_array()));
        predicates.insert(TypeTag::Email, Arc::new(|v: &Value| is_email(&string_form(v))));
        predicates.insert(TypeTag::Array, Arc::new(Value::is_array));
        Self { predicates }
    }

    /// Replaces the predicate for `tag`.
    pub fn with_predicate<F>(mut self, tag: TypeTag, predicate: F) -> Self
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        self.predicates.insert(tag, Arc::new(predicate));
        self
    }

    /// Checks a resolved value against a tag. An undefined value never passes.
    pub fn check(&self, value: Option<&Value>, tag: TypeTag) -> bool {
        match (value, self.predicates.get(&tag)) {
            (None, _) => false,
            (Some(value), Some(predicate)) => predicate(value),
            (Some(_), None) => true,
        }
    }
}

impl Default for TypeChecker {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for TypeChecker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeChecker")
            .field("tags", &self.predicates.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// The string form of a value: strings as-is, everything else as compact JSON.
pub fn string_form(value: &Value) -> Cow<'_, str> {
    match value {
        Value::String(s) => Cow::Borrowed(s.as_str()),
        other => Cow::Owned(other.to_string()),
    }
}

/// Returns true for an optionally signed integer or decimal.
pub fn is_numeric(s: &str) -> bool {
    NUMERIC_REGEX.is_match(s)
}

/// Returns true for `true` or `false`.
pub fn is_boolean(s: &str) -> bool {
    matches!(s, "true" | "false")
}

/// Returns true for a syntactically valid email address with a dotted domain.
pub fn is_email(s: &str) -> bool {
    EMAIL_REGEX.is_match(s)
}
