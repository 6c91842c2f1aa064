//! Request-like data sources.
//!
//! Validation needs nothing from a request except its sections (`body`,
//! `query`, `params`, ...) as JSON values. [`RequestSource`] abstracts that so
//! any HTTP layer can plug in.

use indexmap::IndexMap;
use serde_json::{Map, Value};

/// Hands out request sections by name.
pub trait RequestSource {
    /// Returns the data scope for a section, or `None` if the request has no
    /// such section.
    fn section(&self, name: &str) -> Option<&Value>;
}

/// A JSON object whose members are the sections.
impl RequestSource for Value {
    fn section(&self, name: &str) -> Option<&Value> {
        self.as_object().and_then(|sections| sections.get(name))
    }
}

impl RequestSource for Map<String, Value> {
    fn section(&self, name: &str) -> Option<&Value> {
        self.get(name)
    }
}

impl<R: RequestSource + ?Sized> RequestSource for &R {
    fn section(&self, name: &str) -> Option<&Value> {
        (**self).section(name)
    }
}

/// Request sections assembled by an HTTP layer.
///
/// # Example
///
/// ```rust
/// use reqguard::{RequestParts, RequestSource};
/// use serde_json::json;
///
/// let request = RequestParts::new()
///     .body(json!({"email": "a@b.com"}))
///     .params(json!({"id": "7"}));
///
/// assert_eq!(request.section("params"), Some(&json!({"id": "7"})));
/// assert_eq!(request.section("query"), None);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestParts {
    sections: IndexMap<String, Value>,
}

impl RequestParts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the parsed request body.
    pub fn body(self, body: Value) -> Self {
        self.section_value("body", body)
    }

    /// Sets the parsed query string.
    pub fn query(self, query: Value) -> Self {
        self.section_value("query", query)
    }

    /// Sets the path parameters.
    pub fn params(self, params: Value) -> Self {
        self.section_value("params", params)
    }

    /// Sets any other named section, such as `headers`.
    pub fn section_value(mut self, name: impl Into<String>, value: Value) -> Self {
        self.sections.insert(name.into(), value);
        self
    }
}

impl RequestSource for RequestParts {
    fn section(&self, name: &str) -> Option<&Value> {
        self.sections.get(name)
    }
}
