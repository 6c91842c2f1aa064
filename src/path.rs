//! Dotted field paths and their resolution against nested data.
//!
//! This module provides [`FieldPath`], used both to address values inside a
//! request section (`address.city`) and to report where a violation occurred
//! (`body.address.city`).

use std::fmt::{self, Display};

use serde_json::Value;

/// A dot-separated path to a value in a nested JSON-like structure.
///
/// Paths are immutable; [`join`](Self::join) returns a new path.
///
/// # Example
///
/// ```rust
/// use reqguard::FieldPath;
///
/// let section = FieldPath::from_field("body");
/// let path = section.join(&FieldPath::parse("address.city").unwrap());
///
/// assert_eq!(path.to_string(), "body.address.city");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldPath {
    segments: Vec<String>,
}

impl FieldPath {
    /// Creates a path from a single segment, without splitting on dots.
    pub fn from_field(name: impl Into<String>) -> Self {
        Self {
            segments: vec![name.into()],
        }
    }

    /// Parses a dotted path such as `address.city`.
    ///
    /// Returns `None` for an empty string or when any segment is empty
    /// (`a..b`, `.a`, `a.`).
    ///
    /// ```rust
    /// use reqguard::FieldPath;
    ///
    /// assert_eq!(FieldPath::parse("a.b").unwrap().len(), 2);
    /// assert!(FieldPath::parse("a..b").is_none());
    /// assert!(FieldPath::parse("").is_none());
    /// ```
    pub fn parse(dotted: &str) -> Option<Self> {
        let segments: Vec<String> = dotted.split('.').map(str::to_string).collect();
        if segments.iter().any(String::is_empty) {
            return None;
        }
        Some(Self { segments })
    }

    /// Returns a new path with all segments of `other` appended.
    pub fn join(&self, other: &FieldPath) -> Self {
        let mut segments = self.segments.clone();
        segments.extend(other.segments.iter().cloned());
        Self { segments }
    }

    /// Returns the number of segments in this path.
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Returns true if this path has no segments.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Resolves this path against a data scope.
    ///
    /// Each segment is looked up in turn: object members by key, array
    /// elements by a segment that parses as an index. The result is `None`
    /// ("undefined") as soon as a segment is missing or the current value is
    /// a scalar or `null`. A missing scope resolves every path to `None`.
    ///
    /// Present values are returned even when falsy, so `0`, `false`, `""`
    /// and `null` all resolve to `Some`.
    ///
    /// ```rust
    /// use reqguard::FieldPath;
    /// use serde_json::json;
    ///
    /// let data = json!({"user": {"age": 0, "tags": ["a", "b"]}});
    /// let age = FieldPath::parse("user.age").unwrap();
    /// let tag = FieldPath::parse("user.tags.1").unwrap();
    /// let missing = FieldPath::parse("user.name.first").unwrap();
    ///
    /// assert_eq!(age.resolve(Some(&data)), Some(&json!(0)));
    /// assert_eq!(tag.resolve(Some(&data)), Some(&json!("b")));
    /// assert_eq!(missing.resolve(Some(&data)), None);
    /// ```
    pub fn resolve<'a>(&self, scope: Option<&'a Value>) -> Option<&'a Value> {
        self.segments
            .iter()
            .try_fold(scope?, |current, segment| lookup(current, segment))
    }
}

fn lookup<'a>(value: &'a Value, segment: &str) -> Option<&'a Value> {
    match value {
        Value::Object(map) => map.get(segment),
        Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    }
}

impl Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                write!(f, ".")?;
            }
            write!(f, "{}", segment)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn path(dotted: &str) -> FieldPath {
        FieldPath::parse(dotted).unwrap()
    }

    #[test]
    fn test_parse_splits_on_dots() {
        let parsed = path("address.city.zip");
        assert_eq!(parsed.len(), 3);
        assert_eq!(parsed.to_string(), "address.city.zip");
    }

    #[test]
    fn test_parse_rejects_empty_segments() {
        assert!(FieldPath::parse("").is_none());
        assert!(FieldPath::parse(".a").is_none());
        assert!(FieldPath::parse("a.").is_none());
        assert!(FieldPath::parse("a..b").is_none());
    }

    #[test]
    fn test_from_field_does_not_split() {
        let path = FieldPath::from_field("a.b");
        assert_eq!(path.len(), 1);
    }

    #[test]
    fn test_join_and_push() {
        let base = FieldPath::from_field("body");
        let joined = base.join(&path("address.city"));
        assert_eq!(joined.to_string(), "body.address.city");
        assert_eq!(base.to_string(), "body");
    }

    #[test]
    fn test_resolve_nested_value() {
        let data = json!({"address": {"city": "Oslo"}});
        assert_eq!(path("address.city").resolve(Some(&data)), Some(&json!("Oslo")));
    }

    #[test]
    fn test_resolve_missing_intermediate_is_undefined() {
        let data = json!({"address": {}});
        assert_eq!(path("address.city.zip").resolve(Some(&data)), None);
        assert_eq!(path("profile.name").resolve(Some(&data)), None);
    }

    #[test]
    fn test_resolve_keeps_falsy_values() {
        let data = json!({"n": 0, "b": false, "s": "", "z": null});
        assert_eq!(path("n").resolve(Some(&data)), Some(&json!(0)));
        assert_eq!(path("b").resolve(Some(&data)), Some(&json!(false)));
        assert_eq!(path("s").resolve(Some(&data)), Some(&json!("")));
        assert_eq!(path("z").resolve(Some(&data)), Some(&Value::Null));
    }

    #[test]
    fn test_resolve_through_null_or_scalar_is_undefined() {
        let data = json!({"z": null, "s": "text"});
        assert_eq!(path("z.inner").resolve(Some(&data)), None);
        assert_eq!(path("s.len").resolve(Some(&data)), None);
    }

    #[test]
    fn test_resolve_array_index() {
        let data = json!({"items": [{"id": 1}, {"id": 2}]});
        assert_eq!(path("items.1.id").resolve(Some(&data)), Some(&json!(2)));
        assert_eq!(path("items.5.id").resolve(Some(&data)), None);
        assert_eq!(path("items.first").resolve(Some(&data)), None);
    }

    #[test]
    fn test_resolve_without_scope() {
        assert_eq!(path("anything").resolve(None), None);
    }
}
