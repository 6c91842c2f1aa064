//! The criteria tree.
//!
//! Criteria are written as JSON and parsed once into the typed tree below.
//! The raw shape maps request sections to arrays of rule-sets; each rule-set
//! maps dotted field paths to rules; a rule is an object whose `$`-prefixed
//! keys are directives and whose other keys are nested rules:
//!
//! ```json
//! {
//!   "body": [{
//!     "email":   { "$req": true, "$pattern": "^[a-z0-9]+@[a-z0-9]+\\.com$" },
//!     "address": { "$req": true, "city": { "$req": true, "$type": "string" } }
//!   }],
//!   "params": [{ "exlOrPpt": { "$in": ["xlsx", "pptx"] } }]
//! }
//! ```
//!
//! | key | alias | value |
//! |---|---|---|
//! | `$req` | `$required` | boolean |
//! | `$type` | | type tag |
//! | `$eq` | `$equals` | any value |
//! | `$in` | `$oneOf` | array of values |
//! | `$pattern` | | regular expression |
//!
//! Nested rules may only share a level with `$req`.

mod parse;

use indexmap::IndexMap;
use regex::Regex;
use serde_json::Value;

use crate::options::ValidatorOptions;
use crate::path::FieldPath;
use crate::types::TypeTag;
use crate::ParseResult;

/// A leaf directive, applied to a present value.
#[derive(Debug, Clone)]
pub enum Directive {
    /// `$type`: the value must satisfy the tag's predicate.
    Type(TypeTag),
    /// `$eq`: the value must equal this one.
    Equals(Value),
    /// `$in`: the value must equal one of these.
    OneOf(Vec<Value>),
    /// `$pattern`: the value's string form must match.
    Pattern(Regex),
}

impl Directive {
    /// Position in the fixed evaluation order `type`, `equals`, `oneOf`, `pattern`.
    pub(crate) fn rank(&self) -> u8 {
        match self {
            Directive::Type(_) => 0,
            Directive::Equals(_) => 1,
            Directive::OneOf(_) => 2,
            Directive::Pattern(_) => 3,
        }
    }
}

/// What a rule checks once its field is known to be present.
#[derive(Debug, Clone)]
pub enum RuleBody {
    /// Directives, already sorted into evaluation order.
    Leaf(Vec<Directive>),
    /// Rules for fields of the sub-value, in authoring order.
    Nested(IndexMap<FieldPath, Rule>),
}

/// The rule for one field.
#[derive(Debug, Clone)]
pub struct Rule {
    required: bool,
    body: RuleBody,
}

impl Rule {
    pub(crate) fn new(required: bool, body: RuleBody) -> Self {
        Self { required, body }
    }

    /// Whether the field carries `$req: true`.
    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn body(&self) -> &RuleBody {
        &self.body
    }

    /// Nesting depth of this rule; a leaf has depth 1.
    pub fn depth(&self) -> usize {
        match &self.body {
            RuleBody::Leaf(_) => 1,
            RuleBody::Nested(children) => 1 + children.values().map(Rule::depth).max().unwrap_or(0),
        }
    }
}

/// An ordered mapping from field paths to rules.
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    rules: IndexMap<FieldPath, Rule>,
}

impl RuleSet {
    pub(crate) fn new(rules: IndexMap<FieldPath, Rule>) -> Self {
        Self { rules }
    }

    /// Iterates the rules in authoring order.
    pub fn iter(&self) -> impl Iterator<Item = (&FieldPath, &Rule)> {
        self.rules.iter()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Returns the rule for a dotted field path.
    pub fn get(&self, path: &str) -> Option<&Rule> {
        FieldPath::parse(path).and_then(|p| self.rules.get(&p))
    }
}

/// Parsed, immutable validation criteria.
///
/// `Criteria` is `Send + Sync`; share one instance across threads behind an
/// `Arc`.
///
/// # Example
///
/// ```rust
/// use reqguard::Criteria;
/// use serde_json::json;
///
/// let criteria = Criteria::parse(&json!({
///     "body": [{ "email": { "$req": true, "$type": "email" } }],
///     "query": [{ "page": { "$type": "number" } }]
/// })).unwrap();
///
/// let sections: Vec<&str> = criteria.sections().map(|(name, _)| name).collect();
/// assert_eq!(sections, vec!["body", "query"]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Criteria {
    sections: IndexMap<String, Vec<RuleSet>>,
}

impl Criteria {
    /// Parses criteria with default options.
    ///
    /// Every authoring error in the tree is reported, not just the first.
    pub fn parse(raw: &Value) -> ParseResult<Self> {
        Self::parse_with(raw, &ValidatorOptions::default())
    }

    /// Parses criteria, honoring the depth limit and unknown-type policy of
    /// `options`.
    pub fn parse_with(raw: &Value, options: &ValidatorOptions) -> ParseResult<Self> {
        parse::parse_criteria(raw, options)
            .into_result()
            .map(|sections| Self { sections })
    }

    /// Iterates the sections in authoring order.
    pub fn sections(&self) -> impl Iterator<Item = (&str, &[RuleSet])> {
        self.sections.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// Returns the rule-sets for one section.
    pub fn section(&self, name: &str) -> Option<&[RuleSet]> {
        self.sections.get(name).map(Vec::as_slice)
    }

    /// Deepest nesting of any rule in the tree.
    pub fn depth(&self) -> usize {
        self.sections
            .values()
            .flatten()
            .flat_map(|set| set.rules.values())
            .map(Rule::depth)
            .max()
            .unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }
}

const _: () = {
    const fn assert_send<T: Send>() {}
    const fn assert_sync<T: Sync>() {}
    assert_send::<Criteria>();
    assert_sync::<Criteria>();
};
