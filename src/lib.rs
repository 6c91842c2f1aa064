//! # Reqguard
//!
//! Declarative validation of incoming request data, stopping at the first
//! violation.
//!
//! ## Overview
//!
//! Criteria are written as JSON: each request section (`body`, `query`,
//! `params`, ...) maps to a list of rule-sets, and each rule-set maps field
//! paths to rules. Criteria are parsed once into a typed tree; every
//! authoring mistake is reported together as [`ConfigErrors`], before any
//! request is seen. Requests are then checked fail-fast and produce a
//! [`Verdict`] carrying at most one [`Violation`].
//!
//! ## Core Types
//!
//! - [`FieldPath`]: A dotted path to a value inside a request section
//! - [`Criteria`]: The parsed criteria tree
//! - [`Validator`]: Criteria plus options, walking request sections in order
//! - [`Middleware`]: Turns a verdict into "continue" or an HTTP 400 [`ErrorResponse`]
//! - [`CriteriaRegistry`]: Named validators shared across threads
//!
//! ## Example
//!
//! ```rust
//! use reqguard::{validate, Outcome, RequestParts};
//! use serde_json::json;
//!
//! let middleware = validate(&json!({
//!     "body": [{
//!         "email": { "$req": true, "$pattern": "^[a-z0-9]+@[a-z0-9]+\\.com$" },
//!         "address": { "$req": true, "city": { "$req": true } }
//!     }]
//! })).unwrap();
//!
//! let request = RequestParts::new().body(json!({
//!     "email": "a@b.com",
//!     "address": {}
//! }));
//!
//! match middleware.handle(&request, |_| "created") {
//!     Outcome::Continue(_) => unreachable!(),
//!     Outcome::Reject(response) => {
//!         assert_eq!(response.error.path, "body.address.city");
//!         assert_eq!(response.error.error_message, "Data in body.address.city is required");
//!     }
//! }
//! ```

pub mod criteria;
pub mod error;
pub mod evaluator;
pub mod loading;
pub mod logging;
pub mod middleware;
pub mod options;
pub mod path;
pub mod registry;
pub mod request;
pub mod types;
pub mod validator;

pub use criteria::{Criteria, Directive, Rule, RuleBody, RuleSet};
pub use error::{ConfigError, ConfigErrors, Verdict, Violation, ViolationKind};
pub use evaluator::Evaluator;
pub use loading::{FileSystem, LoadError, StdFileSystem};
pub use logging::{DebugSink, EvalEvent, NoopSink, TracingSink};
pub use middleware::{
    validate, ErrorDetail, ErrorResponse, Middleware, Outcome, VALIDATION_ERROR_CODE,
};
pub use options::{EqualityMode, UnknownTypePolicy, ValidatorOptions, DEFAULT_MAX_DEPTH};
pub use path::FieldPath;
pub use registry::{CriteriaRegistry, RegistryError};
pub use request::{RequestParts, RequestSource};
pub use types::{TypeChecker, TypePredicate, TypeTag};
pub use validator::{validate_all, validate_raw, Validator};

/// Result of parsing criteria, accumulating every authoring error.
pub type ParseResult<T> = Result<T, ConfigErrors>;
