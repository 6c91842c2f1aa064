//! Named criteria shared across threads.
//!
//! This module provides [`CriteriaRegistry`], which stores parsed criteria
//! under route names so an HTTP layer can look up the validator for the
//! route it is serving.

use parking_lot::RwLock;
use rayon::prelude::*;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

use crate::criteria::Criteria;
use crate::error::{ConfigErrors, Verdict};
use crate::logging::{DebugSink, TracingSink};
use crate::middleware::Middleware;
use crate::options::ValidatorOptions;
use crate::request::RequestSource;
use crate::validator::Validator;

/// Type alias for the validator storage map.
type ValidatorMap = Arc<RwLock<HashMap<String, Arc<Validator>>>>;

/// A thread-safe registry of validators keyed by route name.
///
/// # Thread Safety
///
/// The registry uses `Arc<RwLock<...>>`:
/// - Any number of threads can validate concurrently (read access)
/// - Registration is serialized (write access)
///
/// Validators handed out by [`get`](Self::get) are `Arc`s and stay usable
/// without holding the lock.
///
/// # Example
///
/// ```rust
/// use reqguard::CriteriaRegistry;
/// use serde_json::json;
///
/// let registry = CriteriaRegistry::new();
/// registry.register("create_user", &json!({
///     "body": [{ "email": { "$req": true, "$type": "email" } }]
/// })).unwrap();
///
/// let verdict = registry
///     .validate("create_user", &json!({ "body": { "email": "a@b.com" } }))
///     .unwrap();
/// assert!(verdict.is_valid());
/// ```
pub struct CriteriaRegistry {
    validators: ValidatorMap,
    options: ValidatorOptions,
    sink: Arc<dyn DebugSink>,
}

impl CriteriaRegistry {
    /// Creates an empty registry with default options.
    pub fn new() -> Self {
        Self::with_options(ValidatorOptions::default())
    }

    /// Creates an empty registry whose criteria are parsed and evaluated
    /// with `options`.
    pub fn with_options(options: ValidatorOptions) -> Self {
        Self {
            validators: Arc::new(RwLock::new(HashMap::new())),
            options,
            sink: Arc::new(TracingSink),
        }
    }

    /// Sets the debug sink given to validators registered afterwards.
    pub fn with_sink(mut self, sink: Arc<dyn DebugSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Parses and registers raw criteria under `name`.
    ///
    /// # Errors
    ///
    /// - `RegistryError::InvalidCriteria` if the criteria do not parse
    /// - `RegistryError::DuplicateName` if the name is taken
    pub fn register(&self, name: impl Into<String>, raw: &Value) -> Result<(), RegistryError> {
        let name = name.into();
        match Criteria::parse_with(raw, &self.options) {
            Ok(criteria) => self.register_criteria(name, criteria),
            Err(errors) => Err(RegistryError::InvalidCriteria { name, errors }),
        }
    }

    /// Registers already parsed criteria under `name`.
    pub fn register_criteria(
        &self,
        name: impl Into<String>,
        criteria: Criteria,
    ) -> Result<(), RegistryError> {
        let name = name.into();
        let mut validators = self.validators.write();

        if validators.contains_key(&name) {
            return Err(RegistryError::DuplicateName(name));
        }

        let validator = Validator::with_options(criteria, self.options.clone())
            .with_sink(Arc::clone(&self.sink));
        tracing::debug!(target: "reqguard", route = %name, "criteria registered");
        validators.insert(name, Arc::new(validator));
        Ok(())
    }

    /// Retrieves the validator for a route.
    pub fn get(&self, name: &str) -> Option<Arc<Validator>> {
        self.validators.read().get(name).cloned()
    }

    /// Builds a middleware for a route.
    pub fn middleware(&self, name: &str) -> Option<Middleware> {
        self.get(name).map(|v| Middleware::new(Validator::clone(&v)))
    }

    /// Returns the registered route names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.validators.read().keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.validators.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.validators.read().is_empty()
    }

    /// Validates a request against the criteria registered as `name`.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::NotFound` if the name is not registered.
    pub fn validate<R: RequestSource + ?Sized>(
        &self,
        name: &str,
        request: &R,
    ) -> Result<Verdict, RegistryError> {
        let validator = self
            .get(name)
            .ok_or_else(|| RegistryError::NotFound(name.to_string()))?;
        Ok(validator.validate(request))
    }

    /// Validates many independent requests against one route in parallel.
    ///
    /// Verdicts come back in the order of `requests`.
    pub fn validate_batch<R: RequestSource + Sync>(
        &self,
        name: &str,
        requests: &[R],
    ) -> Result<Vec<Verdict>, RegistryError> {
        let validator = self
            .get(name)
            .ok_or_else(|| RegistryError::NotFound(name.to_string()))?;
        Ok(requests
            .par_iter()
            .map(|request| validator.validate(request))
            .collect())
    }
}

impl Default for CriteriaRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for CriteriaRegistry {
    fn clone(&self) -> Self {
        Self {
            validators: Arc::clone(&self.validators),
            options: self.options.clone(),
            sink: Arc::clone(&self.sink),
        }
    }
}

/// Errors that can occur during registry operations.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// Attempted to register criteria under a name that already exists.
    #[error("criteria '{0}' already registered")]
    DuplicateName(String),

    /// Attempted to validate against a name that doesn't exist.
    #[error("criteria '{0}' not found")]
    NotFound(String),

    /// The criteria could not be parsed.
    #[error("criteria '{name}' are invalid: {errors}")]
    InvalidCriteria { name: String, errors: ConfigErrors },
}
