//! Error types.
//!
//! Two disjoint families live here: [`Violation`]s describe requests that
//! break the criteria and are returned inside a [`Verdict`];
//! [`ConfigError`]s describe criteria that are themselves broken and always
//! escape as `Err`.

mod config_error;
mod violation;

pub use config_error::{ConfigError, ConfigErrors};
pub use violation::{Verdict, Violation, ViolationKind};
