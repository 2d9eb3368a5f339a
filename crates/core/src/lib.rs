//! Core types for jconfig
//!
//! This is the foundation crate (Layer 0) that all other jconfig crates depend on.
//! It provides:
//! - Base error types
//! - The variable store with change notification
//! - `$VAR` path token helpers
//! - The subscriber seam between the store and its observers
//!
//! This crate has no dependencies on other jconfig crates.

pub mod error;
pub mod path;
pub mod store;
pub mod traits;

pub use error::{Error, Result, ValidationError};
pub use store::VariableStore;
pub use traits::Subscriber;
