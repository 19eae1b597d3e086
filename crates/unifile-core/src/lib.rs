//! Unifile Core
//!
//! Core types for the unifile source merger: the error enum, job
//! configuration with path pretreatment, and the standard-library
//! header registry.

pub mod config;
pub mod error;
pub mod registry;

pub use config::{Config, ResolvedJob};
pub use error::{Error, Result};
pub use registry::HeaderRegistry;
