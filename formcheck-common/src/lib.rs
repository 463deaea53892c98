//! Shared types for the FormCheck services
//!
//! Carries the common error type and configuration loading used by the
//! video-analysis service.

pub mod config;
pub mod error;

pub use error::{Error, Result};
