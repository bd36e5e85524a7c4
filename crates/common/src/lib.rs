//! Common utilities for co2mon
//!
//! This crate provides the pieces shared by the driver library and binary:
//! the configuration/setup error type and the tracing subscriber setup.

pub mod error;
pub mod logging;

pub use error::{Error, Result};
pub use logging::{LOG_LEVELS, setup_logging, validate_log_level};
