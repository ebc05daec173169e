//! Shared utilities for auric
//!
//! This crate provides common functionality used across the auric workspace:
//! tracing setup and small formatting helpers.

pub mod logging;
pub mod time;

pub use logging::{init_tracing, init_tracing_json, init_tracing_with_filter};
pub use time::elapsed_label;
