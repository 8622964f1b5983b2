//! AWS-oriented adapters and handlers for Lambda error-alarm management.
//!
//! This crate owns runtime integration details (the Lambda entrypoint and
//! the CloudWatch and function-listing adapters) and exposes a single
//! runtime module boundary for the alarm contract primitives.

pub mod adapters;
pub mod handlers;
pub mod logging;
pub mod runtime;
