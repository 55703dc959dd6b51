//! # Utility Modules
//!
//! Supporting utilities for observability.
//!
//! ## Components
//! - **Logging**: `tracing-subscriber` installation from [`crate::config::LoggingConfig`]
//! - **Metrics**: Thread-safe codec counters

pub mod logging;
pub mod metrics;
