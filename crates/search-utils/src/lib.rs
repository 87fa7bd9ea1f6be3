//! Shared utilities for symbol-search
//!
//! This crate provides common functionality used across the symbol-search workspace,
//! including logging setup and application-level configuration.

pub mod config;
pub mod logging;

pub use config::Config;
pub use logging::{LogFormat, init_tracing, init_tracing_with_filter};
