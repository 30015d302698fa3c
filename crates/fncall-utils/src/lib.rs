//! Shared utilities for fncall
//!
//! This crate provides the logging setup and the base configuration used
//! across the fncall workspace.

pub mod config;
pub mod logging;

pub use config::Config;
pub use logging::{init_tracing, init_tracing_with};
