//! Core abstractions for fncall
//!
//! This crate defines the types shared by every fncall crate: the per-call
//! [`CallContext`] that callables may ask for as their first parameter, and the
//! workspace-wide [`Error`] type.

pub mod context;
pub mod error;

pub use context::CallContext;
pub use error::{Error, Result};
