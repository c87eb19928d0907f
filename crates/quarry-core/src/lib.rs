//! Quarry Core — shared error taxonomy.
//!
//! This crate provides the foundational types used across all Quarry crates.
//! It has no internal Quarry dependencies (dependency level 0).
//!
//! # Modules
//!
//! - [`error`]: Error types and Result alias

#![warn(missing_docs)]
#![warn(clippy::all)]
#![forbid(unsafe_code)]

pub mod error;

// Re-export key types at crate root for convenience
pub use error::{Error, Result};
