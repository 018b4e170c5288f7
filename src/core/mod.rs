//! Core types for the petk engine.
//!
//! This module hosts the error type shared by every stage of directive
//! resolution. See [`error`] for the full failure taxonomy.

pub mod error;

pub use error::{PetkError, Result};
