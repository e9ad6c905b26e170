//! Core types for Specula
//!
//! This crate defines the foundational types used throughout the system:
//! - WorkerId: Identifier of a speculative worker
//! - VariableId: Identifier of a versioned variable in a pool
//! - SpeculaError: Error type hierarchy

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod types;

pub use error::{SpeculaError, SpeculaResult};
pub use types::{VariableId, WorkerId};
