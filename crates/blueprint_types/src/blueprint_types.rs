//! Blueprint Types - Core type definitions for the blueprint system
//!
//! This crate contains the pure data structures: blueprint declarations,
//! instances and the dynamically typed values their fields hold. The registry
//! that resolves inheritance lives in `blueprint_runtime`.

mod error;
mod instance;
mod types;
mod value;

pub use error::*;
pub use instance::*;
pub use types::*;
pub use value::*;
