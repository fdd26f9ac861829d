//! Blueprint Runtime - Declaration, instantiation and behavior resolution
//!
//! This crate contains the blueprint registry, the behavior trait with its
//! closure and template implementations, and the initializer machinery.

pub use blueprint_types;

mod behavior;
mod init;
mod registry;
mod template;

pub use behavior::*;
pub use init::{Construction, InitFn, Initializer};
pub use registry::*;
pub use template::*;
