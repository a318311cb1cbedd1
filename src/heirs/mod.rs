//! Heirs Module
//!
//! Heir taxonomy, caller-supplied fact sets and their validation.

mod facts;
mod taxonomy;
mod validation;

pub use facts::{instantiate, FactSet};
pub use taxonomy::{HeirClass, HeirInstance, MAX_GROUP_SIZE};
pub use validation::{describe, validate, Violation};
