//! Faraid Inheritance Calculator
//!
//! Islamic inheritance shares computed two ways:
//! - Forward chaining over a fixed Faraid rule table (exact fractions,
//!   'asabah residue, radd and 'awl corrections)
//! - Dempster-Shafer evidence combination with belief/plausibility bounds
//! - Reconciliation of evidential bounds into reportable fractions

pub mod config;
pub mod engine;
pub mod error;
pub mod evidence;
pub mod forward;
pub mod fraction;
pub mod heirs;
pub mod reconcile;

// Re-exports for convenience
pub use config::{ConfigManager, EngineConfig};
pub use engine::{Comparison, DempsterShaferEngine, DempsterShaferResult, InheritanceService, Method, Outcome};
pub use error::FaraidError;
pub use forward::{ForwardChainingEngine, ForwardResult, SurplusPolicy};
pub use fraction::{Fraction, ShareAssignment};
pub use heirs::{FactSet, HeirClass, HeirInstance};
