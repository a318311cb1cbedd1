//! Evidence Module
//!
//! Dempster-Shafer machinery: frames, mass functions, evidence building,
//! combination and belief/plausibility bounds.

mod belief;
mod builder;
mod combination;
mod mass;

pub use belief::{belief_plausibility, total_certainty, BeliefInterval, BeliefTable};
pub use builder::{EvidenceBuilder, EvidenceFormulation, Theme};
pub use combination::{
    combine, combine_all, Combination, CombineOptions, CombinedMass, DEFAULT_CONFLICT_TOLERANCE,
};
pub use mass::{render_set, singleton, EvidenceSource, FocalSet, Frame, MassFunction, MASS_EPSILON};
