//! Dempster's Rule of Combination
//!
//! m12(C) = Σ_{A∩B=C} m1(A)·m2(B) / (1 − K),  K = Σ_{A∩B=∅} m1(A)·m2(B)
//!
//! A conflict with `1 − K` at or below the tolerance is reported as
//! `FaraidError::TotalConflict`; it is never divided through.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::mass::{EvidenceSource, FocalSet, MassFunction};
use crate::error::FaraidError;

/// Default closeness of K to 1 treated as total conflict
pub const DEFAULT_CONFLICT_TOLERANCE: f64 = 1e-12;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CombineOptions {
    pub conflict_tolerance: f64,
    /// Rescale the final result to sum to exactly one
    pub renormalize: bool,
}

impl Default for CombineOptions {
    fn default() -> Self {
        Self {
            conflict_tolerance: DEFAULT_CONFLICT_TOLERANCE,
            renormalize: true,
        }
    }
}

/// Result of one pairwise combination
#[derive(Debug, Clone, PartialEq)]
pub struct Combination {
    pub mass: MassFunction,
    pub conflict: f64,
}

/// Combine two mass functions with Dempster's rule.
pub fn combine(m1: &MassFunction, m2: &MassFunction, conflict_tolerance: f64) -> Result<Combination, FaraidError> {
    let mut combined = MassFunction::new();
    let mut conflict = 0.0;

    for (a, mass_a) in m1.focal_sets() {
        for (b, mass_b) in m2.focal_sets() {
            let product = mass_a * mass_b;
            let intersection: FocalSet = a.intersection(b).copied().collect();
            if intersection.is_empty() {
                conflict += product;
            } else {
                combined.assign(intersection, product);
            }
        }
    }

    let agreement = 1.0 - conflict;
    if agreement <= conflict_tolerance || combined.is_empty() {
        warn!(conflict, "Total conflict between mass functions");
        return Err(FaraidError::TotalConflict { conflict, source_name: None });
    }

    combined.scale_by(agreement);
    debug!(conflict, focal_sets = combined.len(), "Combined mass functions");
    Ok(Combination { mass: combined, conflict })
}

/// Combined mass of every source, with the conflict of each step
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CombinedMass {
    pub mass: MassFunction,
    /// K of each pairwise step, in combination order
    pub step_conflicts: Vec<f64>,
}

impl CombinedMass {
    /// Highest conflict met along the way
    pub fn conflict_level(&self) -> f64 {
        self.step_conflicts.iter().copied().fold(0.0, f64::max)
    }
}

/// Fold all sources left to right.
///
/// Every source must already be a normalized mass function. An empty
/// slice yields an empty combined mass.
pub fn combine_all(sources: &[EvidenceSource], options: CombineOptions) -> Result<CombinedMass, FaraidError> {
    for source in sources {
        if !source.mass.is_normalized() {
            return Err(FaraidError::InvalidMass {
                source_name: source.name.clone(),
                total: source.mass.total(),
            });
        }
    }

    let Some((first, rest)) = sources.split_first() else {
        return Ok(CombinedMass::default());
    };

    let mut mass = first.mass.clone();
    let mut step_conflicts = Vec::with_capacity(rest.len());
    for source in rest {
        let step = combine(&mass, &source.mass, options.conflict_tolerance).map_err(|err| match err {
            FaraidError::TotalConflict { conflict, .. } => FaraidError::TotalConflict {
                conflict,
                source_name: Some(source.name.clone()),
            },
            other => other,
        })?;
        debug!(source = %source.name, conflict = step.conflict, "Folded evidence source");
        step_conflicts.push(step.conflict);
        mass = step.mass;
    }

    if options.renormalize {
        mass.normalize();
    }
    Ok(CombinedMass { mass, step_conflicts })
}
