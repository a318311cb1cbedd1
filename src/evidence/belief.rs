//! Belief and Plausibility
//!
//! Bel(h) sums the mass of focal sets that are exactly {h};
//! Pl(h) sums the mass of every focal set containing h.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::mass::{Frame, MassFunction};
use crate::heirs::HeirInstance;

/// Support bounds for one heir, belief ≤ plausibility
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BeliefInterval {
    pub belief: f64,
    pub plausibility: f64,
}

impl BeliefInterval {
    /// Width of the interval: mass that neither confirms nor excludes the heir
    pub fn uncertainty(&self) -> f64 {
        self.plausibility - self.belief
    }

    pub fn midpoint(&self) -> f64 {
        (self.belief + self.plausibility) / 2.0
    }
}

pub type BeliefTable = BTreeMap<HeirInstance, BeliefInterval>;

/// Bounds for every element of the frame.
///
/// Both sums run in the same pass over the same terms, so the belief
/// accumulator can never overtake plausibility even under rounding.
pub fn belief_plausibility(frame: &Frame, combined: &MassFunction) -> BeliefTable {
    frame
        .elements()
        .map(|heir| {
            let mut interval = BeliefInterval::default();
            for (set, mass) in combined.focal_sets() {
                if set.contains(heir) {
                    interval.plausibility += mass;
                    if set.len() == 1 {
                        interval.belief += mass;
                    }
                }
            }
            (*heir, interval)
        })
        .collect()
}

/// Σ belief over the frame: how much mass is committed to single heirs
pub fn total_certainty(table: &BeliefTable) -> f64 {
    table.values().map(|i| i.belief).sum()
}
