//! Share Reconciliation
//!
//! Turns belief/plausibility bounds into reportable fractions, either by
//! anchoring to the classical ruling or by snapping normalized belief to
//! the jurisprudential catalog.

mod catalog;

pub use catalog::{jurisprudential_catalog, FractionMapping, NearestCatalog, SnapTable, ThresholdTable};

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

use crate::evidence::{BeliefInterval, BeliefTable};
use crate::forward::ForwardChainingEngine;
use crate::fraction::{to_percentage, Fraction};
use crate::heirs::{FactSet, HeirInstance};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReconciliationPolicy {
    /// Report the classical fraction; belief bounds are advisory
    #[default]
    ClassicalAnchored,
    /// Snap normalized belief to a catalog fraction
    BeliefNormalized,
}

impl std::str::FromStr for ReconciliationPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "classical" | "classical_anchored" => Ok(ReconciliationPolicy::ClassicalAnchored),
            "belief" | "belief_normalized" => Ok(ReconciliationPolicy::BeliefNormalized),
            other => Err(format!("Unknown reconciliation policy: {}", other)),
        }
    }
}

/// Final evidential share for one heir
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReconciledShare {
    pub fraction: Fraction,
    pub percentage: f64,
    pub belief: f64,
    pub plausibility: f64,
    /// Midpoint of the belief interval
    pub confidence: f64,
}

impl ReconciledShare {
    fn new(fraction: Fraction, interval: BeliefInterval) -> Self {
        Self {
            fraction,
            percentage: to_percentage(&fraction),
            belief: interval.belief,
            plausibility: interval.plausibility,
            confidence: interval.midpoint(),
        }
    }
}

pub type ReconciledShares = BTreeMap<HeirInstance, ReconciledShare>;

#[derive(Debug, Clone)]
pub struct Reconciler {
    policy: ReconciliationPolicy,
    mapping: Arc<dyn FractionMapping>,
    classical: ForwardChainingEngine,
}

impl Reconciler {
    pub fn new(policy: ReconciliationPolicy) -> Self {
        Self {
            policy,
            mapping: Arc::new(SnapTable::default()),
            classical: ForwardChainingEngine::new(),
        }
    }

    /// Replace the belief-to-fraction mapping used by `BeliefNormalized`
    pub fn with_mapping(mut self, mapping: Arc<dyn FractionMapping>) -> Self {
        self.mapping = mapping;
        self
    }

    /// Classical engine used by `ClassicalAnchored`, e.g. with a surplus policy
    pub fn with_classical(mut self, classical: ForwardChainingEngine) -> Self {
        self.classical = classical;
        self
    }

    pub fn policy(&self) -> ReconciliationPolicy {
        self.policy
    }

    pub fn reconcile(&self, facts: &FactSet, bounds: &BeliefTable) -> ReconciledShares {
        match self.policy {
            ReconciliationPolicy::ClassicalAnchored => self.anchor_to_classical(facts, bounds),
            ReconciliationPolicy::BeliefNormalized => self.snap_beliefs(bounds),
        }
    }

    fn anchor_to_classical(&self, facts: &FactSet, bounds: &BeliefTable) -> ReconciledShares {
        let ruling = self.classical.calculate(facts);
        ruling
            .shares
            .iter()
            .map(|(heir, share)| {
                let interval = bounds.get(heir).copied().unwrap_or_default();
                (*heir, ReconciledShare::new(share.fraction, interval))
            })
            .collect()
    }

    fn snap_beliefs(&self, bounds: &BeliefTable) -> ReconciledShares {
        let belief_total: f64 = bounds.values().map(|i| i.belief).sum();
        let use_plausibility = !(belief_total > 0.0);
        let total = if use_plausibility {
            debug!("No committed belief, normalizing plausibility instead");
            bounds.values().map(|i| i.plausibility).sum()
        } else {
            belief_total
        };
        if !(total > 0.0) {
            return ReconciledShares::new();
        }

        bounds
            .iter()
            .map(|(heir, interval)| {
                let value = if use_plausibility { interval.plausibility } else { interval.belief };
                let fraction = self.mapping.map(heir.class, value / total);
                (*heir, ReconciledShare::new(fraction, *interval))
            })
            .collect()
    }
}

impl Default for Reconciler {
    fn default() -> Self {
        Self::new(ReconciliationPolicy::default())
    }
}
