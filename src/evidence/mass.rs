//! Frames and Mass Functions
//!
//! Basic probability assignments over subsets of the frame of discernment.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::heirs::{instantiate, FactSet, HeirInstance};

/// Tolerance for "sums to one" checks on floating masses
pub const MASS_EPSILON: f64 = 1e-9;

/// A subset of the frame. Ordered so that mass tables are deterministic.
pub type FocalSet = BTreeSet<HeirInstance>;

/// Frame of discernment: every heir instance present in one fact set
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Frame {
    elements: BTreeSet<HeirInstance>,
}

impl Frame {
    pub fn from_facts(facts: &FactSet) -> Self {
        Self { elements: instantiate(facts) }
    }

    pub fn from_elements(elements: impl IntoIterator<Item = HeirInstance>) -> Self {
        Self { elements: elements.into_iter().collect() }
    }

    /// The whole frame as a focal set (total ignorance)
    pub fn theta(&self) -> FocalSet {
        self.elements.clone()
    }

    pub fn contains(&self, heir: &HeirInstance) -> bool {
        self.elements.contains(heir)
    }

    pub fn elements(&self) -> impl Iterator<Item = &HeirInstance> {
        self.elements.iter()
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}

pub fn singleton(heir: HeirInstance) -> FocalSet {
    std::iter::once(heir).collect()
}

pub fn render_set(set: &FocalSet) -> String {
    let names: Vec<String> = set.iter().map(|h| h.name()).collect();
    format!("{{{}}}", names.join(", "))
}

/// Mass per non-empty focal set
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MassFunction {
    masses: BTreeMap<FocalSet, f64>,
}

impl MassFunction {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accumulate mass on a focal set. Empty sets and non-positive
    /// masses are ignored: neither can be focal.
    pub fn assign(&mut self, set: FocalSet, mass: f64) {
        if set.is_empty() || !(mass > 0.0) {
            return;
        }
        *self.masses.entry(set).or_insert(0.0) += mass;
    }

    pub fn with(mut self, set: FocalSet, mass: f64) -> Self {
        self.assign(set, mass);
        self
    }

    pub fn mass_of(&self, set: &FocalSet) -> f64 {
        self.masses.get(set).copied().unwrap_or(0.0)
    }

    pub fn total(&self) -> f64 {
        self.masses.values().sum()
    }

    pub fn focal_sets(&self) -> impl Iterator<Item = (&FocalSet, f64)> {
        self.masses.iter().map(|(set, mass)| (set, *mass))
    }

    pub fn len(&self) -> usize {
        self.masses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.masses.is_empty()
    }

    pub fn is_normalized(&self) -> bool {
        !self.is_empty() && (self.total() - 1.0).abs() <= MASS_EPSILON
    }

    /// Rescale every mass so the total is exactly one.
    /// Returns false (and leaves the function untouched) if there is no mass.
    pub fn normalize(&mut self) -> bool {
        let total = self.total();
        if !(total > 0.0) {
            return false;
        }
        for mass in self.masses.values_mut() {
            *mass /= total;
        }
        true
    }

    /// Divide every mass by the same positive factor
    pub(crate) fn scale_by(&mut self, divisor: f64) {
        for mass in self.masses.values_mut() {
            *mass /= divisor;
        }
    }
}

impl fmt::Display for MassFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (set, mass) in &self.masses {
            writeln!(f, "m({}) = {:.3}", render_set(set), mass)?;
        }
        Ok(())
    }
}

/// One body of jurisprudential evidence
#[derive(Debug, Clone, PartialEq)]
pub struct EvidenceSource {
    pub name: String,
    pub mass: MassFunction,
    /// Audit metadata; not discounted into the combination
    pub reliability: f64,
}

impl EvidenceSource {
    pub fn new(name: impl Into<String>, mass: MassFunction, reliability: f64) -> Self {
        Self {
            name: name.into(),
            mass,
            reliability: reliability.clamp(0.0, 1.0),
        }
    }

    pub fn describe(&self) -> String {
        format!("{} (reliability: {:.2})", self.name, self.reliability)
    }
}
