use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use super::taxonomy::{HeirClass, HeirInstance};

/// Heir counts supplied by the caller.
///
/// Counts are signed so that malformed input survives until `validate`
/// can describe it. Keys that name no known class are kept aside in
/// `unsupported` for the same reason.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactSet {
    counts: BTreeMap<HeirClass, i64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    unsupported: Vec<String>,
}

impl FactSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from loosely-typed `(key, count)` pairs, e.g. parsed user input
    pub fn from_raw<I, K>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, i64)>,
        K: AsRef<str>,
    {
        let mut facts = FactSet::new();
        for (key, count) in pairs {
            match key.as_ref().parse::<HeirClass>() {
                Ok(class) => {
                    *facts.counts.entry(class).or_insert(0) += count;
                }
                Err(_) => facts.unsupported.push(key.as_ref().trim().to_string()),
            }
        }
        facts
    }

    pub fn with(mut self, class: HeirClass, count: i64) -> Self {
        self.set(class, count);
        self
    }

    pub fn set(&mut self, class: HeirClass, count: i64) {
        self.counts.insert(class, count);
    }

    /// Raw count as supplied, including negatives
    pub fn raw_count(&self, class: HeirClass) -> i64 {
        self.counts.get(&class).copied().unwrap_or(0)
    }

    /// Count usable for computation; negative counts read as zero
    pub fn count(&self, class: HeirClass) -> u32 {
        u32::try_from(self.raw_count(class).max(0)).unwrap_or(u32::MAX)
    }

    pub fn has(&self, class: HeirClass) -> bool {
        self.count(class) > 0
    }

    pub fn has_children(&self) -> bool {
        self.has(HeirClass::Son) || self.has(HeirClass::Daughter)
    }

    pub fn sibling_count(&self) -> u32 {
        self.count(HeirClass::Brother).saturating_add(self.count(HeirClass::Sister))
    }

    pub fn has_siblings(&self) -> bool {
        self.sibling_count() > 0
    }

    /// True when no class has a strictly positive count
    pub fn is_empty(&self) -> bool {
        HeirClass::ALL.iter().all(|class| !self.has(*class))
    }

    pub fn raw_counts(&self) -> impl Iterator<Item = (HeirClass, i64)> + '_ {
        self.counts.iter().map(|(class, count)| (*class, *count))
    }

    pub fn unsupported(&self) -> &[String] {
        &self.unsupported
    }

    /// Present classes with their counts, in taxonomy order
    pub fn present(&self) -> impl Iterator<Item = (HeirClass, u32)> + '_ {
        HeirClass::ALL
            .iter()
            .map(|class| (*class, self.count(*class)))
            .filter(|(_, count)| *count > 0)
    }

    pub fn instances_of(&self, class: HeirClass) -> Vec<HeirInstance> {
        HeirInstance::expand(class, self.count(class))
    }
}

/// Expand every present class into its per-person instances.
pub fn instantiate(facts: &FactSet) -> BTreeSet<HeirInstance> {
    facts
        .present()
        .flat_map(|(class, count)| HeirInstance::expand(class, count))
        .collect()
}
