//! Fraction Catalog and Mappings
//!
//! Bridges a continuous normalized belief to a discrete legal fraction.
//! Every mapping is plain data so alternative tables can be swapped in.

use std::collections::BTreeMap;
use std::fmt::Debug;

use num_traits::{ToPrimitive, Zero};

use crate::fraction::{frac, Fraction};
use crate::heirs::HeirClass;

/// Fractions that occur in Faraid rulings: halves, thirds, quarters,
/// sixths, eighths, twelfths and their complements.
pub fn jurisprudential_catalog() -> Vec<Fraction> {
    [
        (1, 2),
        (1, 3),
        (1, 4),
        (1, 6),
        (1, 8),
        (2, 3),
        (3, 4),
        (5, 6),
        (7, 8),
        (1, 12),
        (5, 12),
        (7, 12),
    ]
    .into_iter()
    .map(|(n, d)| frac(n, d))
    .collect()
}

/// Maps a normalized belief in [0, 1] for one heir class to a fraction
pub trait FractionMapping: Debug + Send + Sync {
    fn map(&self, class: HeirClass, normalized: f64) -> Fraction;
}

/// Descending tiers: the first tier whose threshold is strictly exceeded
/// wins, otherwise the floor applies.
#[derive(Debug, Clone, PartialEq)]
pub struct ThresholdTable {
    tiers: Vec<(f64, Fraction)>,
    floor: Fraction,
}

impl ThresholdTable {
    pub fn new(floor: Fraction) -> Self {
        Self { tiers: Vec::new(), floor }
    }

    pub fn tier(mut self, threshold: f64, fraction: Fraction) -> Self {
        self.tiers.push((threshold, fraction));
        self.tiers.sort_by(|a, b| b.0.total_cmp(&a.0));
        self
    }

    pub fn lookup(&self, value: f64) -> Fraction {
        self.tiers
            .iter()
            .find(|(threshold, _)| value > *threshold)
            .map(|(_, fraction)| *fraction)
            .unwrap_or(self.floor)
    }
}

/// Closest catalog fraction by absolute distance; ties go to the earlier entry
#[derive(Debug, Clone, PartialEq)]
pub struct NearestCatalog {
    fractions: Vec<Fraction>,
}

impl NearestCatalog {
    pub fn new(fractions: Vec<Fraction>) -> Self {
        Self { fractions }
    }

    pub fn nearest(&self, value: f64) -> Fraction {
        let mut best: Option<(f64, Fraction)> = None;
        for fraction in &self.fractions {
            let distance = (fraction.to_f64().unwrap_or(0.0) - value).abs();
            if best.map_or(true, |(d, _)| distance < d) {
                best = Some((distance, *fraction));
            }
        }
        best.map(|(_, f)| f).unwrap_or_else(Fraction::zero)
    }
}

impl Default for NearestCatalog {
    fn default() -> Self {
        Self::new(jurisprudential_catalog())
    }
}

impl FractionMapping for NearestCatalog {
    fn map(&self, _class: HeirClass, normalized: f64) -> Fraction {
        self.nearest(normalized)
    }
}

/// Per-class threshold tables, nearest catalog fraction for other classes
#[derive(Debug, Clone, PartialEq)]
pub struct SnapTable {
    tables: BTreeMap<HeirClass, ThresholdTable>,
    fallback: NearestCatalog,
}

impl SnapTable {
    pub fn new(fallback: NearestCatalog) -> Self {
        Self { tables: BTreeMap::new(), fallback }
    }

    pub fn with_table(mut self, class: HeirClass, table: ThresholdTable) -> Self {
        self.tables.insert(class, table);
        self
    }

    pub fn table(&self, class: HeirClass) -> Option<&ThresholdTable> {
        self.tables.get(&class)
    }
}

impl Default for SnapTable {
    fn default() -> Self {
        Self::new(NearestCatalog::default())
            .with_table(
                HeirClass::Son,
                ThresholdTable::new(frac(1, 4)).tier(0.4, frac(1, 2)).tier(0.2, frac(1, 3)),
            )
            .with_table(
                HeirClass::Daughter,
                ThresholdTable::new(frac(1, 6)).tier(0.3, frac(1, 3)).tier(0.15, frac(1, 4)),
            )
            .with_table(HeirClass::Husband, ThresholdTable::new(frac(1, 4)).tier(0.4, frac(1, 2)))
            .with_table(HeirClass::Wife, ThresholdTable::new(frac(1, 8)).tier(0.2, frac(1, 4)))
            .with_table(HeirClass::Father, ThresholdTable::new(frac(1, 6)).tier(0.3, frac(1, 3)))
            .with_table(HeirClass::Mother, ThresholdTable::new(frac(1, 6)).tier(0.25, frac(1, 3)))
    }
}

impl FractionMapping for SnapTable {
    fn map(&self, class: HeirClass, normalized: f64) -> Fraction {
        match self.tables.get(&class) {
            Some(table) => table.lookup(normalized),
            None => self.fallback.map(class, normalized),
        }
    }
}
