//! Exact Shares
//!
//! Shares are exact rationals; floating point appears only in the derived
//! percentage.

use num_rational::Rational64;
use num_traits::{ToPrimitive, Zero};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::heirs::{HeirClass, HeirInstance};

pub type Fraction = Rational64;

pub fn frac(numer: i64, denom: i64) -> Fraction {
    Fraction::new(numer, denom)
}

pub fn to_percentage(fraction: &Fraction) -> f64 {
    fraction.to_f64().unwrap_or(0.0) * 100.0
}

/// One heir's portion of the estate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Share {
    pub fraction: Fraction,
}

impl Share {
    pub fn new(fraction: Fraction) -> Self {
        Self { fraction }
    }

    pub fn percentage(&self) -> f64 {
        to_percentage(&self.fraction)
    }
}

/// Exact share per heir instance.
///
/// Writes clamp at zero: a share is never negative.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShareAssignment {
    shares: BTreeMap<HeirInstance, Share>,
}

impl ShareAssignment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, heir: HeirInstance, fraction: Fraction) {
        self.shares.insert(heir, Share::new(fraction.max(Fraction::zero())));
    }

    /// Add to an existing share, creating it when absent
    pub fn add(&mut self, heir: HeirInstance, fraction: Fraction) {
        let current = self.fraction_of(&heir);
        self.set(heir, current + fraction);
    }

    pub fn get(&self, heir: &HeirInstance) -> Option<&Share> {
        self.shares.get(heir)
    }

    pub fn fraction_of(&self, heir: &HeirInstance) -> Fraction {
        self.shares.get(heir).map(|s| s.fraction).unwrap_or_else(Fraction::zero)
    }

    pub fn contains(&self, heir: &HeirInstance) -> bool {
        self.shares.contains_key(heir)
    }

    pub fn total(&self) -> Fraction {
        self.shares.values().fold(Fraction::zero(), |acc, s| acc + s.fraction)
    }

    /// Combined fraction held by every instance of one class
    pub fn class_total(&self, class: HeirClass) -> Fraction {
        self.shares
            .iter()
            .filter(|(heir, _)| heir.class == class)
            .fold(Fraction::zero(), |acc, (_, s)| acc + s.fraction)
    }

    /// Multiply every share by the same factor
    pub fn scale(&mut self, factor: Fraction) {
        for share in self.shares.values_mut() {
            share.fraction *= factor;
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&HeirInstance, &Share)> {
        self.shares.iter()
    }

    pub fn heirs(&self) -> impl Iterator<Item = &HeirInstance> {
        self.shares.keys()
    }

    pub fn len(&self) -> usize {
        self.shares.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shares.is_empty()
    }
}
