//! Fact Validation
//!
//! Checks a fact set for inconsistencies. Violations are returned, never
//! raised: the caller decides whether to block the computation.

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

use super::facts::FactSet;
use super::taxonomy::HeirClass;

/// A single inconsistency in a fact set
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Violation {
    Empty,
    NegativeCount { class: HeirClass, count: i64 },
    HusbandAndWife,
    TooMany { class: HeirClass, count: i64, max: u32 },
    UnsupportedClass { key: String },
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::Empty => write!(f, "Heir data must not be empty"),
            Violation::NegativeCount { class, count } => {
                write!(f, "Count of {} must not be negative (got {})", class.key(), count)
            }
            Violation::HusbandAndWife => write!(
                f,
                "Husband and wife cannot both be heirs in one case (mutually exclusive)"
            ),
            Violation::TooMany { class, count, max } => {
                write!(f, "At most {} {} allowed (got {})", max, class.key(), count)
            }
            Violation::UnsupportedClass { key } => {
                write!(f, "Unsupported heir class: {}", key)
            }
        }
    }
}

/// Validate a fact set, returning every violation found.
pub fn validate(facts: &FactSet) -> Vec<Violation> {
    let mut violations = Vec::new();

    for key in facts.unsupported() {
        violations.push(Violation::UnsupportedClass { key: key.clone() });
    }

    if facts.is_empty() {
        violations.push(Violation::Empty);
        debug!("Validation rejected empty fact set");
    }

    if facts.has(HeirClass::Husband) && facts.has(HeirClass::Wife) {
        violations.push(Violation::HusbandAndWife);
    }

    for (class, count) in facts.raw_counts() {
        if count < 0 {
            violations.push(Violation::NegativeCount { class, count });
            continue;
        }
        let max = class.max_count();
        if count > i64::from(max) {
            violations.push(Violation::TooMany { class, count, max });
        }
    }

    if !violations.is_empty() {
        debug!("Validation found {} violation(s)", violations.len());
    }
    violations
}

/// Human-readable descriptions, one per violation
pub fn describe(violations: &[Violation]) -> Vec<String> {
    violations.iter().map(|v| v.to_string()).collect()
}
