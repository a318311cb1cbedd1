//! Faraid Rule Table
//!
//! Ordered IF-THEN rules. Conditions read only the fact snapshot; actions
//! are pure functions from (facts, ledger) to the next ledger.

use num_traits::Zero;
use serde::{Deserialize, Serialize};

use crate::fraction::{frac, Fraction, ShareAssignment};
use crate::heirs::{FactSet, HeirClass, HeirInstance};

/// Residuary ('asabah) groups, declared in priority order: the first
/// claim present in a ledger takes the residue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResidualClaim {
    /// Sons, together with daughters at half a son's portion
    Children,
    Father,
    /// Brothers, together with sisters at half a brother's portion
    Siblings,
}

impl ResidualClaim {
    /// Members of the group with their weight in the residue split
    pub fn members(&self, facts: &FactSet) -> Vec<(HeirInstance, i64)> {
        let (male, female) = match self {
            ResidualClaim::Children => (HeirClass::Son, HeirClass::Daughter),
            ResidualClaim::Siblings => (HeirClass::Brother, HeirClass::Sister),
            ResidualClaim::Father => {
                return facts.instances_of(HeirClass::Father).into_iter().map(|h| (h, 1)).collect();
            }
        };
        facts
            .instances_of(male)
            .into_iter()
            .map(|h| (h, 2))
            .chain(facts.instances_of(female).into_iter().map(|h| (h, 1)))
            .collect()
    }

    pub fn label(&self) -> &'static str {
        match self {
            ResidualClaim::Children => "children",
            ResidualClaim::Father => "father",
            ResidualClaim::Siblings => "siblings",
        }
    }
}

/// Accumulator threaded through the rule pass
#[derive(Debug, Clone, Default)]
pub struct Ledger {
    pub shares: ShareAssignment,
    pub residual_claims: Vec<ResidualClaim>,
}

impl Ledger {
    /// Highest-priority residual claim registered during the pass
    pub fn residual_claim(&self) -> Option<ResidualClaim> {
        self.residual_claims.iter().min().copied()
    }
}

pub type Condition = fn(&FactSet) -> bool;
pub type Action = fn(&FactSet, Ledger) -> Ledger;

/// One entry of the rule table
#[derive(Clone)]
pub struct Rule {
    pub name: &'static str,
    pub condition: Condition,
    pub action: Action,
    pub description: &'static str,
}

impl std::fmt::Debug for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rule")
            .field("name", &self.name)
            .field("description", &self.description)
            .finish()
    }
}

fn split_equally(facts: &FactSet, class: HeirClass, total: Fraction, mut ledger: Ledger) -> Ledger {
    let heirs = facts.instances_of(class);
    if heirs.is_empty() {
        return ledger;
    }
    let each = total / Fraction::from_integer(heirs.len() as i64);
    for heir in heirs {
        ledger.shares.set(heir, each);
    }
    ledger
}

fn claim_residue(claim: ResidualClaim, mut ledger: Ledger) -> Ledger {
    if !ledger.residual_claims.contains(&claim) {
        ledger.residual_claims.push(claim);
    }
    ledger
}

fn children_residuary(_facts: &FactSet, ledger: Ledger) -> Ledger {
    claim_residue(ResidualClaim::Children, ledger)
}

fn daughters_fixed(facts: &FactSet, ledger: Ledger) -> Ledger {
    let total = if facts.count(HeirClass::Daughter) == 1 { frac(1, 2) } else { frac(2, 3) };
    split_equally(facts, HeirClass::Daughter, total, ledger)
}

fn husband_quarter(facts: &FactSet, ledger: Ledger) -> Ledger {
    split_equally(facts, HeirClass::Husband, frac(1, 4), ledger)
}

fn husband_half(facts: &FactSet, ledger: Ledger) -> Ledger {
    split_equally(facts, HeirClass::Husband, frac(1, 2), ledger)
}

fn wives_eighth(facts: &FactSet, ledger: Ledger) -> Ledger {
    split_equally(facts, HeirClass::Wife, frac(1, 8), ledger)
}

fn wives_quarter(facts: &FactSet, ledger: Ledger) -> Ledger {
    split_equally(facts, HeirClass::Wife, frac(1, 4), ledger)
}

fn father_sixth(facts: &FactSet, ledger: Ledger) -> Ledger {
    split_equally(facts, HeirClass::Father, frac(1, 6), ledger)
}

fn father_residuary(facts: &FactSet, mut ledger: Ledger) -> Ledger {
    // Registered at zero so the father is listed even if the residue is exhausted
    for father in facts.instances_of(HeirClass::Father) {
        if !ledger.shares.contains(&father) {
            ledger.shares.set(father, Fraction::zero());
        }
    }
    claim_residue(ResidualClaim::Father, ledger)
}

fn mother_sixth(facts: &FactSet, ledger: Ledger) -> Ledger {
    split_equally(facts, HeirClass::Mother, frac(1, 6), ledger)
}

fn mother_third(facts: &FactSet, ledger: Ledger) -> Ledger {
    split_equally(facts, HeirClass::Mother, frac(1, 3), ledger)
}

fn siblings(facts: &FactSet, ledger: Ledger) -> Ledger {
    if facts.has(HeirClass::Brother) {
        return claim_residue(ResidualClaim::Siblings, ledger);
    }
    let total = if facts.count(HeirClass::Sister) == 1 { frac(1, 2) } else { frac(2, 3) };
    split_equally(facts, HeirClass::Sister, total, ledger)
}

fn mother_is_reduced(facts: &FactSet) -> bool {
    facts.has_children() || facts.sibling_count() >= 2
}

/// The fixed Faraid rule table, in firing order
pub fn faraid_rules() -> Vec<Rule> {
    vec![
        Rule {
            name: "children_mixed",
            condition: |f| f.has(HeirClass::Son) && f.has(HeirClass::Daughter),
            action: children_residuary,
            description: "Sons and daughters together: a son takes twice a daughter's portion of the residue",
        },
        Rule {
            name: "children_sons_only",
            condition: |f| f.has(HeirClass::Son) && !f.has(HeirClass::Daughter),
            action: children_residuary,
            description: "Only sons: they take the whole residue as asabah",
        },
        Rule {
            name: "children_daughters_only",
            condition: |f| !f.has(HeirClass::Son) && f.has(HeirClass::Daughter),
            action: daughters_fixed,
            description: "Only daughters: one daughter takes 1/2, two or more share 2/3",
        },
        Rule {
            name: "husband_with_children",
            condition: |f| f.has(HeirClass::Husband) && f.has_children(),
            action: husband_quarter,
            description: "Husband takes 1/4 when there are children",
        },
        Rule {
            name: "husband_without_children",
            condition: |f| f.has(HeirClass::Husband) && !f.has_children(),
            action: husband_half,
            description: "Husband takes 1/2 when there are no children",
        },
        Rule {
            name: "wife_with_children",
            condition: |f| f.has(HeirClass::Wife) && f.has_children(),
            action: wives_eighth,
            description: "Wife takes 1/8 when there are children, shared equally among wives",
        },
        Rule {
            name: "wife_without_children",
            condition: |f| f.has(HeirClass::Wife) && !f.has_children(),
            action: wives_quarter,
            description: "Wife takes 1/4 when there are no children, shared equally among wives",
        },
        Rule {
            name: "father_with_children",
            condition: |f| f.has(HeirClass::Father) && f.has_children(),
            action: father_sixth,
            description: "Father takes 1/6 when there are children",
        },
        Rule {
            name: "father_without_son",
            condition: |f| f.has(HeirClass::Father) && !f.has(HeirClass::Son),
            action: father_residuary,
            description: "Father takes the residue as asabah when there is no son",
        },
        Rule {
            name: "mother_reduced",
            condition: |f| f.has(HeirClass::Mother) && mother_is_reduced(f),
            action: mother_sixth,
            description: "Mother takes 1/6 when there are children or two or more siblings",
        },
        Rule {
            name: "mother_full",
            condition: |f| f.has(HeirClass::Mother) && !mother_is_reduced(f),
            action: mother_third,
            description: "Mother takes 1/3 when there are no children and fewer than two siblings",
        },
        Rule {
            name: "siblings_without_father_or_son",
            condition: |f| f.has_siblings() && !f.has(HeirClass::Father) && !f.has(HeirClass::Son),
            action: siblings,
            description: "Siblings inherit when there is neither father nor son: brothers take the residue at 2:1 with sisters, sisters alone take 1/2 or 2/3",
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fire_all(facts: &FactSet) -> (Ledger, Vec<&'static str>) {
        let mut ledger = Ledger::default();
        let mut fired = Vec::new();
        for rule in faraid_rules() {
            if (rule.condition)(facts) {
                ledger = (rule.action)(facts, ledger);
                fired.push(rule.name);
            }
        }
        (ledger, fired)
    }

    #[test]
    fn test_table_is_ordered_and_named_uniquely() {
        let rules = faraid_rules();
        assert_eq!(rules.len(), 12);
        let mut names: Vec<_> = rules.iter().map(|r| r.name).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), 12);
    }

    #[test]
    fn test_rules_are_mutually_consistent_per_class() {
        // Exactly one of each complementary pair fires
        let facts = FactSet::new()
            .with(HeirClass::Husband, 1)
            .with(HeirClass::Mother, 1)
            .with(HeirClass::Daughter, 1);
        let (_, fired) = fire_all(&facts);
        assert_eq!(fired, vec!["children_daughters_only", "husband_with_children", "mother_reduced"]);
    }

    #[test]
    fn test_father_with_daughter_gets_sixth_and_claims_residue() {
        let facts = FactSet::new()
            .with(HeirClass::Father, 1)
            .with(HeirClass::Daughter, 1);
        let (ledger, _) = fire_all(&facts);
        assert_eq!(ledger.shares.fraction_of(&HeirInstance::single(HeirClass::Father)), frac(1, 6));
        assert_eq!(ledger.residual_claim(), Some(ResidualClaim::Father));
    }

    #[test]
    fn test_children_claim_outranks_others() {
        let ledger = Ledger {
            shares: ShareAssignment::new(),
            residual_claims: vec![ResidualClaim::Siblings, ResidualClaim::Children, ResidualClaim::Father],
        };
        assert_eq!(ledger.residual_claim(), Some(ResidualClaim::Children));
    }

    #[test]
    fn test_residual_weights() {
        let facts = FactSet::new()
            .with(HeirClass::Brother, 1)
            .with(HeirClass::Sister, 2);
        let weights: Vec<i64> = ResidualClaim::Siblings.members(&facts).iter().map(|(_, w)| *w).collect();
        assert_eq!(weights, vec![2, 1, 1]);
    }

    #[test]
    fn test_sisters_alone_are_fixed_sharers() {
        let facts = FactSet::new().with(HeirClass::Sister, 2);
        let (ledger, _) = fire_all(&facts);
        assert_eq!(ledger.shares.class_total(HeirClass::Sister), frac(2, 3));
        assert_eq!(ledger.residual_claim(), None);
    }
}
