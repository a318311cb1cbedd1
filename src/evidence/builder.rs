//! Evidence Builder
//!
//! Turns a fact set into one mass function per applicable jurisprudential
//! theme. Each theme commits mass to the heirs it speaks about and leaves
//! the rest on the whole frame as ignorance.

use num_traits::{ToPrimitive, Zero};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::mass::{singleton, EvidenceSource, FocalSet, Frame, MassFunction};
use crate::forward::ForwardChainingEngine;
use crate::heirs::{FactSet, HeirClass};

/// Which family of themes to build evidence from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvidenceFormulation {
    /// Children, marital status, parents, siblings
    #[default]
    Thematic,
    /// Classical ruling and scholarly consensus
    Aggregate,
}

impl std::str::FromStr for EvidenceFormulation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "thematic" => Ok(EvidenceFormulation::Thematic),
            "aggregate" => Ok(EvidenceFormulation::Aggregate),
            other => Err(format!("Unknown evidence formulation: {}", other)),
        }
    }
}

/// Individual themes, in the order their sources are combined
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Theme {
    Children,
    MaritalStatus,
    Parents,
    Siblings,
    ClassicalRuling,
    ScholarlyConsensus,
}

impl Theme {
    pub fn name(&self) -> &'static str {
        match self {
            Theme::Children => "Children Evidence",
            Theme::MaritalStatus => "Marital Status Evidence",
            Theme::Parents => "Parents Evidence",
            Theme::Siblings => "Siblings Evidence",
            Theme::ClassicalRuling => "Classical Ruling Evidence",
            Theme::ScholarlyConsensus => "Scholarly Consensus Evidence",
        }
    }

    pub fn reliability(&self) -> f64 {
        match self {
            Theme::Children => 0.95,
            Theme::MaritalStatus => 0.9,
            Theme::Parents => 0.8,
            Theme::Siblings => 0.6,
            Theme::ClassicalRuling => 0.95,
            Theme::ScholarlyConsensus => 0.85,
        }
    }
}

const CLASSICAL_STRENGTH: f64 = 0.9;
const CONSENSUS_STRENGTH: f64 = 0.8;
/// Rounding residue below this is not worth a focal set of its own
const IGNORANCE_FLOOR: f64 = 1e-12;

/// Builds evidence sources for one computation
#[derive(Debug, Clone, Default)]
pub struct EvidenceBuilder {
    formulation: EvidenceFormulation,
    classical: ForwardChainingEngine,
}

impl EvidenceBuilder {
    pub fn new(formulation: EvidenceFormulation) -> Self {
        Self {
            formulation,
            classical: ForwardChainingEngine::new(),
        }
    }

    /// Classical engine behind the aggregate "Classical Ruling" evidence
    pub fn with_classical(mut self, classical: ForwardChainingEngine) -> Self {
        self.classical = classical;
        self
    }

    pub fn formulation(&self) -> EvidenceFormulation {
        self.formulation
    }

    /// One source per theme whose trigger holds; may be empty
    pub fn build(&self, facts: &FactSet, frame: &Frame) -> Vec<EvidenceSource> {
        let themes: Vec<(Theme, Vec<(FocalSet, f64)>)> = match self.formulation {
            EvidenceFormulation::Thematic => vec![
                (Theme::Children, children_strengths(facts)),
                (Theme::MaritalStatus, marital_strengths(facts)),
                (Theme::Parents, parent_strengths(facts)),
                (Theme::Siblings, sibling_strengths(facts)),
            ],
            EvidenceFormulation::Aggregate => {
                let (classical, consensus) = self.aggregate_strengths(facts);
                vec![
                    (Theme::ClassicalRuling, classical),
                    (Theme::ScholarlyConsensus, consensus),
                ]
            }
        };

        themes
            .into_iter()
            .filter(|(_, strengths)| !strengths.is_empty())
            .map(|(theme, strengths)| source_from_strengths(theme, frame, strengths))
            .collect()
    }

    fn aggregate_strengths(&self, facts: &FactSet) -> (Vec<(FocalSet, f64)>, Vec<(FocalSet, f64)>) {
        let ruling = self.classical.calculate(facts);

        let classical = ruling
            .shares
            .iter()
            .filter_map(|(heir, share)| {
                let value = share.fraction.to_f64()?;
                (value > 0.0).then(|| (singleton(*heir), CLASSICAL_STRENGTH * value))
            })
            .collect();

        let consensus = facts
            .present()
            .filter_map(|(class, _)| {
                let total = ruling.shares.class_total(class);
                if total.is_zero() {
                    return None;
                }
                let set: FocalSet = facts.instances_of(class).into_iter().collect();
                Some((set, CONSENSUS_STRENGTH * total.to_f64()?))
            })
            .collect();

        (classical, consensus)
    }
}

/// Commit the strengths, scaled down if they overshoot one, and put the
/// remainder on the whole frame.
fn source_from_strengths(theme: Theme, frame: &Frame, strengths: Vec<(FocalSet, f64)>) -> EvidenceSource {
    let committed: f64 = strengths.iter().map(|(_, s)| *s).sum();
    let scale = if committed > 1.0 {
        debug!(theme = theme.name(), committed, "Theme overcommits, scaling to unit mass");
        committed
    } else {
        1.0
    };

    let mut mass = MassFunction::new();
    for (set, strength) in strengths {
        mass.assign(set, strength / scale);
    }
    let ignorance = 1.0 - mass.total();
    if ignorance > IGNORANCE_FLOOR {
        mass.assign(frame.theta(), ignorance);
    }
    EvidenceSource::new(theme.name(), mass, theme.reliability())
}

fn split(facts: &FactSet, class: HeirClass, total: f64) -> Vec<(FocalSet, f64)> {
    let heirs = facts.instances_of(class);
    let n = heirs.len() as f64;
    heirs.into_iter().map(|h| (singleton(h), total / n)).collect()
}

fn children_strengths(facts: &FactSet) -> Vec<(FocalSet, f64)> {
    if !facts.has_children() {
        return Vec::new();
    }
    let mut strengths = split(facts, HeirClass::Son, 0.4);
    strengths.extend(split(facts, HeirClass::Daughter, 0.2));
    strengths
}

fn marital_strengths(facts: &FactSet) -> Vec<(FocalSet, f64)> {
    let children = facts.has_children();
    let mut strengths = split(facts, HeirClass::Husband, if children { 0.7 } else { 0.8 });
    strengths.extend(split(facts, HeirClass::Wife, if children { 0.6 } else { 0.7 }));
    strengths
}

fn parent_strengths(facts: &FactSet) -> Vec<(FocalSet, f64)> {
    let father = if facts.has(HeirClass::Son) { 0.5 } else { 0.7 };
    let mother = if facts.has_children() || facts.sibling_count() >= 2 { 0.6 } else { 0.7 };
    let mut strengths = split(facts, HeirClass::Father, father);
    strengths.extend(split(facts, HeirClass::Mother, mother));
    strengths
}

fn sibling_strengths(facts: &FactSet) -> Vec<(FocalSet, f64)> {
    // Father and sons exclude siblings entirely
    if facts.has(HeirClass::Father) || facts.has(HeirClass::Son) {
        return Vec::new();
    }
    let mut strengths = split(facts, HeirClass::Brother, 0.3);
    strengths.extend(split(facts, HeirClass::Sister, 0.2));
    strengths
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forward::SurplusPolicy;
    use crate::heirs::HeirInstance;

    fn build(facts: &FactSet, formulation: EvidenceFormulation) -> (Frame, Vec<EvidenceSource>) {
        let frame = Frame::from_facts(facts);
        let sources = EvidenceBuilder::new(formulation).build(facts, &frame);
        (frame, sources)
    }

    #[test]
    fn test_children_theme_comes_first() {
        let facts = FactSet::new().with(HeirClass::Son, 1).with(HeirClass::Daughter, 1);
        let (frame, sources) = build(&facts, EvidenceFormulation::Thematic);
        assert_eq!(sources.len(), 1);
        assert!(sources[0].name.contains("Children"));

        let m = &sources[0].mass;
        assert!((m.mass_of(&singleton(HeirInstance::single(HeirClass::Son))) - 0.4).abs() < 1e-12);
        assert!((m.mass_of(&frame.theta()) - 0.4).abs() < 1e-12);
        assert!(m.is_normalized());
    }

    #[test]
    fn test_skips_themes_without_trigger() {
        let facts = FactSet::new().with(HeirClass::Son, 1).with(HeirClass::Brother, 2);
        let (_, sources) = build(&facts, EvidenceFormulation::Thematic);
        let names: Vec<&str> = sources.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Children Evidence"]);
    }

    #[test]
    fn test_overcommitted_parents_are_scaled() {
        let facts = FactSet::new().with(HeirClass::Father, 1).with(HeirClass::Mother, 1);
        let (frame, sources) = build(&facts, EvidenceFormulation::Thematic);
        let m = &sources[0].mass;
        assert!(m.is_normalized());
        assert_eq!(m.mass_of(&frame.theta()), 0.0);
        assert!((m.mass_of(&singleton(HeirInstance::single(HeirClass::Father))) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_wives_share_marital_mass() {
        let facts = FactSet::new().with(HeirClass::Wife, 2);
        let (_, sources) = build(&facts, EvidenceFormulation::Thematic);
        let m = &sources[0].mass;
        assert!((m.mass_of(&singleton(HeirInstance::nth(HeirClass::Wife, 2))) - 0.35).abs() < 1e-12);
        assert_eq!(sources[0].reliability, 0.9);
    }

    #[test]
    fn test_aggregate_formulation_builds_two_sources() {
        let facts = FactSet::new().with(HeirClass::Husband, 1).with(HeirClass::Son, 2);
        let (frame, sources) = build(&facts, EvidenceFormulation::Aggregate);
        assert_eq!(sources.len(), 2);
        assert_eq!(sources[0].name, "Classical Ruling Evidence");

        // husband 1/4 -> 0.225 on {Husband}
        let husband = singleton(HeirInstance::single(HeirClass::Husband));
        assert!((sources[0].mass.mass_of(&husband) - 0.225).abs() < 1e-12);
        assert!((sources[0].mass.mass_of(&frame.theta()) - 0.1).abs() < 1e-12);

        // sons as one class-level focal set: 0.8 * 3/4
        let sons: FocalSet = HeirInstance::expand(HeirClass::Son, 2).into_iter().collect();
        assert!((sources[1].mass.mass_of(&sons) - 0.6).abs() < 1e-12);
    }

    #[test]
    fn test_aggregate_ruling_follows_surplus_policy() {
        let facts = FactSet::new().with(HeirClass::Daughter, 1).with(HeirClass::Mother, 1);
        let frame = Frame::from_facts(&facts);
        let classical = ForwardChainingEngine::new().with_surplus_policy(SurplusPolicy::ReturnToSharers);
        let sources = EvidenceBuilder::new(EvidenceFormulation::Aggregate)
            .with_classical(classical)
            .build(&facts, &frame);

        // radd: daughter 1/2 -> 3/4
        let daughter = singleton(HeirInstance::single(HeirClass::Daughter));
        assert!((sources[0].mass.mass_of(&daughter) - 0.675).abs() < 1e-12);
    }

    #[test]
    fn test_no_evidence_for_empty_facts() {
        let (_, sources) = build(&FactSet::new(), EvidenceFormulation::Thematic);
        assert!(sources.is_empty());
        let (_, sources) = build(&FactSet::new(), EvidenceFormulation::Aggregate);
        assert!(sources.is_empty());
    }
}
