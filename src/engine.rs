//! Inheritance Engines
//!
//! The Dempster-Shafer pipeline (evidence → combination → belief bounds →
//! reconciliation) and the `InheritanceService` facade that validates input
//! and dispatches to one or both engines.

use chrono::{DateTime, Utc};
use num_traits::Zero;
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use tracing::{debug, info, info_span};
use uuid::Uuid;

use crate::config::EngineConfig;
use crate::error::FaraidError;
use crate::evidence::{
    belief_plausibility, combine_all, render_set, total_certainty, BeliefTable, CombineOptions, EvidenceBuilder,
    EvidenceSource, Frame, MassFunction,
};
use crate::forward::{ForwardChainingEngine, ForwardResult};
use crate::fraction::Fraction;
use crate::heirs::{validate, FactSet, HeirInstance};
use crate::reconcile::{ReconciledShares, Reconciler};

/// Outcome of one evidential computation
#[derive(Debug, Clone, PartialEq)]
pub struct DempsterShaferResult {
    pub shares: ReconciledShares,
    /// Descriptions of the sources consulted, in combination order
    pub evidence_used: Vec<String>,
    /// Σ belief over the frame
    pub total_certainty: f64,
    /// Highest pairwise conflict K met while combining
    pub conflict_level: f64,
    pub frame: Frame,
    pub sources: Vec<EvidenceSource>,
    pub combined: MassFunction,
    pub intervals: BeliefTable,
}

impl DempsterShaferResult {
    /// Neutral result for a fact set no theme speaks about
    fn no_evidence(frame: Frame) -> Self {
        Self {
            shares: ReconciledShares::new(),
            evidence_used: Vec::new(),
            total_certainty: 0.0,
            conflict_level: 0.0,
            frame,
            sources: Vec::new(),
            combined: MassFunction::new(),
            intervals: BeliefTable::new(),
        }
    }

    pub fn fraction_of(&self, heir: &HeirInstance) -> Option<Fraction> {
        self.shares.get(heir).map(|s| s.fraction)
    }

    pub fn analysis(&self) -> String {
        let mut out = String::from("Dempster-Shafer analysis:\n\n");
        let frame: Vec<String> = self.frame.elements().map(|h| h.name()).collect();
        let _ = writeln!(out, "Frame of discernment: {{{}}}", frame.join(", "));

        let _ = writeln!(out, "\nEvidence sources:");
        for source in &self.sources {
            let _ = writeln!(out, "  {}", source.describe());
            for (set, mass) in source.mass.focal_sets() {
                let _ = writeln!(out, "    m({}) = {:.3}", render_set(set), mass);
            }
        }

        let _ = writeln!(out, "\nCombined mass:");
        for (set, mass) in self.combined.focal_sets() {
            let _ = writeln!(out, "  m({}) = {:.4}", render_set(set), mass);
        }

        let _ = writeln!(out, "\nBelief and plausibility:");
        for (heir, interval) in &self.intervals {
            let _ = writeln!(
                out,
                "  {}: Bel = {:.4}, Pl = {:.4}, uncertainty = {:.4}",
                heir,
                interval.belief,
                interval.plausibility,
                interval.uncertainty()
            );
        }

        let _ = writeln!(out, "\nShares:");
        for (heir, share) in &self.shares {
            let _ = writeln!(
                out,
                "  {}: {} = {:.2}% (confidence {:.3})",
                heir, share.fraction, share.percentage, share.confidence
            );
        }
        let _ = write!(
            out,
            "\nTotal certainty: {:.4}\nConflict level: {:.4}",
            self.total_certainty, self.conflict_level
        );
        out
    }
}

/// Evidential calculator. Holds only configuration; all per-call state is local.
#[derive(Debug, Clone, Default)]
pub struct DempsterShaferEngine {
    builder: EvidenceBuilder,
    reconciler: Reconciler,
    options: CombineOptions,
}

impl DempsterShaferEngine {
    pub fn new(builder: EvidenceBuilder, reconciler: Reconciler, options: CombineOptions) -> Self {
        Self { builder, reconciler, options }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        let classical = ForwardChainingEngine::new().with_surplus_policy(config.surplus);
        Self::new(
            EvidenceBuilder::new(config.formulation).with_classical(classical.clone()),
            Reconciler::new(config.reconciliation).with_classical(classical),
            CombineOptions {
                conflict_tolerance: config.conflict_tolerance,
                renormalize: config.renormalize_combined,
            },
        )
    }

    pub fn calculate(&self, facts: &FactSet) -> Result<DempsterShaferResult, FaraidError> {
        let span = info_span!("dempster_shafer", calculation_id = %Uuid::new_v4());
        let _guard = span.enter();

        let frame = Frame::from_facts(facts);
        let sources = self.builder.build(facts, &frame);
        if sources.is_empty() {
            info!("No evidence theme applies, returning neutral result");
            return Ok(DempsterShaferResult::no_evidence(frame));
        }
        debug!(sources = sources.len(), frame = frame.len(), "Evidence built");

        let combined = combine_all(&sources, self.options)?;
        let intervals = belief_plausibility(&frame, &combined.mass);
        let shares = self.reconciler.reconcile(facts, &intervals);
        let certainty = total_certainty(&intervals);

        info!(
            heirs = shares.len(),
            total_certainty = certainty,
            conflict = combined.conflict_level(),
            "Dempster-Shafer computation complete"
        );

        Ok(DempsterShaferResult {
            shares,
            evidence_used: sources.iter().map(|s| s.describe()).collect(),
            total_certainty: certainty,
            conflict_level: combined.conflict_level(),
            frame,
            sources,
            combined: combined.mass,
            intervals,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Method {
    ForwardChaining,
    DempsterShafer,
    #[default]
    Both,
}

impl std::str::FromStr for Method {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "forward" | "forward_chaining" | "fc" => Ok(Method::ForwardChaining),
            "dempster" | "dempster_shafer" | "ds" => Ok(Method::DempsterShafer),
            "both" | "compare" => Ok(Method::Both),
            other => Err(format!("Unknown method: {}", other)),
        }
    }
}

/// One heir's fraction under each method
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonRow {
    pub heir: HeirInstance,
    pub classical: Option<Fraction>,
    pub evidential: Option<Fraction>,
}

impl ComparisonRow {
    /// Evidential minus classical, absent shares counted as zero
    pub fn difference(&self) -> Fraction {
        self.evidential.unwrap_or_else(Fraction::zero) - self.classical.unwrap_or_else(Fraction::zero)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comparison {
    pub rows: Vec<ComparisonRow>,
    /// Heirs with a share under both methods
    pub common_heirs: usize,
    pub generated_at: DateTime<Utc>,
}

impl Comparison {
    pub fn new(forward: &ForwardResult, evidential: &DempsterShaferResult) -> Self {
        let mut heirs: Vec<HeirInstance> = forward.shares.heirs().copied().collect();
        heirs.extend(evidential.shares.keys().copied());
        heirs.sort();
        heirs.dedup();

        let rows: Vec<ComparisonRow> = heirs
            .into_iter()
            .map(|heir| ComparisonRow {
                heir,
                classical: forward.shares.get(&heir).map(|s| s.fraction),
                evidential: evidential.fraction_of(&heir),
            })
            .collect();
        let common_heirs = rows
            .iter()
            .filter(|r| r.classical.is_some() && r.evidential.is_some())
            .count();

        Self {
            rows,
            common_heirs,
            generated_at: Utc::now(),
        }
    }

    /// Whether every heir gets the same fraction under both methods
    pub fn agrees(&self) -> bool {
        self.rows.iter().all(|r| r.difference().is_zero())
    }

    pub fn summary(&self) -> String {
        let mut out = format!("Comparison ({})\n\n", self.generated_at.format("%Y-%m-%d %H:%M:%S UTC"));
        for row in &self.rows {
            let show = |f: Option<Fraction>| f.map(|f| f.to_string()).unwrap_or_else(|| "-".to_string());
            let _ = writeln!(
                out,
                "  {:<12} classical {:>6}  evidential {:>6}  difference {}",
                row.heir.name(),
                show(row.classical),
                show(row.evidential),
                row.difference()
            );
        }
        let _ = write!(out, "\nHeirs under both methods: {}", self.common_heirs);
        out
    }
}

/// Results of one service call; fields are filled according to the method
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    pub method: Method,
    pub forward: Option<ForwardResult>,
    pub evidential: Option<DempsterShaferResult>,
    pub comparison: Option<Comparison>,
}

/// Validates a fact set and runs the configured engines on it
#[derive(Debug, Clone, Default)]
pub struct InheritanceService {
    config: EngineConfig,
    forward: ForwardChainingEngine,
    evidential: DempsterShaferEngine,
}

impl InheritanceService {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            forward: ForwardChainingEngine::new().with_surplus_policy(config.surplus),
            evidential: DempsterShaferEngine::from_config(&config),
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn calculate(&self, facts: &FactSet, method: Method) -> Result<Outcome, FaraidError> {
        let violations = validate(facts);
        if !violations.is_empty() {
            info!(violations = violations.len(), "Heir data rejected");
            return Err(FaraidError::InvalidInput(violations));
        }

        let forward = match method {
            Method::ForwardChaining | Method::Both => Some(self.forward.calculate(facts)),
            Method::DempsterShafer => None,
        };
        let evidential = match method {
            Method::DempsterShafer | Method::Both => Some(self.evidential.calculate(facts)?),
            Method::ForwardChaining => None,
        };
        let comparison = match (&forward, &evidential) {
            (Some(f), Some(e)) => Some(Comparison::new(f, e)),
            _ => None,
        };

        Ok(Outcome {
            method,
            forward,
            evidential,
            comparison,
        })
    }
}
