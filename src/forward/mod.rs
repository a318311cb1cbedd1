//! Forward-Chaining Rule Engine
//!
//! A single ordered pass over the Faraid rule table, followed by residual
//! ('asabah) distribution, optional surplus return (radd) and overflow
//! ('awl) correction. All arithmetic is exact.

mod rules;

pub use rules::{faraid_rules, Action, Condition, Ledger, ResidualClaim, Rule};

use num_traits::{One, Zero};
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use tracing::{debug, info, info_span, warn};
use uuid::Uuid;

use crate::fraction::{to_percentage, Fraction, ShareAssignment};
use crate::heirs::{FactSet, HeirInstance};

/// What happens to a remainder nobody is entitled to as residuary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SurplusPolicy {
    /// Leave it undistributed and report it
    #[default]
    Retain,
    /// Return it to fixed sharers in proportion to their shares (radd);
    /// spouses are included only if they are the sole sharers
    ReturnToSharers,
}

impl std::str::FromStr for SurplusPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "retain" => Ok(SurplusPolicy::Retain),
            "return" | "return_to_sharers" | "radd" => Ok(SurplusPolicy::ReturnToSharers),
            other => Err(format!("Unknown surplus policy: {}", other)),
        }
    }
}

/// Outcome of one forward-chaining computation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForwardResult {
    pub shares: ShareAssignment,
    /// Descriptions of fired rules and post-pass corrections, in order
    pub applied_rules: Vec<String>,
    /// Unallocated fraction after the rule pass, before residual handling
    pub remaining: Fraction,
    pub total_distributed: Fraction,
    pub residual_heirs: Option<ResidualClaim>,
    /// Total before 'awl correction, when one was needed
    pub awl_total: Option<Fraction>,
    pub returned_surplus: Option<Fraction>,
}

impl ForwardResult {
    fn empty() -> Self {
        Self {
            shares: ShareAssignment::new(),
            applied_rules: Vec::new(),
            remaining: Fraction::zero(),
            total_distributed: Fraction::zero(),
            residual_heirs: None,
            awl_total: None,
            returned_surplus: None,
        }
    }

    pub fn fraction_of(&self, heir: &HeirInstance) -> Fraction {
        self.shares.fraction_of(heir)
    }

    /// Undistributed fraction left after all corrections
    pub fn undistributed(&self) -> Fraction {
        (Fraction::one() - self.total_distributed).max(Fraction::zero())
    }

    /// Numbered account of every rule and correction applied
    pub fn explanation(&self) -> String {
        let mut out = String::from("Forward chaining explanation:\n\n");
        for (i, rule) in self.applied_rules.iter().enumerate() {
            let _ = writeln!(out, "{}. {}", i + 1, rule);
        }
        let _ = writeln!(out, "\nShares:");
        for (heir, share) in self.shares.iter() {
            let _ = writeln!(out, "  {}: {} = {:.2}%", heir, share.fraction, share.percentage());
        }
        if self.undistributed() > Fraction::zero() {
            let _ = writeln!(out, "\nUndistributed: {} = {:.2}%", self.undistributed(), to_percentage(&self.undistributed()));
        }
        let _ = write!(out, "\nTotal rules applied: {}", self.applied_rules.len());
        out
    }
}

/// Rule-based Faraid calculator.
///
/// The engine holds only the immutable rule table and policy, so a single
/// instance can serve any number of calls, including concurrent ones.
#[derive(Debug, Clone)]
pub struct ForwardChainingEngine {
    rules: Vec<Rule>,
    surplus: SurplusPolicy,
}

impl ForwardChainingEngine {
    pub fn new() -> Self {
        Self {
            rules: faraid_rules(),
            surplus: SurplusPolicy::default(),
        }
    }

    pub fn with_surplus_policy(mut self, surplus: SurplusPolicy) -> Self {
        self.surplus = surplus;
        self
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn calculate(&self, facts: &FactSet) -> ForwardResult {
        let span = info_span!("forward_chaining", calculation_id = %Uuid::new_v4());
        let _guard = span.enter();

        if facts.is_empty() {
            debug!("Empty fact set, no rules evaluated");
            return ForwardResult::empty();
        }

        let mut ledger = Ledger::default();
        let mut applied_rules = Vec::new();
        for rule in &self.rules {
            if (rule.condition)(facts) {
                ledger = (rule.action)(facts, ledger);
                debug!(rule = rule.name, "Rule fired");
                applied_rules.push(rule.description.to_string());
            }
        }

        let residual_heirs = ledger.residual_claim();
        let mut shares = ledger.shares;
        let remaining = (Fraction::one() - shares.total()).max(Fraction::zero());
        let mut returned_surplus = None;

        if let Some(claim) = residual_heirs {
            distribute_residue(&mut shares, facts, claim, remaining);
            if remaining > Fraction::zero() {
                applied_rules.push(format!(
                    "Residue {} distributed to the {} as asabah",
                    remaining,
                    claim.label()
                ));
            }
        } else if remaining > Fraction::zero() && self.surplus == SurplusPolicy::ReturnToSharers {
            if return_surplus(&mut shares, remaining) {
                warn!(%remaining, "No residuary heir, surplus returned to sharers");
                applied_rules.push(format!(
                    "Radd: surplus {} returned to the sharers in proportion to their shares",
                    remaining
                ));
                returned_surplus = Some(remaining);
            }
        }

        let mut awl_total = None;
        let total = shares.total();
        if total > Fraction::one() {
            shares.scale(Fraction::one() / total);
            warn!(%total, "Shares exceed the estate, applying 'awl");
            applied_rules.push(format!(
                "'Awl: allotted shares total {} > 1, every share reduced proportionally",
                total
            ));
            awl_total = Some(total);
        }

        let total_distributed = shares.total();
        info!(
            heirs = shares.len(),
            rules = applied_rules.len(),
            %remaining,
            %total_distributed,
            "Forward chaining complete"
        );

        ForwardResult {
            shares,
            applied_rules,
            remaining,
            total_distributed,
            residual_heirs,
            awl_total,
            returned_surplus,
        }
    }
}

impl Default for ForwardChainingEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Split `remaining` over the claim's members by weight, on top of any
/// fixed share they already hold. Members are recorded even at zero.
fn distribute_residue(shares: &mut ShareAssignment, facts: &FactSet, claim: ResidualClaim, remaining: Fraction) {
    let members = claim.members(facts);
    let parts: i64 = members.iter().map(|(_, weight)| *weight).sum();
    if parts == 0 {
        return;
    }
    let unit = remaining / Fraction::from_integer(parts);
    for (heir, weight) in members {
        shares.add(heir, unit * Fraction::from_integer(weight));
    }
}

fn return_surplus(shares: &mut ShareAssignment, surplus: Fraction) -> bool {
    let holders: Vec<(HeirInstance, Fraction)> = shares
        .iter()
        .filter(|(_, share)| share.fraction > Fraction::zero())
        .map(|(heir, share)| (*heir, share.fraction))
        .collect();
    let blood: Vec<(HeirInstance, Fraction)> = holders
        .iter()
        .copied()
        .filter(|(heir, _)| !heir.class.is_spouse())
        .collect();
    let recipients = if blood.is_empty() { holders } else { blood };

    let base = recipients.iter().fold(Fraction::zero(), |acc, (_, f)| acc + f);
    if base.is_zero() {
        return false;
    }
    for (heir, fraction) in recipients {
        shares.add(heir, surplus * fraction / base);
    }
    true
}
