use thiserror::Error;

use crate::heirs::{describe, Violation};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum FaraidError {
    #[error("invalid heir data: {}", describe(.0).join("; "))]
    InvalidInput(Vec<Violation>),

    /// Dempster combination is undefined: the sources contradict each other completely
    #[error("total conflict (K = {conflict:.6}){}", .source_name.as_ref().map(|n| format!(" while combining {}", n)).unwrap_or_default())]
    TotalConflict {
        conflict: f64,
        source_name: Option<String>,
    },

    #[error("evidence source {source_name} is not a normalized mass function (total = {total:.6})")]
    InvalidMass { source_name: String, total: f64 },
}

impl FaraidError {
    pub fn violations(&self) -> &[Violation] {
        match self {
            FaraidError::InvalidInput(violations) => violations,
            _ => &[],
        }
    }
}
