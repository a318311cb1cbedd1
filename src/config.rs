use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tokio::fs;
use tracing::{info, warn};

use crate::evidence::{EvidenceFormulation, DEFAULT_CONFLICT_TOLERANCE};
use crate::forward::SurplusPolicy;
use crate::reconcile::ReconciliationPolicy;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub surplus: SurplusPolicy,
    pub formulation: EvidenceFormulation,
    pub reconciliation: ReconciliationPolicy,
    pub renormalize_combined: bool,
    pub conflict_tolerance: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            surplus: SurplusPolicy::default(),
            formulation: EvidenceFormulation::default(),
            reconciliation: ReconciliationPolicy::default(),
            renormalize_combined: true,
            conflict_tolerance: DEFAULT_CONFLICT_TOLERANCE,
        }
    }
}

impl EngineConfig {
    /// Apply FARAID_SURPLUS, FARAID_FORMULATION and FARAID_RECONCILIATION
    pub fn with_env_overrides(self) -> Result<Self> {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        if let Some(value) = lookup("FARAID_SURPLUS") {
            self.surplus = value.parse().map_err(anyhow::Error::msg)?;
        }
        if let Some(value) = lookup("FARAID_FORMULATION") {
            self.formulation = value.parse().map_err(anyhow::Error::msg)?;
        }
        if let Some(value) = lookup("FARAID_RECONCILIATION") {
            self.reconciliation = value.parse().map_err(anyhow::Error::msg)?;
        }
        Ok(self)
    }
}

pub struct ConfigManager {
    path: PathBuf,
}

impl ConfigManager {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Load the configuration, writing defaults first if the file is missing
    pub async fn load(&self) -> Result<EngineConfig> {
        if !self.path.exists() {
            let default = EngineConfig::default();
            self.save(&default).await?;
            info!(path = %self.path.display(), "Wrote default engine configuration");
            return Ok(default);
        }
        let content = fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("reading {}", self.path.display()))?;
        let config: EngineConfig = serde_json::from_str(&content)
            .with_context(|| format!("parsing {}", self.path.display()))?;
        if !(0.0..1.0).contains(&config.conflict_tolerance) {
            warn!(tolerance = config.conflict_tolerance, "Conflict tolerance outside [0, 1)");
            anyhow::bail!("conflict_tolerance must be in [0, 1), got {}", config.conflict_tolerance);
        }
        Ok(config)
    }

    pub async fn save(&self, config: &EngineConfig) -> Result<()> {
        let content = serde_json::to_string_pretty(config)?;
        fs::write(&self.path, content).await?;
        Ok(())
    }
}
