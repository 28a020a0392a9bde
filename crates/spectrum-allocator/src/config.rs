//! Engine and optimizer configuration

use crate::{Band, EngineError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::info;

/// Candidates per generation
pub const POPULATION_SIZE: usize = 60;
/// Generations run before the winner is picked
pub const GENERATIONS: usize = 80;
/// Chance a child gets one gene replaced
pub const MUTATION_RATE: f64 = 0.2;
/// Weight of the distinct-band diversity bonus
pub const DIVERSITY_WEIGHT: f64 = 0.15;
/// Elites kept per generation are `population_size / ELITE_DIVISOR`...
pub const ELITE_DIVISOR: usize = 10;
/// ...but never fewer than this
pub const MIN_ELITES: usize = 2;

/// Genetic optimizer tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizerConfig {
    pub population_size: usize,
    pub generations: usize,
    pub mutation_rate: f64,
    pub diversity_weight: f64,
    pub elite_divisor: usize,
    pub min_elites: usize,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            population_size: POPULATION_SIZE,
            generations: GENERATIONS,
            mutation_rate: MUTATION_RATE,
            diversity_weight: DIVERSITY_WEIGHT,
            elite_divisor: ELITE_DIVISOR,
            min_elites: MIN_ELITES,
        }
    }
}

impl OptimizerConfig {
    pub fn validate(&self) -> Result<()> {
        if self.population_size < 2 {
            return Err(EngineError::InvalidInput(format!(
                "population_size must be at least 2, got {}",
                self.population_size
            )));
        }
        if self.generations == 0 {
            return Err(EngineError::InvalidInput(
                "generations must be positive".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.mutation_rate) {
            return Err(EngineError::InvalidInput(format!(
                "mutation_rate must be within [0, 1], got {}",
                self.mutation_rate
            )));
        }
        if self.elite_divisor == 0 || self.min_elites < 2 {
            return Err(EngineError::InvalidInput(
                "elite_divisor must be positive and min_elites at least 2".to_string(),
            ));
        }
        Ok(())
    }

    /// Number of elites carried into each generation
    pub fn elite_count(&self) -> usize {
        (self.population_size / self.elite_divisor)
            .max(self.min_elites)
            .min(self.population_size)
    }
}

/// Default display labels for the common band tokens
pub fn default_band_labels() -> BTreeMap<Band, String> {
    [
        ("low", "Low Band (800-1000 MHz)"),
        ("mid", "Mid Band (2.4-2.6 GHz)"),
        ("high", "High Band / mmWave (24 GHz+)"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}

/// Top-level engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub optimizer: OptimizerConfig,
    /// Band token → display label; unknown tokens are shown as-is
    pub band_labels: BTreeMap<Band, String>,
    /// Fixed seed for reproducible runs
    pub seed: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            optimizer: OptimizerConfig::default(),
            band_labels: default_band_labels(),
            seed: None,
        }
    }
}

impl EngineConfig {
    /// Load from a JSON file; omitted fields keep their defaults
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading engine config from {:?}", path);

        let file = File::open(path)?;
        let config: EngineConfig = serde_json::from_reader(BufReader::new(file))?;
        config.optimizer.validate()?;
        Ok(config)
    }

    /// Display label for a band token
    pub fn label_for(&self, band: &str) -> String {
        self.band_labels
            .get(band)
            .cloned()
            .unwrap_or_else(|| band.to_string())
    }
}
