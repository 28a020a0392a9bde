//! Regional Spectrum Allocator
//!
//! Assigns one frequency band to each requested region, then scores the
//! allocation for fairness and simulated channel health.
//!
//! # Pipeline
//!
//! ```text
//! telemetry ──► metrics ──► normalize ──► optimizer ──┬──► fairness
//!                                                     └──► monitor
//! ```
//!
//! # Fitness Model (per region)
//!
//! ```text
//! ideal       = (d + e) / 2 · (B - 1)
//! band_match  = max(0, 1 - |b - ideal| / (B - 1))
//! score(r)    = (1.5·d + e + res + band_match) / 4.5
//! fitness     = Σ score(r)·(1 + d) · (1 + 0.15 · distinct / R)
//! ```
//!
//! | Term       | Source                                   |
//! |------------|------------------------------------------|
//! | d          | Min-max normalized demand                |
//! | e          | Min-max normalized efficiency            |
//! | res        | Inverted normalized resource cost        |
//! | band_match | Closeness of band index to the ideal one |

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use thiserror::Error;

pub mod config;
pub mod engine;
pub mod fairness;
pub mod loader;
pub mod metrics;
pub mod monitor;
pub mod normalize;
pub mod optimizer;
pub mod request;

pub use config::{EngineConfig, OptimizerConfig};
pub use engine::{AllocationResponse, SpectrumEngine};
pub use fairness::{evaluate_fairness, FairnessResult};
pub use loader::{load_telemetry, TelemetryRecord, TelemetryTable};
pub use monitor::{classify_channels, ChannelMetric, ChannelStatus};
pub use request::{AllocationRequest, ValidatedRequest};

/// Region identifier supplied by the caller.
pub type Region = String;

/// Lower-cased band token (e.g. "low", "mid", "high").
pub type Band = String;

/// Demand weight for regions missing from the demand map
pub const DEFAULT_DEMAND: f64 = 1.0;

/// Added to average power before dividing, so efficiency never divides by zero
pub const POWER_FLOOR: f64 = 0.1;

/// Energy is scaled down by this factor in the resource-cost proxy
pub const ENERGY_SCALE: f64 = 100.0;

/// Decimal places kept for efficiency and the final score
pub const SCORE_DECIMALS: i32 = 3;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Telemetry unavailable at {path:?}: {reason}")]
    DataUnavailable { path: PathBuf, reason: String },
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, EngineError>;

/// Per-region averages over the matching telemetry rows.
///
/// All fields are zero when no row matches the region.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RegionMetrics {
    /// Mean bandwidth (MHz)
    #[serde(rename = "avg_bw")]
    pub average_bandwidth: f64,
    /// Mean power usage (kW)
    #[serde(rename = "avg_power")]
    pub average_power: f64,
    /// Mean energy consumption (kWh)
    #[serde(rename = "avg_energy")]
    pub average_energy: f64,
    /// `average_bandwidth / (average_power + 0.1)`, rounded to 3 places
    pub efficiency: f64,
}

impl RegionMetrics {
    /// Resource-cost proxy used by the optimizer (lower is cheaper)
    pub fn resource_cost(&self) -> f64 {
        self.average_power + self.average_energy / ENERGY_SCALE
    }
}

/// Outcome of one optimizer run, decoded back to region names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocationResult {
    /// Region → human-readable band label
    #[serde(rename = "allocation_map")]
    pub allocation: BTreeMap<Region, String>,
    /// Winning fitness, rounded to 3 places
    pub score: f64,
    /// Generations run before the winner was picked
    pub generations: usize,
    pub region_metrics: BTreeMap<Region, RegionMetrics>,
    /// Region → raw band token, as ranked in the request
    pub band_assignment: BTreeMap<Region, Band>,
}

impl AllocationResult {
    /// Number of regions assigned to each band token
    pub fn band_distribution(&self) -> BTreeMap<Band, usize> {
        let mut counts = BTreeMap::new();
        for band in self.band_assignment.values() {
            *counts.entry(band.clone()).or_insert(0) += 1;
        }
        counts
    }
}

/// Round half away from zero to `decimals` places
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(1.23456, 3), 1.235);
        assert_eq!(round_to(0.874, 2), 0.87);
        assert_eq!(round_to(0.0, 3), 0.0);
    }

    #[test]
    fn test_resource_cost() {
        let m = RegionMetrics {
            average_bandwidth: 40.0,
            average_power: 2.0,
            average_energy: 150.0,
            efficiency: 19.048,
        };
        assert!((m.resource_cost() - 3.5).abs() < 1e-12);
    }

    #[test]
    fn test_region_metrics_wire_names() {
        let json = serde_json::to_value(RegionMetrics::default()).unwrap();
        assert!(json.get("avg_bw").is_some());
        assert!(json.get("avg_power").is_some());
        assert!(json.get("avg_energy").is_some());
        assert!(json.get("efficiency").is_some());
    }

    #[test]
    fn test_band_distribution() {
        let mut band_assignment = BTreeMap::new();
        band_assignment.insert("A".to_string(), "low".to_string());
        band_assignment.insert("B".to_string(), "low".to_string());
        band_assignment.insert("C".to_string(), "high".to_string());
        let result = AllocationResult {
            allocation: BTreeMap::new(),
            score: 0.0,
            generations: 1,
            region_metrics: BTreeMap::new(),
            band_assignment,
        };

        let dist = result.band_distribution();
        assert_eq!(dist.get("low"), Some(&2));
        assert_eq!(dist.get("high"), Some(&1));
        assert_eq!(dist.get("mid"), None);
    }
}
