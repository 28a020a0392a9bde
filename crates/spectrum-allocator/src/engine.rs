//! Request pipeline: metrics → normalize → optimize → (fairness, monitoring)

use crate::config::EngineConfig;
use crate::fairness::{evaluate_fairness, FairnessResult};
use crate::loader::{load_telemetry, TelemetryTable};
use crate::metrics::compute_all;
use crate::monitor::{classify_channels_live, ChannelMetric};
use crate::normalize::RegionSignals;
use crate::optimizer::{decode, GeneticOptimizer};
use crate::request::{AllocationRequest, ValidatedRequest};
use crate::{round_to, AllocationResult, Band, Region, Result, SCORE_DECIMALS};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// Everything produced for one request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocationResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub use_case: Option<String>,
    #[serde(flatten)]
    pub allocation: AllocationResult,
    pub band_distribution: BTreeMap<Band, usize>,
    pub fairness: FairnessResult,
    pub monitoring: BTreeMap<Region, ChannelMetric>,
    pub generated_at: String,
}

/// Stateless allocation engine over a shared, read-only telemetry table.
#[derive(Debug, Clone)]
pub struct SpectrumEngine {
    telemetry: Arc<TelemetryTable>,
    config: EngineConfig,
    optimizer: GeneticOptimizer,
}

impl SpectrumEngine {
    pub fn new(telemetry: Arc<TelemetryTable>, config: EngineConfig) -> Result<Self> {
        let optimizer = GeneticOptimizer::new(config.optimizer.clone())?;
        Ok(Self {
            telemetry,
            config,
            optimizer,
        })
    }

    /// Load telemetry from `path`; fails with `DataUnavailable` if it cannot be read
    pub fn from_path(path: impl AsRef<Path>, config: EngineConfig) -> Result<Self> {
        let table = load_telemetry(path)?;
        Self::new(Arc::new(table), config)
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn telemetry(&self) -> &TelemetryTable {
        &self.telemetry
    }

    /// Run the optimizer for a validated request
    pub fn optimize<R: Rng>(&self, request: &ValidatedRequest, rng: &mut R) -> Result<AllocationResult> {
        let region_metrics = compute_all(&request.regions, &self.telemetry);
        let signals = RegionSignals::build(&request.regions, &request.demand, &region_metrics);

        let evolution = self.optimizer.evolve(&signals, request.bands.len(), rng)?;
        let (allocation, band_assignment) = decode(
            &evolution.best,
            &request.regions,
            &request.bands,
            &self.config,
        );

        Ok(AllocationResult {
            allocation,
            score: round_to(evolution.fitness, SCORE_DECIMALS),
            generations: evolution.generations,
            region_metrics,
            band_assignment,
        })
    }

    /// Allocate with the configured seed, or entropy when none is set
    pub fn allocate(&self, request: &AllocationRequest) -> Result<AllocationResponse> {
        let mut rng = match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        self.run(request, &mut rng)
    }

    /// Allocate with a fixed seed; the allocation part is reproducible
    pub fn allocate_seeded(&self, request: &AllocationRequest, seed: u64) -> Result<AllocationResponse> {
        self.run(request, &mut StdRng::seed_from_u64(seed))
    }

    fn run<R: Rng>(&self, request: &AllocationRequest, rng: &mut R) -> Result<AllocationResponse> {
        let request = request.validate()?;
        info!(
            "Allocating {} bands across {} regions",
            request.bands.len(),
            request.regions.len()
        );

        let allocation = self.optimize(&request, rng)?;
        info!("Allocation computed: {:?}", allocation.allocation);

        let fairness = evaluate_fairness(&allocation.band_assignment, &request.bands, &request.demand);
        info!("Fairness evaluation complete: jain={:.3}", fairness.jain);

        let mut monitoring = classify_channels_live(&allocation.allocation);
        for (region, metric) in monitoring.iter_mut() {
            metric.region_metrics = allocation.region_metrics.get(region).copied();
        }

        Ok(AllocationResponse {
            request_id: request.request_id,
            use_case: request.use_case,
            band_distribution: allocation.band_distribution(),
            allocation,
            fairness,
            monitoring,
            generated_at: chrono::Utc::now().to_rfc3339(),
        })
    }
}
