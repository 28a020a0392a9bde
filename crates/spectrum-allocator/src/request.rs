//! Allocation request contract and validation

use crate::{Band, EngineError, Region, Result, DEFAULT_DEMAND};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use tracing::debug;

/// Request as received from a caller; only `bands` and some region are required.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AllocationRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    /// Single-region shorthand, used when `regions` is absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub regions: Option<Vec<String>>,
    #[serde(default)]
    pub bands: Vec<String>,
    /// Relative traffic weight per region (default 1.0)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub demand: Option<BTreeMap<String, f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub use_case: Option<String>,
}

/// Request after validation: non-empty, distinct, lower-cased bands and
/// non-empty, distinct regions with a demand for each.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedRequest {
    pub request_id: Option<String>,
    pub use_case: Option<String>,
    pub regions: Vec<Region>,
    /// Ranked band tokens, first = highest quality
    pub bands: Vec<Band>,
    pub demand: BTreeMap<Region, f64>,
}

fn invalid(msg: impl Into<String>) -> EngineError {
    EngineError::InvalidInput(msg.into())
}

impl AllocationRequest {
    pub fn new(regions: &[&str], bands: &[&str]) -> Self {
        Self {
            regions: Some(regions.iter().map(|r| r.to_string()).collect()),
            bands: bands.iter().map(|b| b.to_string()).collect(),
            ..Default::default()
        }
    }

    pub fn with_demand(mut self, demand: &[(&str, f64)]) -> Self {
        self.demand = Some(demand.iter().map(|(r, d)| (r.to_string(), *d)).collect());
        self
    }

    pub fn validate(&self) -> Result<ValidatedRequest> {
        let bands: Vec<Band> = self
            .bands
            .iter()
            .map(|b| b.trim().to_lowercase())
            .collect();
        if bands.is_empty() {
            return Err(invalid("no bands provided"));
        }
        if bands.iter().any(|b| b.is_empty()) {
            return Err(invalid("band names must not be empty"));
        }
        let mut seen = HashSet::new();
        if let Some(dup) = bands.iter().find(|b| !seen.insert(b.as_str())) {
            return Err(invalid(format!("duplicate band '{}'", dup)));
        }

        let raw_regions: Vec<String> = match (&self.regions, &self.region) {
            (Some(list), _) if !list.is_empty() => list.clone(),
            (_, Some(single)) => vec![single.clone()],
            _ => Vec::new(),
        };
        let regions: Vec<Region> = raw_regions.iter().map(|r| r.trim().to_string()).collect();
        if regions.is_empty() {
            return Err(invalid("no regions provided"));
        }
        if regions.iter().any(|r| r.is_empty()) {
            return Err(invalid("region names must not be empty"));
        }
        let mut seen = HashSet::new();
        if let Some(dup) = regions.iter().find(|r| !seen.insert(r.as_str())) {
            return Err(invalid(format!("duplicate region '{}'", dup)));
        }

        // Keys are trimmed the same way as region names
        let mut requested: BTreeMap<Region, f64> = BTreeMap::new();
        for (raw, weight) in self.demand.iter().flatten() {
            let region = raw.trim().to_string();
            if !weight.is_finite() || *weight <= 0.0 {
                return Err(invalid(format!(
                    "demand for '{}' must be a positive number, got {}",
                    region, weight
                )));
            }
            if !regions.contains(&region) {
                debug!("Ignoring demand for unrequested region '{}'", region);
            }
            if requested.insert(region.clone(), *weight).is_some() {
                return Err(invalid(format!("duplicate demand entry for '{}'", region)));
            }
        }

        let demand = regions
            .iter()
            .map(|r| (r.clone(), requested.get(r).copied().unwrap_or(DEFAULT_DEMAND)))
            .collect();

        Ok(ValidatedRequest {
            request_id: self.request_id.clone(),
            use_case: self.use_case.clone(),
            regions,
            bands,
            demand,
        })
    }
}
