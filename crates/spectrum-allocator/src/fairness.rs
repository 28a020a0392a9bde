//! Jain's fairness index over demand-weighted band shares
//!
//! Each region's share is `demand × quality`, where quality ranks the band
//! by its position in the request's band order:
//!
//! ```text
//! quality = max(1, B - position)        (first band = B, last = 1)
//! J       = (Σ s)² / (n · Σ s²)
//! ```

use crate::{Band, Region, DEFAULT_DEMAND};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::warn;

/// Quality assigned to bands missing from the ranking
pub const UNKNOWN_BAND_QUALITY: f64 = 1.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FairnessResult {
    /// Jain's index in [0, 1]; 0.0 when there is nothing to compare
    pub jain: f64,
    /// Per-region shares in allocation map order (sorted by region)
    pub shares: Vec<f64>,
    /// Allocated bands that were not found in the ranking
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub unknown_bands: Vec<Band>,
}

/// Ranking quality of `band`, or `None` if it is not in `band_order`
pub fn band_quality(band: &str, band_order: &[Band]) -> Option<f64> {
    band_order
        .iter()
        .position(|b| b == band)
        .map(|idx| (band_order.len() - idx).max(1) as f64)
}

/// Jain's fairness index; 0.0 for no shares or all-zero shares
pub fn jain_index(shares: &[f64]) -> f64 {
    if shares.is_empty() {
        return 0.0;
    }

    let sum: f64 = shares.iter().sum();
    let sum_sq: f64 = shares.iter().map(|s| s * s).sum();
    if sum_sq <= 0.0 {
        return 0.0;
    }

    // Rounding can push equal shares a hair above 1
    (sum * sum / (shares.len() as f64 * sum_sq)).min(1.0)
}

/// Score how evenly an allocation serves demand.
///
/// Bands absent from `band_order` are logged and treated as the lowest
/// quality rather than failing.
pub fn evaluate_fairness(
    allocation: &BTreeMap<Region, Band>,
    band_order: &[Band],
    demand: &BTreeMap<Region, f64>,
) -> FairnessResult {
    let mut shares = Vec::with_capacity(allocation.len());
    let mut unknown_bands = Vec::new();

    for (region, band) in allocation {
        let quality = band_quality(band, band_order).unwrap_or_else(|| {
            warn!(
                "Band '{}' for region '{}' not in bands list, defaulting quality=1",
                band, region
            );
            unknown_bands.push(band.clone());
            UNKNOWN_BAND_QUALITY
        });
        let weight = demand.get(region).copied().unwrap_or(DEFAULT_DEMAND);
        shares.push(weight * quality);
    }

    FairnessResult {
        jain: jain_index(&shares),
        shares,
        unknown_bands,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn bands(list: &[&str]) -> Vec<Band> {
        list.iter().map(|b| b.to_string()).collect()
    }

    fn alloc(pairs: &[(&str, &str)]) -> BTreeMap<Region, Band> {
        pairs
            .iter()
            .map(|(r, b)| (r.to_string(), b.to_string()))
            .collect()
    }

    #[test]
    fn test_band_quality_ranking() {
        let order = bands(&["low", "mid", "high"]);
        assert_eq!(band_quality("low", &order), Some(3.0));
        assert_eq!(band_quality("mid", &order), Some(2.0));
        assert_eq!(band_quality("high", &order), Some(1.0));
        assert_eq!(band_quality("x", &order), None);
    }

    #[test]
    fn test_equal_shares_are_perfectly_fair() {
        let allocation = alloc(&[("A", "mid"), ("B", "mid"), ("C", "mid")]);
        let result = evaluate_fairness(&allocation, &bands(&["low", "mid", "high"]), &BTreeMap::new());
        assert_eq!(result.jain, 1.0);
        assert_eq!(result.shares, vec![2.0, 2.0, 2.0]);
    }

    #[test]
    fn test_empty_allocation() {
        let result = evaluate_fairness(&BTreeMap::new(), &bands(&["low"]), &BTreeMap::new());
        assert_eq!(result.jain, 0.0);
        assert!(result.shares.is_empty());
    }

    #[test]
    fn test_all_zero_shares() {
        assert_eq!(jain_index(&[0.0, 0.0]), 0.0);
    }

    #[test]
    fn test_unknown_band_defaults_to_one() {
        let allocation = alloc(&[("A", "low"), ("B", "terahertz")]);
        let result = evaluate_fairness(&allocation, &bands(&["low", "mid"]), &BTreeMap::new());
        assert_eq!(result.shares, vec![2.0, 1.0]);
        assert_eq!(result.unknown_bands, vec!["terahertz".to_string()]);
        // (3)^2 / (2 * 5) = 0.9
        assert!((result.jain - 0.9).abs() < 1e-12);
    }

    #[test]
    fn test_higher_demand_gets_larger_share() {
        let allocation = alloc(&[("A", "low"), ("B", "low")]);
        let mut demand = BTreeMap::new();
        demand.insert("A".to_string(), 2.0);
        demand.insert("B".to_string(), 1.0);

        let result = evaluate_fairness(&allocation, &bands(&["low", "mid"]), &demand);
        assert!(result.shares[0] >= result.shares[1]);
        assert_eq!(result.shares, vec![4.0, 2.0]);
    }

    #[test]
    fn test_maximally_unequal_approaches_one_over_n() {
        let j = jain_index(&[1.0, 0.0, 0.0, 0.0]);
        assert!((j - 0.25).abs() < 1e-12);
    }

    proptest! {
        #[test]
        fn prop_jain_in_unit_interval(shares in prop::collection::vec(0.0f64..1.0e4, 1..64)) {
            let j = jain_index(&shares);
            prop_assert!((0.0..=1.0).contains(&j), "jain = {}", j);
        }
    }
}
