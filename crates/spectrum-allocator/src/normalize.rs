//! Min-max normalization of per-region attributes

use crate::{Region, RegionMetrics, DEFAULT_DEMAND};
use std::collections::BTreeMap;

/// Value every region gets when the attribute carries no signal
pub const FLAT_SIGNAL: f64 = 0.5;

/// Scale values into [0, 1] by `(v - min) / (max - min)`.
///
/// Empty input gives empty output. When every value is equal (including a
/// single region) each region maps to 0.5.
pub fn min_max_normalize(values: &BTreeMap<Region, f64>) -> BTreeMap<Region, f64> {
    let min = values.values().copied().fold(f64::INFINITY, f64::min);
    let max = values.values().copied().fold(f64::NEG_INFINITY, f64::max);

    if values.is_empty() || max == min {
        return values.keys().map(|k| (k.clone(), FLAT_SIGNAL)).collect();
    }

    let span = max - min;
    values
        .iter()
        .map(|(k, v)| (k.clone(), (v - min) / span))
        .collect()
}

/// `1 - v` for every entry, so lower raw cost reads as more headroom
pub fn invert(normalized: &BTreeMap<Region, f64>) -> BTreeMap<Region, f64> {
    normalized
        .iter()
        .map(|(k, v)| (k.clone(), 1.0 - v))
        .collect()
}

/// Normalized inputs for one region, all in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegionSignal {
    pub demand: f64,
    pub efficiency: f64,
    /// Inverted resource cost (higher = more headroom)
    pub resource: f64,
}

/// Normalized signals in request region order.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionSignals {
    signals: Vec<RegionSignal>,
}

impl RegionSignals {
    /// Normalize demand, efficiency and resource cost across `regions`
    pub fn build(
        regions: &[Region],
        demand: &BTreeMap<Region, f64>,
        metrics: &BTreeMap<Region, RegionMetrics>,
    ) -> Self {
        let raw_demand: BTreeMap<Region, f64> = regions
            .iter()
            .map(|r| (r.clone(), demand.get(r).copied().unwrap_or(DEFAULT_DEMAND)))
            .collect();
        let raw_efficiency: BTreeMap<Region, f64> = regions
            .iter()
            .map(|r| (r.clone(), metrics.get(r).map(|m| m.efficiency).unwrap_or(0.0)))
            .collect();
        let raw_cost: BTreeMap<Region, f64> = regions
            .iter()
            .map(|r| (r.clone(), metrics.get(r).map(|m| m.resource_cost()).unwrap_or(0.0)))
            .collect();

        let demand_norm = min_max_normalize(&raw_demand);
        let eff_norm = min_max_normalize(&raw_efficiency);
        let resource_norm = invert(&min_max_normalize(&raw_cost));

        let lookup = |m: &BTreeMap<Region, f64>, r: &Region| m.get(r).copied().unwrap_or(FLAT_SIGNAL);

        let signals = regions
            .iter()
            .map(|r| RegionSignal {
                demand: lookup(&demand_norm, r),
                efficiency: lookup(&eff_norm, r),
                resource: lookup(&resource_norm, r),
            })
            .collect();

        Self { signals }
    }

    pub fn from_signals(signals: Vec<RegionSignal>) -> Self {
        Self { signals }
    }

    pub fn len(&self) -> usize {
        self.signals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.signals.is_empty()
    }

    pub fn as_slice(&self) -> &[RegionSignal] {
        &self.signals
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn map(pairs: &[(&str, f64)]) -> BTreeMap<Region, f64> {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn test_empty_input() {
        assert!(min_max_normalize(&BTreeMap::new()).is_empty());
    }

    #[test]
    fn test_single_value_is_half() {
        let out = min_max_normalize(&map(&[("a", 42.0)]));
        assert_eq!(out["a"], 0.5);
    }

    #[test]
    fn test_identical_values_are_half() {
        let out = min_max_normalize(&map(&[("a", 3.0), ("b", 3.0), ("c", 3.0)]));
        assert!(out.values().all(|v| *v == 0.5));
    }

    #[test]
    fn test_distinct_values_span_unit_interval() {
        let out = min_max_normalize(&map(&[("a", 1.0), ("b", 3.0), ("c", 5.0)]));
        assert_eq!(out["a"], 0.0);
        assert_eq!(out["b"], 0.5);
        assert_eq!(out["c"], 1.0);
    }

    #[test]
    fn test_invert() {
        let out = invert(&map(&[("a", 0.0), ("b", 0.25)]));
        assert_eq!(out["a"], 1.0);
        assert_eq!(out["b"], 0.75);
    }

    #[test]
    fn test_signals_follow_region_order() {
        let regions = vec!["B".to_string(), "A".to_string()];
        let demand = map(&[("A", 2.0), ("B", 1.0)]);
        let mut metrics = BTreeMap::new();
        metrics.insert(
            "A".to_string(),
            RegionMetrics {
                average_bandwidth: 50.0,
                average_power: 1.0,
                average_energy: 100.0,
                efficiency: 45.455,
            },
        );

        let signals = RegionSignals::build(&regions, &demand, &metrics);
        let s = signals.as_slice();
        assert_eq!(s.len(), 2);
        // B: lowest demand, no telemetry (zero cost = most headroom)
        assert_eq!(s[0].demand, 0.0);
        assert_eq!(s[0].efficiency, 0.0);
        assert_eq!(s[0].resource, 1.0);
        assert_eq!(s[1].demand, 1.0);
        assert_eq!(s[1].efficiency, 1.0);
        assert_eq!(s[1].resource, 0.0);
    }

    #[test]
    fn test_unlisted_demand_defaults_to_one() {
        let regions = vec!["A".to_string(), "B".to_string()];
        let demand = map(&[("A", 1.0)]);
        let signals = RegionSignals::build(&regions, &demand, &BTreeMap::new());
        // Both demands are 1.0, so there is no signal
        assert!(signals.as_slice().iter().all(|s| s.demand == 0.5));
    }

    proptest! {
        #[test]
        fn prop_normalized_in_unit_interval(values in prop::collection::vec(-1.0e6f64..1.0e6, 1..32)) {
            let input: BTreeMap<Region, f64> = values
                .iter()
                .enumerate()
                .map(|(i, v)| (format!("r{i}"), *v))
                .collect();
            let out = min_max_normalize(&input);
            prop_assert_eq!(out.len(), input.len());
            for v in out.values() {
                prop_assert!((0.0..=1.0).contains(v));
            }
        }
    }
}
