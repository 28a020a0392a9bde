//! Simulated channel health per allocated region
//!
//! Readings are drawn at random to stand in for live telemetry, so results
//! differ between calls. Status depends only on the interference index:
//!
//! | interference_index | status              |
//! |--------------------|---------------------|
//! | ≤ 0.60             | `stable`            |
//! | 0.60 – 0.75        | `warning`           |
//! | > 0.75             | `realloc_suggested` |

use crate::{round_to, Region, RegionMetrics};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

pub const TRAFFIC_LOAD_MIN: f64 = 0.2;
pub const TRAFFIC_LOAD_MAX: f64 = 1.0;
pub const INTERFERENCE_MIN: f64 = 0.0;
pub const INTERFERENCE_MAX: f64 = 0.9;

/// Above this the region is flagged for reallocation
pub const REALLOC_THRESHOLD: f64 = 0.75;
/// Above this (and up to the realloc threshold) the region is a warning
pub const WARNING_THRESHOLD: f64 = 0.6;

const READING_DECIMALS: i32 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelStatus {
    Stable,
    Warning,
    ReallocSuggested,
}

impl ChannelStatus {
    pub fn from_interference(interference_index: f64) -> Self {
        if interference_index > REALLOC_THRESHOLD {
            Self::ReallocSuggested
        } else if interference_index > WARNING_THRESHOLD {
            Self::Warning
        } else {
            Self::Stable
        }
    }
}

/// Health reading for one region's allocated band
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelMetric {
    pub band: String,
    pub traffic_load: f64,
    pub interference_index: f64,
    pub status: ChannelStatus,
    /// Telemetry averages, attached by the engine for traceability
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region_metrics: Option<RegionMetrics>,
}

/// Classify every region in `allocation` using readings drawn from `rng`.
///
/// An empty allocation yields an empty map.
pub fn classify_channels<R: Rng>(
    allocation: &BTreeMap<Region, String>,
    rng: &mut R,
) -> BTreeMap<Region, ChannelMetric> {
    allocation
        .iter()
        .map(|(region, band)| {
            let traffic_load = round_to(
                rng.gen_range(TRAFFIC_LOAD_MIN..=TRAFFIC_LOAD_MAX),
                READING_DECIMALS,
            );
            let interference_index = round_to(
                rng.gen_range(INTERFERENCE_MIN..=INTERFERENCE_MAX),
                READING_DECIMALS,
            );
            let status = ChannelStatus::from_interference(interference_index);

            debug!(
                "Channel {} on {}: load={:.2} interference={:.2} -> {:?}",
                region, band, traffic_load, interference_index, status
            );

            (
                region.clone(),
                ChannelMetric {
                    band: band.clone(),
                    traffic_load,
                    interference_index,
                    status,
                    region_metrics: None,
                },
            )
        })
        .collect()
}

/// [`classify_channels`] on a fresh thread-local stream
pub fn classify_channels_live(allocation: &BTreeMap<Region, String>) -> BTreeMap<Region, ChannelMetric> {
    classify_channels(allocation, &mut rand::thread_rng())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn allocation(n: usize) -> BTreeMap<Region, String> {
        (0..n).map(|i| (format!("R{i}"), "mid".to_string())).collect()
    }

    #[test]
    fn test_thresholds() {
        assert_eq!(ChannelStatus::from_interference(0.0), ChannelStatus::Stable);
        assert_eq!(ChannelStatus::from_interference(0.6), ChannelStatus::Stable);
        assert_eq!(ChannelStatus::from_interference(0.61), ChannelStatus::Warning);
        assert_eq!(ChannelStatus::from_interference(0.75), ChannelStatus::Warning);
        assert_eq!(ChannelStatus::from_interference(0.76), ChannelStatus::ReallocSuggested);
        assert_eq!(ChannelStatus::from_interference(0.9), ChannelStatus::ReallocSuggested);
    }

    #[test]
    fn test_empty_allocation() {
        assert!(classify_channels_live(&BTreeMap::new()).is_empty());
    }

    #[test]
    fn test_status_wire_names() {
        let json = serde_json::to_string(&ChannelStatus::ReallocSuggested).unwrap();
        assert_eq!(json, "\"realloc_suggested\"");
    }

    #[test]
    fn test_every_region_reported_with_its_band() {
        let metrics = classify_channels_live(&allocation(8));
        assert_eq!(metrics.len(), 8);
        assert!(metrics.values().all(|m| m.band == "mid"));
    }

    proptest! {
        #[test]
        fn prop_readings_in_range_and_status_consistent(seed in any::<u64>(), n in 1usize..20) {
            let mut rng = StdRng::seed_from_u64(seed);
            for m in classify_channels(&allocation(n), &mut rng).values() {
                prop_assert!((TRAFFIC_LOAD_MIN..=TRAFFIC_LOAD_MAX).contains(&m.traffic_load));
                prop_assert!((INTERFERENCE_MIN..=INTERFERENCE_MAX).contains(&m.interference_index));

                let expected = if m.interference_index > 0.75 {
                    ChannelStatus::ReallocSuggested
                } else if m.interference_index > 0.6 {
                    ChannelStatus::Warning
                } else {
                    ChannelStatus::Stable
                };
                prop_assert_eq!(m.status, expected);
            }
        }
    }
}
