//! Per-region telemetry aggregation

use crate::loader::TelemetryTable;
use crate::{round_to, Region, RegionMetrics, POWER_FLOOR, SCORE_DECIMALS};
use std::collections::BTreeMap;
use tracing::debug;

/// Average the telemetry rows for one region.
///
/// Matching is case-insensitive on the cluster name. A region with no rows
/// gets all-zero metrics.
pub fn compute_metrics(region: &str, table: &TelemetryTable) -> RegionMetrics {
    let mut count = 0usize;
    let (mut bw, mut power, mut energy) = (0.0, 0.0, 0.0);

    for row in table.rows_for(region) {
        count += 1;
        bw += row.bandwidth;
        power += row.power;
        energy += row.energy;
    }

    if count == 0 {
        debug!("No telemetry rows for region {}", region);
        return RegionMetrics::default();
    }

    let n = count as f64;
    let average_bandwidth = bw / n;
    let average_power = power / n;
    let average_energy = energy / n;

    RegionMetrics {
        average_bandwidth,
        average_power,
        average_energy,
        efficiency: round_to(average_bandwidth / (average_power + POWER_FLOOR), SCORE_DECIMALS),
    }
}

/// Metrics for every requested region
pub fn compute_all(regions: &[Region], table: &TelemetryTable) -> BTreeMap<Region, RegionMetrics> {
    regions
        .iter()
        .map(|r| (r.clone(), compute_metrics(r, table)))
        .collect()
}
