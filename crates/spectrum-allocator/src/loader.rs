//! Telemetry loading from CSV or JSON files

use crate::{EngineError, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use tracing::{debug, info};

/// One telemetry row after cleaning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetryRecord {
    pub region: String,
    /// Bandwidth (MHz)
    pub bandwidth: f64,
    /// Power usage (kW)
    pub power: f64,
    /// Energy consumption (kWh)
    pub energy: f64,
}

/// Read-only telemetry rows keyed by cluster/region name.
#[derive(Debug, Clone, Default)]
pub struct TelemetryTable {
    records: Vec<TelemetryRecord>,
}

impl TelemetryTable {
    pub fn from_records(records: Vec<TelemetryRecord>) -> Self {
        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[TelemetryRecord] {
        &self.records
    }

    /// Rows whose region matches `region`, ignoring case
    pub fn rows_for<'a>(&'a self, region: &str) -> impl Iterator<Item = &'a TelemetryRecord> + 'a {
        let needle = region.trim().to_lowercase();
        self.records
            .iter()
            .filter(move |r| r.region.to_lowercase() == needle)
    }
}

/// Raw telemetry row; accepts both the cluster dataset headers and short names.
#[derive(Debug, Deserialize)]
struct RawTelemetryRow {
    #[serde(default, alias = "Jio_Cluster", alias = "cluster")]
    region: Option<String>,
    #[serde(default, alias = "Bandwidth_MHz")]
    bandwidth: Option<RawCell>,
    #[serde(default, alias = "Power_Usage_kW")]
    power: Option<RawCell>,
    #[serde(default, alias = "Energy_Consumption_kWh")]
    energy: Option<RawCell>,
}

/// Numeric cell as written; NA markers and junk arrive as text.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawCell {
    Number(f64),
    Text(String),
}

/// Cell value with empty, NA, NaN and infinite cells counted as zero
fn cell_value(cell: Option<RawCell>) -> f64 {
    let value = match cell {
        Some(RawCell::Number(n)) => n,
        Some(RawCell::Text(text)) => text.trim().parse::<f64>().unwrap_or(0.0),
        None => 0.0,
    };
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

fn is_json(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("json"))
        .unwrap_or(false)
}

fn read_json_rows(reader: impl Read) -> std::result::Result<Vec<RawTelemetryRow>, String> {
    let raw: serde_json::Value = serde_json::from_reader(reader).map_err(|e| e.to_string())?;

    // Either {"rows": [...]} or a bare array
    if let Some(rows) = raw.get("rows") {
        serde_json::from_value(rows.clone()).map_err(|e| e.to_string())
    } else if raw.is_array() {
        serde_json::from_value(raw).map_err(|e| e.to_string())
    } else {
        Err("expected an array of rows or an object with a \"rows\" field".to_string())
    }
}

fn read_csv_rows(reader: impl Read) -> std::result::Result<Vec<RawTelemetryRow>, String> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    csv_reader
        .deserialize()
        .collect::<std::result::Result<Vec<RawTelemetryRow>, _>>()
        .map_err(|e| e.to_string())
}

/// Load the telemetry table backing the metrics aggregator.
///
/// Any failure to open or parse the file is reported as
/// [`EngineError::DataUnavailable`]. Missing, `NA`/`NaN` and other
/// non-numeric cells count as zero; rows without a region name are skipped.
pub fn load_telemetry(path: impl AsRef<Path>) -> Result<TelemetryTable> {
    let path = path.as_ref();
    info!("Loading telemetry from {:?}", path);

    let unavailable = |reason: String| EngineError::DataUnavailable {
        path: path.to_path_buf(),
        reason,
    };

    let file = File::open(path).map_err(|e| unavailable(e.to_string()))?;
    let reader = BufReader::new(file);
    let rows = if is_json(path) {
        read_json_rows(reader)
    } else {
        read_csv_rows(reader)
    }
    .map_err(unavailable)?;

    let mut records = Vec::with_capacity(rows.len());
    let mut skipped = 0;

    for row in rows {
        let region: String = match row.region {
            Some(name) if !name.trim().is_empty() => name.trim().to_string(),
            _ => {
                skipped += 1;
                continue;
            }
        };

        records.push(TelemetryRecord {
            region,
            bandwidth: cell_value(row.bandwidth),
            power: cell_value(row.power),
            energy: cell_value(row.energy),
        });
    }

    debug!("Telemetry sample: {:?}", records.first());
    info!(
        "Loaded {} telemetry rows ({} skipped for missing region)",
        records.len(),
        skipped
    );

    Ok(TelemetryTable::from_records(records))
}
