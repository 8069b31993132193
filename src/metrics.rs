use anyhow::{Result, bail};
use serde_json::Value;
use tracing::{debug, warn};

use crate::model::{MetricsMapping, Table};

pub const DEFAULT_METRICS_COLUMN: &str = "Result File";

/// Parses a result blob such as `[{'BLEU-4': 0.0, 'ROUGE-L': 0.0755}]`.
///
/// The export writes the blob with single quotes, so quotes are normalized
/// before JSON parsing. Anything that is not a one-element list holding one
/// object is `None`, and the caller plots that run with an empty mapping: a
/// bad record must degrade its own series rather than abort the chart.
/// Non-numeric values are left out and show up as missing metrics downstream.
pub fn parse_metrics_cell(cell: &str) -> Option<MetricsMapping> {
    let normalized = cell.trim().replace('\'', "\"");

    let Ok(Value::Array(items)) = serde_json::from_str::<Value>(&normalized) else {
        return None;
    };
    let [Value::Object(entries)] = items.as_slice() else {
        return None;
    };

    Some(
        entries
            .iter()
            .filter_map(|(name, value)| value.as_f64().map(|score| (name.clone(), score)))
            .collect(),
    )
}

#[derive(Debug, Clone, Default)]
pub struct Extraction {
    pub mappings: Vec<MetricsMapping>,
    /// Rows whose blob was unreadable and fell back to an empty mapping.
    pub fallback_rows: Vec<usize>,
}

/// Extracts one mapping per row, in row order.
pub fn extract_all(table: &Table, metrics_column: &str) -> Result<Extraction> {
    let Some(column) = table.column_index(metrics_column) else {
        bail!("missing required column `{metrics_column}`");
    };

    let mut extraction = Extraction::default();
    for row in 0..table.len() {
        let cell = table.cell(row, column);
        let mapping = match parse_metrics_cell(cell) {
            Some(mapping) => mapping,
            None => {
                debug!(row, blob = %cell, "metrics blob did not parse");
                extraction.fallback_rows.push(row);
                MetricsMapping::new()
            }
        };
        extraction.mappings.push(mapping);
    }

    if !extraction.fallback_rows.is_empty() {
        warn!(
            rows = ?extraction.fallback_rows,
            "metrics blobs unreadable, plotting those runs without scores"
        );
    }

    Ok(extraction)
}
