use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub const FINAL_SCORE: &str = "Final Score";
pub const BLEU_4: &str = "BLEU-4";
pub const ROUGE_L: &str = "ROUGE-L";
pub const TIMING_F1: &str = "Timing F1";
pub const TIMING_AUC: &str = "Timing AUC";
pub const ACTION_F1: &str = "Action F1";

pub const KNOWN_METRICS: [&str; 6] = [
    FINAL_SCORE,
    BLEU_4,
    ROUGE_L,
    TIMING_F1,
    TIMING_AUC,
    ACTION_F1,
];

/// Metric name to score, as parsed from one record's result blob.
pub type MetricsMapping = BTreeMap<String, f64>;

/// In-memory view of the submissions export. Cells are kept as raw text.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|header| header == name)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn cell(&self, row: usize, column: usize) -> &str {
        self.rows
            .get(row)
            .and_then(|cells| cells.get(column))
            .map(String::as_str)
            .unwrap_or("")
    }
}

/// A retained submission: its display identifier and the metrics extracted
/// from the same record. The two never travel separately.
#[derive(Debug, Clone, PartialEq)]
pub struct Run {
    pub id: String,
    pub metrics: MetricsMapping,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Baseline {
    pub label: String,
    pub scores: MetricsMapping,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartShape {
    Bar,
    Line,
    Radar,
}

impl ChartShape {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Bar => "bar",
            Self::Line => "line",
            Self::Radar => "radar",
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LineLayout {
    /// x = submission sequence number, one line per metric.
    #[default]
    BySubmission,
    /// x = metric name, one line per run.
    ByMetric,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OrderPolicy {
    #[default]
    Forward,
    /// Most recently appended record first.
    Reverse,
}

#[derive(Debug, Clone, Serialize)]
pub struct RenderCounts {
    pub rows_loaded: usize,
    pub rows_finished: usize,
    pub blobs_fallback_empty: usize,
    pub series_plotted: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct RenderManifest {
    pub manifest_version: u32,
    pub generated_at: String,
    pub input_path: String,
    pub input_sha256: String,
    pub output_path: String,
    pub profile: String,
    pub shape: String,
    pub metric_order: Vec<String>,
    pub counts: RenderCounts,
    pub series_labels: Vec<String>,
}
