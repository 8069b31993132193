use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::metrics::DEFAULT_METRICS_COLUMN;
use crate::model::{
    ACTION_F1, BLEU_4, Baseline, ChartShape, FINAL_SCORE, KNOWN_METRICS, LineLayout, OrderPolicy,
    ROUGE_L, TIMING_AUC, TIMING_F1,
};
use crate::table::DEFAULT_STATUS_COLUMN;

pub const DEFAULT_PROFILE: &str = "bar";
pub const BASELINE_LABEL: &str = "GPT-4o Baseline";

/// matplotlib's tab20.
pub const TAB20: [&str; 20] = [
    "#1f77b4", "#aec7e8", "#ff7f0e", "#ffbb78", "#2ca02c", "#98df8a", "#d62728", "#ff9896",
    "#9467bd", "#c5b0d5", "#8c564b", "#c49c94", "#e377c2", "#f7b6d2", "#7f7f7f", "#c7c7c7",
    "#bcbd22", "#dbdb8d", "#17becf", "#9edae5",
];

/// ColorBrewer Set2, first four.
pub const SET2: [&str; 4] = ["#66c2a5", "#fc8d62", "#8da0cb", "#e78ac3"];

/// Everything that used to differ between the per-chart scripts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartProfile {
    pub name: String,
    pub title: String,
    pub shape: ChartShape,
    #[serde(default)]
    pub line_layout: LineLayout,
    pub metric_order: Vec<String>,
    /// `None` leaves the baseline off the chart; bar and radar charts require one.
    #[serde(default)]
    pub baseline: Option<Baseline>,
    #[serde(default)]
    pub order: OrderPolicy,
    pub palette: Vec<String>,
    #[serde(default = "default_baseline_color")]
    pub baseline_color: String,
    #[serde(default = "default_fill_alpha")]
    pub fill_alpha: f64,
    #[serde(default = "default_status_column")]
    pub status_column: String,
    #[serde(default = "default_metrics_column")]
    pub metrics_column: String,
    #[serde(default)]
    pub label_names: BTreeMap<String, String>,
    #[serde(default)]
    pub data_swaps: Vec<(String, String)>,
}

fn default_baseline_color() -> String {
    "#000000".to_string()
}

fn default_fill_alpha() -> f64 {
    0.1
}

fn default_status_column() -> String {
    DEFAULT_STATUS_COLUMN.to_string()
}

fn default_metrics_column() -> String {
    DEFAULT_METRICS_COLUMN.to_string()
}

fn metric_list(names: &[&str]) -> Vec<String> {
    names.iter().map(|name| name.to_string()).collect()
}

fn palette(colors: &[&str]) -> Vec<String> {
    colors.iter().map(|color| color.to_string()).collect()
}

/// Published GPT-4o scores used as the reference in every chart.
pub fn gpt4o_baseline() -> Baseline {
    let scores = [
        (FINAL_SCORE, 0.2651),
        (BLEU_4, 0.0),
        (ROUGE_L, 0.0755),
        (TIMING_F1, 0.3785),
        (TIMING_AUC, 0.5358),
        (ACTION_F1, 0.3355),
    ];
    Baseline {
        label: BASELINE_LABEL.to_string(),
        scores: scores
            .iter()
            .map(|(name, score)| (name.to_string(), *score))
            .collect(),
    }
}

/// The radar report plots Action F1 at the Final Score value.
fn radar_baseline() -> Baseline {
    let mut baseline = gpt4o_baseline();
    baseline.scores.insert(ACTION_F1.to_string(), 0.2651);
    baseline
}

pub fn builtin_profiles() -> Vec<ChartProfile> {
    let base = ChartProfile {
        name: String::new(),
        title: String::new(),
        shape: ChartShape::Bar,
        line_layout: LineLayout::BySubmission,
        metric_order: metric_list(&KNOWN_METRICS),
        baseline: Some(gpt4o_baseline()),
        order: OrderPolicy::Forward,
        palette: palette(&TAB20),
        baseline_color: default_baseline_color(),
        fill_alpha: default_fill_alpha(),
        status_column: default_status_column(),
        metrics_column: default_metrics_column(),
        label_names: BTreeMap::new(),
        data_swaps: Vec::new(),
    };

    let run_names = [
        ("4", "Post-processing w/ training-style prompts"),
        ("11", "Basic post-processing"),
        ("13", "Downsampling & 16-frame context"),
        ("14", "Baseline VideoLLaMA3"),
    ];

    vec![
        ChartProfile {
            name: "bar".to_string(),
            title: "All Submission Metrics (grouped by metric)".to_string(),
            order: OrderPolicy::Reverse,
            ..base.clone()
        },
        ChartProfile {
            name: "line-submissions".to_string(),
            title: "Other Metrics over Submissions".to_string(),
            shape: ChartShape::Line,
            metric_order: metric_list(&[ROUGE_L, TIMING_F1, TIMING_AUC, ACTION_F1, FINAL_SCORE]),
            baseline: None,
            ..base.clone()
        },
        ChartProfile {
            name: "line-bleu".to_string(),
            title: "BLEU-4 over Submissions".to_string(),
            shape: ChartShape::Line,
            metric_order: metric_list(&[BLEU_4]),
            baseline: None,
            ..base.clone()
        },
        ChartProfile {
            name: "line-runs".to_string(),
            title: "Submission Metrics vs. GPT-4o Baseline".to_string(),
            shape: ChartShape::Line,
            line_layout: LineLayout::ByMetric,
            order: OrderPolicy::Reverse,
            ..base.clone()
        },
        ChartProfile {
            name: "radar".to_string(),
            title: "Instruction-Generation Performance Across VideoLLaMA3 Variants vs. GPT-4o Baseline"
                .to_string(),
            shape: ChartShape::Radar,
            metric_order: metric_list(&[ROUGE_L, TIMING_F1, TIMING_AUC, ACTION_F1]),
            baseline: Some(radar_baseline()),
            palette: palette(&SET2),
            baseline_color: "#e34a33".to_string(),
            fill_alpha: 0.04,
            label_names: run_names
                .iter()
                .map(|(id, name)| (id.to_string(), name.to_string()))
                .collect(),
            ..base
        },
    ]
}

pub fn builtin_profile(name: &str) -> Result<ChartProfile> {
    let profiles = builtin_profiles();
    let known: Vec<String> = profiles.iter().map(|profile| profile.name.clone()).collect();

    profiles
        .into_iter()
        .find(|profile| profile.name == name)
        .with_context(|| format!("unknown profile `{name}` (known: {})", known.join(", ")))
}

pub fn load_profile_file(path: &Path) -> Result<ChartProfile> {
    let raw = fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    let profile: ChartProfile = serde_json::from_slice(&raw)
        .with_context(|| format!("failed to parse profile {}", path.display()))?;
    Ok(profile)
}

impl ChartProfile {
    pub fn validate(&self) -> Result<()> {
        if self.metric_order.is_empty() {
            bail!("profile `{}` has an empty metric order", self.name);
        }
        if self.palette.is_empty() {
            bail!("profile `{}` has an empty palette", self.name);
        }
        if !(0.0..=1.0).contains(&self.fill_alpha) {
            bail!(
                "profile `{}` fill alpha {} is outside 0..=1",
                self.name,
                self.fill_alpha
            );
        }

        let hex = Regex::new(r"^#[0-9a-fA-F]{6}$").context("failed to compile color regex")?;
        for color in self.palette.iter().chain(std::iter::once(&self.baseline_color)) {
            if !hex.is_match(color) {
                bail!("profile `{}` has invalid color `{color}`", self.name);
            }
        }

        match (&self.baseline, self.shape) {
            (None, ChartShape::Bar | ChartShape::Radar) => {
                bail!(
                    "profile `{}` draws a {} chart and needs a baseline",
                    self.name,
                    self.shape.as_str()
                );
            }
            (Some(baseline), _) => {
                let missing: Vec<&str> = self
                    .metric_order
                    .iter()
                    .filter(|metric| !baseline.scores.contains_key(metric.as_str()))
                    .map(String::as_str)
                    .collect();
                if !missing.is_empty() {
                    bail!(
                        "profile `{}` baseline lacks metrics: {}",
                        self.name,
                        missing.join(", ")
                    );
                }
            }
            (None, ChartShape::Line) => {}
        }

        Ok(())
    }
}
