use std::path::Path;

use anyhow::{Context, Result, bail};
use plotters::prelude::*;
use tracing::info;

use crate::model::{ChartShape, LineLayout, MetricsMapping, Run};
use crate::ordering::display_label;
use crate::profile::ChartProfile;
use crate::util::ensure_directory;

mod bar;
mod line;
mod radar;

pub const CHART_SIZE: (u32, u32) = (1200, 600);
pub const RADAR_SIZE: (u32, u32) = (900, 900);
pub const Y_HEADROOM: f64 = 1.15;
pub const CLUSTER_WIDTH: f64 = 0.8;

#[derive(Debug, Clone, PartialEq)]
pub struct SeriesPlan {
    pub label: String,
    /// Scores in metric order; NaN marks a metric the run did not report.
    pub values: Vec<f64>,
    pub color: RGBColor,
}

/// Everything a renderer needs, resolved from the profile and the runs.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartPlan {
    pub title: String,
    pub shape: ChartShape,
    pub line_layout: LineLayout,
    pub metrics: Vec<String>,
    pub runs: Vec<SeriesPlan>,
    pub baseline: Option<SeriesPlan>,
    pub palette: Vec<RGBColor>,
    pub fill_alpha: f64,
}

impl ChartPlan {
    pub fn build(profile: &ChartProfile, runs: &[Run]) -> Result<Self> {
        let palette = profile
            .palette
            .iter()
            .map(|hex| parse_hex_color(hex))
            .collect::<Result<Vec<_>>>()?;
        if palette.is_empty() {
            bail!("profile `{}` has an empty palette", profile.name);
        }

        let series = runs
            .iter()
            .enumerate()
            .map(|(index, run)| SeriesPlan {
                label: display_label(&run.id, &profile.label_names),
                values: score_vector(&run.metrics, &profile.metric_order),
                color: palette[index % palette.len()],
            })
            .collect();

        let baseline = match &profile.baseline {
            Some(baseline) => Some(SeriesPlan {
                label: baseline.label.clone(),
                values: score_vector(&baseline.scores, &profile.metric_order),
                color: parse_hex_color(&profile.baseline_color)?,
            }),
            None => None,
        };

        Ok(Self {
            title: profile.title.clone(),
            shape: profile.shape,
            line_layout: profile.line_layout,
            metrics: profile.metric_order.clone(),
            runs: series,
            baseline,
            palette,
            fill_alpha: profile.fill_alpha,
        })
    }

    /// Legend entries in drawing order.
    pub fn series_labels(&self) -> Vec<String> {
        let mut labels: Vec<String> = match (self.shape, self.line_layout) {
            (ChartShape::Line, LineLayout::BySubmission) => self.metrics.clone(),
            _ => self.runs.iter().map(|series| series.label.clone()).collect(),
        };
        if let Some(baseline) = &self.baseline {
            labels.push(baseline.label.clone());
        }
        labels
    }

    /// Largest finite score across runs and baseline, if any.
    pub fn max_value(&self) -> Option<f64> {
        self.runs
            .iter()
            .chain(self.baseline.iter())
            .flat_map(|series| series.values.iter().copied())
            .filter(|value| value.is_finite())
            .reduce(f64::max)
    }

    pub fn y_upper_bound(&self) -> f64 {
        match self.max_value() {
            Some(max) if max > 0.0 => max * Y_HEADROOM,
            _ => 1.0,
        }
    }

    pub fn palette_color(&self, index: usize) -> RGBColor {
        self.palette[index % self.palette.len()]
    }
}

/// Scores in `order`; metrics absent from `metrics` become NaN, never zero.
pub fn score_vector(metrics: &MetricsMapping, order: &[String]) -> Vec<f64> {
    order
        .iter()
        .map(|metric| metrics.get(metric).copied().unwrap_or(f64::NAN))
        .collect()
}

/// Width of one bar when `run_count` runs and the baseline share a cluster.
pub fn bar_width(run_count: usize) -> f64 {
    CLUSTER_WIDTH / (run_count + 1) as f64
}

/// Splits a polyline at non-finite points so gaps stay gaps.
pub fn finite_segments(points: &[(f64, f64)]) -> Vec<Vec<(f64, f64)>> {
    let mut segments = Vec::new();
    let mut current = Vec::new();
    for &(x, y) in points {
        if x.is_finite() && y.is_finite() {
            current.push((x, y));
        } else if !current.is_empty() {
            segments.push(std::mem::take(&mut current));
        }
    }
    if !current.is_empty() {
        segments.push(current);
    }
    segments
}

pub fn parse_hex_color(hex: &str) -> Result<RGBColor> {
    let digits = hex
        .strip_prefix('#')
        .filter(|digits| digits.len() == 6 && digits.is_ascii())
        .with_context(|| format!("invalid color `{hex}`, expected #rrggbb"))?;

    let channel = |range: std::ops::Range<usize>| {
        u8::from_str_radix(&digits[range], 16)
            .with_context(|| format!("invalid color `{hex}`, expected #rrggbb"))
    };

    Ok(RGBColor(channel(0..2)?, channel(2..4)?, channel(4..6)?))
}

/// Label for a category axis tick; blank for ticks between categories.
pub(crate) fn category_label(names: &[String], x: f64, first: f64) -> String {
    let offset = x - first;
    let index = offset.round();
    if (offset - index).abs() > 1e-6 || index < 0.0 {
        return String::new();
    }
    names.get(index as usize).cloned().unwrap_or_default()
}

/// Draws the plan to an SVG file at `output`.
pub fn write_chart(plan: &ChartPlan, output: &Path) -> Result<()> {
    if let Some(parent) = output.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        ensure_directory(parent)?;
    }

    let size = match plan.shape {
        ChartShape::Radar => RADAR_SIZE,
        ChartShape::Bar | ChartShape::Line => CHART_SIZE,
    };
    let root = SVGBackend::new(output, size).into_drawing_area();
    root.fill(&WHITE)?;

    match (plan.shape, plan.line_layout) {
        (ChartShape::Bar, _) => bar::draw(&root, plan)?,
        (ChartShape::Line, LineLayout::BySubmission) => line::draw_by_submission(&root, plan)?,
        (ChartShape::Line, LineLayout::ByMetric) => line::draw_by_metric(&root, plan)?,
        (ChartShape::Radar, _) => radar::draw(&root, plan)?,
    }

    root.present()
        .with_context(|| format!("failed to write chart {}", output.display()))?;
    info!(
        path = %output.display(),
        shape = plan.shape.as_str(),
        series = plan.series_labels().len(),
        "wrote chart"
    );
    Ok(())
}
