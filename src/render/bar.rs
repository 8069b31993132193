use anyhow::Result;
use plotters::coord::Shift;
use plotters::prelude::*;

use super::{ChartPlan, bar_width, category_label};

/// Offset of slot `slot` from its cluster centre. Slots `0..run_count` are
/// runs, slot `run_count` is the baseline.
pub(super) fn slot_offset(slot: usize, run_count: usize) -> f64 {
    (slot as f64 - run_count as f64 / 2.0) * bar_width(run_count)
}

/// Diagonal hatch strokes inside the bar `[left, left + width] x [0, height]`.
fn hatch_strokes(left: f64, width: f64, height: f64) -> Vec<[(f64, f64); 2]> {
    let rise = height / 6.0;
    if rise <= 0.0 || !rise.is_finite() {
        return Vec::new();
    }

    let mut strokes = Vec::new();
    let mut base = 0.0;
    while base < height {
        let top = (base + rise).min(height);
        let reach = width * (top - base) / rise;
        strokes.push([(left, base), (left + reach, top)]);
        base += rise;
    }
    strokes
}

pub(super) fn draw(root: &DrawingArea<SVGBackend<'_>, Shift>, plan: &ChartPlan) -> Result<()> {
    let run_count = plan.runs.len();
    let width = bar_width(run_count);
    let metric_count = plan.metrics.len();

    let mut chart = ChartBuilder::on(root)
        .caption(&plan.title, ("sans-serif", 24))
        .margin(20)
        .x_label_area_size(50)
        .y_label_area_size(60)
        .build_cartesian_2d(-0.5f64..(metric_count as f64 - 0.5), 0f64..plan.y_upper_bound())?;

    let format_metric = |x: &f64| category_label(&plan.metrics, *x, 0.0);
    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(metric_count)
        .x_label_formatter(&format_metric)
        .x_label_style(("sans-serif", 14))
        .y_desc("Score")
        .bold_line_style(BLACK.mix(0.3))
        .light_line_style(BLACK.mix(0.05))
        .draw()?;

    for (slot, series) in plan.runs.iter().enumerate() {
        let offset = slot_offset(slot, run_count);
        let color = series.color;
        chart
            .draw_series(
                series
                    .values
                    .iter()
                    .enumerate()
                    .filter(|(_, value)| value.is_finite())
                    .map(|(metric, value)| {
                        let left = metric as f64 + offset - width / 2.0;
                        Rectangle::new([(left, 0.0), (left + width, *value)], color.filled())
                    }),
            )?
            .label(series.label.as_str())
            .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 12, y + 5)], color.filled()));
    }

    if let Some(baseline) = &plan.baseline {
        let offset = slot_offset(run_count, run_count);
        let fill = baseline.color.mix(0.6);
        let finite: Vec<(f64, f64)> = baseline
            .values
            .iter()
            .enumerate()
            .filter(|(_, value)| value.is_finite())
            .map(|(metric, value)| (metric as f64 + offset - width / 2.0, *value))
            .collect();

        chart
            .draw_series(
                finite
                    .iter()
                    .map(|&(left, value)| Rectangle::new([(left, 0.0), (left + width, value)], fill.filled())),
            )?
            .label(baseline.label.as_str())
            .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 12, y + 5)], fill.filled()));

        chart.draw_series(finite.iter().flat_map(|&(left, value)| {
            hatch_strokes(left, width, value)
                .into_iter()
                .map(|stroke| PathElement::new(stroke.to_vec(), WHITE.mix(0.8).stroke_width(1)))
        }))?;
    }

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperRight)
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slots_are_centred_on_the_cluster() {
        let run_count = 3;
        let first = slot_offset(0, run_count);
        let baseline = slot_offset(run_count, run_count);
        assert!((first + baseline).abs() < 1e-12);
        assert!((baseline - first - 3.0 * bar_width(run_count)).abs() < 1e-12);
    }

    #[test]
    fn clusters_never_overlap_their_neighbours() {
        for run_count in 0..12 {
            let width = bar_width(run_count);
            let right_edge = slot_offset(run_count, run_count) + width / 2.0;
            assert!(right_edge < 0.5, "run_count {run_count} spills into next cluster");
        }
    }

    #[test]
    fn hatch_stays_inside_the_bar() {
        let strokes = hatch_strokes(1.0, 0.2, 0.6);
        assert!(!strokes.is_empty());
        for [(x0, y0), (x1, y1)] in strokes {
            assert!(x0 >= 1.0 && x1 <= 1.2 + 1e-12);
            assert!(y0 >= 0.0 && y1 <= 0.6 + 1e-12);
        }
        assert!(hatch_strokes(0.0, 0.2, 0.0).is_empty());
    }
}
