use anyhow::Result;
use plotters::coord::Shift;
use plotters::coord::types::RangedCoordf64;
use plotters::prelude::*;

use super::{ChartPlan, category_label, finite_segments};

/// The backend must outlive the chart borrowing its drawing area.
type LineChart<'a, 'b> = ChartContext<'a, SVGBackend<'b>, Cartesian2d<RangedCoordf64, RangedCoordf64>>;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub(super) enum Marker {
    Circle,
    Square,
    Triangle,
    Cross,
}

impl Marker {
    const CYCLE: [Marker; 4] = [Self::Circle, Self::Square, Self::Triangle, Self::Cross];

    pub(super) fn nth(index: usize) -> Self {
        Self::CYCLE[index % Self::CYCLE.len()]
    }
}

fn draw_marked_line<'a, 'b: 'a>(
    chart: &mut LineChart<'a, 'b>,
    points: &[(f64, f64)],
    color: RGBColor,
    marker: Marker,
    label: &str,
) -> Result<()> {
    for segment in finite_segments(points) {
        chart.draw_series(LineSeries::new(segment, color.stroke_width(2)))?;
    }

    let marks: Vec<(f64, f64)> = finite_segments(points).into_iter().flatten().collect();
    let label = label.to_string();
    match marker {
        Marker::Circle => {
            chart
                .draw_series(marks.iter().map(|&point| Circle::new(point, 4, color.filled())))?
                .label(label)
                .legend(move |(x, y)| Circle::new((x, y), 4, color.filled()));
        }
        Marker::Square => {
            chart
                .draw_series(marks.iter().map(|&point| {
                    EmptyElement::at(point) + Rectangle::new([(-4, -4), (4, 4)], color.filled())
                }))?
                .label(label)
                .legend(move |(x, y)| {
                    EmptyElement::at((x, y)) + Rectangle::new([(-4, -4), (4, 4)], color.filled())
                });
        }
        Marker::Triangle => {
            chart
                .draw_series(
                    marks
                        .iter()
                        .map(|&point| TriangleMarker::new(point, 5, color.filled())),
                )?
                .label(label)
                .legend(move |(x, y)| TriangleMarker::new((x, y), 5, color.filled()));
        }
        Marker::Cross => {
            chart
                .draw_series(
                    marks
                        .iter()
                        .map(|&point| Cross::new(point, 4, color.stroke_width(2))),
                )?
                .label(label)
                .legend(move |(x, y)| Cross::new((x, y), 4, color.stroke_width(2)));
        }
    }
    Ok(())
}

fn draw_dashed<'a, 'b: 'a>(
    chart: &mut LineChart<'a, 'b>,
    points: &[(f64, f64)],
    color: RGBColor,
    label: Option<&str>,
) -> Result<()> {
    for (index, segment) in finite_segments(points).into_iter().enumerate() {
        let series = chart.draw_series(DashedLineSeries::new(
            segment,
            8,
            5,
            color.stroke_width(2),
        ))?;
        if let (0, Some(label)) = (index, label) {
            series.label(label).legend(move |(x, y)| {
                PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2))
            });
        }
    }
    Ok(())
}

fn finish<'a, 'b: 'a>(chart: &mut LineChart<'a, 'b>) -> Result<()> {
    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperRight)
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;
    Ok(())
}

/// x = submission sequence number, one line per metric; the baseline for each
/// metric is a dashed horizontal line in that metric's color.
pub(super) fn draw_by_submission(
    root: &DrawingArea<SVGBackend<'_>, Shift>,
    plan: &ChartPlan,
) -> Result<()> {
    let run_count = plan.runs.len().max(1);

    let mut chart = ChartBuilder::on(root)
        .caption(&plan.title, ("sans-serif", 24))
        .margin(20)
        .x_label_area_size(50)
        .y_label_area_size(60)
        .build_cartesian_2d(0.5f64..(run_count as f64 + 0.5), 0f64..plan.y_upper_bound())?;

    chart
        .configure_mesh()
        .x_labels(run_count)
        .x_label_formatter(&|x: &f64| {
            if (x - x.round()).abs() < 1e-6 {
                format!("{}", x.round() as i64)
            } else {
                String::new()
            }
        })
        .x_desc("Submission #")
        .y_desc("Score")
        .bold_line_style(BLACK.mix(0.3))
        .light_line_style(BLACK.mix(0.05))
        .draw()?;

    for (metric_index, metric) in plan.metrics.iter().enumerate() {
        let color = plan.palette_color(metric_index);
        let points: Vec<(f64, f64)> = plan
            .runs
            .iter()
            .enumerate()
            .map(|(run_index, series)| ((run_index + 1) as f64, series.values[metric_index]))
            .collect();
        draw_marked_line(&mut chart, &points, color, Marker::nth(metric_index), metric)?;
    }

    if let Some(baseline) = &plan.baseline {
        let span = [0.5, run_count as f64 + 0.5];
        for (metric_index, value) in baseline.values.iter().enumerate() {
            let points = [(span[0], *value), (span[1], *value)];
            let label = (metric_index == 0).then_some(baseline.label.as_str());
            draw_dashed(&mut chart, &points, plan.palette_color(metric_index), label)?;
        }
    }

    finish(&mut chart)
}

/// x = metric name, one line per run; the baseline is a dashed line.
pub(super) fn draw_by_metric(
    root: &DrawingArea<SVGBackend<'_>, Shift>,
    plan: &ChartPlan,
) -> Result<()> {
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
        .x_labels(metric_count)
        .x_label_formatter(&format_metric)
        .y_desc("Score")
        .bold_line_style(BLACK.mix(0.3))
        .light_line_style(BLACK.mix(0.05))
        .draw()?;

    for (run_index, series) in plan.runs.iter().enumerate() {
        let points: Vec<(f64, f64)> = series
            .values
            .iter()
            .enumerate()
            .map(|(metric_index, value)| (metric_index as f64, *value))
            .collect();
        draw_marked_line(
            &mut chart,
            &points,
            series.color,
            Marker::nth(run_index),
            &series.label,
        )?;
    }

    if let Some(baseline) = &plan.baseline {
        let points: Vec<(f64, f64)> = baseline
            .values
            .iter()
            .enumerate()
            .map(|(metric_index, value)| (metric_index as f64, *value))
            .collect();
        draw_dashed(&mut chart, &points, baseline.color, Some(baseline.label.as_str()))?;
    }

    finish(&mut chart)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn markers_cycle_through_distinct_shapes() {
        let shapes: Vec<Marker> = (0..4).map(Marker::nth).collect();
        for (index, shape) in shapes.iter().enumerate() {
            assert!(!shapes[index + 1..].contains(shape));
        }
        assert_eq!(Marker::nth(4), Marker::nth(0));
    }
}
