use std::f64::consts::PI;

use anyhow::Result;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};

use super::{ChartPlan, finite_segments};

const RING_COUNT: usize = 5;
const EXTENT: f64 = 1.35;
const LABEL_RADIUS: f64 = 1.12;

/// Closed `(angle, value)` outline: angle_i = 2πi/N, with the first entry
/// repeated at the end.
pub fn radar_points(values: &[f64]) -> Vec<(f64, f64)> {
    let count = values.len();
    let mut points: Vec<(f64, f64)> = values
        .iter()
        .enumerate()
        .map(|(index, value)| (2.0 * PI * index as f64 / count as f64, *value))
        .collect();
    if let Some(&first) = points.first() {
        points.push(first);
    }
    points
}

fn to_cartesian((angle, value): (f64, f64), radius: f64) -> (f64, f64) {
    let scaled = value / radius;
    (scaled * angle.cos(), scaled * angle.sin())
}

fn ring(radius: f64) -> Vec<(f64, f64)> {
    (0..=72)
        .map(|step| {
            let angle = 2.0 * PI * step as f64 / 72.0;
            (radius * angle.cos(), radius * angle.sin())
        })
        .collect()
}

pub(super) fn draw(root: &DrawingArea<SVGBackend<'_>, Shift>, plan: &ChartPlan) -> Result<()> {
    let radius = match plan.max_value() {
        Some(max) if max > 0.0 => max,
        _ => 1.0,
    };

    let mut chart = ChartBuilder::on(root)
        .caption(&plan.title, ("sans-serif", 20))
        .margin(30)
        .build_cartesian_2d(-EXTENT..EXTENT, -EXTENT..EXTENT)?;

    let grid = BLACK.mix(0.15);
    let centred = TextStyle::from(("sans-serif", 15).into_font())
        .pos(Pos::new(HPos::Center, VPos::Center));
    let tick_style = ("sans-serif", 11).into_font().color(&BLACK.mix(0.6));

    for step in 1..=RING_COUNT {
        let fraction = step as f64 / RING_COUNT as f64;
        chart.draw_series(std::iter::once(PathElement::new(ring(fraction), grid)))?;
        chart.draw_series(std::iter::once(Text::new(
            format!("{:.2}", radius * fraction),
            (0.02, fraction + 0.01),
            tick_style.clone(),
        )))?;
    }

    let spokes = radar_points(&vec![1.0; plan.metrics.len()]);
    for (&(angle, _), metric) in spokes.iter().zip(&plan.metrics) {
        chart.draw_series(std::iter::once(PathElement::new(
            vec![(0.0, 0.0), (angle.cos(), angle.sin())],
            grid,
        )))?;
        chart.draw_series(std::iter::once(Text::new(
            metric.clone(),
            (LABEL_RADIUS * angle.cos(), LABEL_RADIUS * angle.sin()),
            centred.clone(),
        )))?;
    }

    for series in &plan.runs {
        let outline: Vec<(f64, f64)> = radar_points(&series.values)
            .into_iter()
            .map(|point| to_cartesian(point, radius))
            .collect();
        let color = series.color;

        if series.values.iter().all(|value| value.is_finite()) {
            chart.draw_series(std::iter::once(Polygon::new(
                outline.clone(),
                color.mix(plan.fill_alpha).filled(),
            )))?;
        }

        let segments = finite_segments(&outline);
        for segment in &segments[..segments.len().saturating_sub(1)] {
            chart.draw_series(LineSeries::new(segment.clone(), color.stroke_width(2)))?;
        }
        // The last segment carries the legend entry, or an empty one if the
        // run has no scores at all.
        let last = segments.last().cloned().unwrap_or_default();
        chart
            .draw_series(LineSeries::new(last, color.stroke_width(2)))?
            .label(series.label.as_str())
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2)));
    }

    if let Some(baseline) = &plan.baseline {
        let outline: Vec<(f64, f64)> = radar_points(&baseline.values)
            .into_iter()
            .map(|point| to_cartesian(point, radius))
            .collect();
        let color = baseline.color;

        for (index, segment) in finite_segments(&outline).into_iter().enumerate() {
            let series =
                chart.draw_series(DashedLineSeries::new(segment, 10, 6, color.stroke_width(3)))?;
            if index == 0 {
                series.label(baseline.label.as_str()).legend(move |(x, y)| {
                    PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(3))
                });
            }
        }
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
    fn outline_is_closed_for_any_metric_count() {
        for count in 1..8 {
            let values: Vec<f64> = (0..count).map(|index| 0.1 * (index + 1) as f64).collect();
            let points = radar_points(&values);

            assert_eq!(points.len(), count + 1);
            assert_eq!(points.first(), points.last());
        }
    }

    #[test]
    fn angles_are_evenly_spaced() {
        let points = radar_points(&[0.1, 0.2, 0.3, 0.4]);
        let expected = [0.0, PI / 2.0, PI, 3.0 * PI / 2.0, 0.0];
        for ((angle, _), want) in points.iter().zip(expected) {
            assert!((angle - want).abs() < 1e-12);
        }
    }

    #[test]
    fn empty_metric_order_has_no_outline() {
        assert!(radar_points(&[]).is_empty());
    }

    #[test]
    fn cartesian_projection_scales_by_radius() {
        let (x, y) = to_cartesian((PI / 2.0, 0.5), 0.5);
        assert!(x.abs() < 1e-12);
        assert!((y - 1.0).abs() < 1e-12);
    }
}
