// relay-diversity: Diversity Charts for the Relay Network by Family, AS, Country, and Operator
// Copyright (C) 2024-2025 The relay-diversity developers
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <http://www.gnu.org/licenses/>.
//! Rendering of the combined cumulative-distribution plot with its inset pie
//! chart to a PNG file.

use std::{
    fs,
    path::{Path, PathBuf},
};

use plotters::prelude::*;

use crate::{
    bucket::RankedBuckets,
    target::{Metric, Target},
};

/// Canvas size in pixels, the 16x10 figure at 100 px per unit.
const CANVAS: (u32, u32) = (1600, 1000);
/// Center and radius of the inset pie, lower middle of the canvas.
const PIE_CENTER: (i32, i32) = (960, 640);
const PIE_RADIUS: f64 = 230.0;
/// Fraction of the radius each slice is pushed out along its bisector.
const EXPLODE_FRAC: f64 = 0.05;
/// Rim labels sit at this multiple of the radius.
const LABEL_DISTANCE: f64 = 1.12;
/// Slices above this share (in percent) carry their formatted value.
const VALUE_LABEL_MIN_SHARE: f64 = 5.0;
/// Fixed color for points and the pie slice aggregating everything not
/// individually broken out.
const REMAINDER_COLOR: RGBColor = RGBColor(178, 255, 178);

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to write chart: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to draw chart: {0}")]
    Draw(String),
}

/// Render the chart for `buckets` and atomically move it to `output`. The
/// image is drawn into a sibling temporary file first, so a failed run never
/// leaves a half-written chart behind.
pub fn render(
    buckets: &RankedBuckets,
    target: Target,
    published: &str,
    output: &Path,
) -> Result<(), Error> {
    let tmp = temp_path(output);
    draw_chart(buckets, target, published, &tmp).map_err(|source| {
        let _ = fs::remove_file(&tmp);
        Error::Draw(source.to_string())
    })?;
    fs::rename(&tmp, output)?;
    Ok(())
}

fn draw_chart(
    buckets: &RankedBuckets,
    target: Target,
    published: &str,
    path: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    let name = target.dimension.name();
    let desc = target.metric.description();
    let metric = target.metric;

    let x_max = buckets.plot.len().max(1);
    let y_max = if buckets.total > 0.0 { buckets.total } else { 1.0 };

    let root = BitMapBackend::new(path, CANVAS).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(
            format!("Diversity by {name} ({desc}) @ {published}"),
            ("sans-serif", 28),
        )
        .margin(20)
        .x_label_area_size(50)
        .y_label_area_size(90)
        .build_cartesian_2d(0..x_max, 0.0..y_max)?;

    chart
        .configure_mesh()
        .x_labels((x_max / 10).max(1) + 1)
        .y_labels(10)
        .y_label_formatter(&|y| metric.format(*y))
        .x_desc(format!("Top-x {name} by {desc}"))
        .y_desc(format!("Total {desc}"))
        .draw()?;

    chart.draw_series(buckets.plot.iter().enumerate().map(|(i, &(rank, cumulative))| {
        let color = if i < buckets.kept {
            slice_color(buckets.pie[i].value, buckets.total)
        } else {
            REMAINDER_COLOR
        };
        Circle::new((rank, cumulative), 5, color.filled())
    }))?;

    // note how much of the network falls beyond the plotted subset
    if buckets.record_count > buckets.plot.len() {
        if let Some(&(_, last_cumulative)) = buckets.plot.last() {
            let remaining = buckets.record_count - buckets.plot.len();
            let remaining_value = buckets.total - last_cumulative;
            let anchor_y = last_cumulative + remaining_value / 2.0;
            chart.draw_series(std::iter::once(Text::new(
                format!("{remaining} {name} remaining ({})", metric.format(remaining_value)),
                (x_max * 11 / 20, anchor_y),
                ("sans-serif", 20),
            )))?;
            chart.draw_series(std::iter::once(PathElement::new(
                vec![(x_max * 17 / 20, anchor_y), (x_max, anchor_y)],
                BLACK.stroke_width(1),
            )))?;
        }
    }

    draw_pie(&root, buckets, metric)?;

    root.present()?;
    Ok(())
}

/// Inset pie over the full pie series: kept slices in share-scaled green,
/// the "others" slice in the fixed remainder color, each exploded along its
/// bisector.
fn draw_pie(
    root: &DrawingArea<BitMapBackend, plotters::coord::Shift>,
    buckets: &RankedBuckets,
    metric: Metric,
) -> Result<(), Box<dyn std::error::Error>> {
    let label_style = TextStyle::from(("sans-serif", 16).into_font());
    let value_style = TextStyle::from(("sans-serif", 15).into_font()).color(&WHITE);

    let mut start_angle = -90.0;
    for (i, slice) in buckets.pie.iter().enumerate() {
        let share = if buckets.total > 0.0 {
            (slice.value / buckets.total).clamp(0.0, 1.0)
        } else {
            0.0
        };
        let sweep_angle = share * 360.0;
        let bisector = (start_angle + sweep_angle / 2.0_f64).to_radians();

        if sweep_angle > 0.0 {
            let color = if i < buckets.kept {
                slice_color(slice.value, buckets.total)
            } else {
                REMAINDER_COLOR
            };
            let polygon = pie_polygon(
                PIE_CENTER,
                PIE_RADIUS,
                start_angle,
                sweep_angle,
                EXPLODE_FRAC * PIE_RADIUS,
            );
            root.draw(&Polygon::new(polygon, color.filled()))?;
        }

        let label_x = PIE_CENTER.0 + (LABEL_DISTANCE * PIE_RADIUS * bisector.cos()) as i32;
        let label_y = PIE_CENTER.1 + (LABEL_DISTANCE * PIE_RADIUS * bisector.sin()) as i32 - 8;
        // left-of-center labels grow away from the pie, not into it
        let label_x = if bisector.cos() < 0.0 {
            label_x - 7 * slice.label.chars().count() as i32
        } else {
            label_x
        };
        root.draw_text(&slice.label, &label_style, (label_x, label_y))?;

        if share * 100.0 > VALUE_LABEL_MIN_SHARE {
            let value_x = PIE_CENTER.0 + (0.6 * PIE_RADIUS * bisector.cos()) as i32 - 20;
            let value_y = PIE_CENTER.1 + (0.6 * PIE_RADIUS * bisector.sin()) as i32 - 8;
            root.draw_text(&metric.format(slice.value), &value_style, (value_x, value_y))?;
        }

        start_angle += sweep_angle;
    }

    Ok(())
}

/// Green intensity scaled by the entity's share of the total: the larger the
/// share, the darker the point and slice.
fn slice_color(value: f64, total: f64) -> RGBColor {
    let share = if total > 0.0 {
        (value / total).clamp(0.0, 1.0)
    } else {
        0.0
    };
    RGBColor(0, ((1.0 - share) * 255.0) as u8, 0)
}

/// Polygon fan for one pie slice, pushed `explode` pixels out along its
/// bisector. Angles in degrees.
fn pie_polygon(
    center: (i32, i32),
    radius: f64,
    start_angle: f64,
    sweep_angle: f64,
    explode: f64,
) -> Vec<(i32, i32)> {
    let bisector = (start_angle + sweep_angle / 2.0).to_radians();
    let cx = center.0 + (explode * bisector.cos()) as i32;
    let cy = center.1 + (explode * bisector.sin()) as i32;

    let steps = (sweep_angle.abs().ceil() as usize).max(1);
    let mut points = Vec::with_capacity(steps + 2);
    points.push((cx, cy));
    for i in 0..=steps {
        let angle = (start_angle + sweep_angle * i as f64 / steps as f64).to_radians();
        points.push((
            cx + (radius * angle.cos()) as i32,
            cy + (radius * angle.sin()) as i32,
        ));
    }
    points
}

/// Sibling path the chart is rendered to before the final rename.
fn temp_path(output: &Path) -> PathBuf {
    let mut name = output
        .file_name()
        .map(|name| name.to_os_string())
        .unwrap_or_else(|| "chart".into());
    name.push(".tmp.png");
    output.with_file_name(name)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn darker_green_for_larger_shares() {
        assert_eq!(slice_color(100.0, 100.0), RGBColor(0, 0, 0));
        assert_eq!(slice_color(0.0, 100.0), RGBColor(0, 255, 0));

        let large = slice_color(60.0, 100.0);
        let small = slice_color(10.0, 100.0);
        assert!(large.1 < small.1);

        // degenerate all-zero datasets must not divide by zero
        assert_eq!(slice_color(0.0, 0.0), RGBColor(0, 255, 0));
    }

    #[test]
    fn pie_polygon_fans_out_from_the_exploded_center() {
        let polygon = pie_polygon((100, 100), 50.0, -90.0, 90.0, 10.0);

        // the tip sits explode pixels along the bisector (-45 degrees)
        let tip = polygon[0];
        assert_eq!(tip, (107, 93));

        // every rim point is a radius away from the tip
        for &(x, y) in &polygon[1..] {
            let dx = (x - tip.0) as f64;
            let dy = (y - tip.1) as f64;
            let distance = (dx * dx + dy * dy).sqrt();
            assert!((distance - 50.0).abs() < 2.0);
        }
        assert!(polygon.len() >= 91);
    }

    #[test]
    fn thin_slices_still_produce_a_polygon() {
        let polygon = pie_polygon((0, 0), 50.0, 0.0, 0.4, 0.0);
        assert!(polygon.len() >= 3);
    }

    #[test]
    fn temp_path_is_a_sibling_of_the_output() {
        let tmp = temp_path(Path::new("plots/countries_by_cw.png"));
        assert_eq!(tmp, Path::new("plots/countries_by_cw.png.tmp.png"));
    }
}
