//! First page: RTT and bandwidth against message size.
use std::ops::Range;
use plotters::chart::ChartContext;
use plotters::coord::cartesian::Cartesian2d;
use plotters::coord::ranged1d::Ranged;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters_backend::text_anchor::{HPos, Pos, VPos};
use crate::config::Layout;
use crate::dataset::Dataset;
use crate::estimate::Estimate;

type DrawResult<DB> = Result<(), DrawingAreaErrorKind<<DB as DrawingBackend>::ErrorType>>;

/// Dashes (and gaps) in the peak bandwidth reference line
const PEAK_LINE_DASHES: usize = 40;

/// Length of the annotation arrow barbs, in points
const ARROW_SIZE: f64 = 6.0;
/// Angle between the arrow shaft and each barb, in radians
const ARROW_ANGLE: f64 = 0.4;

pub(crate) fn draw<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    dataset: &Dataset,
    est: &Estimate,
    layout: &Layout,
) -> DrawResult<DB> {
    root.fill(&WHITE)?;
    let (title_area, body) = root.split_vertically(layout.title_height);
    let (width, height) = title_area.dim_in_pixel();
    let title_font = ("sans-serif", layout.title_font_size, FontStyle::Bold).into_font();
    let title_style = TextStyle::from(title_font).pos(Pos::new(HPos::Center, VPos::Center));
    title_area.draw(&Text::new(
        "MPI Ping-Pong Results",
        (width as i32 / 2, height as i32 * 2 / 3),
        title_style,
    ))?;

    let panels = body.split_evenly((2, 1));
    rtt_chart(&panels[0], dataset, est, layout)?;
    bandwidth_chart(&panels[1], dataset, est, layout)?;
    Ok(())
}

fn rtt_chart<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    dataset: &Dataset,
    est: &Estimate,
    layout: &Layout,
) -> DrawResult<DB> {
    let points: Vec<(f64, f64)> = dataset
        .iter()
        .filter(|m| on_log_axis(m.message_size as f64) && on_log_axis(m.rtt))
        .map(|m| (m.message_size as f64, m.rtt))
        .collect();
    let x_range = log_range(points.iter().map(|p| p.0));
    let y_range = log_range(points.iter().map(|p| p.1));

    let mut chart = ChartBuilder::on(area)
        .caption("RTT vs Message Size", ("sans-serif", layout.label_font_size + 3.0))
        .margin(layout.chart_margin)
        .x_label_area_size(layout.x_label_area)
        .y_label_area_size(layout.y_label_area)
        .build_cartesian_2d(x_range.log_scale(), y_range.log_scale())?;

    chart
        .configure_mesh()
        .x_desc("Message Size (bytes)")
        .y_desc("Round-Trip Time (us)")
        .label_style(("sans-serif", layout.label_font_size))
        .axis_desc_style(("sans-serif", layout.label_font_size + 1.0))
        .bold_line_style(BLACK.mix(0.15))
        .light_line_style(BLACK.mix(0.04))
        .draw()?;

    chart
        .draw_series(LineSeries::new(points.iter().copied(), BLUE.stroke_width(2)))?
        .label("Measured RTT")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], BLUE.stroke_width(2)));
    chart.draw_series(
        points
            .iter()
            .map(|&p| Circle::new(p, layout.marker_size, BLUE.filled())),
    )?;

    let min = dataset.rows()[est.min_rtt_index];
    if on_log_axis(min.message_size as f64) && on_log_axis(min.rtt) {
        let label = format!("Min: {:.2} us", min.rtt);
        annotate(&mut chart, (min.message_size as f64, min.rtt), label, (30, -24), layout)?;
    }

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperLeft)
        .label_font(("sans-serif", layout.label_font_size))
        .background_style(WHITE.mix(0.9))
        .border_style(BLACK.mix(0.3))
        .draw()?;
    Ok(())
}

fn bandwidth_chart<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    dataset: &Dataset,
    est: &Estimate,
    layout: &Layout,
) -> DrawResult<DB> {
    let points: Vec<(f64, f64)> = dataset
        .iter()
        .filter(|m| m.message_size > 0)
        .map(|m| (m.message_size as f64, m.bandwidth))
        .collect();
    let x_range = log_range(points.iter().map(|p| p.0));
    let peak = est.peak_bandwidth_mb_s;
    let y_range = linear_range(points.iter().map(|p| p.1).chain(std::iter::once(peak)));

    let mut chart = ChartBuilder::on(area)
        .caption("Bandwidth vs Message Size", ("sans-serif", layout.label_font_size + 3.0))
        .margin(layout.chart_margin)
        .x_label_area_size(layout.x_label_area)
        .y_label_area_size(layout.y_label_area)
        .build_cartesian_2d(x_range.clone().log_scale(), y_range)?;

    chart
        .configure_mesh()
        .x_desc("Message Size (bytes)")
        .y_desc("Bandwidth (MB/s)")
        .label_style(("sans-serif", layout.label_font_size))
        .axis_desc_style(("sans-serif", layout.label_font_size + 1.0))
        .bold_line_style(BLACK.mix(0.15))
        .light_line_style(BLACK.mix(0.04))
        .draw()?;

    let square = layout.marker_size as i32;
    chart
        .draw_series(LineSeries::new(points.iter().copied(), GREEN.stroke_width(2)))?
        .label("Measured Bandwidth")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], GREEN.stroke_width(2)));
    chart.draw_series(points.iter().map(|&p| {
        EmptyElement::at(p) + Rectangle::new([(-square, -square), (square, square)], GREEN.filled())
    }))?;

    let red = RED.mix(0.7);
    chart
        .draw_series(
            dashes(x_range, PEAK_LINE_DASHES).into_iter().map(|(x0, x1)| {
                PathElement::new(vec![(x0, peak), (x1, peak)], red.stroke_width(1))
            }),
        )?
        .label(format!("Peak: {:.0} MB/s", peak))
        .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], red.stroke_width(1)));

    let top = dataset.rows()[est.peak_bandwidth_index];
    if top.message_size > 0 {
        let label = format!("Peak: {:.0} MB/s", top.bandwidth);
        annotate(&mut chart, (top.message_size as f64, top.bandwidth), label, (-30, 24), layout)?;
    }

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::LowerRight)
        .label_font(("sans-serif", layout.label_font_size))
        .background_style(WHITE.mix(0.9))
        .border_style(BLACK.mix(0.3))
        .draw()?;
    Ok(())
}

/// Draw a label `offset` points away from a data point, with an arrow
/// back to the point.
fn annotate<DB, X, Y>(
    chart: &mut ChartContext<'_, DB, Cartesian2d<X, Y>>,
    target: (f64, f64),
    label: String,
    offset: (i32, i32),
    layout: &Layout,
) -> DrawResult<DB>
where
    DB: DrawingBackend,
    X: Ranged<ValueType = f64>,
    Y: Ranged<ValueType = f64>,
{
    let (anchor, gap) = if offset.0 < 0 { (HPos::Right, -3) } else { (HPos::Left, 3) };
    let style = TextStyle::from(("sans-serif", layout.label_font_size).into_font())
        .pos(Pos::new(anchor, VPos::Center));
    let pointer = BLACK.mix(0.5).stroke_width(1);
    chart.draw_series(std::iter::once(
        EmptyElement::at(target)
            + PathElement::new(vec![offset, (0, 0)], pointer)
            + PathElement::new(arrow_head(offset, ARROW_SIZE), pointer)
            + Text::new(label, (offset.0 + gap, offset.1), style),
    ))?;
    Ok(())
}

/// Barbs of an arrow whose tip is at the origin and whose shaft comes from
/// `tail`, as a path `barb, tip, barb`.
pub(crate) fn arrow_head(tail: (i32, i32), size: f64) -> Vec<(i32, i32)> {
    let (dx, dy) = (tail.0 as f64, tail.1 as f64);
    let len = dx.hypot(dy);
    if len == 0.0 {
        return vec![];
    }
    let (ux, uy) = (dx / len, dy / len);
    let barb = |angle: f64| {
        let (sin, cos) = angle.sin_cos();
        let x = (ux * cos - uy * sin) * size;
        let y = (ux * sin + uy * cos) * size;
        (x.round() as i32, y.round() as i32)
    };
    vec![barb(ARROW_ANGLE), (0, 0), barb(-ARROW_ANGLE)]
}

/// Values plotted on a log axis: positive and not subnormal.
pub(crate) fn on_log_axis(v: f64) -> bool {
    v.is_normal() && v > 0.0
}

/// Range for a log axis over the values it can show, padded by a factor of
/// two on either side.
pub(crate) fn log_range<I: IntoIterator<Item = f64>>(values: I) -> Range<f64> {
    let (lo, hi) = values
        .into_iter()
        .filter(|v| on_log_axis(*v))
        .fold((f64::INFINITY, 0.0f64), |(lo, hi), v| (lo.min(v), hi.max(v)));
    if hi <= 0.0 {
        return 1.0..10.0;
    }
    (lo / 2.0).max(f64::MIN_POSITIVE)..(hi * 2.0).min(f64::MAX)
}

/// Range for a linear axis starting at zero with some headroom.
pub(crate) fn linear_range<I: IntoIterator<Item = f64>>(values: I) -> Range<f64> {
    let hi = values.into_iter().fold(0.0f64, f64::max);
    if hi <= 0.0 {
        return 0.0..1.0;
    }
    0.0..(hi * 1.15).min(f64::MAX)
}

/// Split a log-scaled range into `count` equal pieces and keep every other
/// one, giving evenly spaced dashes on screen.
pub(crate) fn dashes(range: Range<f64>, count: usize) -> Vec<(f64, f64)> {
    let step = (range.end / range.start).powf(1.0 / count as f64);
    (0..count)
        .step_by(2)
        .map(|i| {
            let x0 = range.start * step.powi(i as i32);
            (x0, x0 * step)
        })
        .collect()
}
