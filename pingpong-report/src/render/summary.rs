//! Second page: parameter table and an explanation of how the numbers
//! were obtained.
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters_backend::text_anchor::{HPos, Pos, VPos};
use crate::config::ReportConfig;
use crate::dataset::Dataset;
use crate::estimate::{window_bounds, BufferThreshold, Estimate};

type DrawResult<DB> = Result<(), DrawingAreaErrorKind<<DB as DrawingBackend>::ErrorType>>;

const HEADER_FILL: RGBColor = RGBColor(0x44, 0x72, 0xC4);
const TABLE_FONT_SIZE: f64 = 11.0;
const HEADING_FONT_SIZE: f64 = 14.0;
/// Column edges as a percentage of the table width
const COLUMN_EDGES: [i32; 4] = [0, 28, 52, 100];

/// Bandwidths above this (MB/s) are out of reach for a network link
const SHARED_MEMORY_BANDWIDTH: f64 = 10_000.0;

pub(crate) fn draw<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    dataset: &Dataset,
    est: &Estimate,
    config: &ReportConfig,
) -> DrawResult<DB> {
    let layout = &config.layout;
    root.fill(&WHITE)?;

    let width = layout.page_width as i32;
    let top = layout.table_top as i32;
    let row_height = layout.table_row_height as i32;
    let heading_font = ("sans-serif", HEADING_FONT_SIZE, FontStyle::Bold).into_font();
    let heading = TextStyle::from(heading_font).pos(Pos::new(HPos::Center, VPos::Bottom));
    root.draw(&Text::new("Results Summary", (width / 2, top - row_height), heading))?;

    // The table spans the middle 70% of the page
    let table_left = width * 15 / 100;
    let table_width = width * 70 / 100;
    let mut rows = vec![["Parameter", "Value", "Method"].map(String::from)];
    rows.extend(table_rows(est));
    for (r, cells) in rows.iter().enumerate() {
        let y0 = top + r as i32 * row_height;
        for (c, cell) in cells.iter().enumerate() {
            let x0 = table_left + table_width * COLUMN_EDGES[c] / 100;
            let x1 = table_left + table_width * COLUMN_EDGES[c + 1] / 100;
            let corners = [(x0, y0), (x1, y0 + row_height)];
            let font = if r == 0 {
                root.draw(&Rectangle::new(corners, HEADER_FILL.filled()))?;
                ("sans-serif", TABLE_FONT_SIZE, FontStyle::Bold).into_font().color(&WHITE)
            } else {
                ("sans-serif", TABLE_FONT_SIZE).into_font().color(&BLACK)
            };
            root.draw(&Rectangle::new(corners, BLACK.mix(0.5)))?;
            root.draw(&Text::new(
                cell.as_str(),
                ((x0 + x1) / 2, y0 + row_height / 2),
                font.pos(Pos::new(HPos::Center, VPos::Center)),
            ))?;
        }
    }

    let line_height = (layout.text_font_size * layout.text_line_spacing).round() as i32;
    let text_style = TextStyle::from(("monospace", layout.text_font_size).into_font());
    for (i, line) in explanation(dataset, est, config).iter().enumerate() {
        let y = layout.text_top as i32 + i as i32 * line_height;
        root.draw(&Text::new(line.as_str(), (layout.text_left as i32, y), text_style.clone()))?;
    }
    Ok(())
}

/// Value and method for latency, bandwidth and buffer size.
pub(crate) fn table_rows(est: &Estimate) -> [[String; 3]; 3] {
    [
        [
            "Latency (alpha)".to_string(),
            format!("{:.2} us", est.latency_us),
            "RTT/2 for small messages".to_string(),
        ],
        [
            "Bandwidth (beta)".to_string(),
            format!("{:.0} MB/s", est.peak_bandwidth_mb_s),
            "Peak observed throughput".to_string(),
        ],
        [
            "Buffer Size".to_string(),
            est.buffer_threshold.to_string(),
            "Send time increase threshold".to_string(),
        ],
    ]
}

/// Human readable size for prose, exact where possible.
fn size_label(bytes: u64) -> String {
    if bytes >= 1 << 20 && bytes % (1 << 20) == 0 {
        format!("{} MB", bytes >> 20)
    } else if bytes >= 1024 && bytes % 1024 == 0 {
        format!("{} KB", bytes >> 10)
    } else if bytes == 1 {
        "1 byte".to_string()
    } else {
        format!("{} bytes", bytes)
    }
}

/// The explanatory text of the summary page, one entry per line.
pub(crate) fn explanation(dataset: &Dataset, est: &Estimate, config: &ReportConfig) -> Vec<String> {
    let rows = dataset.rows();
    let min = rows[est.min_rtt_index];
    let top = rows[est.peak_bandwidth_index];
    let window = window_bounds(rows.len(), config.latency_window);

    let mut lines = vec![
        "How these numbers were obtained:".to_string(),
        String::new(),
        "Latency: for tiny messages the transfer itself is negligible and almost all".to_string(),
        format!(
            "of the time is overhead. The smallest RTT in rows {}-{} was {:.2} us at {},",
            window.start + 1,
            window.end,
            min.rtt,
            size_label(min.message_size),
        ),
        format!("so the one-way latency is half of that: {:.2} us.", est.latency_us),
        String::new(),
        "Bandwidth: at larger sizes data transfer dominates. Peak bandwidth was".to_string(),
        format!(
            "{:.0} MB/s ({:.1} GB/s) at {}.",
            top.bandwidth,
            top.bandwidth / 1000.0,
            size_label(top.message_size),
        ),
        String::new(),
        "Buffer size: MPI buffers small messages so Send() returns immediately.".to_string(),
    ];
    match est.buffer_threshold {
        BufferThreshold::Detected { message_size, jump_index } => {
            let (before, after) = (rows[jump_index - 1], rows[jump_index]);
            lines.push(format!(
                "Send time jumped from {:.2} to {:.2} us between {} and {},",
                before.avg_send,
                after.avg_send,
                size_label(message_size),
                size_label(after.message_size),
            ));
            lines.push(format!(
                "the switch from buffered to blocking mode: about {}.",
                size_label(message_size),
            ));
        }
        BufferThreshold::Assumed(bytes) => {
            lines.push(format!(
                "No send time jump above {}x was found, so {} is assumed.",
                config.threshold.jump_factor,
                size_label(bytes),
            ));
        }
    }

    lines.extend([
        String::new(),
        String::new(),
        "Communication model:".to_string(),
        String::new(),
        "    T(n) = alpha + n/beta".to_string(),
        String::new(),
        "where T(n) is the transfer time for n bytes, alpha is latency and beta is".to_string(),
        "bandwidth. With these estimates:".to_string(),
        format!(
            "    T(n) = {:.2} + n/{:.0} (us)",
            est.latency_us, est.peak_bandwidth_mb_s,
        ),
    ]);

    let notes = notes(dataset, est);
    if !notes.is_empty() {
        lines.extend([String::new(), String::new(), "Notes:".to_string(), String::new()]);
        lines.extend(notes);
    }
    lines
}

fn notes(dataset: &Dataset, est: &Estimate) -> Vec<String> {
    let rows = dataset.rows();
    let min = rows[est.min_rtt_index];
    let mut notes = vec![];
    if est.peak_bandwidth_mb_s >= SHARED_MEMORY_BANDWIDTH {
        notes.push(format!(
            "- {:.0} GB/s is too fast for a network link: the processes most likely",
            est.peak_bandwidth_mb_s / 1000.0,
        ));
        notes.push("  ran on the same machine and communicated through shared memory.".to_string());
    }
    if est.min_rtt_index != 0 && rows[0].rtt > min.rtt * 1.5 {
        notes.push(format!(
            "- The first message ({}) was slower, likely due to warmup effects.",
            size_label(rows[0].message_size),
        ));
    }
    let last = rows[rows.len() - 1];
    if est.peak_bandwidth_index + 1 < rows.len() && last.bandwidth < est.peak_bandwidth_mb_s {
        notes.push(format!(
            "- Bandwidth peaks at {} then drops to {:.0} MB/s for larger messages",
            size_label(rows[est.peak_bandwidth_index].message_size),
            last.bandwidth,
        ));
        notes.push("  (cache effects).".to_string());
    }
    notes
}
