use std::fs::File;
use std::path::{Path, PathBuf};
use serde::Deserialize;
use crate::error::{Error, Result};

/// Everything the report generator needs to know. All fields have
/// defaults so a config file only lists what it changes.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReportConfig {
    /// Benchmark results to read
    pub input: PathBuf,
    /// Where the PDF is written
    pub output: PathBuf,
    pub latency_window: LatencyWindow,
    pub threshold: ThresholdOptions,
    pub layout: Layout,
}

impl Default for ReportConfig {
    fn default() -> ReportConfig {
        ReportConfig {
            input: PathBuf::from("results.csv"),
            output: PathBuf::from("Network_PingPong_Report.pdf"),
            latency_window: LatencyWindow::default(),
            threshold: ThresholdOptions::default(),
            layout: Layout::default(),
        }
    }
}

/// Rows considered when estimating latency from the minimum RTT.
///
/// The window starts `skip` rows in and covers at most `len` rows. It is
/// clamped to the dataset so it always contains at least one row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LatencyWindow {
    pub skip: usize,
    pub len: usize,
}

impl Default for LatencyWindow {
    fn default() -> LatencyWindow {
        LatencyWindow { skip: 0, len: 8 }
    }
}

/// Parameters of the eager/rendezvous threshold scan.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ThresholdOptions {
    /// Ratio between consecutive send times that counts as a jump
    pub jump_factor: f64,
    /// Jumps below this message size are ignored
    pub min_message_size: u64,
    /// Reported when no jump is found
    pub fallback_bytes: u64,
}

impl Default for ThresholdOptions {
    fn default() -> ThresholdOptions {
        ThresholdOptions {
            jump_factor: 1.5,
            min_message_size: 128,
            fallback_bytes: 256 * 1024,
        }
    }
}

/// Page geometry, in PDF points (1/72 inch). Font sizes are in points too.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Layout {
    pub page_width: u32,
    pub page_height: u32,
    /// Space reserved for the title on the chart page
    pub title_height: u32,
    pub title_font_size: f64,
    pub chart_margin: u32,
    pub x_label_area: u32,
    pub y_label_area: u32,
    pub label_font_size: f64,
    pub marker_size: u32,
    /// Top of the summary table, from the top of the page
    pub table_top: u32,
    pub table_row_height: u32,
    /// Top left corner of the explanation text
    pub text_top: u32,
    pub text_left: u32,
    pub text_font_size: f64,
    pub text_line_spacing: f64,
}

impl Default for Layout {
    fn default() -> Layout {
        // US letter
        Layout {
            page_width: 612,
            page_height: 792,
            title_height: 60,
            title_font_size: 16.0,
            chart_margin: 24,
            x_label_area: 40,
            y_label_area: 60,
            label_font_size: 9.0,
            marker_size: 3,
            table_top: 120,
            table_row_height: 30,
            text_top: 300,
            text_left: 61,
            text_font_size: 9.0,
            text_line_spacing: 1.4,
        }
    }
}

/// Load a YAML configuration file.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<ReportConfig> {
    let path = path.as_ref();
    let f = File::open(path).map_err(|err| match err.kind() {
        std::io::ErrorKind::NotFound => Error::FileNotFound(path.to_path_buf()),
        _ => Error::Io(err),
    })?;
    serde_yaml::from_reader(f).map_err(|source| Error::Config {
        path: path.to_path_buf(),
        source,
    })
}
