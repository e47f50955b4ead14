//! Parameters of the linear model `T(n) = alpha + n / beta` derived from a
//! dataset.
use std::fmt;
use std::ops::Range;
use log::{debug, info};
use crate::config::{LatencyWindow, ThresholdOptions};
use crate::dataset::Dataset;

/// Everything the report shows about a run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Estimate {
    /// One-way latency (alpha), microseconds
    pub latency_us: f64,
    /// Peak bandwidth (beta), MB/s
    pub peak_bandwidth_mb_s: f64,
    pub buffer_threshold: BufferThreshold,
    /// Row with the smallest RTT inside the latency window
    pub min_rtt_index: usize,
    /// Row with the highest bandwidth
    pub peak_bandwidth_index: usize,
}

impl Estimate {
    /// Predicted one-way transfer time for `n` bytes, in microseconds.
    ///
    /// MB/s is the same as bytes per microsecond, so no unit conversion is
    /// needed.
    pub fn model_time(&self, n: u64) -> f64 {
        if self.peak_bandwidth_mb_s > 0.0 {
            self.latency_us + n as f64 / self.peak_bandwidth_mb_s
        } else {
            f64::INFINITY
        }
    }
}

/// Size boundary between the eager and the rendezvous protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferThreshold {
    /// Size of the message right before the first send-time jump
    Detected { message_size: u64, jump_index: usize },
    /// No jump in the data, so a default size is reported
    Assumed(u64),
}

impl BufferThreshold {
    pub fn bytes(&self) -> u64 {
        match *self {
            BufferThreshold::Detected { message_size, .. } => message_size,
            BufferThreshold::Assumed(bytes) => bytes,
        }
    }
}

impl fmt::Display for BufferThreshold {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bytes = self.bytes();
        if bytes >= 1024 {
            write!(f, "~{} KB", bytes / 1024)
        } else {
            write!(f, "~{} B", bytes)
        }
    }
}

/// Compute all parameters for a dataset.
pub fn estimate(dataset: &Dataset, window: LatencyWindow, threshold: ThresholdOptions) -> Estimate {
    let (min_rtt_index, latency_us) = latency(dataset, window);
    let (peak_bandwidth_index, peak_bandwidth_mb_s) = peak_bandwidth(dataset);
    let buffer_threshold = buffer_threshold(dataset, threshold);
    info!(
        "Estimated latency {:.3} us, peak bandwidth {:.1} MB/s, buffer {}",
        latency_us, peak_bandwidth_mb_s, buffer_threshold,
    );
    Estimate {
        latency_us,
        peak_bandwidth_mb_s,
        buffer_threshold,
        min_rtt_index,
        peak_bandwidth_index,
    }
}

/// Rows of a dataset with `len` rows covered by `window`, never empty.
pub fn window_bounds(len: usize, window: LatencyWindow) -> Range<usize> {
    assert!(len > 0, "window of an empty dataset");
    let start = window.skip.min(len - 1);
    let end = (start + window.len.max(1)).min(len);
    start..end
}

/// Half the smallest RTT in the latency window, with the row it came from.
pub fn latency(dataset: &Dataset, window: LatencyWindow) -> (usize, f64) {
    let bounds = window_bounds(dataset.len(), window);
    let rows = dataset.rows();
    let mut best = bounds.start;
    for i in bounds.clone() {
        if rows[i].rtt < rows[best].rtt {
            best = i;
        }
    }
    debug!("Latency window rows {:?}, min RTT at row {}", bounds, best);
    (best, rows[best].rtt / 2.0)
}

/// Highest bandwidth over the whole run. Ties go to the earliest row.
pub fn peak_bandwidth(dataset: &Dataset) -> (usize, f64) {
    let rows = dataset.rows();
    let mut best = 0;
    for (i, m) in rows.iter().enumerate() {
        if m.bandwidth > rows[best].bandwidth {
            best = i;
        }
    }
    (best, rows[best].bandwidth)
}

/// Find the first jump in send time and report the message size before it.
///
/// Only the first qualifying jump counts; later behavior is not checked.
pub fn buffer_threshold(dataset: &Dataset, opts: ThresholdOptions) -> BufferThreshold {
    let rows = dataset.rows();
    for (i, pair) in rows.windows(2).enumerate() {
        let (prev, cur) = (&pair[0], &pair[1]);
        if cur.avg_send > prev.avg_send * opts.jump_factor
            && cur.message_size >= opts.min_message_size
        {
            debug!(
                "Send time jumps {} -> {} us between {} and {} bytes",
                prev.avg_send, cur.avg_send, prev.message_size, cur.message_size,
            );
            return BufferThreshold::Detected {
                message_size: prev.message_size,
                jump_index: i + 1,
            };
        }
    }
    debug!("No send time jump, assuming {} bytes", opts.fallback_bytes);
    BufferThreshold::Assumed(opts.fallback_bytes)
}
