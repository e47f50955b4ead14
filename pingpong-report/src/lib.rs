use std::path::PathBuf;
use clap::Parser;
use log::info;

pub mod config;
pub mod dataset;
pub mod error;
pub mod estimate;
pub mod render;
pub use config::{
    load_config,
    LatencyWindow,
    Layout,
    ReportConfig,
    ThresholdOptions,
};
pub use dataset::{Dataset, Measurement};
pub use error::{Error, Result};
pub use estimate::{estimate, BufferThreshold, Estimate};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// YAML file overriding the default paths and parameters
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

/// Load the measurements, estimate the model parameters and write the
/// report. Returns the path of the written report.
pub fn run(config: &ReportConfig) -> Result<PathBuf> {
    let dataset = Dataset::load(&config.input)?;
    let est = estimate(&dataset, config.latency_window, config.threshold);
    render::write_report(&config.output, &dataset, &est, config)?;
    info!("Report complete");
    Ok(config.output.clone())
}
