use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// Input CSV does not exist
    #[error("input file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// A data row had a missing or non-numeric field
    #[error("line {line}: bad {column} field {value:?}: {reason}")]
    Format {
        line: u64,
        column: &'static str,
        value: String,
        reason: String,
    },

    /// Nothing left after skipping the header, comments and blank rows
    #[error("no measurements found in input")]
    EmptyDataset,

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to load config {}: {source}", .path.display())]
    Config {
        path: PathBuf,
        source: serde_yaml::Error,
    },

    #[error("PDF error: {0}")]
    Pdf(String),
}

impl From<printpdf::Error> for Error {
    fn from(err: printpdf::Error) -> Self {
        Error::Pdf(format!("{err:?}"))
    }
}

impl<E> From<plotters::drawing::DrawingAreaErrorKind<E>> for Error
where
    E: std::error::Error + Send + Sync,
{
    fn from(err: plotters::drawing::DrawingAreaErrorKind<E>) -> Self {
        Error::Pdf(err.to_string())
    }
}
