//! Loading of ping-pong measurements from the benchmark's CSV output.
//!
//! The file has one header line followed by rows of
//! `message_size, avg_send, <unused>, rtt, bandwidth`. Blank rows and rows
//! whose first field starts with `#` are ignored.
use std::fmt::Display;
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;
use std::str::FromStr;
use csv::{
    ReaderBuilder,
    StringRecord,
    Trim,
};
use log::{debug, info};
use crate::error::{Error, Result};

const SIZE_COLUMN: usize = 0;
const SEND_COLUMN: usize = 1;
const RTT_COLUMN: usize = 3;
const BANDWIDTH_COLUMN: usize = 4;

/// One row of the benchmark output.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Measurement {
    /// Message size in bytes
    pub message_size: u64,
    /// Average time of a single send, in microseconds
    pub avg_send: f64,
    /// Round-trip time, in microseconds
    pub rtt: f64,
    /// Bandwidth in MB/s
    pub bandwidth: f64,
}

/// All measurements of one run, in file order.
#[derive(Debug, Clone)]
pub struct Dataset {
    rows: Vec<Measurement>,
}

impl Dataset {
    /// Wrap already parsed rows. Fails if there are none.
    pub fn new(rows: Vec<Measurement>) -> Result<Dataset> {
        if rows.is_empty() {
            return Err(Error::EmptyDataset);
        }
        Ok(Dataset { rows })
    }

    /// Load a dataset from a CSV file on disk.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Dataset> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|err| match err.kind() {
            io::ErrorKind::NotFound => Error::FileNotFound(path.to_path_buf()),
            _ => Error::Io(err),
        })?;
        let dataset = Dataset::from_reader(file)?;
        info!("Loaded {} measurements from {}", dataset.len(), path.display());
        Ok(dataset)
    }

    /// Parse CSV text from any reader.
    pub fn from_reader<R: Read>(reader: R) -> Result<Dataset> {
        // The first record is always treated as the header, whatever it holds
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(Trim::All)
            .from_reader(reader);
        let mut rows = vec![];
        for record in reader.records() {
            let record = record?;
            let line = record.position().map(|pos| pos.line()).unwrap_or(0);
            if is_ignored(&record) {
                debug!("Skipping line {}", line);
                continue;
            }
            rows.push(parse_record(&record, line)?);
        }
        Dataset::new(rows)
    }

    pub fn rows(&self) -> &[Measurement] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Never true for a dataset built by `new`.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Measurement> {
        self.rows.iter()
    }

    pub fn message_sizes(&self) -> Vec<u64> {
        self.rows.iter().map(|m| m.message_size).collect()
    }

    pub fn rtts(&self) -> Vec<f64> {
        self.rows.iter().map(|m| m.rtt).collect()
    }

    pub fn bandwidths(&self) -> Vec<f64> {
        self.rows.iter().map(|m| m.bandwidth).collect()
    }
}

fn is_ignored(record: &StringRecord) -> bool {
    match record.get(SIZE_COLUMN) {
        None => true,
        Some(first) => first.is_empty() || first.starts_with('#'),
    }
}

fn parse_record(record: &StringRecord, line: u64) -> Result<Measurement> {
    Ok(Measurement {
        message_size: field(record, line, SIZE_COLUMN, "message_size")?,
        avg_send: finite_field(record, line, SEND_COLUMN, "avg_send")?,
        rtt: finite_field(record, line, RTT_COLUMN, "rtt")?,
        bandwidth: finite_field(record, line, BANDWIDTH_COLUMN, "bandwidth")?,
    })
}

fn field<T>(record: &StringRecord, line: u64, index: usize, column: &'static str) -> Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    let value = record.get(index).ok_or_else(|| Error::Format {
        line,
        column,
        value: String::new(),
        reason: "missing field".to_string(),
    })?;
    value.parse().map_err(|err: T::Err| Error::Format {
        line,
        column,
        value: value.to_string(),
        reason: err.to_string(),
    })
}

fn finite_field(
    record: &StringRecord,
    line: u64,
    index: usize,
    column: &'static str,
) -> Result<f64> {
    let value: f64 = field(record, line, index, column)?;
    if !value.is_finite() {
        return Err(Error::Format {
            line,
            column,
            value: value.to_string(),
            reason: "not a finite number".to_string(),
        });
    }
    Ok(value)
}
