/// Data-logger CSV reader
///
/// The test-rig logger writes one CSV file per run:
///   - A free-text preamble: run description lines (test stand, sample,
///     operator, date), no fixed line count.
///   - The table header line, recognized by the marker `Time,Pos/[cm]`.
///   - Comma-separated data rows. `Time` holds wall clock `HH:MM:SS.ffffff`;
///     every other named column is a numeric measurement channel. A leading
///     unnamed index column may be present and is skipped.
///
/// Column names carry their unit (`T_oil/[°C]`, `p_sys/[Bar]`, `Pos/[cm]`),
/// which is what the role mapping keys on.

use std::fs;
use std::io;
use std::path::Path;

use chrono::NaiveTime;
use thiserror::Error;

use super::recording::{Channel, Recording, RoleMap};

/// Marker identifying the table header line
pub const HEADER_MARKER: &str = "Time,Pos/[cm]";

/// Wall-clock format of the `Time` column
const TIME_FORMAT: &str = "%H:%M:%S%.f";

#[derive(Error, Debug)]
pub enum LoggerCsvError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("no table header containing {marker:?} found")]
    HeaderNotFound { marker: String },
    #[error("table has no `Time` column")]
    MissingTimeColumn,
    #[error("bad time value {value:?} on line {line}: {source}")]
    BadTime {
        line: usize,
        value: String,
        source: chrono::ParseError,
    },
    #[error("bad numeric value {value:?} in column {column:?} on line {line}")]
    BadValue {
        line: usize,
        column: String,
        value: String,
    },
}

/// Result of the preamble scan
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preamble {
    /// Non-blank preamble lines, joined with newlines
    pub title: String,
    /// Zero-based physical line index of the table header
    pub header_line: usize,
}

/// Scan the free-text preamble: collect title lines until a line containing
/// `marker` is seen. That line is the table header.
pub fn scan_preamble(content: &str, marker: &str) -> Result<Preamble, LoggerCsvError> {
    let mut title = String::new();
    for (idx, line) in content.lines().enumerate() {
        if line.contains(marker) {
            return Ok(Preamble {
                title,
                header_line: idx,
            });
        }
        if !line.trim().is_empty() {
            if !title.is_empty() {
                title.push('\n');
            }
            title.push_str(line.trim_end());
        }
    }
    Err(LoggerCsvError::HeaderNotFound {
        marker: marker.to_string(),
    })
}

/// Read a logger CSV file into a Recording
pub fn read_logger_file(path: &Path, roles: &RoleMap) -> Result<Recording, LoggerCsvError> {
    let content = fs::read_to_string(path)?;
    parse_logger_csv(&content, path, roles)
}

/// Parse logger CSV content
pub fn parse_logger_csv(
    content: &str,
    source_path: &Path,
    roles: &RoleMap,
) -> Result<Recording, LoggerCsvError> {
    let preamble = scan_preamble(content, HEADER_MARKER)?;

    // Everything from the header line on is a regular CSV table.
    let table: String = content
        .split_inclusive('\n')
        .skip(preamble.header_line)
        .collect();

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(table.as_bytes());

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let time_col = headers
        .iter()
        .position(|h| h == "Time")
        .ok_or(LoggerCsvError::MissingTimeColumn)?;

    // Named measurement columns; the unnamed leading index column is skipped.
    let value_cols: Vec<usize> = headers
        .iter()
        .enumerate()
        .filter(|(i, h)| *i != time_col && !h.is_empty())
        .map(|(i, _)| i)
        .collect();

    let mut time_s: Vec<f64> = Vec::new();
    let mut columns: Vec<Vec<f64>> = vec![Vec::new(); value_cols.len()];
    let mut first_clock: Option<NaiveTime> = None;

    for (row_idx, record) in reader.records().enumerate() {
        let record = record?;
        // 1-based physical line number of this row in the file
        let line = preamble.header_line + row_idx + 2;

        let raw_time = record.get(time_col).unwrap_or("").trim();
        let clock = NaiveTime::parse_from_str(raw_time, TIME_FORMAT).map_err(|source| {
            LoggerCsvError::BadTime {
                line,
                value: raw_time.to_string(),
                source,
            }
        })?;
        let start = *first_clock.get_or_insert(clock);
        time_s.push(seconds_since(start, clock));

        for (slot, &col) in value_cols.iter().enumerate() {
            let raw = record.get(col).unwrap_or("").trim();
            let value = raw.parse::<f64>().map_err(|_| LoggerCsvError::BadValue {
                line,
                column: headers[col].clone(),
                value: raw.to_string(),
            })?;
            columns[slot].push(value);
        }
    }

    let channels: Vec<Channel> = value_cols
        .iter()
        .zip(columns)
        .map(|(&col, values)| {
            let name = headers[col].clone();
            let role = roles.classify(&name);
            Channel { name, role, values }
        })
        .collect();

    log::debug!(
        "parsed {}: {} samples, {} channels",
        source_path.display(),
        time_s.len(),
        channels.len()
    );

    Ok(Recording {
        source_path: source_path.to_path_buf(),
        title: preamble.title,
        time_s,
        channels,
    })
}

/// Seconds from `start` to `t`, keeping the microsecond resolution of the
/// logger clock.
fn seconds_since(start: NaiveTime, t: NaiveTime) -> f64 {
    let delta = t - start;
    match delta.num_microseconds() {
        Some(us) => us as f64 / 1e6,
        None => delta.num_milliseconds() as f64 / 1e3,
    }
}
