//! CSV station ingest.
//!
//! Turns a station CSV into a clean set of observations that are safe to fit.
//! Required columns are checked up front (exit code 2); bad rows are skipped
//! and reported with their 1-based line number.

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::StringRecord;
use tracing::{debug, warn};

use crate::domain::Observation;
use crate::error::AppError;

/// Names of the coordinate and value columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnNames {
    pub x: String,
    pub y: String,
    pub value: String,
}

impl Default for ColumnNames {
    fn default() -> Self {
        Self {
            x: "lon".to_string(),
            y: "lat".to_string(),
            value: "precip".to_string(),
        }
    }
}

/// A row-level error encountered during ingest.
#[derive(Debug, Clone, PartialEq)]
pub struct RowError {
    pub line: usize,
    pub id: Option<String>,
    pub message: String,
}

/// Ingest output: observations (in file coordinates) + row errors.
#[derive(Debug, Clone)]
pub struct IngestedData {
    pub observations: Vec<Observation>,
    pub row_errors: Vec<RowError>,
    pub rows_read: usize,
    pub rows_used: usize,
}

/// Load station observations from a CSV file.
pub fn load_observations(path: &Path, columns: &ColumnNames) -> Result<IngestedData, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open CSV '{}': {e}", path.display())))?;
    let data = read_observations(file, columns)?;
    debug!(
        path = %path.display(),
        rows_read = data.rows_read,
        rows_used = data.rows_used,
        "stations loaded"
    );
    Ok(data)
}

/// Read station observations from any CSV source.
pub fn read_observations<R: Read>(source: R, columns: &ColumnNames) -> Result<IngestedData, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(source);

    let headers = reader
        .headers()
        .map_err(|e| AppError::new(2, format!("Failed to read CSV headers: {e}")))?
        .clone();

    let header_map = build_header_map(&headers);
    let layout = resolve_layout(columns, &header_map)?;

    let mut observations = Vec::new();
    let mut row_errors = Vec::new();
    let mut rows_read = 0usize;

    for (idx, result) in reader.records().enumerate() {
        // Header is line 1.
        let line = idx + 2;
        rows_read += 1;

        let record = match result {
            Ok(r) => r,
            Err(e) => {
                row_errors.push(RowError {
                    line,
                    id: None,
                    message: format!("CSV parse error: {e}"),
                });
                continue;
            }
        };

        match parse_row(&record, &layout) {
            Ok(obs) => observations.push(obs),
            Err(message) => row_errors.push(RowError {
                line,
                id: layout.id.and_then(|i| record.get(i)).map(str::to_string),
                message,
            }),
        }
    }

    if !row_errors.is_empty() {
        warn!(skipped = row_errors.len(), rows_read, "rows skipped during ingest");
    }

    let rows_used = observations.len();
    if rows_used == 0 {
        return Err(AppError::new(3, "No valid station rows in CSV."));
    }

    Ok(IngestedData {
        observations,
        row_errors,
        rows_read,
        rows_used,
    })
}

/// Column indices resolved against the header row.
struct Layout {
    x: (String, usize),
    y: (String, usize),
    value: (String, usize),
    id: Option<usize>,
}

fn resolve_layout(columns: &ColumnNames, header_map: &HashMap<String, usize>) -> Result<Layout, AppError> {
    let lookup = |name: &str| -> Result<(String, usize), AppError> {
        let key = normalize_header_name(name);
        header_map
            .get(&key)
            .map(|&idx| (key.clone(), idx))
            .ok_or_else(|| AppError::new(2, format!("Missing required column: `{key}`")))
    };

    Ok(Layout {
        x: lookup(&columns.x)?,
        y: lookup(&columns.y)?,
        value: lookup(&columns.value)?,
        id: ["id", "station", "name"]
            .iter()
            .find_map(|k| header_map.get(*k).copied()),
    })
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (normalize_header_name(name), idx))
        .collect()
}

fn normalize_header_name(name: &str) -> String {
    // Spreadsheet exports often put a BOM in front of the first header.
    let name = name.trim().trim_start_matches('\u{feff}');
    name.to_ascii_lowercase()
}

fn parse_row(record: &StringRecord, layout: &Layout) -> Result<Observation, String> {
    let x = parse_f64(record, &layout.x)?;
    let y = parse_f64(record, &layout.y)?;
    let value = parse_f64(record, &layout.value)?;
    Ok(Observation::new(x, y, value))
}

fn parse_f64(record: &StringRecord, (name, idx): &(String, usize)) -> Result<f64, String> {
    let raw = record
        .get(*idx)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| format!("Missing required value: `{name}`"))?;
    let v = raw
        .parse::<f64>()
        .map_err(|_| format!("Invalid number '{raw}' in `{name}`"))?;
    if v.is_finite() {
        Ok(v)
    } else {
        Err(format!("Non-finite value in `{name}`"))
    }
}
