//! CSV market-data adapter.
//!
//! Expected layout, one row per trading day in chronological order:
//!
//! ```text
//! date,return,label,feature_a,feature_b,...
//! 2020-01-02,0.0123,1,0.51,-1.2,...
//! ```
//!
//! `return` is the realized return of the move following `date`. The `label`
//! column is optional; without it the label is the sign of `return`. Every
//! other column is a numeric feature, kept in file order.

use std::path::Path;
use std::str::FromStr;

use chrono::NaiveDate;
use ndarray::Array2;
use rust_decimal::Decimal;
use tracing::info;

use super::dataset::{Dataset, Direction};
use crate::error::{BacktestError, BacktestResult};

const DATE_COLUMN: &str = "date";
const RETURN_COLUMN: &str = "return";
const LABEL_COLUMN: &str = "label";
const DATE_FORMAT: &str = "%Y-%m-%d";

/// Load a dataset from a CSV file.
///
/// # Errors
///
/// Returns `Io`/`Csv` errors for unreadable files and `InvalidDataset` for
/// missing columns, unparsable cells or a dataset that fails validation.
pub fn load_csv(path: impl AsRef<Path>) -> BacktestResult<Dataset> {
    let path = path.as_ref();
    let reader = csv::Reader::from_path(path)?;
    let dataset = read_dataset(reader)?;

    info!(
        path = %path.display(),
        rows = dataset.len(),
        features = dataset.n_features(),
        "Dataset loaded"
    );

    Ok(dataset)
}

/// Load a dataset from CSV text.
///
/// # Errors
///
/// Same as [`load_csv`].
pub fn load_csv_from_str(content: &str) -> BacktestResult<Dataset> {
    read_dataset(csv::Reader::from_reader(content.as_bytes()))
}

fn read_dataset<R: std::io::Read>(mut reader: csv::Reader<R>) -> BacktestResult<Dataset> {
    let headers = reader.headers()?.clone();
    let column = |name: &str| headers.iter().position(|h| h.trim() == name);

    let date_idx = column(DATE_COLUMN)
        .ok_or_else(|| BacktestError::InvalidDataset(format!("missing '{DATE_COLUMN}' column")))?;
    let return_idx = column(RETURN_COLUMN).ok_or_else(|| {
        BacktestError::InvalidDataset(format!("missing '{RETURN_COLUMN}' column"))
    })?;
    let label_idx = column(LABEL_COLUMN);
    let feature_idx: Vec<usize> = (0..headers.len())
        .filter(|i| *i != date_idx && *i != return_idx && Some(*i) != label_idx)
        .collect();

    let mut dates = Vec::new();
    let mut returns = Vec::new();
    let mut labels = Vec::new();
    let mut values = Vec::new();

    for (line, record) in reader.records().enumerate() {
        let record = record?;
        // header is line 1
        let row = line + 2;
        let cell = |idx: usize| record.get(idx).map_or("", str::trim);

        let date = NaiveDate::parse_from_str(cell(date_idx), DATE_FORMAT).map_err(|e| {
            BacktestError::InvalidDataset(format!("row {row}: bad date '{}': {e}", cell(date_idx)))
        })?;
        let realized = Decimal::from_str(cell(return_idx)).map_err(|e| {
            BacktestError::InvalidDataset(format!(
                "row {row}: bad return '{}': {e}",
                cell(return_idx)
            ))
        })?;
        let label = match label_idx {
            Some(idx) => cell(idx)
                .parse::<i8>()
                .map_err(|e| e.to_string())
                .and_then(Direction::try_from)
                .map_err(|e| {
                    BacktestError::InvalidDataset(format!("row {row}: bad label: {e}"))
                })?,
            None => Direction::from_return(realized),
        };
        for idx in &feature_idx {
            let value = cell(*idx).parse::<f64>().map_err(|e| {
                BacktestError::InvalidDataset(format!(
                    "row {row}: bad value in column '{}': {e}",
                    &headers[*idx]
                ))
            })?;
            values.push(value);
        }

        dates.push(date);
        returns.push(realized);
        labels.push(label);
    }

    let features = Array2::from_shape_vec((dates.len(), feature_idx.len()), values)
        .map_err(|e| BacktestError::InvalidDataset(e.to_string()))?;

    Dataset::new(features, labels, returns, dates)
}
