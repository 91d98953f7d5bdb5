//! CSV file price loader.
//!
//! Expects a header row naming Date, Open, High, Low, Close and Volume
//! columns (any order, case-insensitive). Extra columns are ignored.

use crate::domain::error::AlgoTraderError;
use crate::domain::ohlcv::{OhlcvBar, PriceSeries};
use crate::ports::data_port::DataPort;
use chrono::NaiveDate;
use std::fs;
use std::path::PathBuf;
use tracing::{debug, info};

const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%m/%d/%Y"];
const COLUMNS: [&str; 6] = ["date", "open", "high", "low", "close", "volume"];

pub struct CsvAdapter {
    path: PathBuf,
}

impl CsvAdapter {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

fn load_error(reason: impl Into<String>) -> AlgoTraderError {
    AlgoTraderError::DataLoad {
        reason: reason.into(),
    }
}

/// Accepts `2024-01-15`, `01/15/2024`, and either with a trailing time part.
fn parse_date(raw: &str) -> Result<NaiveDate, AlgoTraderError> {
    let day = raw.trim().split([' ', 'T']).next().unwrap_or_default();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(day, fmt).ok())
        .ok_or_else(|| load_error(format!("invalid date: {raw}")))
}

fn parse_field(
    record: &csv::StringRecord,
    index: usize,
    name: &str,
) -> Result<f64, AlgoTraderError> {
    let raw = record
        .get(index)
        .ok_or_else(|| load_error(format!("missing {name} column")))?;
    raw.trim()
        .parse()
        .map_err(|e| load_error(format!("invalid {name} value {raw:?}: {e}")))
}

impl DataPort for CsvAdapter {
    fn fetch_prices(
        &self,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> Result<PriceSeries, AlgoTraderError> {
        let content = fs::read_to_string(&self.path)
            .map_err(|e| load_error(format!("failed to read {}: {}", self.path.display(), e)))?;

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let headers = rdr
            .headers()
            .map_err(|e| load_error(format!("CSV header error: {}", e)))?
            .clone();

        let mut index = [0usize; 6];
        for (slot, name) in index.iter_mut().zip(COLUMNS) {
            *slot = headers
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(name))
                .ok_or_else(|| load_error(format!("missing {name} column in header")))?;
        }
        let [date_col, open_col, high_col, low_col, close_col, volume_col] = index;

        let mut bars = Vec::new();
        let mut skipped = 0usize;

        for result in rdr.records() {
            let record = result.map_err(|e| load_error(format!("CSV parse error: {}", e)))?;

            let date = parse_date(
                record
                    .get(date_col)
                    .ok_or_else(|| load_error("missing date column"))?,
            )?;

            let before = start_date.is_some_and(|s| date < s);
            let after = end_date.is_some_and(|e| date > e);
            if before || after {
                skipped += 1;
                continue;
            }

            bars.push(OhlcvBar {
                date,
                open: parse_field(&record, open_col, "open")?,
                high: parse_field(&record, high_col, "high")?,
                low: parse_field(&record, low_col, "low")?,
                close: parse_field(&record, close_col, "close")?,
                volume: parse_field(&record, volume_col, "volume")?,
            });
        }

        bars.sort_by_key(|b| b.date);
        debug!(rows = bars.len(), skipped, "parsed price rows");

        let series = PriceSeries::new(bars)?;
        info!(
            path = %self.path.display(),
            bars = series.len(),
            "loaded price series"
        );
        Ok(series)
    }
}
