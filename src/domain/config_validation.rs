//! Configuration validation.
//!
//! Validates all config fields before any data is loaded or backtest runs.
//! Absent keys take the engine defaults, so an empty file is valid.

use crate::domain::backtest::{DEFAULT_INITIAL_CAPITAL, DEFAULT_LONG_WINDOW, DEFAULT_SHORT_WINDOW};
use crate::domain::error::AlgoTraderError;
use crate::domain::sweep::{DEFAULT_LONG_RANGE, DEFAULT_SHORT_RANGE};
use crate::ports::config_port::ConfigPort;
use chrono::NaiveDate;
use std::str::FromStr;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

const INT_KEYS: [(&str, &str); 6] = [
    ("backtest", "short_window"),
    ("backtest", "long_window"),
    ("sweep", "short_min"),
    ("sweep", "short_max"),
    ("sweep", "long_min"),
    ("sweep", "long_max"),
];
const FLOAT_KEYS: [(&str, &str); 1] = [("backtest", "initial_capital")];

/// Full check of a config file on its own, including `short_window < long_window`.
pub fn validate_config(config: &dyn ConfigPort) -> Result<(), AlgoTraderError> {
    validate_config_fields(config)?;
    validate_window_order(config)
}

/// Per-key checks only. The window order is left to the caller so that
/// command-line overrides can be merged first.
pub fn validate_config_fields(config: &dyn ConfigPort) -> Result<(), AlgoTraderError> {
    validate_numbers(config)?;
    validate_date_range(config)?;
    validate_initial_capital(config)?;
    validate_windows(config)?;
    validate_sweep(config)?;
    Ok(())
}

fn invalid(section: &str, key: &str, reason: impl Into<String>) -> AlgoTraderError {
    AlgoTraderError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.into(),
    }
}

/// Parse an optional `YYYY-MM-DD` value; absent or blank keys yield None.
pub fn parse_optional_date(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
) -> Result<Option<NaiveDate>, AlgoTraderError> {
    match config.get_string(section, key) {
        Some(s) if !s.trim().is_empty() => NaiveDate::parse_from_str(s.trim(), DATE_FORMAT)
            .map(Some)
            .map_err(|_| {
                invalid(section, key, format!("invalid {key} format, expected YYYY-MM-DD"))
            }),
        _ => Ok(None),
    }
}

fn check_parses<T: FromStr>(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
) -> Result<(), AlgoTraderError> {
    if !config.has_key(section, key) {
        return Ok(());
    }
    let raw = config.get_string(section, key).unwrap_or_default();
    match raw.trim().parse::<T>() {
        Ok(_) => Ok(()),
        Err(_) => Err(invalid(section, key, format!("{raw:?} is not a number"))),
    }
}

fn validate_numbers(config: &dyn ConfigPort) -> Result<(), AlgoTraderError> {
    for (section, key) in INT_KEYS {
        check_parses::<i64>(config, section, key)?;
    }
    for (section, key) in FLOAT_KEYS {
        check_parses::<f64>(config, section, key)?;
    }
    Ok(())
}

fn validate_date_range(config: &dyn ConfigPort) -> Result<(), AlgoTraderError> {
    let start = parse_optional_date(config, "data", "start_date")?;
    let end = parse_optional_date(config, "data", "end_date")?;
    if let (Some(start), Some(end)) = (start, end) {
        if start > end {
            return Err(invalid(
                "data",
                "start_date",
                "start_date must not be after end_date",
            ));
        }
    }
    Ok(())
}

fn validate_initial_capital(config: &dyn ConfigPort) -> Result<(), AlgoTraderError> {
    let value = config.get_double("backtest", "initial_capital", DEFAULT_INITIAL_CAPITAL);
    if !value.is_finite() || value <= 0.0 {
        return Err(invalid(
            "backtest",
            "initial_capital",
            "initial_capital must be positive",
        ));
    }
    Ok(())
}

fn validate_windows(config: &dyn ConfigPort) -> Result<(), AlgoTraderError> {
    let short = config.get_int("backtest", "short_window", DEFAULT_SHORT_WINDOW as i64);
    let long = config.get_int("backtest", "long_window", DEFAULT_LONG_WINDOW as i64);
    if short < 1 {
        return Err(invalid("backtest", "short_window", "short_window must be at least 1"));
    }
    if long < 1 {
        return Err(invalid("backtest", "long_window", "long_window must be at least 1"));
    }
    Ok(())
}

fn validate_window_order(config: &dyn ConfigPort) -> Result<(), AlgoTraderError> {
    let short = config.get_int("backtest", "short_window", DEFAULT_SHORT_WINDOW as i64);
    let long = config.get_int("backtest", "long_window", DEFAULT_LONG_WINDOW as i64);
    if short >= long {
        return Err(invalid(
            "backtest",
            "short_window",
            "short_window must be smaller than long_window",
        ));
    }
    Ok(())
}

fn validate_sweep(config: &dyn ConfigPort) -> Result<(), AlgoTraderError> {
    let ranges = [
        ("short_min", "short_max", DEFAULT_SHORT_RANGE),
        ("long_min", "long_max", DEFAULT_LONG_RANGE),
    ];
    for (min_key, max_key, (default_min, default_max)) in ranges {
        let min = config.get_int("sweep", min_key, default_min as i64);
        let max = config.get_int("sweep", max_key, default_max as i64);
        if min < 1 {
            return Err(invalid("sweep", min_key, format!("{min_key} must be at least 1")));
        }
        if max < min {
            return Err(invalid(
                "sweep",
                max_key,
                format!("{max_key} must not be less than {min_key}"),
            ));
        }
    }
    Ok(())
}
