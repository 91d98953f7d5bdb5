//! Core domain types and logic.

pub mod backtest;
pub mod config_validation;
pub mod error;
pub mod indicator;
pub mod metrics;
pub mod ohlcv;
pub mod portfolio;
pub mod signal;
pub mod strategy;
pub mod summary;
pub mod sweep;
pub mod trade;
