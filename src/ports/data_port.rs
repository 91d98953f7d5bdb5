//! Price data access port trait.

use crate::domain::error::AlgoTraderError;
use crate::domain::ohlcv::PriceSeries;
use chrono::NaiveDate;

pub trait DataPort {
    /// Load a validated price series, optionally restricted to
    /// `[start_date, end_date]` (inclusive).
    fn fetch_prices(
        &self,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> Result<PriceSeries, AlgoTraderError>;
}
