//! OHLCV bars and the validated price series the core operates on.

use chrono::NaiveDate;

use super::error::AlgoTraderError;

#[derive(Debug, Clone, PartialEq)]
pub struct OhlcvBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl OhlcvBar {
    /// Fractional change of this close against `prev_close`.
    pub fn close_return(&self, prev_close: f64) -> f64 {
        (self.close - prev_close) / prev_close
    }
}

/// Daily bars with a strictly increasing date index.
///
/// Construction validates the index and price fields, so every consumer can
/// rely on ascending unique dates and positive prices. An empty series is
/// allowed here; the operations that need data reject it themselves.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PriceSeries {
    bars: Vec<OhlcvBar>,
}

impl PriceSeries {
    pub fn new(bars: Vec<OhlcvBar>) -> Result<Self, AlgoTraderError> {
        for (index, bar) in bars.iter().enumerate() {
            validate_bar(index, bar)?;
            if index > 0 && bars[index - 1].date >= bar.date {
                return Err(AlgoTraderError::InvalidPriceData {
                    index,
                    reason: format!(
                        "date {} does not follow {} (index must be unique and ascending)",
                        bar.date,
                        bars[index - 1].date
                    ),
                });
            }
        }
        Ok(Self { bars })
    }

    pub fn bars(&self) -> &[OhlcvBar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn first(&self) -> Option<&OhlcvBar> {
        self.bars.first()
    }

    pub fn last(&self) -> Option<&OhlcvBar> {
        self.bars.last()
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.bars.iter().map(|b| b.date).collect()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    /// The most recent `n` bars, newest first.
    pub fn tail(&self, n: usize) -> Vec<&OhlcvBar> {
        self.bars.iter().rev().take(n).collect()
    }

    /// Close-to-close returns; one shorter than the series.
    pub fn daily_returns(&self) -> Vec<f64> {
        self.bars
            .windows(2)
            .map(|w| w[1].close_return(w[0].close))
            .collect()
    }
}

fn validate_bar(index: usize, bar: &OhlcvBar) -> Result<(), AlgoTraderError> {
    let prices = [
        ("open", bar.open),
        ("high", bar.high),
        ("low", bar.low),
        ("close", bar.close),
    ];
    for (field, value) in prices {
        if !value.is_finite() || value <= 0.0 {
            return Err(AlgoTraderError::InvalidPriceData {
                index,
                reason: format!("{field} must be a positive number, got {value}"),
            });
        }
    }
    if !bar.volume.is_finite() || bar.volume < 0.0 {
        return Err(AlgoTraderError::InvalidPriceData {
            index,
            reason: format!("volume must be non-negative, got {}", bar.volume),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bar(day: u32, close: f64) -> OhlcvBar {
        OhlcvBar {
            date: NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
            open: close,
            high: close + 1.0,
            low: close - 1.0,
            close,
            volume: 1_000.0,
        }
    }

    #[test]
    fn accepts_ascending_series() {
        let series = PriceSeries::new(vec![bar(1, 10.0), bar(2, 11.0), bar(5, 12.0)]).unwrap();
        assert_eq!(series.len(), 3);
        assert_eq!(series.closes(), vec![10.0, 11.0, 12.0]);
        assert_eq!(series.first().unwrap().date, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
    }

    #[test]
    fn empty_series_is_constructible() {
        let series = PriceSeries::new(vec![]).unwrap();
        assert!(series.is_empty());
        assert!(series.daily_returns().is_empty());
    }

    #[test]
    fn rejects_duplicate_dates() {
        let err = PriceSeries::new(vec![bar(1, 10.0), bar(1, 11.0)]).unwrap_err();
        assert!(matches!(err, AlgoTraderError::InvalidPriceData { index: 1, .. }));
    }

    #[test]
    fn rejects_descending_dates() {
        let err = PriceSeries::new(vec![bar(3, 10.0), bar(2, 11.0)]).unwrap_err();
        assert!(matches!(err, AlgoTraderError::InvalidPriceData { index: 1, .. }));
    }

    #[test]
    fn rejects_non_positive_close() {
        let mut b = bar(1, 10.0);
        b.close = 0.0;
        let err = PriceSeries::new(vec![b]).unwrap_err();
        assert!(err.to_string().contains("close must be a positive number"));
    }

    #[test]
    fn rejects_negative_volume() {
        let mut b = bar(1, 10.0);
        b.volume = -5.0;
        assert!(PriceSeries::new(vec![b]).is_err());
    }

    #[test]
    fn tail_is_newest_first() {
        let series = PriceSeries::new(vec![bar(1, 10.0), bar(2, 11.0), bar(3, 12.0)]).unwrap();
        let tail = series.tail(2);
        assert_eq!(tail.len(), 2);
        assert_eq!(tail[0].close, 12.0);
        assert_eq!(tail[1].close, 11.0);
        assert_eq!(series.tail(10).len(), 3);
    }

    #[test]
    fn daily_returns_close_to_close() {
        let series = PriceSeries::new(vec![bar(1, 10.0), bar(2, 11.0), bar(3, 9.9)]).unwrap();
        let returns = series.daily_returns();
        assert_eq!(returns.len(), 2);
        assert!((returns[0] - 0.1).abs() < 1e-12);
        assert!((returns[1] - (-0.1)).abs() < 1e-12);
    }
}
