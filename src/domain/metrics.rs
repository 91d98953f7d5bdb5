//! Performance metrics for a backtest and for the raw price series.

use super::error::AlgoTraderError;
use super::ohlcv::PriceSeries;
use super::portfolio::PortfolioTrace;
use super::trade::TradeLog;

pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// Summary of a simulated portfolio.
///
/// `annualized_sharpe` is NaN when it is undefined: fewer than two period
/// returns, or zero return variance (e.g. no trades on a flat series).
#[derive(Debug, Clone, PartialEq)]
pub struct BacktestMetrics {
    pub final_equity: f64,
    pub total_return_pct: f64,
    pub annualized_sharpe: f64,
    pub max_drawdown_pct: f64,
    pub trade_count: usize,
}

impl BacktestMetrics {
    pub fn compute(trace: &PortfolioTrace, trades: &TradeLog) -> Self {
        let initial_capital = trace.initial_capital;
        let final_equity = trace.final_equity();
        let total_return_pct = (final_equity - initial_capital) / initial_capital * 100.0;

        let returns: Vec<f64> = trace
            .period_returns()
            .into_iter()
            .filter(|r| !r.is_nan())
            .collect();
        let annualized_sharpe = sharpe_ratio(&returns);

        let equity: Vec<f64> = trace.points.iter().map(|p| p.total_equity).collect();
        let max_drawdown_pct = max_drawdown(&equity) * 100.0;

        BacktestMetrics {
            final_equity,
            total_return_pct,
            annualized_sharpe,
            max_drawdown_pct,
            trade_count: trades.len(),
        }
    }
}

/// Buy-and-hold view of the price series itself.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceMetrics {
    pub latest_close: f64,
    /// Last close minus the previous close; None for a single bar.
    pub latest_change: Option<f64>,
    pub total_return_pct: f64,
    pub annualized_return_pct: f64,
    /// NaN with fewer than two daily returns.
    pub annualized_volatility_pct: f64,
}

impl PriceMetrics {
    pub fn compute(prices: &PriceSeries) -> Result<Self, AlgoTraderError> {
        let (first, last) = match (prices.first(), prices.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => {
                return Err(AlgoTraderError::InsufficientData {
                    rows: 0,
                    minimum: 1,
                })
            }
        };

        let total_return_pct = (last.close - first.close) / first.close * 100.0;
        let annualized_return_pct =
            total_return_pct * (TRADING_DAYS_PER_YEAR / prices.len() as f64);
        let annualized_volatility_pct =
            sample_std(&prices.daily_returns()) * TRADING_DAYS_PER_YEAR.sqrt() * 100.0;

        let bars = prices.bars();
        let latest_change = (bars.len() >= 2).then(|| last.close - bars[bars.len() - 2].close);

        Ok(PriceMetrics {
            latest_close: last.close,
            latest_change,
            total_return_pct,
            annualized_return_pct,
            annualized_volatility_pct,
        })
    }
}

pub(crate) fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Standard deviation with n-1 degrees of freedom; NaN below two samples.
pub(crate) fn sample_std(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return f64::NAN;
    }
    let m = mean(values);
    let variance =
        values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    variance.sqrt()
}

fn sharpe_ratio(returns: &[f64]) -> f64 {
    let stddev = sample_std(returns);
    if stddev.is_nan() || stddev == 0.0 {
        return f64::NAN;
    }
    mean(returns) / stddev * TRADING_DAYS_PER_YEAR.sqrt()
}

/// Largest peak-to-trough fall as a fraction of the peak.
fn max_drawdown(equity: &[f64]) -> f64 {
    let Some(&first) = equity.first() else {
        return 0.0;
    };

    let mut peak = first;
    let mut max_dd = 0.0_f64;
    for &value in equity {
        if value > peak {
            peak = value;
        } else if peak > 0.0 {
            max_dd = max_dd.max((peak - value) / peak);
        }
    }
    max_dd
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ohlcv::OhlcvBar;
    use crate::domain::portfolio::PortfolioState;
    use crate::domain::trade::{TradeDirection, TradeRecord};
    use approx::assert_relative_eq;
    use chrono::NaiveDate;

    fn day(i: usize) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + chrono::Duration::days(i as i64)
    }

    fn make_trace(initial: f64, equity: &[f64]) -> PortfolioTrace {
        let points = equity
            .iter()
            .enumerate()
            .map(|(i, &e)| PortfolioState {
                date: day(i),
                shares_held: 0,
                cash: e,
                holdings_value: 0.0,
                total_equity: e,
                period_return: (i > 0).then(|| (e - equity[i - 1]) / equity[i - 1]),
            })
            .collect();
        PortfolioTrace {
            initial_capital: initial,
            points,
        }
    }

    fn make_prices(closes: &[f64]) -> PriceSeries {
        let bars = closes
            .iter()
            .enumerate()
            .map(|(i, &close)| OhlcvBar {
                date: day(i),
                open: close,
                high: close,
                low: close,
                close,
                volume: 100.0,
            })
            .collect();
        PriceSeries::new(bars).unwrap()
    }

    #[test]
    fn total_return_pct() {
        let m = BacktestMetrics::compute(&make_trace(1000.0, &[1000.0, 1100.0]), &vec![]);
        assert_relative_eq!(m.final_equity, 1100.0);
        assert_relative_eq!(m.total_return_pct, 10.0, epsilon = 1e-9);
    }

    #[test]
    fn sharpe_nan_for_zero_variance() {
        let m = BacktestMetrics::compute(&make_trace(1000.0, &[1000.0; 10]), &vec![]);
        assert!(m.annualized_sharpe.is_nan());
        assert_relative_eq!(m.total_return_pct, 0.0);
    }

    #[test]
    fn sharpe_nan_for_single_return() {
        let m = BacktestMetrics::compute(&make_trace(1000.0, &[1000.0, 1010.0]), &vec![]);
        assert!(m.annualized_sharpe.is_nan());
    }

    #[test]
    fn sharpe_uses_sample_std() {
        // returns: +10%, -10%, +20%  -> mean 0.0666.., sample std 0.152752..
        let trace = make_trace(100.0, &[100.0, 110.0, 99.0, 118.8]);
        let m = BacktestMetrics::compute(&trace, &vec![]);

        let returns = [0.1, -0.1, 0.2];
        let mean = returns.iter().sum::<f64>() / 3.0;
        let var = returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / 2.0;
        let expected = mean / var.sqrt() * 252f64.sqrt();
        assert_relative_eq!(m.annualized_sharpe, expected, epsilon = 1e-9);
    }

    #[test]
    fn max_drawdown_pct() {
        let trace = make_trace(100.0, &[100.0, 110.0, 90.0, 95.0, 80.0, 100.0]);
        let m = BacktestMetrics::compute(&trace, &vec![]);
        assert_relative_eq!(m.max_drawdown_pct, (110.0 - 80.0) / 110.0 * 100.0, epsilon = 1e-9);
    }

    #[test]
    fn trade_count_from_log() {
        let trade = TradeRecord {
            date: day(1),
            direction: TradeDirection::Buy,
            traded_shares: 100,
            fill_price: 10.0,
        };
        let m = BacktestMetrics::compute(&make_trace(1000.0, &[1000.0, 1000.0]), &vec![trade]);
        assert_eq!(m.trade_count, 1);
    }

    #[test]
    fn price_metrics_returns() {
        let prices = make_prices(&[100.0, 110.0, 99.0, 120.0]);
        let m = PriceMetrics::compute(&prices).unwrap();

        assert_relative_eq!(m.latest_close, 120.0);
        assert_relative_eq!(m.latest_change.unwrap(), 21.0);
        assert_relative_eq!(m.total_return_pct, 20.0, epsilon = 1e-9);
        assert_relative_eq!(m.annualized_return_pct, 20.0 * 252.0 / 4.0, epsilon = 1e-9);

        let expected_vol = sample_std(&prices.daily_returns()) * 252f64.sqrt() * 100.0;
        assert_relative_eq!(m.annualized_volatility_pct, expected_vol);
        assert!(m.annualized_volatility_pct > 0.0);
    }

    #[test]
    fn price_metrics_single_bar() {
        let m = PriceMetrics::compute(&make_prices(&[50.0])).unwrap();
        assert_eq!(m.latest_change, None);
        assert_relative_eq!(m.total_return_pct, 0.0);
        assert!(m.annualized_volatility_pct.is_nan());
    }

    #[test]
    fn price_metrics_empty() {
        assert!(matches!(
            PriceMetrics::compute(&PriceSeries::default()),
            Err(AlgoTraderError::InsufficientData { .. })
        ));
    }

    #[test]
    fn sample_std_basic() {
        assert_relative_eq!(
            sample_std(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]),
            (32.0f64 / 7.0).sqrt()
        );
        assert!(sample_std(&[1.0]).is_nan());
        assert!(mean(&[]).is_nan());
    }
}
