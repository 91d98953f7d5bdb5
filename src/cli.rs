//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::fmt::Write as _;
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{info, warn};

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::csv_report_adapter::CsvReportAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::backtest::{
    self as backtest_engine, BacktestConfig, BacktestResult, DEFAULT_INITIAL_CAPITAL,
    DEFAULT_LONG_WINDOW, DEFAULT_SHORT_WINDOW,
};
use crate::domain::config_validation::{
    parse_optional_date, validate_config, validate_config_fields,
};
use crate::domain::error::AlgoTraderError;
use crate::domain::indicator::ema::calculate_ema;
use crate::domain::indicator::sma::calculate_sma;
use crate::domain::indicator::{IndicatorSeries, IndicatorType};
use crate::domain::metrics::PriceMetrics;
use crate::domain::ohlcv::PriceSeries;
use crate::domain::summary::{describe, Column, ColumnSummary};
use crate::domain::sweep::{
    run_sweep, SweepGrid, SweepOutcome, DEFAULT_LONG_RANGE, DEFAULT_SHORT_RANGE,
};
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;
use crate::ports::report_port::ReportPort;

#[derive(Parser, Debug)]
#[command(name = "algotrader", about = "Moving-average crossover backtester")]
pub struct Cli {
    /// Log filter used when RUST_LOG is unset
    #[arg(long, global = true, default_value = "warn")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a single backtest
    Backtest {
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[arg(short, long)]
        data: Option<PathBuf>,
        #[arg(long)]
        short: Option<usize>,
        #[arg(long)]
        long: Option<usize>,
        #[arg(long)]
        capital: Option<f64>,
        /// Directory for equity_curve.csv and trades.csv
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Backtest every short/long window pair in the configured ranges
    Sweep {
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[arg(short, long)]
        data: Option<PathBuf>,
        #[arg(long, default_value_t = 10)]
        top: usize,
    },
    /// Price metrics, recent bars and column statistics
    Dashboard {
        #[arg(short, long)]
        data: PathBuf,
        #[arg(long, default_value_t = 10)]
        recent: usize,
    },
    /// Print SMA/EMA columns as CSV
    Indicators {
        #[arg(short, long)]
        data: PathBuf,
        #[arg(long)]
        sma: Vec<usize>,
        #[arg(long)]
        ema: Vec<usize>,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
}

/// Command-line values that take precedence over the config file.
#[derive(Debug, Clone, Copy, Default)]
pub struct BacktestOverrides {
    pub short_window: Option<usize>,
    pub long_window: Option<usize>,
    pub initial_capital: Option<f64>,
}

pub fn run(cli: Cli) -> ExitCode {
    let outcome = match cli.command {
        Command::Backtest {
            config,
            data,
            short,
            long,
            capital,
            output,
        } => {
            let overrides = BacktestOverrides {
                short_window: short,
                long_window: long,
                initial_capital: capital,
            };
            run_backtest(config.as_ref(), data.as_ref(), &overrides, output.as_ref())
        }
        Command::Sweep { config, data, top } => {
            run_sweep_command(config.as_ref(), data.as_ref(), top)
        }
        Command::Dashboard { data, recent } => run_dashboard(&data, recent),
        Command::Indicators { data, sma, ema } => run_indicators(&data, &sma, &ema),
        Command::Validate { config } => run_validate(&config),
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, AlgoTraderError> {
    FileConfigAdapter::from_file(path).map_err(|e| AlgoTraderError::ConfigParse {
        file: path.display().to_string(),
        reason: e.to_string(),
    })
}

/// Load the config file, or start from an empty one. Keys are checked one by
/// one; the window order is checked after command-line overrides are merged.
pub fn load_optional_config(path: Option<&PathBuf>) -> Result<FileConfigAdapter, AlgoTraderError> {
    let adapter = match path {
        Some(p) => {
            info!(path = %p.display(), "loading config");
            load_config(p)?
        }
        None => FileConfigAdapter::from_string("").map_err(|reason| {
            AlgoTraderError::ConfigParse {
                file: "<empty>".into(),
                reason,
            }
        })?,
    };
    validate_config_fields(&adapter)?;
    Ok(adapter)
}

fn config_usize(config: &dyn ConfigPort, section: &str, key: &str, default: usize) -> usize {
    // Negative values are rejected by validate_config_fields.
    config.get_int(section, key, default as i64).max(0) as usize
}

pub fn build_backtest_config(
    config: &dyn ConfigPort,
    overrides: &BacktestOverrides,
) -> Result<BacktestConfig, AlgoTraderError> {
    let bt = BacktestConfig {
        short_window: overrides.short_window.unwrap_or_else(|| {
            config_usize(config, "backtest", "short_window", DEFAULT_SHORT_WINDOW)
        }),
        long_window: overrides.long_window.unwrap_or_else(|| {
            config_usize(config, "backtest", "long_window", DEFAULT_LONG_WINDOW)
        }),
        initial_capital: overrides.initial_capital.unwrap_or_else(|| {
            config.get_double("backtest", "initial_capital", DEFAULT_INITIAL_CAPITAL)
        }),
    };
    bt.validate()?;
    Ok(bt)
}

pub fn build_sweep_grid(config: &dyn ConfigPort) -> SweepGrid {
    let (short_min, short_max) = DEFAULT_SHORT_RANGE;
    let (long_min, long_max) = DEFAULT_LONG_RANGE;
    SweepGrid {
        short_windows: config_usize(config, "sweep", "short_min", short_min)
            ..=config_usize(config, "sweep", "short_max", short_max),
        long_windows: config_usize(config, "sweep", "long_min", long_min)
            ..=config_usize(config, "sweep", "long_max", long_max),
        initial_capital: config.get_double("backtest", "initial_capital", DEFAULT_INITIAL_CAPITAL),
    }
}

pub fn resolve_data_path(
    config: &dyn ConfigPort,
    data_override: Option<&PathBuf>,
) -> Result<PathBuf, AlgoTraderError> {
    if let Some(path) = data_override {
        return Ok(path.clone());
    }
    match config.get_string("data", "path") {
        Some(p) if !p.trim().is_empty() => Ok(PathBuf::from(p.trim())),
        _ => Err(AlgoTraderError::ConfigMissing {
            section: "data".into(),
            key: "path".into(),
        }),
    }
}

/// Load the price series named by the config (or the override), honouring
/// the optional `[data]` date range.
pub fn load_prices(
    config: &dyn ConfigPort,
    data_override: Option<&PathBuf>,
) -> Result<PriceSeries, AlgoTraderError> {
    let path = resolve_data_path(config, data_override)?;
    let start = parse_optional_date(config, "data", "start_date")?;
    let end = parse_optional_date(config, "data", "end_date")?;
    CsvAdapter::new(path).fetch_prices(start, end)
}

fn fmt_ratio(value: f64) -> String {
    if value.is_finite() {
        format!("{value:.2}")
    } else {
        "n/a".to_string()
    }
}

pub fn format_backtest_summary(result: &BacktestResult) -> String {
    let m = &result.metrics;
    let mut out = String::new();
    let _ = writeln!(out, "=== Results: {} ===", result.strategy_name);
    let _ = writeln!(out, "Final Value:      {:.2}", m.final_equity);
    let _ = writeln!(out, "Total Return:     {:.2}%", m.total_return_pct);
    let _ = writeln!(out, "Sharpe Ratio:     {}", fmt_ratio(m.annualized_sharpe));
    let _ = writeln!(out, "Max Drawdown:     -{:.2}%", m.max_drawdown_pct);
    let _ = writeln!(out, "Total Trades:     {}", m.trade_count);

    if !result.trades.is_empty() {
        let _ = writeln!(out, "\n=== Trades Log ===");
        for t in &result.trades {
            let _ = writeln!(
                out,
                "  {}  {:<4}  {:>5} @ {:.2}",
                t.date,
                t.direction,
                t.traded_shares.abs(),
                t.fill_price
            );
        }
    }
    out
}

fn run_backtest(
    config_path: Option<&PathBuf>,
    data_override: Option<&PathBuf>,
    overrides: &BacktestOverrides,
    output_override: Option<&PathBuf>,
) -> Result<(), AlgoTraderError> {
    let config = load_optional_config(config_path)?;
    let bt_config = build_backtest_config(&config, overrides)?;
    let prices = load_prices(&config, data_override)?;

    let result = backtest_engine::run_backtest(&prices, &bt_config)?;
    print!("{}", format_backtest_summary(&result));

    let output_dir = output_override
        .cloned()
        .or_else(|| config.get_string("report", "output_dir").map(PathBuf::from));
    if let Some(dir) = output_dir {
        let files = CsvReportAdapter.write(&result, &dir)?;
        for file in files {
            println!("Wrote {}", file.display());
        }
    }
    Ok(())
}

pub fn format_sweep_table(outcomes: &[SweepOutcome], top: usize) -> String {
    let mut ranked: Vec<&SweepOutcome> = outcomes.iter().collect();
    // Highest Sharpe first; undefined Sharpe ratios sink to the bottom.
    ranked.sort_by(|a, b| {
        let key = |o: &SweepOutcome| {
            let s = o.metrics.annualized_sharpe;
            if s.is_nan() { f64::NEG_INFINITY } else { s }
        };
        key(b).total_cmp(&key(a))
    });

    let mut out = String::new();
    let _ = writeln!(out, "short  long  trades   return%   sharpe");
    for o in ranked.into_iter().take(top) {
        let _ = writeln!(
            out,
            "{:>5} {:>5} {:>7} {:>9.2} {:>8}",
            o.short_window,
            o.long_window,
            o.metrics.trade_count,
            o.metrics.total_return_pct,
            fmt_ratio(o.metrics.annualized_sharpe)
        );
    }
    out
}

fn run_sweep_command(
    config_path: Option<&PathBuf>,
    data_override: Option<&PathBuf>,
    top: usize,
) -> Result<(), AlgoTraderError> {
    let config = load_optional_config(config_path)?;
    let grid = build_sweep_grid(&config);
    let prices = load_prices(&config, data_override)?;

    let outcomes = run_sweep(&prices, &grid)?;
    print!("{}", format_sweep_table(&outcomes, top));

    match SweepOutcome::best_by_sharpe(&outcomes) {
        Some(best) => println!(
            "\nBest: short={} long={} sharpe={}",
            best.short_window,
            best.long_window,
            fmt_ratio(best.metrics.annualized_sharpe)
        ),
        None => warn!("no window pair produced a defined Sharpe ratio"),
    }
    Ok(())
}

pub fn format_dashboard(prices: &PriceSeries, recent: usize) -> Result<String, AlgoTraderError> {
    let m = PriceMetrics::compute(prices)?;
    let summaries = describe(prices)?;

    let mut out = String::new();
    let _ = writeln!(out, "=== Market Dashboard ===");
    match m.latest_change {
        Some(change) => {
            let _ = writeln!(out, "Current Price:         {:.2} ({:+.2})", m.latest_close, change);
        }
        None => {
            let _ = writeln!(out, "Current Price:         {:.2}", m.latest_close);
        }
    }
    let _ = writeln!(out, "Total Return:          {:.2}%", m.total_return_pct);
    let _ = writeln!(out, "Annualized Return:     {:.2}%", m.annualized_return_pct);
    let _ = writeln!(
        out,
        "Annualized Volatility: {}%",
        fmt_ratio(m.annualized_volatility_pct)
    );

    let _ = writeln!(out, "\n=== Recent Data ===");
    let _ = writeln!(
        out,
        "{:<10} {:>10} {:>10} {:>10} {:>10} {:>12}",
        "Date", "Open", "High", "Low", "Close", "Volume"
    );
    for bar in prices.tail(recent) {
        let _ = writeln!(
            out,
            "{:<10} {:>10.2} {:>10.2} {:>10.2} {:>10.2} {:>12.0}",
            bar.date, bar.open, bar.high, bar.low, bar.close, bar.volume
        );
    }

    let _ = writeln!(out, "\n=== Data Summary ===");
    let _ = write!(out, "{:<6}", "");
    for column in Column::ALL {
        let _ = write!(out, " {:>12}", column.to_string());
    }
    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "{:<6}{}",
        "count",
        summaries
            .iter()
            .map(|s| format!(" {:>12}", s.count))
            .collect::<String>()
    );
    let rows: [(&str, fn(&ColumnSummary) -> f64); 7] = [
        ("mean", |s| s.mean),
        ("std", |s| s.std),
        ("min", |s| s.min),
        ("25%", |s| s.p25),
        ("50%", |s| s.p50),
        ("75%", |s| s.p75),
        ("max", |s| s.max),
    ];
    for (label, get) in rows {
        let _ = write!(out, "{label:<6}");
        for s in &summaries {
            let _ = write!(out, " {:>12.2}", get(s));
        }
        let _ = writeln!(out);
    }
    Ok(out)
}

fn run_dashboard(data: &Path, recent: usize) -> Result<(), AlgoTraderError> {
    let prices = CsvAdapter::new(data.to_path_buf()).fetch_prices(None, None)?;
    print!("{}", format_dashboard(&prices, recent)?);
    Ok(())
}

/// Write `date,close,<indicator>...` rows; warm-up cells are left empty.
pub fn write_indicator_table<W: io::Write>(
    prices: &PriceSeries,
    indicators: &[IndicatorType],
    writer: W,
) -> Result<(), AlgoTraderError> {
    let series: Vec<IndicatorSeries> = indicators
        .iter()
        .map(|ind| match *ind {
            IndicatorType::Sma(period) => calculate_sma(prices, period),
            IndicatorType::Ema(span) => calculate_ema(prices, span),
        })
        .collect();

    let to_err = |e: csv::Error| AlgoTraderError::Report {
        reason: format!("failed to write indicator table: {e}"),
    };
    let mut wtr = csv::Writer::from_writer(writer);

    let mut header = vec!["date".to_string(), "close".to_string()];
    header.extend(indicators.iter().map(|i| i.to_string()));
    wtr.write_record(&header).map_err(to_err)?;

    for (i, bar) in prices.bars().iter().enumerate() {
        let mut row = vec![bar.date.to_string(), bar.close.to_string()];
        row.extend(
            series
                .iter()
                .map(|s| s.value_at(i).map(|v| v.to_string()).unwrap_or_default()),
        );
        wtr.write_record(&row).map_err(to_err)?;
    }
    wtr.flush()?;
    Ok(())
}

fn run_indicators(data: &Path, sma: &[usize], ema: &[usize]) -> Result<(), AlgoTraderError> {
    if sma.iter().chain(ema).any(|&n| n == 0) {
        return Err(AlgoTraderError::InvalidConfiguration {
            reason: "indicator periods must be at least 1".into(),
        });
    }
    let prices = CsvAdapter::new(data.to_path_buf()).fetch_prices(None, None)?;

    let mut indicators: Vec<IndicatorType> = sma.iter().map(|&n| IndicatorType::Sma(n)).collect();
    indicators.extend(ema.iter().map(|&n| IndicatorType::Ema(n)));

    write_indicator_table(&prices, &indicators, io::stdout().lock())
}

fn run_validate(config_path: &Path) -> Result<(), AlgoTraderError> {
    eprintln!("Validating config: {}", config_path.display());
    let config = load_optional_config(Some(&config_path.to_path_buf()))?;
    validate_config(&config)?;
    let bt = build_backtest_config(&config, &BacktestOverrides::default())?;
    let grid = build_sweep_grid(&config);

    println!(
        "data:     {}",
        config
            .get_string("data", "path")
            .unwrap_or_else(|| "<not set>".into())
    );
    println!("strategy: SMA crossover {}/{}", bt.short_window, bt.long_window);
    println!("capital:  {:.2}", bt.initial_capital);
    println!(
        "sweep:    short {:?}, long {:?} ({} pairs)",
        grid.short_windows,
        grid.long_windows,
        grid.pairs().len()
    );
    println!("\nConfiguration is valid.");
    Ok(())
}
