//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use log::{info, warn};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::csv_report_adapter::CsvReportAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::sim_broker::SimBroker;
use crate::domain::backtest::{BacktestResult, run_backtest};
use crate::domain::config_validation::{ValidatedConfig, validate_config, validate_data_dir};
use crate::domain::error::RotatorError;
use crate::domain::execution::ExecutionConfig;
use crate::domain::feed::BarFeed;
use crate::domain::metrics::Metrics;
use crate::domain::strategy::RotationStrategy;
use crate::ports::data_port::DataPort;
use crate::ports::report_port::ReportPort;

#[derive(Parser, Debug)]
#[command(name = "rotator", about = "Monthly multi-asset-class rotation backtester")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a backtest
    Backtest {
        #[arg(short, long)]
        config: PathBuf,
        /// Write the equity curve as CSV
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Validate a configuration without loading data
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// List instruments with a CSV file in the data directory
    ListSymbols {
        #[arg(short, long)]
        config: PathBuf,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    let outcome = match cli.command {
        Command::Backtest { config, output } => run_backtest_command(&config, output.as_deref()),
        Command::Validate { config } => run_validate(&config),
        Command::ListSymbols { config } => run_list_symbols(&config),
    };
    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, RotatorError> {
    info!("Loading config from {}", path.display());
    FileConfigAdapter::from_file(path)
}

fn run_backtest_command(
    config_path: &Path,
    output_path: Option<&Path>,
) -> Result<(), RotatorError> {
    let adapter = load_config(config_path)?;
    let validated = validate_config(&adapter)?;
    let data_port = CsvAdapter::new(PathBuf::from(validate_data_dir(&adapter)?));

    let (result, metrics) = run_backtest_pipeline(&data_port, &validated)?;
    print_summary(&result, &metrics);

    if let Some(path) = output_path {
        CsvReportAdapter::new().write(&result, &metrics, &path.display().to_string())?;
        eprintln!("\nReport written to: {}", path.display());
    }
    Ok(())
}

/// Load every universe instrument, replay the feed through a simulated
/// broker, and compute the run's metrics.
pub fn run_backtest_pipeline(
    data_port: &dyn DataPort,
    validated: &ValidatedConfig,
) -> Result<(BacktestResult, Metrics), RotatorError> {
    let bt = &validated.backtest;

    let mut bars_by_symbol = Vec::with_capacity(validated.universe.symbols().len());
    for symbol in validated.universe.symbols() {
        let bars = data_port.fetch_ohlcv(&symbol, bt.start_date, bt.end_date)?;
        info!("{}: {} bars", symbol, bars.len());
        bars_by_symbol.push((symbol, bars));
    }

    let benchmark_closes = match &bt.benchmark {
        Some(symbol) => match data_port.fetch_ohlcv(symbol, bt.start_date, bt.end_date) {
            Ok(bars) => Some(bars.iter().map(|b| b.close).collect::<Vec<f64>>()),
            Err(e) => {
                warn!("benchmark {symbol} unavailable: {e}");
                None
            }
        },
        None => None,
    };

    let feed = BarFeed::from_bars(bars_by_symbol);
    info!(
        "Running backtest: {} instruments in {} asset classes, {} to {}, {} steps",
        validated.universe.symbols().len(),
        validated.universe.count(),
        bt.start_date,
        bt.end_date,
        feed.len()
    );

    let mut strategy =
        RotationStrategy::new(validated.strategy.clone(), validated.universe.clone());
    let mut broker = SimBroker::new(
        bt.initial_capital,
        ExecutionConfig {
            commission_per_trade: bt.commission_per_trade,
            commission_pct: bt.commission_pct,
            slippage_pct: bt.slippage_pct,
        },
    );
    let result = run_backtest(&feed, &mut strategy, &mut broker)?;

    let mut metrics = Metrics::compute(
        &result.equity_curve,
        &result.fills,
        bt.initial_capital,
        bt.risk_free_rate,
    );
    if let Some(closes) = benchmark_closes {
        metrics = metrics.with_benchmark(&closes);
    }
    Ok((result, metrics))
}

fn print_summary(result: &BacktestResult, metrics: &Metrics) {
    eprintln!("\n=== Results ===");
    eprintln!("Final portfolio value: ${:.2}", result.final_equity);
    eprintln!("Sharpe ratio:     {:.2}", metrics.sharpe_ratio);
    eprintln!("Returns:          {:.2} %", metrics.total_return * 100.0);
    eprintln!("Annualized:       {:.2} %", metrics.annualized_return * 100.0);
    eprintln!("Max Drawdown:     -{:.1} %", metrics.max_drawdown * 100.0);
    eprintln!("Rebalances:       {}", result.rebalances);
    eprintln!(
        "Orders / fills:   {} / {} ({} buys, {} sells)",
        result.orders_submitted,
        result.fills.len(),
        metrics.buy_fills,
        metrics.sell_fills
    );
    if let Some(benchmark) = metrics.benchmark_return {
        eprintln!("Benchmark:        {:.2} %", benchmark * 100.0);
    }
    if !result.final_positions.is_empty() {
        eprintln!("\n=== Final Positions ===");
        for (symbol, shares) in &result.final_positions {
            eprintln!("  {symbol}: {shares}");
        }
    }
}

fn run_validate(config_path: &Path) -> Result<(), RotatorError> {
    let adapter = load_config(config_path)?;
    let validated = validate_config(&adapter)?;

    let bt = &validated.backtest;
    let st = &validated.strategy;
    println!("Period:           {} to {}", bt.start_date, bt.end_date);
    println!("Initial capital:  {:.2}", bt.initial_capital);
    println!(
        "Strategy:         lookback {}, trend filter {}, cash buffer {:.2}, rebalance every {}",
        st.lookback, st.trend_filter_window, st.cash_buffer, st.rebalance_period
    );
    println!("Orders:           {} {}", st.order_type, st.time_in_force);
    println!("Asset classes:");
    for class in validated.universe.classes() {
        println!("  {}: {}", class.name, class.candidates.join(", "));
    }
    eprintln!("Configuration is valid.");
    Ok(())
}

fn run_list_symbols(config_path: &Path) -> Result<(), RotatorError> {
    let adapter = load_config(config_path)?;
    let data_port = CsvAdapter::new(PathBuf::from(validate_data_dir(&adapter)?));
    let symbols = data_port.list_symbols()?;
    if symbols.is_empty() {
        eprintln!("No symbols found");
    } else {
        for symbol in &symbols {
            println!("{}", symbol);
        }
        eprintln!("{} symbols found", symbols.len());
    }
    Ok(())
}
