//! Configuration validation.
//!
//! Every field is checked before any data is loaded. Each validator returns
//! the typed value it checked so callers never re-read raw strings.

use crate::domain::backtest::BacktestConfig;
use crate::domain::error::RotatorError;
use crate::domain::order::{OrderType, TimeInForce};
use crate::domain::scheduler::RebalancePeriod;
use crate::domain::strategy::StrategyConfig;
use crate::domain::universe::Universe;
use crate::ports::config_port::ConfigPort;
use chrono::NaiveDate;
use std::str::FromStr;

const BACKTEST: &str = "backtest";
const STRATEGY: &str = "strategy";

/// Everything a run needs from the config file.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedConfig {
    pub backtest: BacktestConfig,
    pub strategy: StrategyConfig,
    pub universe: Universe,
}

pub fn validate_config(config: &dyn ConfigPort) -> Result<ValidatedConfig, RotatorError> {
    Ok(ValidatedConfig {
        backtest: validate_backtest_config(config)?,
        strategy: validate_strategy_config(config)?,
        universe: Universe::from_config(config)?,
    })
}

pub fn validate_backtest_config(config: &dyn ConfigPort) -> Result<BacktestConfig, RotatorError> {
    let initial_capital = read_f64(config, BACKTEST, "initial_capital", 10_000.0)?;
    if initial_capital <= 0.0 {
        return Err(invalid(BACKTEST, "initial_capital", "initial_capital must be positive"));
    }

    let commission_per_trade = read_non_negative(config, BACKTEST, "commission_per_trade")?;
    let commission_pct = read_non_negative(config, BACKTEST, "commission_pct")?;
    let slippage_pct = read_non_negative(config, BACKTEST, "slippage_pct")?;

    let risk_free_rate = read_f64(config, BACKTEST, "risk_free_rate", 0.05)?;
    if !(0.0..1.0).contains(&risk_free_rate) {
        return Err(invalid(BACKTEST, "risk_free_rate", "risk_free_rate must be between 0 and 1"));
    }

    let start_date = parse_date(config, "start_date")?;
    let end_date = parse_date(config, "end_date")?;
    if start_date >= end_date {
        return Err(invalid(BACKTEST, "start_date", "start_date must be before end_date"));
    }

    let benchmark = config
        .get_string(BACKTEST, "benchmark")
        .map(|s| s.trim().to_uppercase())
        .filter(|s| !s.is_empty());

    Ok(BacktestConfig {
        start_date,
        end_date,
        initial_capital,
        commission_per_trade,
        commission_pct,
        slippage_pct,
        risk_free_rate,
        benchmark,
    })
}

pub fn validate_strategy_config(config: &dyn ConfigPort) -> Result<StrategyConfig, RotatorError> {
    let defaults = StrategyConfig::default();

    let lookback = read_positive_usize(config, "lookback", defaults.lookback)?;
    let trend_filter_window =
        read_positive_usize(config, "trend_filter_window", defaults.trend_filter_window)?;

    let cash_buffer = read_f64(config, STRATEGY, "cash_buffer", defaults.cash_buffer)?;
    if cash_buffer <= 0.0 || cash_buffer > 1.0 {
        return Err(invalid(STRATEGY, "cash_buffer", "cash_buffer must be in (0, 1]"));
    }

    Ok(StrategyConfig {
        lookback,
        trend_filter_window,
        cash_buffer,
        rebalance_period: read_parsed::<RebalancePeriod>(
            config,
            "rebalance_period",
            defaults.rebalance_period,
        )?,
        order_type: read_parsed::<OrderType>(config, "order_type", defaults.order_type)?,
        time_in_force: read_parsed::<TimeInForce>(config, "time_in_force", defaults.time_in_force)?,
    })
}

/// Directory holding one `<SYMBOL>.csv` per instrument.
pub fn validate_data_dir(config: &dyn ConfigPort) -> Result<String, RotatorError> {
    match config.get_string(BACKTEST, "data_dir") {
        Some(dir) if !dir.trim().is_empty() => Ok(dir.trim().to_string()),
        _ => Err(RotatorError::ConfigMissing {
            section: BACKTEST.to_string(),
            key: "data_dir".to_string(),
        }),
    }
}

fn invalid(section: &str, key: &str, reason: &str) -> RotatorError {
    RotatorError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.to_string(),
    }
}

fn read_f64(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: f64,
) -> Result<f64, RotatorError> {
    match config.get_string(section, key) {
        None => Ok(default),
        Some(raw) => match raw.trim().parse::<f64>() {
            Ok(v) if v.is_finite() => Ok(v),
            _ => Err(invalid(section, key, &format!("'{raw}' is not a number"))),
        },
    }
}

fn read_non_negative(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
) -> Result<f64, RotatorError> {
    let value = read_f64(config, section, key, 0.0)?;
    if value < 0.0 {
        return Err(invalid(section, key, &format!("{key} must be non-negative")));
    }
    Ok(value)
}

fn read_positive_usize(
    config: &dyn ConfigPort,
    key: &str,
    default: usize,
) -> Result<usize, RotatorError> {
    match config.get_string(STRATEGY, key) {
        None => Ok(default),
        Some(raw) => match raw.trim().parse::<usize>() {
            Ok(v) if v >= 1 => Ok(v),
            _ => Err(invalid(STRATEGY, key, &format!("{key} must be a positive integer"))),
        },
    }
}

fn read_parsed<T>(config: &dyn ConfigPort, key: &str, default: T) -> Result<T, RotatorError>
where
    T: FromStr<Err = String>,
{
    match config.get_string(STRATEGY, key) {
        None => Ok(default),
        Some(raw) => T::from_str(&raw).map_err(|reason| invalid(STRATEGY, key, &reason)),
    }
}

fn parse_date(config: &dyn ConfigPort, field: &str) -> Result<NaiveDate, RotatorError> {
    match config.get_string(BACKTEST, field) {
        None => Err(RotatorError::ConfigMissing {
            section: BACKTEST.to_string(),
            key: field.to_string(),
        }),
        Some(s) => NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").map_err(|_| {
            invalid(
                BACKTEST,
                field,
                &format!("invalid {field} format, expected YYYY-MM-DD"),
            )
        }),
    }
}
