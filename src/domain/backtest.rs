//! Backtest driver: replays a bar feed through the strategy and a simulated venue.
//!
//! Each step runs in a fixed order: the venue matches resting orders against
//! the new bars, fills are reported to the strategy, the strategy rebalances
//! and sizes, then broker state is logged and the equity point recorded.

use crate::domain::error::RotatorError;
use crate::domain::feed::BarFeed;
use crate::domain::order::FillEvent;
use crate::domain::portfolio::EquityPoint;
use crate::domain::strategy::RotationStrategy;
use crate::ports::venue_port::SimulatedVenue;
use chrono::NaiveDate;
use log::info;

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestConfig {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub initial_capital: f64,
    pub commission_per_trade: f64,
    pub commission_pct: f64,
    pub slippage_pct: f64,
    pub risk_free_rate: f64,
    pub benchmark: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestResult {
    pub equity_curve: Vec<EquityPoint>,
    pub fills: Vec<FillEvent>,
    pub orders_submitted: usize,
    pub rebalances: u32,
    pub final_positions: Vec<(String, i64)>,
    pub final_equity: f64,
    pub final_cash: f64,
}

pub fn run_backtest<V: SimulatedVenue>(
    feed: &BarFeed,
    strategy: &mut RotationStrategy,
    venue: &mut V,
) -> Result<BacktestResult, RotatorError> {
    let mut equity_curve = Vec::with_capacity(feed.len());
    let mut fills = Vec::new();
    let mut orders_submitted = 0;

    for bars in feed.iter() {
        let step_fills = venue.process_bars(&bars);
        for fill in &step_fills {
            strategy.on_fill(fill);
        }
        fills.extend(step_fills);

        let report = strategy.on_bars(&bars, venue)?;
        orders_submitted += report.orders_submitted;

        for order in venue.active_orders() {
            info!("active order: {:?}", order);
        }
        let equity = venue.equity();
        info!("{} total value: {:.2}", bars.timestamp, equity);

        equity_curve.push(EquityPoint {
            timestamp: bars.timestamp,
            equity,
            cash: venue.cash(),
        });
    }

    let final_equity = venue.equity();
    info!("Final portfolio value: ${:.2}", final_equity);

    Ok(BacktestResult {
        equity_curve,
        fills,
        orders_submitted,
        rebalances: strategy.scheduler().cycle(),
        final_positions: venue.positions(),
        final_equity,
        final_cash: venue.cash(),
    })
}
