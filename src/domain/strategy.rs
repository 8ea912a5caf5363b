//! Rotation strategy: the per-bar composition of scheduler, sizer and dispatcher.

use crate::domain::dispatch::OrderDispatcher;
use crate::domain::error::RotatorError;
use crate::domain::feed::Bars;
use crate::domain::order::{FillEvent, OrderSide, OrderType, TimeInForce};
use crate::domain::scheduler::{RebalanceDecision, RebalancePeriod, RotationScheduler};
use crate::domain::series::InstrumentHistory;
use crate::domain::sizer::{DEFAULT_CASH_BUFFER, OrderSizer};
use crate::domain::universe::Universe;
use crate::ports::venue_port::ExecutionVenue;
use log::info;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq)]
pub struct StrategyConfig {
    pub lookback: usize,
    pub trend_filter_window: usize,
    pub cash_buffer: f64,
    pub rebalance_period: RebalancePeriod,
    pub order_type: OrderType,
    pub time_in_force: TimeInForce,
}

impl Default for StrategyConfig {
    fn default() -> Self {
        StrategyConfig {
            lookback: 20,
            trend_filter_window: 200,
            cash_buffer: DEFAULT_CASH_BUFFER,
            rebalance_period: RebalancePeriod::Month,
            order_type: OrderType::Market,
            time_in_force: TimeInForce::GoodTillCanceled,
        }
    }
}

/// What happened on one bar.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StepReport {
    pub rebalance: Option<RebalanceDecision>,
    pub orders_submitted: usize,
    pub deferred: Vec<String>,
}

#[derive(Debug)]
pub struct RotationStrategy {
    universe: Universe,
    histories: HashMap<String, InstrumentHistory>,
    scheduler: RotationScheduler,
    sizer: OrderSizer,
    dispatcher: OrderDispatcher,
}

impl RotationStrategy {
    pub fn new(config: StrategyConfig, universe: Universe) -> Self {
        let histories = universe
            .symbols()
            .into_iter()
            .map(|symbol| (symbol, InstrumentHistory::new(config.trend_filter_window)))
            .collect();
        let scheduler = RotationScheduler::new(config.rebalance_period, config.lookback);
        let sizer = OrderSizer::new(config.cash_buffer, config.order_type, config.time_in_force);
        RotationStrategy {
            universe,
            histories,
            scheduler,
            sizer,
            dispatcher: OrderDispatcher::new(),
        }
    }

    pub fn scheduler(&self) -> &RotationScheduler {
        &self.scheduler
    }

    pub fn last_price(&self, symbol: &str) -> Option<f64> {
        self.histories.get(symbol).and_then(InstrumentHistory::last_price)
    }

    /// Advance one bar: record closes, rebalance if the period rolled over,
    /// then drain pending deltas into orders.
    pub fn on_bars(
        &mut self,
        bars: &Bars,
        venue: &mut dyn ExecutionVenue,
    ) -> Result<StepReport, RotatorError> {
        for (symbol, history) in self.histories.iter_mut() {
            if let Some(bar) = bars.get(symbol) {
                history.push(bar.close);
            }
        }

        let rebalance = self
            .scheduler
            .on_bar(bars.timestamp, &self.universe, &self.histories, venue)?;
        if rebalance.is_some() {
            self.log_position_weights(venue);
        }

        let table = self.scheduler.take_pending();
        let outcome = self.sizer.drain(
            table,
            self.scheduler.cycle(),
            &self.histories,
            venue,
            &self.dispatcher,
        )?;
        self.scheduler.restore_pending(outcome.table);

        Ok(StepReport {
            rebalance,
            orders_submitted: outcome.submitted.len(),
            deferred: outcome.deferred,
        })
    }

    /// Route a venue execution to the entry or exit hook.
    pub fn on_fill(&self, fill: &FillEvent) {
        match fill.side {
            OrderSide::Buy => self.on_enter_ok(fill),
            OrderSide::Sell => self.on_exit_ok(fill),
        }
    }

    fn on_enter_ok(&self, fill: &FillEvent) {
        info!("BUY {} {} at ${:.2}", fill.quantity, fill.symbol, fill.price);
    }

    fn on_exit_ok(&self, fill: &FillEvent) {
        info!("SELL {} {} at ${:.2}", fill.quantity, fill.symbol, fill.price);
    }

    fn log_position_weights(&self, venue: &dyn ExecutionVenue) {
        let equity = venue.equity();
        if equity <= 0.0 {
            return;
        }
        for (symbol, shares) in venue.positions() {
            let Some(price) = self.last_price(&symbol) else {
                continue;
            };
            info!("{} - {:.2} %", symbol, shares as f64 * price / equity * 100.0);
        }
    }
}
