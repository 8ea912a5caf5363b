//! Rotation scheduler: decides when to rebalance and what the new targets are.
//!
//! A rebalance fires on the first bar of every new calendar period (and on the
//! very first bar of a run). On that bar the scheduler cancels every active
//! order, splits equity evenly across asset classes, picks the best ranked
//! instrument per class, and records the share delta needed to reach each
//! target. Held instruments that were not picked are marked for liquidation.
//! The resulting [`PendingDeltaTable`] replaces the previous one outright.

use crate::domain::error::RotatorError;
use crate::domain::pending::{DeltaKind, PendingDeltaTable};
use crate::domain::rank::top_ranked;
use crate::domain::series::InstrumentHistory;
use crate::domain::sizer::round_cents;
use crate::domain::universe::Universe;
use crate::ports::venue_port::ExecutionVenue;
use chrono::{Datelike, NaiveDateTime};
use log::{info, warn};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RebalancePeriod {
    Month,
}

/// Identifies one calendar period, e.g. (2024, 3) for March 2024.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct PeriodMarker {
    pub year: i32,
    pub index: u32,
}

impl RebalancePeriod {
    pub fn marker(&self, timestamp: NaiveDateTime) -> PeriodMarker {
        match self {
            RebalancePeriod::Month => PeriodMarker {
                year: timestamp.year(),
                index: timestamp.month(),
            },
        }
    }
}

impl FromStr for RebalancePeriod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "month" | "monthly" => Ok(RebalancePeriod::Month),
            other => Err(format!("unsupported rebalance period '{other}'")),
        }
    }
}

impl fmt::Display for RebalancePeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RebalancePeriod::Month => write!(f, "month"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    Idle,
    Rebalancing,
}

/// Summary of one rebalance.
#[derive(Debug, Clone, PartialEq)]
pub struct RebalanceDecision {
    pub cycle: u32,
    pub timestamp: NaiveDateTime,
    pub cancelled_orders: usize,
    pub cash_per_class: f64,
    /// Asset class name to its selected instrument, in universe order.
    pub top_by_class: Vec<(String, Option<String>)>,
    pub pending: PendingDeltaTable,
}

#[derive(Debug, Clone)]
pub struct RotationScheduler {
    period: RebalancePeriod,
    lookback: usize,
    state: SchedulerState,
    last_period: Option<PeriodMarker>,
    cycle: u32,
    pending: PendingDeltaTable,
}

impl RotationScheduler {
    pub fn new(period: RebalancePeriod, lookback: usize) -> Self {
        RotationScheduler {
            period,
            lookback,
            state: SchedulerState::Idle,
            last_period: None,
            cycle: 0,
            pending: PendingDeltaTable::new(),
        }
    }

    pub fn state(&self) -> SchedulerState {
        self.state
    }

    /// Number of rebalances triggered so far; also the current cycle id.
    pub fn cycle(&self) -> u32 {
        self.cycle
    }

    pub fn last_period(&self) -> Option<PeriodMarker> {
        self.last_period
    }

    pub fn pending(&self) -> &PendingDeltaTable {
        &self.pending
    }

    /// Hand the pending table to the sizer. Must be returned with [`Self::restore_pending`].
    pub fn take_pending(&mut self) -> PendingDeltaTable {
        std::mem::take(&mut self.pending)
    }

    pub fn restore_pending(&mut self, table: PendingDeltaTable) {
        self.pending = table;
    }

    pub fn should_rebalance(&self, timestamp: NaiveDateTime) -> bool {
        self.last_period != Some(self.period.marker(timestamp))
    }

    /// Run the trigger check for this bar, rebalancing if it fires.
    pub fn on_bar(
        &mut self,
        timestamp: NaiveDateTime,
        universe: &Universe,
        histories: &HashMap<String, InstrumentHistory>,
        venue: &mut dyn ExecutionVenue,
    ) -> Result<Option<RebalanceDecision>, RotatorError> {
        if !self.should_rebalance(timestamp) {
            return Ok(None);
        }
        self.state = SchedulerState::Rebalancing;
        self.last_period = Some(self.period.marker(timestamp));
        self.cycle += 1;
        let decision = self.rebalance(timestamp, universe, histories, venue);
        self.state = SchedulerState::Idle;
        decision.map(Some)
    }

    fn rebalance(
        &mut self,
        timestamp: NaiveDateTime,
        universe: &Universe,
        histories: &HashMap<String, InstrumentHistory>,
        venue: &mut dyn ExecutionVenue,
    ) -> Result<RebalanceDecision, RotatorError> {
        info!("Rebalancing (cycle {}) at {}", self.cycle, timestamp);

        let mut cancelled_orders = 0;
        for order in venue.active_orders() {
            if venue.cancel_order(order.id) {
                cancelled_orders += 1;
            }
        }

        let cash_per_class = round_cents(venue.equity() / universe.count() as f64);
        let mut pending = PendingDeltaTable::new();
        let mut top_by_class = Vec::with_capacity(universe.count());

        for class in universe.classes() {
            let top = top_ranked(&class.candidates, histories, self.lookback);
            info!("Best for class {}: {}", class.name, top.unwrap_or("None"));
            top_by_class.push((class.name.clone(), top.map(str::to_string)));

            let Some(symbol) = top else {
                continue;
            };
            let Some(last_price) = histories.get(symbol).and_then(InstrumentHistory::last_price)
            else {
                warn!("no last price for {symbol}, leaving it out of this cycle");
                continue;
            };
            let held = venue.shares(symbol);
            let cash_for_instrument = round_cents(cash_per_class - held as f64 * last_price);
            let delta = (cash_for_instrument / last_price).floor() as i64;
            pending
                .insert(symbol, DeltaKind::Resize, delta)
                .map_err(|_| RotatorError::PendingCollision {
                    symbol: symbol.to_string(),
                    cycle: self.cycle,
                })?;
        }

        for (symbol, shares) in venue.positions() {
            let selected = top_by_class
                .iter()
                .any(|(_, top)| top.as_deref() == Some(symbol.as_str()));
            if selected || shares == 0 {
                continue;
            }
            pending
                .insert(&symbol, DeltaKind::Liquidate, -shares)
                .map_err(|_| RotatorError::PendingCollision {
                    symbol: symbol.clone(),
                    cycle: self.cycle,
                })?;
        }

        self.pending = pending.clone();

        Ok(RebalanceDecision {
            cycle: self.cycle,
            timestamp,
            cancelled_orders,
            cash_per_class,
            top_by_class,
            pending,
        })
    }
}
