//! Cash-constrained order sizing.
//!
//! Runs on every bar. Each non-zero pending delta becomes at most one order:
//! buys are shrunk one share at a time until they fit the buffered cash left
//! for this bar, sells always go out in full. The table entry is reduced by
//! exactly what was submitted, so a target too large for today's cash is
//! finished on later bars.

use crate::domain::dispatch::OrderDispatcher;
use crate::domain::error::RotatorError;
use crate::domain::order::{ExecutionResponse, Order, OrderType, TimeInForce};
use crate::domain::pending::PendingDeltaTable;
use crate::domain::series::InstrumentHistory;
use crate::ports::venue_port::ExecutionVenue;
use log::{debug, info, warn};
use std::collections::HashMap;

pub const DEFAULT_CASH_BUFFER: f64 = 0.90;

/// Round to currency precision.
pub fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Reduce `quantity` by one share at a time while it costs more than
/// `remaining_cash`. Returns the fitted quantity and the number of reductions.
pub fn shrink_to_fit(quantity: i64, price: f64, remaining_cash: f64) -> (i64, u64) {
    let mut fitted = quantity.max(0);
    let mut iterations = 0;
    while fitted > 0 && fitted as f64 * price > remaining_cash {
        fitted -= 1;
        iterations += 1;
    }
    (fitted, iterations)
}

/// What one sizing pass did.
#[derive(Debug, Clone, PartialEq)]
pub struct SizingOutcome {
    pub table: PendingDeltaTable,
    pub submitted: Vec<ExecutionResponse>,
    /// Symbols left untouched this bar (no cash for a share, or no price yet).
    pub deferred: Vec<String>,
    pub remaining_cash: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderSizer {
    pub cash_buffer: f64,
    pub order_type: OrderType,
    pub time_in_force: TimeInForce,
}

impl Default for OrderSizer {
    fn default() -> Self {
        OrderSizer {
            cash_buffer: DEFAULT_CASH_BUFFER,
            order_type: OrderType::Market,
            time_in_force: TimeInForce::GoodTillCanceled,
        }
    }
}

impl OrderSizer {
    pub fn new(cash_buffer: f64, order_type: OrderType, time_in_force: TimeInForce) -> Self {
        OrderSizer {
            cash_buffer,
            order_type,
            time_in_force,
        }
    }

    /// Drain `table` into orders against the venue's current cash.
    ///
    /// The table is handed back in the outcome with every submitted quantity
    /// subtracted. A dispatch failure or a negative cash balance aborts the
    /// pass; both are fatal for the run.
    pub fn drain(
        &self,
        mut table: PendingDeltaTable,
        cycle: u32,
        histories: &HashMap<String, InstrumentHistory>,
        venue: &mut dyn ExecutionVenue,
        dispatcher: &OrderDispatcher,
    ) -> Result<SizingOutcome, RotatorError> {
        let cash = venue.cash();
        if cash < 0.0 {
            warn!("venue cash is negative ({cash:.2}), no buys this bar");
        }
        let mut remaining_cash = round_cents(cash.max(0.0) * self.cash_buffer);
        if table.is_exhausted() {
            return Ok(SizingOutcome {
                table,
                submitted: Vec::new(),
                deferred: Vec::new(),
                remaining_cash,
            });
        }
        let mut submitted = Vec::new();
        let mut deferred = Vec::new();

        let work: Vec<(String, i64)> = table
            .entries()
            .iter()
            .filter(|e| e.remaining != 0)
            .map(|e| (e.symbol.clone(), e.remaining))
            .collect();

        for (symbol, delta) in work {
            let Some(price) = histories.get(&symbol).and_then(InstrumentHistory::last_price) else {
                warn!("no price for {symbol} yet, deferring {delta} shares");
                deferred.push(symbol);
                continue;
            };

            let quantity = if delta > 0 {
                let (fitted, iterations) = shrink_to_fit(delta, price, remaining_cash);
                if fitted == 0 {
                    debug!(
                        "not enough cash for one share of {symbol} at {price:.2} ({remaining_cash:.2} left)"
                    );
                    deferred.push(symbol);
                    continue;
                }
                if iterations > 0 {
                    debug!("shrunk {symbol} buy from {delta} to {fitted} shares");
                }
                remaining_cash -= fitted as f64 * price;
                if remaining_cash < 0.0 {
                    return Err(RotatorError::NegativeCash {
                        symbol,
                        remaining: remaining_cash,
                        cycle,
                    });
                }
                fitted
            } else {
                delta
            };

            let limit_price = (self.order_type == OrderType::Limit).then_some(price);
            let order = Order::from_delta(
                &symbol,
                quantity,
                self.order_type,
                limit_price,
                self.time_in_force,
            );
            info!(
                "Placing {} order for {} {} shares",
                self.order_type.to_string().to_lowercase(),
                quantity,
                symbol
            );
            let response = dispatcher
                .dispatch(&order, venue)
                .map_err(|source| RotatorError::Dispatch { cycle, source })?;
            table.consume(&symbol, order.signed_quantity());
            submitted.push(response);
        }

        Ok(SizingOutcome {
            table,
            submitted,
            deferred,
            remaining_cash,
        })
    }
}
