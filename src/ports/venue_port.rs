//! Execution venue port traits.
//!
//! The decision core only sees [`ExecutionVenue`]: it reads cash, equity and
//! positions, cancels orders, and submits entries. Broker state is changed
//! solely by the venue executing those entries.

use crate::domain::feed::Bars;
use crate::domain::order::{ActiveOrder, EntryRequest, ExecutionResponse, FillEvent, OrderId};

pub trait ExecutionVenue {
    fn cash(&self) -> f64;
    fn equity(&self) -> f64;
    fn shares(&self, symbol: &str) -> i64;
    /// Non-zero holdings, ordered by symbol.
    fn positions(&self) -> Vec<(String, i64)>;
    fn active_orders(&self) -> Vec<ActiveOrder>;
    /// Returns false when no active order has that id.
    fn cancel_order(&mut self, id: OrderId) -> bool;

    fn enter_long(&mut self, request: &EntryRequest) -> ExecutionResponse;
    fn enter_short(&mut self, request: &EntryRequest) -> ExecutionResponse;
    fn enter_long_limit(&mut self, request: &EntryRequest, limit_price: f64) -> ExecutionResponse;
    fn enter_short_limit(&mut self, request: &EntryRequest, limit_price: f64) -> ExecutionResponse;
}

/// A venue driven by the backtest clock.
pub trait SimulatedVenue: ExecutionVenue {
    /// Match active orders against the incoming bars and mark positions to
    /// their closes. Returns the executions that happened on this step.
    fn process_bars(&mut self, bars: &Bars) -> Vec<FillEvent>;
}
