//! Fill pricing: slippage and commission applied by the simulated venue.

use crate::domain::ohlcv::OhlcvBar;
use crate::domain::order::{OrderSide, OrderType};

/// Cost model for simulated executions.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionConfig {
    pub commission_per_trade: f64,
    pub commission_pct: f64,
    pub slippage_pct: f64,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        ExecutionConfig {
            commission_per_trade: 0.0,
            commission_pct: 0.0,
            slippage_pct: 0.0,
        }
    }
}

/// Calculate commission: flat_fee + (trade_value * pct / 100).
pub fn calculate_commission(trade_value: f64, config: &ExecutionConfig) -> f64 {
    config.commission_per_trade + (trade_value * config.commission_pct / 100.0)
}

/// Move the price against the trader.
/// Buy: price * (1 + slippage_pct / 100). Sell: price * (1 - slippage_pct / 100).
pub fn apply_slippage(market_price: f64, side: OrderSide, slippage_pct: f64) -> f64 {
    match side {
        OrderSide::Buy => market_price * (1.0 + slippage_pct / 100.0),
        OrderSide::Sell => market_price * (1.0 - slippage_pct / 100.0),
    }
}

/// Price an order would fill at on `bar`, before slippage, or `None` if the
/// bar never reaches it. Only market and limit orders are priced.
pub fn fill_price(
    order_type: OrderType,
    side: OrderSide,
    limit_price: Option<f64>,
    bar: &OhlcvBar,
) -> Option<f64> {
    match (order_type, side) {
        (OrderType::Market, _) => Some(bar.open),
        (OrderType::Limit, OrderSide::Buy) => {
            let limit = limit_price?;
            (bar.low <= limit).then(|| bar.open.min(limit))
        }
        (OrderType::Limit, OrderSide::Sell) => {
            let limit = limit_price?;
            (bar.high >= limit).then(|| bar.open.max(limit))
        }
        (OrderType::Stop | OrderType::StopLimit, _) => None,
    }
}
