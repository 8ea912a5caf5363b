//! Simulated backtesting broker.
//!
//! Orders rest in the book until a later bar for their instrument arrives.
//! Market orders fill at that bar's open, limit orders when the bar trades
//! through the limit. A buy the cash cannot cover is never forced: good-till-
//! canceled orders keep waiting, day orders expire.

use crate::domain::execution::{
    ExecutionConfig, apply_slippage, calculate_commission, fill_price,
};
use crate::domain::feed::Bars;
use crate::domain::order::{
    ActiveOrder, EntryRequest, ExecutionResponse, FillEvent, OrderId, OrderSide, OrderType,
};
use crate::domain::portfolio::Portfolio;
use crate::ports::venue_port::{ExecutionVenue, SimulatedVenue};
use chrono::NaiveDateTime;
use log::{debug, info, warn};

pub struct SimBroker {
    config: ExecutionConfig,
    portfolio: Portfolio,
    orders: Vec<ActiveOrder>,
    next_id: OrderId,
    clock: Option<NaiveDateTime>,
}

enum Matched {
    Filled(FillEvent),
    Rest(ActiveOrder),
    Expired,
}

impl SimBroker {
    pub fn new(initial_capital: f64, config: ExecutionConfig) -> Self {
        SimBroker {
            config,
            portfolio: Portfolio::new(initial_capital),
            orders: Vec::new(),
            next_id: 1,
            clock: None,
        }
    }

    fn submit(
        &mut self,
        request: &EntryRequest,
        side: OrderSide,
        order_type: OrderType,
        limit_price: Option<f64>,
    ) -> ExecutionResponse {
        let id = self.next_id;
        self.next_id += 1;

        let accepted = request.quantity > 0;
        if accepted {
            debug!(
                "BROKER: Accepted {} {} order {} for {} shares of {}",
                order_type, side, id, request.quantity, request.symbol
            );
            self.orders.push(ActiveOrder {
                id,
                symbol: request.symbol.clone(),
                side,
                order_type,
                quantity: request.quantity,
                limit_price,
                good_till_canceled: request.good_till_canceled,
                submitted_at: self.clock,
            });
        } else {
            warn!(
                "BROKER: Rejected {} {} order for {} shares of {}",
                order_type, side, request.quantity, request.symbol
            );
        }

        ExecutionResponse {
            order_id: id,
            symbol: request.symbol.clone(),
            side,
            order_type,
            quantity: request.quantity,
            accepted,
        }
    }

    fn try_fill(&mut self, order: ActiveOrder, bars: &Bars) -> Matched {
        if order.submitted_at.is_some_and(|t| t >= bars.timestamp) {
            return Matched::Rest(order);
        }
        let Some(bar) = bars.get(&order.symbol) else {
            return Matched::Rest(order);
        };

        let Some(price) = fill_price(order.order_type, order.side, order.limit_price, bar) else {
            return self.unfilled(order, "price not reached");
        };
        let price = apply_slippage(price, order.side, self.config.slippage_pct);
        let value = order.quantity as f64 * price;
        let commission = calculate_commission(value, &self.config);

        if order.side == OrderSide::Buy && value + commission > self.portfolio.cash {
            info!(
                "BROKER: Debit failed of {:.2} cash for order {}, current balance of {:.2}",
                value + commission,
                order.id,
                self.portfolio.cash
            );
            return self.unfilled(order, "insufficient cash");
        }

        let signed = match order.side {
            OrderSide::Buy => order.quantity,
            OrderSide::Sell => -order.quantity,
        };
        self.portfolio.apply_fill(&order.symbol, signed, price, commission);
        info!(
            "BROKER: Filled {} {} {} at {:.2}, cash balance {:.2}",
            order.side, order.quantity, order.symbol, price, self.portfolio.cash
        );

        Matched::Filled(FillEvent {
            order_id: order.id,
            symbol: order.symbol,
            side: order.side,
            quantity: order.quantity,
            price,
            commission,
            timestamp: bars.timestamp,
        })
    }

    fn unfilled(&self, order: ActiveOrder, reason: &str) -> Matched {
        if order.good_till_canceled {
            Matched::Rest(order)
        } else {
            info!("BROKER: Day order {} for {} expired ({reason})", order.id, order.symbol);
            Matched::Expired
        }
    }
}

impl ExecutionVenue for SimBroker {
    fn cash(&self) -> f64 {
        self.portfolio.cash
    }

    fn equity(&self) -> f64 {
        self.portfolio.total_equity()
    }

    fn shares(&self, symbol: &str) -> i64 {
        self.portfolio.shares(symbol)
    }

    fn positions(&self) -> Vec<(String, i64)> {
        self.portfolio.sorted_positions()
    }

    fn active_orders(&self) -> Vec<ActiveOrder> {
        self.orders.clone()
    }

    fn cancel_order(&mut self, id: OrderId) -> bool {
        let before = self.orders.len();
        self.orders.retain(|o| o.id != id);
        let cancelled = self.orders.len() < before;
        if cancelled {
            debug!("BROKER: Cancelled order {id}");
        }
        cancelled
    }

    fn enter_long(&mut self, request: &EntryRequest) -> ExecutionResponse {
        self.submit(request, OrderSide::Buy, OrderType::Market, None)
    }

    fn enter_short(&mut self, request: &EntryRequest) -> ExecutionResponse {
        self.submit(request, OrderSide::Sell, OrderType::Market, None)
    }

    fn enter_long_limit(&mut self, request: &EntryRequest, limit_price: f64) -> ExecutionResponse {
        self.submit(request, OrderSide::Buy, OrderType::Limit, Some(limit_price))
    }

    fn enter_short_limit(&mut self, request: &EntryRequest, limit_price: f64) -> ExecutionResponse {
        self.submit(request, OrderSide::Sell, OrderType::Limit, Some(limit_price))
    }
}

impl SimulatedVenue for SimBroker {
    fn process_bars(&mut self, bars: &Bars) -> Vec<FillEvent> {
        let mut fills = Vec::new();
        let mut resting = Vec::with_capacity(self.orders.len());

        for order in std::mem::take(&mut self.orders) {
            match self.try_fill(order, bars) {
                Matched::Filled(fill) => fills.push(fill),
                Matched::Rest(order) => resting.push(order),
                Matched::Expired => {}
            }
        }
        self.orders = resting;

        for symbol in bars.symbols() {
            if let Some(bar) = bars.get(symbol) {
                self.portfolio.mark(symbol, bar.close);
            }
        }
        self.clock = Some(bars.timestamp);
        fills
    }
}
