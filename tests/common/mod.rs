#![allow(dead_code)]

use chrono::{Duration, NaiveDate, NaiveDateTime};
use rotator::domain::error::RotatorError;
use rotator::domain::feed::Bars;
pub use rotator::domain::ohlcv::OhlcvBar;
use rotator::domain::order::{
    ActiveOrder, EntryRequest, ExecutionResponse, OrderId, OrderSide, OrderType,
};
use rotator::domain::series::InstrumentHistory;
use rotator::domain::universe::{AssetClass, Universe};
use rotator::ports::data_port::DataPort;
use rotator::ports::venue_port::ExecutionVenue;
use std::collections::HashMap;

pub struct MockDataPort {
    pub data: HashMap<String, Vec<OhlcvBar>>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
        }
    }

    pub fn with_bars(mut self, symbol: &str, bars: Vec<OhlcvBar>) -> Self {
        self.data.insert(symbol.to_string(), bars);
        self
    }
}

impl DataPort for MockDataPort {
    fn fetch_ohlcv(
        &self,
        symbol: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<OhlcvBar>, RotatorError> {
        let bars: Vec<OhlcvBar> = self
            .data
            .get(symbol)
            .map(|bars| {
                bars.iter()
                    .filter(|b| b.timestamp.date() >= start_date && b.timestamp.date() <= end_date)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        if bars.is_empty() {
            return Err(RotatorError::NoData {
                symbol: symbol.to_string(),
            });
        }
        Ok(bars)
    }

    fn list_symbols(&self) -> Result<Vec<String>, RotatorError> {
        let mut symbols: Vec<String> = self.data.keys().cloned().collect();
        symbols.sort();
        Ok(symbols)
    }
}

/// One venue call as seen by the mock.
#[derive(Debug, Clone, PartialEq)]
pub enum VenueCall {
    EnterLong { symbol: String, quantity: i64 },
    EnterShort { symbol: String, quantity: i64 },
    EnterLongLimit { symbol: String, quantity: i64, limit: f64 },
    EnterShortLimit { symbol: String, quantity: i64, limit: f64 },
    Cancel(OrderId),
}

/// Broker stand-in with fixed cash/equity and positions. Records every call
/// and never fills anything.
#[derive(Debug, Default)]
pub struct MockVenue {
    pub cash: f64,
    pub equity: f64,
    pub positions: HashMap<String, i64>,
    pub active: Vec<ActiveOrder>,
    pub calls: Vec<VenueCall>,
}

impl MockVenue {
    pub fn with_cash(cash: f64) -> Self {
        MockVenue {
            cash,
            equity: cash,
            ..Default::default()
        }
    }

    pub fn holding(mut self, symbol: &str, shares: i64) -> Self {
        self.positions.insert(symbol.to_string(), shares);
        self
    }

    pub fn with_active_order(mut self, id: OrderId, symbol: &str) -> Self {
        self.active.push(ActiveOrder {
            id,
            symbol: symbol.to_string(),
            side: OrderSide::Buy,
            order_type: OrderType::Market,
            quantity: 1,
            limit_price: None,
            good_till_canceled: true,
            submitted_at: None,
        });
        self
    }

    pub fn submissions(&self) -> Vec<&VenueCall> {
        self.calls
            .iter()
            .filter(|c| !matches!(c, VenueCall::Cancel(_)))
            .collect()
    }

    fn respond(
        &mut self,
        call: VenueCall,
        request: &EntryRequest,
        side: OrderSide,
        order_type: OrderType,
    ) -> ExecutionResponse {
        self.calls.push(call);
        ExecutionResponse {
            order_id: self.calls.len() as OrderId,
            symbol: request.symbol.clone(),
            side,
            order_type,
            quantity: request.quantity,
            accepted: true,
        }
    }
}

impl ExecutionVenue for MockVenue {
    fn cash(&self) -> f64 {
        self.cash
    }

    fn equity(&self) -> f64 {
        self.equity
    }

    fn shares(&self, symbol: &str) -> i64 {
        self.positions.get(symbol).copied().unwrap_or(0)
    }

    fn positions(&self) -> Vec<(String, i64)> {
        let mut p: Vec<(String, i64)> = self
            .positions
            .iter()
            .filter(|(_, q)| **q != 0)
            .map(|(s, q)| (s.clone(), *q))
            .collect();
        p.sort();
        p
    }

    fn active_orders(&self) -> Vec<ActiveOrder> {
        self.active.clone()
    }

    fn cancel_order(&mut self, id: OrderId) -> bool {
        self.calls.push(VenueCall::Cancel(id));
        let before = self.active.len();
        self.active.retain(|o| o.id != id);
        self.active.len() < before
    }

    fn enter_long(&mut self, request: &EntryRequest) -> ExecutionResponse {
        let call = VenueCall::EnterLong {
            symbol: request.symbol.clone(),
            quantity: request.quantity,
        };
        self.respond(call, request, OrderSide::Buy, OrderType::Market)
    }

    fn enter_short(&mut self, request: &EntryRequest) -> ExecutionResponse {
        let call = VenueCall::EnterShort {
            symbol: request.symbol.clone(),
            quantity: request.quantity,
        };
        self.respond(call, request, OrderSide::Sell, OrderType::Market)
    }

    fn enter_long_limit(&mut self, request: &EntryRequest, limit: f64) -> ExecutionResponse {
        let call = VenueCall::EnterLongLimit {
            symbol: request.symbol.clone(),
            quantity: request.quantity,
            limit,
        };
        self.respond(call, request, OrderSide::Buy, OrderType::Limit)
    }

    fn enter_short_limit(&mut self, request: &EntryRequest, limit: f64) -> ExecutionResponse {
        let call = VenueCall::EnterShortLimit {
            symbol: request.symbol.clone(),
            quantity: request.quantity,
            limit,
        };
        self.respond(call, request, OrderSide::Sell, OrderType::Limit)
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn ts(y: i32, m: u32, d: u32) -> NaiveDateTime {
    date(y, m, d).and_hms_opt(0, 0, 0).unwrap()
}

pub fn make_bar(symbol: &str, timestamp: NaiveDateTime, close: f64) -> OhlcvBar {
    OhlcvBar {
        symbol: symbol.to_string(),
        timestamp,
        open: close,
        high: close,
        low: close,
        close,
        volume: 1_000.0,
    }
}

/// One bar per calendar day starting at `start`.
pub fn daily_bars(symbol: &str, start: NaiveDate, closes: &[f64]) -> Vec<OhlcvBar> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let day = start + Duration::days(i as i64);
            make_bar(symbol, day.and_hms_opt(0, 0, 0).unwrap(), close)
        })
        .collect()
}

pub fn bars_at(timestamp: NaiveDateTime, closes: &[(&str, f64)]) -> Bars {
    closes.iter().fold(Bars::new(timestamp), |acc, (symbol, close)| {
        acc.with_bar(make_bar(symbol, timestamp, *close))
    })
}

/// `n` closes ending at `last`, rising by `step` per bar.
pub fn ramp(n: usize, last: f64, step: f64) -> Vec<f64> {
    (0..n).map(|i| last - (n - 1 - i) as f64 * step).collect()
}

pub fn history(closes: &[f64], window: usize) -> InstrumentHistory {
    let mut h = InstrumentHistory::new(window);
    for &c in closes {
        h.push(c);
    }
    h
}

pub fn universe(classes: &[(&str, &[&str])]) -> Universe {
    Universe::new(
        classes
            .iter()
            .map(|(name, candidates)| AssetClass {
                name: name.to_string(),
                candidates: candidates.iter().map(|s| s.to_string()).collect(),
            })
            .collect(),
    )
    .unwrap()
}

pub const SAMPLE_INI: &str = r#"
[backtest]
initial_capital = 10000
start_date = 2024-01-01
end_date = 2024-06-30
data_dir = data
commission_per_trade = 0
slippage_pct = 0
risk_free_rate = 0.05

[strategy]
lookback = 3
trend_filter_window = 5
cash_buffer = 0.90
rebalance_period = month
order_type = market
time_in_force = gtc

[asset_classes]
US Stocks = VTI
US 10 Year Government Bonds = IEF
"#;
