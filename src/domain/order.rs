//! Venue-agnostic order description and the records a venue hands back.

use chrono::NaiveDateTime;
use std::fmt;
use std::str::FromStr;

pub type OrderId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OrderSide {
    Buy,
    Sell,
}

/// Order types a strategy may emit. Not every venue dispatches every type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OrderType {
    Market,
    Limit,
    Stop,
    StopLimit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimeInForce {
    Day,
    GoodTillCanceled,
}

impl fmt::Display for OrderSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderSide::Buy => write!(f, "BUY"),
            OrderSide::Sell => write!(f, "SELL"),
        }
    }
}

impl fmt::Display for OrderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderType::Market => write!(f, "MARKET"),
            OrderType::Limit => write!(f, "LIMIT"),
            OrderType::Stop => write!(f, "STOP"),
            OrderType::StopLimit => write!(f, "STOP_LIMIT"),
        }
    }
}

impl fmt::Display for TimeInForce {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimeInForce::Day => write!(f, "DAY"),
            TimeInForce::GoodTillCanceled => write!(f, "GTC"),
        }
    }
}

impl FromStr for OrderType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "market" => Ok(OrderType::Market),
            "limit" => Ok(OrderType::Limit),
            "stop" => Ok(OrderType::Stop),
            "stop_limit" | "stoplimit" => Ok(OrderType::StopLimit),
            other => Err(format!("unknown order type '{other}'")),
        }
    }
}

impl FromStr for TimeInForce {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "day" => Ok(TimeInForce::Day),
            "gtc" | "good_till_canceled" => Ok(TimeInForce::GoodTillCanceled),
            other => Err(format!("unknown time in force '{other}'")),
        }
    }
}

/// A transient order: built by the sizer, handed to the dispatcher, then dropped.
#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub symbol: String,
    pub side: OrderSide,
    pub order_type: OrderType,
    pub quantity: i64,
    pub limit_price: Option<f64>,
    pub time_in_force: TimeInForce,
}

impl Order {
    /// Build an order from a signed share delta. Positive buys, negative sells.
    pub fn from_delta(
        symbol: &str,
        delta: i64,
        order_type: OrderType,
        limit_price: Option<f64>,
        time_in_force: TimeInForce,
    ) -> Self {
        let side = if delta > 0 {
            OrderSide::Buy
        } else {
            OrderSide::Sell
        };
        Order {
            symbol: symbol.to_string(),
            side,
            order_type,
            quantity: delta.abs(),
            limit_price,
            time_in_force,
        }
    }

    pub fn signed_quantity(&self) -> i64 {
        match self.side {
            OrderSide::Buy => self.quantity,
            OrderSide::Sell => -self.quantity,
        }
    }
}

/// The venue-side shape of an entry request.
#[derive(Debug, Clone, PartialEq)]
pub struct EntryRequest {
    pub symbol: String,
    pub quantity: i64,
    pub good_till_canceled: bool,
}

impl From<&Order> for EntryRequest {
    fn from(order: &Order) -> Self {
        EntryRequest {
            symbol: order.symbol.clone(),
            quantity: order.quantity,
            good_till_canceled: order.time_in_force == TimeInForce::GoodTillCanceled,
        }
    }
}

/// An accepted, not yet filled order held by the venue.
#[derive(Debug, Clone, PartialEq)]
pub struct ActiveOrder {
    pub id: OrderId,
    pub symbol: String,
    pub side: OrderSide,
    pub order_type: OrderType,
    pub quantity: i64,
    pub limit_price: Option<f64>,
    pub good_till_canceled: bool,
    pub submitted_at: Option<NaiveDateTime>,
}

/// What the venue answers on submission.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionResponse {
    pub order_id: OrderId,
    pub symbol: String,
    pub side: OrderSide,
    pub order_type: OrderType,
    pub quantity: i64,
    pub accepted: bool,
}

/// A confirmed execution reported by the venue.
#[derive(Debug, Clone, PartialEq)]
pub struct FillEvent {
    pub order_id: OrderId,
    pub symbol: String,
    pub side: OrderSide,
    pub quantity: i64,
    pub price: f64,
    pub commission: f64,
    pub timestamp: NaiveDateTime,
}
