//! Domain error types.

use crate::domain::order::{OrderSide, OrderType};

/// Failure to translate an order into a venue call.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DispatchError {
    #[error("unsupported order type {order_type} ({side}) for {symbol}")]
    UnsupportedOrderType {
        order_type: OrderType,
        side: OrderSide,
        symbol: String,
    },

    #[error("limit order for {symbol} has no limit price")]
    MissingLimitPrice { symbol: String },
}

/// Top-level error type for rotator.
#[derive(Debug, thiserror::Error)]
pub enum RotatorError {
    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("asset class {asset_class} has no candidate instruments")]
    EmptyAssetClass { asset_class: String },

    #[error("instrument {symbol} is listed in both {first} and {second}")]
    DuplicateInstrument {
        symbol: String,
        first: String,
        second: String,
    },

    #[error("rebalance cycle {cycle}: {source}")]
    Dispatch {
        cycle: u32,
        #[source]
        source: DispatchError,
    },

    #[error("rebalance cycle {cycle}: {symbol} has both a resize and a liquidation entry")]
    PendingCollision { symbol: String, cycle: u32 },

    #[error("rebalance cycle {cycle}: remaining cash {remaining:.2} went negative after sizing {symbol}")]
    NegativeCash {
        symbol: String,
        remaining: f64,
        cycle: u32,
    },

    #[error("no data for {symbol}")]
    NoData { symbol: String },

    #[error("data error: {reason}")]
    Data { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&RotatorError> for std::process::ExitCode {
    fn from(err: &RotatorError) -> Self {
        let code: u8 = match err {
            RotatorError::Io(_) => 1,
            RotatorError::ConfigParse { .. }
            | RotatorError::ConfigMissing { .. }
            | RotatorError::ConfigInvalid { .. }
            | RotatorError::EmptyAssetClass { .. }
            | RotatorError::DuplicateInstrument { .. } => 2,
            RotatorError::NoData { .. } | RotatorError::Data { .. } => 3,
            RotatorError::Dispatch { .. } => 4,
            RotatorError::PendingCollision { .. } | RotatorError::NegativeCash { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}
