//! Core domain types and logic.

pub mod ohlcv;
pub mod series;
pub mod feed;
pub mod rank;
pub mod universe;
pub mod order;
pub mod pending;
pub mod dispatch;
pub mod scheduler;
pub mod sizer;
pub mod strategy;
pub mod execution;
pub mod portfolio;
pub mod backtest;
pub mod metrics;
pub mod config_validation;
pub mod error;
