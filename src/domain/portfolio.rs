//! Portfolio state and equity tracking.

use chrono::NaiveDateTime;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq)]
pub struct EquityPoint {
    pub timestamp: NaiveDateTime,
    pub equity: f64,
    pub cash: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Portfolio {
    pub cash: f64,
    pub positions: HashMap<String, i64>,
    pub last_prices: HashMap<String, f64>,
}

impl Portfolio {
    pub fn new(initial_capital: f64) -> Self {
        Portfolio {
            cash: initial_capital,
            positions: HashMap::new(),
            last_prices: HashMap::new(),
        }
    }

    pub fn shares(&self, symbol: &str) -> i64 {
        self.positions.get(symbol).copied().unwrap_or(0)
    }

    /// Apply a signed share change and its cash effect. Flat positions are removed.
    pub fn apply_fill(&mut self, symbol: &str, signed_quantity: i64, price: f64, commission: f64) {
        self.cash -= signed_quantity as f64 * price + commission;
        let shares = self.shares(symbol) + signed_quantity;
        if shares == 0 {
            self.positions.remove(symbol);
        } else {
            self.positions.insert(symbol.to_string(), shares);
        }
    }

    pub fn mark(&mut self, symbol: &str, price: f64) {
        self.last_prices.insert(symbol.to_string(), price);
    }

    /// Holdings sorted by symbol.
    pub fn sorted_positions(&self) -> Vec<(String, i64)> {
        let mut positions: Vec<(String, i64)> =
            self.positions.iter().map(|(s, q)| (s.clone(), *q)).collect();
        positions.sort();
        positions
    }

    /// Cash plus holdings marked at their last known price.
    pub fn total_equity(&self) -> f64 {
        let position_value: f64 = self
            .positions
            .iter()
            .filter_map(|(symbol, &qty)| {
                self.last_prices
                    .get(symbol)
                    .map(|&price| qty as f64 * price)
            })
            .sum();
        self.cash + position_value
    }
}
