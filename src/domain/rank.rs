//! Trend-filtered momentum ranking.
//!
//! An instrument ranks only while its latest close sits at or above its trend
//! filter. Its score is the trailing return over the lookback window:
//! (P[0] - P[k]) / P[k], where k = lookback - 1 counts back from the latest close
//! so the window spans `lookback` closes including the latest.

use crate::domain::series::InstrumentHistory;
use std::collections::HashMap;

/// Outcome of ranking one instrument for the current period.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RankScore {
    Ineligible,
    Score(f64),
}

impl RankScore {
    pub fn value(&self) -> Option<f64> {
        match self {
            RankScore::Ineligible => None,
            RankScore::Score(v) => Some(*v),
        }
    }
}

pub fn rank(history: &InstrumentHistory, lookback: usize) -> RankScore {
    if lookback == 0 || history.closes.len() < lookback {
        return RankScore::Ineligible;
    }
    let anchor = lookback - 1;

    let (Some(price), Some(filter)) = (history.closes.latest(), history.trend.at(0)) else {
        return RankScore::Ineligible;
    };
    if price < filter {
        return RankScore::Ineligible;
    }
    if history.trend.at(anchor).is_none() {
        return RankScore::Ineligible;
    }

    match history.closes.at(anchor) {
        Some(past) if past > 0.0 => RankScore::Score((price - past) / past),
        _ => RankScore::Ineligible,
    }
}

/// Highest-scoring candidate. Ties keep the earlier candidate in list order.
pub fn top_ranked<'a>(
    candidates: &'a [String],
    histories: &HashMap<String, InstrumentHistory>,
    lookback: usize,
) -> Option<&'a str> {
    let mut best: Option<(&str, f64)> = None;
    for symbol in candidates {
        let Some(history) = histories.get(symbol) else {
            continue;
        };
        if let Some(score) = rank(history, lookback).value() {
            match best {
                Some((_, highest)) if score <= highest => {}
                _ => best = Some((symbol.as_str(), score)),
            }
        }
    }
    best.map(|(symbol, _)| symbol)
}
