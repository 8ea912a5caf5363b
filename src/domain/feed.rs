//! Bar feed: per-instrument bar sets merged onto a unified timeline.
//!
//! Each step of the feed yields every instrument's bar for one timestamp.
//! Malformed bars are dropped when the feed is built and never reach the
//! strategy.

use crate::domain::ohlcv::OhlcvBar;
use chrono::NaiveDateTime;
use log::warn;
use std::collections::{BTreeSet, HashMap};

/// All bars sharing one timestamp, keyed by symbol.
#[derive(Debug, Clone, PartialEq)]
pub struct Bars {
    pub timestamp: NaiveDateTime,
    pub bars: HashMap<String, OhlcvBar>,
}

impl Bars {
    pub fn new(timestamp: NaiveDateTime) -> Self {
        Bars {
            timestamp,
            bars: HashMap::new(),
        }
    }

    pub fn with_bar(mut self, bar: OhlcvBar) -> Self {
        self.bars.insert(bar.symbol.clone(), bar);
        self
    }

    pub fn get(&self, symbol: &str) -> Option<&OhlcvBar> {
        self.bars.get(symbol)
    }

    /// Symbols present on this step, sorted.
    pub fn symbols(&self) -> Vec<&str> {
        let mut symbols: Vec<&str> = self.bars.keys().map(String::as_str).collect();
        symbols.sort_unstable();
        symbols
    }
}

#[derive(Debug, Clone)]
pub struct InstrumentBars {
    pub symbol: String,
    pub ohlcv: Vec<OhlcvBar>,
    pub time_index: HashMap<NaiveDateTime, usize>,
}

impl InstrumentBars {
    /// Keeps well-formed bars only. A repeated timestamp keeps the first bar.
    pub fn new(symbol: String, ohlcv: Vec<OhlcvBar>) -> Self {
        let mut kept: Vec<OhlcvBar> = Vec::with_capacity(ohlcv.len());
        let mut time_index = HashMap::with_capacity(ohlcv.len());
        for bar in ohlcv {
            if !bar.is_well_formed() {
                warn!("skipping malformed bar for {} at {}", symbol, bar.timestamp);
                continue;
            }
            if time_index.contains_key(&bar.timestamp) {
                warn!("skipping duplicate bar for {} at {}", symbol, bar.timestamp);
                continue;
            }
            time_index.insert(bar.timestamp, kept.len());
            kept.push(bar);
        }
        Self {
            symbol,
            ohlcv: kept,
            time_index,
        }
    }

    pub fn get_bar(&self, timestamp: NaiveDateTime) -> Option<&OhlcvBar> {
        self.time_index.get(&timestamp).map(|&i| &self.ohlcv[i])
    }
}

pub fn build_unified_timeline(instruments: &[InstrumentBars]) -> Vec<NaiveDateTime> {
    let unique: BTreeSet<NaiveDateTime> = instruments
        .iter()
        .flat_map(|ib| ib.ohlcv.iter().map(|bar| bar.timestamp))
        .collect();
    unique.into_iter().collect()
}

/// Replays instruments step by step in timestamp order.
#[derive(Debug, Clone)]
pub struct BarFeed {
    instruments: Vec<InstrumentBars>,
    timeline: Vec<NaiveDateTime>,
}

impl BarFeed {
    pub fn new(instruments: Vec<InstrumentBars>) -> Self {
        let timeline = build_unified_timeline(&instruments);
        BarFeed {
            instruments,
            timeline,
        }
    }

    pub fn from_bars(bars_by_symbol: Vec<(String, Vec<OhlcvBar>)>) -> Self {
        BarFeed::new(
            bars_by_symbol
                .into_iter()
                .map(|(symbol, bars)| InstrumentBars::new(symbol, bars))
                .collect(),
        )
    }

    pub fn len(&self) -> usize {
        self.timeline.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timeline.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = Bars> + '_ {
        self.timeline.iter().map(move |&ts| {
            let bars = self
                .instruments
                .iter()
                .filter_map(|ib| ib.get_bar(ts).map(|b| (ib.symbol.clone(), b.clone())))
                .collect();
            Bars {
                timestamp: ts,
                bars,
            }
        })
    }
}
