//! Per-instrument close history and the trend-filter series derived from it.
//!
//! Both series are append-only and addressed by recency: offset 0 is the latest
//! value, offset 1 the one before it, and so on.
//!
//! The trend filter is a simple moving average:
//! SMA(n)[i] = (P[i-n+1] + ... + P[i]) / n
//! Warmup: the first (n-1) observations are undefined.

/// Append-only sequence of closing prices.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PriceSeries {
    values: Vec<f64>,
}

impl PriceSeries {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, close: f64) {
        self.values.push(close);
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Value `offset` steps back from the latest, if that much history exists.
    pub fn at(&self, offset: usize) -> Option<f64> {
        let len = self.values.len();
        if offset >= len {
            return None;
        }
        Some(self.values[len - 1 - offset])
    }

    pub fn latest(&self) -> Option<f64> {
        self.at(0)
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }
}

/// Moving-average series kept in lockstep with a [`PriceSeries`].
#[derive(Debug, Clone, PartialEq)]
pub struct TrendFilterSeries {
    window: usize,
    window_sum: f64,
    values: Vec<Option<f64>>,
}

impl TrendFilterSeries {
    pub fn new(window: usize) -> Self {
        TrendFilterSeries {
            window,
            window_sum: 0.0,
            values: Vec::new(),
        }
    }

    /// Extend by one observation. `closes` must already contain the new close.
    fn update(&mut self, closes: &[f64]) {
        let i = closes.len() - 1;
        self.window_sum += closes[i];
        if self.window > 0 && i >= self.window {
            self.window_sum -= closes[i - self.window];
        }
        let value = if self.window > 0 && i + 1 >= self.window {
            Some(self.window_sum / self.window as f64)
        } else {
            None
        };
        self.values.push(value);
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Filter value `offset` steps back; `None` during warmup or past the start.
    pub fn at(&self, offset: usize) -> Option<f64> {
        let len = self.values.len();
        if offset >= len {
            return None;
        }
        self.values[len - 1 - offset]
    }
}

/// Close history plus trend filter for one instrument.
#[derive(Debug, Clone, PartialEq)]
pub struct InstrumentHistory {
    pub closes: PriceSeries,
    pub trend: TrendFilterSeries,
}

impl InstrumentHistory {
    pub fn new(trend_window: usize) -> Self {
        InstrumentHistory {
            closes: PriceSeries::new(),
            trend: TrendFilterSeries::new(trend_window),
        }
    }

    pub fn push(&mut self, close: f64) {
        self.closes.push(close);
        self.trend.update(self.closes.as_slice());
    }

    pub fn last_price(&self) -> Option<f64> {
        self.closes.latest()
    }
}
