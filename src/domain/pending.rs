//! Pending share deltas for the current rebalance cycle.
//!
//! Entries keep insertion order, which is the order the sizer spends cash in.
//! An instrument appears at most once: it is either resized toward a new
//! target or fully liquidated.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeltaKind {
    Resize,
    Liquidate,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingDelta {
    pub symbol: String,
    pub kind: DeltaKind,
    pub remaining: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PendingDeltaTable {
    entries: Vec<PendingDelta>,
}

impl PendingDeltaTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an entry. Returns the kind already held when the symbol is present;
    /// the table is left unchanged in that case.
    pub fn insert(&mut self, symbol: &str, kind: DeltaKind, delta: i64) -> Result<(), DeltaKind> {
        if let Some(existing) = self.entries.iter().find(|e| e.symbol == symbol) {
            return Err(existing.kind);
        }
        self.entries.push(PendingDelta {
            symbol: symbol.to_string(),
            kind,
            remaining: delta,
        });
        Ok(())
    }

    pub fn get(&self, symbol: &str) -> Option<i64> {
        self.entries
            .iter()
            .find(|e| e.symbol == symbol)
            .map(|e| e.remaining)
    }

    /// Subtract an executed signed quantity from the symbol's remaining delta.
    pub fn consume(&mut self, symbol: &str, submitted: i64) {
        if let Some(entry) = self.entries.iter_mut().find(|e| e.symbol == symbol) {
            entry.remaining -= submitted;
        }
    }

    pub fn entries(&self) -> &[PendingDelta] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// No entry has shares left to trade.
    pub fn is_exhausted(&self) -> bool {
        self.entries.iter().all(|e| e.remaining == 0)
    }
}
