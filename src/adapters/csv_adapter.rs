//! CSV file data adapter.
//!
//! One `<SYMBOL>.csv` per instrument with the header
//! `Date Time,Open,High,Low,Close,Volume[,Adj Close]`. When `Adj Close` is
//! present the bar is expressed in adjusted prices. Rows that cannot be
//! parsed or carry impossible prices are skipped with a warning.

use crate::domain::error::RotatorError;
use crate::domain::ohlcv::OhlcvBar;
use crate::ports::data_port::DataPort;
use chrono::{NaiveDate, NaiveDateTime};
use csv::StringRecord;
use log::{debug, warn};
use std::fs;
use std::path::PathBuf;

const DATE_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const DATE_FORMAT: &str = "%Y-%m-%d";

pub struct CsvAdapter {
    base_path: PathBuf,
}

/// Column positions resolved from the header row.
struct Columns {
    timestamp: usize,
    open: usize,
    high: usize,
    low: usize,
    close: usize,
    volume: usize,
    adj_close: Option<usize>,
}

impl Columns {
    fn from_headers(headers: &StringRecord, symbol: &str) -> Result<Self, RotatorError> {
        let find = |names: &[&str]| {
            headers
                .iter()
                .position(|h| names.iter().any(|n| h.trim().eq_ignore_ascii_case(n)))
        };
        let require = |names: &[&str]| {
            find(names).ok_or_else(|| RotatorError::Data {
                reason: format!("{symbol}.csv has no '{}' column", names[0]),
            })
        };
        Ok(Columns {
            timestamp: require(&["Date Time", "Date", "Datetime"])?,
            open: require(&["Open"])?,
            high: require(&["High"])?,
            low: require(&["Low"])?,
            close: require(&["Close"])?,
            volume: require(&["Volume"])?,
            adj_close: find(&["Adj Close"]),
        })
    }
}

pub fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    NaiveDateTime::parse_from_str(value, DATE_TIME_FORMAT)
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(value, DATE_FORMAT)
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

fn parse_row(record: &StringRecord, columns: &Columns, symbol: &str) -> Result<OhlcvBar, String> {
    let field = |idx: usize, name: &str| -> Result<f64, String> {
        let raw = record.get(idx).ok_or_else(|| format!("missing {name}"))?;
        raw.trim()
            .parse::<f64>()
            .map_err(|e| format!("invalid {name} '{raw}': {e}"))
    };

    let raw_ts = record.get(columns.timestamp).unwrap_or_default();
    let timestamp = parse_timestamp(raw_ts).ok_or_else(|| format!("invalid timestamp '{raw_ts}'"))?;

    let open = field(columns.open, "open")?;
    let high = field(columns.high, "high")?;
    let low = field(columns.low, "low")?;
    let close = field(columns.close, "close")?;

    // Adjusted close rescales the whole bar so the range stays consistent.
    let factor = match columns.adj_close {
        Some(idx) if record.get(idx).is_some_and(|v| !v.trim().is_empty()) && close > 0.0 => {
            field(idx, "adj close")? / close
        }
        _ => 1.0,
    };

    Ok(OhlcvBar {
        symbol: symbol.to_string(),
        timestamp,
        open: open * factor,
        high: high * factor,
        low: low * factor,
        close: close * factor,
        volume: field(columns.volume, "volume")?,
    })
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, symbol: &str) -> PathBuf {
        self.base_path.join(format!("{}.csv", symbol))
    }
}

impl DataPort for CsvAdapter {
    fn fetch_ohlcv(
        &self,
        symbol: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<OhlcvBar>, RotatorError> {
        let path = self.csv_path(symbol);
        if !path.is_file() {
            return Err(RotatorError::NoData {
                symbol: symbol.to_string(),
            });
        }

        let mut rdr = csv::Reader::from_path(&path).map_err(|e| RotatorError::Data {
            reason: format!("failed to open {}: {}", path.display(), e),
        })?;
        let headers = rdr.headers().map_err(|e| RotatorError::Data {
            reason: format!("failed to read header of {}: {}", path.display(), e),
        })?;
        let columns = Columns::from_headers(headers, symbol)?;

        let mut bars = Vec::new();
        let mut skipped = 0usize;
        for (line, result) in rdr.records().enumerate() {
            let parsed = result
                .map_err(|e| e.to_string())
                .and_then(|record| parse_row(&record, &columns, symbol));
            let bar = match parsed {
                Ok(bar) if bar.is_well_formed() => bar,
                Ok(_) => {
                    warn!("{symbol}.csv row {}: impossible prices, skipped", line + 2);
                    skipped += 1;
                    continue;
                }
                Err(reason) => {
                    warn!("{symbol}.csv row {}: {reason}, skipped", line + 2);
                    skipped += 1;
                    continue;
                }
            };
            let date = bar.timestamp.date();
            if date < start_date || date > end_date {
                continue;
            }
            bars.push(bar);
        }

        bars.sort_by_key(|b| b.timestamp);
        debug!("loaded {} bars for {} ({} skipped)", bars.len(), symbol, skipped);

        if bars.is_empty() {
            return Err(RotatorError::NoData {
                symbol: symbol.to_string(),
            });
        }
        Ok(bars)
    }

    fn list_symbols(&self) -> Result<Vec<String>, RotatorError> {
        let entries = fs::read_dir(&self.base_path).map_err(|e| RotatorError::Data {
            reason: format!(
                "failed to read directory {}: {}",
                self.base_path.display(),
                e
            ),
        })?;

        let mut symbols = Vec::new();
        for entry in entries {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) == Some("csv") {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    symbols.push(stem.to_string());
                }
            }
        }
        symbols.sort();
        Ok(symbols)
    }
}
