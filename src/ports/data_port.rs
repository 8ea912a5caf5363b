//! Historical bar access port trait.

use crate::domain::error::RotatorError;
use crate::domain::ohlcv::OhlcvBar;
use chrono::NaiveDate;

pub trait DataPort {
    /// Bars for `symbol` between the two dates inclusive, oldest first.
    fn fetch_ohlcv(
        &self,
        symbol: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<OhlcvBar>, RotatorError>;

    fn list_symbols(&self) -> Result<Vec<String>, RotatorError>;
}
