//! Result writing port trait.

use crate::domain::backtest::BacktestResult;
use crate::domain::error::RotatorError;
use crate::domain::metrics::Metrics;

/// Port for persisting a finished run.
pub trait ReportPort {
    fn write(
        &self,
        result: &BacktestResult,
        metrics: &Metrics,
        output_path: &str,
    ) -> Result<(), RotatorError>;
}
