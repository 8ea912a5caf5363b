//! CSV report adapter implementing ReportPort.
//!
//! Writes the equity curve with one row per step and the simple return
//! realised on that step (empty on the first row).

use crate::domain::backtest::BacktestResult;
use crate::domain::error::RotatorError;
use crate::domain::metrics::Metrics;
use crate::ports::report_port::ReportPort;
use log::info;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Default)]
pub struct CsvReportAdapter;

impl CsvReportAdapter {
    pub fn new() -> Self {
        Self
    }
}

fn csv_error(path: &str, err: csv::Error) -> RotatorError {
    let kind = match err.kind() {
        csv::ErrorKind::Io(io) => io.kind(),
        _ => std::io::ErrorKind::Other,
    };
    RotatorError::Io(std::io::Error::new(
        kind,
        format!("failed to write report {path}: {err}"),
    ))
}

impl ReportPort for CsvReportAdapter {
    fn write(
        &self,
        result: &BacktestResult,
        metrics: &Metrics,
        output_path: &str,
    ) -> Result<(), RotatorError> {
        let mut wtr =
            csv::Writer::from_path(output_path).map_err(|e| csv_error(output_path, e))?;
        wtr.write_record(["timestamp", "equity", "cash", "return"])
            .map_err(|e| csv_error(output_path, e))?;

        for (i, point) in result.equity_curve.iter().enumerate() {
            let step_return = match i {
                0 => String::new(),
                _ => metrics
                    .returns
                    .get(i - 1)
                    .map(|r| format!("{r:.6}"))
                    .unwrap_or_default(),
            };
            wtr.write_record([
                point.timestamp.format(TIMESTAMP_FORMAT).to_string(),
                format!("{:.2}", point.equity),
                format!("{:.2}", point.cash),
                step_return,
            ])
            .map_err(|e| csv_error(output_path, e))?;
        }

        wtr.flush()?;
        info!(
            "wrote {} equity points to {}",
            result.equity_curve.len(),
            output_path
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::portfolio::EquityPoint;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn result(values: &[f64]) -> BacktestResult {
        let start = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap().and_hms_opt(0, 0, 0).unwrap();
        BacktestResult {
            equity_curve: values
                .iter()
                .enumerate()
                .map(|(i, &v)| EquityPoint {
                    timestamp: start + chrono::Duration::days(i as i64),
                    equity: v,
                    cash: 100.0,
                })
                .collect(),
            fills: vec![],
            orders_submitted: 0,
            rebalances: 1,
            final_positions: vec![],
            final_equity: values.last().copied().unwrap_or(0.0),
            final_cash: 100.0,
        }
    }

    #[test]
    fn writes_equity_curve_with_returns() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("equity.csv");
        let path_str = path.to_str().unwrap();
        let r = result(&[1_000.0, 1_100.0, 1_045.0]);
        let m = Metrics::compute(&r.equity_curve, &[], 1_000.0, 0.0);

        CsvReportAdapter::new().write(&r, &m, path_str).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines[0], "timestamp,equity,cash,return");
        assert_eq!(lines[1], "2024-01-02 00:00:00,1000.00,100.00,");
        assert_eq!(lines[2], "2024-01-03 00:00:00,1100.00,100.00,0.100000");
        assert_eq!(lines[3], "2024-01-04 00:00:00,1045.00,100.00,-0.050000");
    }

    #[test]
    fn unwritable_path_is_io_error() {
        let r = result(&[1.0]);
        let m = Metrics::compute(&r.equity_curve, &[], 1.0, 0.0);
        let err = CsvReportAdapter::new()
            .write(&r, &m, "/nonexistent/dir/out.csv")
            .unwrap_err();
        assert!(
            matches!(err, RotatorError::Io(ref e) if e.kind() == std::io::ErrorKind::NotFound)
        );
        assert!(err.to_string().contains("/nonexistent/dir/out.csv"));
        assert_eq!(std::process::ExitCode::from(&err), std::process::ExitCode::from(1));
    }
}
