//! Performance statistics over a backtest equity curve.

use super::order::{FillEvent, OrderSide};
use super::portfolio::EquityPoint;
use chrono::NaiveDate;

const TRADING_DAYS_PER_YEAR: f64 = 252.0;
const SECONDS_PER_YEAR: f64 = 365.0 * 86_400.0;

#[derive(Debug, Clone, PartialEq)]
pub struct Metrics {
    pub total_return: f64,
    pub annualized_return: f64,
    /// Simple return per step, one shorter than the equity curve.
    pub returns: Vec<f64>,
    pub sharpe_ratio: f64,
    pub sortino_ratio: f64,
    pub max_drawdown: f64,
    /// Longest run of steps spent below a previous peak.
    pub max_drawdown_duration: i64,
    pub buy_fills: usize,
    pub sell_fills: usize,
    pub total_commission: f64,
    pub benchmark_return: Option<f64>,
}

impl Metrics {
    pub fn compute(
        equity_curve: &[EquityPoint],
        fills: &[FillEvent],
        initial_capital: f64,
        risk_free_rate: f64,
    ) -> Self {
        let final_equity = equity_curve
            .last()
            .map(|p| p.equity)
            .unwrap_or(initial_capital);

        let total_return = if initial_capital > 0.0 {
            (final_equity - initial_capital) / initial_capital
        } else {
            0.0
        };

        let years = elapsed_years(equity_curve);
        let annualized_return = if years > 0.0 && total_return > -1.0 && total_return.is_finite() {
            (1.0 + total_return).powf(1.0 / years) - 1.0
        } else {
            0.0
        };

        let returns = simple_returns(equity_curve);
        let (max_drawdown, max_drawdown_duration) = compute_drawdown(equity_curve);
        let daily_rf = risk_free_rate / TRADING_DAYS_PER_YEAR;
        let daily = close_to_close(&daily_closes(equity_curve));
        let (sharpe_ratio, sortino_ratio) = compute_risk_adjusted(&daily, daily_rf);

        let buy_fills = fills.iter().filter(|f| f.side == OrderSide::Buy).count();
        let total_commission = fills.iter().map(|f| f.commission).sum();

        Metrics {
            total_return,
            annualized_return,
            returns,
            sharpe_ratio,
            sortino_ratio,
            max_drawdown,
            max_drawdown_duration,
            buy_fills,
            sell_fills: fills.len() - buy_fills,
            total_commission,
            benchmark_return: None,
        }
    }

    pub fn with_benchmark(mut self, closes: &[f64]) -> Self {
        self.benchmark_return = cumulative_return(closes);
        self
    }
}

/// Buy-and-hold return from the first to the last close.
pub fn cumulative_return(closes: &[f64]) -> Option<f64> {
    match (closes.first(), closes.last()) {
        (Some(&first), Some(&last)) if first > 0.0 => Some((last - first) / first),
        _ => None,
    }
}

/// Calendar time covered by the curve, in years.
fn elapsed_years(equity_curve: &[EquityPoint]) -> f64 {
    match (equity_curve.first(), equity_curve.last()) {
        (Some(first), Some(last)) => {
            (last.timestamp - first.timestamp).num_seconds() as f64 / SECONDS_PER_YEAR
        }
        _ => 0.0,
    }
}

/// Last equity of each calendar date, in curve order.
fn daily_closes(equity_curve: &[EquityPoint]) -> Vec<f64> {
    let mut closes: Vec<(NaiveDate, f64)> = Vec::new();
    for point in equity_curve {
        let day = point.timestamp.date();
        match closes.last_mut() {
            Some((last_day, equity)) if *last_day == day => *equity = point.equity,
            _ => closes.push((day, point.equity)),
        }
    }
    closes.into_iter().map(|(_, equity)| equity).collect()
}

fn close_to_close(values: &[f64]) -> Vec<f64> {
    values
        .windows(2)
        .map(|w| if w[0] > 0.0 { (w[1] - w[0]) / w[0] } else { 0.0 })
        .collect()
}

pub fn simple_returns(equity_curve: &[EquityPoint]) -> Vec<f64> {
    let values: Vec<f64> = equity_curve.iter().map(|p| p.equity).collect();
    close_to_close(&values)
}

fn compute_drawdown(equity_curve: &[EquityPoint]) -> (f64, i64) {
    let Some(first) = equity_curve.first() else {
        return (0.0, 0);
    };

    let mut peak = first.equity;
    let mut max_dd = 0.0_f64;
    let mut max_dd_duration = 0i64;
    let mut current_dd_duration = 0i64;

    for point in equity_curve {
        if point.equity >= peak {
            peak = point.equity;
            current_dd_duration = 0;
        } else if peak > 0.0 {
            max_dd = max_dd.max((peak - point.equity) / peak);
            current_dd_duration += 1;
            max_dd_duration = max_dd_duration.max(current_dd_duration);
        }
    }

    (max_dd, max_dd_duration)
}

/// Annualized Sharpe and Sortino from daily returns. Deviations use the
/// sample (n - 1) denominator, so fewer than two returns yield zeros.
fn compute_risk_adjusted(returns: &[f64], daily_rf: f64) -> (f64, f64) {
    if returns.len() < 2 {
        return (0.0, 0.0);
    }

    let n = returns.len() as f64;
    let mean = returns.iter().sum::<f64>() / n;
    let variance = returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / (n - 1.0);
    let stddev = variance.sqrt();
    let excess_return = mean - daily_rf;

    let sharpe = if stddev > 0.0 {
        (excess_return / stddev) * TRADING_DAYS_PER_YEAR.sqrt()
    } else {
        0.0
    };

    let downside_sq: f64 = returns
        .iter()
        .filter(|&&r| r < daily_rf)
        .map(|&r| (r - daily_rf).powi(2))
        .sum();
    let downside_stddev = (downside_sq / (n - 1.0)).sqrt();
    let sortino = if downside_stddev > 0.0 {
        (excess_return / downside_stddev) * TRADING_DAYS_PER_YEAR.sqrt()
    } else {
        0.0
    };

    (sharpe, sortino)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::{Duration, NaiveDate, NaiveDateTime};

    fn point(timestamp: NaiveDateTime, equity: f64) -> EquityPoint {
        EquityPoint {
            timestamp,
            equity,
            cash: equity,
        }
    }

    fn curve(values: &[f64]) -> Vec<EquityPoint> {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap().and_hms_opt(0, 0, 0).unwrap();
        values
            .iter()
            .enumerate()
            .map(|(i, &v)| EquityPoint {
                timestamp: start + Duration::days(i as i64),
                equity: v,
                cash: v,
            })
            .collect()
    }

    fn fill(side: OrderSide, commission: f64) -> FillEvent {
        FillEvent {
            order_id: 1,
            symbol: "VTI".into(),
            side,
            quantity: 10,
            price: 100.0,
            commission,
            timestamp: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap().and_hms_opt(0, 0, 0).unwrap(),
        }
    }

    #[test]
    fn empty_curve_has_zero_metrics() {
        let m = Metrics::compute(&[], &[], 10_000.0, 0.05);
        assert_eq!(m.total_return, 0.0);
        assert_eq!(m.annualized_return, 0.0);
        assert!(m.returns.is_empty());
        assert_eq!(m.sharpe_ratio, 0.0);
        assert_eq!(m.max_drawdown, 0.0);
    }

    #[test]
    fn total_return_from_initial_capital() {
        let m = Metrics::compute(&curve(&[10_000.0, 10_500.0, 11_000.0]), &[], 10_000.0, 0.0);
        assert_relative_eq!(m.total_return, 0.10);
        assert_eq!(m.returns.len(), 2);
        assert_relative_eq!(m.returns[0], 0.05);
    }

    #[test]
    fn annualized_return_over_one_year_equals_total() {
        // 366 daily points span exactly 365 days.
        let values: Vec<f64> = (0..366).map(|i| 10_000.0 + i as f64 * 10.0).collect();
        let m = Metrics::compute(&curve(&values), &[], 10_000.0, 0.0);
        assert_relative_eq!(m.annualized_return, m.total_return, epsilon = 1e-12);
    }

    #[test]
    fn annualization_follows_calendar_span_not_point_count() {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap().and_hms_opt(0, 0, 0).unwrap();
        let sparse = vec![point(start, 100.0), point(start + Duration::days(730), 121.0)];
        let m = Metrics::compute(&sparse, &[], 100.0, 0.0);
        assert_relative_eq!(m.annualized_return, 0.1, epsilon = 1e-9);

        let single = vec![point(start, 110.0)];
        assert_eq!(Metrics::compute(&single, &[], 100.0, 0.0).annualized_return, 0.0);
    }

    #[test]
    fn minute_bars_use_daily_closes_and_wall_clock_years() {
        // Three sessions of 390 one-minute bars, each rising linearly.
        let session_ends = [100.5, 101.5, 103.0];
        let mut points = Vec::new();
        let mut open = 100.0;
        for (day, &close) in session_ends.iter().enumerate() {
            let first_minute = NaiveDate::from_ymd_opt(2024, 3, 4 + day as u32)
                .unwrap()
                .and_hms_opt(9, 30, 0)
                .unwrap();
            for minute in 0..390 {
                let equity = open + (close - open) * (minute + 1) as f64 / 390.0;
                points.push(point(first_minute + Duration::minutes(minute), equity));
            }
            open = close;
        }

        let m = Metrics::compute(&points, &[], 100.0, 0.0);

        assert_eq!(m.returns.len(), 3 * 390 - 1);
        assert_relative_eq!(m.total_return, 0.03, epsilon = 1e-12);
        assert!(m.annualized_return > m.total_return);

        let daily: [f64; 2] = [101.5 / 100.5 - 1.0, 103.0 / 101.5 - 1.0];
        let mean = (daily[0] + daily[1]) / 2.0;
        let stddev = ((daily[0] - mean).powi(2) + (daily[1] - mean).powi(2)).sqrt();
        assert!(m.sharpe_ratio > 0.0);
        assert_relative_eq!(m.sharpe_ratio, mean / stddev * 252f64.sqrt(), epsilon = 1e-9);
    }

    #[test]
    fn risk_adjusted_uses_sample_deviation() {
        let (sharpe, sortino) = compute_risk_adjusted(&[0.01, 0.03], 0.0);
        // mean 0.02, sample stddev sqrt(0.0002)
        assert_relative_eq!(sharpe, 0.02 / 0.0002f64.sqrt() * 252f64.sqrt(), epsilon = 1e-9);
        assert_eq!(sortino, 0.0);

        let (sharpe, _) = compute_risk_adjusted(&[0.01, -0.01, 0.02], 0.0);
        let mean: f64 = 0.02 / 3.0;
        let variance = [0.01f64, -0.01, 0.02].iter().map(|r| (r - mean).powi(2)).sum::<f64>() / 2.0;
        assert_relative_eq!(sharpe, mean / variance.sqrt() * 252f64.sqrt(), epsilon = 1e-9);

        assert_eq!(compute_risk_adjusted(&[0.05], 0.0), (0.0, 0.0));
    }

    #[test]
    fn drawdown_depth_and_duration() {
        let (dd, duration) = compute_drawdown(&curve(&[100.0, 120.0, 90.0, 100.0, 130.0, 117.0]));
        assert_relative_eq!(dd, 0.25);
        assert_eq!(duration, 2);
    }

    #[test]
    fn flat_curve_has_zero_sharpe() {
        let m = Metrics::compute(&curve(&[100.0; 10]), &[], 100.0, 0.05);
        assert_eq!(m.sharpe_ratio, 0.0);
        assert_eq!(m.max_drawdown, 0.0);
    }

    #[test]
    fn rising_curve_has_positive_sharpe() {
        let values: Vec<f64> = (0..50)
            .map(|i| 100.0 * 1.001f64.powi(i) + (i % 3) as f64 * 0.01)
            .collect();
        let m = Metrics::compute(&curve(&values), &[], 100.0, 0.0);
        assert!(m.sharpe_ratio > 0.0);
    }

    #[test]
    fn fills_are_counted_by_side() {
        let fills = vec![
            fill(OrderSide::Buy, 1.0),
            fill(OrderSide::Buy, 1.0),
            fill(OrderSide::Sell, 0.5),
        ];
        let m = Metrics::compute(&curve(&[100.0, 100.0]), &fills, 100.0, 0.0);
        assert_eq!(m.buy_fills, 2);
        assert_eq!(m.sell_fills, 1);
        assert_relative_eq!(m.total_commission, 2.5);
    }

    #[test]
    fn benchmark_cumulative_return() {
        assert_eq!(cumulative_return(&[]), None);
        assert_relative_eq!(cumulative_return(&[200.0, 210.0, 250.0]).unwrap(), 0.25);
        let m = Metrics::compute(&curve(&[1.0, 1.0]), &[], 1.0, 0.0).with_benchmark(&[50.0, 40.0]);
        assert_relative_eq!(m.benchmark_return.unwrap(), -0.2);
    }
}
