//! Trade reconstruction from a signal log and per-trade performance statistics.
//!
//! All statistics work on the ordered list of trade PnLs. Ratios add
//! [`EPSILON`] to their denominators instead of failing on zero; the one
//! exception is profit factor, which reports `+inf` when nothing was lost.

use std::path::Path;

use tracing::{debug, warn};

use super::indicator::EPSILON;
use super::indicator::stddev::population_stddev;
use super::signal::SignalKind;
use crate::ports::signal_log_port::SignalLogPort;

/// One BUY/SELL row as read back from a persisted signal log.
#[derive(Debug, Clone, PartialEq)]
pub struct LoggedSignal {
    pub timestamp: String,
    pub kind: SignalKind,
    pub price: f64,
}

/// A reconstructed BUY→SELL round trip, one unit long.
#[derive(Debug, Clone, PartialEq)]
pub struct Trade {
    pub entry_timestamp: String,
    pub exit_timestamp: String,
    pub entry_price: f64,
    pub exit_price: f64,
    pub pnl: f64,
}

/// Pairs each SELL with the most recent unmatched BUY.
///
/// A second BUY before any SELL replaces the pending entry, so the earlier
/// BUY never closes. A SELL with nothing pending is dropped. HOLD rows are
/// ignored.
pub fn reconstruct_trades(signals: &[LoggedSignal]) -> Vec<Trade> {
    let mut trades = Vec::new();
    let mut pending: Option<&LoggedSignal> = None;

    for signal in signals {
        match signal.kind {
            SignalKind::Buy => pending = Some(signal),
            SignalKind::Sell => {
                if let Some(entry) = pending.take() {
                    trades.push(Trade {
                        entry_timestamp: entry.timestamp.clone(),
                        exit_timestamp: signal.timestamp.clone(),
                        entry_price: entry.price,
                        exit_price: signal.price,
                        pnl: signal.price - entry.price,
                    });
                }
            }
            SignalKind::Hold => {}
        }
    }

    trades
}

pub fn pnls(trades: &[Trade]) -> Vec<f64> {
    trades.iter().map(|t| t.pnl).collect()
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

fn wins(pnls: &[f64]) -> Vec<f64> {
    pnls.iter().copied().filter(|p| *p > 0.0).collect()
}

/// Break-even trades count on the losing side here.
fn non_wins(pnls: &[f64]) -> Vec<f64> {
    pnls.iter().copied().filter(|p| *p <= 0.0).collect()
}

pub fn total_return(pnls: &[f64]) -> f64 {
    pnls.iter().sum()
}

pub fn average_return(pnls: &[f64]) -> f64 {
    mean(pnls).unwrap_or(0.0)
}

/// Fraction of trades with positive PnL.
pub fn win_rate(pnls: &[f64]) -> f64 {
    if pnls.is_empty() {
        return 0.0;
    }
    pnls.iter().filter(|p| **p > 0.0).count() as f64 / pnls.len() as f64
}

/// Fraction of trades with strictly negative PnL.
pub fn loss_rate(pnls: &[f64]) -> f64 {
    if pnls.is_empty() {
        return 0.0;
    }
    pnls.iter().filter(|p| **p < 0.0).count() as f64 / pnls.len() as f64
}

/// Largest fall of cumulative PnL from its running peak. The peak starts at
/// zero, so an opening loss counts as drawdown.
pub fn max_drawdown(pnls: &[f64]) -> f64 {
    let mut equity = 0.0_f64;
    let mut peak = 0.0_f64;
    let mut max_dd = 0.0_f64;

    for pnl in pnls {
        equity += pnl;
        peak = peak.max(equity);
        max_dd = max_dd.max(peak - equity);
    }

    max_dd
}

pub fn profit_factor(pnls: &[f64]) -> f64 {
    let gross_profit: f64 = pnls.iter().filter(|p| **p > 0.0).sum();
    let gross_loss: f64 = pnls.iter().filter(|p| **p < 0.0).sum::<f64>().abs();
    if gross_loss == 0.0 {
        f64::INFINITY
    } else {
        gross_profit / gross_loss
    }
}

/// `None` with fewer than two trades.
pub fn sharpe_ratio(pnls: &[f64], risk_free_rate: f64) -> Option<f64> {
    if pnls.len() < 2 {
        return None;
    }
    let avg = mean(pnls)?;
    Some((avg - risk_free_rate) / (population_stddev(pnls) + EPSILON))
}

/// `None` with no trades. Downside deviation is taken over losing trades
/// only and is zero when there are none.
pub fn sortino_ratio(pnls: &[f64], risk_free_rate: f64) -> Option<f64> {
    let avg = mean(pnls)?;
    let downside: Vec<f64> = pnls.iter().copied().filter(|p| *p < 0.0).collect();
    Some((avg - risk_free_rate) / (population_stddev(&downside) + EPSILON))
}

pub fn average_win(pnls: &[f64]) -> f64 {
    mean(&wins(pnls)).unwrap_or(0.0)
}

/// Mean of non-positive trades; zero or negative.
pub fn average_loss(pnls: &[f64]) -> f64 {
    mean(&non_wins(pnls)).unwrap_or(0.0)
}

pub fn expectancy(pnls: &[f64]) -> f64 {
    if pnls.is_empty() {
        return 0.0;
    }
    let wr = win_rate(pnls);
    wr * average_win(pnls) - (1.0 - wr) * average_loss(pnls).abs()
}

pub fn payoff_ratio(pnls: &[f64]) -> f64 {
    average_win(pnls) / (average_loss(pnls).abs() + EPSILON)
}

/// Largest single winning trade, 0 when nothing won.
pub fn highest_win(pnls: &[f64]) -> f64 {
    pnls.iter().copied().filter(|p| *p > 0.0).fold(0.0, f64::max)
}

/// Two-decimal rounding used for every reported value. Halves go to the
/// even cent.
pub fn round2(value: f64) -> f64 {
    if value.is_finite() {
        (value * 100.0).round_ties_even() / 100.0
    } else {
        value
    }
}

/// Rounded statistics for one trade list. Win and loss rates are percentages.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricsReport {
    pub total_return: f64,
    pub average_return: f64,
    pub win_rate_pct: f64,
    pub loss_rate_pct: f64,
    pub max_drawdown: f64,
    pub profit_factor: f64,
    pub sortino_ratio: Option<f64>,
    pub expectancy: f64,
    pub average_win: f64,
    pub average_loss: f64,
    pub sharpe_ratio: Option<f64>,
    pub payoff_ratio: f64,
}

impl MetricsReport {
    pub fn from_trades(trades: &[Trade], risk_free_rate: f64) -> Self {
        let pnls = pnls(trades);
        MetricsReport {
            total_return: round2(total_return(&pnls)),
            average_return: round2(average_return(&pnls)),
            win_rate_pct: round2(win_rate(&pnls) * 100.0),
            loss_rate_pct: round2(loss_rate(&pnls) * 100.0),
            max_drawdown: round2(max_drawdown(&pnls)),
            profit_factor: round2(profit_factor(&pnls)),
            sortino_ratio: sortino_ratio(&pnls, risk_free_rate).map(round2),
            expectancy: round2(expectancy(&pnls)),
            average_win: round2(average_win(&pnls)),
            average_loss: round2(average_loss(&pnls)),
            sharpe_ratio: sharpe_ratio(&pnls, risk_free_rate).map(round2),
            payoff_ratio: round2(payoff_ratio(&pnls)),
        }
    }

    /// Report rows in their fixed presentation order.
    pub fn entries(&self) -> Vec<(&'static str, Option<f64>)> {
        vec![
            ("Total Return", Some(self.total_return)),
            ("Average Return", Some(self.average_return)),
            ("Win Rate (%)", Some(self.win_rate_pct)),
            ("Loss Rate (%)", Some(self.loss_rate_pct)),
            ("Max Drawdown", Some(self.max_drawdown)),
            ("Profit Factor", Some(self.profit_factor)),
            ("Sortino Ratio", self.sortino_ratio),
            ("Expectancy", Some(self.expectancy)),
            ("Average Win", Some(self.average_win)),
            ("Average Loss", Some(self.average_loss)),
            ("Sharpe Ratio", self.sharpe_ratio),
            ("Payoff Ratio", Some(self.payoff_ratio)),
        ]
    }
}

/// Trades plus report for a parsed log; `None` when no round trip closed.
pub fn analyze_signals(
    signals: &[LoggedSignal],
    risk_free_rate: f64,
) -> Option<(Vec<Trade>, MetricsReport)> {
    let trades = reconstruct_trades(signals);
    if trades.is_empty() {
        return None;
    }
    let report = MetricsReport::from_trades(&trades, risk_free_rate);
    Some((trades, report))
}

/// Reads a signal log through `log` and analyses it. A missing or unreadable
/// log is reported as "no metrics" rather than an error.
pub fn analyze_file(
    log: &dyn SignalLogPort,
    path: &Path,
    risk_free_rate: f64,
) -> Option<(Vec<Trade>, MetricsReport)> {
    let read = match log.read_signals(path) {
        Ok(read) => read,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "signal log unavailable");
            return None;
        }
    };
    if read.skipped > 0 {
        warn!(path = %path.display(), skipped = read.skipped, "skipped malformed signal rows");
    }
    let analysis = analyze_signals(&read.signals, risk_free_rate);
    if analysis.is_none() {
        debug!(path = %path.display(), rows = read.signals.len(), "no completed trades");
    }
    analysis
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn sig(i: usize, kind: SignalKind, price: f64) -> LoggedSignal {
        LoggedSignal {
            timestamp: format!("2025-05-08 00:{:02}:00", i),
            kind,
            price,
        }
    }

    fn trades_from(pnls: &[f64]) -> Vec<Trade> {
        pnls.iter()
            .map(|&pnl| Trade {
                entry_timestamp: String::new(),
                exit_timestamp: String::new(),
                entry_price: 100.0,
                exit_price: 100.0 + pnl,
                pnl,
            })
            .collect()
    }

    #[test]
    fn reconstruct_single_round_trip() {
        let trades = reconstruct_trades(&[
            sig(1, SignalKind::Buy, 100.0),
            sig(2, SignalKind::Sell, 110.0),
        ]);
        assert_eq!(trades.len(), 1);
        assert_relative_eq!(trades[0].pnl, 10.0);
        assert_eq!(trades[0].entry_timestamp, "2025-05-08 00:01:00");
        assert_eq!(trades[0].exit_timestamp, "2025-05-08 00:02:00");
    }

    #[test]
    fn reconstruct_ignores_dangling_buy_and_orphan_sell() {
        assert!(reconstruct_trades(&[sig(1, SignalKind::Buy, 100.0)]).is_empty());
        assert!(reconstruct_trades(&[sig(1, SignalKind::Sell, 100.0)]).is_empty());
    }

    #[test]
    fn reconstruct_second_buy_overwrites_pending_entry() {
        // known edge case: the first BUY at 100 is discarded
        let trades = reconstruct_trades(&[
            sig(1, SignalKind::Buy, 100.0),
            sig(2, SignalKind::Buy, 105.0),
            sig(3, SignalKind::Sell, 110.0),
        ]);
        assert_eq!(trades.len(), 1);
        assert_relative_eq!(trades[0].entry_price, 105.0);
        assert_relative_eq!(trades[0].pnl, 5.0);
    }

    #[test]
    fn reconstruct_consecutive_sells_close_once() {
        let trades = reconstruct_trades(&[
            sig(1, SignalKind::Buy, 100.0),
            sig(2, SignalKind::Sell, 90.0),
            sig(3, SignalKind::Sell, 80.0),
            sig(4, SignalKind::Hold, 85.0),
        ]);
        assert_eq!(trades.len(), 1);
        assert_relative_eq!(trades[0].pnl, -10.0);
    }

    #[test]
    fn empty_history_degenerates_cleanly() {
        let report = MetricsReport::from_trades(&[], 0.0);
        assert_eq!(report.total_return, 0.0);
        assert_eq!(report.average_return, 0.0);
        assert_eq!(report.win_rate_pct, 0.0);
        assert_eq!(report.loss_rate_pct, 0.0);
        assert_eq!(report.max_drawdown, 0.0);
        assert_eq!(report.sharpe_ratio, None);
        assert_eq!(report.sortino_ratio, None);
        assert_eq!(report.expectancy, 0.0);
        assert!(report.profit_factor.is_infinite());
    }

    #[test]
    fn single_trade_report() {
        let report = MetricsReport::from_trades(&trades_from(&[10.0]), 0.0);
        assert_eq!(report.total_return, 10.0);
        assert_eq!(report.win_rate_pct, 100.0);
        assert_eq!(report.average_win, 10.0);
        assert_eq!(report.average_loss, 0.0);
        assert_eq!(report.sharpe_ratio, None);
        // no losers: downside deviation 0, ratio blows up to mean / ε
        assert_relative_eq!(report.sortino_ratio.unwrap(), 10.0 / EPSILON);
        assert!(report.profit_factor.is_infinite());
    }

    #[test]
    fn mixed_trade_statistics() {
        let p = [10.0, -5.0, 20.0, -10.0, 0.0];
        assert_relative_eq!(total_return(&p), 15.0);
        assert_relative_eq!(average_return(&p), 3.0);
        assert_relative_eq!(win_rate(&p), 0.4);
        assert_relative_eq!(loss_rate(&p), 0.4);
        assert_relative_eq!(profit_factor(&p), 2.0);
        assert_relative_eq!(average_win(&p), 15.0);
        // break-even counts toward the average loss
        assert_relative_eq!(average_loss(&p), -5.0);
        // 0.4 * 15 - 0.6 * 5
        assert_relative_eq!(expectancy(&p), 3.0);
        assert_relative_eq!(payoff_ratio(&p), 3.0, max_relative = 1e-9);
        assert_relative_eq!(highest_win(&p), 20.0);
    }

    #[test]
    fn max_drawdown_from_zero_peak() {
        // equity: 10, 5, 25, 15, 15 -> worst fall 10
        assert_relative_eq!(max_drawdown(&[10.0, -5.0, 20.0, -10.0, 0.0]), 10.0);
        // opening loss is drawdown from the zero starting peak
        assert_relative_eq!(max_drawdown(&[-3.0, 1.0]), 3.0);
        assert_eq!(max_drawdown(&[]), 0.0);
    }

    #[test]
    fn sharpe_uses_population_deviation() {
        // mean 5, population std 5
        let s = sharpe_ratio(&[0.0, 10.0], 0.0).unwrap();
        assert_relative_eq!(s, 1.0, max_relative = 1e-9);
        let s = sharpe_ratio(&[0.0, 10.0], 1.0).unwrap();
        assert_relative_eq!(s, 0.8, max_relative = 1e-9);
    }

    #[test]
    fn sortino_uses_losing_trades_only() {
        // mean 0, downside [-10, -20] std 5 -> (0 - 0) / 5
        let s = sortino_ratio(&[30.0, -10.0, -20.0], 0.0).unwrap();
        assert_relative_eq!(s, 0.0);
        // mean 10, downside [-10, -30] std 10
        let s = sortino_ratio(&[70.0, -10.0, -30.0, 10.0], 0.0).unwrap();
        assert_relative_eq!(s, 1.0, max_relative = 1e-9);
    }

    #[test]
    fn highest_win_zero_without_winners() {
        assert_eq!(highest_win(&[-1.0, 0.0]), 0.0);
        assert_eq!(highest_win(&[]), 0.0);
    }

    #[test]
    fn rounding_to_cents() {
        assert_eq!(round2(1.23456), 1.23);
        assert_eq!(round2(-0.005001), -0.01);
        assert!(round2(f64::INFINITY).is_infinite());
    }

    #[test]
    fn rounding_halves_to_even() {
        assert_eq!(round2(0.125), 0.12);
        assert_eq!(round2(0.375), 0.38);
        assert_eq!(round2(-0.125), -0.12);
        assert_eq!(round2(2.5), 2.5);
    }

    #[test]
    fn entries_in_fixed_order() {
        let report = MetricsReport::from_trades(&trades_from(&[10.0]), 0.0);
        let keys: Vec<&str> = report.entries().iter().map(|(k, _)| *k).collect();
        assert_eq!(
            keys,
            vec![
                "Total Return",
                "Average Return",
                "Win Rate (%)",
                "Loss Rate (%)",
                "Max Drawdown",
                "Profit Factor",
                "Sortino Ratio",
                "Expectancy",
                "Average Win",
                "Average Loss",
                "Sharpe Ratio",
                "Payoff Ratio",
            ]
        );
        assert_eq!(report.entries()[10].1, None);
    }

    #[test]
    fn analyze_signals_requires_a_trade() {
        assert!(analyze_signals(&[sig(1, SignalKind::Buy, 100.0)], 0.0).is_none());
        let (trades, report) = analyze_signals(
            &[sig(1, SignalKind::Buy, 100.0), sig(2, SignalKind::Sell, 110.0)],
            0.0,
        )
        .unwrap();
        assert_eq!(trades.len(), 1);
        assert_eq!(report.total_return, 10.0);
    }

    #[test]
    fn analysis_is_idempotent() {
        let log = vec![
            sig(1, SignalKind::Buy, 100.0),
            sig(2, SignalKind::Sell, 103.5),
            sig(3, SignalKind::Buy, 101.0),
            sig(4, SignalKind::Sell, 97.25),
        ];
        assert_eq!(analyze_signals(&log, 0.0), analyze_signals(&log, 0.0));
    }
}
