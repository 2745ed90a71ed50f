//! Text payloads: the daily signal report (Telegram Markdown) and the
//! backtest console summary.

use std::fmt;

use taa_core::domain::WindowState;
use taa_core::engine::WeightDelta;

use crate::backtest::BacktestResult;
use crate::live::LiveSignal;

const RULE: &str = "--------------------";

/// Percent with one decimal. Values that would print as `-0.0` print as `0.0`.
fn pct(value: f64) -> String {
    format!("{:.1}%", clean(value * 100.0))
}

fn signed_pct(value: f64) -> String {
    format!("{:+.1}%", clean(value * 100.0))
}

fn clean(percent: f64) -> f64 {
    if percent.abs() < 0.05 {
        0.0
    } else {
        percent
    }
}

fn change_row(name: &str, delta: &WeightDelta) -> String {
    let change = if delta.is_unchanged() {
        "(unchanged)".to_string()
    } else {
        let arrow = if delta.delta > 0.0 { "🔼" } else { "🔽" };
        format!("{arrow} {}", signed_pct(delta.delta))
    };
    format!(
        "{name}: {} -> {} | {change}",
        pct(delta.yesterday),
        pct(delta.today)
    )
}

/// Render the daily report for a live signal.
///
/// Sections: rebalance verdict, today's target weights, weight changes,
/// last-session market status, and per-window trend detail. Scores are the
/// raw window counts carried by each signal.
pub fn render_signal_report(signal: &LiveSignal) -> String {
    SignalReport(signal).to_string()
}

/// Display adapter writing the daily report.
pub struct SignalReport<'a>(pub &'a LiveSignal);

impl fmt::Display for SignalReport<'_> {
    fn fmt(&self, out: &mut fmt::Formatter<'_>) -> fmt::Result {
        let signal = self.0;
        let config = &signal.config;
        let today = &signal.today;
        let event = &signal.event;
        let windows = config.window_count();

        writeln!(out, "🔔 *{}*", config.name)?;
        writeln!(out, "({} close)", today.date.format("%Y-%m-%d %A"))?;

        if event.needs_rebalance {
            writeln!(out, "\n🔼 *Rebalance: trade required*")?;
            writeln!(out, "(target weights changed)")?;
        } else {
            writeln!(out, "\n🟢 *Rebalance: no trade*")?;
            writeln!(out, "(weights held)")?;
        }
        writeln!(out, "\n{RULE}")?;

        writeln!(out, "💰 *[1] Target weights today*")?;
        for (signal, delta) in today.signals.iter().zip(&event.assets) {
            let marker = if delta.is_unchanged() { "•" } else { "🎯" };
            writeln!(out, "{marker} {}: {}", signal.symbol, pct(signal.target_weight))?;
        }
        let marker = if event.cash.is_unchanged() { "•" } else { "🎯" };
        writeln!(out, "{marker} Cash: {}", pct(today.cash_weight))?;
        writeln!(out, "\n{RULE}")?;

        writeln!(out, "📊 *[2] Weight changes*")?;
        for delta in &event.assets {
            writeln!(out, "{}", change_row(&delta.label, delta))?;
        }
        writeln!(out, "{}", change_row("Cash", &event.cash))?;
        writeln!(out, "\n{RULE}")?;

        writeln!(out, "📈 *[3] Last session*")?;
        for (signal, change) in today.signals.iter().zip(signal.price_changes()) {
            let dot = if change >= 0.0 { "🔴" } else { "🔵" };
            writeln!(
                out,
                "{dot} {}: ${:.2} ({})",
                signal.symbol,
                signal.close,
                signed_pct(change)
            )?;
        }
        writeln!(out, "\n{RULE}")?;

        writeln!(out, "🔍 *[4] Moving-average detail*")?;
        write!(out, "(band +/- {} rule)", pct(config.band_pct))?;
        for (asset, yesterday) in today.signals.iter().zip(&signal.yesterday.signals) {
            let status = if asset.score > 0 { "🟢ON" } else { "🔴OFF" };
            write!(
                out,
                "\n\n*{} ({}/{windows} {status})*",
                asset.symbol, asset.score
            )?;
            for (reading, before) in asset.windows.iter().zip(&yesterday.windows) {
                let disparity = match reading.band {
                    Some(band) => signed_pct(band.disparity(asset.close)),
                    None => "n/a".to_string(),
                };
                let transition = match (before.state, reading.state) {
                    (WindowState::Off, WindowState::On) => " [new ON]",
                    (WindowState::On, WindowState::Off) => " [new OFF]",
                    _ => "",
                };
                write!(
                    out,
                    "\n- {}d: {} ({disparity}){transition}",
                    reading.window,
                    reading.state.label()
                )?;
            }
        }
        Ok(())
    }
}

/// Console summary of one backtest run.
pub fn render_backtest_summary(result: &BacktestResult) -> String {
    let m = &result.metrics;
    let banner = "=".repeat(50);
    let period = match (result.start_date(), result.end_date()) {
        (Some(first), Some(last)) => format!("{first} -> {last}"),
        _ => "-".to_string(),
    };
    format!(
        "{banner}\n\
📊 Backtest summary ({name}, band {band})\n\
{rule}\n\
CAGR   : {cagr:.2}%\n\
MDD    : {mdd:.2}%\n\
Sharpe : {sharpe:.2}\n\
Total  : {total:+.2}%\n\
Days   : {days} returns over {period}\n\
Config : {fingerprint}\n\
{banner}",
        name = result.config.name,
        band = pct(result.config.band_pct),
        rule = "-".repeat(50),
        cagr = m.cagr * 100.0,
        mdd = m.max_drawdown * 100.0,
        sharpe = m.sharpe,
        total = m.total_return * 100.0,
        days = m.return_days,
        fingerprint = result.fingerprint,
    )
}
