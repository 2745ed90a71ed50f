//! End to end over the boundaries: provider → history → live signal →
//! report → delivery, and backtest → artifacts.

mod common;

use std::fmt::Write as _;

use common::{d, toy_config, MockProvider, RecordingNotifier};
use taa_core::data::DataError;
use taa_runner::artifacts::{read_summary_json, ArtifactWriter};
use taa_runner::backtest::BacktestRunner;
use taa_runner::data_loader::load_for_config;
use taa_runner::live::LiveSignal;
use taa_runner::notify::deliver_all;
use taa_runner::report::{render_backtest_summary, render_signal_report, SignalReport};
use taa_runner::RunError;

fn toy_signal() -> LiveSignal {
    let provider = MockProvider::toy();
    let history = load_for_config(&provider, &toy_config(), d(1), d(31)).unwrap();
    LiveSignal::compute(&toy_config(), &history).unwrap()
}

#[test]
fn loads_and_signals_last_two_days() {
    let signal = toy_signal();
    assert_eq!(signal.yesterday.date, d(5));
    assert_eq!(signal.today.date, d(6));
    assert!(signal.needs_rebalance());
    assert_eq!(signal.event.changed, vec!["A".to_string(), "B".to_string()]);
}

#[test]
fn report_sections() {
    let report = render_signal_report(&toy_signal());

    assert!(report.starts_with("🔔 *toy*\n(2024-01-06 Saturday close)\n"));
    assert!(report.contains("🔼 *Rebalance: trade required*"));
    assert!(report.contains("🎯 A: 0.0%\n🎯 B: 0.0%\n🎯 Cash: 100.0%"));
    assert!(report.contains("A: 60.0% -> 0.0% | 🔽 -60.0%"));
    assert!(report.contains("B: 20.0% -> 0.0% | 🔽 -20.0%"));
    assert!(report.contains("Cash: 20.0% -> 100.0% | 🔼 +80.0%"));
    assert!(report.contains("🔵 A: $95.00 (-20.8%)"));
    assert!(report.contains("🔵 B: $48.00 (-14.3%)"));
    assert!(report.contains("(band +/- 10.0% rule)"));
    assert!(report.contains(
        "*A (0/2 🔴OFF)*\n- 2d: OFF (-11.6%) [new OFF]\n- 3d: OFF (-18.6%) [new OFF]"
    ));
    assert!(report.contains(
        "*B (0/2 🔴OFF)*\n- 2d: OFF (-7.7%)\n- 3d: OFF (-12.2%) [new OFF]"
    ));
}

#[test]
fn report_writes_through_any_formatter() {
    let signal = toy_signal();
    let mut out = String::from("> ");
    write!(out, "{}", SignalReport(&signal)).unwrap();
    let rendered = render_signal_report(&signal);
    assert_eq!(out, format!("> {rendered}"));

    let order = ["[1] Target", "[2] Weight", "[3] Last", "[4] Moving"];
    let positions: Vec<usize> = order.iter().map(|h| rendered.find(h).unwrap()).collect();
    assert!(positions.windows(2).all(|p| p[0] < p[1]));
    assert!(rendered.ends_with("- 3d: OFF (-12.2%) [new OFF]"));
}

#[test]
fn report_reads_raw_score() {
    let provider = MockProvider::toy();
    let history = load_for_config(&provider, &toy_config(), d(1), d(5)).unwrap();
    let signal = LiveSignal::compute(&toy_config(), &history).unwrap();
    let report = render_signal_report(&signal);
    // Day 4 (Jan 5): A has 2 of 2 windows ON, B has 1.
    assert!(report.contains("*A (2/2 🟢ON)*"));
    assert!(report.contains("*B (1/2 🟢ON)*"));
    assert!(report.contains("🟢 *Rebalance: no trade*"));
    assert!(report.contains("A: 60.0% -> 60.0% | (unchanged)"));
}

#[test]
fn delivery_attempts_every_destination() {
    let report = render_signal_report(&toy_signal());
    let notifier = RecordingNotifier {
        fail_for: vec!["111".into()],
        ..Default::default()
    };
    let destinations = vec!["111".to_string(), "222".to_string()];
    let outcomes = deliver_all(&notifier, &destinations, &report);

    let sent = notifier.sent.lock().unwrap();
    assert_eq!(sent.len(), 2);
    assert!(sent.iter().all(|(_, text)| text == &report));
    assert!(outcomes[0].result.is_err());
    assert!(outcomes[1].result.is_ok());
    assert!(outcomes.iter().any(|o| o.result.is_err()));
}

#[test]
fn empty_provider_result_is_fatal() {
    let mut provider = MockProvider::toy();
    provider.data.remove("B");
    let err = load_for_config(&provider, &toy_config(), d(1), d(31)).unwrap_err();
    assert!(matches!(err, RunError::Data(DataError::EmptyResult { .. })));
}

#[test]
fn invalid_config_fails_before_fetch() {
    let mut config = toy_config();
    config.windows.clear();
    let err = load_for_config(&MockProvider::toy(), &config, d(1), d(31)).unwrap_err();
    assert!(matches!(err, RunError::Config(_)));
}

#[test]
fn backtest_artifacts_round_trip() {
    let provider = MockProvider::toy();
    let history = load_for_config(&provider, &toy_config(), d(1), d(31)).unwrap();
    let result = BacktestRunner::new(&toy_config(), &history)
        .unwrap()
        .run()
        .unwrap();

    let dir = tempfile::tempdir().unwrap();
    let paths = ArtifactWriter::new(dir.path()).unwrap().write(&result).unwrap();
    assert!(paths.dir.ends_with(&result.fingerprint));

    let csv = std::fs::read_to_string(&paths.cumulative_csv).unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines[0], "date,daily_return,cumulative");
    assert_eq!(lines.len(), 5);
    assert!(lines[1].starts_with("2024-01-03,0.0,1.0"));

    let summary = read_summary_json(&paths.summary_json).unwrap();
    assert_eq!(summary.fingerprint, result.fingerprint);
    assert_eq!(summary.first_date, Some(d(3)));
    assert_eq!(summary.last_date, Some(d(6)));
    assert_eq!(summary.metrics.total_days, 3);

    let text = render_backtest_summary(&result);
    assert!(text.contains("MDD    : -8.00%"));
    assert!(text.contains("Days   : 3 returns over 2024-01-03 -> 2024-01-06"));
}
