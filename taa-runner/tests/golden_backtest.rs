//! Golden backtest over the toy fixture.
//!
//! Returns accumulate from row 3 (the largest window). Weights of day t apply
//! to the return from t-1 to t:
//!
//! ```text
//! row  weights(A,B)  return(A)      return(B)     daily_return   cumulative
//!  2   (anchor)                                                  1.0
//!  3   0.6 0.2       135/130 - 1    60/50 - 1     0.0630769      1.0630769
//!  4   0.6 0.2       120/135 - 1    56/60 - 1    -0.08           0.9780308
//!  5   0.0 0.0       ...            ...           0.0            0.9780308
//! ```

mod common;

use common::{d, toy_config, toy_history};
use taa_runner::backtest::BacktestRunner;

#[test]
fn golden_daily_returns_and_curve() {
    let history = toy_history();
    let result = BacktestRunner::new(&toy_config(), &history)
        .unwrap()
        .run()
        .unwrap();

    assert_eq!(result.first_return_day, 3);
    assert_eq!(result.dates(), vec![d(3), d(4), d(5), d(6)]);

    let r3 = 0.6 * (135.0 / 130.0 - 1.0) + 0.4 * 0.5 * (60.0 / 50.0 - 1.0);
    let r4 = 0.6 * (120.0 / 135.0 - 1.0) + 0.4 * 0.5 * (56.0 / 60.0 - 1.0);
    let returns = result.returns();
    assert_eq!(returns.len(), 3);
    assert!((returns[0] - r3).abs() < 1e-12);
    assert!((returns[0] - 0.063_076_923).abs() < 1e-8);
    assert!((returns[1] - r4).abs() < 1e-12);
    assert!((returns[1] + 0.08).abs() < 1e-12);
    assert_eq!(returns[2], 0.0);

    let cum = result.cumulative();
    assert_eq!(cum[0], 1.0);
    assert!((cum[1] - (1.0 + r3)).abs() < 1e-12);
    assert!((cum[3] - (1.0 + r3) * (1.0 + r4)).abs() < 1e-12);
    assert!((cum[3] - 0.978_030_769).abs() < 1e-8);
}

#[test]
fn golden_stats() {
    let history = toy_history();
    let result = BacktestRunner::new(&toy_config(), &history)
        .unwrap()
        .run()
        .unwrap();
    let m = &result.metrics;

    let r3 = 0.6 * (135.0 / 130.0 - 1.0) + 0.2 * 0.2;
    let r4 = -0.08;
    let last = (1.0 + r3) * (1.0 + r4);

    assert_eq!(m.total_days, 3);
    assert_eq!(m.return_days, 3);
    assert!((m.max_drawdown - r4).abs() < 1e-12);
    assert!((m.total_return - (last - 1.0)).abs() < 1e-12);
    assert!((m.cagr - (f64::powf(last, 365.25 / 3.0) - 1.0)).abs() < 1e-12);

    let returns = [r3, r4, 0.0];
    let mean = returns.iter().sum::<f64>() / 3.0;
    let var = returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / 2.0;
    let sharpe = mean * 252.0 / (var.sqrt() * 252.0_f64.sqrt());
    assert!((m.sharpe - sharpe).abs() < 1e-9);
}

#[test]
fn golden_curve_weights_match_snapshots() {
    let history = toy_history();
    let result = BacktestRunner::new(&toy_config(), &history)
        .unwrap()
        .run()
        .unwrap();
    let expected = [[0.6, 0.0], [0.6, 0.2], [0.6, 0.2], [0.0, 0.0]];
    for (point, weights) in result.curve.iter().zip(expected) {
        for (got, want) in point.weights.iter().zip(weights) {
            assert!((got - want).abs() < 1e-12, "{}: {got} vs {want}", point.date);
        }
    }
}
