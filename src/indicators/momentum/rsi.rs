//! RSI (Relative Strength Index) indicator

use crate::models::indicators::IndicatorSeries;

/// Calculate RSI with Wilder's smoothing
///
/// RSI = 100 - (100 / (1 + RS)), RS = Average Gain / Average Loss.
/// The first value (at candle `period`) uses the simple mean of the first
/// `period` deltas; later values smooth with
/// `avg = (avg * (period - 1) + current) / period`.
/// Needs `period + 1` values, otherwise the series is empty.
pub fn calculate_rsi(values: &[f64], time: &[i64], period: u32) -> IndicatorSeries {
    let p = period as usize;
    let n = values.len().min(time.len());
    if p == 0 || n <= p {
        return IndicatorSeries::new();
    }

    let mut gains = 0.0;
    let mut losses = 0.0;
    for i in 1..=p {
        let change = values[i] - values[i - 1];
        if change > 0.0 {
            gains += change;
        } else {
            losses -= change;
        }
    }

    let mut avg_gain = gains / p as f64;
    let mut avg_loss = losses / p as f64;

    let mut series = IndicatorSeries::with_capacity(n - p);
    series.push(time[p], rsi_from_averages(avg_gain, avg_loss));

    for i in (p + 1)..n {
        let change = values[i] - values[i - 1];
        let gain = change.max(0.0);
        let loss = (-change).max(0.0);

        avg_gain = (avg_gain * (p as f64 - 1.0) + gain) / p as f64;
        avg_loss = (avg_loss * (p as f64 - 1.0) + loss) / p as f64;

        series.push(time[i], rsi_from_averages(avg_gain, avg_loss));
    }

    series
}

/// A zero average loss means an infinite RS, i.e. an RSI of exactly 100.
fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        return 100.0;
    }
    let rs = avg_gain / avg_loss;
    100.0 - (100.0 / (1.0 + rs))
}
