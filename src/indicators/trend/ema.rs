//! EMA (Exponential Moving Average) indicator

use crate::models::indicators::IndicatorSeries;

/// Raw EMA recurrence seeded with the first value.
///
/// `ema[0] = values[0]`, then `ema[i] = (values[i] - ema[i-1]) * 2/(period+1) + ema[i-1]`.
/// The output has one value per input, with no warm-up gap.
pub fn ema_values(values: &[f64], period: u32) -> Vec<f64> {
    if period == 0 || values.is_empty() {
        return Vec::new();
    }

    let multiplier = 2.0 / (period as f64 + 1.0);
    let mut out = Vec::with_capacity(values.len());
    let mut prev = values[0];
    out.push(prev);

    for &value in &values[1..] {
        prev = (value - prev) * multiplier + prev;
        out.push(prev);
    }

    out
}

/// EMA series stamped with candle times
pub fn calculate_ema(values: &[f64], time: &[i64], period: u32) -> IndicatorSeries {
    let mut series = IndicatorSeries::with_capacity(values.len());
    for (value, &t) in ema_values(values, period).into_iter().zip(time) {
        series.push(t, value);
    }
    series
}
