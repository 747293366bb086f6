//! SMA (Simple Moving Average)

use crate::common::math;
use crate::models::indicators::IndicatorSeries;

/// Trailing mean; the first `period - 1` inputs produce no value.
pub fn calculate_sma(values: &[f64], time: &[i64], period: u32) -> IndicatorSeries {
    let period = period as usize;
    if period == 0 || values.len() < period {
        return IndicatorSeries::new();
    }

    let mut series = IndicatorSeries::with_capacity(values.len() - period + 1);
    for (offset, window) in values.windows(period).enumerate() {
        if let Some(avg) = math::mean(window) {
            series.push(time[offset + period - 1], avg);
        }
    }
    series
}
