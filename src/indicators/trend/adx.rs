//! ADX (Average Directional Index) indicator
//!
//! Directional movement is averaged over a plain `period` window rather than
//! Wilder-smoothed, and the emitted value is that window's DX.

use crate::common::math;
use crate::models::indicators::AdxPoint;

/// One point per candle from index `period` onwards; empty when there are
/// fewer than `period + 1` candles.
///
/// Zero true range gives zero directional indices, and `+DI + -DI == 0`
/// gives an ADX of 0 (no trend strength).
pub fn calculate_adx(
    high: &[f64],
    low: &[f64],
    close: &[f64],
    time: &[i64],
    period: u32,
) -> Vec<AdxPoint> {
    let period = period as usize;
    let n = close.len().min(high.len()).min(low.len()).min(time.len());
    if period == 0 || n <= period {
        return Vec::new();
    }

    let mut tr_values = Vec::with_capacity(n - 1);
    let mut plus_dm_values = Vec::with_capacity(n - 1);
    let mut minus_dm_values = Vec::with_capacity(n - 1);

    for i in 1..n {
        tr_values.push(math::true_range(high[i], low[i], close[i - 1]));

        let up_move = high[i] - high[i - 1];
        let down_move = low[i - 1] - low[i];
        plus_dm_values.push(if up_move > down_move { up_move.max(0.0) } else { 0.0 });
        minus_dm_values.push(if down_move > up_move { down_move.max(0.0) } else { 0.0 });
    }

    let mut out = Vec::with_capacity(tr_values.len() + 1 - period);
    for end in period..=tr_values.len() {
        let start = end - period;
        let avg_tr = math::mean(&tr_values[start..end]).unwrap_or(0.0);
        let avg_plus = math::mean(&plus_dm_values[start..end]).unwrap_or(0.0);
        let avg_minus = math::mean(&minus_dm_values[start..end]).unwrap_or(0.0);

        let (plus_di, minus_di) = if avg_tr > 0.0 {
            (100.0 * avg_plus / avg_tr, 100.0 * avg_minus / avg_tr)
        } else {
            (0.0, 0.0)
        };

        let di_sum = plus_di + minus_di;
        let dx = if di_sum > 0.0 {
            100.0 * (plus_di - minus_di).abs() / di_sum
        } else {
            0.0
        };

        // tr_values[k] describes the move into candle k + 1
        out.push(AdxPoint {
            time: time[end],
            value: dx,
            plus_di,
            minus_di,
        });
    }

    out
}
