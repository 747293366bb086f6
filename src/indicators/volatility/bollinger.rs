//! Bollinger Bands indicator

use crate::common::math;
use crate::models::indicators::BollingerPoint;

/// Calculate Bollinger Bands
///
/// Middle Band = SMA(period)
/// Upper Band = Middle + (std_dev * population standard deviation)
/// Lower Band = Middle - (std_dev * population standard deviation)
/// Bandwidth = (Upper - Lower) / Middle, absent when Middle is zero.
pub fn calculate_bollinger_bands(
    values: &[f64],
    time: &[i64],
    period: u32,
    std_dev: f64,
) -> Vec<BollingerPoint> {
    let period = period as usize;
    if period == 0 || values.len() < period {
        return Vec::new();
    }

    values
        .windows(period)
        .enumerate()
        .filter_map(|(offset, window)| {
            let middle = math::mean(window)?;
            let sd = math::population_std_dev(window, middle)?;
            let upper = middle + std_dev * sd;
            let lower = middle - std_dev * sd;
            let bandwidth = if middle != 0.0 {
                Some((upper - lower) / middle)
            } else {
                None
            };
            Some(BollingerPoint {
                time: time[offset + period - 1],
                upper,
                middle,
                lower,
                bandwidth,
            })
        })
        .collect()
}
