//! Unit tests for ADX indicator

use cryptoscan::indicators::trend::calculate_adx;

use crate::support::{candles_from_closes, times};

fn columns(closes: &[f64]) -> (Vec<f64>, Vec<f64>, Vec<f64>, Vec<i64>) {
    let candles = candles_from_closes(closes, 100.0);
    (
        candles.iter().map(|c| c.high).collect(),
        candles.iter().map(|c| c.low).collect(),
        candles.iter().map(|c| c.close).collect(),
        candles.iter().map(|c| c.time).collect(),
    )
}

#[test]
fn test_adx_insufficient_data() {
    let (h, l, c, t) = columns(&[100.0; 14]);
    assert!(calculate_adx(&h, &l, &c, &t, 14).is_empty());
}

#[test]
fn test_adx_first_point_at_period() {
    let closes: Vec<f64> = (0..30).map(|i| 100.0 + i as f64).collect();
    let (h, l, c, t) = columns(&closes);
    let adx = calculate_adx(&h, &l, &c, &t, 14);
    assert_eq!(adx.len(), 30 - 14);
    assert_eq!(adx[0].time, t[14]);
}

#[test]
fn test_adx_strong_uptrend() {
    let closes: Vec<f64> = (0..40).map(|i| 100.0 + 2.0 * i as f64).collect();
    let (h, l, c, t) = columns(&closes);
    let last = *calculate_adx(&h, &l, &c, &t, 14).last().unwrap();
    assert!(last.plus_di > last.minus_di);
    assert!(last.value > 25.0);
    assert!(last.value <= 100.0);
}

#[test]
fn test_adx_zero_range_is_zero() {
    let prices = vec![50.0; 20];
    let adx = calculate_adx(&prices, &prices, &prices, &times(20), 14);
    assert!(adx.iter().all(|p| p.value == 0.0 && p.plus_di == 0.0 && p.minus_di == 0.0));
}
