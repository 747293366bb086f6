//! Unit tests for RSI indicator

use cryptoscan::indicators::momentum::calculate_rsi;

use crate::support::times;

#[test]
fn test_rsi_insufficient_data() {
    let mut values = vec![100.0; 13];
    values.push(90.0);
    assert!(calculate_rsi(&values, &times(14), 14).is_empty());
}

#[test]
fn test_rsi_first_value_at_period() {
    let values: Vec<f64> = (0..20).map(|i| 100.0 + (i % 3) as f64).collect();
    let time = times(20);
    let rsi = calculate_rsi(&values, &time, 14);
    assert_eq!(rsi.len(), 20 - 14);
    assert_eq!(rsi.points()[0].time, time[14]);
}

#[test]
fn test_rsi_monotonic_increase_is_hundred() {
    let values: Vec<f64> = (0..30).map(|i| 100.0 + i as f64).collect();
    let rsi = calculate_rsi(&values, &times(30), 14);
    assert!(rsi.values().iter().all(|&v| v == 100.0));
}

#[test]
fn test_rsi_monotonic_decrease_is_zero() {
    let values: Vec<f64> = (0..30).map(|i| 100.0 - i as f64).collect();
    let rsi = calculate_rsi(&values, &times(30), 14);
    assert!(rsi.values().iter().all(|&v| v == 0.0));
}

#[test]
fn test_rsi_range() {
    let values: Vec<f64> = (0..200)
        .map(|i| 100.0 + 10.0 * (i as f64 / 7.0).sin() + (i % 5) as f64)
        .collect();
    let rsi = calculate_rsi(&values, &times(200), 14);
    assert!(!rsi.is_empty());
    for v in rsi.values() {
        assert!((0.0..=100.0).contains(&v), "rsi out of range: {}", v);
    }
}

#[test]
fn test_rsi_flat_series_is_hundred() {
    // no losses at all: average loss is zero
    let values = vec![10.0; 20];
    let rsi = calculate_rsi(&values, &times(20), 14);
    assert_eq!(rsi.last_value(), Some(100.0));
}
