//! Unit tests for EMA indicator

use cryptoscan::indicators::trend::{calculate_ema, ema_values};

use crate::support::{assert_close, times};

#[test]
fn test_ema_of_constant_series_is_constant() {
    let values = vec![42.5; 60];
    let ema = calculate_ema(&values, &times(60), 20);
    assert_eq!(ema.len(), 60);
    for v in ema.values() {
        assert_close(v, 42.5);
    }
}

#[test]
fn test_ema_has_one_value_per_input() {
    let values: Vec<f64> = (0..25).map(|i| 100.0 + i as f64).collect();
    let time = times(25);
    let ema = calculate_ema(&values, &time, 50);
    // no warm-up gap even when the period exceeds the history
    assert_eq!(ema.len(), 25);
    assert_eq!(ema.points()[0].time, time[0]);
    assert_eq!(ema.points()[24].time, time[24]);
}

#[test]
fn test_ema_known_values() {
    // multiplier = 2 / (3 + 1) = 0.5
    let out = ema_values(&[2.0, 4.0, 8.0], 3);
    assert_eq!(out, vec![2.0, 3.0, 5.5]);
}

#[test]
fn test_ema_period_one_follows_input() {
    let values = [3.0, 1.0, 4.0, 1.0, 5.0];
    assert_eq!(ema_values(&values, 1), values.to_vec());
}

#[test]
fn test_ema_lags_rising_series() {
    let values: Vec<f64> = (0..40).map(|i| 100.0 + i as f64).collect();
    let ema = calculate_ema(&values, &times(40), 10);
    let last = ema.last_value().unwrap();
    assert!(last < 139.0);
    assert!(last > 130.0);
}

#[test]
fn test_ema_empty_input() {
    assert!(calculate_ema(&[], &[], 20).is_empty());
}
