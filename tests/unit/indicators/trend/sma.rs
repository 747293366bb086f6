//! Unit tests for SMA (used for the volume average)

use cryptoscan::indicators::trend::calculate_sma;

use crate::support::{assert_close, times};

#[test]
fn test_sma_insufficient_data() {
    let values = vec![1.0; 19];
    assert!(calculate_sma(&values, &times(19), 20).is_empty());
}

#[test]
fn test_sma_window_alignment() {
    let values = [1.0, 2.0, 3.0, 4.0, 5.0];
    let time = times(5);
    let sma = calculate_sma(&values, &time, 3);
    assert_eq!(sma.len(), 3);
    assert_eq!(sma.points()[0].time, time[2]);
    assert_close(sma.values()[0], 2.0);
    assert_close(sma.last_value().unwrap(), 4.0);
}

#[test]
fn test_sma_zero_period_is_empty() {
    assert!(calculate_sma(&[1.0, 2.0], &times(2), 0).is_empty());
}
