//! Unit tests for Bollinger Bands

use cryptoscan::indicators::volatility::calculate_bollinger_bands;

use crate::support::{assert_close, times};

#[test]
fn test_bollinger_insufficient_data() {
    let values = vec![1.0; 19];
    assert!(calculate_bollinger_bands(&values, &times(19), 20, 2.0).is_empty());
}

#[test]
fn test_bollinger_population_std_dev() {
    let values = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
    let bands = calculate_bollinger_bands(&values, &times(8), 8, 2.0);
    assert_eq!(bands.len(), 1);
    let band = bands[0];
    assert_close(band.middle, 5.0);
    assert_close(band.upper, 9.0);
    assert_close(band.lower, 1.0);
    assert_close(band.bandwidth.unwrap(), 8.0 / 5.0);
}

#[test]
fn test_bollinger_band_ordering() {
    let values: Vec<f64> = (0..60).map(|i| 50.0 + (i as f64 / 3.0).cos() * 4.0).collect();
    for band in calculate_bollinger_bands(&values, &times(60), 20, 2.0) {
        assert!(band.lower <= band.middle && band.middle <= band.upper);
        assert!(band.bandwidth.unwrap() >= 0.0);
    }
}

#[test]
fn test_bollinger_flat_series_has_zero_width() {
    let bands = calculate_bollinger_bands(&[10.0; 25], &times(25), 20, 2.0);
    assert_eq!(bands.len(), 6);
    assert!(bands.iter().all(|b| b.bandwidth == Some(0.0)));
}
