//! Unit tests for the indicator bundle entry point

use cryptoscan::indicators::{compute_indicators, validate_params, IndicatorError};
use cryptoscan::models::candle::Candle;
use cryptoscan::models::indicators::IndicatorParams;

use crate::support::{candles_from_closes, flat_candles};

#[test]
fn test_bundle_lengths_follow_warm_up() {
    let closes: Vec<f64> = (0..60).map(|i| 100.0 + (i as f64 / 4.0).sin()).collect();
    let candles = candles_from_closes(&closes, 500.0);
    let bundle = compute_indicators(&candles, &IndicatorParams::default()).unwrap();

    assert_eq!(bundle.candle_count, 60);
    assert_eq!(bundle.rsi.len(), 60 - 14);
    assert_eq!(bundle.bollinger.len(), 60 - 19);
    assert_eq!(bundle.adx.len(), 60 - 14);
    assert_eq!(bundle.volume_sma.len(), 60 - 19);
    for period in [20, 50, 200] {
        assert_eq!(bundle.ema(period).unwrap().len(), 60);
    }
}

#[test]
fn test_short_history_is_not_an_error() {
    let candles = flat_candles(5, 10.0, 1.0);
    let bundle = compute_indicators(&candles, &IndicatorParams::default()).unwrap();
    assert!(bundle.rsi.is_empty());
    assert!(bundle.bollinger.is_empty());
    assert!(bundle.adx.is_empty());
    assert!(bundle.volume_sma.is_empty());
    assert_eq!(bundle.ema(20).unwrap().len(), 5);
}

#[test]
fn test_empty_input_gives_empty_bundle() {
    let bundle = compute_indicators(&[], &IndicatorParams::default()).unwrap();
    assert_eq!(bundle.candle_count, 0);
    assert!(bundle.snapshot().is_empty());
}

#[test]
fn test_duplicate_ema_periods_are_merged() {
    let params = IndicatorParams {
        ema_periods: vec![50, 20, 50],
        ..Default::default()
    };
    let bundle = compute_indicators(&flat_candles(30, 1.0, 1.0), &params).unwrap();
    let periods: Vec<u32> = bundle.emas.iter().map(|e| e.period).collect();
    assert_eq!(periods, vec![20, 50]);
}

#[test]
fn test_malformed_candles_are_rejected() {
    let mut candles = flat_candles(3, 10.0, 1.0);
    candles[2].time = candles[1].time;
    let err = compute_indicators(&candles, &IndicatorParams::default()).unwrap_err();
    assert!(err.is_malformed_candles());

    let candles = vec![Candle::new(60, 1.0, f64::NAN, 1.0, 1.0, 1.0)];
    assert_eq!(
        compute_indicators(&candles, &IndicatorParams::default()),
        Err(IndicatorError::NonFiniteValue { index: 0, field: "high" })
    );

    let candles = vec![Candle::flat(60, 1.0, -5.0)];
    assert!(matches!(
        compute_indicators(&candles, &IndicatorParams::default()),
        Err(IndicatorError::NegativeVolume { index: 0, .. })
    ));
}

#[test]
fn test_invalid_params() {
    let zero_rsi = IndicatorParams {
        rsi_period: 0,
        ..Default::default()
    };
    assert!(matches!(
        validate_params(&zero_rsi),
        Err(IndicatorError::InvalidParameter(_))
    ));

    let negative_std = IndicatorParams {
        bb_std_dev: -1.0,
        ..Default::default()
    };
    assert!(validate_params(&negative_std).is_err());

    let zero_ema = IndicatorParams {
        ema_periods: vec![20, 0],
        ..Default::default()
    };
    assert!(compute_indicators(&flat_candles(3, 1.0, 1.0), &zero_ema).is_err());
}

#[test]
fn test_snapshot_reads_latest_values() {
    let closes: Vec<f64> = (0..40).map(|i| 100.0 + i as f64).collect();
    let bundle = compute_indicators(&candles_from_closes(&closes, 10.0), &IndicatorParams::default()).unwrap();
    let snapshot = bundle.snapshot();
    assert_eq!(snapshot.rsi, Some(100.0));
    assert_eq!(snapshot.ema.len(), 3);
    assert_eq!(snapshot.volume_sma, Some(10.0));
    assert!(snapshot.bollinger.is_some());
    assert!(snapshot.adx.is_some());
}
