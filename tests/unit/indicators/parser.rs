//! Unit tests for rule parameter parsing

use std::collections::HashMap;

use cryptoscan::indicators::{parse_rule_config, parse_rule_selection, IndicatorError};
use cryptoscan::models::indicators::IndicatorParams;
use cryptoscan::models::rules::{RuleConfig, RuleId};

fn map(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[test]
fn test_parse_ema_cross_aliases() {
    let config = parse_rule_config("ema_cross", &map(&[("ema1", "9"), ("slow", "21")])).unwrap();
    match config {
        RuleConfig::EmaCross(p) => {
            assert_eq!(p.fast, 9);
            assert_eq!(p.slow, 21);
            assert_eq!(p.major, 200);
        }
        other => panic!("unexpected config {:?}", other),
    }
}

#[test]
fn test_parse_unknown_rule() {
    assert_eq!(
        parse_rule_config("macd_cross", &HashMap::new()),
        Err(IndicatorError::UnknownRule("macd_cross".to_string()))
    );
}

#[test]
fn test_parse_bad_number() {
    let err = parse_rule_config("volume_spike", &map(&[("multiplier", "lots")])).unwrap_err();
    assert!(matches!(err, IndicatorError::InvalidNumericFormat(_)));
}

#[test]
fn test_parse_rejects_oversized_lookback() {
    let err = parse_rule_config(
        "breakout_volume",
        &map(&[("lookback", "18446744073709551615")]),
    )
    .unwrap_err();
    assert!(matches!(err, IndicatorError::InvalidParameter(_)));
}

#[test]
fn test_selection_enables_only_listed_rules() {
    let mut maps = HashMap::new();
    maps.insert("rsi_extremes".to_string(), map(&[("period", "7"), ("oversold", "25")]));
    maps.insert("adx_strong".to_string(), map(&[("threshold", "30")]));

    let enabled = vec!["rsi_extremes".to_string(), "pullback_trend".to_string()];
    let (params, rules) = parse_rule_selection(&enabled, &maps, &IndicatorParams::default()).unwrap();

    assert_eq!(rules.len(), 2);
    assert!(rules.is_enabled(RuleId::RsiExtremes));
    assert!(rules.is_enabled(RuleId::PullbackTrend));
    assert!(!rules.is_enabled(RuleId::AdxStrong));
    assert_eq!(params.rsi_period, 7);
    for period in [20, 50, 200] {
        assert!(params.ema_periods.contains(&period));
    }
}

#[test]
fn test_selection_covers_custom_ema_periods() {
    let mut maps = HashMap::new();
    maps.insert("ema_cross".to_string(), map(&[("fast", "9"), ("slow", "21"), ("major", "100")]));
    let enabled = vec!["ema_cross".to_string()];
    let base = IndicatorParams {
        ema_periods: Vec::new(),
        ..Default::default()
    };
    let (params, _) = parse_rule_selection(&enabled, &maps, &base).unwrap();
    let mut periods = params.ema_periods.clone();
    periods.sort_unstable();
    assert_eq!(periods, vec![9, 21, 100]);
}
