//! Conversion of string-keyed parameter maps (query strings, form fields)
//! into typed indicator and rule configuration.

use std::collections::HashMap;

use crate::indicators::error::IndicatorError;
use crate::indicators::registry::validate_params;
use crate::models::indicators::IndicatorParams;
use crate::models::rules::{RuleConfig, RuleId, RuleSet};

pub fn parse_f64(value: &str) -> Result<f64, IndicatorError> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| IndicatorError::InvalidNumericFormat(value.to_string()))
}

pub fn parse_u32(value: &str) -> Result<u32, IndicatorError> {
    value
        .trim()
        .parse::<u32>()
        .map_err(|_| IndicatorError::InvalidNumericFormat(value.to_string()))
}

pub fn parse_usize(value: &str) -> Result<usize, IndicatorError> {
    value
        .trim()
        .parse::<usize>()
        .map_err(|_| IndicatorError::InvalidNumericFormat(value.to_string()))
}

fn read<T>(
    data: &HashMap<String, String>,
    keys: &[&str],
    parse: fn(&str) -> Result<T, IndicatorError>,
) -> Result<Option<T>, IndicatorError> {
    match keys.iter().find_map(|k| data.get(*k)) {
        Some(raw) => parse(raw).map(Some),
        None => Ok(None),
    }
}

fn set<T>(target: &mut T, value: Option<T>) {
    if let Some(v) = value {
        *target = v;
    }
}

/// Typed config for `rule_id` from its parameter map. Missing keys keep
/// their defaults; unrecognised keys are ignored.
pub fn parse_rule_config(
    rule_id: &str,
    data: &HashMap<String, String>,
) -> Result<RuleConfig, IndicatorError> {
    let id: RuleId = rule_id.parse()?;
    let mut config = RuleConfig::default_for(id);

    match &mut config {
        RuleConfig::RsiExtremes(p) => {
            set(&mut p.oversold, read(data, &["oversold"], parse_f64)?);
            set(&mut p.overbought, read(data, &["overbought"], parse_f64)?);
            set(&mut p.volume_multiplier, read(data, &["volume_multiplier"], parse_f64)?);
            set(&mut p.oversold_weight, read(data, &["oversold_weight"], parse_u32)?);
            set(&mut p.overbought_weight, read(data, &["overbought_weight"], parse_u32)?);
        }
        RuleConfig::EmaCross(p) => {
            set(&mut p.fast, read(data, &["ema1", "fast"], parse_u32)?);
            set(&mut p.slow, read(data, &["ema2", "slow"], parse_u32)?);
            set(&mut p.major, read(data, &["ema3", "major"], parse_u32)?);
            set(&mut p.weight, read(data, &["weight"], parse_u32)?);
            set(&mut p.major_weight, read(data, &["major_weight"], parse_u32)?);
        }
        RuleConfig::PullbackTrend(p) => {
            set(&mut p.short, read(data, &["ema_short", "short"], parse_u32)?);
            set(&mut p.mid, read(data, &["ema_mid", "mid"], parse_u32)?);
            set(&mut p.long, read(data, &["ema_long", "long"], parse_u32)?);
            set(&mut p.tolerance, read(data, &["tolerance"], parse_f64)?);
            set(&mut p.weight, read(data, &["weight"], parse_u32)?);
        }
        RuleConfig::BreakoutVolume(p) => {
            set(&mut p.lookback, read(data, &["lookback"], parse_usize)?);
            set(&mut p.volume_multiplier, read(data, &["volume_multiplier"], parse_f64)?);
            set(&mut p.weight, read(data, &["weight"], parse_u32)?);
        }
        RuleConfig::VolumeSpike(p) => {
            set(&mut p.multiplier, read(data, &["multiplier"], parse_f64)?);
            set(&mut p.weight, read(data, &["weight"], parse_u32)?);
        }
        RuleConfig::BollingerSqueeze(p) => {
            set(&mut p.percentile, read(data, &["percentile"], parse_f64)?);
            if let Some(history) = read(data, &["history"], parse_usize)? {
                p.history = Some(history);
            }
            set(&mut p.weight, read(data, &["weight"], parse_u32)?);
        }
        RuleConfig::AdxStrong(p) => {
            set(&mut p.threshold, read(data, &["threshold"], parse_f64)?);
            set(&mut p.weight, read(data, &["weight"], parse_u32)?);
        }
    }

    config.validate()?;
    Ok(config)
}

/// Indicator periods carried inside rule maps (`rsi_extremes.period`,
/// `volume_spike.sma_period`, `bollinger_squeeze.period`/`std_dev`,
/// `adx_strong.period`), applied on top of `base`.
pub fn parse_indicator_overrides(
    maps: &HashMap<String, HashMap<String, String>>,
    base: &IndicatorParams,
) -> Result<IndicatorParams, IndicatorError> {
    let mut params = base.clone();
    let empty = HashMap::new();
    let map = |id: RuleId| maps.get(id.as_str()).unwrap_or(&empty);

    set(&mut params.rsi_period, read(map(RuleId::RsiExtremes), &["period"], parse_u32)?);
    set(&mut params.vol_sma_period, read(map(RuleId::VolumeSpike), &["sma_period"], parse_u32)?);
    set(&mut params.bb_period, read(map(RuleId::BollingerSqueeze), &["period"], parse_u32)?);
    set(&mut params.bb_std_dev, read(map(RuleId::BollingerSqueeze), &["std_dev"], parse_f64)?);
    set(&mut params.adx_period, read(map(RuleId::AdxStrong), &["period"], parse_u32)?);

    validate_params(&params)?;
    Ok(params)
}

/// Enabled rules plus the indicator params they need, from per-rule maps.
///
/// `enabled` lists rule ids; a rule with a map but not listed stays disabled.
pub fn parse_rule_selection(
    enabled: &[String],
    maps: &HashMap<String, HashMap<String, String>>,
    base: &IndicatorParams,
) -> Result<(IndicatorParams, RuleSet), IndicatorError> {
    let empty = HashMap::new();
    let mut rules = RuleSet::empty();
    for rule_id in enabled {
        let data = maps.get(rule_id.trim()).unwrap_or(&empty);
        rules = rules.with(parse_rule_config(rule_id, data)?);
    }

    let params = parse_indicator_overrides(maps, base)?.covering(&rules);
    Ok((params, rules))
}
