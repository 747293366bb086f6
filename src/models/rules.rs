//! Rule catalogue configuration: which setup rules run and with what parameters.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::indicators::error::IndicatorError;

/// Rule identifiers, declared in the order rules are evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleId {
    RsiExtremes,
    EmaCross,
    PullbackTrend,
    BreakoutVolume,
    VolumeSpike,
    BollingerSqueeze,
    AdxStrong,
}

impl RuleId {
    pub const ALL: [RuleId; 7] = [
        RuleId::RsiExtremes,
        RuleId::EmaCross,
        RuleId::PullbackTrend,
        RuleId::BreakoutVolume,
        RuleId::VolumeSpike,
        RuleId::BollingerSqueeze,
        RuleId::AdxStrong,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RuleId::RsiExtremes => "rsi_extremes",
            RuleId::EmaCross => "ema_cross",
            RuleId::PullbackTrend => "pullback_trend",
            RuleId::BreakoutVolume => "breakout_volume",
            RuleId::VolumeSpike => "volume_spike",
            RuleId::BollingerSqueeze => "bollinger_squeeze",
            RuleId::AdxStrong => "adx_strong",
        }
    }
}

impl fmt::Display for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RuleId {
    type Err = IndicatorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RuleId::ALL
            .iter()
            .copied()
            .find(|id| id.as_str() == s.trim())
            .ok_or_else(|| IndicatorError::UnknownRule(s.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RsiExtremesParams {
    pub oversold: f64,
    pub overbought: f64,
    /// Oversold only counts when volume reaches this multiple of the volume SMA.
    pub volume_multiplier: f64,
    pub oversold_weight: u32,
    pub overbought_weight: u32,
}

impl Default for RsiExtremesParams {
    fn default() -> Self {
        Self {
            oversold: 30.0,
            overbought: 70.0,
            volume_multiplier: 1.5,
            oversold_weight: 2,
            overbought_weight: 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmaCrossParams {
    pub fast: u32,
    pub slow: u32,
    pub major: u32,
    pub weight: u32,
    pub major_weight: u32,
}

impl Default for EmaCrossParams {
    fn default() -> Self {
        Self {
            fast: 20,
            slow: 50,
            major: 200,
            weight: 2,
            major_weight: 10,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PullbackTrendParams {
    pub short: u32,
    pub mid: u32,
    pub long: u32,
    /// Maximum `|close - ema_short| / close`.
    pub tolerance: f64,
    pub weight: u32,
}

impl Default for PullbackTrendParams {
    fn default() -> Self {
        Self {
            short: 20,
            mid: 50,
            long: 200,
            tolerance: 0.01,
            weight: 2,
        }
    }
}

/// Upper bound on the breakout window, well past any exchange kline limit.
pub const MAX_BREAKOUT_LOOKBACK: usize = 10_000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BreakoutVolumeParams {
    pub lookback: usize,
    pub volume_multiplier: f64,
    pub weight: u32,
}

impl Default for BreakoutVolumeParams {
    fn default() -> Self {
        Self {
            lookback: 20,
            volume_multiplier: 2.0,
            weight: 3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VolumeSpikeParams {
    pub multiplier: f64,
    pub weight: u32,
}

impl Default for VolumeSpikeParams {
    fn default() -> Self {
        Self {
            multiplier: 3.0,
            weight: 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BollingerSqueezeParams {
    pub percentile: f64,
    /// Trailing bandwidth values considered; `None` uses the whole history.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub history: Option<usize>,
    pub weight: u32,
}

impl Default for BollingerSqueezeParams {
    fn default() -> Self {
        Self {
            percentile: 0.2,
            history: None,
            weight: 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdxStrongParams {
    pub threshold: f64,
    pub weight: u32,
}

impl Default for AdxStrongParams {
    fn default() -> Self {
        Self {
            threshold: 25.0,
            weight: 1,
        }
    }
}

/// One enabled rule together with its parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum RuleConfig {
    RsiExtremes(RsiExtremesParams),
    EmaCross(EmaCrossParams),
    PullbackTrend(PullbackTrendParams),
    BreakoutVolume(BreakoutVolumeParams),
    VolumeSpike(VolumeSpikeParams),
    BollingerSqueeze(BollingerSqueezeParams),
    AdxStrong(AdxStrongParams),
}

impl RuleConfig {
    pub fn default_for(id: RuleId) -> Self {
        match id {
            RuleId::RsiExtremes => RuleConfig::RsiExtremes(RsiExtremesParams::default()),
            RuleId::EmaCross => RuleConfig::EmaCross(EmaCrossParams::default()),
            RuleId::PullbackTrend => RuleConfig::PullbackTrend(PullbackTrendParams::default()),
            RuleId::BreakoutVolume => RuleConfig::BreakoutVolume(BreakoutVolumeParams::default()),
            RuleId::VolumeSpike => RuleConfig::VolumeSpike(VolumeSpikeParams::default()),
            RuleId::BollingerSqueeze => {
                RuleConfig::BollingerSqueeze(BollingerSqueezeParams::default())
            }
            RuleId::AdxStrong => RuleConfig::AdxStrong(AdxStrongParams::default()),
        }
    }

    pub fn id(&self) -> RuleId {
        match self {
            RuleConfig::RsiExtremes(_) => RuleId::RsiExtremes,
            RuleConfig::EmaCross(_) => RuleId::EmaCross,
            RuleConfig::PullbackTrend(_) => RuleId::PullbackTrend,
            RuleConfig::BreakoutVolume(_) => RuleId::BreakoutVolume,
            RuleConfig::VolumeSpike(_) => RuleId::VolumeSpike,
            RuleConfig::BollingerSqueeze(_) => RuleId::BollingerSqueeze,
            RuleConfig::AdxStrong(_) => RuleId::AdxStrong,
        }
    }

    pub fn validate(&self) -> Result<(), IndicatorError> {
        let invalid = |msg: String| Err(IndicatorError::InvalidParameter(msg));
        match self {
            RuleConfig::RsiExtremes(p) => {
                if !(0.0..=100.0).contains(&p.oversold) || !(0.0..=100.0).contains(&p.overbought) {
                    return invalid("rsi_extremes thresholds must lie in [0, 100]".into());
                }
                if p.oversold >= p.overbought {
                    return invalid(format!(
                        "rsi_extremes oversold ({}) must be below overbought ({})",
                        p.oversold, p.overbought
                    ));
                }
                if p.volume_multiplier < 0.0 {
                    return invalid("rsi_extremes volume_multiplier must be >= 0".into());
                }
            }
            RuleConfig::EmaCross(p) => {
                if p.fast == 0 || p.slow == 0 || p.major == 0 {
                    return invalid("ema_cross periods must be > 0".into());
                }
                if p.fast == p.slow {
                    return invalid("ema_cross fast and slow periods must differ".into());
                }
            }
            RuleConfig::PullbackTrend(p) => {
                if p.short == 0 || p.mid == 0 || p.long == 0 {
                    return invalid("pullback_trend periods must be > 0".into());
                }
                if p.tolerance < 0.0 {
                    return invalid("pullback_trend tolerance must be >= 0".into());
                }
            }
            RuleConfig::BreakoutVolume(p) => {
                if p.lookback == 0 || p.lookback > MAX_BREAKOUT_LOOKBACK {
                    return invalid(format!(
                        "breakout_volume lookback must lie in [1, {}]",
                        MAX_BREAKOUT_LOOKBACK
                    ));
                }
                if p.volume_multiplier < 0.0 {
                    return invalid("breakout_volume volume_multiplier must be >= 0".into());
                }
            }
            RuleConfig::VolumeSpike(p) => {
                if p.multiplier < 0.0 {
                    return invalid("volume_spike multiplier must be >= 0".into());
                }
            }
            RuleConfig::BollingerSqueeze(p) => {
                if !(p.percentile > 0.0 && p.percentile <= 1.0) {
                    return invalid("bollinger_squeeze percentile must lie in (0, 1]".into());
                }
                if p.history == Some(0) {
                    return invalid("bollinger_squeeze history must be > 0".into());
                }
            }
            RuleConfig::AdxStrong(p) => {
                if !(0.0..=100.0).contains(&p.threshold) {
                    return invalid("adx_strong threshold must lie in [0, 100]".into());
                }
            }
        }
        Ok(())
    }
}

/// Enabled rules keyed by id. Iteration follows catalogue order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<RuleConfig>", into = "Vec<RuleConfig>")]
pub struct RuleSet {
    rules: BTreeMap<RuleId, RuleConfig>,
}

impl RuleSet {
    pub fn all() -> Self {
        Self::from_ids(RuleId::ALL)
    }

    pub fn empty() -> Self {
        Self {
            rules: BTreeMap::new(),
        }
    }

    pub fn from_ids(ids: impl IntoIterator<Item = RuleId>) -> Self {
        let rules = ids
            .into_iter()
            .map(|id| (id, RuleConfig::default_for(id)))
            .collect();
        Self { rules }
    }

    /// Enable `config`, replacing any existing parameters for the same rule.
    pub fn with(mut self, config: RuleConfig) -> Self {
        self.rules.insert(config.id(), config);
        self
    }

    pub fn without(mut self, id: RuleId) -> Self {
        self.rules.remove(&id);
        self
    }

    pub fn is_enabled(&self, id: RuleId) -> bool {
        self.rules.contains_key(&id)
    }

    pub fn get(&self, id: RuleId) -> Option<&RuleConfig> {
        self.rules.get(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &RuleConfig> {
        self.rules.values()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn validate(&self) -> Result<(), IndicatorError> {
        self.rules.values().try_for_each(RuleConfig::validate)
    }

    /// EMA periods the enabled rules look up.
    pub fn required_ema_periods(&self) -> Vec<u32> {
        let mut periods: Vec<u32> = self
            .rules
            .values()
            .flat_map(|config| match config {
                RuleConfig::EmaCross(p) => vec![p.fast, p.slow, p.major],
                RuleConfig::PullbackTrend(p) => vec![p.short, p.mid, p.long],
                // trend direction for the ADX setup uses the default cross pair
                RuleConfig::AdxStrong(_) => {
                    let cross = self.ema_cross_params();
                    vec![cross.fast, cross.slow]
                }
                _ => Vec::new(),
            })
            .collect();
        periods.sort_unstable();
        periods.dedup();
        periods
    }

    /// Cross parameters in effect, falling back to defaults when the rule is disabled.
    pub fn ema_cross_params(&self) -> EmaCrossParams {
        match self.rules.get(&RuleId::EmaCross) {
            Some(RuleConfig::EmaCross(p)) => p.clone(),
            _ => EmaCrossParams::default(),
        }
    }
}

impl Default for RuleSet {
    fn default() -> Self {
        Self::all()
    }
}

impl From<Vec<RuleConfig>> for RuleSet {
    fn from(configs: Vec<RuleConfig>) -> Self {
        configs
            .into_iter()
            .fold(RuleSet::empty(), |set, config| set.with(config))
    }
}

impl From<RuleSet> for Vec<RuleConfig> {
    fn from(set: RuleSet) -> Self {
        set.rules.into_values().collect()
    }
}
