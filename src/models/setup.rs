//! Setup detections and the evaluation result built from them.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::models::indicators::IndicatorSnapshot;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SetupKind {
    Bullish,
    Bearish,
    Neutral,
}

/// Short label shown next to a pair when a setup fires on its latest bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SetupBadge {
    #[serde(rename = "RSI<30 + Vol↑")]
    RsiOversoldVolume,
    #[serde(rename = "RSI>70")]
    RsiOverbought,
    /// Fixed label whatever fast/slow periods the cross rule uses; the
    /// rationale names the configured periods.
    #[serde(rename = "EMA20↕EMA50")]
    EmaCross,
    #[serde(rename = "Major Golden Cross")]
    MajorGoldenCross,
    #[serde(rename = "Pullback EMA (alcista)")]
    PullbackUptrend,
    #[serde(rename = "Breakout + Vol")]
    BreakoutVolume,
    #[serde(rename = "Volumen spike")]
    VolumeSpike,
    #[serde(rename = "Squeeze→Ruptura")]
    SqueezeBreakout,
    #[serde(rename = "ADX fuerte")]
    StrongTrend,
}

impl SetupBadge {
    pub fn label(&self) -> &'static str {
        match self {
            SetupBadge::RsiOversoldVolume => "RSI<30 + Vol↑",
            SetupBadge::RsiOverbought => "RSI>70",
            SetupBadge::EmaCross => "EMA20↕EMA50",
            SetupBadge::MajorGoldenCross => "Major Golden Cross",
            SetupBadge::PullbackUptrend => "Pullback EMA (alcista)",
            SetupBadge::BreakoutVolume => "Breakout + Vol",
            SetupBadge::VolumeSpike => "Volumen spike",
            SetupBadge::SqueezeBreakout => "Squeeze→Ruptura",
            SetupBadge::StrongTrend => "ADX fuerte",
        }
    }
}

impl fmt::Display for SetupBadge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Descriptive form of a detection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradingSetup {
    pub name: String,
    pub description: String,
    #[serde(rename = "type")]
    pub kind: SetupKind,
    /// 1 (weak) to 10 (strong).
    pub strength: u8,
    pub time_detected: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EvaluationResult {
    pub badges: Vec<SetupBadge>,
    pub score: u32,
    /// One line per triggered rule, parallel to `badges`.
    pub rationale: Vec<String>,
    pub setups: Vec<TradingSetup>,
    pub indicators: IndicatorSnapshot,
}

impl EvaluationResult {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn has_setups(&self) -> bool {
        !self.badges.is_empty()
    }

    pub fn badge_labels(&self) -> Vec<String> {
        self.badges.iter().map(|b| b.label().to_string()).collect()
    }
}
