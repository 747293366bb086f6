//! Setup rule catalogue. Each rule config knows how to detect its own setup
//! on the latest bar; `as_rule` dispatches a `RuleConfig` to it.

use tracing::debug;

use crate::common::math::max;
use crate::models::candle::Candle;
use crate::models::indicators::IndicatorBundle;
use crate::models::rules::{
    AdxStrongParams, BollingerSqueezeParams, BreakoutVolumeParams, EmaCrossParams,
    PullbackTrendParams, RsiExtremesParams, RuleConfig, RuleId, VolumeSpikeParams,
};
use crate::models::setup::{SetupBadge, SetupKind, TradingSetup};
use crate::signals::scoring::{crossed, is_low_percentile, Cross};

/// What a rule contributes when it fires.
#[derive(Debug, Clone, PartialEq)]
pub struct Detection {
    pub badge: SetupBadge,
    pub weight: u32,
    pub rationale: String,
    pub setup: TradingSetup,
}

/// Inputs every rule reads from. `candles` is never empty.
pub struct RuleContext<'a> {
    pub candles: &'a [Candle],
    pub indicators: &'a IndicatorBundle,
    /// EMA pair used for trend direction by rules without their own EMAs.
    pub trend_emas: (u32, u32),
}

impl<'a> RuleContext<'a> {
    pub fn new(
        candles: &'a [Candle],
        indicators: &'a IndicatorBundle,
        trend_emas: (u32, u32),
    ) -> Option<Self> {
        if candles.is_empty() {
            return None;
        }
        Some(Self {
            candles,
            indicators,
            trend_emas,
        })
    }

    fn latest(&self) -> &Candle {
        &self.candles[self.candles.len() - 1]
    }

    fn previous(&self) -> Option<&Candle> {
        self.candles.len().checked_sub(2).map(|i| &self.candles[i])
    }

    fn ema(&self, period: u32) -> Option<f64> {
        finite(self.indicators.ema(period)?.last_value())
    }

    fn volume_sma(&self) -> Option<f64> {
        finite(self.indicators.volume_sma.last_value())
    }

    #[allow(clippy::too_many_arguments)]
    fn detection(
        &self,
        badge: SetupBadge,
        weight: u32,
        rationale: String,
        name: &str,
        description: String,
        kind: SetupKind,
        strength: u8,
    ) -> Detection {
        Detection {
            badge,
            weight,
            rationale,
            setup: TradingSetup {
                name: name.to_string(),
                description,
                kind,
                strength,
                time_detected: self.latest().time,
            },
        }
    }
}

fn finite(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite())
}

pub trait SetupRule {
    fn id(&self) -> RuleId;

    /// Detections on the latest bar; empty when the rule does not fire or
    /// its inputs are not available yet.
    fn detect(&self, ctx: &RuleContext<'_>) -> Vec<Detection>;
}

pub fn as_rule(config: &RuleConfig) -> &dyn SetupRule {
    match config {
        RuleConfig::RsiExtremes(p) => p,
        RuleConfig::EmaCross(p) => p,
        RuleConfig::PullbackTrend(p) => p,
        RuleConfig::BreakoutVolume(p) => p,
        RuleConfig::VolumeSpike(p) => p,
        RuleConfig::BollingerSqueeze(p) => p,
        RuleConfig::AdxStrong(p) => p,
    }
}

impl SetupRule for RsiExtremesParams {
    fn id(&self) -> RuleId {
        RuleId::RsiExtremes
    }

    fn detect(&self, ctx: &RuleContext<'_>) -> Vec<Detection> {
        let Some(rsi) = finite(ctx.indicators.rsi.last_value()) else {
            return Vec::new();
        };
        let volume = ctx.latest().volume;

        let volume_confirmed = ctx
            .volume_sma()
            .map(|sma| volume >= self.volume_multiplier * sma)
            .unwrap_or(false);

        if rsi < self.oversold && volume_confirmed {
            vec![ctx.detection(
                SetupBadge::RsiOversoldVolume,
                self.oversold_weight,
                format!(
                    "RSI {:.1} < {} & Vol≥{}×SMA",
                    rsi, self.oversold, self.volume_multiplier
                ),
                "RSI Extremo",
                format!("RSI < {} - Zona de sobreventa", self.oversold),
                SetupKind::Bullish,
                8,
            )]
        } else if rsi > self.overbought {
            vec![ctx.detection(
                SetupBadge::RsiOverbought,
                self.overbought_weight,
                format!("RSI {:.1} > {}", rsi, self.overbought),
                "RSI Extremo",
                format!("RSI > {} - Zona de sobrecompra", self.overbought),
                SetupKind::Bearish,
                8,
            )]
        } else {
            Vec::new()
        }
    }
}

impl SetupRule for EmaCrossParams {
    fn id(&self) -> RuleId {
        RuleId::EmaCross
    }

    fn detect(&self, ctx: &RuleContext<'_>) -> Vec<Detection> {
        let mut out = Vec::new();
        let fast = ctx.indicators.ema(self.fast);
        let slow = ctx.indicators.ema(self.slow);
        let major = ctx.indicators.ema(self.major);

        if let (Some(fast), Some(slow)) = (fast, slow) {
            match crossed(fast, slow) {
                Some(Cross::Up) => out.push(ctx.detection(
                    SetupBadge::EmaCross,
                    self.weight,
                    format!("Cruce EMA{}/EMA{}: {}", self.fast, self.slow, Cross::Up),
                    "Golden Cross",
                    format!(
                        "EMA{} cruza por encima de EMA{} - Señal alcista",
                        self.fast, self.slow
                    ),
                    SetupKind::Bullish,
                    9,
                )),
                Some(Cross::Down) => out.push(ctx.detection(
                    SetupBadge::EmaCross,
                    self.weight,
                    format!("Cruce EMA{}/EMA{}: {}", self.fast, self.slow, Cross::Down),
                    "Death Cross",
                    format!(
                        "EMA{} cruza por debajo de EMA{} - Señal bajista",
                        self.fast, self.slow
                    ),
                    SetupKind::Bearish,
                    9,
                )),
                None => {}
            }
        }

        // only the upward major cross is reported
        if let (Some(slow), Some(major)) = (slow, major) {
            if crossed(slow, major) == Some(Cross::Up) {
                out.push(ctx.detection(
                    SetupBadge::MajorGoldenCross,
                    self.major_weight,
                    format!("Cruce EMA{}/EMA{}: {}", self.slow, self.major, Cross::Up),
                    "Major Golden Cross",
                    format!(
                        "EMA{} cruza EMA{} - Cambio de tendencia mayor alcista",
                        self.slow, self.major
                    ),
                    SetupKind::Bullish,
                    10,
                ));
            }
        }

        out
    }
}

impl SetupRule for PullbackTrendParams {
    fn id(&self) -> RuleId {
        RuleId::PullbackTrend
    }

    fn detect(&self, ctx: &RuleContext<'_>) -> Vec<Detection> {
        let (Some(short), Some(mid), Some(long)) =
            (ctx.ema(self.short), ctx.ema(self.mid), ctx.ema(self.long))
        else {
            return Vec::new();
        };
        let close = ctx.latest().close;
        if close <= 0.0 {
            return Vec::new();
        }

        let near_short = (close - short).abs() / close <= self.tolerance;
        if mid > long && near_short && close >= mid {
            vec![ctx.detection(
                SetupBadge::PullbackUptrend,
                self.weight,
                format!(
                    "EMA{}>EMA{} y precio en pullback a EMA{} sin perder EMA{}",
                    self.mid, self.long, self.short, self.mid
                ),
                "Pullback Alcista",
                format!(
                    "Precio toca EMA{} en tendencia alcista - Oportunidad de compra",
                    self.short
                ),
                SetupKind::Bullish,
                8,
            )]
        } else {
            Vec::new()
        }
    }
}

impl SetupRule for BreakoutVolumeParams {
    fn id(&self) -> RuleId {
        RuleId::BreakoutVolume
    }

    fn detect(&self, ctx: &RuleContext<'_>) -> Vec<Detection> {
        let n = ctx.candles.len();
        if n <= self.lookback {
            return Vec::new();
        }
        let Some(volume_sma) = ctx.volume_sma() else {
            return Vec::new();
        };
        let highs: Vec<f64> = ctx.candles[n - 1 - self.lookback..n - 1]
            .iter()
            .map(|c| c.high)
            .collect();
        let Some(highest) = max(&highs) else {
            return Vec::new();
        };

        let latest = ctx.latest();
        if latest.close > highest && latest.volume >= self.volume_multiplier * volume_sma {
            vec![ctx.detection(
                SetupBadge::BreakoutVolume,
                self.weight,
                format!(
                    "Cierre > Máximo {} y Vol≥{}×SMA",
                    self.lookback, self.volume_multiplier
                ),
                "Breakout con Volumen",
                format!(
                    "Precio rompe máximo de {} períodos con volumen {}x",
                    self.lookback, self.volume_multiplier
                ),
                SetupKind::Bullish,
                9,
            )]
        } else {
            Vec::new()
        }
    }
}

impl SetupRule for VolumeSpikeParams {
    fn id(&self) -> RuleId {
        RuleId::VolumeSpike
    }

    fn detect(&self, ctx: &RuleContext<'_>) -> Vec<Detection> {
        let Some(volume_sma) = ctx.volume_sma() else {
            return Vec::new();
        };
        let latest = ctx.latest();
        if latest.volume < self.multiplier * volume_sma {
            return Vec::new();
        }

        let (kind, direction) = match ctx.previous() {
            Some(prev) if latest.close > prev.close => (SetupKind::Bullish, "alcista"),
            Some(_) => (SetupKind::Bearish, "bajista"),
            None => (SetupKind::Neutral, "lateral"),
        };

        vec![ctx.detection(
            SetupBadge::VolumeSpike,
            self.weight,
            format!("Volumen ≥ {}×SMA (spike)", self.multiplier),
            "Volume Spike",
            format!(
                "Volumen {}x superior al promedio - Movimiento {}",
                self.multiplier, direction
            ),
            kind,
            7,
        )]
    }
}

impl SetupRule for BollingerSqueezeParams {
    fn id(&self) -> RuleId {
        RuleId::BollingerSqueeze
    }

    fn detect(&self, ctx: &RuleContext<'_>) -> Vec<Detection> {
        let Some(band) = ctx.indicators.bollinger.last() else {
            return Vec::new();
        };
        if band.bandwidth.is_none() {
            return Vec::new();
        }

        let bandwidths = ctx.indicators.bandwidths();
        let window = match self.history {
            Some(history) if history < bandwidths.len() => &bandwidths[bandwidths.len() - history..],
            _ => &bandwidths[..],
        };
        if !is_low_percentile(window, self.percentile) {
            return Vec::new();
        }

        let close = ctx.latest().close;
        let (name, description, kind) = if close > band.upper {
            (
                "Bollinger Breakout",
                "Precio rompe banda superior después de squeeze - Señal alcista",
                SetupKind::Bullish,
            )
        } else if close < band.lower {
            (
                "Bollinger Breakdown",
                "Precio rompe banda inferior después de squeeze - Señal bajista",
                SetupKind::Bearish,
            )
        } else {
            return Vec::new();
        };

        vec![ctx.detection(
            SetupBadge::SqueezeBreakout,
            self.weight,
            "BandWidth bajo + cierre fuera de banda".to_string(),
            name,
            description.to_string(),
            kind,
            8,
        )]
    }
}

impl SetupRule for AdxStrongParams {
    fn id(&self) -> RuleId {
        RuleId::AdxStrong
    }

    fn detect(&self, ctx: &RuleContext<'_>) -> Vec<Detection> {
        let Some(adx) = ctx.indicators.adx.last().map(|a| a.value).filter(|v| v.is_finite())
        else {
            return Vec::new();
        };
        if adx < self.threshold {
            return Vec::new();
        }

        let (fast, slow) = ctx.trend_emas;
        let (kind, direction) = match (ctx.ema(fast), ctx.ema(slow)) {
            (Some(f), Some(s)) if f > s => (SetupKind::Bullish, "alcista"),
            (Some(_), Some(_)) => (SetupKind::Bearish, "bajista"),
            _ => (SetupKind::Neutral, "sin dirección"),
        };

        debug!(adx, threshold = self.threshold, "adx strength bonus");
        vec![ctx.detection(
            SetupBadge::StrongTrend,
            self.weight,
            format!("ADX {:.1} ≥ {}", adx, self.threshold),
            "Tendencia Fuerte ADX",
            format!("ADX > {} - Tendencia {} fuerte", self.threshold, direction),
            kind,
            7,
        )]
    }
}
