use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::models::rules::RuleSet;

/// One indicator value stamped with the close time of the candle it belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IndicatorPoint {
    pub time: i64,
    pub value: f64,
}

impl IndicatorPoint {
    pub fn new(time: i64, value: f64) -> Self {
        Self { time, value }
    }
}

/// Ordered indicator values, always aligned to a suffix of the candle sequence.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IndicatorSeries(Vec<IndicatorPoint>);

impl IndicatorSeries {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self(Vec::with_capacity(capacity))
    }

    pub fn push(&mut self, time: i64, value: f64) {
        self.0.push(IndicatorPoint::new(time, value));
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn points(&self) -> &[IndicatorPoint] {
        &self.0
    }

    pub fn values(&self) -> Vec<f64> {
        self.0.iter().map(|p| p.value).collect()
    }

    pub fn last(&self) -> Option<&IndicatorPoint> {
        self.0.last()
    }

    /// Final value regardless of how much shorter than the candle series this is.
    pub fn last_value(&self) -> Option<f64> {
        self.0.last().map(|p| p.value)
    }

    /// Value `offset` points before the last one (`0` is the last).
    pub fn value_back(&self, offset: usize) -> Option<f64> {
        let len = self.0.len();
        if offset >= len {
            return None;
        }
        Some(self.0[len - 1 - offset].value)
    }
}

impl From<Vec<IndicatorPoint>> for IndicatorSeries {
    fn from(points: Vec<IndicatorPoint>) -> Self {
        Self(points)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmaSeries {
    pub period: u32,
    pub series: IndicatorSeries,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BollingerPoint {
    pub time: i64,
    pub upper: f64,
    pub middle: f64,
    pub lower: f64,
    /// `(upper - lower) / middle`; absent when the middle band is zero.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bandwidth: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AdxPoint {
    pub time: i64,
    pub value: f64,
    pub plus_di: f64,
    pub minus_di: f64,
}

/// Periods used by `compute_indicators`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndicatorParams {
    pub rsi_period: u32,
    pub ema_periods: Vec<u32>,
    pub bb_period: u32,
    pub bb_std_dev: f64,
    pub adx_period: u32,
    pub vol_sma_period: u32,
}

impl IndicatorParams {
    /// Copy of these params with every EMA period `rules` need added.
    pub fn covering(&self, rules: &RuleSet) -> IndicatorParams {
        let mut params = self.clone();
        for period in rules.required_ema_periods() {
            if !params.ema_periods.contains(&period) {
                params.ema_periods.push(period);
            }
        }
        params
    }
}

impl Default for IndicatorParams {
    fn default() -> Self {
        Self {
            rsi_period: 14,
            ema_periods: vec![20, 50, 200],
            bb_period: 20,
            bb_std_dev: 2.0,
            adx_period: 14,
            vol_sma_period: 20,
        }
    }
}

/// Every series computed for one candle history.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IndicatorBundle {
    pub candle_count: usize,
    pub rsi: IndicatorSeries,
    pub emas: Vec<EmaSeries>,
    pub bollinger: Vec<BollingerPoint>,
    pub adx: Vec<AdxPoint>,
    pub volume_sma: IndicatorSeries,
}

impl IndicatorBundle {
    pub fn ema(&self, period: u32) -> Option<&IndicatorSeries> {
        self.emas
            .iter()
            .find(|e| e.period == period)
            .map(|e| &e.series)
    }

    pub fn bandwidths(&self) -> Vec<f64> {
        self.bollinger.iter().filter_map(|b| b.bandwidth).collect()
    }

    pub fn snapshot(&self) -> IndicatorSnapshot {
        IndicatorSnapshot {
            rsi: self.rsi.last_value(),
            ema: self
                .emas
                .iter()
                .filter_map(|e| e.series.last_value().map(|v| (e.period, v)))
                .collect(),
            adx: self.adx.last().map(|a| a.value),
            bollinger: self.bollinger.last().map(|b| BollingerSnapshot {
                upper: b.upper,
                middle: b.middle,
                lower: b.lower,
                bandwidth: b.bandwidth,
            }),
            volume_sma: self.volume_sma.last_value(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BollingerSnapshot {
    pub upper: f64,
    pub middle: f64,
    pub lower: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bandwidth: Option<f64>,
}

/// Latest value of each indicator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IndicatorSnapshot {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rsi: Option<f64>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty", default)]
    pub ema: BTreeMap<u32, f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub adx: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bollinger: Option<BollingerSnapshot>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volume_sma: Option<f64>,
}

impl IndicatorSnapshot {
    pub fn is_empty(&self) -> bool {
        self.rsi.is_none()
            && self.ema.is_empty()
            && self.adx.is_none()
            && self.bollinger.is_none()
            && self.volume_sma.is_none()
    }
}
