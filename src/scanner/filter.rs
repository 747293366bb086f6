//! Filtering and ordering of the ranked pair list.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::models::scanner::{ScannerPair, Trend};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendFilter {
    #[default]
    All,
    Up,
    Down,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    #[default]
    Score,
    Price,
    Volume,
    Rsi,
    Change,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

/// View over a ranked snapshot. Every criterion is optional; the default
/// filter keeps all pairs, ordered by score descending.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScannerFilter {
    pub only_active_setups: bool,
    pub min_quote_volume: Option<f64>,
    pub trend: TrendFilter,
    pub min_score: Option<u32>,
    pub rsi_min: Option<f64>,
    pub rsi_max: Option<f64>,
    /// Comma-separated fragments; a pair matches when any of its badge labels
    /// contains any fragment.
    pub setups: Option<String>,
    pub sort_by: SortKey,
    pub order: SortOrder,
    pub limit: Option<usize>,
}

impl ScannerFilter {
    fn setup_fragments(&self) -> Vec<&str> {
        self.setups
            .as_deref()
            .map(|s| s.split(',').map(str::trim).filter(|f| !f.is_empty()).collect())
            .unwrap_or_default()
    }

    pub fn matches(&self, pair: &ScannerPair) -> bool {
        if self.only_active_setups && pair.setups.is_empty() {
            return false;
        }
        match self.trend {
            TrendFilter::Up if pair.trend != Trend::Up => return false,
            TrendFilter::Down if pair.trend != Trend::Down => return false,
            _ => {}
        }
        if let Some(min) = self.min_quote_volume {
            if pair.quote_volume_24h < min {
                return false;
            }
        }
        if let Some(min) = self.min_score {
            if pair.score < min {
                return false;
            }
        }
        if self.rsi_min.is_some() || self.rsi_max.is_some() {
            // pairs without an RSI value cannot satisfy a range
            let Some(rsi) = pair.rsi else {
                return false;
            };
            if self.rsi_min.is_some_and(|min| rsi < min) || self.rsi_max.is_some_and(|max| rsi > max)
            {
                return false;
            }
        }

        let fragments = self.setup_fragments();
        if !fragments.is_empty() {
            let hit = fragments
                .iter()
                .any(|f| pair.setups.iter().any(|badge| badge.label().contains(f)));
            if !hit {
                return false;
            }
        }

        true
    }

    /// Matching pairs in the requested order. Sorting is stable.
    pub fn apply(&self, pairs: &[ScannerPair]) -> Vec<ScannerPair> {
        let mut out: Vec<ScannerPair> = pairs.iter().filter(|p| self.matches(p)).cloned().collect();
        out.sort_by(|a, b| self.compare(a, b));
        if let Some(limit) = self.limit {
            out.truncate(limit);
        }
        out
    }

    fn compare(&self, a: &ScannerPair, b: &ScannerPair) -> Ordering {
        let ordered = |ord: Ordering| match self.order {
            SortOrder::Asc => ord,
            SortOrder::Desc => ord.reverse(),
        };

        match self.sort_by {
            // equal scores fall back to the larger quote volume first
            SortKey::Score => ordered(a.score.cmp(&b.score))
                .then_with(|| b.quote_volume_24h.total_cmp(&a.quote_volume_24h)),
            SortKey::Price => ordered(a.last_price.total_cmp(&b.last_price)),
            SortKey::Volume => ordered(a.quote_volume_24h.total_cmp(&b.quote_volume_24h)),
            SortKey::Change => ordered(a.change_pct_24h.total_cmp(&b.change_pct_24h)),
            // missing RSI always sorts last
            SortKey::Rsi => match (a.rsi, b.rsi) {
                (Some(x), Some(y)) => ordered(x.total_cmp(&y)),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            },
        }
    }
}
