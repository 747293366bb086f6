//! Cross and percentile checks shared by the setup rules.

use std::fmt;

use crate::common::math::low_quantile;
use crate::models::indicators::IndicatorSeries;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cross {
    Up,
    Down,
}

impl fmt::Display for Cross {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cross::Up => f.write_str("up"),
            Cross::Down => f.write_str("down"),
        }
    }
}

/// Direction in which `a` crossed `b` between their last two points.
///
/// `Up` when `a` was at or below `b` and is now above it, `Down` for the
/// mirror case. Needs two finite points in each series.
pub fn crossed(a: &IndicatorSeries, b: &IndicatorSeries) -> Option<Cross> {
    let (a1, a2) = (a.value_back(1)?, a.value_back(0)?);
    let (b1, b2) = (b.value_back(1)?, b.value_back(0)?);
    if ![a1, a2, b1, b2].iter().all(|v| v.is_finite()) {
        return None;
    }

    if a1 <= b1 && a2 > b2 {
        Some(Cross::Up)
    } else if a1 >= b1 && a2 < b2 {
        Some(Cross::Down)
    } else {
        None
    }
}

/// True when the last of `values` sits at or below the trailing `p` quantile
/// of `values` itself.
pub fn is_low_percentile(values: &[f64], p: f64) -> bool {
    let Some(&last) = values.last() else {
        return false;
    };
    match low_quantile(values, p) {
        Some(threshold) => last <= threshold,
        None => false,
    }
}
