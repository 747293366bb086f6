//! Series Builder: candles to validated column arrays.

use crate::indicators::error::IndicatorError;
use crate::models::candle::{Candle, OhlcvSeries};

/// Split `candles` into index-aligned columns.
///
/// Fails on the first candle whose time does not strictly increase, whose
/// prices or volume are not finite, or whose volume is negative.
pub fn build_series(candles: &[Candle]) -> Result<OhlcvSeries, IndicatorError> {
    let mut series = OhlcvSeries::with_capacity(candles.len());
    let mut previous: Option<i64> = None;

    for (index, candle) in candles.iter().enumerate() {
        if let Some(prev) = previous {
            if candle.time <= prev {
                return Err(IndicatorError::NonMonotonicTime {
                    index,
                    previous: prev,
                    current: candle.time,
                });
            }
        }
        validate_candle(index, candle)?;
        series.push(candle);
        previous = Some(candle.time);
    }

    Ok(series)
}

fn validate_candle(index: usize, candle: &Candle) -> Result<(), IndicatorError> {
    let fields = [
        ("open", candle.open),
        ("high", candle.high),
        ("low", candle.low),
        ("close", candle.close),
        ("volume", candle.volume),
    ];
    if let Some((field, _)) = fields.iter().find(|(_, v)| !v.is_finite()) {
        return Err(IndicatorError::NonFiniteValue { index, field });
    }
    if candle.volume < 0.0 {
        return Err(IndicatorError::NegativeVolume {
            index,
            value: candle.volume,
        });
    }
    Ok(())
}
