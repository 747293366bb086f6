//! Indicator Engine entry point: every configured series in one pass.

use tracing::debug;

use crate::indicators::error::IndicatorError;
use crate::indicators::momentum::calculate_rsi;
use crate::indicators::series::build_series;
use crate::indicators::trend::{calculate_adx, calculate_ema, calculate_sma};
use crate::indicators::volatility::calculate_bollinger_bands;
use crate::models::candle::{Candle, OhlcvSeries};
use crate::models::indicators::{EmaSeries, IndicatorBundle, IndicatorParams};

/// Validate `candles` and compute every series named in `params`.
///
/// Short histories yield empty or partial series; only malformed candles or
/// invalid parameters are errors.
pub fn compute_indicators(
    candles: &[Candle],
    params: &IndicatorParams,
) -> Result<IndicatorBundle, IndicatorError> {
    validate_params(params)?;
    let series = build_series(candles)?;
    Ok(compute_from_series(&series, params))
}

/// Same as [`compute_indicators`] for an already validated series.
pub fn compute_from_series(series: &OhlcvSeries, params: &IndicatorParams) -> IndicatorBundle {
    let mut periods = params.ema_periods.clone();
    periods.sort_unstable();
    periods.dedup();

    let emas = periods
        .into_iter()
        .map(|period| EmaSeries {
            period,
            series: calculate_ema(&series.close, &series.time, period),
        })
        .collect();

    let bundle = IndicatorBundle {
        candle_count: series.len(),
        rsi: calculate_rsi(&series.close, &series.time, params.rsi_period),
        emas,
        bollinger: calculate_bollinger_bands(
            &series.close,
            &series.time,
            params.bb_period,
            params.bb_std_dev,
        ),
        adx: calculate_adx(
            &series.high,
            &series.low,
            &series.close,
            &series.time,
            params.adx_period,
        ),
        volume_sma: calculate_sma(&series.volume, &series.time, params.vol_sma_period),
    };

    debug!(
        candles = bundle.candle_count,
        rsi = bundle.rsi.len(),
        bollinger = bundle.bollinger.len(),
        adx = bundle.adx.len(),
        "computed indicator bundle"
    );

    bundle
}

pub fn validate_params(params: &IndicatorParams) -> Result<(), IndicatorError> {
    let periods = [
        ("rsi_period", params.rsi_period),
        ("bb_period", params.bb_period),
        ("adx_period", params.adx_period),
        ("vol_sma_period", params.vol_sma_period),
    ];
    if let Some((name, _)) = periods.iter().find(|(_, p)| *p == 0) {
        return Err(IndicatorError::InvalidParameter(format!("{} must be > 0", name)));
    }
    if params.ema_periods.iter().any(|&p| p == 0) {
        return Err(IndicatorError::InvalidParameter(
            "ema_periods must all be > 0".to_string(),
        ));
    }
    if !params.bb_std_dev.is_finite() || params.bb_std_dev < 0.0 {
        return Err(IndicatorError::InvalidParameter(
            "bb_std_dev must be a finite, non-negative number".to_string(),
        ));
    }
    Ok(())
}
