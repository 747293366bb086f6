use thiserror::Error;

/// Structural problems with engine input. Short histories are not errors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum IndicatorError {
    #[error("candle {index}: time {current} is not after previous time {previous}")]
    NonMonotonicTime {
        index: usize,
        previous: i64,
        current: i64,
    },

    #[error("candle {index}: {field} is not a finite number")]
    NonFiniteValue { index: usize, field: &'static str },

    #[error("candle {index}: negative volume {value}")]
    NegativeVolume { index: usize, value: f64 },

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("invalid numeric format: {0}")]
    InvalidNumericFormat(String),

    #[error("missing field: {0}")]
    MissingField(String),

    #[error("unknown rule: {0}")]
    UnknownRule(String),
}

impl IndicatorError {
    pub fn is_malformed_candles(&self) -> bool {
        matches!(
            self,
            IndicatorError::NonMonotonicTime { .. }
                | IndicatorError::NonFiniteValue { .. }
                | IndicatorError::NegativeVolume { .. }
        )
    }
}
