//! Shared data models spanning the engine layers.

pub mod candle;
pub mod indicators;
pub mod rules;
pub mod scanner;
pub mod setup;

pub use candle::{Candle, OhlcvSeries};
pub use indicators::{
    AdxPoint, BollingerPoint, BollingerSnapshot, EmaSeries, IndicatorBundle, IndicatorParams,
    IndicatorPoint, IndicatorSeries, IndicatorSnapshot,
};
pub use rules::{
    AdxStrongParams, BollingerSqueezeParams, BreakoutVolumeParams, EmaCrossParams,
    PullbackTrendParams, RsiExtremesParams, RuleConfig, RuleId, RuleSet, VolumeSpikeParams,
};
pub use scanner::{PairDetail, ScannerPair, TickerMetadata, Trend};
pub use setup::{EvaluationResult, SetupBadge, SetupKind, TradingSetup};
