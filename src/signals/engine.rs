//! Setup Evaluator: runs the enabled rule catalogue over the latest bar.

use std::collections::HashSet;

use tracing::debug;

use crate::indicators::error::IndicatorError;
use crate::indicators::registry::{compute_indicators, validate_params};
use crate::models::candle::Candle;
use crate::models::indicators::{IndicatorBundle, IndicatorParams};
use crate::models::rules::RuleSet;
use crate::models::setup::{EvaluationResult, SetupKind};
use crate::signals::rules::{as_rule, RuleContext};

/// Evaluate `rules` against the last bar of `candles` using precomputed
/// `indicators`.
///
/// Rules run in catalogue order. Detections repeating an earlier
/// `(setup name, type)` are dropped, so the score only counts each once.
pub fn evaluate_setups(
    candles: &[Candle],
    indicators: &IndicatorBundle,
    rules: &RuleSet,
) -> EvaluationResult {
    let cross = rules.ema_cross_params();
    let Some(ctx) = RuleContext::new(candles, indicators, (cross.fast, cross.slow)) else {
        return EvaluationResult::empty();
    };

    let mut result = EvaluationResult {
        indicators: indicators.snapshot(),
        ..EvaluationResult::default()
    };
    let mut seen: HashSet<(String, SetupKind)> = HashSet::new();

    for config in rules.iter() {
        for detection in as_rule(config).detect(&ctx) {
            if !seen.insert((detection.setup.name.clone(), detection.setup.kind)) {
                continue;
            }
            debug!(
                rule = %config.id(),
                badge = %detection.badge,
                weight = detection.weight,
                "setup detected"
            );
            result.score = result.score.saturating_add(detection.weight);
            if !result.badges.contains(&detection.badge) {
                result.badges.push(detection.badge);
            }
            result.rationale.push(detection.rationale);
            result.setups.push(detection.setup);
        }
    }

    result
}

/// Indicator params and rule set bound together, ready to evaluate candle
/// histories end to end.
#[derive(Debug, Clone, PartialEq)]
pub struct SetupEngine {
    params: IndicatorParams,
    rules: RuleSet,
}

impl SetupEngine {
    /// Validates both halves and widens `params` to cover every EMA the rules read.
    pub fn new(params: IndicatorParams, rules: RuleSet) -> Result<Self, IndicatorError> {
        rules.validate()?;
        let params = params.covering(&rules);
        validate_params(&params)?;
        Ok(Self { params, rules })
    }

    pub fn params(&self) -> &IndicatorParams {
        &self.params
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    pub fn evaluate(&self, candles: &[Candle]) -> Result<EvaluationResult, IndicatorError> {
        self.evaluate_with_indicators(candles).map(|(result, _)| result)
    }

    /// Evaluation plus the full indicator bundle it was computed from.
    pub fn evaluate_with_indicators(
        &self,
        candles: &[Candle],
    ) -> Result<(EvaluationResult, IndicatorBundle), IndicatorError> {
        let bundle = compute_indicators(candles, &self.params)?;
        let result = evaluate_setups(candles, &bundle, &self.rules);
        Ok((result, bundle))
    }
}

impl Default for SetupEngine {
    fn default() -> Self {
        let rules = RuleSet::default();
        Self {
            params: IndicatorParams::default().covering(&rules),
            rules,
        }
    }
}

/// One-shot evaluation with explicit params and rules.
pub fn evaluate_candles(
    candles: &[Candle],
    params: &IndicatorParams,
    rules: &RuleSet,
) -> Result<EvaluationResult, IndicatorError> {
    SetupEngine::new(params.clone(), rules.clone())?.evaluate(candles)
}
