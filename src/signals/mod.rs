//! Setup evaluation over computed indicators.

pub mod engine;
pub mod rules;
pub mod scoring;

pub use engine::*;
pub use rules::{as_rule, Detection, RuleContext, SetupRule};
pub use scoring::*;
