//! Helpers shared across indicator and rule code.

pub mod math;
