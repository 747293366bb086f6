//! Crypto market scanner: candles in, ranked trading setups out.
//!
//! Layers, bottom-up: `indicators` builds validated series and computes the
//! indicator bundle, `signals` turns a bundle into scored setups, `scanner`
//! evaluates a symbol universe and ranks it, `core` serves it over HTTP.

pub mod common;
pub mod config;
pub mod core;
pub mod indicators;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod scanner;
pub mod services;
pub mod signals;
