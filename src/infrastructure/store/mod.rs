//! Append-only strategy persistence.

pub mod strategy_store;

pub use strategy_store::{ListFilter, StrategyStore};
