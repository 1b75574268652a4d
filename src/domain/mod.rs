//! Core domain types and logic.

pub mod ohlcv;
pub mod indicator;
pub mod condition;
pub mod condition_parser;
pub mod condition_eval;
pub mod strategy;
pub mod portfolio;
pub mod engine;
pub mod error;
