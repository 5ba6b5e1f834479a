//! Core domain types and logic.

pub mod config_validation;
pub mod detail;
pub mod error;
pub mod evaluator;
pub mod filter;
pub mod indicator;
pub mod ohlcv;
pub mod result_set;
pub mod screener;
pub mod session;
