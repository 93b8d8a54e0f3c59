//! driftbook-tracker: users, assets and target-weight portfolios on top of
//! the driftbook analyzer.
//!
//! Holdings live in a [`store::HoldingsStore`] (JSON file or memory), prices
//! come from any [`driftbook_prices::PriceSource`], and every change is
//! appended to a JSONL audit trail. [`service::Tracker`] ties them together;
//! the `driftbook` binary drives it from the command line.

pub mod audit;
pub mod commands;
pub mod config;
pub mod error;
pub mod request;
pub mod service;
pub mod store;
