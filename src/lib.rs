//! # driftbook
//!
//! Target-weight portfolio tracking: fund a portfolio once, record what you
//! actually hold, and see how far each holding has drifted from its target.
//!
//! ## Features
//!
//! - **Allocation**: split an initial investment across target weights at creation-time prices
//! - **Drift analysis**: current weight, signed drift and out-of-tolerance flags per item
//! - **Graceful pricing**: a missing quote values the item at its entry price instead of failing
//! - **Explicit quotes**: [`PriceQuote`] separates "no price" from any numeric price
//!
//! ## Quick Start
//!
//! ```
//! use chrono::Utc;
//! use driftbook::{
//!     analyze, AssetId, ItemId, NewAsset, Portfolio, PortfolioId, PortfolioItem, PriceMap,
//!     PriceQuote, Symbol, UserId,
//! };
//!
//! let vti = NewAsset::new(Symbol::new("VTI"), "Total Stock Market").into_asset(AssetId(1), Utc::now());
//! let bnd = NewAsset::new(Symbol::new("BND"), "Total Bond Market").into_asset(AssetId(2), Utc::now());
//!
//! // 1,000 invested 60/40 at 100 and 50 → 6 and 8 units
//! let portfolio = Portfolio {
//!     id: PortfolioId(1),
//!     owner: UserId(1),
//!     name: "Balanced".into(),
//!     description: None,
//!     initial_invest_amount: 1_000.0,
//!     created_at: Utc::now(),
//!     items: vec![
//!         PortfolioItem::new(ItemId(1), PortfolioId(1), vti, 60.0, 5.0, 100.0, 6.0, 6.0, Utc::now()),
//!         PortfolioItem::new(ItemId(2), PortfolioId(1), bnd, 40.0, 5.0, 50.0, 8.0, 8.0, Utc::now()),
//!     ],
//! };
//!
//! // Stocks doubled, bonds flat
//! let mut prices = PriceMap::default();
//! prices.insert(Symbol::new("VTI"), PriceQuote::Available(200.0));
//! prices.insert(Symbol::new("BND"), PriceQuote::Available(50.0));
//!
//! let report = analyze(&portfolio, &prices);
//! assert_eq!(report.total_value, 1_600.0);
//! assert_eq!(report.items[0].current_weight, 75.0);
//! assert_eq!(report.items[0].weight_diff, 15.0);
//! assert!(report.items[0].is_out_of_range);
//! assert!(report.needs_rebalance());
//! ```
//!
//! ## Missing Quotes
//!
//! A symbol with no usable quote is valued at the item's entry price:
//!
//! ```
//! use driftbook::PriceQuote;
//!
//! assert_eq!(PriceQuote::from_raw(0.0), PriceQuote::Unavailable);
//! assert_eq!(PriceQuote::Unavailable.or(42.5), 42.5);
//! assert_eq!(PriceQuote::Available(10.0).or(42.5), 10.0);
//! ```
//!
//! ## Drift Status
//!
//! | Status | Condition |
//! |--------|-----------|
//! | **Within** | `abs(diff) <= tolerance` |
//! | **Warning** | `tolerance < abs(diff) <= 1.5 * tolerance` |
//! | **Critical** | `abs(diff) > 1.5 * tolerance` |

pub mod allocation;
pub mod analysis;
mod asset;
mod error;
mod portfolio;
mod quote;
mod types;

// Re-export public API
pub use allocation::{AllocatedItem, NewItem, NewPortfolio, allocate};
pub use analysis::{AnalysisReport, DriftStatus, ItemAnalysis, analyze};
pub use asset::{Asset, AssetKind, NewAsset};
pub use error::ValidationError;
pub use portfolio::{Portfolio, PortfolioItem, PortfolioSummary, User, validate_quantity};
pub use quote::{PriceMap, PriceQuote, quote_for};
pub use types::{AssetId, ItemId, PortfolioId, Symbol, UserId};
