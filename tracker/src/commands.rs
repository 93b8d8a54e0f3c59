//! Wiring and terminal output for the CLI.

use std::sync::Arc;

use driftbook::{AnalysisReport, Asset, Portfolio, PortfolioSummary, User};
use driftbook_prices::ResilientSource;
use driftbook_prices::chart::ChartFeed;
use log::info;

use crate::audit::AuditLog;
use crate::config::Config;
use crate::error::Result;
use crate::service::Tracker;
use crate::store::FileStore;

/// The tracker the binary runs: JSON file store, live chart prices.
pub type LiveTracker = Tracker<FileStore, ResilientSource<ChartFeed>>;

/// Open the store, price source and audit trail described by `config`.
pub fn open(config: &Config) -> Result<LiveTracker> {
    let store = FileStore::open(&config.store_path())?;
    let feed = ChartFeed::new(&config.prices.base_url, config.price_timeout())?;
    let cache = Arc::new(config.price_cache());
    let prices = ResilientSource::new(feed, config.retry_policy(), cache);
    let audit = AuditLog::open(&config.audit_path())?;
    info!(
        "Using store {} and prices from {}",
        store.path().display(),
        config.prices.base_url
    );
    Ok(Tracker::new(store, prices).with_audit(audit))
}

pub fn print_user(user: &User) {
    println!(
        "User {} <{}> created {}",
        user.id,
        user.email,
        user.created_at.format("%Y-%m-%d %H:%M")
    );
}

pub fn print_asset(asset: &Asset) {
    println!("Asset {} {}: {}", asset.id, asset.symbol, asset.name);
    println!(
        "  kind {}, currency {}, exchange {}",
        asset.kind,
        asset.currency,
        asset.exchange.as_deref().unwrap_or("-")
    );
}

pub fn print_asset_list(assets: &[Asset]) {
    if assets.is_empty() {
        println!("No matching assets.");
        return;
    }

    println!("  {:>6}  {:10} {:8} {:8} Name", "Id", "Symbol", "Kind", "Currency");
    for a in assets {
        println!(
            "  {:>6}  {:10} {:8} {:8} {}",
            a.id.to_string(),
            a.symbol,
            a.kind.to_string(),
            a.currency,
            a.name,
        );
    }
}

pub fn print_portfolio_list(portfolios: &[PortfolioSummary]) {
    if portfolios.is_empty() {
        println!("No portfolios.");
        return;
    }

    println!("  {:>6}  {:24} {:>14}  Created", "Id", "Name", "Invested");
    for p in portfolios {
        println!(
            "  {:>6}  {:24} {:>14.2}  {}",
            p.id.to_string(),
            p.name,
            p.initial_invest_amount,
            p.created_at.format("%Y-%m-%d"),
        );
    }
}

pub fn print_portfolio(portfolio: &Portfolio) {
    println!("PORTFOLIO {} \"{}\":", portfolio.id, portfolio.name);
    if let Some(description) = &portfolio.description {
        println!("  {description}");
    }
    println!(
        "  Invested {:.2} on {}\n",
        portfolio.initial_invest_amount,
        portfolio.created_at.format("%Y-%m-%d")
    );
    println!(
        "  {:>6}  {:10} {:>8} {:>6} {:>10} {:>12} {:>12}",
        "Item", "Symbol", "Target%", "Tol%", "Entry", "Initial", "Current"
    );
    for item in &portfolio.items {
        println!(
            "  {:>6}  {:10} {:>7.2}% {:>5.1}% {:>10.2} {:>12.4} {:>12.4}",
            item.id.to_string(),
            item.symbol(),
            item.target_weight,
            item.tolerance,
            item.entry_price,
            item.initial_quantity,
            item.current_quantity(),
        );
    }
}

/// Print the drift table, plus suggested trades for items out of range.
pub fn print_report(report: &AnalysisReport) {
    print!("{report}");

    if !report.needs_rebalance() {
        println!("\nAll items within tolerance.");
        return;
    }

    println!("\nOUT OF RANGE:");
    for item in report.out_of_range() {
        let qty = item.rebalance_quantity;
        println!(
            "  {:10} {:>+7.2}% vs tolerance {:.1}%  ({} {:.4} @ {:.2})",
            item.asset.symbol,
            item.weight_diff,
            item.tolerance,
            if qty > 0.0 { "buy" } else { "sell" },
            qty.abs(),
            item.current_price,
        );
    }
}

pub fn print_report_json(report: &AnalysisReport) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(report)?);
    Ok(())
}
