//! JSONL audit trail of holdings changes.
//!
//! Every mutation the tracker commits appends one JSON object per line to
//! the audit file. Reads are not logged.

use std::fs::{self, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;

use chrono::{DateTime, Utc};
use driftbook::{Asset, Portfolio, PortfolioId, PortfolioItem, User, UserId};
use serde::Serialize;

use crate::error::Result;

/// An audit event written to the JSONL trail.
#[derive(Debug, Clone, Serialize)]
pub struct AuditEvent {
    pub event: &'static str,
    pub ts: DateTime<Utc>,
    #[serde(flatten)]
    pub data: serde_json::Value,
}

/// Append-only audit logger.
#[derive(Debug)]
pub struct AuditLog {
    writer: BufWriter<std::fs::File>,
}

impl AuditLog {
    /// Open (or create) the audit log file for appending.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new().create(true).append(true).open(path)?;

        Ok(Self {
            writer: BufWriter::new(file),
        })
    }

    /// Log an event with arbitrary JSON data.
    pub fn log(&mut self, event: &'static str, data: serde_json::Value) -> Result<()> {
        let entry = AuditEvent {
            event,
            ts: Utc::now(),
            data,
        };
        let json = serde_json::to_string(&entry)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        writeln!(self.writer, "{json}")?;
        self.writer.flush()?;
        Ok(())
    }
}

/// A user account was created.
pub fn log_user_registered(audit: &mut AuditLog, user: &User) -> Result<()> {
    audit.log(
        "user_registered",
        serde_json::json!({
            "user": user.id.0,
            "email": user.email,
        }),
    )
}

/// A user and all of their portfolios were removed.
pub fn log_user_deleted(audit: &mut AuditLog, user: UserId) -> Result<()> {
    audit.log("user_deleted", serde_json::json!({ "user": user.0 }))
}

/// A new asset was registered. Re-registering an existing symbol is not logged.
pub fn log_asset_registered(audit: &mut AuditLog, asset: &Asset) -> Result<()> {
    audit.log(
        "asset_registered",
        serde_json::json!({
            "asset": asset.id.0,
            "symbol": asset.symbol.as_str(),
            "kind": asset.kind.to_string(),
            "currency": asset.currency,
        }),
    )
}

/// A portfolio was funded and created.
pub fn log_portfolio_created(audit: &mut AuditLog, portfolio: &Portfolio) -> Result<()> {
    let items: Vec<_> = portfolio
        .items
        .iter()
        .map(|i| {
            serde_json::json!({
                "item": i.id.0,
                "symbol": i.symbol().as_str(),
                "target_weight": i.target_weight,
                "tolerance": i.tolerance,
                "entry_price": i.entry_price,
                "quantity": i.initial_quantity,
            })
        })
        .collect();

    audit.log(
        "portfolio_created",
        serde_json::json!({
            "portfolio": portfolio.id.0,
            "owner": portfolio.owner.0,
            "name": portfolio.name,
            "amount": portfolio.initial_invest_amount,
            "items": items,
        }),
    )
}

/// An item's held quantity was edited.
pub fn log_quantity_updated(
    audit: &mut AuditLog,
    portfolio: PortfolioId,
    item: &PortfolioItem,
    previous: f64,
) -> Result<()> {
    audit.log(
        "quantity_updated",
        serde_json::json!({
            "portfolio": portfolio.0,
            "item": item.id.0,
            "symbol": item.symbol().as_str(),
            "from": previous,
            "to": item.current_quantity(),
        }),
    )
}

/// A portfolio and its items were removed.
pub fn log_portfolio_deleted(
    audit: &mut AuditLog,
    portfolio: PortfolioId,
    owner: UserId,
) -> Result<()> {
    audit.log(
        "portfolio_deleted",
        serde_json::json!({
            "portfolio": portfolio.0,
            "owner": owner.0,
        }),
    )
}
