//! Users, portfolios and their items as recorded by a holdings store.
//!
//! A portfolio is created once with a set of target weights and an initial
//! investment amount. Each item's `entry_price` and `initial_quantity` are
//! fixed at that moment; afterwards only `current_quantity` changes, by
//! explicit user action, to mirror trades made outside this system.

use chrono::{DateTime, Utc};

use crate::asset::Asset;
use crate::error::ValidationError;
use crate::types::{ItemId, PortfolioId, Symbol, UserId};

/// An account owning zero or more portfolios.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

/// One weighted holding inside a portfolio.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PortfolioItem {
    pub id: ItemId,
    pub portfolio_id: PortfolioId,
    pub asset: Asset,
    /// Intended share of portfolio value, percent in (0, 100].
    pub target_weight: f64,
    /// Allowed drift in percentage points before the item is flagged, in [0, 50].
    pub tolerance: f64,
    /// Price at creation time. Never updated.
    pub entry_price: f64,
    /// Units bought at creation time. Never updated.
    pub initial_quantity: f64,
    /// Units held now.
    current_quantity: f64,
    pub created_at: DateTime<Utc>,
}

impl PortfolioItem {
    /// Assemble an item as a store would hydrate it.
    ///
    /// Invariants (`entry_price > 0`, `initial_quantity > 0`,
    /// `current_quantity >= 0`) are the caller's responsibility; stores only
    /// build items from [`AllocatedItem`](crate::allocation::AllocatedItem)s
    /// and validated quantity edits.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: ItemId,
        portfolio_id: PortfolioId,
        asset: Asset,
        target_weight: f64,
        tolerance: f64,
        entry_price: f64,
        initial_quantity: f64,
        current_quantity: f64,
        created_at: DateTime<Utc>,
    ) -> Self {
        debug_assert!(entry_price > 0.0, "entry_price must be positive, got {entry_price}");
        debug_assert!(
            initial_quantity > 0.0,
            "initial_quantity must be positive, got {initial_quantity}"
        );
        debug_assert!(
            current_quantity >= 0.0,
            "current_quantity must be non-negative, got {current_quantity}"
        );
        Self {
            id,
            portfolio_id,
            asset,
            target_weight,
            tolerance,
            entry_price,
            initial_quantity,
            current_quantity,
            created_at,
        }
    }

    #[inline]
    pub fn symbol(&self) -> &Symbol {
        &self.asset.symbol
    }

    /// Units held now.
    #[inline]
    pub fn current_quantity(&self) -> f64 {
        self.current_quantity
    }

    /// Record the units actually held after a trade.
    ///
    /// The only mutation an item supports. Target weights are not re-checked.
    pub fn set_current_quantity(&mut self, quantity: f64) -> Result<(), ValidationError> {
        validate_quantity(quantity)?;
        self.current_quantity = quantity;
        Ok(())
    }

    /// Value of the creation-time purchase (`initial_quantity * entry_price`).
    #[inline]
    pub fn cost_basis(&self) -> f64 {
        self.initial_quantity * self.entry_price
    }
}

/// Reject negative, NaN and infinite quantities.
pub fn validate_quantity(quantity: f64) -> Result<(), ValidationError> {
    if !quantity.is_finite() || quantity < 0.0 {
        return Err(ValidationError::Quantity(quantity));
    }
    Ok(())
}

/// A portfolio with its items, in creation order.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Portfolio {
    pub id: PortfolioId,
    pub owner: UserId,
    pub name: String,
    pub description: Option<String>,
    /// Amount funded at creation. Fixed.
    pub initial_invest_amount: f64,
    pub created_at: DateTime<Utc>,
    pub items: Vec<PortfolioItem>,
}

impl Portfolio {
    /// Header fields without the items.
    pub fn summary(&self) -> PortfolioSummary {
        PortfolioSummary {
            id: self.id,
            owner: self.owner,
            name: self.name.clone(),
            description: self.description.clone(),
            initial_invest_amount: self.initial_invest_amount,
            created_at: self.created_at,
        }
    }

    pub fn item(&self, id: ItemId) -> Option<&PortfolioItem> {
        self.items.iter().find(|i| i.id == id)
    }

    pub fn item_mut(&mut self, id: ItemId) -> Option<&mut PortfolioItem> {
        self.items.iter_mut().find(|i| i.id == id)
    }

    /// Symbols of all items, in item order, without duplicates.
    pub fn symbols(&self) -> Vec<Symbol> {
        let mut symbols: Vec<Symbol> = Vec::with_capacity(self.items.len());
        for item in &self.items {
            if !symbols.contains(item.symbol()) {
                symbols.push(item.symbol().clone());
            }
        }
        symbols
    }

    /// Sum of item target weights.
    ///
    /// Equal to 100 (within slack) at creation; item edits do not re-check it.
    pub fn total_target_weight(&self) -> f64 {
        self.items.iter().map(|i| i.target_weight).sum()
    }
}

/// Portfolio header, as listed and as embedded in an analysis report.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PortfolioSummary {
    pub id: PortfolioId,
    pub owner: UserId,
    pub name: String,
    pub description: Option<String>,
    pub initial_invest_amount: f64,
    pub created_at: DateTime<Utc>,
}
