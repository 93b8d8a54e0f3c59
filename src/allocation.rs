//! Portfolio creation requests and initial-quantity allocation.
//!
//! A request lists assets with target weights. Once every asset has an entry
//! price, each item gets `amount * weight / 100 / entry_price` units, which
//! become both its fixed `initial_quantity` and its starting `current_quantity`.
//!
//! ```
//! use driftbook::allocation::{NewItem, NewPortfolio, allocate};
//! use driftbook::AssetId;
//!
//! let request = NewPortfolio::new("Balanced", 1_000.0)
//!     .item(NewItem::new(AssetId(1), 60.0))
//!     .item(NewItem::new(AssetId(2), 40.0));
//! request.validate().unwrap();
//!
//! let a = allocate(request.initial_invest_amount, &request.items[0], 100.0).unwrap();
//! let b = allocate(request.initial_invest_amount, &request.items[1], 50.0).unwrap();
//! assert_eq!(a.initial_quantity, 6.0);
//! assert_eq!(b.initial_quantity, 8.0);
//! ```

use rustc_hash::FxHashSet;

use crate::error::ValidationError;
use crate::types::AssetId;

/// Floating-point slack allowed when checking that target weights sum to 100.
pub const WEIGHT_SUM_TOLERANCE: f64 = 0.01;

/// Tolerance applied when a request does not specify one.
pub const DEFAULT_TOLERANCE: f64 = 5.0;

/// Upper bound for an item's tolerance (percentage points).
pub const MAX_TOLERANCE: f64 = 50.0;

/// Request to create a portfolio.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NewPortfolio {
    pub name: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub description: Option<String>,
    pub initial_invest_amount: f64,
    pub items: Vec<NewItem>,
}

/// One requested item: which asset, what share, how much drift is acceptable.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NewItem {
    pub asset_id: AssetId,
    pub target_weight: f64,
    #[cfg_attr(feature = "serde", serde(default = "default_tolerance"))]
    pub tolerance: f64,
}

fn default_tolerance() -> f64 {
    DEFAULT_TOLERANCE
}

impl NewItem {
    pub fn new(asset_id: AssetId, target_weight: f64) -> Self {
        Self {
            asset_id,
            target_weight,
            tolerance: DEFAULT_TOLERANCE,
        }
    }

    pub fn tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    fn validate(&self) -> Result<(), ValidationError> {
        let w = self.target_weight;
        if !w.is_finite() || w <= 0.0 || w > 100.0 {
            return Err(ValidationError::TargetWeight {
                asset: self.asset_id,
                weight: w,
            });
        }
        let t = self.tolerance;
        if !t.is_finite() || !(0.0..=MAX_TOLERANCE).contains(&t) {
            return Err(ValidationError::Tolerance {
                asset: self.asset_id,
                tolerance: t,
            });
        }
        Ok(())
    }
}

impl NewPortfolio {
    pub fn new(name: &str, initial_invest_amount: f64) -> Self {
        Self {
            name: name.to_string(),
            description: None,
            initial_invest_amount,
            items: Vec::new(),
        }
    }

    pub fn description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    pub fn item(mut self, item: NewItem) -> Self {
        self.items.push(item);
        self
    }

    /// Sum of requested target weights.
    pub fn total_weight(&self) -> f64 {
        self.items.iter().map(|i| i.target_weight).sum()
    }

    /// Check every creation-time rule.
    ///
    /// This is the only place the 100% weight sum is enforced; later quantity
    /// edits are not re-checked against it.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::EmptyName);
        }
        let amount = self.initial_invest_amount;
        if !amount.is_finite() || amount <= 0.0 {
            return Err(ValidationError::InvestAmount(amount));
        }
        if self.items.is_empty() {
            return Err(ValidationError::NoItems);
        }

        let mut seen = FxHashSet::default();
        for item in &self.items {
            item.validate()?;
            if !seen.insert(item.asset_id) {
                return Err(ValidationError::DuplicateAsset(item.asset_id));
            }
        }

        let total = self.total_weight();
        if (total - 100.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(ValidationError::WeightSum { total });
        }

        Ok(())
    }
}

/// A requested item with its creation-time price and quantities resolved.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AllocatedItem {
    pub asset_id: AssetId,
    pub target_weight: f64,
    pub tolerance: f64,
    pub entry_price: f64,
    pub initial_quantity: f64,
    pub current_quantity: f64,
}

/// Allocate one item's share of the initial investment at `entry_price`.
pub fn allocate(
    initial_invest_amount: f64,
    item: &NewItem,
    entry_price: f64,
) -> Result<AllocatedItem, ValidationError> {
    if !entry_price.is_finite() || entry_price <= 0.0 {
        return Err(ValidationError::EntryPrice(entry_price));
    }

    let item_invest_amount = initial_invest_amount * (item.target_weight / 100.0);
    let initial_quantity = item_invest_amount / entry_price;

    Ok(AllocatedItem {
        asset_id: item.asset_id,
        target_weight: item.target_weight,
        tolerance: item.tolerance,
        entry_price,
        initial_quantity,
        current_quantity: initial_quantity,
    })
}
