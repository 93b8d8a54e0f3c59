//! Portfolio spec (spec.json) loading and validation.
//!
//! A spec names assets by symbol. The tracker registers any symbols it does
//! not know yet, then turns the file into a [`NewPortfolio`] keyed by asset id.
//!
//! ```json
//! {
//!   "name": "Balanced",
//!   "initial_invest_amount": 10000,
//!   "items": [
//!     { "symbol": "VTI", "target_weight": 60, "kind": "etf" },
//!     { "symbol": "BND", "target_weight": 40, "tolerance": 3 }
//!   ]
//! }
//! ```

use std::path::Path;

use driftbook::{AssetId, AssetKind, NewAsset, NewItem, NewPortfolio, Symbol, ValidationError};
use rustc_hash::FxHashSet;
use serde::Deserialize;

use crate::error::{Error, Result};

/// A portfolio to create, as written by the user.
#[derive(Debug, Clone, Deserialize)]
pub struct PortfolioSpec {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub initial_invest_amount: f64,
    pub items: Vec<ItemSpec>,
}

/// One item of a spec. Asset metadata is only used when the symbol is new.
#[derive(Debug, Clone, Deserialize)]
pub struct ItemSpec {
    pub symbol: String,
    pub target_weight: f64,
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub kind: Option<AssetKind>,
    #[serde(default)]
    pub exchange: Option<String>,
    #[serde(default)]
    pub currency: Option<String>,
}

fn default_tolerance() -> f64 {
    driftbook::allocation::DEFAULT_TOLERANCE
}

impl PortfolioSpec {
    /// Load and validate a spec file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| Error::SpecRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_json(&contents)
    }

    /// Parse from a JSON string (useful for testing).
    pub fn from_json(json: &str) -> Result<Self> {
        let spec: PortfolioSpec = serde_json::from_str(json)?;
        spec.validate()?;
        Ok(spec)
    }

    /// Validate without touching any store.
    ///
    /// Runs the same rules as [`NewPortfolio::validate`] so that a spec which
    /// cannot be created is rejected before any asset gets registered.
    fn validate(&self) -> Result<()> {
        if self.items.is_empty() {
            return Err(Error::Spec("items list is empty".into()));
        }

        let mut seen = FxHashSet::default();
        for item in &self.items {
            let symbol = Symbol::parse(&item.symbol)?;
            if !seen.insert(symbol.clone()) {
                return Err(Error::Spec(format!("duplicate symbol: {symbol}")));
            }
        }

        // Positional ids stand in for the asset ids the store will assign
        let ids: Vec<AssetId> = (1..=self.items.len() as u64).map(AssetId).collect();
        self.request(&ids).validate().map_err(|e| self.describe(e))
    }

    /// Reword item-level errors to name the symbol instead of a positional id.
    fn describe(&self, err: ValidationError) -> Error {
        let symbol = |asset: AssetId| {
            let index = asset.0.saturating_sub(1) as usize;
            self.items
                .get(index)
                .map(|i| i.symbol.trim().to_uppercase())
                .unwrap_or_default()
        };
        match err {
            ValidationError::TargetWeight { asset, weight } => Error::Spec(format!(
                "{}: target weight must be in (0, 100], got {weight}",
                symbol(asset)
            )),
            ValidationError::Tolerance { asset, tolerance } => Error::Spec(format!(
                "{}: tolerance must be in [0, 50], got {tolerance}",
                symbol(asset)
            )),
            other => other.into(),
        }
    }

    /// Symbols in item order.
    pub fn symbols(&self) -> Vec<Symbol> {
        self.items.iter().map(|i| Symbol::new(&i.symbol)).collect()
    }

    /// Asset registration requests, one per item.
    pub fn assets(&self) -> Vec<NewAsset> {
        self.items
            .iter()
            .map(|item| {
                let mut asset =
                    NewAsset::new(Symbol::new(&item.symbol), item.name.as_deref().unwrap_or(""));
                if let Some(kind) = item.kind {
                    asset = asset.kind(kind);
                }
                if let Some(exchange) = &item.exchange {
                    asset = asset.exchange(exchange);
                }
                if let Some(currency) = &item.currency {
                    asset = asset.currency(currency);
                }
                asset
            })
            .collect()
    }

    /// Build the creation request, pairing items with `asset_ids` by position.
    pub fn request(&self, asset_ids: &[AssetId]) -> NewPortfolio {
        let mut draft = NewPortfolio::new(&self.name, self.initial_invest_amount);
        draft.description = self.description.clone();
        for (item, &asset_id) in self.items.iter().zip(asset_ids) {
            let requested = NewItem::new(asset_id, item.target_weight).tolerance(item.tolerance);
            draft = draft.item(requested);
        }
        draft
    }
}
