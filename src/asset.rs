//! Tradable assets: the instruments a portfolio item points at.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};

use crate::error::ValidationError;
use crate::types::{AssetId, Symbol};

/// Category tag of an asset.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum AssetKind {
    #[default]
    Stock,
    Etf,
    Crypto,
    Fund,
    Bond,
    Other,
}

impl fmt::Display for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AssetKind::Stock => "stock",
            AssetKind::Etf => "etf",
            AssetKind::Crypto => "crypto",
            AssetKind::Fund => "fund",
            AssetKind::Bond => "bond",
            AssetKind::Other => "other",
        };
        f.write_str(s)
    }
}

impl FromStr for AssetKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "stock" => Ok(AssetKind::Stock),
            "etf" => Ok(AssetKind::Etf),
            "crypto" => Ok(AssetKind::Crypto),
            "fund" => Ok(AssetKind::Fund),
            "bond" => Ok(AssetKind::Bond),
            "other" => Ok(AssetKind::Other),
            other => Err(format!("unknown asset kind: {other}")),
        }
    }
}

/// A registered asset. Immutable once created.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Asset {
    pub id: AssetId,
    pub symbol: Symbol,
    pub name: String,
    pub exchange: Option<String>,
    pub currency: String,
    pub kind: AssetKind,
    pub created_at: DateTime<Utc>,
}

/// Registration request for a new asset.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NewAsset {
    pub symbol: Symbol,
    pub name: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub exchange: Option<String>,
    #[cfg_attr(feature = "serde", serde(default = "default_currency"))]
    pub currency: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub kind: AssetKind,
}

fn default_currency() -> String {
    "USD".into()
}

impl NewAsset {
    /// A stock quoted in USD with no exchange; the common case.
    ///
    /// An empty `name` falls back to the symbol text.
    pub fn new(symbol: Symbol, name: &str) -> Self {
        let name = if name.trim().is_empty() {
            symbol.as_str().to_string()
        } else {
            name.trim().to_string()
        };
        Self {
            symbol,
            name,
            exchange: None,
            currency: default_currency(),
            kind: AssetKind::default(),
        }
    }

    pub fn exchange(mut self, exchange: &str) -> Self {
        self.exchange = Some(exchange.to_string());
        self
    }

    pub fn currency(mut self, currency: &str) -> Self {
        self.currency = currency.trim().to_uppercase();
        self
    }

    pub fn kind(mut self, kind: AssetKind) -> Self {
        self.kind = kind;
        self
    }

    /// Check the request before it reaches a store.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.symbol.as_str().is_empty() {
            return Err(ValidationError::EmptySymbol);
        }
        Ok(())
    }

    /// Materialize the request into an [`Asset`] with the id the store assigned.
    pub fn into_asset(self, id: AssetId, created_at: DateTime<Utc>) -> Asset {
        Asset {
            id,
            symbol: self.symbol,
            name: self.name,
            exchange: self.exchange,
            currency: self.currency,
            kind: self.kind,
            created_at,
        }
    }
}
