//! Validation errors for portfolio construction and holdings edits.

use std::fmt;

use crate::types::AssetId;

/// Errors returned when a portfolio request or an item edit breaks a domain rule.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ValidationError {
    /// Portfolio name must not be blank.
    EmptyName,
    /// Ticker symbol must not be blank.
    EmptySymbol,
    /// A portfolio needs at least one item.
    NoItems,
    /// Initial investment amount must be finite and greater than zero.
    InvestAmount(f64),
    /// Target weight must be in (0, 100].
    TargetWeight { asset: AssetId, weight: f64 },
    /// Tolerance must be in [0, 50].
    Tolerance { asset: AssetId, tolerance: f64 },
    /// The same asset appears twice in one portfolio request.
    DuplicateAsset(AssetId),
    /// Target weights must sum to 100 within [`WEIGHT_SUM_TOLERANCE`](crate::allocation::WEIGHT_SUM_TOLERANCE).
    WeightSum { total: f64 },
    /// Entry price must be finite and greater than zero.
    EntryPrice(f64),
    /// Held quantity must be finite and non-negative.
    Quantity(f64),
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::EmptyName => write!(f, "portfolio name must not be empty"),
            ValidationError::EmptySymbol => write!(f, "symbol must not be empty"),
            ValidationError::NoItems => write!(f, "portfolio must contain at least one item"),
            ValidationError::InvestAmount(amount) => {
                write!(f, "initial invest amount must be greater than zero, got {amount}")
            }
            ValidationError::TargetWeight { asset, weight } => {
                write!(f, "target weight for {asset} must be in (0, 100], got {weight}")
            }
            ValidationError::Tolerance { asset, tolerance } => {
                write!(f, "tolerance for {asset} must be in [0, 50], got {tolerance}")
            }
            ValidationError::DuplicateAsset(asset) => {
                write!(f, "asset {asset} appears more than once")
            }
            ValidationError::WeightSum { total } => {
                write!(f, "total target weight must be 100%, got {total}%")
            }
            ValidationError::EntryPrice(price) => {
                write!(f, "entry price must be greater than zero, got {price}")
            }
            ValidationError::Quantity(qty) => {
                write!(f, "quantity must be non-negative, got {qty}")
            }
        }
    }
}

impl std::error::Error for ValidationError {}
