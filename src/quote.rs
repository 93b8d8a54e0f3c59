//! Price quotes: the result of asking a price source about one symbol.

use std::fmt;

use rustc_hash::FxHashMap;

use crate::types::Symbol;

/// Outcome of a price lookup.
///
/// A quote is either a usable price or explicitly unavailable. Zero, negative
/// and non-finite prices never appear as `Available`, so "price is zero" cannot
/// be confused with "price missing".
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "status", content = "price", rename_all = "lowercase"))]
pub enum PriceQuote {
    Available(f64),
    Unavailable,
}

impl PriceQuote {
    /// Classify a raw provider price. Non-finite or non-positive values are unavailable.
    pub fn from_raw(price: f64) -> Self {
        if price.is_finite() && price > 0.0 {
            PriceQuote::Available(price)
        } else {
            PriceQuote::Unavailable
        }
    }

    /// Convert an optional raw provider price.
    pub fn from_option(price: Option<f64>) -> Self {
        price.map_or(PriceQuote::Unavailable, PriceQuote::from_raw)
    }

    /// The price, if it is usable.
    ///
    /// Re-checks validity so a hand-built `Available(0.0)` still reads as missing.
    #[inline]
    pub fn price(&self) -> Option<f64> {
        match *self {
            PriceQuote::Available(p) if p.is_finite() && p > 0.0 => Some(p),
            _ => None,
        }
    }

    #[inline]
    pub fn is_available(&self) -> bool {
        self.price().is_some()
    }

    /// The price, or `fallback` when unavailable.
    #[inline]
    pub fn or(&self, fallback: f64) -> f64 {
        self.price().unwrap_or(fallback)
    }
}

impl From<Option<f64>> for PriceQuote {
    fn from(price: Option<f64>) -> Self {
        PriceQuote::from_option(price)
    }
}

impl fmt::Display for PriceQuote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.price() {
            Some(p) => write!(f, "{p:.4}"),
            None => write!(f, "unavailable"),
        }
    }
}

/// Current quotes keyed by symbol. A symbol absent from the map is unavailable.
pub type PriceMap = FxHashMap<Symbol, PriceQuote>;

/// Look up a symbol in a price map, treating absence as unavailable.
#[inline]
pub fn quote_for(prices: &PriceMap, symbol: &Symbol) -> PriceQuote {
    prices.get(symbol).copied().unwrap_or(PriceQuote::Unavailable)
}
