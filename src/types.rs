//! Core types: Symbol, UserId, AssetId, PortfolioId, ItemId

use std::fmt;

use crate::error::ValidationError;

/// Ticker symbol identifying an asset (e.g. `AAPL`, `VTI`, `005930`, `BTC-USD`).
///
/// Symbols are trimmed and upper-cased on construction so that lookups in
/// price maps and stores are not sensitive to how the user typed them.
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "String", into = "String"))]
pub struct Symbol(String);

impl Symbol {
    /// Create a symbol, normalizing whitespace and case.
    ///
    /// An empty symbol is a programming error (use [`Symbol::parse`] for user input).
    pub fn new(s: &str) -> Self {
        let normalized = s.trim().to_uppercase();
        debug_assert!(!normalized.is_empty(), "symbol must not be empty");
        Symbol(normalized)
    }

    /// Parse a symbol from untrusted input.
    pub fn parse(s: &str) -> Result<Self, ValidationError> {
        let normalized = s.trim().to_uppercase();
        if normalized.is_empty() {
            return Err(ValidationError::EmptySymbol);
        }
        Ok(Symbol(normalized))
    }

    /// The normalized ticker text.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Forward to str so width/alignment flags work in report tables
        fmt::Display::fmt(&self.0, f)
    }
}

impl AsRef<str> for Symbol {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Symbol {
    type Error = ValidationError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Symbol::parse(&s)
    }
}

impl From<Symbol> for String {
    fn from(symbol: Symbol) -> Self {
        symbol.0
    }
}

macro_rules! id_type {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        #[cfg_attr(feature = "serde", serde(transparent))]
        pub struct $name(pub u64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "{}"), self.0)
            }
        }
    };
}

id_type!(
    /// Unique user identifier assigned by the holdings store.
    UserId,
    "U"
);
id_type!(
    /// Unique asset identifier assigned by the holdings store.
    AssetId,
    "A"
);
id_type!(
    /// Unique portfolio identifier assigned by the holdings store.
    PortfolioId,
    "P"
);
id_type!(
    /// Unique portfolio item identifier assigned by the holdings store.
    ItemId,
    "I"
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symbol_normalizes() {
        assert_eq!(Symbol::new(" aapl ").as_str(), "AAPL");
        assert_eq!(Symbol::new("btc-usd"), Symbol::new("BTC-USD"));
        assert_eq!(Symbol::new("005930").as_str(), "005930");
    }

    #[test]
    fn symbol_parse_rejects_blank() {
        assert_eq!(Symbol::parse("   "), Err(ValidationError::EmptySymbol));
        assert_eq!(Symbol::parse("vti").unwrap().as_str(), "VTI");
    }

    #[test]
    fn symbol_display_respects_width() {
        assert_eq!(format!("{:6}|", Symbol::new("SPY")), "SPY   |");
    }

    #[test]
    #[cfg(feature = "serde")]
    fn symbol_deserializes_normalized() {
        let symbol: Symbol = serde_json::from_str("\" vti \"").unwrap();
        assert_eq!(symbol, Symbol::new("VTI"));
        assert_eq!(serde_json::to_string(&symbol).unwrap(), "\"VTI\"");
        assert!(serde_json::from_str::<Symbol>("\"  \"").is_err());
    }

    #[test]
    fn id_display() {
        assert_eq!(format!("{}", UserId(7)), "U7");
        assert_eq!(format!("{}", AssetId(3)), "A3");
        assert_eq!(format!("{}", PortfolioId(12)), "P12");
        assert_eq!(format!("{}", ItemId(40)), "I40");
    }

    #[test]
    fn id_ordering() {
        assert!(PortfolioId(1) < PortfolioId(2));
        assert_eq!(ItemId(5), ItemId(5));
    }
}
