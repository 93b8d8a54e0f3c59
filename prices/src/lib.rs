//! Price sources for driftbook.
//!
//! Two traits split the concern:
//!
//! - [`PriceFeed`]: one raw outbound lookup that may fail.
//! - [`PriceSource`]: what the rest of the workspace consumes. Never fails;
//!   a symbol without a usable price comes back as [`PriceQuote::Unavailable`].
//!
//! [`ResilientSource`] turns any feed into a source by adding the shared
//! [`RetryPolicy`] and an injected [`PriceCache`].
//!
//! Implementations:
//!
//! - **Mock** ([`mock::MockFeed`]): scripted prices and failures for tests
//! - **Chart** (feature `http`): Yahoo-style chart endpoint over blocking HTTP

pub mod cache;
pub mod error;
pub mod mock;
pub mod retry;
pub mod source;

#[cfg(feature = "http")]
pub mod chart;

pub use cache::{Clock, ManualClock, PriceCache, SystemClock};
pub use error::PriceError;
pub use retry::{RetryPolicy, Sleeper, ThreadSleeper};
pub use source::ResilientSource;

use driftbook::{PriceMap, PriceQuote, Symbol};

/// A provider that can be asked for the latest price of one symbol.
pub trait PriceFeed {
    /// Short provider name for logs.
    fn name(&self) -> &str;

    /// Fetch the latest price.
    ///
    /// `Ok(Unavailable)` means the provider answered but has no usable price.
    /// `Err` means the lookup itself failed.
    fn latest_price(&self, symbol: &Symbol) -> Result<PriceQuote, PriceError>;
}

/// Current prices as consumed by the tracker and the analyzer.
pub trait PriceSource {
    /// Latest quote for one symbol.
    fn get_price(&self, symbol: &Symbol) -> PriceQuote;

    /// Quotes for several symbols. Each distinct symbol is looked up once.
    fn get_prices(&self, symbols: &[Symbol]) -> PriceMap {
        let mut prices = PriceMap::default();
        for symbol in symbols {
            if !prices.contains_key(symbol) {
                let quote = self.get_price(symbol);
                prices.insert(symbol.clone(), quote);
            }
        }
        prices
    }
}

impl<P: PriceSource + ?Sized> PriceSource for Box<P> {
    fn get_price(&self, symbol: &Symbol) -> PriceQuote {
        (**self).get_price(symbol)
    }

    fn get_prices(&self, symbols: &[Symbol]) -> PriceMap {
        (**self).get_prices(symbols)
    }
}
