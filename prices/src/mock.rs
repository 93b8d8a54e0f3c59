//! Mock price feed for testing: implements [`PriceFeed`] with configurable behavior.
//!
//! Use this in tests to simulate provider responses without network calls.
//!
//! ```
//! use driftbook::{PriceQuote, Symbol};
//! use driftbook_prices::mock::MockFeed;
//! use driftbook_prices::{PriceError, PriceFeed};
//!
//! let feed = MockFeed::builder()
//!     .with_price(Symbol::new("VTI"), 231.17)
//!     .fail_times(Symbol::new("BND"), 1, PriceError::RateLimit)
//!     .build();
//!
//! assert_eq!(feed.latest_price(&Symbol::new("VTI")), Ok(PriceQuote::Available(231.17)));
//! assert_eq!(feed.latest_price(&Symbol::new("BND")), Err(PriceError::RateLimit));
//! assert_eq!(feed.latest_price(&Symbol::new("BND")), Ok(PriceQuote::Unavailable));
//! ```

use std::collections::VecDeque;
use std::sync::Mutex;

use driftbook::{PriceQuote, Symbol};
use rustc_hash::FxHashMap;

use crate::PriceFeed;
use crate::error::PriceError;

/// Builder for `MockFeed`.
#[derive(Default)]
pub struct MockFeedBuilder {
    prices: FxHashMap<Symbol, f64>,
    scripted: FxHashMap<Symbol, VecDeque<PriceError>>,
    permanent: FxHashMap<Symbol, PriceError>,
}

impl MockFeedBuilder {
    /// Answer `price` for `symbol`. Zero or negative prices read as unavailable.
    pub fn with_price(mut self, symbol: Symbol, price: f64) -> Self {
        self.prices.insert(symbol, price);
        self
    }

    /// Fail the next `times` lookups of `symbol` with `error`, then answer normally.
    pub fn fail_times(mut self, symbol: Symbol, times: usize, error: PriceError) -> Self {
        let queue = self.scripted.entry(symbol).or_default();
        queue.extend(std::iter::repeat_n(error, times));
        self
    }

    /// Fail every lookup of `symbol` with `error`.
    pub fn always_fail(mut self, symbol: Symbol, error: PriceError) -> Self {
        self.permanent.insert(symbol, error);
        self
    }

    pub fn build(self) -> MockFeed {
        MockFeed {
            prices: Mutex::new(self.prices),
            scripted: Mutex::new(self.scripted),
            permanent: self.permanent,
            calls: Mutex::new(Vec::new()),
        }
    }
}

/// A mock feed that records every lookup and returns configured responses.
///
/// Symbols with no configured price answer `Ok(Unavailable)`.
pub struct MockFeed {
    prices: Mutex<FxHashMap<Symbol, f64>>,
    scripted: Mutex<FxHashMap<Symbol, VecDeque<PriceError>>>,
    permanent: FxHashMap<Symbol, PriceError>,
    calls: Mutex<Vec<Symbol>>,
}

impl MockFeed {
    pub fn builder() -> MockFeedBuilder {
        MockFeedBuilder::default()
    }

    /// Change the price answered for `symbol` (e.g. to observe cache expiry).
    pub fn set_price(&self, symbol: Symbol, price: f64) {
        self.prices.lock().unwrap().insert(symbol, price);
    }

    /// Every symbol looked up, in call order (for assertion in tests).
    pub fn calls(&self) -> Vec<Symbol> {
        self.calls.lock().unwrap().clone()
    }

    /// Number of lookups of one symbol.
    pub fn call_count(&self, symbol: &Symbol) -> usize {
        self.calls.lock().unwrap().iter().filter(|s| *s == symbol).count()
    }
}

impl PriceFeed for MockFeed {
    fn name(&self) -> &str {
        "mock"
    }

    fn latest_price(&self, symbol: &Symbol) -> Result<PriceQuote, PriceError> {
        self.calls.lock().unwrap().push(symbol.clone());

        if let Some(error) = self.permanent.get(symbol) {
            return Err(error.clone());
        }
        if let Some(error) = self
            .scripted
            .lock()
            .unwrap()
            .get_mut(symbol)
            .and_then(|q| q.pop_front())
        {
            return Err(error);
        }

        let price = self.prices.lock().unwrap().get(symbol).copied();
        Ok(PriceQuote::from_option(price))
    }
}
