//! Never-failing price source built from a feed, a retry policy and a cache.

use std::sync::Arc;

use driftbook::{PriceQuote, Symbol};
use log::{debug, warn};

use crate::cache::PriceCache;
use crate::retry::{RetryPolicy, Sleeper, ThreadSleeper};
use crate::{PriceFeed, PriceSource};

/// Wraps a [`PriceFeed`] so lookups are cached, retried, and never fail.
///
/// Lookup order for one symbol:
///
/// 1. A fresh cache entry is returned without touching the feed.
/// 2. Otherwise the feed is called under the retry policy.
/// 3. A usable price is cached and returned. `Unavailable` is returned as-is
///    and not cached.
/// 4. If every attempt fails, a warning is logged and `Unavailable` returned.
pub struct ResilientSource<F> {
    feed: F,
    policy: RetryPolicy,
    cache: Arc<PriceCache>,
    sleeper: Box<dyn Sleeper>,
}

impl<F: PriceFeed> ResilientSource<F> {
    pub fn new(feed: F, policy: RetryPolicy, cache: Arc<PriceCache>) -> Self {
        Self {
            feed,
            policy,
            cache,
            sleeper: Box::new(ThreadSleeper),
        }
    }

    /// Replace how the source waits between attempts.
    pub fn with_sleeper(mut self, sleeper: impl Sleeper + 'static) -> Self {
        self.sleeper = Box::new(sleeper);
        self
    }

    pub fn feed(&self) -> &F {
        &self.feed
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    pub fn cache(&self) -> &PriceCache {
        &self.cache
    }
}

impl<F: PriceFeed> PriceSource for ResilientSource<F> {
    fn get_price(&self, symbol: &Symbol) -> PriceQuote {
        if let Some(price) = self.cache.get(symbol) {
            debug!("Cache hit for {symbol}: {price}");
            return PriceQuote::Available(price);
        }

        let result = self
            .policy
            .run(self.sleeper.as_ref(), |_| self.feed.latest_price(symbol));

        match result {
            Ok(quote) => match quote.price() {
                Some(price) => {
                    self.cache.insert(symbol.clone(), price);
                    PriceQuote::Available(price)
                }
                None => {
                    debug!("{} has no price for {symbol}", self.feed.name());
                    PriceQuote::Unavailable
                }
            },
            Err(e) => {
                warn!("{} price lookup for {symbol} failed: {e}", self.feed.name());
                PriceQuote::Unavailable
            }
        }
    }
}
