//! ResilientSource behavior against a mock feed: retries, caching, fallbacks.
//! No network, no real sleeping.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use driftbook::{PriceQuote, Symbol};
use driftbook_prices::mock::MockFeed;
use driftbook_prices::{
    ManualClock, PriceCache, PriceError, PriceSource, ResilientSource, RetryPolicy, Sleeper,
};

/// Records requested delays instead of sleeping.
#[derive(Clone, Default)]
struct RecordingSleeper(Arc<Mutex<Vec<Duration>>>);

impl RecordingSleeper {
    fn delays(&self) -> Vec<Duration> {
        self.0.lock().unwrap().clone()
    }
}

impl Sleeper for RecordingSleeper {
    fn sleep(&self, duration: Duration) {
        self.0.lock().unwrap().push(duration);
    }
}

fn sym(s: &str) -> Symbol {
    Symbol::new(s)
}

fn policy() -> RetryPolicy {
    RetryPolicy {
        max_attempts: 3,
        initial_backoff: Duration::from_millis(100),
        multiplier: 2.0,
        max_backoff: Duration::from_secs(1),
    }
}

struct Harness {
    source: ResilientSource<MockFeed>,
    clock: Arc<ManualClock>,
    sleeper: RecordingSleeper,
}

fn harness(feed: MockFeed, ttl: Duration, max_entries: usize) -> Harness {
    let clock = Arc::new(ManualClock::new());
    let cache = Arc::new(PriceCache::with_clock(ttl, max_entries, clock.clone()));
    let sleeper = RecordingSleeper::default();
    let source = ResilientSource::new(feed, policy(), cache).with_sleeper(sleeper.clone());
    Harness {
        source,
        clock,
        sleeper,
    }
}

// ============================================================================
// Retry
// ============================================================================

#[test]
fn transient_failures_are_retried_with_backoff() {
    let feed = MockFeed::builder()
        .with_price(sym("VTI"), 231.0)
        .fail_times(sym("VTI"), 2, PriceError::Connection("reset".into()))
        .build();
    let h = harness(feed, Duration::from_secs(60), 16);

    assert_eq!(h.source.get_price(&sym("VTI")), PriceQuote::Available(231.0));
    assert_eq!(h.source.feed().call_count(&sym("VTI")), 3);
    assert_eq!(
        h.sleeper.delays(),
        vec![Duration::from_millis(100), Duration::from_millis(200)]
    );
}

#[test]
fn retries_stop_at_max_attempts() {
    let feed = MockFeed::builder()
        .always_fail(sym("VTI"), PriceError::RateLimit)
        .build();
    let h = harness(feed, Duration::from_secs(60), 16);

    assert_eq!(h.source.get_price(&sym("VTI")), PriceQuote::Unavailable);
    assert_eq!(h.source.feed().call_count(&sym("VTI")), 3);
    assert_eq!(h.sleeper.delays().len(), 2);
}

#[test]
fn non_retryable_error_is_not_retried() {
    let feed = MockFeed::builder()
        .always_fail(sym("???"), PriceError::InvalidSymbol("???".into()))
        .build();
    let h = harness(feed, Duration::from_secs(60), 16);

    assert_eq!(h.source.get_price(&sym("???")), PriceQuote::Unavailable);
    assert_eq!(h.source.feed().call_count(&sym("???")), 1);
    assert!(h.sleeper.delays().is_empty());
}

#[test]
fn failed_lookup_is_not_cached() {
    let feed = MockFeed::builder()
        .with_price(sym("VTI"), 231.0)
        .fail_times(sym("VTI"), 3, PriceError::Timeout("slow".into()))
        .build();
    let h = harness(feed, Duration::from_secs(60), 16);

    assert_eq!(h.source.get_price(&sym("VTI")), PriceQuote::Unavailable);
    // Scripted failures are spent; the next call reaches the price
    assert_eq!(h.source.get_price(&sym("VTI")), PriceQuote::Available(231.0));
}

// ============================================================================
// Cache
// ============================================================================

#[test]
fn cache_hit_within_ttl_avoids_feed() {
    let feed = MockFeed::builder().with_price(sym("VTI"), 231.0).build();
    let h = harness(feed, Duration::from_secs(60), 16);

    h.source.get_price(&sym("VTI"));
    h.clock.advance(Duration::from_secs(30));
    h.source.feed().set_price(sym("VTI"), 240.0);

    assert_eq!(h.source.get_price(&sym("VTI")), PriceQuote::Available(231.0));
    assert_eq!(h.source.feed().call_count(&sym("VTI")), 1);
}

#[test]
fn expired_entry_refetches() {
    let feed = MockFeed::builder().with_price(sym("VTI"), 231.0).build();
    let h = harness(feed, Duration::from_secs(60), 16);

    h.source.get_price(&sym("VTI"));
    h.clock.advance(Duration::from_secs(61));
    h.source.feed().set_price(sym("VTI"), 240.0);

    assert_eq!(h.source.get_price(&sym("VTI")), PriceQuote::Available(240.0));
    assert_eq!(h.source.feed().call_count(&sym("VTI")), 2);
}

#[test]
fn bounded_cache_evicts_oldest() {
    let feed = MockFeed::builder()
        .with_price(sym("A"), 1.0)
        .with_price(sym("B"), 2.0)
        .with_price(sym("C"), 3.0)
        .build();
    let h = harness(feed, Duration::from_secs(600), 2);

    h.source.get_price(&sym("A"));
    h.clock.advance(Duration::from_secs(1));
    h.source.get_price(&sym("B"));
    h.clock.advance(Duration::from_secs(1));
    h.source.get_price(&sym("C"));
    assert_eq!(h.source.cache().len(), 2);

    // B and C are cached, A was evicted
    h.source.get_price(&sym("B"));
    h.source.get_price(&sym("C"));
    h.source.get_price(&sym("A"));
    assert_eq!(h.source.feed().call_count(&sym("A")), 2);
    assert_eq!(h.source.feed().call_count(&sym("B")), 1);
    assert_eq!(h.source.feed().call_count(&sym("C")), 1);
}

#[test]
fn shared_cache_serves_both_sources() {
    let clock = Arc::new(ManualClock::new());
    let cache = Arc::new(PriceCache::with_clock(Duration::from_secs(60), 16, clock));

    let first = ResilientSource::new(
        MockFeed::builder().with_price(sym("VTI"), 231.0).build(),
        policy(),
        cache.clone(),
    );
    let second = ResilientSource::new(MockFeed::builder().build(), policy(), cache);

    first.get_price(&sym("VTI"));
    assert_eq!(second.get_price(&sym("VTI")), PriceQuote::Available(231.0));
    assert!(second.feed().calls().is_empty());
}

// ============================================================================
// Batch lookups
// ============================================================================

#[test]
fn get_prices_collapses_duplicates() {
    let feed = MockFeed::builder()
        .with_price(sym("VTI"), 231.0)
        .with_price(sym("BND"), 72.4)
        .build();
    let h = harness(feed, Duration::ZERO, 0);

    let prices = h
        .source
        .get_prices(&[sym("VTI"), sym("BND"), sym("VTI"), sym("GONE")]);

    assert_eq!(prices.len(), 3);
    assert_eq!(prices[&sym("VTI")], PriceQuote::Available(231.0));
    assert_eq!(prices[&sym("BND")], PriceQuote::Available(72.4));
    assert_eq!(prices[&sym("GONE")], PriceQuote::Unavailable);
    assert_eq!(h.source.feed().call_count(&sym("VTI")), 1);
}

#[test]
fn one_failing_symbol_does_not_affect_others() {
    let feed = MockFeed::builder()
        .with_price(sym("VTI"), 231.0)
        .always_fail(sym("BND"), PriceError::Connection("down".into()))
        .build();
    let h = harness(feed, Duration::from_secs(60), 16);

    let prices = h.source.get_prices(&[sym("VTI"), sym("BND")]);
    assert_eq!(prices[&sym("VTI")], PriceQuote::Available(231.0));
    assert_eq!(prices[&sym("BND")], PriceQuote::Unavailable);
}
