//! Bounded TTL cache of recent prices.
//!
//! The cache is an explicit object: callers build one, share it through an
//! `Arc`, and hand it to every [`ResilientSource`](crate::ResilientSource)
//! that should see the same prices. Time comes from an injected [`Clock`].

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use driftbook::Symbol;
use log::{debug, warn};
use rustc_hash::FxHashMap;

/// Default time a cached price stays fresh.
pub const DEFAULT_TTL: Duration = Duration::from_secs(60);

/// Default maximum number of cached symbols.
pub const DEFAULT_MAX_ENTRIES: usize = 1_024;

/// Source of monotonic time for expiry checks.
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

/// Wall-clock time.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    start: Instant,
    offset: Mutex<Duration>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
            offset: Mutex::new(Duration::ZERO),
        }
    }

    /// Move time forward.
    pub fn advance(&self, by: Duration) {
        let mut offset = self.offset.lock().unwrap_or_else(|p| p.into_inner());
        *offset += by;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        let offset = *self.offset.lock().unwrap_or_else(|p| p.into_inner());
        self.start + offset
    }
}

#[derive(Clone, Copy, Debug)]
struct CacheEntry {
    price: f64,
    stored_at: Instant,
}

/// Thread-safe price cache with per-entry TTL and a size bound.
///
/// When full, inserting a new symbol first drops expired entries and then,
/// if still full, evicts the entry stored longest ago.
pub struct PriceCache {
    entries: Mutex<FxHashMap<Symbol, CacheEntry>>,
    ttl: Duration,
    max_entries: usize,
    clock: Arc<dyn Clock>,
}

impl PriceCache {
    /// A cache on the system clock.
    pub fn new(ttl: Duration, max_entries: usize) -> Self {
        Self::with_clock(ttl, max_entries, Arc::new(SystemClock))
    }

    pub fn with_clock(ttl: Duration, max_entries: usize, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Mutex::new(FxHashMap::default()),
            ttl,
            max_entries,
            clock,
        }
    }

    /// A cache that never stores anything.
    pub fn disabled() -> Self {
        Self::new(Duration::ZERO, 0)
    }

    /// Lock the entries, recovering from poison. A poisoned cache only risks
    /// a stale or missing entry.
    fn lock_entries(&self) -> MutexGuard<'_, FxHashMap<Symbol, CacheEntry>> {
        self.entries.lock().unwrap_or_else(|poisoned| {
            warn!("Price cache mutex was poisoned, recovering");
            poisoned.into_inner()
        })
    }

    fn is_fresh(&self, entry: &CacheEntry, now: Instant) -> bool {
        now.saturating_duration_since(entry.stored_at) < self.ttl
    }

    /// Fresh cached price for `symbol`, if any. Expired entries are dropped.
    pub fn get(&self, symbol: &Symbol) -> Option<f64> {
        let now = self.clock.now();
        let mut entries = self.lock_entries();
        match entries.get(symbol) {
            Some(entry) if self.is_fresh(entry, now) => Some(entry.price),
            Some(_) => {
                entries.remove(symbol);
                debug!("Cache entry for {symbol} expired");
                None
            }
            None => None,
        }
    }

    /// Store a price. Non-positive and non-finite prices are ignored.
    pub fn insert(&self, symbol: Symbol, price: f64) {
        if self.max_entries == 0 || self.ttl.is_zero() || !(price.is_finite() && price > 0.0) {
            return;
        }
        let now = self.clock.now();
        let mut entries = self.lock_entries();

        if !entries.contains_key(&symbol) && entries.len() >= self.max_entries {
            entries.retain(|_, e| now.saturating_duration_since(e.stored_at) < self.ttl);
            if entries.len() >= self.max_entries {
                let oldest = entries
                    .iter()
                    .min_by_key(|(_, e)| e.stored_at)
                    .map(|(s, _)| s.clone());
                if let Some(oldest) = oldest {
                    debug!("Cache full, evicting {oldest}");
                    entries.remove(&oldest);
                }
            }
        }

        entries.insert(
            symbol,
            CacheEntry {
                price,
                stored_at: now,
            },
        );
    }

    /// Drop one symbol.
    pub fn invalidate(&self, symbol: &Symbol) {
        self.lock_entries().remove(symbol);
    }

    pub fn clear(&self) {
        self.lock_entries().clear();
    }

    /// Number of stored entries, fresh or not.
    pub fn len(&self) -> usize {
        self.lock_entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn max_entries(&self) -> usize {
        self.max_entries
    }
}

impl Default for PriceCache {
    fn default() -> Self {
        Self::new(DEFAULT_TTL, DEFAULT_MAX_ENTRIES)
    }
}

impl std::fmt::Debug for PriceCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PriceCache")
            .field("entries", &self.len())
            .field("ttl", &self.ttl)
            .field("max_entries", &self.max_entries)
            .finish()
    }
}
