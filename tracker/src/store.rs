//! Holdings store: users, assets, portfolios and their items.
//!
//! [`StoreState`] holds the records and enforces ownership and uniqueness.
//! [`MemoryStore`] guards one state with a mutex; [`FileStore`] does the same
//! and persists the state as JSON after every successful mutation.
//!
//! Portfolio items reference assets by id. Reads hydrate them into
//! [`Portfolio`] values carrying full [`Asset`] records.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use driftbook::{
    AllocatedItem, Asset, AssetId, ItemId, NewAsset, NewPortfolio, Portfolio, PortfolioId,
    PortfolioItem, PortfolioSummary, Symbol, User, UserId, validate_quantity,
};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Outcome of registering an asset.
///
/// Registering a symbol that already exists is not an error: the existing
/// record is returned instead.
#[derive(Clone, Debug, PartialEq)]
pub enum Registration {
    Created(Asset),
    Existing(Asset),
}

impl Registration {
    pub fn asset(&self) -> &Asset {
        match self {
            Registration::Created(a) | Registration::Existing(a) => a,
        }
    }

    pub fn into_asset(self) -> Asset {
        match self {
            Registration::Created(a) | Registration::Existing(a) => a,
        }
    }

    pub fn is_created(&self) -> bool {
        matches!(self, Registration::Created(_))
    }
}

/// Persistence for users, assets and portfolios.
///
/// Portfolio operations take the requesting owner; a portfolio that exists
/// but belongs to someone else is reported as not found.
pub trait HoldingsStore {
    /// Create a user. Emails are unique, compared case-insensitively.
    fn insert_user(&self, email: &str) -> Result<User>;

    fn user(&self, id: UserId) -> Result<User>;

    /// Delete a user and every portfolio they own.
    fn delete_user(&self, id: UserId) -> Result<()>;

    /// Register an asset, or return the existing one with the same symbol.
    fn insert_asset(&self, asset: NewAsset) -> Result<Registration>;

    fn asset(&self, id: AssetId) -> Result<Asset>;

    fn asset_by_symbol(&self, symbol: &Symbol) -> Result<Option<Asset>>;

    /// All assets in registration order.
    fn assets(&self) -> Result<Vec<Asset>>;

    /// Up to `limit` assets whose symbol or name contains `query`, ignoring
    /// case, in registration order.
    fn search_assets(&self, query: &str, limit: usize) -> Result<Vec<Asset>>;

    /// Create a portfolio with its items. Nothing is written unless every
    /// referenced user and asset exists.
    fn insert_portfolio(
        &self,
        owner: UserId,
        draft: &NewPortfolio,
        items: &[AllocatedItem],
    ) -> Result<Portfolio>;

    fn load_portfolio(&self, id: PortfolioId, owner: UserId) -> Result<Portfolio>;

    /// The owner's portfolios in creation order.
    fn list_portfolios(&self, owner: UserId) -> Result<Vec<PortfolioSummary>>;

    /// Set one item's current quantity and return the updated portfolio.
    fn save_quantity(
        &self,
        portfolio_id: PortfolioId,
        item_id: ItemId,
        owner: UserId,
        quantity: f64,
    ) -> Result<Portfolio>;

    /// Delete a portfolio and its items.
    fn delete_portfolio(&self, id: PortfolioId, owner: UserId) -> Result<()>;
}

// ============================================================================
// Records
// ============================================================================

#[derive(Clone, Debug, Serialize, Deserialize)]
struct PortfolioRecord {
    id: PortfolioId,
    owner: UserId,
    name: String,
    description: Option<String>,
    initial_invest_amount: f64,
    created_at: DateTime<Utc>,
    items: Vec<ItemRecord>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
struct ItemRecord {
    id: ItemId,
    asset_id: AssetId,
    target_weight: f64,
    tolerance: f64,
    entry_price: f64,
    initial_quantity: f64,
    current_quantity: f64,
    created_at: DateTime<Utc>,
}

/// Every record a store holds, plus id counters.
///
/// Counters only grow, so ids are never reused after a delete.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct StoreState {
    next_user_id: u64,
    next_asset_id: u64,
    next_portfolio_id: u64,
    next_item_id: u64,
    users: BTreeMap<UserId, User>,
    assets: BTreeMap<AssetId, Asset>,
    portfolios: BTreeMap<PortfolioId, PortfolioRecord>,
}

fn next_id(counter: &mut u64) -> u64 {
    *counter += 1;
    *counter
}

fn normalize_email(email: &str) -> Result<String> {
    let email = email.trim().to_lowercase();
    let valid = match email.split_once('@') {
        Some((local, domain)) => !local.is_empty() && domain.contains('.') && !domain.contains('@'),
        None => false,
    };
    if !valid {
        return Err(Error::InvalidEmail(email));
    }
    Ok(email)
}

impl StoreState {
    fn insert_user(&mut self, email: &str) -> Result<User> {
        let email = normalize_email(email)?;
        if self.users.values().any(|u| u.email == email) {
            return Err(Error::DuplicateUser(email));
        }
        let user = User {
            id: UserId(next_id(&mut self.next_user_id)),
            email,
            created_at: Utc::now(),
        };
        self.users.insert(user.id, user.clone());
        Ok(user)
    }

    fn user(&self, id: UserId) -> Result<User> {
        self.users
            .get(&id)
            .cloned()
            .ok_or_else(|| Error::not_found("user", id))
    }

    fn delete_user(&mut self, id: UserId) -> Result<()> {
        if self.users.remove(&id).is_none() {
            return Err(Error::not_found("user", id));
        }
        let before = self.portfolios.len();
        self.portfolios.retain(|_, p| p.owner != id);
        debug!("Deleted user {id} and {} portfolios", before - self.portfolios.len());
        Ok(())
    }

    fn insert_asset(&mut self, asset: NewAsset) -> Result<Registration> {
        asset.validate()?;
        if let Some(existing) = self.asset_by_symbol(&asset.symbol) {
            return Ok(Registration::Existing(existing));
        }
        let id = AssetId(next_id(&mut self.next_asset_id));
        let asset = asset.into_asset(id, Utc::now());
        self.assets.insert(id, asset.clone());
        Ok(Registration::Created(asset))
    }

    fn asset(&self, id: AssetId) -> Result<Asset> {
        self.assets
            .get(&id)
            .cloned()
            .ok_or_else(|| Error::not_found("asset", id))
    }

    fn asset_by_symbol(&self, symbol: &Symbol) -> Option<Asset> {
        self.assets.values().find(|a| &a.symbol == symbol).cloned()
    }

    fn search_assets(&self, query: &str, limit: usize) -> Vec<Asset> {
        let needle = query.trim().to_lowercase();
        self.assets
            .values()
            .filter(|a| {
                a.symbol.as_str().to_lowercase().contains(&needle)
                    || a.name.to_lowercase().contains(&needle)
            })
            .take(limit)
            .cloned()
            .collect()
    }

    fn insert_portfolio(
        &mut self,
        owner: UserId,
        draft: &NewPortfolio,
        items: &[AllocatedItem],
    ) -> Result<Portfolio> {
        self.user(owner)?;
        if items.is_empty() {
            return Err(driftbook::ValidationError::NoItems.into());
        }
        for item in items {
            self.asset(item.asset_id)?;
        }

        let id = PortfolioId(next_id(&mut self.next_portfolio_id));
        let created_at = Utc::now();
        let records = items
            .iter()
            .map(|item| ItemRecord {
                id: ItemId(next_id(&mut self.next_item_id)),
                asset_id: item.asset_id,
                target_weight: item.target_weight,
                tolerance: item.tolerance,
                entry_price: item.entry_price,
                initial_quantity: item.initial_quantity,
                current_quantity: item.current_quantity,
                created_at,
            })
            .collect();

        self.portfolios.insert(
            id,
            PortfolioRecord {
                id,
                owner,
                name: draft.name.trim().to_string(),
                description: draft.description.clone(),
                initial_invest_amount: draft.initial_invest_amount,
                created_at,
                items: records,
            },
        );
        self.load_portfolio(id, owner)
    }

    fn record(&self, id: PortfolioId, owner: UserId) -> Result<&PortfolioRecord> {
        self.portfolios
            .get(&id)
            .filter(|p| p.owner == owner)
            .ok_or_else(|| Error::not_found("portfolio", id))
    }

    fn hydrate(&self, record: &PortfolioRecord) -> Result<Portfolio> {
        let items = record
            .items
            .iter()
            .map(|item| {
                let asset = self.asset(item.asset_id)?;
                Ok(PortfolioItem::new(
                    item.id,
                    record.id,
                    asset,
                    item.target_weight,
                    item.tolerance,
                    item.entry_price,
                    item.initial_quantity,
                    item.current_quantity,
                    item.created_at,
                ))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Portfolio {
            id: record.id,
            owner: record.owner,
            name: record.name.clone(),
            description: record.description.clone(),
            initial_invest_amount: record.initial_invest_amount,
            created_at: record.created_at,
            items,
        })
    }

    fn load_portfolio(&self, id: PortfolioId, owner: UserId) -> Result<Portfolio> {
        let record = self.record(id, owner)?;
        self.hydrate(record)
    }

    fn list_portfolios(&self, owner: UserId) -> Result<Vec<PortfolioSummary>> {
        self.user(owner)?;
        Ok(self
            .portfolios
            .values()
            .filter(|p| p.owner == owner)
            .map(|p| PortfolioSummary {
                id: p.id,
                owner: p.owner,
                name: p.name.clone(),
                description: p.description.clone(),
                initial_invest_amount: p.initial_invest_amount,
                created_at: p.created_at,
            })
            .collect())
    }

    fn save_quantity(
        &mut self,
        portfolio_id: PortfolioId,
        item_id: ItemId,
        owner: UserId,
        quantity: f64,
    ) -> Result<Portfolio> {
        validate_quantity(quantity)?;
        self.record(portfolio_id, owner)?;
        let item = self
            .portfolios
            .get_mut(&portfolio_id)
            .and_then(|p| p.items.iter_mut().find(|i| i.id == item_id))
            .ok_or_else(|| Error::not_found("item", item_id))?;
        item.current_quantity = quantity;
        self.load_portfolio(portfolio_id, owner)
    }

    fn delete_portfolio(&mut self, id: PortfolioId, owner: UserId) -> Result<()> {
        self.record(id, owner)?;
        self.portfolios.remove(&id);
        Ok(())
    }

    /// Check references after loading from disk.
    fn check_integrity(&self) -> std::result::Result<(), String> {
        for p in self.portfolios.values() {
            if !self.users.contains_key(&p.owner) {
                return Err(format!("portfolio {} has unknown owner {}", p.id, p.owner));
            }
            for item in &p.items {
                if !self.assets.contains_key(&item.asset_id) {
                    return Err(format!("item {} has unknown asset {}", item.id, item.asset_id));
                }
                let positive = |x: f64| x.is_finite() && x > 0.0;
                if !positive(item.entry_price)
                    || !positive(item.initial_quantity)
                    || validate_quantity(item.current_quantity).is_err()
                {
                    return Err(format!("item {} has invalid price or quantity", item.id));
                }
            }
        }
        Ok(())
    }
}

// ============================================================================
// MemoryStore
// ============================================================================

/// In-memory store. State is lost when the process exits.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<StoreState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn from_state(state: StoreState) -> Self {
        Self {
            state: Mutex::new(state),
        }
    }

    /// Lock the state, recovering from poison. Every mutation validates before
    /// writing, so a panic cannot leave a half-applied change behind.
    fn lock(&self) -> MutexGuard<'_, StoreState> {
        self.state.lock().unwrap_or_else(|poisoned| {
            warn!("Store mutex was poisoned, recovering");
            poisoned.into_inner()
        })
    }

    fn read<T>(&self, f: impl FnOnce(&StoreState) -> Result<T>) -> Result<T> {
        f(&self.lock())
    }

    fn write<T>(&self, f: impl FnOnce(&mut StoreState) -> Result<T>) -> Result<T> {
        f(&mut self.lock())
    }
}

macro_rules! delegate_store {
    ($ty:ty) => {
        impl HoldingsStore for $ty {
            fn insert_user(&self, email: &str) -> Result<User> {
                self.write(|s| s.insert_user(email))
            }

            fn user(&self, id: UserId) -> Result<User> {
                self.read(|s| s.user(id))
            }

            fn delete_user(&self, id: UserId) -> Result<()> {
                self.write(|s| s.delete_user(id))
            }

            fn insert_asset(&self, asset: NewAsset) -> Result<Registration> {
                self.write(|s| s.insert_asset(asset))
            }

            fn asset(&self, id: AssetId) -> Result<Asset> {
                self.read(|s| s.asset(id))
            }

            fn asset_by_symbol(&self, symbol: &Symbol) -> Result<Option<Asset>> {
                self.read(|s| Ok(s.asset_by_symbol(symbol)))
            }

            fn assets(&self) -> Result<Vec<Asset>> {
                self.read(|s| Ok(s.assets.values().cloned().collect()))
            }

            fn search_assets(&self, query: &str, limit: usize) -> Result<Vec<Asset>> {
                self.read(|s| Ok(s.search_assets(query, limit)))
            }

            fn insert_portfolio(
                &self,
                owner: UserId,
                draft: &NewPortfolio,
                items: &[AllocatedItem],
            ) -> Result<Portfolio> {
                self.write(|s| s.insert_portfolio(owner, draft, items))
            }

            fn load_portfolio(&self, id: PortfolioId, owner: UserId) -> Result<Portfolio> {
                self.read(|s| s.load_portfolio(id, owner))
            }

            fn list_portfolios(&self, owner: UserId) -> Result<Vec<PortfolioSummary>> {
                self.read(|s| s.list_portfolios(owner))
            }

            fn save_quantity(
                &self,
                portfolio_id: PortfolioId,
                item_id: ItemId,
                owner: UserId,
                quantity: f64,
            ) -> Result<Portfolio> {
                self.write(|s| s.save_quantity(portfolio_id, item_id, owner, quantity))
            }

            fn delete_portfolio(&self, id: PortfolioId, owner: UserId) -> Result<()> {
                self.write(|s| s.delete_portfolio(id, owner))
            }
        }
    };
}

delegate_store!(MemoryStore);
delegate_store!(FileStore);

// ============================================================================
// FileStore
// ============================================================================

/// JSON-file-backed store.
///
/// Mutations run against a copy of the state; the copy is written to disk
/// and only then replaces the in-memory state. A failed write leaves both
/// the file and the in-memory state unchanged.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    inner: MemoryStore,
}

impl FileStore {
    /// Open the store at `path`, starting empty if the file does not exist.
    pub fn open(path: &Path) -> Result<Self> {
        let state = if path.exists() {
            let contents = fs::read_to_string(path).map_err(|e| Error::StoreRead {
                path: path.to_path_buf(),
                source: e,
            })?;
            let state: StoreState =
                serde_json::from_str(&contents).map_err(|e| Error::StoreCorrupt {
                    path: path.to_path_buf(),
                    reason: e.to_string(),
                })?;
            state.check_integrity().map_err(|reason| Error::StoreCorrupt {
                path: path.to_path_buf(),
                reason,
            })?;
            info!(
                "Loaded store {}: {} users, {} assets, {} portfolios",
                path.display(),
                state.users.len(),
                state.assets.len(),
                state.portfolios.len()
            );
            state
        } else {
            info!("Store {} does not exist yet, starting empty", path.display());
            StoreState::default()
        };

        Ok(Self {
            path: path.to_path_buf(),
            inner: MemoryStore::from_state(state),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read<T>(&self, f: impl FnOnce(&StoreState) -> Result<T>) -> Result<T> {
        self.inner.read(f)
    }

    fn write<T>(&self, f: impl FnOnce(&mut StoreState) -> Result<T>) -> Result<T> {
        let mut state = self.inner.lock();
        let mut next = state.clone();
        let out = f(&mut next)?;
        save_state(&self.path, &next)?;
        *state = next;
        Ok(out)
    }
}

/// Write the state to a sibling temp file, then rename it over `path`.
fn save_state(path: &Path, state: &StoreState) -> Result<()> {
    let write_err = |e| Error::StoreWrite {
        path: path.to_path_buf(),
        source: e,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(write_err)?;
    }

    let json = serde_json::to_string_pretty(state)
        .map_err(|e| write_err(std::io::Error::new(std::io::ErrorKind::InvalidData, e)))?;

    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    fs::write(&tmp, json).map_err(write_err)?;
    fs::rename(&tmp, path).map_err(write_err)?;
    debug!("Saved store {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use driftbook::{NewItem, allocate};

    use super::*;

    fn seeded(store: &impl HoldingsStore) -> (User, Asset, Asset) {
        let user = store.insert_user("ada@example.com").unwrap();
        let vti = store
            .insert_asset(NewAsset::new(Symbol::new("VTI"), "Total Stock"))
            .unwrap()
            .into_asset();
        let bnd = store
            .insert_asset(NewAsset::new(Symbol::new("BND"), "Total Bond"))
            .unwrap()
            .into_asset();
        (user, vti, bnd)
    }

    fn balanced(store: &impl HoldingsStore, owner: UserId, vti: &Asset, bnd: &Asset) -> Portfolio {
        let draft = NewPortfolio::new("Balanced", 1_000.0)
            .item(NewItem::new(vti.id, 60.0))
            .item(NewItem::new(bnd.id, 40.0));
        let items = vec![
            allocate(1_000.0, &draft.items[0], 100.0).unwrap(),
            allocate(1_000.0, &draft.items[1], 50.0).unwrap(),
        ];
        store.insert_portfolio(owner, &draft, &items).unwrap()
    }

    #[test]
    fn users_are_unique_by_email() {
        let store = MemoryStore::new();
        let user = store.insert_user(" Ada@Example.com ").unwrap();
        assert_eq!(user.email, "ada@example.com");
        assert_eq!(user.id, UserId(1));
        assert!(matches!(
            store.insert_user("ada@example.com"),
            Err(Error::DuplicateUser(_))
        ));
        assert!(matches!(store.insert_user("nope"), Err(Error::InvalidEmail(_))));
    }

    #[test]
    fn duplicate_symbol_returns_existing() {
        let store = MemoryStore::new();
        let first = store
            .insert_asset(NewAsset::new(Symbol::new("VTI"), "Total Stock"))
            .unwrap();
        let second = store
            .insert_asset(NewAsset::new(Symbol::new("vti"), "Another name"))
            .unwrap();
        assert!(first.is_created());
        assert!(!second.is_created());
        assert_eq!(first.asset(), second.asset());
        assert_eq!(store.assets().unwrap().len(), 1);
    }

    #[test]
    fn search_matches_symbol_or_name_ignoring_case() {
        let store = MemoryStore::new();
        seeded(&store);
        store
            .insert_asset(NewAsset::new(Symbol::new("BNDX"), "Intl Bond"))
            .unwrap();

        let symbols = |query: &str, limit: usize| -> Vec<String> {
            store
                .search_assets(query, limit)
                .unwrap()
                .into_iter()
                .map(|a| a.symbol.as_str().to_string())
                .collect()
        };

        assert_eq!(symbols("vt", 10), ["VTI"]);
        assert_eq!(symbols("BOND", 10), ["BND", "BNDX"]);
        assert_eq!(symbols(" total ", 10), ["VTI", "BND"]);
        assert_eq!(symbols("bnd", 1), ["BND"]);
        assert!(symbols("gold", 10).is_empty());
    }

    #[test]
    fn portfolio_round_trip() {
        let store = MemoryStore::new();
        let (user, vti, bnd) = seeded(&store);
        let p = balanced(&store, user.id, &vti, &bnd);

        assert_eq!(p.items.len(), 2);
        assert_eq!(p.items[0].asset.symbol.as_str(), "VTI");
        assert_eq!(p.items[0].initial_quantity, 6.0);
        assert_eq!(p.items[1].current_quantity(), 8.0);
        assert_eq!(store.load_portfolio(p.id, user.id).unwrap(), p);
        assert_eq!(store.list_portfolios(user.id).unwrap(), vec![p.summary()]);
    }

    #[test]
    fn foreign_owner_sees_not_found() {
        let store = MemoryStore::new();
        let (user, vti, bnd) = seeded(&store);
        let other = store.insert_user("bob@example.com").unwrap();
        let p = balanced(&store, user.id, &vti, &bnd);

        assert!(store.load_portfolio(p.id, other.id).unwrap_err().is_not_found());
        assert!(store
            .save_quantity(p.id, p.items[0].id, other.id, 1.0)
            .unwrap_err()
            .is_not_found());
        assert!(store.delete_portfolio(p.id, other.id).unwrap_err().is_not_found());
        assert!(store.list_portfolios(other.id).unwrap().is_empty());
    }

    #[test]
    fn insert_portfolio_with_unknown_asset_writes_nothing() {
        let store = MemoryStore::new();
        let (user, vti, _) = seeded(&store);
        let draft = NewPortfolio::new("Bad", 100.0)
            .item(NewItem::new(vti.id, 50.0))
            .item(NewItem::new(AssetId(99), 50.0));
        let items = vec![
            allocate(100.0, &draft.items[0], 10.0).unwrap(),
            allocate(100.0, &draft.items[1], 10.0).unwrap(),
        ];
        assert!(store.insert_portfolio(user.id, &draft, &items).unwrap_err().is_not_found());
        assert!(store.list_portfolios(user.id).unwrap().is_empty());
    }

    #[test]
    fn save_quantity_updates_one_item() {
        let store = MemoryStore::new();
        let (user, vti, bnd) = seeded(&store);
        let p = balanced(&store, user.id, &vti, &bnd);

        let updated = store.save_quantity(p.id, p.items[1].id, user.id, 0.0).unwrap();
        assert_eq!(updated.items[1].current_quantity(), 0.0);
        assert_eq!(updated.items[1].initial_quantity, 8.0);
        assert_eq!(updated.items[0].current_quantity(), 6.0);

        assert!(matches!(
            store.save_quantity(p.id, p.items[1].id, user.id, -1.0),
            Err(Error::Validation(_))
        ));
        assert!(store
            .save_quantity(p.id, ItemId(999), user.id, 1.0)
            .unwrap_err()
            .is_not_found());
    }

    #[test]
    fn delete_user_cascades() {
        let store = MemoryStore::new();
        let (user, vti, bnd) = seeded(&store);
        let p = balanced(&store, user.id, &vti, &bnd);

        store.delete_user(user.id).unwrap();
        assert!(store.user(user.id).unwrap_err().is_not_found());
        assert!(store.load_portfolio(p.id, user.id).unwrap_err().is_not_found());
        // Assets are shared and survive
        assert_eq!(store.assets().unwrap().len(), 2);
    }

    #[test]
    fn ids_are_not_reused() {
        let store = MemoryStore::new();
        let (user, vti, bnd) = seeded(&store);
        let first = balanced(&store, user.id, &vti, &bnd);
        store.delete_portfolio(first.id, user.id).unwrap();
        let second = balanced(&store, user.id, &vti, &bnd);
        assert!(second.id > first.id);
        assert!(second.items[0].id > first.items[1].id);
    }

    #[test]
    fn file_store_persists_across_opens() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("store.json");

        let (user, p) = {
            let store = FileStore::open(&path).unwrap();
            let (user, vti, bnd) = seeded(&store);
            let p = balanced(&store, user.id, &vti, &bnd);
            store.save_quantity(p.id, p.items[0].id, user.id, 7.5).unwrap();
            (user, p)
        };

        let reopened = FileStore::open(&path).unwrap();
        let loaded = reopened.load_portfolio(p.id, user.id).unwrap();
        assert_eq!(loaded.items[0].current_quantity(), 7.5);
        assert_eq!(loaded.items[0].entry_price, 100.0);

        // Counters survive too
        let bob = reopened.insert_user("bob@example.com").unwrap();
        assert_eq!(bob.id, UserId(2));
    }

    #[test]
    fn file_store_failed_mutation_leaves_file_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        let store = FileStore::open(&path).unwrap();
        seeded(&store);
        let before = fs::read_to_string(&path).unwrap();

        assert!(store.insert_user("ada@example.com").is_err());
        assert_eq!(fs::read_to_string(&path).unwrap(), before);
    }

    #[test]
    fn file_store_normalizes_hand_edited_symbols() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        seeded(&FileStore::open(&path).unwrap());

        let edited = fs::read_to_string(&path).unwrap().replace("\"VTI\"", "\" vti \"");
        fs::write(&path, edited).unwrap();

        let store = FileStore::open(&path).unwrap();
        let vti = store.asset_by_symbol(&Symbol::new("VTI")).unwrap().unwrap();
        assert_eq!(vti.symbol.as_str(), "VTI");

        let blanked = fs::read_to_string(&path).unwrap().replace("\"VTI\"", "\"  \"");
        fs::write(&path, blanked).unwrap();
        assert!(matches!(
            FileStore::open(&path),
            Err(Error::StoreCorrupt { .. })
        ));
    }

    #[test]
    fn file_store_rejects_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(matches!(
            FileStore::open(&path),
            Err(Error::StoreCorrupt { .. })
        ));
    }
}
