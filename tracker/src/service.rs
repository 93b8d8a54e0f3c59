//! The tracker: store, price source and audit trail behind one API.

use driftbook::{
    AnalysisReport, Asset, AssetId, ItemId, NewAsset, NewPortfolio, Portfolio, PortfolioId,
    PortfolioSummary, Symbol, User, UserId, allocate, quote_for, validate_quantity,
};
use driftbook_prices::PriceSource;
use log::{debug, info, warn};

use crate::audit::{self, AuditLog};
use crate::error::{Error, Result};
use crate::request::PortfolioSpec;
use crate::store::{HoldingsStore, Registration};

/// Results returned by an asset search unless a limit is given.
pub const DEFAULT_SEARCH_LIMIT: usize = 10;

/// Largest accepted asset search limit.
pub const MAX_SEARCH_LIMIT: usize = 50;

/// Portfolio tracker over a holdings store and a price source.
///
/// Reads take `&self`. Mutations take `&mut self` because each one appends
/// to the audit trail, if one is attached.
pub struct Tracker<S, P> {
    store: S,
    prices: P,
    audit: Option<AuditLog>,
}

impl<S: HoldingsStore, P: PriceSource> Tracker<S, P> {
    pub fn new(store: S, prices: P) -> Self {
        Self {
            store,
            prices,
            audit: None,
        }
    }

    /// Append every committed mutation to `audit`.
    pub fn with_audit(mut self, audit: AuditLog) -> Self {
        self.audit = Some(audit);
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn prices(&self) -> &P {
        &self.prices
    }

    /// Write an audit event. The mutation has already been committed, so a
    /// failed write is logged rather than returned.
    fn record(&mut self, write: impl FnOnce(&mut AuditLog) -> Result<()>) {
        if let Some(log) = self.audit.as_mut() {
            if let Err(e) = write(log) {
                warn!("Failed to write audit event: {e}");
            }
        }
    }

    // === Users ===

    pub fn register_user(&mut self, email: &str) -> Result<User> {
        let user = self.store.insert_user(email)?;
        info!("Registered user {} <{}>", user.id, user.email);
        self.record(|log| audit::log_user_registered(log, &user));
        Ok(user)
    }

    pub fn user(&self, id: UserId) -> Result<User> {
        self.store.user(id)
    }

    /// Delete a user and all of their portfolios.
    pub fn delete_user(&mut self, id: UserId) -> Result<()> {
        self.store.delete_user(id)?;
        info!("Deleted user {id}");
        self.record(|log| audit::log_user_deleted(log, id));
        Ok(())
    }

    // === Assets ===

    /// Register an asset. A known symbol returns the existing record.
    pub fn register_asset(&mut self, asset: NewAsset) -> Result<Registration> {
        let registration = self.store.insert_asset(asset)?;
        match &registration {
            Registration::Created(asset) => {
                info!("Registered asset {} ({})", asset.symbol, asset.id);
                self.record(|log| audit::log_asset_registered(log, asset));
            }
            Registration::Existing(asset) => {
                debug!("Asset {} already registered as {}", asset.symbol, asset.id);
            }
        }
        Ok(registration)
    }

    pub fn asset(&self, id: AssetId) -> Result<Asset> {
        self.store.asset(id)
    }

    pub fn asset_by_symbol(&self, symbol: &Symbol) -> Result<Asset> {
        self.store
            .asset_by_symbol(symbol)?
            .ok_or_else(|| Error::not_found("asset", symbol))
    }

    pub fn assets(&self) -> Result<Vec<Asset>> {
        self.store.assets()
    }

    /// Registered assets whose symbol or name contains `query`, ignoring case.
    /// `limit` must be in `1..=MAX_SEARCH_LIMIT`.
    pub fn search_assets(&self, query: &str, limit: usize) -> Result<Vec<Asset>> {
        if query.trim().is_empty() {
            return Err(Error::Search("query is empty".into()));
        }
        if !(1..=MAX_SEARCH_LIMIT).contains(&limit) {
            return Err(Error::Search(format!(
                "limit must be between 1 and {MAX_SEARCH_LIMIT}, got {limit}"
            )));
        }
        let found = self.store.search_assets(query, limit)?;
        debug!("Search {query:?} matched {} assets", found.len());
        Ok(found)
    }

    /// Latest price for `symbol`. Unlike analysis, a missing quote is an error.
    pub fn asset_price(&self, symbol: &Symbol) -> Result<f64> {
        self.prices
            .get_price(symbol)
            .price()
            .ok_or_else(|| Error::PriceUnavailable(symbol.clone()))
    }

    // === Portfolios ===

    /// Create a portfolio, buying each item at its current price.
    ///
    /// Fails without writing anything if the owner or any asset is unknown,
    /// or if any asset has no price.
    pub fn create_portfolio(&mut self, owner: UserId, draft: &NewPortfolio) -> Result<Portfolio> {
        draft.validate()?;
        self.store.user(owner)?;

        let assets = draft
            .items
            .iter()
            .map(|item| self.store.asset(item.asset_id))
            .collect::<Result<Vec<_>>>()?;
        let symbols: Vec<Symbol> = assets.iter().map(|a| a.symbol.clone()).collect();
        let prices = self.prices.get_prices(&symbols);

        let mut allocated = Vec::with_capacity(draft.items.len());
        for (item, asset) in draft.items.iter().zip(&assets) {
            let entry_price = quote_for(&prices, &asset.symbol)
                .price()
                .ok_or_else(|| Error::PriceUnavailable(asset.symbol.clone()))?;
            allocated.push(allocate(draft.initial_invest_amount, item, entry_price)?);
        }

        let portfolio = self.store.insert_portfolio(owner, draft, &allocated)?;
        info!(
            "Created portfolio {} '{}' for {owner}: {} items, {:.2} invested",
            portfolio.id,
            portfolio.name,
            portfolio.items.len(),
            portfolio.initial_invest_amount
        );
        self.record(|log| audit::log_portfolio_created(log, &portfolio));
        Ok(portfolio)
    }

    /// Create a portfolio from a symbol-based spec, registering unknown symbols.
    ///
    /// Asset registration is idempotent, so assets registered here stay
    /// registered even if creation then fails for a missing price.
    pub fn create_from_spec(&mut self, owner: UserId, spec: &PortfolioSpec) -> Result<Portfolio> {
        self.store.user(owner)?;
        let mut ids = Vec::with_capacity(spec.items.len());
        for asset in spec.assets() {
            ids.push(self.register_asset(asset)?.asset().id);
        }
        self.create_portfolio(owner, &spec.request(&ids))
    }

    pub fn portfolio(&self, id: PortfolioId, owner: UserId) -> Result<Portfolio> {
        self.store.load_portfolio(id, owner)
    }

    pub fn list_portfolios(&self, owner: UserId) -> Result<Vec<PortfolioSummary>> {
        self.store.list_portfolios(owner)
    }

    /// Analyze a portfolio at current prices.
    ///
    /// Items without a quote are valued at their entry price; this never
    /// fails because of pricing.
    pub fn analyze(&self, id: PortfolioId, owner: UserId) -> Result<AnalysisReport> {
        let portfolio = self.store.load_portfolio(id, owner)?;
        let prices = self.prices.get_prices(&portfolio.symbols());
        let report = driftbook::analyze(&portfolio, &prices);

        let fallbacks = report.fallback_symbols();
        if !fallbacks.is_empty() {
            let list: Vec<&str> = fallbacks.iter().map(|s| s.as_str()).collect();
            warn!(
                "No quote for {} in {id}; valued at entry price",
                list.join(", ")
            );
        }
        debug!(
            "Analyzed {id}: value {:.2}, {} of {} items out of range",
            report.total_value,
            report.out_of_range().count(),
            report.items.len()
        );
        Ok(report)
    }

    /// Record the quantity actually held for one item.
    ///
    /// Target weights are not re-checked; drift shows up in analysis instead.
    pub fn update_quantity(
        &mut self,
        portfolio_id: PortfolioId,
        item_id: ItemId,
        owner: UserId,
        quantity: f64,
    ) -> Result<Portfolio> {
        validate_quantity(quantity)?;
        let before = self.store.load_portfolio(portfolio_id, owner)?;
        let previous = before
            .item(item_id)
            .ok_or_else(|| Error::not_found("item", item_id))?
            .current_quantity();

        let updated = self
            .store
            .save_quantity(portfolio_id, item_id, owner, quantity)?;
        info!("Set {item_id} in {portfolio_id} from {previous} to {quantity}");
        self.record(|log| match updated.item(item_id) {
            Some(item) => audit::log_quantity_updated(log, portfolio_id, item, previous),
            None => Ok(()),
        });
        Ok(updated)
    }

    pub fn delete_portfolio(&mut self, id: PortfolioId, owner: UserId) -> Result<()> {
        self.store.delete_portfolio(id, owner)?;
        info!("Deleted portfolio {id}");
        self.record(|log| audit::log_portfolio_deleted(log, id, owner));
        Ok(())
    }
}
