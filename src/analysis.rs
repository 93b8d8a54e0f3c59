//! Drift analysis: current weights versus target weights.
//!
//! Valuation takes two passes over the items. An item's current weight is its
//! value divided by the portfolio's total value, and the total is only known
//! once every item has been valued.
//!
//! A missing quote never fails the analysis. The item is valued at its fixed
//! entry price instead, so an unpriced item contributes its baseline value and
//! shows no price-driven drift.

use std::fmt;

use crate::asset::Asset;
use crate::portfolio::{Portfolio, PortfolioItem, PortfolioSummary};
use crate::quote::{PriceMap, quote_for};
use crate::types::{ItemId, Symbol};

/// Ratio of tolerance beyond which an out-of-range item is critical rather than a warning.
pub const CRITICAL_DRIFT_RATIO: f64 = 1.5;

/// How far an item sits from its target relative to its tolerance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum DriftStatus {
    /// `|diff| <= tolerance`
    Within,
    /// `tolerance < |diff| <= 1.5 * tolerance`
    Warning,
    /// `|diff| > 1.5 * tolerance`
    Critical,
}

impl fmt::Display for DriftStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DriftStatus::Within => write!(f, "OK"),
            DriftStatus::Warning => write!(f, "WARN"),
            DriftStatus::Critical => write!(f, "CRIT"),
        }
    }
}

/// Analysis of one portfolio item.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ItemAnalysis {
    pub item_id: ItemId,
    pub asset: Asset,
    pub target_weight: f64,
    pub current_weight: f64,
    /// `current_weight - target_weight`; positive means overweight.
    pub weight_diff: f64,
    pub tolerance: f64,
    pub is_out_of_range: bool,
    pub current_quantity: f64,
    pub initial_quantity: f64,
    /// Effective price used for valuation (quote, or entry price as fallback).
    pub current_price: f64,
    pub entry_price: f64,
    pub current_value: f64,
    /// True when no quote was available and `current_price` is the entry price.
    pub price_is_fallback: bool,
    /// Severity of the drift, for highlighting.
    pub status: DriftStatus,
    /// Signed quantity change that would restore the target weight at today's
    /// total value and price. Positive means buy.
    ///
    /// Informational only: the total is held fixed, so applying every item's
    /// suggestion at once is exact only when the trades are funded from each other.
    pub rebalance_quantity: f64,
}

impl ItemAnalysis {
    /// Unrealized gain or loss on the units held now, relative to the entry price.
    pub fn unrealized_return(&self) -> f64 {
        self.current_quantity * (self.current_price - self.entry_price)
    }
}

/// Result of analyzing one portfolio snapshot.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AnalysisReport {
    pub portfolio: PortfolioSummary,
    pub total_value: f64,
    pub initial_invest_amount: f64,
    pub total_return: f64,
    pub total_return_pct: f64,
    /// One entry per portfolio item, in portfolio order.
    pub items: Vec<ItemAnalysis>,
}

impl AnalysisReport {
    /// Items whose drift exceeds their tolerance.
    pub fn out_of_range(&self) -> impl Iterator<Item = &ItemAnalysis> {
        self.items.iter().filter(|i| i.is_out_of_range)
    }

    /// True if any item is out of range.
    pub fn needs_rebalance(&self) -> bool {
        self.items.iter().any(|i| i.is_out_of_range)
    }

    /// Symbols valued at their entry price because no quote was available.
    pub fn fallback_symbols(&self) -> Vec<&Symbol> {
        self.items
            .iter()
            .filter(|i| i.price_is_fallback)
            .map(|i| &i.asset.symbol)
            .collect()
    }

    pub fn item(&self, id: ItemId) -> Option<&ItemAnalysis> {
        self.items.iter().find(|i| i.item_id == id)
    }
}

fn drift_status(weight_diff: f64, tolerance: f64) -> DriftStatus {
    let drift = weight_diff.abs();
    if drift <= tolerance {
        DriftStatus::Within
    } else if drift > tolerance * CRITICAL_DRIFT_RATIO {
        DriftStatus::Critical
    } else {
        DriftStatus::Warning
    }
}

/// Effective price and value of one item: quote if usable, else entry price.
fn valuation(item: &PortfolioItem, prices: &PriceMap) -> (f64, f64, bool) {
    let quote = quote_for(prices, item.symbol());
    let (price, fallback) = match quote.price() {
        Some(p) => (p, false),
        None => (item.entry_price, true),
    };
    (price, item.current_quantity() * price, fallback)
}

/// Analyze a portfolio against current prices.
///
/// Pure and deterministic: the same snapshot and prices always give the same
/// report, and nothing is mutated.
pub fn analyze(portfolio: &Portfolio, prices: &PriceMap) -> AnalysisReport {
    // Pass 1: total value
    let total_value: f64 = portfolio
        .items
        .iter()
        .map(|item| valuation(item, prices).1)
        .sum();

    // Pass 2: per-item weight and drift
    let items = portfolio
        .items
        .iter()
        .map(|item| {
            let (current_price, current_value, price_is_fallback) = valuation(item, prices);

            // Multiply first: keeps exact ratios such as 55/100 exact
            let current_weight = if total_value > 0.0 {
                current_value * 100.0 / total_value
            } else {
                0.0
            };
            let weight_diff = current_weight - item.target_weight;
            let target_value = total_value * item.target_weight / 100.0;

            ItemAnalysis {
                item_id: item.id,
                asset: item.asset.clone(),
                target_weight: item.target_weight,
                current_weight,
                weight_diff,
                tolerance: item.tolerance,
                is_out_of_range: weight_diff.abs() > item.tolerance,
                current_quantity: item.current_quantity(),
                initial_quantity: item.initial_quantity,
                current_price,
                entry_price: item.entry_price,
                current_value,
                price_is_fallback,
                status: drift_status(weight_diff, item.tolerance),
                rebalance_quantity: (target_value - current_value) / current_price,
            }
        })
        .collect();

    let initial = portfolio.initial_invest_amount;
    let total_return = total_value - initial;
    let total_return_pct = if initial > 0.0 {
        total_return * 100.0 / initial
    } else {
        0.0
    };

    AnalysisReport {
        portfolio: portfolio.summary(),
        total_value,
        initial_invest_amount: initial,
        total_return,
        total_return_pct,
        items,
    }
}

impl fmt::Display for AnalysisReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "PORTFOLIO {} \"{}\":", self.portfolio.id, self.portfolio.name)?;
        writeln!(
            f,
            "  {:10} {:>12} {:>10} {:>8} {:>8} {:>8} {:>7} {:>14}  Status",
            "Symbol", "Qty", "Price", "Target%", "Actual%", "Diff%", "Tol%", "Value"
        )?;
        for i in &self.items {
            writeln!(
                f,
                "  {:10} {:>12.4} {:>10.2}{} {:>7.2}% {:>7.2}% {:>+7.2}% {:>6.1}% {:>14.2}  {}",
                i.asset.symbol,
                i.current_quantity,
                i.current_price,
                if i.price_is_fallback { "*" } else { " " },
                i.target_weight,
                i.current_weight,
                i.weight_diff,
                i.tolerance,
                i.current_value,
                i.status,
            )?;
        }
        writeln!(
            f,
            "\n  Value {:.2} / invested {:.2} = {:+.2} ({:+.2}%)",
            self.total_value, self.initial_invest_amount, self.total_return, self.total_return_pct
        )?;
        if self.items.iter().any(|i| i.price_is_fallback) {
            writeln!(f, "  * no current quote, valued at entry price")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::asset::NewAsset;
    use crate::quote::PriceQuote;
    use crate::types::{AssetId, PortfolioId, UserId};

    fn item(id: u64, symbol: &str, target: f64, tol: f64, entry: f64, qty: f64) -> PortfolioItem {
        let asset = NewAsset::new(Symbol::new(symbol), symbol).into_asset(AssetId(id), Utc::now());
        PortfolioItem::new(
            ItemId(id),
            PortfolioId(1),
            asset,
            target,
            tol,
            entry,
            qty.max(1e-9),
            qty,
            Utc::now(),
        )
    }

    fn portfolio(items: Vec<PortfolioItem>, invested: f64) -> Portfolio {
        Portfolio {
            id: PortfolioId(1),
            owner: UserId(1),
            name: "Test".into(),
            description: None,
            initial_invest_amount: invested,
            created_at: Utc::now(),
            items,
        }
    }

    fn prices(pairs: &[(&str, f64)]) -> PriceMap {
        pairs
            .iter()
            .map(|(s, p)| (Symbol::new(s), PriceQuote::from_raw(*p)))
            .collect()
    }

    #[test]
    fn unchanged_prices_match_targets() {
        // 1000 invested 60/40 at 100 and 50 → 6 and 8 units
        let p = portfolio(
            vec![
                item(1, "VTI", 60.0, 5.0, 100.0, 6.0),
                item(2, "BND", 40.0, 5.0, 50.0, 8.0),
            ],
            1_000.0,
        );
        let report = analyze(&p, &prices(&[("VTI", 100.0), ("BND", 50.0)]));

        assert_eq!(report.total_value, 1_000.0);
        assert_eq!(report.total_return, 0.0);
        assert_eq!(report.total_return_pct, 0.0);
        assert!((report.items[0].current_weight - 60.0).abs() < 1e-9);
        assert!((report.items[1].current_weight - 40.0).abs() < 1e-9);
        assert!(!report.needs_rebalance());
    }

    #[test]
    fn price_move_creates_drift() {
        let p = portfolio(
            vec![
                item(1, "VTI", 60.0, 5.0, 100.0, 6.0),
                item(2, "BND", 40.0, 5.0, 50.0, 8.0),
            ],
            1_000.0,
        );
        // VTI doubles: 1200 + 400 = 1600
        let report = analyze(&p, &prices(&[("VTI", 200.0), ("BND", 50.0)]));

        assert_eq!(report.total_value, 1_600.0);
        assert_eq!(report.total_return, 600.0);
        assert!((report.total_return_pct - 60.0).abs() < 1e-9);
        assert!((report.items[0].current_weight - 75.0).abs() < 1e-9);
        assert!((report.items[0].weight_diff - 15.0).abs() < 1e-9);
        assert!((report.items[1].weight_diff + 15.0).abs() < 1e-9);
        assert!(report.items[0].is_out_of_range);
        assert_eq!(report.items[0].status, DriftStatus::Critical);
        assert_eq!(report.out_of_range().count(), 2);
    }

    #[test]
    fn missing_quote_falls_back_to_entry() {
        let p = portfolio(
            vec![
                item(1, "VTI", 50.0, 5.0, 100.0, 5.0),
                item(2, "BND", 50.0, 5.0, 50.0, 10.0),
            ],
            1_000.0,
        );
        let mut map = prices(&[("VTI", 110.0)]);
        map.insert(Symbol::new("BND"), PriceQuote::Unavailable);
        let report = analyze(&p, &map);

        assert_eq!(report.items[1].current_price, 50.0);
        assert!(report.items[1].price_is_fallback);
        assert!(!report.items[0].price_is_fallback);
        assert_eq!(report.total_value, 1_050.0);
        assert_eq!(report.fallback_symbols(), vec![&Symbol::new("BND")]);
    }

    #[test]
    fn zero_quote_is_treated_as_missing() {
        let p = portfolio(vec![item(1, "VTI", 100.0, 5.0, 100.0, 10.0)], 1_000.0);
        let mut map = PriceMap::default();
        map.insert(Symbol::new("VTI"), PriceQuote::Available(0.0));
        let report = analyze(&p, &map);
        assert_eq!(report.items[0].current_price, 100.0);
        assert_eq!(report.total_value, 1_000.0);
    }

    #[test]
    fn zero_total_value_gives_zero_weights() {
        let p = portfolio(
            vec![
                item(1, "VTI", 60.0, 5.0, 100.0, 0.0),
                item(2, "BND", 40.0, 5.0, 50.0, 0.0),
            ],
            1_000.0,
        );
        let report = analyze(&p, &prices(&[("VTI", 100.0), ("BND", 50.0)]));
        assert_eq!(report.total_value, 0.0);
        for i in &report.items {
            assert_eq!(i.current_weight, 0.0);
            assert!(!i.current_weight.is_nan());
        }
        assert_eq!(report.total_return, -1_000.0);
        assert_eq!(report.total_return_pct, -100.0);
    }

    #[test]
    fn zero_invest_amount_gives_zero_return_pct() {
        let p = portfolio(vec![item(1, "VTI", 100.0, 5.0, 100.0, 1.0)], 0.0);
        let report = analyze(&p, &prices(&[("VTI", 120.0)]));
        assert_eq!(report.total_return, 120.0);
        assert_eq!(report.total_return_pct, 0.0);
    }

    #[test]
    fn tolerance_boundary_is_strict() {
        // Two items: A holds exactly 55% → diff 5.0 with tolerance 5
        let p = portfolio(
            vec![
                item(1, "AAA", 50.0, 5.0, 1.0, 55.0),
                item(2, "BBB", 50.0, 5.0, 1.0, 45.0),
            ],
            100.0,
        );
        let report = analyze(&p, &prices(&[("AAA", 1.0), ("BBB", 1.0)]));
        assert_eq!(report.items[0].current_weight, 55.0);
        assert_eq!(report.items[0].weight_diff, 5.0);
        assert!(!report.items[0].is_out_of_range);
        assert_eq!(report.items[0].status, DriftStatus::Within);

        // 55.01%
        let p = portfolio(
            vec![
                item(1, "AAA", 50.0, 5.0, 1.0, 5_501.0),
                item(2, "BBB", 50.0, 5.0, 1.0, 4_499.0),
            ],
            10_000.0,
        );
        let report = analyze(&p, &prices(&[("AAA", 1.0), ("BBB", 1.0)]));
        assert!((report.items[0].current_weight - 55.01).abs() < 1e-9);
        assert!(report.items[0].is_out_of_range);
        assert_eq!(report.items[0].status, DriftStatus::Warning);
    }

    #[test]
    fn zero_tolerance_flags_any_drift() {
        let p = portfolio(
            vec![
                item(1, "AAA", 50.0, 0.0, 1.0, 51.0),
                item(2, "BBB", 50.0, 0.0, 1.0, 49.0),
            ],
            100.0,
        );
        let report = analyze(&p, &prices(&[("AAA", 1.0), ("BBB", 1.0)]));
        assert!(report.items.iter().all(|i| i.is_out_of_range));
        assert!(report.items.iter().all(|i| i.status == DriftStatus::Critical));
    }

    #[test]
    fn rebalance_quantity_restores_target() {
        let p = portfolio(
            vec![
                item(1, "VTI", 60.0, 5.0, 100.0, 6.0),
                item(2, "BND", 40.0, 5.0, 50.0, 8.0),
            ],
            1_000.0,
        );
        let report = analyze(&p, &prices(&[("VTI", 200.0), ("BND", 50.0)]));
        // Target VTI value = 960 → 4.8 units, currently 6 → sell 1.2
        assert!((report.items[0].rebalance_quantity + 1.2).abs() < 1e-9);
        // Target BND value = 640 → 12.8 units, currently 8 → buy 4.8
        assert!((report.items[1].rebalance_quantity - 4.8).abs() < 1e-9);
        assert!((report.items[0].unrealized_return() - 600.0).abs() < 1e-9);
    }

    #[test]
    fn order_preserved() {
        let symbols = ["ZZZ", "AAA", "MMM", "BBB"];
        let items = symbols
            .iter()
            .enumerate()
            .map(|(i, s)| item(i as u64 + 1, s, 25.0, 5.0, 10.0, 2.5))
            .collect();
        let p = portfolio(items, 100.0);
        let map = prices(&[("AAA", 11.0), ("ZZZ", 9.0)]);
        let first = analyze(&p, &map);
        let second = analyze(&p, &map);
        let got: Vec<&str> = first.items.iter().map(|i| i.asset.symbol.as_str()).collect();
        assert_eq!(got, symbols);
        assert_eq!(first, second);
    }

    #[test]
    fn empty_portfolio() {
        let p = portfolio(Vec::new(), 100.0);
        let report = analyze(&p, &PriceMap::default());
        assert!(report.items.is_empty());
        assert_eq!(report.total_value, 0.0);
        assert_eq!(report.total_return_pct, -100.0);
    }

    #[test]
    fn display_format() {
        let p = portfolio(
            vec![
                item(1, "VTI", 60.0, 5.0, 100.0, 6.0),
                item(2, "BND", 40.0, 5.0, 50.0, 8.0),
            ],
            1_000.0,
        );
        let report = analyze(&p, &prices(&[("VTI", 200.0)]));
        let s = format!("{report}");
        assert!(s.contains("VTI"));
        assert!(s.contains("BND"));
        assert!(s.contains("CRIT"));
        assert!(s.contains("valued at entry price"));
    }

    #[test]
    #[cfg(feature = "serde")]
    fn serde_roundtrip_keeps_suggestions() {
        let p = portfolio(
            vec![
                item(1, "VTI", 60.0, 5.0, 100.0, 6.0),
                item(2, "BND", 40.0, 5.0, 50.0, 8.0),
            ],
            1_000.0,
        );
        let report = analyze(&p, &prices(&[("VTI", 200.0), ("BND", 50.0)]));

        let json = serde_json::to_string(&report).unwrap();
        assert!(json.contains("\"status\":\"critical\""));
        let restored: AnalysisReport = serde_json::from_str(&json).unwrap();

        assert_eq!(restored, report);
        assert!((restored.items[0].rebalance_quantity + 1.2).abs() < 1e-9);
        assert_eq!(restored.items[1].status, DriftStatus::Critical);
    }
}
