//! Chart endpoint response types.

use driftbook::PriceQuote;
use serde::Deserialize;

/// Top-level chart response.
#[derive(Debug, Deserialize)]
pub struct ChartResponse {
    pub chart: Chart,
}

#[derive(Debug, Deserialize)]
pub struct Chart {
    #[serde(default)]
    pub result: Option<Vec<ChartResult>>,
    #[serde(default)]
    pub error: Option<ChartError>,
}

/// Provider-reported error inside a 200 or 404 body.
#[derive(Debug, Deserialize)]
pub struct ChartError {
    pub code: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ChartResult {
    #[serde(default)]
    pub timestamp: Vec<i64>,
    pub indicators: Indicators,
}

#[derive(Debug, Deserialize)]
pub struct Indicators {
    #[serde(default)]
    pub quote: Vec<QuoteBars>,
}

/// Daily bars. Closes can be null for days without trading.
#[derive(Debug, Deserialize)]
pub struct QuoteBars {
    #[serde(default)]
    pub close: Vec<Option<f64>>,
}

impl ChartResponse {
    /// Most recent non-null close in the window.
    pub fn latest_close(&self) -> Option<f64> {
        self.chart
            .result
            .as_ref()?
            .first()?
            .indicators
            .quote
            .first()?
            .close
            .iter()
            .rev()
            .flatten()
            .next()
            .copied()
    }

    /// The latest close as a quote. Empty windows and non-positive closes are unavailable.
    pub fn quote(&self) -> PriceQuote {
        PriceQuote::from_option(self.latest_close())
    }

    /// True when the provider says the symbol does not exist.
    pub fn is_not_found(&self) -> bool {
        self.chart
            .error
            .as_ref()
            .is_some_and(|e| e.code.eq_ignore_ascii_case("not found"))
    }
}
