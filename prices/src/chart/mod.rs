//! Yahoo-style chart endpoint feed.
//!
//! Requests a week of daily bars and takes the latest close:
//! `GET {base_url}/v8/finance/chart/{symbol}?range=7d&interval=1d`.
//! Blocking (sync) via reqwest::blocking.

pub mod types;

use std::time::Duration;

use driftbook::{PriceQuote, Symbol};
use log::debug;
use reqwest::blocking::Client;
use reqwest::{StatusCode, Url};

use crate::PriceFeed;
use crate::error::PriceError;
use types::ChartResponse;

/// Public chart endpoint host.
pub const DEFAULT_BASE_URL: &str = "https://query1.finance.yahoo.com";

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

const USER_AGENT: &str = concat!("driftbook/", env!("CARGO_PKG_VERSION"));

/// Blocking chart feed client.
pub struct ChartFeed {
    client: Client,
    base_url: Url,
}

impl ChartFeed {
    /// Create a feed against `base_url` (no trailing slash needed).
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, PriceError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| PriceError::Other(format!("invalid base url {base_url}: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(PriceError::Other(format!("invalid base url {base_url}")));
        }

        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| PriceError::Other(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { client, base_url })
    }

    /// Feed against the public endpoint with the default timeout.
    pub fn public() -> Result<Self, PriceError> {
        Self::new(DEFAULT_BASE_URL, DEFAULT_TIMEOUT)
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Request URL for one symbol. The symbol is one percent-encoded path segment.
    pub fn chart_url(&self, symbol: &Symbol) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .extend(["v8", "finance", "chart"])
                .push(symbol.as_str());
        }
        url.query_pairs_mut()
            .clear()
            .append_pair("range", "7d")
            .append_pair("interval", "1d");
        url
    }
}

/// Outcome implied by a response status alone.
///
/// `None` means success and the body should be parsed. 404 is a symbol the
/// endpoint does not know, 429 and 5xx are retryable, anything else is final.
pub fn classify(status: StatusCode) -> Option<Result<PriceQuote, PriceError>> {
    match status {
        s if s.is_success() => None,
        StatusCode::NOT_FOUND => Some(Ok(PriceQuote::Unavailable)),
        StatusCode::TOO_MANY_REQUESTS => Some(Err(PriceError::RateLimit)),
        s if s.is_server_error() => {
            Some(Err(PriceError::Connection(format!("chart returned {s}"))))
        }
        s => Some(Err(PriceError::Other(format!("chart returned {s}")))),
    }
}

/// Map a transport failure to a retryable error.
fn transport_error(e: reqwest::Error) -> PriceError {
    if e.is_timeout() {
        PriceError::Timeout(e.to_string())
    } else {
        PriceError::Connection(e.to_string())
    }
}

impl PriceFeed for ChartFeed {
    fn name(&self) -> &str {
        "chart"
    }

    fn latest_price(&self, symbol: &Symbol) -> Result<PriceQuote, PriceError> {
        let url = self.chart_url(symbol);
        debug!("Fetching chart for {symbol} from {url}");

        let resp = self.client.get(url).send().map_err(transport_error)?;

        match classify(resp.status()) {
            None => {}
            Some(Ok(quote)) => {
                debug!("Chart endpoint does not know {symbol}");
                return Ok(quote);
            }
            Some(Err(PriceError::Other(msg))) => {
                let body = resp.text().unwrap_or_default();
                return Err(PriceError::Other(format!("{msg}: {body}")));
            }
            Some(Err(e)) => return Err(e),
        }

        let body: ChartResponse = resp
            .json()
            .map_err(|e| PriceError::Parse(format!("chart for {symbol}: {e}")))?;

        if body.is_not_found() {
            return Ok(PriceQuote::Unavailable);
        }
        Ok(body.quote())
    }
}
