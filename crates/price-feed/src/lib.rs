//! Token price lookup across external price APIs.
//!
//! Each external API is wrapped in a [`PriceProviderInterface`]
//! implementation. The [`PriceResolver`] consults the configured providers
//! in order and returns the first price one of them yields; provider
//! failures never reach the caller, they only move the lookup on to the
//! next provider.

use async_trait::async_trait;
use price_types::{ImplementationRegistry, Price, TokenAddress};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Re-export implementations
pub mod implementations {
	pub mod birdeye;
	pub mod dexscreener;
	pub mod mock;
}

mod resolver;

pub use resolver::PriceResolver;

/// Errors a single provider can report.
///
/// These stay inside the resolver: every variant is logged and treated as
/// "this provider has no price", after which the next provider is tried.
#[derive(Debug, Error)]
pub enum ProviderError {
	/// The request could not be sent or the connection failed.
	#[error("Network error: {0}")]
	Network(String),
	/// The provider answered with a non-success HTTP status.
	#[error("HTTP status {0}")]
	Http(u16),
	/// The response body did not match the expected shape.
	#[error("Decode error: {0}")]
	Decode(String),
	/// The response was well formed but carried no usable price.
	#[error("No price available: {0}")]
	NoPrice(String),
	/// The provider could not be built from its configuration.
	#[error("Configuration error: {0}")]
	Configuration(String),
}

impl From<reqwest::Error> for ProviderError {
	fn from(err: reqwest::Error) -> Self {
		if err.is_decode() {
			ProviderError::Decode(err.to_string())
		} else if let Some(status) = err.status() {
			ProviderError::Http(status.as_u16())
		} else {
			ProviderError::Network(err.to_string())
		}
	}
}

/// A single price lookup as handed to a provider.
#[derive(Debug, Clone)]
pub struct PriceRequest {
	/// Token to price, forwarded to the provider unchanged.
	pub token_address: TokenAddress,
	/// Chain the token lives on, e.g. `"solana"`.
	pub chain_id: String,
}

/// A price together with the provider that supplied it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedPrice {
	pub price: Price,
	/// Name of the provider, e.g. `"dexscreener"`.
	pub source: String,
}

/// Interface every price provider implements.
#[async_trait]
pub trait PriceProviderInterface: Send + Sync {
	/// Name used in logs and in [`ResolvedPrice::source`].
	fn name(&self) -> &str;

	/// Fetches the native price of a token.
	async fn fetch_price(&self, request: &PriceRequest) -> Result<Price, ProviderError>;
}

/// Builds a provider from its `[providers.<name>]` table.
pub type PriceProviderFactory =
	fn(&toml::Value) -> Result<Box<dyn PriceProviderInterface>, ProviderError>;

/// Registry trait for price provider implementations.
pub trait PriceProviderRegistry: ImplementationRegistry<Factory = PriceProviderFactory> {}

/// Get all registered price provider implementations.
///
/// Returns (name, factory) pairs; the names are the keys accepted under
/// `[providers]` and in `resolver.providers`.
pub fn get_all_implementations() -> Vec<(&'static str, PriceProviderFactory)> {
	use implementations::{birdeye, dexscreener, mock};

	vec![
		(dexscreener::Registry::NAME, dexscreener::Registry::factory()),
		(birdeye::Registry::NAME, birdeye::Registry::factory()),
		(mock::Registry::NAME, mock::Registry::factory()),
	]
}

/// A price field that providers send either as a JSON string or a number.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub(crate) enum NumericValue {
	Text(String),
	Number(f64),
}

impl NumericValue {
	/// Converts to a [`Price`], or `None` if the value is not a valid price.
	pub(crate) fn to_price(&self) -> Option<Price> {
		match self {
			NumericValue::Text(s) => Price::parse(s),
			NumericValue::Number(n) => Price::new(*n),
		}
	}
}

/// Joins a configured base URL and a path without doubling the slash.
pub(crate) fn join_url(base_url: &str, path: &str) -> String {
	format!("{}/{}", base_url.trim_end_matches('/'), path.trim_start_matches('/'))
}

/// Builds the HTTP client a provider uses, applying its optional timeout.
pub(crate) fn build_http_client(
	timeout_seconds: Option<u64>,
) -> Result<reqwest::Client, ProviderError> {
	let mut builder = reqwest::Client::builder();
	if let Some(secs) = timeout_seconds {
		builder = builder.timeout(std::time::Duration::from_secs(secs));
	}
	builder
		.build()
		.map_err(|e| ProviderError::Configuration(format!("Failed to build HTTP client: {}", e)))
}
