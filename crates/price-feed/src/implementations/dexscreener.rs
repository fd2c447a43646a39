//! DexScreener market aggregator provider.
//!
//! Looks up the trading pairs of a token on one chain and reads the native
//! price of the first pair that belongs to that chain. No authentication is
//! required.

use crate::{
	build_http_client, NumericValue, PriceProviderFactory, PriceProviderInterface,
	PriceProviderRegistry, PriceRequest, ProviderError,
};
use async_trait::async_trait;
use price_types::{
	http_url, ConfigSchema, Field, FieldType, ImplementationRegistry, Price, Schema,
	ValidationError,
};
use reqwest::Url;
use serde::{Deserialize, Serialize};

const DEFAULT_BASE_URL: &str = "https://api.dexscreener.com";

/// Configuration for the DexScreener provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DexScreenerConfig {
	#[serde(default = "default_base_url")]
	pub base_url: String,
	/// Per-request timeout. Requests are unbounded when unset.
	#[serde(default)]
	pub timeout_seconds: Option<u64>,
}

fn default_base_url() -> String {
	DEFAULT_BASE_URL.to_string()
}

impl Default for DexScreenerConfig {
	fn default() -> Self {
		Self {
			base_url: default_base_url(),
			timeout_seconds: None,
		}
	}
}

/// Configuration schema for DexScreenerProvider.
pub struct DexScreenerSchema;

impl ConfigSchema for DexScreenerSchema {
	fn validate(&self, config: &toml::Value) -> Result<(), ValidationError> {
		let schema = Schema::new(
			vec![],
			vec![
				Field::new("base_url", FieldType::String).with_validator(http_url),
				Field::new(
					"timeout_seconds",
					FieldType::Integer {
						min: Some(1),
						max: Some(300),
					},
				),
			],
		);
		schema.validate(config)
	}
}

/// One trading pair as returned by the aggregator. Only the fields the
/// lookup reads are kept.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Pair {
	#[serde(default)]
	chain_id: Option<String>,
	#[serde(default)]
	dex_id: Option<String>,
	#[serde(default)]
	pair_address: Option<String>,
	#[serde(default)]
	price_native: Option<NumericValue>,
}

/// The endpoint answers with a bare array of pairs; older endpoints wrap
/// the array as `{ "pairs": [...] }` and send `null` when nothing matches.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum PairsResponse {
	Bare(Vec<Pair>),
	Wrapped {
		#[serde(default)]
		pairs: Option<Vec<Pair>>,
	},
}

impl PairsResponse {
	fn into_pairs(self) -> Vec<Pair> {
		match self {
			PairsResponse::Bare(pairs) => pairs,
			PairsResponse::Wrapped { pairs } => pairs.unwrap_or_default(),
		}
	}
}

/// Picks the first pair on the requested chain.
///
/// Pairs without a `chainId` are accepted since the endpoint is already
/// scoped to one chain.
fn select_pair<'a>(pairs: &'a [Pair], chain_id: &str) -> Option<&'a Pair> {
	pairs.iter().find(|pair| {
		pair.chain_id
			.as_deref()
			.is_none_or(|c| c.eq_ignore_ascii_case(chain_id))
	})
}

/// Price provider backed by the DexScreener token pairs endpoint.
pub struct DexScreenerProvider {
	base_url: Url,
	client: reqwest::Client,
}

impl DexScreenerProvider {
	pub fn new(config: DexScreenerConfig) -> Result<Self, ProviderError> {
		let base_url = Url::parse(&config.base_url).map_err(|e| {
			ProviderError::Configuration(format!("Invalid base_url '{}': {}", config.base_url, e))
		})?;
		if base_url.cannot_be_a_base() {
			return Err(ProviderError::Configuration(format!(
				"base_url '{}' cannot carry a path",
				config.base_url
			)));
		}
		let client = build_http_client(config.timeout_seconds)?;
		Ok(Self { base_url, client })
	}

	/// `{base}/tokens/v1/{chain}/{token}`, each segment percent-encoded.
	fn pairs_url(&self, request: &PriceRequest) -> Result<Url, ProviderError> {
		let mut url = self.base_url.clone();
		url.path_segments_mut()
			.map_err(|_| ProviderError::Configuration("base_url cannot carry a path".to_string()))?
			.pop_if_empty()
			.extend([
				"tokens",
				"v1",
				request.chain_id.as_str(),
				request.token_address.as_str(),
			]);
		Ok(url)
	}
}

#[async_trait]
impl PriceProviderInterface for DexScreenerProvider {
	fn name(&self) -> &str {
		Registry::NAME
	}

	async fn fetch_price(&self, request: &PriceRequest) -> Result<Price, ProviderError> {
		let url = self.pairs_url(request)?;
		tracing::debug!(%url, "Requesting token pairs");

		let response = self.client.get(url).send().await?.error_for_status()?;
		let pairs = response.json::<PairsResponse>().await?.into_pairs();

		let pair = select_pair(&pairs, &request.chain_id).ok_or_else(|| {
			ProviderError::NoPrice(format!(
				"no {} pair for {}",
				request.chain_id, request.token_address
			))
		})?;

		tracing::debug!(
			dex = pair.dex_id.as_deref().unwrap_or("unknown"),
			pair = pair.pair_address.as_deref().unwrap_or("unknown"),
			"Selected pair"
		);

		pair.price_native
			.as_ref()
			.and_then(NumericValue::to_price)
			.ok_or_else(|| {
				ProviderError::NoPrice(format!(
					"pair for {} has no parsable priceNative",
					request.token_address
				))
			})
	}
}

/// Registry for the DexScreener provider.
pub struct Registry;

impl ImplementationRegistry for Registry {
	const NAME: &'static str = "dexscreener";
	type Factory = PriceProviderFactory;

	fn factory() -> Self::Factory {
		|config: &toml::Value| -> Result<Box<dyn PriceProviderInterface>, ProviderError> {
			DexScreenerSchema
				.validate(config)
				.map_err(|e| ProviderError::Configuration(e.to_string()))?;

			let dex_config: DexScreenerConfig = config.clone().try_into().map_err(|e| {
				ProviderError::Configuration(format!("Invalid dexscreener config: {}", e))
			})?;

			Ok(Box::new(DexScreenerProvider::new(dex_config)?))
		}
	}
}

impl PriceProviderRegistry for Registry {}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::test_support::{serve, unreachable_url};
	use axum::{extract::Path, http::StatusCode, routing::get, Json, Router};
	use serde_json::{json, Value};

	fn request(token: &str) -> PriceRequest {
		PriceRequest {
			token_address: token.into(),
			chain_id: "solana".to_string(),
		}
	}

	async fn provider_for(router: Router) -> DexScreenerProvider {
		let base_url = serve(router).await;
		DexScreenerProvider::new(DexScreenerConfig {
			base_url,
			timeout_seconds: Some(5),
		})
		.unwrap()
	}

	fn fixed(body: Value) -> Router {
		Router::new().route(
			"/tokens/v1/{chain}/{token}",
			get(move || {
				let body = body.clone();
				async move { Json(body) }
			}),
		)
	}

	#[tokio::test]
	async fn test_reads_first_pair_native_price() {
		let provider = provider_for(fixed(json!([
			{ "chainId": "solana", "dexId": "raydium", "priceNative": "1.2345" },
			{ "chainId": "solana", "dexId": "orca", "priceNative": "9.0" }
		])))
		.await;

		let price = provider.fetch_price(&request("TKN1")).await.unwrap();
		assert_eq!(price.value(), 1.2345);
	}

	#[tokio::test]
	async fn test_request_path_carries_chain_and_token() {
		let router = Router::new().route(
			"/tokens/v1/{chain}/{token}",
			get(|Path((chain, token)): Path<(String, String)>| async move {
				if chain == "solana" && token == "TKN1" {
					Json(json!([{ "chainId": "solana", "priceNative": "0.005" }]))
				} else {
					Json(json!([]))
				}
			}),
		);
		let provider = provider_for(router).await;

		let price = provider.fetch_price(&request("TKN1")).await.unwrap();
		assert_eq!(price.value(), 0.005);
	}

	#[tokio::test]
	async fn test_token_with_reserved_characters_stays_one_segment() {
		let router = Router::new().route(
			"/tokens/v1/{chain}/{token}",
			get(|Path((chain, token)): Path<(String, String)>| async move {
				if chain == "solana" && token == "abc#x?y/z" {
					Json(json!([{ "chainId": "solana", "priceNative": "2.5" }]))
				} else {
					Json(json!([]))
				}
			}),
		);
		let provider = provider_for(router).await;

		let price = provider.fetch_price(&request("abc#x?y/z")).await.unwrap();
		assert_eq!(price.value(), 2.5);
	}

	#[test]
	fn test_pairs_url_keeps_base_path() {
		let provider = DexScreenerProvider::new(DexScreenerConfig {
			base_url: "https://proxy.local/dex/".to_string(),
			timeout_seconds: None,
		})
		.unwrap();

		let url = provider.pairs_url(&request("a b")).unwrap();
		assert_eq!(url.as_str(), "https://proxy.local/dex/tokens/v1/solana/a%20b");
	}

	#[tokio::test]
	async fn test_skips_pairs_on_other_chains() {
		let provider = provider_for(fixed(json!([
			{ "chainId": "ethereum", "priceNative": "100" },
			{ "chainId": "Solana", "priceNative": "0.25" }
		])))
		.await;

		let price = provider.fetch_price(&request("TKN1")).await.unwrap();
		assert_eq!(price.value(), 0.25);
	}

	#[tokio::test]
	async fn test_wrapped_response_shape() {
		let provider = provider_for(fixed(json!({
			"schemaVersion": "1.0.0",
			"pairs": [{ "priceNative": "0.005" }]
		})))
		.await;

		let price = provider.fetch_price(&request("TKN1")).await.unwrap();
		assert_eq!(price.value(), 0.005);
	}

	#[tokio::test]
	async fn test_null_pairs_is_no_price() {
		let provider = provider_for(fixed(json!({ "schemaVersion": "1.0.0", "pairs": null }))).await;

		let err = provider.fetch_price(&request("TKN2")).await.unwrap_err();
		assert!(matches!(err, ProviderError::NoPrice(_)));
	}

	#[tokio::test]
	async fn test_unparsable_price_is_no_price() {
		let provider = provider_for(fixed(json!([{ "chainId": "solana", "priceNative": "abc" }]))).await;

		let err = provider.fetch_price(&request("TKN1")).await.unwrap_err();
		assert!(matches!(err, ProviderError::NoPrice(_)));
	}

	#[tokio::test]
	async fn test_http_error_status() {
		let router = Router::new().route(
			"/tokens/v1/{chain}/{token}",
			get(|| async { StatusCode::TOO_MANY_REQUESTS }),
		);
		let provider = provider_for(router).await;

		let err = provider.fetch_price(&request("TKN1")).await.unwrap_err();
		assert!(matches!(err, ProviderError::Http(429)));
	}

	#[tokio::test]
	async fn test_malformed_body_is_decode_error() {
		let router = Router::new().route(
			"/tokens/v1/{chain}/{token}",
			get(|| async { "not json" }),
		);
		let provider = provider_for(router).await;

		let err = provider.fetch_price(&request("TKN1")).await.unwrap_err();
		assert!(matches!(err, ProviderError::Decode(_)));
	}

	#[tokio::test]
	async fn test_connection_refused_is_network_error() {
		let provider = DexScreenerProvider::new(DexScreenerConfig {
			base_url: unreachable_url().await,
			timeout_seconds: Some(5),
		})
		.unwrap();

		let err = provider.fetch_price(&request("TKN3")).await.unwrap_err();
		assert!(matches!(err, ProviderError::Network(_)));
	}

	#[test]
	fn test_factory_rejects_bad_base_url() {
		let config: toml::Value = toml::from_str("base_url = \"api.dexscreener.com\"").unwrap();
		let result = Registry::factory()(&config);
		assert!(matches!(result, Err(ProviderError::Configuration(_))));
	}

	#[test]
	fn test_factory_defaults() {
		let config = toml::Value::Table(toml::Table::new());
		let provider = Registry::factory()(&config).unwrap();
		assert_eq!(provider.name(), "dexscreener");
	}
}
