//! Birdeye single-token price provider.
//!
//! Authenticated with an API key sent in the `X-API-KEY` header. The key
//! comes from the provider's configuration table, normally as
//! `api_key = "${BIRDEYE_API_KEY}"`, so a missing key is reported when the
//! configuration is loaded rather than on the first lookup.

use crate::{
	build_http_client, join_url, NumericValue, PriceProviderFactory, PriceProviderInterface,
	PriceProviderRegistry, PriceRequest, ProviderError,
};
use async_trait::async_trait;
use price_types::{
	http_url, non_blank, ConfigSchema, Field, FieldType, ImplementationRegistry, Price, Schema,
	SecretString, ValidationError,
};
use serde::{Deserialize, Serialize};

const DEFAULT_BASE_URL: &str = "https://public-api.birdeye.so";
const API_KEY_HEADER: &str = "X-API-KEY";

/// Configuration for the Birdeye provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BirdeyeConfig {
	pub api_key: SecretString,
	#[serde(default = "default_base_url")]
	pub base_url: String,
	#[serde(default)]
	pub timeout_seconds: Option<u64>,
}

fn default_base_url() -> String {
	DEFAULT_BASE_URL.to_string()
}

/// Configuration schema for BirdeyeProvider.
pub struct BirdeyeSchema;

impl ConfigSchema for BirdeyeSchema {
	fn validate(&self, config: &toml::Value) -> Result<(), ValidationError> {
		let schema = Schema::new(
			vec![Field::new("api_key", FieldType::String).with_validator(non_blank)],
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

#[derive(Debug, Deserialize)]
struct PriceResponse {
	#[serde(default)]
	success: Option<bool>,
	#[serde(default)]
	data: Option<PriceData>,
}

#[derive(Debug, Deserialize)]
struct PriceData {
	#[serde(default)]
	value: Option<NumericValue>,
}

/// Price provider backed by the Birdeye `/defi/price` endpoint.
pub struct BirdeyeProvider {
	config: BirdeyeConfig,
	client: reqwest::Client,
}

impl BirdeyeProvider {
	/// Creates the provider, rejecting a blank API key.
	pub fn new(config: BirdeyeConfig) -> Result<Self, ProviderError> {
		if config.api_key.is_blank() {
			return Err(ProviderError::Configuration(
				"birdeye api_key is not set".to_string(),
			));
		}
		let client = build_http_client(config.timeout_seconds)?;
		Ok(Self { config, client })
	}
}

#[async_trait]
impl PriceProviderInterface for BirdeyeProvider {
	fn name(&self) -> &str {
		Registry::NAME
	}

	async fn fetch_price(&self, request: &PriceRequest) -> Result<Price, ProviderError> {
		let url = join_url(&self.config.base_url, "defi/price");
		tracing::debug!(%url, token = %request.token_address, "Requesting token price");

		let response = self
			.client
			.get(&url)
			.query(&[("address", request.token_address.as_str())])
			.header(API_KEY_HEADER, self.config.api_key.expose_secret())
			.send()
			.await?
			.error_for_status()?;
		let body: PriceResponse = response.json().await?;

		if body.success == Some(false) {
			return Err(ProviderError::NoPrice(format!(
				"request for {} was not successful",
				request.token_address
			)));
		}

		body.data
			.and_then(|data| data.value)
			.as_ref()
			.and_then(NumericValue::to_price)
			.ok_or_else(|| {
				ProviderError::NoPrice(format!(
					"no parsable value for {}",
					request.token_address
				))
			})
	}
}

/// Registry for the Birdeye provider.
pub struct Registry;

impl ImplementationRegistry for Registry {
	const NAME: &'static str = "birdeye";
	type Factory = PriceProviderFactory;

	fn factory() -> Self::Factory {
		|config: &toml::Value| -> Result<Box<dyn PriceProviderInterface>, ProviderError> {
			BirdeyeSchema
				.validate(config)
				.map_err(|e| ProviderError::Configuration(e.to_string()))?;

			let birdeye_config: BirdeyeConfig = config.clone().try_into().map_err(|e| {
				ProviderError::Configuration(format!("Invalid birdeye config: {}", e))
			})?;

			Ok(Box::new(BirdeyeProvider::new(birdeye_config)?))
		}
	}
}

impl PriceProviderRegistry for Registry {}
