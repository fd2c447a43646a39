//! Static price table for offline development.
//!
//! Prices come straight from the configuration, keyed by token address:
//!
//! ```toml
//! [providers.mock.prices]
//! TKN1 = "0.005"
//! ```

use crate::{
	PriceProviderFactory, PriceProviderInterface, PriceProviderRegistry, PriceRequest,
	ProviderError,
};
use async_trait::async_trait;
use price_types::{
	ConfigSchema, Field, FieldType, ImplementationRegistry, Price, Schema, ValidationError,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Configuration for the mock price provider.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MockPriceConfig {
	/// Token address -> native price literal.
	#[serde(default)]
	pub prices: HashMap<String, String>,
}

/// Configuration schema for MockPriceProvider.
pub struct MockPriceSchema;

impl ConfigSchema for MockPriceSchema {
	fn validate(&self, config: &toml::Value) -> Result<(), ValidationError> {
		Schema::new(
			vec![],
			vec![Field::new("prices", FieldType::Table(Schema::new(vec![], vec![])))],
		)
		.validate(config)?;

		let Some(prices) = config.get("prices").and_then(|p| p.as_table()) else {
			return Ok(());
		};
		for (token, value) in prices {
			let parsed = value.as_str().and_then(Price::parse);
			if parsed.is_none() {
				return Err(ValidationError::InvalidValue {
					field: format!("prices.{}", token),
					message: "must be a non-negative decimal string".to_string(),
				});
			}
		}
		Ok(())
	}
}

/// Provider answering from a fixed table; unknown tokens have no price.
pub struct MockPriceProvider {
	prices: HashMap<String, Price>,
}

impl MockPriceProvider {
	/// Builds the provider, skipping entries that are not valid prices.
	pub fn new(config: MockPriceConfig) -> Self {
		let prices = config
			.prices
			.into_iter()
			.filter_map(|(token, raw)| Price::parse(&raw).map(|price| (token, price)))
			.collect();
		Self { prices }
	}
}

#[async_trait]
impl PriceProviderInterface for MockPriceProvider {
	fn name(&self) -> &str {
		Registry::NAME
	}

	async fn fetch_price(&self, request: &PriceRequest) -> Result<Price, ProviderError> {
		self.prices
			.get(request.token_address.as_str())
			.copied()
			.ok_or_else(|| ProviderError::NoPrice(format!("{} not in table", request.token_address)))
	}
}

/// Registry for the mock price provider.
pub struct Registry;

impl ImplementationRegistry for Registry {
	const NAME: &'static str = "mock";
	type Factory = PriceProviderFactory;

	fn factory() -> Self::Factory {
		|config: &toml::Value| -> Result<Box<dyn PriceProviderInterface>, ProviderError> {
			MockPriceSchema
				.validate(config)
				.map_err(|e| ProviderError::Configuration(e.to_string()))?;

			let mock_config: MockPriceConfig = config.clone().try_into().map_err(|e| {
				ProviderError::Configuration(format!("Invalid mock config: {}", e))
			})?;

			Ok(Box::new(MockPriceProvider::new(mock_config)))
		}
	}
}

impl PriceProviderRegistry for Registry {}
