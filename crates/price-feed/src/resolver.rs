//! Ordered fallback over price providers.

use crate::{
	get_all_implementations, PriceProviderInterface, PriceRequest, ProviderError, ResolvedPrice,
};
use price_config::Config;
use price_types::{Price, TokenAddress};
use std::collections::HashMap;
use std::sync::Arc;

/// Resolves a token's native price from an ordered list of providers.
///
/// Providers are queried one after another in list order. The first price
/// returned wins and later providers are not contacted. Any provider error
/// is logged and treated as absence; if every provider comes up empty the
/// result is `None`, meaning "price unknown".
///
/// The resolver keeps no state between calls, so one instance can be shared
/// across tasks. No timeout is applied beyond what each provider is
/// configured with; callers needing a bound on total latency should wrap
/// the call in `tokio::time::timeout`.
pub struct PriceResolver {
	providers: Vec<Arc<dyn PriceProviderInterface>>,
	chain_id: String,
}

impl PriceResolver {
	/// Creates a resolver over `providers`, consulted in the given order.
	pub fn new(
		providers: Vec<Arc<dyn PriceProviderInterface>>,
		chain_id: impl Into<String>,
	) -> Result<Self, ProviderError> {
		if providers.is_empty() {
			return Err(ProviderError::Configuration(
				"At least one price provider is required".to_string(),
			));
		}
		Ok(Self {
			providers,
			chain_id: chain_id.into(),
		})
	}

	/// Builds every provider listed in `resolver.providers`, in that order.
	///
	/// Fails if a name has no registered implementation or a provider rejects
	/// its configuration table, e.g. a blank API key.
	pub fn from_config(config: &Config) -> Result<Self, ProviderError> {
		let factories: HashMap<_, _> = get_all_implementations().into_iter().collect();

		let mut providers: Vec<Arc<dyn PriceProviderInterface>> = Vec::new();
		for name in &config.resolver.providers {
			let factory = factories.get(name.as_str()).ok_or_else(|| {
				ProviderError::Configuration(format!("Unknown price provider '{}'", name))
			})?;
			let table = config.provider(name).ok_or_else(|| {
				ProviderError::Configuration(format!("Missing [providers.{}] section", name))
			})?;
			let provider = factory(table).map_err(|e| {
				ProviderError::Configuration(format!("Provider '{}': {}", name, e))
			})?;
			tracing::debug!("Configured price provider: {}", name);
			providers.push(Arc::from(provider));
		}

		Self::new(providers, config.resolver.chain_id.clone())
	}

	/// Names of the providers in consultation order.
	pub fn provider_names(&self) -> Vec<&str> {
		self.providers.iter().map(|p| p.name()).collect()
	}

	/// Returns the chain the resolver prices tokens on.
	pub fn chain_id(&self) -> &str {
		&self.chain_id
	}

	/// Returns the first price any provider yields, with its source.
	pub async fn resolve(&self, token_address: &TokenAddress) -> Option<ResolvedPrice> {
		let request = PriceRequest {
			token_address: token_address.clone(),
			chain_id: self.chain_id.clone(),
		};

		for provider in &self.providers {
			match provider.fetch_price(&request).await {
				Ok(price) => {
					tracing::debug!(
						token = %token_address,
						provider = provider.name(),
						%price,
						"Resolved price"
					);
					return Some(ResolvedPrice {
						price,
						source: provider.name().to_string(),
					});
				},
				Err(ProviderError::NoPrice(reason)) => {
					tracing::debug!(
						token = %token_address,
						provider = provider.name(),
						"No price: {}",
						reason
					);
				},
				Err(e) => {
					tracing::warn!(
						token = %token_address,
						provider = provider.name(),
						"Price provider failed: {}",
						e
					);
				},
			}
		}

		tracing::info!(token = %token_address, "No provider returned a price");
		None
	}

	/// Returns the token's native price, or `None` if no provider has one.
	pub async fn resolve_price(&self, token_address: &TokenAddress) -> Option<Price> {
		self.resolve(token_address).await.map(|resolved| resolved.price)
	}
}
