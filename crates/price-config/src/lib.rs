//! Configuration for the token price resolver.
//!
//! Configuration is read from a TOML file. String values may reference
//! environment variables with `${VAR_NAME}` or `${VAR_NAME:-default}`, which
//! is how provider API keys are normally supplied:
//!
//! ```toml
//! [resolver]
//! chain_id = "solana"
//! providers = ["dexscreener", "birdeye"]
//!
//! [providers.dexscreener]
//!
//! [providers.birdeye]
//! api_key = "${BIRDEYE_API_KEY}"
//! ```
//!
//! Variables are substituted after parsing, inside string values only, and
//! only in `[resolver]` and the tables of providers listed in
//! `resolver.providers`. A referenced variable that is unset and has no
//! default fails the load with [`ConfigError::MissingEnvVar`], before any
//! resolver exists.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

/// Errors that can occur during configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
	/// Error that occurs while reading the configuration file.
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),
	/// Error that occurs when parsing TOML configuration.
	#[error("Configuration error: {0}")]
	Parse(String),
	/// Error that occurs when configuration validation fails.
	#[error("Validation error: {0}")]
	Validation(String),
	/// A referenced environment variable is not set and has no default.
	#[error("Environment variable '{0}' is not set")]
	MissingEnvVar(String),
}

impl From<toml::de::Error> for ConfigError {
	fn from(err: toml::de::Error) -> Self {
		// Keep only the message, not the echoed input
		ConfigError::Parse(err.message().to_string())
	}
}

/// Top-level configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
	/// Settings for the fallback chain.
	pub resolver: ResolverConfig,
	/// Raw per-provider tables, keyed by provider name. Each provider
	/// validates and deserializes its own table.
	#[serde(default)]
	pub providers: HashMap<String, toml::Value>,
}

/// Settings for the fallback chain.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ResolverConfig {
	/// Chain the token addresses belong to, e.g. `"solana"`.
	pub chain_id: String,
	/// Provider names in the order they are consulted.
	#[serde(default = "default_provider_order")]
	pub providers: Vec<String>,
}

/// Aggregator first, then the authenticated single-token API.
fn default_provider_order() -> Vec<String> {
	vec!["dexscreener".to_string(), "birdeye".to_string()]
}

/// Largest configuration file accepted, in bytes.
const MAX_INPUT_SIZE: usize = 1024 * 1024;

fn env_var_pattern() -> Result<Regex, ConfigError> {
	Regex::new(r"\$\{([A-Z_][A-Z0-9_]{0,127})(?::-([^}]{0,256}))?\}")
		.map_err(|e| ConfigError::Parse(format!("Regex error: {}", e)))
}

/// Resolves environment variables in a string.
///
/// Replaces `${VAR_NAME}` with the value of `VAR_NAME`, or with `default`
/// for `${VAR_NAME:-default}` when the variable is unset. The substituted
/// text is taken verbatim; it is never re-parsed.
pub fn resolve_env_vars(input: &str) -> Result<String, ConfigError> {
	substitute(input, &env_var_pattern()?)
}

fn substitute(input: &str, re: &Regex) -> Result<String, ConfigError> {
	let mut result = String::with_capacity(input.len());
	let mut last_end = 0;

	for cap in re.captures_iter(input) {
		let (Some(full_match), Some(name)) = (cap.get(0), cap.get(1)) else {
			continue;
		};
		let var_name = name.as_str();

		let value = match std::env::var(var_name) {
			Ok(v) => v,
			Err(_) => match cap.get(2) {
				Some(default) => default.as_str().to_string(),
				None => {
					tracing::error!("{} is not set", var_name);
					return Err(ConfigError::MissingEnvVar(var_name.to_string()));
				},
			},
		};

		result.push_str(&input[last_end..full_match.start()]);
		result.push_str(&value);
		last_end = full_match.end();
	}
	result.push_str(&input[last_end..]);

	Ok(result)
}

/// Substitutes environment variables in every string inside `value`.
fn resolve_value(value: &mut toml::Value, re: &Regex) -> Result<(), ConfigError> {
	match value {
		toml::Value::String(s) => *s = substitute(s, re)?,
		toml::Value::Array(items) => {
			for item in items {
				resolve_value(item, re)?;
			}
		},
		toml::Value::Table(table) => {
			for (_, item) in table.iter_mut() {
				resolve_value(item, re)?;
			}
		},
		_ => {},
	}
	Ok(())
}

impl Config {
	/// Loads configuration from a file, resolving environment variables.
	pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
		let path = path.as_ref();
		let content = tokio::fs::read_to_string(path).await.map_err(|e| {
			ConfigError::Io(std::io::Error::new(
				e.kind(),
				format!("Cannot read {}: {}", path.display(), e),
			))
		})?;
		content.parse()
	}

	/// Returns the raw table for a provider, if one is configured.
	pub fn provider(&self, name: &str) -> Option<&toml::Value> {
		self.providers.get(name)
	}

	/// Checks that the provider order is usable.
	///
	/// - chain id is not empty
	/// - at least one provider is listed, none twice
	/// - every listed provider has a `[providers.<name>]` table
	fn validate(&self) -> Result<(), ConfigError> {
		if self.resolver.chain_id.trim().is_empty() {
			return Err(ConfigError::Validation(
				"resolver.chain_id cannot be empty".into(),
			));
		}

		if self.resolver.providers.is_empty() {
			return Err(ConfigError::Validation(
				"At least one provider must be listed in resolver.providers".into(),
			));
		}

		let mut seen = HashSet::new();
		for name in &self.resolver.providers {
			if !seen.insert(name.as_str()) {
				return Err(ConfigError::Validation(format!(
					"Provider '{}' is listed more than once",
					name
				)));
			}
			if !self.providers.contains_key(name) {
				return Err(ConfigError::Validation(format!(
					"Provider '{}' has no [providers.{}] section",
					name, name
				)));
			}
		}

		Ok(())
	}
}

/// Parses configuration from a TOML string, resolving environment variables
/// in the `[resolver]` table and in the tables of listed providers, then
/// validating the result.
impl FromStr for Config {
	type Err = ConfigError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		if s.len() > MAX_INPUT_SIZE {
			return Err(ConfigError::Validation(format!(
				"Configuration file too large: {} bytes (max: {} bytes)",
				s.len(),
				MAX_INPUT_SIZE
			)));
		}

		let re = env_var_pattern()?;
		let mut raw: toml::Value = toml::from_str(s)?;
		if let Some(resolver) = raw.get_mut("resolver") {
			resolve_value(resolver, &re)?;
		}

		let mut config: Config = raw.try_into()?;
		// Tables of providers that are not listed keep their placeholders
		for name in &config.resolver.providers {
			if let Some(table) = config.providers.get_mut(name) {
				resolve_value(table, &re)?;
			}
		}

		config.validate()?;
		Ok(config)
	}
}
