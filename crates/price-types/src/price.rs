//! Token address and price value types.
//!
//! A `TokenAddress` is forwarded to providers exactly as given; no chain
//! specific validation is applied. A `Price` is always finite and
//! non-negative, so any value a provider hands back that fails those
//! checks is treated the same as a missing price.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque identifier of a tradable asset on a chain.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TokenAddress(String);

impl TokenAddress {
	/// Creates a token address from any string-like value.
	pub fn new(address: impl Into<String>) -> Self {
		Self(address.into())
	}

	/// Returns the address as it will be sent to providers.
	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl fmt::Display for TokenAddress {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

impl From<&str> for TokenAddress {
	fn from(s: &str) -> Self {
		Self::new(s)
	}
}

impl From<String> for TokenAddress {
	fn from(s: String) -> Self {
		Self(s)
	}
}

impl AsRef<str> for TokenAddress {
	fn as_ref(&self) -> &str {
		&self.0
	}
}

/// A native price: the token's value expressed in its paired asset.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Price(f64);

impl Price {
	/// Wraps a float, returning `None` for NaN, infinities and negatives.
	pub fn new(value: f64) -> Option<Self> {
		if value.is_finite() && value >= 0.0 {
			Some(Self(value))
		} else {
			None
		}
	}

	/// Parses a decimal literal such as `"1.2345"`.
	///
	/// Surrounding whitespace is ignored. Empty strings and anything that does
	/// not parse to a finite non-negative float yield `None`.
	pub fn parse(raw: &str) -> Option<Self> {
		let trimmed = raw.trim();
		if trimmed.is_empty() {
			return None;
		}
		trimmed.parse::<f64>().ok().and_then(Self::new)
	}

	/// Returns the numeric value.
	pub fn value(self) -> f64 {
		self.0
	}
}

impl fmt::Display for Price {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.0)
	}
}

impl TryFrom<f64> for Price {
	type Error = String;

	fn try_from(value: f64) -> Result<Self, Self::Error> {
		Price::new(value).ok_or_else(|| format!("invalid price: {}", value))
	}
}

impl From<Price> for f64 {
	fn from(price: Price) -> Self {
		price.0
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_parse_decimal_literal() {
		assert_eq!(Price::parse("1.2345").map(Price::value), Some(1.2345));
		assert_eq!(Price::parse(" 0.005 ").map(Price::value), Some(0.005));
		assert_eq!(Price::parse("0").map(Price::value), Some(0.0));
	}

	#[test]
	fn test_parse_rejects_garbage() {
		assert!(Price::parse("").is_none());
		assert!(Price::parse("   ").is_none());
		assert!(Price::parse("abc").is_none());
		assert!(Price::parse("0.005abc").is_none());
		assert!(Price::parse("NaN").is_none());
		assert!(Price::parse("inf").is_none());
		assert!(Price::parse("-1.5").is_none());
	}

	#[test]
	fn test_new_rejects_non_finite() {
		assert!(Price::new(f64::NAN).is_none());
		assert!(Price::new(f64::INFINITY).is_none());
		assert!(Price::new(-0.1).is_none());
		assert_eq!(Price::new(3.14).map(Price::value), Some(3.14));
	}

	#[test]
	fn test_price_deserialize_validates() {
		let ok: Price = serde_json::from_str("2.5").unwrap();
		assert_eq!(ok.value(), 2.5);
		assert!(serde_json::from_str::<Price>("-2.5").is_err());
	}

	#[test]
	fn test_token_address_is_forwarded_verbatim() {
		let token = TokenAddress::from("  So11111111111111111111111111111111111111112 ");
		assert_eq!(token.as_str(), "  So11111111111111111111111111111111111111112 ");
		assert_eq!(
			serde_json::to_string(&TokenAddress::from("TKN1")).unwrap(),
			"\"TKN1\""
		);
	}
}
