//! Redacted string type for provider API keys.
//!
//! `SecretString` zeroes its buffer on drop and never prints its contents,
//! so provider configuration can be logged with `{:?}` without leaking keys.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use zeroize::Zeroizing;

const REDACTED: &str = "***REDACTED***";

/// An API key or other credential that must not appear in logs.
#[derive(Clone)]
pub struct SecretString(Zeroizing<String>);

impl SecretString {
	/// Wraps an owned string.
	pub fn new(s: String) -> Self {
		Self(Zeroizing::new(s))
	}

	/// Exposes the secret, e.g. to set a request header.
	///
	/// Never log the returned value.
	pub fn expose_secret(&self) -> &str {
		&self.0
	}

	/// Exposes the secret to a closure, limiting the scope of the borrow.
	pub fn with_exposed<F, R>(&self, f: F) -> R
	where
		F: FnOnce(&str) -> R,
	{
		f(&self.0)
	}

	/// Returns true if the secret is empty or only whitespace.
	pub fn is_blank(&self) -> bool {
		self.0.trim().is_empty()
	}
}

impl fmt::Debug for SecretString {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "SecretString({})", REDACTED)
	}
}

impl fmt::Display for SecretString {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(REDACTED)
	}
}

impl From<String> for SecretString {
	fn from(s: String) -> Self {
		Self::new(s)
	}
}

impl From<&str> for SecretString {
	fn from(s: &str) -> Self {
		Self::new(s.to_string())
	}
}

impl PartialEq for SecretString {
	fn eq(&self, other: &Self) -> bool {
		self.0.as_str() == other.0.as_str()
	}
}

impl Eq for SecretString {}

// Serialized output is always redacted; keys only ever enter through config.
impl Serialize for SecretString {
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		serializer.serialize_str(REDACTED)
	}
}

impl<'de> Deserialize<'de> for SecretString {
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
	where
		D: Deserializer<'de>,
	{
		let s = String::deserialize(deserializer)?;
		Ok(SecretString::new(s))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_api_key_is_redacted() {
		let key = SecretString::from("birdeye-key-123");
		assert_eq!(format!("{:?}", key), "SecretString(***REDACTED***)");
		assert_eq!(format!("{}", key), "***REDACTED***");
		assert_eq!(serde_json::to_string(&key).unwrap(), "\"***REDACTED***\"");
		assert_eq!(key.expose_secret(), "birdeye-key-123");
	}

	#[test]
	fn test_with_exposed() {
		let key = SecretString::from("abc");
		assert_eq!(key.with_exposed(|s| s.len()), 3);
	}

	#[test]
	fn test_is_blank() {
		assert!(SecretString::from("").is_blank());
		assert!(SecretString::from("  ").is_blank());
		assert!(!SecretString::from("k").is_blank());
	}

	#[test]
	fn test_deserialize_keeps_value() {
		let key: SecretString = serde_json::from_str("\"k1\"").unwrap();
		assert_eq!(key, SecretString::from("k1"));
	}
}
