//! Common types for the token price resolver.
//!
//! This crate holds the data types shared by the configuration layer, the
//! price providers and the service binary, so that every component agrees
//! on what a token address and a price are.

/// Token address and price value types.
pub mod price;
/// Registry trait for self-registering provider implementations.
pub mod registry;
/// Redacted string type for API keys.
pub mod secret_string;
/// Configuration validation types for provider configuration tables.
pub mod validation;

pub use price::{Price, TokenAddress};
pub use registry::ImplementationRegistry;
pub use secret_string::SecretString;
pub use validation::*;
