//! Registry trait for self-registering price provider implementations.

/// Base trait for implementation registries.
///
/// Every provider module exposes a `Registry` struct implementing this trait,
/// pairing the name used under `[providers.<name>]` in the configuration
/// with the factory that builds the provider from that table.
pub trait ImplementationRegistry {
	/// The configuration name of this implementation, for example
	/// `"dexscreener"` for `[providers.dexscreener]`.
	const NAME: &'static str;

	/// The factory function type this implementation provides.
	type Factory;

	/// Returns the factory that builds this implementation from its
	/// configuration table.
	fn factory() -> Self::Factory;
}
