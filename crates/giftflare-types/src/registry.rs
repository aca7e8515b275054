//! Registry trait for self-registering implementations.
//!
//! Each pluggable module (storage, directory, channels, couriers) provides
//! a Registry struct implementing this trait, tying its configuration name
//! to a factory function.

/// Base trait for implementation registries.
///
/// The NAME constant must match the key used in the TOML configuration,
/// for example "memory" for `storage.implementations.memory` or
/// "simulated" for `couriers.implementations.simulated`.
pub trait ImplementationRegistry {
	/// The name used in configuration files to reference this implementation.
	const NAME: &'static str;

	/// The factory function type this implementation provides.
	type Factory;

	/// Get the factory function for this implementation.
	fn factory() -> Self::Factory;
}
