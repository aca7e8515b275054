//! Main entry point for the Giftflare coordinator service.
//!
//! This binary assembles the order lifecycle coordinator from its
//! pluggable implementations - order store, profile directory,
//! notification channels, and courier providers - and exposes the five
//! coordinator operations over HTTP.

use clap::Parser;
use giftflare_config::Config;
use giftflare_core::{CoordinatorBuilder, CoordinatorFactories, OrderCoordinator};
use giftflare_types::LifecycleEvent;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::broadcast;

mod apis;
mod server;

// Import implementations from individual crates
use giftflare_courier::implementations::http::create_courier as create_http_courier;
use giftflare_courier::implementations::simulated::create_courier as create_simulated_courier;
use giftflare_directory::implementations::fixture::create_directory as create_fixture_directory;
use giftflare_directory::implementations::http::create_directory as create_http_directory;
use giftflare_notify::implementations::http_email::create_channel as create_email_channel;
use giftflare_notify::implementations::http_sms::create_channel as create_sms_channel;
use giftflare_notify::implementations::log::create_channel as create_log_channel;
use giftflare_storage::implementations::file::create_store as create_file_store;
use giftflare_storage::implementations::memory::create_store as create_memory_store;

/// Command-line arguments for the coordinator service.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
	/// Path to configuration file
	#[arg(short, long, default_value = "config.toml")]
	config: PathBuf,

	/// Log level (trace, debug, info, warn, error)
	#[arg(short, long, default_value = "info")]
	log_level: String,
}

/// Main entry point for the coordinator service.
///
/// This function:
/// 1. Parses command-line arguments
/// 2. Initializes logging infrastructure
/// 3. Loads configuration from file
/// 4. Builds the coordinator with all implementations
/// 5. Serves the HTTP API until interrupted
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	let args = Args::parse();

	// Initialize tracing with env filter
	use tracing_subscriber::{fmt, EnvFilter};

	let default_directive = args.log_level.to_string();
	let env_filter =
		EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

	fmt()
		.with_env_filter(env_filter)
		.with_target(true)
		.init();

	tracing::info!("Started coordinator");

	// Load configuration
	let config_path = args
		.config
		.to_str()
		.ok_or("configuration path is not valid UTF-8")?;
	let config = Config::from_file(config_path)?;
	tracing::info!("Loaded configuration [{}]", config.service.id);

	let api_config = config.api.clone();

	// Build coordinator with implementations
	let coordinator = Arc::new(build_coordinator(config)?);

	// Surface lifecycle degradations in the logs even without an
	// external events consumer
	let _event_logger = spawn_event_logger(&coordinator);

	let api_enabled = api_config.as_ref().is_some_and(|api| api.enabled);

	if api_enabled {
		let api_config = api_config.unwrap();
		tokio::select! {
			result = server::start_server(api_config, Arc::clone(&coordinator)) => {
				tracing::info!("API server finished");
				result?;
			}
			_ = tokio::signal::ctrl_c() => {}
		}
	} else {
		tracing::warn!(
			"API server disabled - coordinator only reachable through the event bus"
		);
		tokio::signal::ctrl_c().await?;
	}

	tracing::info!("Stopped coordinator");
	Ok(())
}

/// Macro to create a factory HashMap with the appropriate type aliases
macro_rules! create_factory_map {
    ($interface:path, $error:path, $( $name:literal => $factory:expr ),* $(,)?) => {{
        let mut factories = std::collections::HashMap::new();
        $(
            factories.insert(
                $name.to_string(),
                $factory as fn(&toml::Value) -> Result<Box<dyn $interface>, $error>
            );
        )*
        factories
    }};
}

/// Builds the coordinator with all necessary implementations.
///
/// This function wires up the concrete implementations for:
/// - Order stores (in-memory, file-based)
/// - Profile directories (config-seeded fixture, HTTP)
/// - Notification channels (HTTP email, HTTP SMS, log)
/// - Courier providers (simulated, HTTP)
fn build_coordinator(config: Config) -> Result<OrderCoordinator, Box<dyn std::error::Error>> {
	let builder = CoordinatorBuilder::new(config);

	let store_factories = create_factory_map!(
		giftflare_storage::OrderStoreInterface,
		giftflare_storage::StoreError,
		"file" => create_file_store,
		"memory" => create_memory_store,
	);

	let directory_factories = create_factory_map!(
		giftflare_directory::DirectoryInterface,
		giftflare_directory::DirectoryError,
		"fixture" => create_fixture_directory,
		"http" => create_http_directory,
	);

	let channel_factories = create_factory_map!(
		giftflare_notify::ChannelInterface,
		giftflare_notify::ChannelError,
		"http_email" => create_email_channel,
		"http_sms" => create_sms_channel,
		"log" => create_log_channel,
	);

	let courier_factories = create_factory_map!(
		giftflare_courier::CourierInterface,
		giftflare_courier::CourierError,
		"simulated" => create_simulated_courier,
		"http" => create_http_courier,
	);

	let factories = CoordinatorFactories {
		store_factories,
		directory_factories,
		channel_factories,
		courier_factories,
	};

	Ok(builder.build(factories)?)
}

/// Logs lifecycle events so degraded side effects show up in operations
/// tooling even when nothing else subscribes to the bus.
fn spawn_event_logger(coordinator: &OrderCoordinator) -> tokio::task::JoinHandle<()> {
	let mut events = coordinator.event_bus().subscribe();

	tokio::spawn(async move {
		loop {
			match events.recv().await {
				Ok(LifecycleEvent::NotificationDegraded {
					order_id,
					channel,
					error,
				}) => {
					tracing::warn!(%order_id, %channel, %error, "Notification degraded");
				}
				Ok(LifecycleEvent::BookingFailed { order_id, reason }) => {
					tracing::warn!(%order_id, %reason, "Courier booking failed");
				}
				Ok(event) => {
					tracing::debug!(?event, "Lifecycle event");
				}
				Err(broadcast::error::RecvError::Lagged(missed)) => {
					tracing::warn!(missed, "Event logger lagged behind the bus");
				}
				Err(broadcast::error::RecvError::Closed) => break,
			}
		}
	})
}
