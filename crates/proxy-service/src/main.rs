//! Main entry point for the shard-proxy service.
//!
//! This binary fronts a sharded network with a single REST API: it loads
//! the observer inventory from configuration, wires the processors over
//! the shared HTTP forwarder and serves the client routes.

use clap::Parser;
use proxy_config::Config;
use proxy_core::{
	AccountProcessor, BaseProcessor, BlockProcessor, BlocksProcessor, HyperblockProcessor,
	TransactionProcessor,
};
use proxy_forwarder::HttpForwarder;
use proxy_indexer::implementations::disabled::DisabledConnector;
use proxy_indexer::implementations::elastic::ElasticConnector;
use proxy_indexer::StorageConnector;
use proxy_routing::{ConfigFileSource, ObserversRegistry, ShardCoordinator};
use proxy_types::AddressCodec;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

mod error;
mod facade;
mod groups;
mod params;
mod server;
mod shared;

use facade::ProxyFacade;

/// Command-line arguments for the proxy service.
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

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	let args = Args::parse();

	// Initialize tracing with env filter
	use tracing_subscriber::{fmt, EnvFilter};

	let default_directive = args.log_level.to_string();
	let env_filter =
		EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

	fmt().with_env_filter(env_filter).with_target(true).init();

	tracing::info!("Started proxy");

	let config_path = args
		.config
		.to_str()
		.ok_or("configuration path is not valid UTF-8")?
		.to_string();
	let config = Config::from_file(&config_path)?;
	tracing::info!(
		shards = config.sharding.num_shards,
		observers = config.observers.len(),
		"Loaded configuration"
	);

	let facade = Arc::new(build_facade(&config, config_path)?);

	server::start_server(config.general.server_port, facade).await?;

	tracing::info!("Stopped proxy");
	Ok(())
}

/// Wires the processors over the shared routing and forwarding
/// collaborators.
fn build_facade(
	config: &Config,
	config_path: String,
) -> Result<ProxyFacade, Box<dyn std::error::Error>> {
	let timeout = Duration::from_secs(config.general.request_timeout_seconds);
	let codec = AddressCodec::new(config.general.address_hrp.clone());

	let coordinator = ShardCoordinator::new(config.sharding.num_shards)?;
	let registry = Arc::new(ObserversRegistry::new(
		Box::new(ConfigFileSource::new(config_path)),
		config.sharding.num_shards,
	)?);
	let forwarder = Arc::new(HttpForwarder::new(timeout)?);

	let base: Arc<dyn proxy_core::CoreProcessor> =
		Arc::new(BaseProcessor::new(coordinator, Arc::clone(&registry), forwarder));

	let connector: Arc<dyn StorageConnector> = match &config.indexer {
		Some(indexer) => {
			tracing::info!(url = %indexer.url, "external indexer enabled");
			Arc::new(ElasticConnector::new(&indexer.url, timeout)?)
		},
		None => Arc::new(DisabledConnector),
	};

	Ok(ProxyFacade::new(
		AccountProcessor::new(Arc::clone(&base), codec.clone(), connector),
		TransactionProcessor::new(Arc::clone(&base), codec),
		BlockProcessor::new(Arc::clone(&base)),
		BlocksProcessor::new(Arc::clone(&base)),
		HyperblockProcessor::new(Arc::clone(&base)),
		registry,
	))
}
