//! Configuration module for the shard-proxy gateway.
//!
//! This module provides structures and utilities for managing proxy
//! configuration. It supports loading configuration from TOML files and
//! provides validation to ensure all required configuration values are
//! properly set.

use proxy_types::{Observer, ShardId, METACHAIN_SHARD_ID};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

/// Errors that can occur during configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
	/// Error that occurs during file I/O operations.
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),
	/// Error that occurs when parsing TOML configuration.
	#[error("Configuration error: {0}")]
	Parse(String),
	/// Error that occurs when configuration validation fails.
	#[error("Validation error: {0}")]
	Validation(String),
}

impl From<toml::de::Error> for ConfigError {
	fn from(err: toml::de::Error) -> Self {
		// Extract just the message without the huge input dump
		ConfigError::Parse(err.message().to_string())
	}
}

/// Main configuration structure for the proxy.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
	/// Server and request settings.
	pub general: GeneralSettings,
	/// Shard topology of the fronted network.
	pub sharding: ShardingConfig,
	/// Backend observers, grouped by their declared shard.
	pub observers: Vec<ObserverConfig>,
	/// Optional external indexer for historical reads.
	pub indexer: Option<IndexerConfig>,
}

/// Server and request settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GeneralSettings {
	/// Port the proxy listens on.
	#[serde(default = "default_server_port")]
	pub server_port: u16,
	/// Timeout applied to every upstream call, in seconds.
	#[serde(default = "default_request_timeout")]
	pub request_timeout_seconds: u64,
	/// Human-readable prefix of client-facing addresses.
	#[serde(default = "default_address_hrp")]
	pub address_hrp: String,
}

fn default_server_port() -> u16 {
	8080
}

fn default_request_timeout() -> u64 {
	10
}

fn default_address_hrp() -> String {
	"erd".to_string()
}

/// Shard topology of the fronted network.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ShardingConfig {
	/// Number of regular shards, excluding the metachain.
	pub num_shards: u32,
}

/// One backend observer endpoint.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ObserverConfig {
	/// Shard the observer belongs to. `4294967295` names the metachain.
	pub shard_id: ShardId,
	/// Base URL of the observer's HTTP API.
	pub address: String,
}

impl ObserverConfig {
	/// Converts the config entry into the runtime observer record.
	pub fn to_observer(&self) -> Observer {
		Observer::new(self.address.clone(), self.shard_id)
	}
}

/// External indexer settings for historical transaction reads.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct IndexerConfig {
	/// Base URL of the Elasticsearch-compatible indexer.
	pub url: String,
}

/// Largest configuration file the parser accepts.
const MAX_CONFIG_BYTES: usize = 1 << 20;

/// Expands `${NAME}` and `${NAME:-fallback}` references against the
/// process environment.
///
/// A reference to an unset variable without a fallback fails validation.
/// Oversized inputs are rejected before the scan.
pub(crate) fn expand_env_refs(input: &str) -> Result<String, ConfigError> {
	if input.len() > MAX_CONFIG_BYTES {
		return Err(ConfigError::Validation(format!(
			"configuration of {} bytes exceeds the {} byte limit",
			input.len(),
			MAX_CONFIG_BYTES
		)));
	}

	let pattern = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)(?::-([^}]*))?\}")
		.map_err(|e| ConfigError::Parse(e.to_string()))?;

	// single forward pass, copying the text between references
	let mut expanded = String::with_capacity(input.len());
	let mut cursor = 0;
	for caps in pattern.captures_iter(input) {
		let Some(reference) = caps.get(0) else { continue };
		expanded.push_str(&input[cursor..reference.start()]);
		cursor = reference.end();

		let name = &caps[1];
		match std::env::var(name) {
			Ok(value) => expanded.push_str(&value),
			Err(_) => match caps.get(2) {
				Some(fallback) => expanded.push_str(fallback.as_str()),
				None => {
					return Err(ConfigError::Validation(format!(
						"environment variable '{}' is not set and has no fallback",
						name
					)));
				},
			},
		}
	}
	expanded.push_str(&input[cursor..]);

	Ok(expanded)
}

impl Config {
	/// Loads configuration from a TOML file, resolving environment
	/// variables and validating the result.
	pub fn from_file(path: &str) -> Result<Self, ConfigError> {
		let content = std::fs::read_to_string(path)?;
		content.parse()
	}

	/// Returns the configured observers as runtime records.
	pub fn observer_list(&self) -> Vec<Observer> {
		self.observers.iter().map(ObserverConfig::to_observer).collect()
	}

	/// Validates the configuration to ensure all required fields are
	/// properly set.
	fn validate(&self) -> Result<(), ConfigError> {
		if self.general.address_hrp.is_empty() {
			return Err(ConfigError::Validation("Address prefix cannot be empty".into()));
		}
		if self.general.request_timeout_seconds == 0 {
			return Err(ConfigError::Validation(
				"request_timeout_seconds must be greater than 0".into(),
			));
		}

		if self.sharding.num_shards == 0 {
			return Err(ConfigError::Validation(
				"At least one shard must be configured".into(),
			));
		}

		if self.observers.is_empty() {
			return Err(ConfigError::Validation(
				"At least one observer must be configured".into(),
			));
		}
		for observer in &self.observers {
			if observer.shard_id >= self.sharding.num_shards
				&& observer.shard_id != METACHAIN_SHARD_ID
			{
				return Err(ConfigError::Validation(format!(
					"Observer {} declares unknown shard {}",
					observer.address, observer.shard_id
				)));
			}
			url::Url::parse(&observer.address).map_err(|e| {
				ConfigError::Validation(format!(
					"Observer address '{}' is not a valid URL: {}",
					observer.address, e
				))
			})?;
		}

		if let Some(ref indexer) = self.indexer {
			url::Url::parse(&indexer.url).map_err(|e| {
				ConfigError::Validation(format!(
					"Indexer URL '{}' is not valid: {}",
					indexer.url, e
				))
			})?;
		}

		Ok(())
	}
}

/// Implementation of FromStr for Config to enable parsing from string.
///
/// Environment variables are resolved and the configuration is automatically
/// validated after parsing.
impl FromStr for Config {
	type Err = ConfigError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let resolved = expand_env_refs(s)?;
		let config: Config = toml::from_str(&resolved)?;
		config.validate()?;
		Ok(config)
	}
}
