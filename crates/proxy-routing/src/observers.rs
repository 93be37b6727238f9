//! Observer inventory with atomic reload.

use crate::RoutingError;
use parking_lot::{Mutex, RwLock};
use proxy_types::{Observer, ReloadResponse, ShardId, METACHAIN_SHARD_ID};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;

/// Source the inventory is (re)loaded from.
pub trait ObserverSource: Send + Sync {
	/// Produces the full observer list, in preference order.
	fn load(&self) -> Result<Vec<Observer>, RoutingError>;
}

/// Source backed by the proxy's TOML configuration file, re-read on every
/// load so a reload picks up edits.
pub struct ConfigFileSource {
	path: String,
}

impl ConfigFileSource {
	/// Creates a source reading the given configuration file.
	pub fn new(path: impl Into<String>) -> Self {
		Self { path: path.into() }
	}
}

impl ObserverSource for ConfigFileSource {
	fn load(&self) -> Result<Vec<Observer>, RoutingError> {
		let config = proxy_config::Config::from_file(&self.path)
			.map_err(|e| RoutingError::SourceUnavailable(e.to_string()))?;
		Ok(config.observer_list())
	}
}

/// Fixed source, replaceable at runtime. Used in tests and by embedders
/// that manage observer lists themselves.
#[derive(Default)]
pub struct StaticSource {
	observers: Mutex<Vec<Observer>>,
}

impl StaticSource {
	/// Creates a source serving the given list.
	pub fn new(observers: Vec<Observer>) -> Self {
		Self { observers: Mutex::new(observers) }
	}

	/// Replaces the list served by subsequent loads.
	pub fn replace(&self, observers: Vec<Observer>) {
		*self.observers.lock() = observers;
	}
}

impl ObserverSource for StaticSource {
	fn load(&self) -> Result<Vec<Observer>, RoutingError> {
		Ok(self.observers.lock().clone())
	}
}

impl<T: ObserverSource> ObserverSource for Arc<T> {
	fn load(&self) -> Result<Vec<Observer>, RoutingError> {
		self.as_ref().load()
	}
}

/// Immutable view of the inventory at one point in time.
struct Snapshot {
	by_shard: HashMap<ShardId, Vec<Observer>>,
	all: Vec<Observer>,
}

impl Snapshot {
	fn build(observers: Vec<Observer>, num_shards: u32) -> Result<Self, RoutingError> {
		if observers.is_empty() {
			return Err(RoutingError::SourceUnavailable(
				"the observer list is empty".to_string(),
			));
		}

		let mut by_shard: HashMap<ShardId, Vec<Observer>> = HashMap::new();
		for observer in &observers {
			if observer.shard_id >= num_shards && observer.shard_id != METACHAIN_SHARD_ID {
				return Err(RoutingError::SourceUnavailable(format!(
					"observer {} declares unknown shard {}",
					observer.address, observer.shard_id
				)));
			}
			by_shard.entry(observer.shard_id).or_default().push(observer.clone());
		}

		Ok(Self { by_shard, all: observers })
	}
}

/// Shard-aware pool of backend observers.
///
/// Readers take a consistent snapshot per call; `reload` installs a new
/// snapshot atomically, so concurrent readers observe either the old or
/// the new inventory, never a torn one. The lock is never held across an
/// upstream call.
pub struct ObserversRegistry {
	source: Box<dyn ObserverSource>,
	num_shards: u32,
	snapshot: RwLock<Arc<Snapshot>>,
}

impl std::fmt::Debug for ObserversRegistry {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("ObserversRegistry")
			.field("num_shards", &self.num_shards)
			.finish_non_exhaustive()
	}
}

impl ObserversRegistry {
	/// Builds a registry by loading the source once.
	pub fn new(source: Box<dyn ObserverSource>, num_shards: u32) -> Result<Self, RoutingError> {
		let snapshot = Snapshot::build(source.load()?, num_shards)?;
		Ok(Self {
			source,
			num_shards,
			snapshot: RwLock::new(Arc::new(snapshot)),
		})
	}

	/// Returns the observers of one shard, in failover preference order.
	pub fn observers(&self, shard: ShardId) -> Result<Vec<Observer>, RoutingError> {
		let snapshot = Arc::clone(&self.snapshot.read());
		match snapshot.by_shard.get(&shard) {
			Some(observers) if !observers.is_empty() => Ok(observers.clone()),
			_ => Err(RoutingError::MissingObserver(shard)),
		}
	}

	/// Returns every observer in the global preference order.
	pub fn all_observers(&self) -> Vec<Observer> {
		self.snapshot.read().all.clone()
	}

	/// Reloads the inventory from its source, replacing the snapshot
	/// atomically. A failed load leaves the previous snapshot in place.
	pub fn reload(&self) -> ReloadResponse {
		let observers = match self.source.load() {
			Ok(observers) => observers,
			Err(e) => {
				return ReloadResponse::failure("observers not reloaded", e.to_string());
			},
		};

		match Snapshot::build(observers, self.num_shards) {
			Ok(snapshot) => {
				let count = snapshot.all.len();
				*self.snapshot.write() = Arc::new(snapshot);
				info!(observers = count, "observer inventory reloaded");
				ReloadResponse::success(format!("loaded {} observers", count))
			},
			Err(e) => ReloadResponse::failure("observers not reloaded", e.to_string()),
		}
	}
}
