//! Facade aggregating the processors behind the HTTP handlers.

use async_trait::async_trait;
use proxy_core::{
	AccountProcessor, BlockProcessor, BlocksProcessor, HyperblockProcessor, ProcessError,
	TransactionProcessor,
};
use proxy_routing::ObserversRegistry;
use proxy_types::ReloadResponse;
use std::sync::Arc;

/// Collaborator seam for the faucet. The proxy itself never signs
/// anything; a deployment that wants `/transaction/send-user-funds` plugs
/// an implementation in here.
#[async_trait]
pub trait FaucetHandler: Send + Sync {
	/// Builds, signs and dispatches a funds transfer to the receiver.
	async fn send_user_funds(
		&self,
		receiver: &str,
		value: Option<String>,
	) -> Result<(), ProcessError>;
}

/// One object the HTTP layer holds on to: every processor plus the
/// inventory handle for reloads.
pub struct ProxyFacade {
	pub accounts: AccountProcessor,
	pub transactions: TransactionProcessor,
	pub block: BlockProcessor,
	pub blocks: BlocksProcessor,
	pub hyperblocks: HyperblockProcessor,
	registry: Arc<ObserversRegistry>,
	faucet: Option<Arc<dyn FaucetHandler>>,
}

impl ProxyFacade {
	/// Creates the facade over the given processors.
	pub fn new(
		accounts: AccountProcessor,
		transactions: TransactionProcessor,
		block: BlockProcessor,
		blocks: BlocksProcessor,
		hyperblocks: HyperblockProcessor,
		registry: Arc<ObserversRegistry>,
	) -> Self {
		Self {
			accounts,
			transactions,
			block,
			blocks,
			hyperblocks,
			registry,
			faucet: None,
		}
	}

	/// Plugs in a faucet collaborator.
	pub fn with_faucet(mut self, faucet: Arc<dyn FaucetHandler>) -> Self {
		self.faucet = Some(faucet);
		self
	}

	/// Reloads the observer inventory from its configured source.
	pub fn reload_observers(&self) -> ReloadResponse {
		self.registry.reload()
	}

	/// Dispatches a faucet transfer, failing when no faucet is configured.
	pub async fn send_user_funds(
		&self,
		receiver: &str,
		value: Option<String>,
	) -> Result<(), ProcessError> {
		match &self.faucet {
			Some(faucet) => faucet.send_user_funds(receiver, value).await,
			None => Err(ProcessError::FaucetNotEnabled),
		}
	}
}
