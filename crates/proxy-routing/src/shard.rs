//! Shard assignment for account addresses.

use crate::RoutingError;
use proxy_types::{ShardId, METACHAIN_SHARD_ID};

/// Maps raw address bytes to shard identifiers.
///
/// The assignment reads the low-order bits of the last address byte. Two
/// masks are precomputed from the shard count: the wide mask covers the
/// next power of two, and when the masked value lands beyond the active
/// shards the narrow mask is applied instead. System accounts (an all-zero
/// public key) belong to the metachain.
#[derive(Debug, Clone, Copy)]
pub struct ShardCoordinator {
	num_shards: u32,
	mask_high: u32,
	mask_low: u32,
}

impl ShardCoordinator {
	/// Creates a coordinator for the given number of regular shards.
	pub fn new(num_shards: u32) -> Result<Self, RoutingError> {
		if num_shards == 0 {
			return Err(RoutingError::InvalidShardCount);
		}

		let bits = 32 - (num_shards - 1).leading_zeros();
		let mask_high = (1u32 << bits) - 1;
		let mask_low = (1u32 << bits.saturating_sub(1)) - 1;

		Ok(Self { num_shards, mask_high, mask_low })
	}

	/// Returns the number of regular shards.
	pub fn number_of_shards(&self) -> u32 {
		self.num_shards
	}

	/// Returns every shard identifier the proxy serves, metachain included.
	pub fn shard_ids(&self) -> Vec<ShardId> {
		let mut ids: Vec<ShardId> = (0..self.num_shards).collect();
		ids.push(METACHAIN_SHARD_ID);
		ids
	}

	/// Computes the shard an address belongs to.
	///
	/// Deterministic and side-effect-free; the result is always in
	/// `[0, num_shards)` or `METACHAIN_SHARD_ID`.
	pub fn compute_shard_id(&self, address_bytes: &[u8]) -> Result<ShardId, RoutingError> {
		let Some(&last) = address_bytes.last() else {
			return Err(RoutingError::BadAddress);
		};

		if address_bytes.iter().all(|b| *b == 0) {
			return Ok(METACHAIN_SHARD_ID);
		}

		let last = u32::from(last);
		let mut shard = last & self.mask_high;
		if shard >= self.num_shards {
			shard = last & self.mask_low;
		}

		Ok(shard)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn address_ending_in(last: u8) -> Vec<u8> {
		let mut bytes = vec![3u8; 32];
		bytes[31] = last;
		bytes
	}

	#[test]
	fn test_shard_is_in_range_and_deterministic() {
		let coordinator = ShardCoordinator::new(3).unwrap();

		for last in 0..=255u8 {
			let bytes = address_ending_in(last);
			let shard = coordinator.compute_shard_id(&bytes).unwrap();
			assert!(shard < 3, "byte {} mapped to shard {}", last, shard);
			assert_eq!(shard, coordinator.compute_shard_id(&bytes).unwrap());
		}
	}

	#[test]
	fn test_low_bits_select_shard() {
		let coordinator = ShardCoordinator::new(2).unwrap();
		assert_eq!(coordinator.compute_shard_id(&address_ending_in(0)).unwrap(), 0);
		assert_eq!(coordinator.compute_shard_id(&address_ending_in(1)).unwrap(), 1);
		assert_eq!(coordinator.compute_shard_id(&address_ending_in(2)).unwrap(), 0);
		assert_eq!(coordinator.compute_shard_id(&address_ending_in(0xFF)).unwrap(), 1);
	}

	#[test]
	fn test_mask_narrowing_with_non_power_of_two() {
		let coordinator = ShardCoordinator::new(3).unwrap();
		// wide mask is 0b11; 3 & 0b11 == 3 >= 3, so the narrow mask applies
		assert_eq!(coordinator.compute_shard_id(&address_ending_in(3)).unwrap(), 1);
		assert_eq!(coordinator.compute_shard_id(&address_ending_in(2)).unwrap(), 2);
	}

	#[test]
	fn test_single_shard_maps_everything_to_zero() {
		let coordinator = ShardCoordinator::new(1).unwrap();
		for last in [0u8, 1, 17, 255] {
			assert_eq!(coordinator.compute_shard_id(&address_ending_in(last)).unwrap(), 0);
		}
	}

	#[test]
	fn test_system_account_goes_to_metachain() {
		let coordinator = ShardCoordinator::new(3).unwrap();
		let shard = coordinator.compute_shard_id(&[0u8; 32]).unwrap();
		assert_eq!(shard, METACHAIN_SHARD_ID);
	}

	#[test]
	fn test_empty_address_rejected() {
		let coordinator = ShardCoordinator::new(3).unwrap();
		assert_eq!(coordinator.compute_shard_id(&[]).unwrap_err(), RoutingError::BadAddress);
	}

	#[test]
	fn test_zero_shards_rejected() {
		assert_eq!(ShardCoordinator::new(0).unwrap_err(), RoutingError::InvalidShardCount);
	}

	#[test]
	fn test_shard_ids_include_metachain() {
		let coordinator = ShardCoordinator::new(2).unwrap();
		assert_eq!(coordinator.shard_ids(), vec![0, 1, METACHAIN_SHARD_ID]);
	}
}
