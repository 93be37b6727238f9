//! Bech32 address codec.
//!
//! Client-facing addresses are bech32 strings carrying a configurable
//! human-readable prefix. The codec converts between that form and the raw
//! public-key bytes the shard coordinator operates on.

use bech32::{FromBase32, ToBase32, Variant};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of raw bytes behind every valid address.
pub const PUBKEY_LENGTH: usize = 32;

/// Errors that can occur while decoding or encoding an address.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressError {
	/// The string is not valid bech32.
	#[error("invalid bech32 address: {0}")]
	InvalidBech32(String),
	/// The human-readable prefix does not match the configured one.
	#[error("invalid address prefix '{actual}', expected '{expected}'")]
	InvalidPrefix { expected: String, actual: String },
	/// The decoded payload has the wrong length.
	#[error("invalid address length {0}, expected {PUBKEY_LENGTH}")]
	InvalidLength(usize),
}

/// Converts between bech32 addresses and raw public-key bytes.
///
/// The decoder is total on the configured prefix: every well-formed bech32
/// string carrying the prefix and a {PUBKEY_LENGTH}-byte payload decodes,
/// everything else is rejected with a typed error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddressCodec {
	hrp: String,
}

impl AddressCodec {
	/// Creates a codec for the given human-readable prefix.
	pub fn new(hrp: impl Into<String>) -> Self {
		Self { hrp: hrp.into() }
	}

	/// Returns the configured human-readable prefix.
	pub fn hrp(&self) -> &str {
		&self.hrp
	}

	/// Decodes a bech32 address into its raw public-key bytes.
	pub fn decode(&self, address: &str) -> Result<Vec<u8>, AddressError> {
		let (hrp, data, variant) =
			bech32::decode(address).map_err(|e| AddressError::InvalidBech32(e.to_string()))?;
		if variant != Variant::Bech32 {
			return Err(AddressError::InvalidBech32("bech32m is not accepted".to_string()));
		}
		if hrp != self.hrp {
			return Err(AddressError::InvalidPrefix {
				expected: self.hrp.clone(),
				actual: hrp,
			});
		}

		let bytes = Vec::<u8>::from_base32(&data)
			.map_err(|e| AddressError::InvalidBech32(e.to_string()))?;
		if bytes.len() != PUBKEY_LENGTH {
			return Err(AddressError::InvalidLength(bytes.len()));
		}

		Ok(bytes)
	}

	/// Encodes raw public-key bytes as a bech32 address.
	pub fn encode(&self, bytes: &[u8]) -> Result<String, AddressError> {
		if bytes.len() != PUBKEY_LENGTH {
			return Err(AddressError::InvalidLength(bytes.len()));
		}

		bech32::encode(&self.hrp, bytes.to_base32(), Variant::Bech32)
			.map_err(|e| AddressError::InvalidBech32(e.to_string()))
	}
}
