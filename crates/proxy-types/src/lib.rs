//! Common types module for the shard-proxy gateway.
//!
//! This module defines the core data types and structures shared by every
//! component of the proxy: addresses, observers, transactions, accounts,
//! blocks, the client response envelope and the query-option families that
//! decorate upstream URLs.

/// Account models returned by observers.
pub mod account;
/// Bech32 address codec.
pub mod address;
/// Block and hyperblock reply models.
pub mod block;
/// Client response envelope and return codes.
pub mod envelope;
/// Observer records and shard identifiers.
pub mod observer;
/// Query-option families and their URL builders.
pub mod options;
/// Transaction models for submission, retrieval and pool inspection.
pub mod transaction;

// Re-export all types for convenient access
pub use account::*;
pub use address::*;
pub use block::*;
pub use envelope::*;
pub use observer::*;
pub use options::*;
pub use transaction::*;
