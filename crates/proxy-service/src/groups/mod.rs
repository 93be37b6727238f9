//! Route groups of the proxy API.

pub mod accounts;
pub mod actions;
pub mod blocks;
pub mod transactions;
