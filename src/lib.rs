//! # Multicall
//!
//! Batches many contract calls and native transfers into a single transaction against a deployed
//! aggregator contract, and decodes the per-call return data the aggregator emits.
//!
//! - [`codec`] encodes call data and decodes aggregator results.
//! - [`batch`] lowers transfers and custom calls into [`types::CallDescriptor`]s.
//! - [`transactions`] drives a batch through estimation, submission and confirmation.
//! - [`MulticallClient`] ties these together.

pub mod batch;
pub mod cli;
pub mod client;
pub mod codec;
pub mod config;
pub mod constants;
pub mod error;
pub mod transactions;
pub mod types;

pub use client::MulticallClient;
