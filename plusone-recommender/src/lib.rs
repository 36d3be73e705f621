//! Ranking and recommendation over a precomputed correlation matrix.
//!
//! The core ([`similarity`], [`popularity`], [`recommendation`]) is a set of
//! pure functions taking a [`matrix::CorrelationMatrix`] and an
//! [`catalog::EntryCatalog`] by reference. The remaining modules load those
//! inputs and serve the core over JSON-RPC 2.0 / NDJSON stdio.

pub mod catalog;
pub mod config;
pub mod context;
pub mod error;
pub mod loader;
pub mod matrix;
pub mod popularity;
pub mod protocol;
pub mod recommendation;
pub mod regression;
pub mod server;
pub mod similarity;
pub mod transport;
pub mod types;
