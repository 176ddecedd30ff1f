//! Twitter/X API integration.
//!
//! Submodules provide the HTTP client wrapper, strongly typed response
//! models, the tweet normalizer, and keyword search over fetched timelines.

pub mod client;
pub mod normalize;
pub mod search;
pub mod types;

pub use client::TwitterApi;
