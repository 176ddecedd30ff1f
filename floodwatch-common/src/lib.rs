//! Shared utilities for the Floodwatch workspace.
//!
//! Currently this is only the centralised tracing/logging initialisation; it
//! lives in its own crate so the binary and integration tests share one
//! subscriber setup.

pub mod observability;
