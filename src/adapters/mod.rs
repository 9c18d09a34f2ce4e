//! Adapters - implementations of the ports against the outside world.
//!
//! - `storage` - the per-room JSON document store (filesystem + in-memory)
//! - `identity` - the external identity-store token check (HTTP + mock)
//! - `weather` - the NWS forecast pipeline
//! - `http` - the axum read/admin surfaces and the realtime WebSocket route

pub mod http;
pub mod identity;
pub mod storage;
pub mod weather;
