//! Domain modules organized as vertical slices.
//!
//! Each sub-module contains:
//! - `mod.rs` — Model types, serialized exactly as the backend sends them
//! - `state.rs` — State containers with update methods (for stream-driven data)
//! - `client.rs` — Sub-client returning typed feeds

pub mod action;
pub mod journal;
pub mod service;
