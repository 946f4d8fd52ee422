//! WebSocket layer — reconnecting, typed update streams.
//!
//! The reconnect state machine is hosted in two ways, compile-time
//! dispatched like the rest of the transport code:
//! - always → [`updates::Updates`], an event-driven core over the
//!   [`Transport`] and [`Scheduler`] seams
//! - `ws-wasm` feature → browser `WebSocket` + `gloo-timers` for that core (wasm.rs)
//! - `ws-native` feature → `tokio-tungstenite` background task (native.rs)
//!
//! This module defines the shared configuration, state and decoding.

pub mod address;
pub mod updates;

#[cfg(feature = "ws-native")]
pub mod native;

#[cfg(feature = "ws-wasm")]
pub mod wasm;

#[cfg(test)]
pub(crate) mod mock;

use std::time::Duration;

use serde::de::DeserializeOwned;

use crate::error::WsError;

pub use address::ws_url;
pub use updates::{Connection, ConnectionHandlers, Scheduler, Transport, Updates, UpdatesHandle};

/// Default delay between a dropped connection and the next attempt.
pub const DEFAULT_RETRY_INTERVAL_MS: u64 = 3000;

/// Configuration for one update stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdatesConfig {
    /// Streaming endpoint. `None` (or an empty string) keeps the client idle.
    pub url: Option<String>,
    /// Fixed delay between a drop and the next connection attempt.
    pub retry_interval_ms: u64,
}

impl Default for UpdatesConfig {
    fn default() -> Self {
        Self {
            url: None,
            retry_interval_ms: DEFAULT_RETRY_INTERVAL_MS,
        }
    }
}

impl UpdatesConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            ..Self::default()
        }
    }

    pub fn with_retry_interval_ms(mut self, retry_interval_ms: u64) -> Self {
        self.retry_interval_ms = retry_interval_ms;
        self
    }

    pub fn retry_interval(&self) -> Duration {
        Duration::from_millis(self.retry_interval_ms)
    }

    /// The endpoint, if one is configured and non-empty.
    pub fn endpoint(&self) -> Option<&str> {
        self.url.as_deref().filter(|url| !url.is_empty())
    }
}

/// Lifecycle state of an update stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum UpdatesState {
    /// No endpoint configured; nothing will ever happen.
    Idle = 0,
    /// Handshake in flight (native host only; the event-driven core reports
    /// `Connected` as soon as a connection object exists).
    Connecting = 1,
    /// A connection object is held.
    Connected = 2,
    /// Connection lost, a retry timer is pending.
    AwaitingRetry = 3,
    /// `close()` was called. Terminal.
    Closed = 4,
}

impl From<u8> for UpdatesState {
    fn from(value: u8) -> Self {
        match value {
            1 => UpdatesState::Connecting,
            2 => UpdatesState::Connected,
            3 => UpdatesState::AwaitingRetry,
            4 => UpdatesState::Closed,
            _ => UpdatesState::Idle,
        }
    }
}

/// Default decoder: plain serde deserialization of the parsed payload.
pub fn serde_decoder<T: DeserializeOwned>(value: serde_json::Value) -> Result<T, serde_json::Error> {
    serde_json::from_value(value)
}

/// Parse a raw text frame and run it through `decode`.
pub(crate) fn decode_message<T, F>(text: &str, decode: &F) -> Result<T, WsError>
where
    F: Fn(serde_json::Value) -> Result<T, serde_json::Error> + ?Sized,
{
    let value: serde_json::Value =
        serde_json::from_str(text).map_err(WsError::MalformedPayload)?;
    decode(value).map_err(WsError::Decode)
}
