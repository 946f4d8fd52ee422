//! # BINP client
//!
//! Typed models and reconnecting live-update streams for the BINP internal
//! API, on both native and WASM targets.
//!
//! ## Architecture
//!
//! The crate is organized in layers:
//!
//! 1. **Core** — Shared newtypes, domain models, state containers (always available, WASM-safe)
//! 2. **WebSocket** — Reconnecting update streams. An event-driven core over
//!    transport/scheduler seams, hosted by `web-sys` (WASM) or a
//!    `tokio-tungstenite` task (native), chosen at compile time
//! 3. **High-Level Client** — `BinpClient` with nested sub-clients returning typed feeds
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use binp_client::prelude::*;
//!
//! let client = BinpClient::builder()
//!     .api_url("http://localhost:8000")
//!     .build()?;
//!
//! let feed = client.journals().headlines()?;
//! let stream = feed.spawn_native(move |headline: Headline| {
//!     println!("{} {}", headline.id, headline.operation);
//! });
//! // ...
//! stream.close();
//! ```

// ── Layer 1: Core ────────────────────────────────────────────────────────────

/// Shared newtypes and serde helpers used across all domains.
pub mod shared;

/// Domain modules (vertical slices): model types, state, sub-clients.
pub mod domain;

/// Unified error types.
pub mod error;

/// Network URL constants and deployment selection.
pub mod network;

// ── Layer 2: WebSocket ───────────────────────────────────────────────────────

/// Reconnecting update streams: config, address derivation, hosts.
pub mod ws;

// ── Layer 3: High-Level Client ───────────────────────────────────────────────

/// `BinpClient` — the primary entry point.
pub mod client;

// ── Prelude ──────────────────────────────────────────────────────────────────

pub mod prelude {
    // Shared newtypes
    pub use crate::shared::{JournalId, ServiceName};

    // Domain types
    pub use crate::domain::action::{ActionInfo, InvokeResult};
    pub use crate::domain::journal::{Headline, Journal, Query, Record};
    pub use crate::domain::service::{Info, Status};

    // State containers
    pub use crate::domain::journal::HeadlineList;
    pub use crate::domain::service::ServiceBoard;

    // Errors
    pub use crate::error::{AddressError, SdkError, WsError};

    // Network
    pub use crate::network::{Deployment, DEV_API_URL, PRODUCTION_API_URL};

    // Client + sub-clients
    pub use crate::client::{BinpClient, BinpClientBuilder, Feed, JournalsClient, ServicesClient};

    // WebSocket types
    pub use crate::ws::{
        ws_url, Connection, ConnectionHandlers, Scheduler, Transport, Updates, UpdatesConfig,
        UpdatesHandle, UpdatesState,
    };
    #[cfg(feature = "ws-native")]
    pub use crate::ws::native::{NativeUpdates, NativeUpdatesHandle};
    #[cfg(feature = "ws-wasm")]
    pub use crate::ws::wasm::{BrowserScheduler, BrowserTransport, BrowserUpdates};
}
