//! High-level client — `BinpClient` with nested sub-client accessors.
//!
//! Each domain has its own sub-client in `domain/<name>/client.rs`.
//! This module keeps the builder, the resolved API base, and [`Feed`], the
//! typed handle for one streaming resource.

use crate::domain::journal::client::Journals;
use crate::domain::service::client::Services;
use crate::error::SdkError;
use crate::network::Deployment;
use crate::ws::address::{resolve_api_url, ws_url};
use crate::ws::{Scheduler, Transport, Updates, UpdatesConfig, DEFAULT_RETRY_INTERVAL_MS};

use serde::de::DeserializeOwned;
use std::marker::PhantomData;
use std::time::Duration;
use url::Url;

// Re-export sub-client types for convenience.
pub use crate::domain::journal::client::Journals as JournalsClient;
pub use crate::domain::service::client::Services as ServicesClient;

/// The primary entry point: knows where the API lives and hands out typed
/// feeds for each streaming resource.
///
/// Provides nested sub-client accessors for each domain:
/// `client.journals()`, `client.services()`.
#[derive(Debug, Clone)]
pub struct BinpClient {
    api_url: String,
    document_base: Option<Url>,
    retry_interval: Duration,
}

impl BinpClient {
    pub fn builder() -> BinpClientBuilder {
        BinpClientBuilder::default()
    }

    // ── Sub-client accessors ─────────────────────────────────────────────

    pub fn journals(&self) -> Journals<'_> {
        Journals { client: self }
    }

    pub fn services(&self) -> Services<'_> {
        Services { client: self }
    }

    // ── Config ───────────────────────────────────────────────────────────

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    pub fn retry_interval(&self) -> Duration {
        self.retry_interval
    }

    /// Absolute HTTP(S) address of a REST resource.
    pub fn http_url(&self, resource: &str) -> Result<Url, SdkError> {
        Ok(resolve_api_url(&self.api_url, resource, self.document_base.as_ref())?)
    }

    /// Typed feed for the streaming resource at `resource`.
    pub fn feed<T>(&self, resource: &str) -> Result<Feed<T>, SdkError> {
        let url = ws_url(&self.api_url, resource, self.document_base.as_ref())?;
        Ok(Feed {
            url,
            retry_interval: self.retry_interval,
            _marker: PhantomData,
        })
    }
}

// ═════════════════════════════════════════════════════════════════════════════
// Feed
// ═════════════════════════════════════════════════════════════════════════════

/// A streaming resource bound to the value type it emits.
///
/// A feed does not connect by itself; each `subscribe*` call starts an
/// independent stream.
pub struct Feed<T> {
    url: Url,
    retry_interval: Duration,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Clone for Feed<T> {
    fn clone(&self) -> Self {
        Self {
            url: self.url.clone(),
            retry_interval: self.retry_interval,
            _marker: PhantomData,
        }
    }
}

impl<T> std::fmt::Debug for Feed<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Feed")
            .field("url", &self.url.as_str())
            .field("retry_interval", &self.retry_interval)
            .finish()
    }
}

impl<T> Feed<T> {
    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn config(&self) -> UpdatesConfig {
        UpdatesConfig::new(self.url.as_str())
            .with_retry_interval_ms(self.retry_interval.as_millis() as u64)
    }
}

impl<T: DeserializeOwned + 'static> Feed<T> {
    /// Start a stream on a caller-supplied transport and scheduler.
    pub fn subscribe_with<X, S>(
        &self,
        transport: X,
        scheduler: S,
        on_update: impl FnMut(T) + 'static,
    ) -> Updates<T, X, S>
    where
        X: Transport + 'static,
        S: Scheduler + 'static,
    {
        Updates::new(self.config(), transport, scheduler, on_update)
    }

    /// Start a stream on the browser's `WebSocket` and timers.
    #[cfg(feature = "ws-wasm")]
    pub fn subscribe_browser(
        &self,
        on_update: impl FnMut(T) + 'static,
    ) -> crate::ws::wasm::BrowserUpdates<T> {
        crate::ws::wasm::subscribe(self.config(), on_update)
    }
}

impl<T: DeserializeOwned + Send + 'static> Feed<T> {
    /// Start a stream on a tokio background task.
    #[cfg(feature = "ws-native")]
    pub fn spawn_native(
        &self,
        on_update: impl FnMut(T) + Send + 'static,
    ) -> crate::ws::native::NativeUpdates {
        crate::ws::native::NativeUpdates::spawn(self.config(), on_update)
    }
}

// ═════════════════════════════════════════════════════════════════════════════
// Builder
// ═════════════════════════════════════════════════════════════════════════════

pub struct BinpClientBuilder {
    api_url: Option<String>,
    deployment: Deployment,
    document_base: Option<Url>,
    retry_interval: Duration,
}

impl Default for BinpClientBuilder {
    fn default() -> Self {
        Self {
            api_url: None,
            deployment: Deployment::current(),
            document_base: None,
            retry_interval: Duration::from_millis(DEFAULT_RETRY_INTERVAL_MS),
        }
    }
}

impl BinpClientBuilder {
    /// Explicit API base; overrides the deployment's default.
    pub fn api_url(mut self, url: &str) -> Self {
        self.api_url = Some(url.to_string());
        self
    }

    pub fn deployment(mut self, deployment: Deployment) -> Self {
        self.deployment = deployment;
        self
    }

    /// Base a relative API base is resolved against. In the browser this
    /// defaults to `document.baseURI`.
    pub fn document_base(mut self, base: Url) -> Self {
        self.document_base = Some(base);
        self
    }

    pub fn retry_interval(mut self, interval: Duration) -> Self {
        self.retry_interval = interval;
        self
    }

    pub fn build(self) -> Result<BinpClient, SdkError> {
        let api_url = self
            .api_url
            .unwrap_or_else(|| self.deployment.api_url().to_string());

        #[cfg(feature = "ws-wasm")]
        let document_base = self
            .document_base
            .or_else(crate::ws::wasm::document_base_uri);
        #[cfg(not(feature = "ws-wasm"))]
        let document_base = self.document_base;

        // Fail early on a base that can never produce an address.
        resolve_api_url(&api_url, "", document_base.as_ref())?;

        tracing::debug!(api_url = %api_url, "Built BINP client");
        Ok(BinpClient {
            api_url,
            document_base,
            retry_interval: self.retry_interval,
        })
    }
}
