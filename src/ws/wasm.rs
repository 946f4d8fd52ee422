//! WASM host for [`Updates`] using `web-sys::WebSocket`.
//!
//! - `web-sys::WebSocket` + `wasm-bindgen` closures as the [`Transport`]
//! - `gloo-timers` one-shot timeouts as the [`Scheduler`]
//! - Page base URI lookup for relative API bases
//!
//! The browser already runs everything on one event loop, which is exactly
//! the model the event-driven core expects.

use std::time::Duration;

use gloo_timers::callback::Timeout;
use serde::de::DeserializeOwned;
use url::Url;
use wasm_bindgen::prelude::*;
use web_sys::{CloseEvent, ErrorEvent, MessageEvent, WebSocket};

use crate::error::WsError;
use crate::ws::updates::{Connection, ConnectionHandlers, Scheduler, Transport, Updates};
use crate::ws::UpdatesConfig;

/// An update stream running on the browser's `WebSocket` and timers.
pub type BrowserUpdates<T> = Updates<T, BrowserTransport, BrowserScheduler>;

/// Start a browser update stream decoding payloads into `T`.
pub fn subscribe<T>(config: UpdatesConfig, on_update: impl FnMut(T) + 'static) -> BrowserUpdates<T>
where
    T: DeserializeOwned + 'static,
{
    Updates::new(config, BrowserTransport, BrowserScheduler, on_update)
}

/// The page's base URI (`document.baseURI`), if running in a document.
pub fn document_base_uri() -> Option<Url> {
    let document = web_sys::window()?.document()?;
    let base = document.base_uri().ok()??;
    Url::parse(&base).ok()
}

// ─── Transport ───────────────────────────────────────────────────────────────

/// Opens browser WebSockets.
#[derive(Debug, Clone, Copy, Default)]
pub struct BrowserTransport;

/// A browser WebSocket together with the closures it calls into.
///
/// Dropping it detaches the handlers so the socket can no longer reach
/// freed closures.
pub struct BrowserConnection {
    ws: WebSocket,
    _onmessage: Closure<dyn FnMut(MessageEvent)>,
    _onclose: Closure<dyn FnMut(CloseEvent)>,
    _onerror: Closure<dyn FnMut(ErrorEvent)>,
}

impl Transport for BrowserTransport {
    type Connection = BrowserConnection;

    fn open(&self, url: &str, handlers: ConnectionHandlers) -> Result<BrowserConnection, WsError> {
        let ws = WebSocket::new(url)
            .map_err(|e| WsError::ConnectionFailed(extract_js_error(&e)))?;

        let ConnectionHandlers {
            mut on_message,
            mut on_close,
        } = handlers;

        let onmessage = Closure::<dyn FnMut(_)>::new(move |e: MessageEvent| {
            if let Ok(txt) = e.data().dyn_into::<js_sys::JsString>() {
                on_message(txt.into());
            }
        });
        ws.set_onmessage(Some(onmessage.as_ref().unchecked_ref()));

        // The browser always follows an error with a close event; the close
        // handler is what drives reconnection.
        let onerror = Closure::<dyn FnMut(_)>::new(move |e: ErrorEvent| {
            tracing::warn!("WebSocket error: {}", extract_js_error(&e.error()));
        });
        ws.set_onerror(Some(onerror.as_ref().unchecked_ref()));

        let onclose = Closure::<dyn FnMut(_)>::new(move |e: CloseEvent| {
            tracing::info!("WebSocket closed: code={}, reason={}", e.code(), e.reason());
            on_close();
        });
        ws.set_onclose(Some(onclose.as_ref().unchecked_ref()));

        Ok(BrowserConnection {
            ws,
            _onmessage: onmessage,
            _onclose: onclose,
            _onerror: onerror,
        })
    }
}

impl Connection for BrowserConnection {
    fn close(&self) {
        match self.ws.ready_state() {
            WebSocket::CONNECTING | WebSocket::OPEN => {
                if let Err(e) = self.ws.close() {
                    tracing::warn!("Failed to close WebSocket: {}", extract_js_error(&e));
                }
            }
            _ => {}
        }
    }
}

impl Drop for BrowserConnection {
    fn drop(&mut self) {
        self.ws.set_onmessage(None);
        self.ws.set_onerror(None);
        self.ws.set_onclose(None);
    }
}

// ─── Scheduler ───────────────────────────────────────────────────────────────

/// `setTimeout`-backed timers; dropping the `Timeout` clears it.
#[derive(Debug, Clone, Copy, Default)]
pub struct BrowserScheduler;

impl Scheduler for BrowserScheduler {
    type Timer = Timeout;

    fn schedule(&self, delay: Duration, callback: Box<dyn FnOnce()>) -> Timeout {
        let millis = u32::try_from(delay.as_millis()).unwrap_or(u32::MAX);
        Timeout::new(millis, callback)
    }
}

// ─── Helpers ─────────────────────────────────────────────────────────────────

fn extract_js_error(err: &JsValue) -> String {
    if let Some(error) = err.dyn_ref::<js_sys::Error>() {
        let name = error.name().as_string().unwrap_or_else(|| "Error".to_string());
        let message = error.message().as_string().unwrap_or_default();

        if !message.is_empty() {
            return format!("{}: {}", name, message);
        } else {
            return name;
        }
    }

    if let Some(s) = err.as_string() {
        if !s.is_empty() {
            return s;
        }
    }

    if err.is_undefined() {
        return "undefined error".to_string();
    }

    if err.is_null() {
        return "null error".to_string();
    }

    "Unknown WebSocket error".to_string()
}
