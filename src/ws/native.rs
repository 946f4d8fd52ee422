//! Native host for update streams — `tokio-tungstenite`.
//!
//! Same state machine as the event-driven core, expressed as one background
//! tokio task per stream:
//! - connect, then forward every decoded text frame to the subscriber
//! - on any disconnect, sleep the fixed retry interval and connect again
//! - `close()` flips a flag and wakes the task, which sends a close frame
//!   and exits; the flag is re-checked before every delivery and retry

use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use serde::de::DeserializeOwned;
use tokio::net::TcpStream;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

use crate::ws::{decode_message, serde_decoder, UpdatesConfig, UpdatesState};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

type Decoder<T> = Box<dyn Fn(serde_json::Value) -> Result<T, serde_json::Error> + Send>;
type Subscriber<T> = Box<dyn FnMut(T) + Send>;

// ─── Shared between handle and task ──────────────────────────────────────────

struct Shared {
    closed: AtomicBool,
    wake: Notify,
    state: AtomicU8,
}

impl Shared {
    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Record a lifecycle state unless the stream is already closed.
    fn set_state(&self, state: UpdatesState) {
        let _ = self
            .state
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |current| {
                (current != UpdatesState::Closed as u8).then_some(state as u8)
            });
    }

    fn close(&self) -> bool {
        if self.closed.swap(true, Ordering::SeqCst) {
            return false;
        }
        self.state.store(UpdatesState::Closed as u8, Ordering::SeqCst);
        self.wake.notify_one();
        true
    }
}

// ─── Disconnect reasons ──────────────────────────────────────────────────────

enum DisconnectReason {
    UserRequested,
    Dropped(String),
}

// ─── Background task state ───────────────────────────────────────────────────

struct TaskState<T> {
    url: String,
    retry_interval: Duration,
    decode: Decoder<T>,
    on_update: Subscriber<T>,
    shared: Arc<Shared>,
}

impl<T> TaskState<T> {
    fn deliver(&mut self, text: &str) {
        match decode_message(text, &*self.decode) {
            Ok(value) => {
                if !self.shared.is_closed() {
                    (self.on_update)(value);
                }
            }
            Err(e) => {
                tracing::warn!("Dropping update stream message: {} — raw: {}", e, text);
            }
        }
    }
}

// ─── Public NativeUpdates ────────────────────────────────────────────────────

/// Native reconnecting update stream.
///
/// Spawning requires a running tokio runtime. Dropping the handle closes
/// the stream.
pub struct NativeUpdates {
    url: Option<String>,
    shared: Arc<Shared>,
    task_handle: Option<JoinHandle<()>>,
}

impl NativeUpdates {
    /// Spawn a stream whose payloads deserialize straight into `T`.
    ///
    /// Starts connecting right away unless `config` has no endpoint, in which
    /// case no task is spawned and the stream stays idle.
    pub fn spawn<T>(config: UpdatesConfig, on_update: impl FnMut(T) + Send + 'static) -> Self
    where
        T: DeserializeOwned + Send + 'static,
    {
        Self::spawn_with_decoder(config, serde_decoder::<T>, on_update)
    }

    /// Spawn a stream with a custom decoder applied to each parsed payload.
    pub fn spawn_with_decoder<T>(
        config: UpdatesConfig,
        decode: impl Fn(serde_json::Value) -> Result<T, serde_json::Error> + Send + 'static,
        on_update: impl FnMut(T) + Send + 'static,
    ) -> Self
    where
        T: Send + 'static,
    {
        let shared = Arc::new(Shared {
            closed: AtomicBool::new(false),
            wake: Notify::new(),
            state: AtomicU8::new(UpdatesState::Idle as u8),
        });

        let Some(url) = config.endpoint().map(str::to_owned) else {
            tracing::debug!("No update stream endpoint configured, staying idle");
            return Self {
                url: None,
                shared,
                task_handle: None,
            };
        };

        shared.set_state(UpdatesState::Connecting);
        let state = TaskState {
            url: url.clone(),
            retry_interval: config.retry_interval(),
            decode: Box::new(decode),
            on_update: Box::new(on_update),
            shared: Arc::clone(&shared),
        };
        let handle = tokio::spawn(run_task(state));

        Self {
            url: Some(url),
            shared,
            task_handle: Some(handle),
        }
    }

    /// Stop the stream for good. Idempotent; safe to call from the
    /// subscriber through a [`NativeUpdatesHandle`].
    pub fn close(&self) {
        if self.shared.close() {
            tracing::info!("Closing update stream");
        }
    }

    /// Close and wait (up to five seconds) for the background task to finish.
    pub async fn shutdown(&mut self) {
        self.close();
        if let Some(handle) = self.task_handle.take() {
            let _ = tokio::time::timeout(Duration::from_secs(5), handle).await;
        }
    }

    /// A cloneable handle that can only close the stream.
    pub fn handle(&self) -> NativeUpdatesHandle {
        NativeUpdatesHandle {
            shared: Arc::clone(&self.shared),
        }
    }

    pub fn state(&self) -> UpdatesState {
        UpdatesState::from(self.shared.state.load(Ordering::SeqCst))
    }

    pub fn is_closed(&self) -> bool {
        self.shared.is_closed()
    }

    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }
}

impl Drop for NativeUpdates {
    fn drop(&mut self) {
        self.close();
    }
}

/// Close-only handle to a [`NativeUpdates`] stream.
#[derive(Clone)]
pub struct NativeUpdatesHandle {
    shared: Arc<Shared>,
}

impl NativeUpdatesHandle {
    pub fn close(&self) {
        if self.shared.close() {
            tracing::info!("Closing update stream");
        }
    }
}

// ─── Background task ─────────────────────────────────────────────────────────

async fn run_task<T>(mut state: TaskState<T>) {
    let shared = Arc::clone(&state.shared);

    loop {
        if shared.is_closed() {
            return;
        }

        // ── 1. Attempt connection ────────────────────────────────────────
        shared.set_state(UpdatesState::Connecting);
        tracing::info!("Opening update stream {}", state.url);

        let connected = tokio::select! {
            result = connect_async(state.url.as_str()) => result,
            _ = shared.wake.notified() => return,
        };

        // ── 2. Connected: deliver until the connection breaks ────────────
        match connected {
            Ok((ws_stream, _)) => {
                shared.set_state(UpdatesState::Connected);
                match run_connected(&mut state, ws_stream).await {
                    DisconnectReason::UserRequested => return,
                    DisconnectReason::Dropped(reason) => {
                        tracing::warn!("Update stream {} disconnected: {}", state.url, reason);
                    }
                }
            }
            Err(e) => {
                tracing::warn!("Failed to open update stream {}: {}", state.url, e);
            }
        }

        // ── 3. Fixed-interval retry ──────────────────────────────────────
        if shared.is_closed() {
            return;
        }
        shared.set_state(UpdatesState::AwaitingRetry);
        tracing::debug!(
            retry_in_ms = state.retry_interval.as_millis() as u64,
            "Scheduling update stream reconnect"
        );

        tokio::select! {
            _ = tokio::time::sleep(state.retry_interval) => {}
            _ = shared.wake.notified() => return,
        }
    }
}

/// The connected loop — runs until the connection breaks or the stream
/// is closed.
async fn run_connected<T>(state: &mut TaskState<T>, ws_stream: WsStream) -> DisconnectReason {
    let shared = Arc::clone(&state.shared);
    let (mut sink, mut stream) = ws_stream.split();

    loop {
        if shared.is_closed() {
            send_close(&mut sink).await;
            return DisconnectReason::UserRequested;
        }

        tokio::select! {
            msg = stream.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        let text_str: &str = text.as_ref();
                        state.deliver(text_str);
                    }
                    Some(Ok(Message::Ping(data))) => {
                        let _ = sink.send(Message::Pong(data)).await;
                    }
                    Some(Ok(Message::Close(frame))) => {
                        let (code, reason) = extract_close(frame.as_ref());
                        return DisconnectReason::Dropped(format!(
                            "closed by server: code={} reason={}",
                            code, reason
                        ));
                    }
                    Some(Ok(_)) => {} // Binary, Pong, Frame — ignore
                    Some(Err(e)) => return DisconnectReason::Dropped(e.to_string()),
                    None => return DisconnectReason::Dropped("Stream ended".into()),
                }
            }

            _ = shared.wake.notified() => {
                send_close(&mut sink).await;
                return DisconnectReason::UserRequested;
            }
        }
    }
}

// ─── Helpers ─────────────────────────────────────────────────────────────────

async fn send_close<S>(sink: &mut S)
where
    S: futures_util::Sink<Message> + Unpin,
{
    let _ = sink
        .send(Message::Close(Some(CloseFrame {
            code: CloseCode::Normal,
            reason: "Client disconnect".into(),
        })))
        .await;
}

/// Extract close code and reason from an optional CloseFrame.
fn extract_close(frame: Option<&CloseFrame>) -> (u16, String) {
    match frame {
        Some(f) => (f.code.into(), f.reason.to_string()),
        None => (1006, "No close frame".into()),
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_close_with_frame() {
        let frame = CloseFrame {
            code: CloseCode::Normal,
            reason: "goodbye".into(),
        };
        let (code, reason) = extract_close(Some(&frame));
        assert_eq!(code, 1000);
        assert_eq!(reason, "goodbye");
    }

    #[test]
    fn test_extract_close_no_frame() {
        let (code, reason) = extract_close(None);
        assert_eq!(code, 1006);
        assert_eq!(reason, "No close frame");
    }

    #[tokio::test]
    async fn test_idle_without_endpoint() {
        let updates = NativeUpdates::spawn(UpdatesConfig::default(), |_: serde_json::Value| {});
        assert!(updates.task_handle.is_none());
        assert_eq!(updates.state(), UpdatesState::Idle);
        assert_eq!(updates.url(), None);
    }

    #[tokio::test]
    async fn test_close_is_idempotent() {
        let updates = NativeUpdates::spawn(UpdatesConfig::new(""), |_: serde_json::Value| {});
        updates.close();
        updates.close();
        updates.handle().close();
        assert!(updates.is_closed());
        assert_eq!(updates.state(), UpdatesState::Closed);
    }

    #[test]
    fn test_set_state_never_leaves_closed() {
        let shared = Shared {
            closed: AtomicBool::new(false),
            wake: Notify::new(),
            state: AtomicU8::new(UpdatesState::Connected as u8),
        };
        assert!(shared.close());
        assert!(!shared.close());
        shared.set_state(UpdatesState::AwaitingRetry);
        assert_eq!(
            UpdatesState::from(shared.state.load(Ordering::SeqCst)),
            UpdatesState::Closed
        );
    }
}
