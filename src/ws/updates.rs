//! Event-driven reconnecting update stream.
//!
//! [`Updates`] owns one subscription to a server-pushed stream. It opens a
//! connection through a [`Transport`], decodes every text frame into `T`,
//! hands it to the subscriber and, whenever the connection goes away for any
//! reason, asks a [`Scheduler`] to try again after a fixed interval. Retries
//! never stop until [`Updates::close`] is called.
//!
//! Everything runs on one thread as reactions to transport and timer events
//! (the browser model). State lives in an `Rc<RefCell<_>>`; no borrow is held
//! while calling into the transport, the decoder or the subscriber, so
//! `close()` may be called from anywhere, including from inside the
//! subscriber callback.
//!
//! Each opened connection gets an epoch number. Events carrying an old epoch,
//! and every event after `close()`, are ignored.

use std::cell::RefCell;
use std::rc::{Rc, Weak};
use std::time::Duration;

use serde::de::DeserializeOwned;

use crate::error::WsError;
use crate::ws::{decode_message, serde_decoder, UpdatesConfig, UpdatesState};

// ─── Seams ───────────────────────────────────────────────────────────────────

/// Callbacks a transport invokes for one connection.
pub struct ConnectionHandlers {
    /// A text frame arrived.
    pub on_message: Box<dyn FnMut(String)>,
    /// The connection is gone: clean close, error or network drop alike.
    pub on_close: Box<dyn FnMut()>,
}

/// A live connection handle.
pub trait Connection {
    /// Request a close. Implementations may report it through `on_close`
    /// either synchronously or later.
    fn close(&self);
}

/// Opens persistent, message-oriented connections.
pub trait Transport {
    type Connection: Connection;

    fn open(&self, url: &str, handlers: ConnectionHandlers)
        -> Result<Self::Connection, WsError>;
}

/// One-shot timers.
///
/// `schedule` must not run the callback before it returns. Dropping the
/// returned timer cancels it.
pub trait Scheduler {
    type Timer;

    fn schedule(&self, delay: Duration, callback: Box<dyn FnOnce()>) -> Self::Timer;
}

// ─── State ───────────────────────────────────────────────────────────────────

type Decoder<T> = Rc<dyn Fn(serde_json::Value) -> Result<T, serde_json::Error>>;
type Subscriber<T> = Rc<RefCell<dyn FnMut(T)>>;

struct Inner<T, X: Transport, S: Scheduler> {
    url: Option<String>,
    retry_interval: Duration,
    transport: Rc<X>,
    scheduler: S,
    decode: Decoder<T>,
    on_update: Subscriber<T>,
    connection: Option<X::Connection>,
    retry: Option<S::Timer>,
    epoch: u64,
    closed: bool,
}

impl<T, X: Transport, S: Scheduler> Drop for Inner<T, X, S> {
    fn drop(&mut self) {
        if let Some(connection) = self.connection.take() {
            connection.close();
        }
    }
}

type Shared<T, X, S> = Rc<RefCell<Inner<T, X, S>>>;
type WeakShared<T, X, S> = Weak<RefCell<Inner<T, X, S>>>;

// ─── Public Updates ──────────────────────────────────────────────────────────

/// A reconnecting, typed update stream.
///
/// Cloning yields another handle to the same stream. Dropping the last
/// handle closes the current connection and cancels any pending retry.
pub struct Updates<T, X: Transport, S: Scheduler> {
    inner: Shared<T, X, S>,
}

impl<T, X, S> Updates<T, X, S>
where
    T: 'static,
    X: Transport + 'static,
    S: Scheduler + 'static,
{
    /// Start a stream whose payloads deserialize straight into `T`.
    ///
    /// Connects immediately unless `config` has no endpoint, in which case
    /// the stream stays idle for good.
    pub fn new(
        config: UpdatesConfig,
        transport: X,
        scheduler: S,
        on_update: impl FnMut(T) + 'static,
    ) -> Self
    where
        T: DeserializeOwned,
    {
        Self::with_decoder(config, transport, scheduler, serde_decoder::<T>, on_update)
    }

    /// Start a stream with a custom decoder applied to each parsed payload.
    pub fn with_decoder(
        config: UpdatesConfig,
        transport: X,
        scheduler: S,
        decode: impl Fn(serde_json::Value) -> Result<T, serde_json::Error> + 'static,
        on_update: impl FnMut(T) + 'static,
    ) -> Self {
        let url = config.endpoint().map(str::to_owned);
        if url.is_none() {
            tracing::debug!("No update stream endpoint configured, staying idle");
        }

        let inner = Rc::new(RefCell::new(Inner {
            url,
            retry_interval: config.retry_interval(),
            transport: Rc::new(transport),
            scheduler,
            decode: Rc::new(decode),
            on_update: Rc::new(RefCell::new(on_update)),
            connection: None,
            retry: None,
            epoch: 0,
            closed: false,
        }));

        connect(&Rc::downgrade(&inner));
        Self { inner }
    }

    /// Stop the stream for good.
    ///
    /// Closes the connection if one is held and cancels a pending retry.
    /// Afterwards no connection attempt is made and the subscriber is not
    /// called again. Calling it more than once does nothing.
    pub fn close(&self) {
        close_shared(&self.inner);
    }

    /// A weak handle that can close the stream without keeping it alive.
    ///
    /// Use this inside the subscriber callback instead of a clone, which
    /// would form a reference cycle.
    pub fn handle(&self) -> UpdatesHandle<T, X, S> {
        UpdatesHandle {
            inner: Rc::downgrade(&self.inner),
        }
    }

    pub fn state(&self) -> UpdatesState {
        let this = self.inner.borrow();
        if this.closed {
            UpdatesState::Closed
        } else if this.connection.is_some() {
            UpdatesState::Connected
        } else if this.retry.is_some() {
            UpdatesState::AwaitingRetry
        } else {
            UpdatesState::Idle
        }
    }

    pub fn is_closed(&self) -> bool {
        self.inner.borrow().closed
    }

    pub fn url(&self) -> Option<String> {
        self.inner.borrow().url.clone()
    }
}

impl<T, X: Transport, S: Scheduler> Clone for Updates<T, X, S> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

/// Weak counterpart of [`Updates`], see [`Updates::handle`].
pub struct UpdatesHandle<T, X: Transport, S: Scheduler> {
    inner: WeakShared<T, X, S>,
}

impl<T, X, S> UpdatesHandle<T, X, S>
where
    X: Transport,
    S: Scheduler,
{
    /// Close the stream if it is still alive.
    pub fn close(&self) {
        if let Some(inner) = self.inner.upgrade() {
            close_shared(&inner);
        }
    }
}

impl<T, X: Transport, S: Scheduler> Clone for UpdatesHandle<T, X, S> {
    fn clone(&self) -> Self {
        Self {
            inner: Weak::clone(&self.inner),
        }
    }
}

// ─── Event handlers ──────────────────────────────────────────────────────────

fn connect<T, X, S>(weak: &WeakShared<T, X, S>)
where
    T: 'static,
    X: Transport + 'static,
    S: Scheduler + 'static,
{
    let Some(inner) = weak.upgrade() else {
        return;
    };

    let (transport, url, epoch) = {
        let mut this = inner.borrow_mut();
        this.retry = None;
        if this.closed {
            return;
        }
        let Some(url) = this.url.clone() else {
            return;
        };
        this.epoch += 1;
        (Rc::clone(&this.transport), url, this.epoch)
    };

    tracing::info!("Opening update stream {}", url);

    let handlers = ConnectionHandlers {
        on_message: {
            let weak = weak.clone();
            Box::new(move |text: String| handle_message(&weak, epoch, &text))
        },
        on_close: {
            let weak = weak.clone();
            Box::new(move || handle_close(&weak, epoch))
        },
    };

    match transport.open(&url, handlers) {
        Ok(connection) => {
            let mut this = inner.borrow_mut();
            if !this.closed && this.epoch == epoch {
                this.connection = Some(connection);
                return;
            }
            // Closed or dropped while the transport was opening it.
            drop(this);
            connection.close();
        }
        Err(e) => {
            tracing::warn!("Failed to open update stream {}: {}", url, e);
            handle_close(weak, epoch);
        }
    }
}

fn handle_close<T, X, S>(weak: &WeakShared<T, X, S>, epoch: u64)
where
    T: 'static,
    X: Transport + 'static,
    S: Scheduler + 'static,
{
    let Some(inner) = weak.upgrade() else {
        return;
    };

    let mut this = inner.borrow_mut();
    if this.closed || this.epoch != epoch {
        return;
    }

    let lost = this.connection.take();
    this.epoch += 1;

    let delay = this.retry_interval;
    tracing::warn!(
        retry_in_ms = delay.as_millis() as u64,
        "Update stream disconnected: {}",
        this.url.as_deref().unwrap_or_default()
    );

    let retry = weak.clone();
    let timer = this
        .scheduler
        .schedule(delay, Box::new(move || connect(&retry)));
    this.retry = Some(timer);

    drop(this);
    drop(lost);
}

fn handle_message<T, X, S>(weak: &WeakShared<T, X, S>, epoch: u64, text: &str)
where
    X: Transport,
    S: Scheduler,
{
    let Some(inner) = weak.upgrade() else {
        return;
    };

    let (decode, on_update) = {
        let this = inner.borrow();
        if this.closed || this.epoch != epoch {
            return;
        }
        (Rc::clone(&this.decode), Rc::clone(&this.on_update))
    };
    drop(inner);

    match decode_message(text, &*decode) {
        Ok(value) => match on_update.try_borrow_mut() {
            Ok(mut callback) => (&mut *callback)(value),
            Err(_) => tracing::error!("Update subscriber re-entered, dropping message"),
        },
        Err(e) => {
            tracing::warn!("Dropping update stream message: {} — raw: {}", e, text);
        }
    }
}

fn close_shared<T, X: Transport, S: Scheduler>(inner: &Shared<T, X, S>) {
    let (connection, retry) = {
        let mut this = inner.borrow_mut();
        if this.closed {
            return;
        }
        this.closed = true;
        this.epoch += 1;
        (this.connection.take(), this.retry.take())
    };

    tracing::info!("Closing update stream");
    drop(retry);
    if let Some(connection) = connection {
        connection.close();
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
