//! Scripted transport and manual clock for driving [`Updates`] in tests.
//!
//! [`Updates`]: crate::ws::Updates

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};
use std::time::Duration;

use crate::error::WsError;
use crate::ws::updates::{Connection, ConnectionHandlers, Scheduler, Transport};

// ─── Manual clock ────────────────────────────────────────────────────────────

struct PendingTimer {
    id: u64,
    due: Duration,
    callback: Box<dyn FnOnce()>,
}

#[derive(Default)]
struct Clock {
    now: Duration,
    next_id: u64,
    pending: Vec<PendingTimer>,
}

/// Scheduler whose time only moves when the test calls [`advance`].
///
/// [`advance`]: ManualScheduler::advance
#[derive(Clone, Default)]
pub(crate) struct ManualScheduler {
    clock: Rc<RefCell<Clock>>,
}

pub(crate) struct ManualTimer {
    id: u64,
    clock: Weak<RefCell<Clock>>,
}

impl Drop for ManualTimer {
    fn drop(&mut self) {
        if let Some(clock) = self.clock.upgrade() {
            clock.borrow_mut().pending.retain(|timer| timer.id != self.id);
        }
    }
}

impl ManualScheduler {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn now(&self) -> Duration {
        self.clock.borrow().now
    }

    pub(crate) fn pending(&self) -> usize {
        self.clock.borrow().pending.len()
    }

    /// Move time forward, firing due timers in order.
    pub(crate) fn advance(&self, by: Duration) {
        let target = self.now() + by;
        loop {
            let due = {
                let mut clock = self.clock.borrow_mut();
                let next = clock
                    .pending
                    .iter()
                    .enumerate()
                    .filter(|(_, timer)| timer.due <= target)
                    .min_by_key(|(_, timer)| (timer.due, timer.id))
                    .map(|(index, _)| index);
                match next {
                    Some(index) => {
                        let timer = clock.pending.remove(index);
                        clock.now = timer.due;
                        Some(timer.callback)
                    }
                    None => {
                        clock.now = target;
                        None
                    }
                }
            };
            match due {
                Some(callback) => callback(),
                None => break,
            }
        }
    }
}

impl Scheduler for ManualScheduler {
    type Timer = ManualTimer;

    fn schedule(&self, delay: Duration, callback: Box<dyn FnOnce()>) -> ManualTimer {
        let mut clock = self.clock.borrow_mut();
        let id = clock.next_id;
        clock.next_id += 1;
        let due = clock.now + delay;
        clock.pending.push(PendingTimer { id, due, callback });
        ManualTimer {
            id,
            clock: Rc::downgrade(&self.clock),
        }
    }
}

// ─── Scripted transport ──────────────────────────────────────────────────────

/// One simulated socket. The test drives it from the server side.
pub(crate) struct MockSocket {
    on_message: RefCell<Box<dyn FnMut(String)>>,
    on_close: RefCell<Box<dyn FnMut()>>,
    closed: Cell<bool>,
    close_requests: Cell<usize>,
    sync_close: bool,
}

impl MockSocket {
    /// Server sends a text frame.
    pub(crate) fn deliver(&self, text: &str) {
        if !self.closed.get() {
            (self.on_message.borrow_mut())(text.to_string());
        }
    }

    /// Replay a frame regardless of state, as a misbehaving transport would.
    pub(crate) fn deliver_even_if_closed(&self, text: &str) {
        (self.on_message.borrow_mut())(text.to_string());
    }

    /// Server or network drops the connection.
    pub(crate) fn drop_connection(&self) {
        self.closed.set(true);
        self.fire_close();
    }

    /// Emit a close notification, even a duplicate one.
    pub(crate) fn fire_close(&self) {
        (self.on_close.borrow_mut())();
    }

    pub(crate) fn is_closed(&self) -> bool {
        self.closed.get()
    }

    pub(crate) fn close_requests(&self) -> usize {
        self.close_requests.get()
    }
}

pub(crate) struct MockConnection(Rc<MockSocket>);

impl Connection for MockConnection {
    fn close(&self) {
        let socket = &self.0;
        socket.close_requests.set(socket.close_requests.get() + 1);
        if socket.closed.replace(true) {
            return;
        }
        if socket.sync_close {
            socket.fire_close();
        }
    }
}

#[derive(Default)]
struct Script {
    fail_open: bool,
    close_on_open: bool,
    sync_close: bool,
}

/// Transport that records every open and hands out scripted sockets.
#[derive(Clone)]
pub(crate) struct MockTransport {
    clock: ManualScheduler,
    script: Rc<RefCell<Script>>,
    opened: Rc<RefCell<Vec<(String, Duration)>>>,
    sockets: Rc<RefCell<Vec<Rc<MockSocket>>>>,
}

impl MockTransport {
    pub(crate) fn new(clock: &ManualScheduler) -> Self {
        Self {
            clock: clock.clone(),
            script: Rc::default(),
            opened: Rc::default(),
            sockets: Rc::default(),
        }
    }

    /// Every open attempt fails.
    pub(crate) fn fail_open(self) -> Self {
        self.script.borrow_mut().fail_open = true;
        self
    }

    /// Every socket reports a close before `open` returns.
    pub(crate) fn close_on_open(self) -> Self {
        self.script.borrow_mut().close_on_open = true;
        self
    }

    /// `Connection::close` fires `on_close` synchronously.
    pub(crate) fn sync_close(self) -> Self {
        self.script.borrow_mut().sync_close = true;
        self
    }

    pub(crate) fn open_count(&self) -> usize {
        self.opened.borrow().len()
    }

    /// `(url, time)` of every open attempt.
    pub(crate) fn opened(&self) -> Vec<(String, Duration)> {
        self.opened.borrow().clone()
    }

    pub(crate) fn socket(&self, index: usize) -> Rc<MockSocket> {
        Rc::clone(&self.sockets.borrow()[index])
    }
}

impl Transport for MockTransport {
    type Connection = MockConnection;

    fn open(&self, url: &str, handlers: ConnectionHandlers) -> Result<MockConnection, WsError> {
        self.opened
            .borrow_mut()
            .push((url.to_string(), self.clock.now()));

        let (fail_open, close_on_open, sync_close) = {
            let script = self.script.borrow();
            (script.fail_open, script.close_on_open, script.sync_close)
        };
        if fail_open {
            return Err(WsError::ConnectionFailed("scripted failure".into()));
        }

        let socket = Rc::new(MockSocket {
            on_message: RefCell::new(handlers.on_message),
            on_close: RefCell::new(handlers.on_close),
            closed: Cell::new(false),
            close_requests: Cell::new(0),
            sync_close,
        });
        self.sockets.borrow_mut().push(Rc::clone(&socket));

        if close_on_open {
            socket.drop_connection();
        }
        Ok(MockConnection(socket))
    }
}
