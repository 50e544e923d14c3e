//! One accepted realtime connection and its listener table.

use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tokio::sync::{mpsc, Notify};

use crate::domain::foundation::{ConnectionId, StateMachine};
use crate::domain::realtime::{encode, ConnectionState, Envelope, EventKind, ServerEvent};

/// Callback for one inbound event.
pub type Listener = Arc<dyn Fn(&Value) + Send + Sync>;

type CloseListener = Box<dyn FnOnce() + Send>;
type ErrorListener = Box<dyn FnOnce(&str) + Send>;

/// Handle returned by `Connection::on`, used to remove the listener again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// Frames queued for the transport writer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outbound {
    Text(String),
    /// Ask the transport to close the socket.
    Close,
}

/// How a connection ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Disconnect {
    Closed,
    Errored(String),
}

#[derive(Debug, Error)]
pub enum SendError {
    #[error("connection is closed")]
    Closed,

    #[error("outbound buffer full, message dropped")]
    Backpressure,

    #[error("failed to encode message: {0}")]
    Encode(#[from] serde_json::Error),
}

struct ListenerTable<E> {
    events: HashMap<E, Vec<(ListenerId, Listener)>>,
    on_close: Vec<CloseListener>,
    on_error: Vec<ErrorListener>,
}

impl<E> Default for ListenerTable<E> {
    fn default() -> Self {
        Self {
            events: HashMap::new(),
            on_close: Vec::new(),
            on_error: Vec::new(),
        }
    }
}

/// A live socket wrapped with envelope decoding and per-connection dispatch.
///
/// # Invariants
///
/// - Listeners for one event run in registration order, synchronously.
/// - Close and error listeners each run at most once; afterwards the
///   listener table is dropped and nothing is dispatched again.
/// - Once `close` is called nothing new is queued; the writer flushes what
///   is already buffered and then closes the socket.
pub struct Connection<E: EventKind> {
    id: ConnectionId,
    state: Mutex<ConnectionState>,
    /// `None` once the connection has ended.
    listeners: Mutex<Option<ListenerTable<E>>>,
    outbound: mpsc::Sender<Outbound>,
    next_listener: AtomicU64,
    closing: AtomicBool,
    close_requested: Notify,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    // Listeners never run under these locks, so poisoning carries no torn state.
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl<E: EventKind> Connection<E> {
    pub(crate) fn new(outbound: mpsc::Sender<Outbound>) -> Self {
        Self {
            id: ConnectionId::new(),
            state: Mutex::new(ConnectionState::Connecting),
            listeners: Mutex::new(Some(ListenerTable::default())),
            outbound,
            next_listener: AtomicU64::new(0),
            closing: AtomicBool::new(false),
            close_requested: Notify::new(),
        }
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    pub fn state(&self) -> ConnectionState {
        *lock(&self.state)
    }

    /// Registers `listener` for `event`, after any already registered.
    ///
    /// On an ended connection this is a no-op.
    pub fn on(&self, event: E, listener: impl Fn(&Value) + Send + Sync + 'static) -> ListenerId {
        let id = ListenerId(self.next_listener.fetch_add(1, Ordering::Relaxed));
        if let Some(table) = lock(&self.listeners).as_mut() {
            table
                .events
                .entry(event)
                .or_default()
                .push((id, Arc::new(listener)));
        }
        id
    }

    /// Removes a listener, returning whether it was registered.
    pub fn off(&self, event: E, id: ListenerId) -> bool {
        let mut guard = lock(&self.listeners);
        let Some(list) = guard.as_mut().and_then(|t| t.events.get_mut(&event)) else {
            return false;
        };
        let before = list.len();
        list.retain(|(other, _)| *other != id);
        before != list.len()
    }

    /// Runs once when the connection ends, whether cleanly or not.
    pub fn on_close(&self, listener: impl FnOnce() + Send + 'static) {
        if let Some(table) = lock(&self.listeners).as_mut() {
            table.on_close.push(Box::new(listener));
        }
    }

    /// Runs once if the transport fails, before the close listeners.
    pub fn on_error(&self, listener: impl FnOnce(&str) + Send + 'static) {
        if let Some(table) = lock(&self.listeners).as_mut() {
            table.on_error.push(Box::new(listener));
        }
    }

    /// Number of listeners currently registered for `event`.
    pub fn listener_count(&self, event: E) -> usize {
        lock(&self.listeners)
            .as_ref()
            .and_then(|t| t.events.get(&event))
            .map_or(0, Vec::len)
    }

    /// Queues an envelope for the client without waiting.
    pub fn send(&self, event: &str, data: &impl Serialize) -> Result<(), SendError> {
        if self.is_closing() {
            return Err(SendError::Closed);
        }
        let text = encode(event, data)?;
        self.outbound
            .try_send(Outbound::Text(text))
            .map_err(|e| match e {
                mpsc::error::TrySendError::Full(_) => SendError::Backpressure,
                mpsc::error::TrySendError::Closed(_) => SendError::Closed,
            })
    }

    pub fn send_event(&self, event: ServerEvent, data: &impl Serialize) -> Result<(), SendError> {
        self.send(event.name(), data)
    }

    /// Asks the transport to close the socket after flushing queued frames.
    ///
    /// The request survives a full outbound buffer: the writer also watches
    /// the closing flag and closes once the queue is drained.
    pub fn close(&self) {
        if self.closing.swap(true, Ordering::SeqCst) {
            return;
        }
        if let Err(mpsc::error::TrySendError::Full(_)) = self.outbound.try_send(Outbound::Close) {
            tracing::warn!(connection_id = %self.id, "Outbound buffer full, closing after drain");
        }
        self.close_requested.notify_one();
    }

    pub fn is_closing(&self) -> bool {
        self.closing.load(Ordering::SeqCst)
    }

    /// Resolves once `close` has been called.
    pub(crate) async fn close_requested(&self) {
        if self.is_closing() {
            return;
        }
        self.close_requested.notified().await;
    }

    pub(crate) fn open(&self) {
        let mut state = lock(&self.state);
        if let Ok(next) = state.transition_to(ConnectionState::Open) {
            *state = next;
        }
    }

    /// Decodes one text frame and dispatches it.
    ///
    /// Malformed envelopes are logged and dropped; the connection stays open.
    pub(crate) fn dispatch_text(&self, text: &str) {
        self.dispatch(Envelope::<E>::decode(text));
    }

    pub(crate) fn dispatch_bytes(&self, bytes: &[u8]) {
        self.dispatch(Envelope::<E>::decode_bytes(bytes));
    }

    fn dispatch(&self, decoded: Result<Envelope<E>, crate::domain::realtime::MalformedEnvelope>) {
        if !self.state().accepts_messages() {
            return;
        }
        let envelope = match decoded {
            Ok(envelope) => envelope,
            Err(e) => {
                tracing::debug!(connection_id = %self.id, error = %e, "Dropping malformed envelope");
                return;
            }
        };

        // Snapshot so listeners may register or remove listeners themselves.
        let listeners: Vec<Listener> = match lock(&self.listeners).as_ref() {
            Some(table) => table
                .events
                .get(&envelope.event)
                .map(|list| list.iter().map(|(_, l)| Arc::clone(l)).collect())
                .unwrap_or_default(),
            None => return,
        };

        for listener in listeners {
            if catch_unwind(AssertUnwindSafe(|| listener(&envelope.data))).is_err() {
                tracing::error!(
                    connection_id = %self.id,
                    event = envelope.event.name(),
                    "Listener panicked"
                );
            }
        }
    }

    /// Ends the connection and notifies listeners. Idempotent.
    pub(crate) fn finish(&self, how: Disconnect) {
        {
            let mut state = lock(&self.state);
            let target = match how {
                Disconnect::Closed => ConnectionState::Closed,
                Disconnect::Errored(_) => ConnectionState::Errored,
            };
            match state.transition_to(target) {
                Ok(next) => *state = next,
                Err(_) => return,
            }
        }

        let Some(table) = lock(&self.listeners).take() else {
            return;
        };

        if let Disconnect::Errored(reason) = &how {
            tracing::warn!(connection_id = %self.id, error = %reason, "Connection errored");
            for listener in table.on_error {
                if catch_unwind(AssertUnwindSafe(|| listener(reason.as_str()))).is_err() {
                    tracing::error!(connection_id = %self.id, "Error listener panicked");
                }
            }
        }
        for listener in table.on_close {
            if catch_unwind(AssertUnwindSafe(listener)).is_err() {
                tracing::error!(connection_id = %self.id, "Close listener panicked");
            }
        }
    }
}
