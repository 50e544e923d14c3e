//! RealtimeHub - accepts connections for one role and routes their events.

use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, PoisonError, RwLock};

use futures::{Stream, StreamExt};
use serde::Serialize;
use serde_json::Value;
use tokio::sync::mpsc;

use crate::domain::foundation::ConnectionId;
use crate::domain::realtime::EventKind;

use super::connection::{Connection, Disconnect, ListenerId, Outbound};

/// Default capacity of each connection's outbound queue.
pub const DEFAULT_OUTBOUND_BUFFER: usize = 256;

/// Called once per accepted connection, before it starts dispatching.
pub type ConnectionHandler<E> = Arc<dyn Fn(&Arc<Connection<E>>) + Send + Sync>;

/// A transport-level event for one connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundFrame {
    Text(String),
    Binary(Vec<u8>),
    /// The peer closed the socket.
    Closed,
    /// The transport failed.
    Failed(String),
}

/// Accepts connections of one role (`E`) and owns them until they end.
///
/// Instances are independent: tests and each role build their own.
pub struct RealtimeHub<E: EventKind> {
    role: &'static str,
    outbound_buffer: usize,
    connection_handlers: RwLock<Vec<ConnectionHandler<E>>>,
    connections: RwLock<HashMap<ConnectionId, Arc<Connection<E>>>>,
}

impl<E: EventKind> RealtimeHub<E> {
    pub fn new(role: &'static str) -> Self {
        Self {
            role,
            outbound_buffer: DEFAULT_OUTBOUND_BUFFER,
            connection_handlers: RwLock::new(Vec::new()),
            connections: RwLock::new(HashMap::new()),
        }
    }

    pub fn with_outbound_buffer(mut self, capacity: usize) -> Self {
        self.outbound_buffer = capacity.max(1);
        self
    }

    /// Capacity of each connection's outbound queue.
    pub fn outbound_buffer(&self) -> usize {
        self.outbound_buffer
    }

    /// Subscribes to the `connection` lifecycle event.
    pub fn on_connection(&self, handler: impl Fn(&Arc<Connection<E>>) + Send + Sync + 'static) {
        self.connection_handlers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Arc::new(handler));
    }

    /// Registers a listener on one connection.
    pub fn on(
        &self,
        connection: &Connection<E>,
        event: E,
        listener: impl Fn(&Value) + Send + Sync + 'static,
    ) -> ListenerId {
        connection.on(event, listener)
    }

    /// Wraps a new transport connection.
    ///
    /// Runs the `connection` handlers while the connection is still
    /// `Connecting`, then opens it. The returned receiver is the transport's
    /// outbound queue.
    pub fn accept(&self) -> (Arc<Connection<E>>, mpsc::Receiver<Outbound>) {
        let (tx, rx) = mpsc::channel(self.outbound_buffer);
        let connection = Arc::new(Connection::new(tx));

        self.connections
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(connection.id(), Arc::clone(&connection));

        let handlers: Vec<ConnectionHandler<E>> = self
            .connection_handlers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        for handler in handlers {
            if catch_unwind(AssertUnwindSafe(|| handler(&connection))).is_err() {
                tracing::error!(role = self.role, connection_id = %connection.id(), "Connection handler panicked");
            }
        }

        connection.open();
        tracing::debug!(role = self.role, connection_id = %connection.id(), "Connection opened");
        (connection, rx)
    }

    /// Applies one transport event. Returns false once the connection ended.
    pub fn handle_frame(&self, connection: &Arc<Connection<E>>, frame: InboundFrame) -> bool {
        match frame {
            InboundFrame::Text(text) => connection.dispatch_text(&text),
            InboundFrame::Binary(bytes) => connection.dispatch_bytes(&bytes),
            InboundFrame::Closed => {
                self.disconnect(connection, Disconnect::Closed);
                return false;
            }
            InboundFrame::Failed(reason) => {
                self.disconnect(connection, Disconnect::Errored(reason));
                return false;
            }
        }
        true
    }

    /// Pumps `frames` into the connection in arrival order until it ends.
    ///
    /// A stream that simply runs dry counts as a clean close.
    pub async fn run<S>(&self, connection: Arc<Connection<E>>, mut frames: S)
    where
        S: Stream<Item = InboundFrame> + Unpin,
    {
        while let Some(frame) = frames.next().await {
            if !self.handle_frame(&connection, frame) {
                return;
            }
        }
        self.disconnect(&connection, Disconnect::Closed);
    }

    /// Ends a connection and forgets it. Idempotent.
    pub fn disconnect(&self, connection: &Arc<Connection<E>>, how: Disconnect) {
        self.connections
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&connection.id());
        connection.finish(how);
        tracing::debug!(role = self.role, connection_id = %connection.id(), "Connection ended");
    }

    pub fn connection_count(&self) -> usize {
        self.connections
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn connection(&self, id: &ConnectionId) -> Option<Arc<Connection<E>>> {
        self.connections
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .cloned()
    }

    /// Sends to every open connection, returning how many accepted it.
    pub fn broadcast(&self, event: &str, data: &impl Serialize) -> usize {
        let targets: Vec<Arc<Connection<E>>> = self
            .connections
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .cloned()
            .collect();

        targets
            .iter()
            .filter(|conn| match conn.send(event, data) {
                Ok(()) => true,
                Err(e) => {
                    tracing::debug!(role = self.role, connection_id = %conn.id(), error = %e, "Broadcast skipped connection");
                    false
                }
            })
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::realtime::{AgentEvent, ConnectionState};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn hub() -> RealtimeHub<AgentEvent> {
        RealtimeHub::new("agent")
    }

    #[test]
    fn connection_handlers_run_before_open() {
        let hub = hub();
        let seen = Arc::new(std::sync::Mutex::new(Vec::new()));
        let s = Arc::clone(&seen);
        hub.on_connection(move |conn| s.lock().unwrap().push(conn.state()));

        let (conn, _rx) = hub.accept();

        assert_eq!(*seen.lock().unwrap(), vec![ConnectionState::Connecting]);
        assert_eq!(conn.state(), ConnectionState::Open);
        assert_eq!(hub.connection_count(), 1);
    }

    #[test]
    fn connection_event_fires_once_per_accept() {
        let hub = hub();
        let count = Arc::new(AtomicUsize::new(0));
        let c = Arc::clone(&count);
        hub.on_connection(move |_| {
            c.fetch_add(1, Ordering::SeqCst);
        });

        let _a = hub.accept();
        let _b = hub.accept();

        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn closed_frame_unregisters_and_stops() {
        let hub = hub();
        let (conn, _rx) = hub.accept();

        assert!(hub.handle_frame(&conn, InboundFrame::Text("junk".into())));
        assert!(!hub.handle_frame(&conn, InboundFrame::Closed));

        assert_eq!(hub.connection_count(), 0);
        assert_eq!(conn.state(), ConnectionState::Closed);
    }

    #[test]
    fn failed_frame_marks_errored() {
        let hub = hub();
        let (conn, _rx) = hub.accept();
        let errors = Arc::new(AtomicUsize::new(0));
        let e = Arc::clone(&errors);
        conn.on_error(move |_| {
            e.fetch_add(1, Ordering::SeqCst);
        });

        hub.handle_frame(&conn, InboundFrame::Failed("reset by peer".into()));
        hub.disconnect(&conn, Disconnect::Closed);

        assert_eq!(errors.load(Ordering::SeqCst), 1);
        assert_eq!(conn.state(), ConnectionState::Errored);
    }

    #[test]
    fn panicking_connection_handler_does_not_block_accept() {
        let hub = hub();
        hub.on_connection(|_| panic!("bad handler"));

        let (conn, _rx) = hub.accept();

        assert_eq!(conn.state(), ConnectionState::Open);
    }

    #[tokio::test]
    async fn run_dispatches_in_order_and_closes_when_stream_ends() {
        let hub = hub();
        let (conn, _rx) = hub.accept();
        let seen = Arc::new(std::sync::Mutex::new(Vec::new()));
        let s = Arc::clone(&seen);
        conn.on(AgentEvent::DynamicData, move |d| s.lock().unwrap().push(d["n"].clone()));

        let frames = futures::stream::iter(
            (1..=3).map(|n| InboundFrame::Text(format!(r#"{{"e":"dynamicData","d":{{"n":{}}}}}"#, n))),
        );
        hub.run(Arc::clone(&conn), frames).await;

        assert_eq!(*seen.lock().unwrap(), vec![1, 2, 3]);
        assert_eq!(conn.state(), ConnectionState::Closed);
    }

    #[test]
    fn broadcast_reaches_every_open_connection() {
        let hub = hub();
        let (_a, mut rx_a) = hub.accept();
        let (_b, mut rx_b) = hub.accept();

        assert_eq!(hub.broadcast("heartbeat", &serde_json::json!({})), 2);
        assert!(matches!(rx_a.try_recv(), Ok(Outbound::Text(_))));
        assert!(matches!(rx_b.try_recv(), Ok(Outbound::Text(_))));
    }
}
