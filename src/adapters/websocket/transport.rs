//! Axum websocket transport for `RealtimeHub`.
//!
//! Handles the upgrade and bridges one socket to one hub connection:
//! 1. Split the socket
//! 2. Accept a hub connection (runs `connection` handlers)
//! 3. Writer task drains the outbound queue into the socket, and closes it
//!    once the connection asks to close
//! 4. Reader maps frames to `InboundFrame` and feeds the hub
//! 5. Whichever side ends first ends the connection

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::response::Response;
use futures::{Sink, SinkExt, StreamExt};
use tokio::sync::mpsc;

use crate::domain::realtime::EventKind;

use super::connection::{Connection, Disconnect, Outbound};
use super::hub::{InboundFrame, RealtimeHub};

/// Upgrades the request and serves the socket on `hub`.
pub fn upgrade<E: EventKind>(ws: WebSocketUpgrade, hub: Arc<RealtimeHub<E>>) -> Response {
    ws.on_upgrade(move |socket| serve_socket(hub, socket))
}

fn to_frame(message: Result<Message, axum::Error>) -> Option<InboundFrame> {
    match message {
        Ok(Message::Text(text)) => Some(InboundFrame::Text(text)),
        Ok(Message::Binary(bytes)) => Some(InboundFrame::Binary(bytes)),
        // Protocol pings are answered by axum.
        Ok(Message::Ping(_)) | Ok(Message::Pong(_)) => None,
        Ok(Message::Close(_)) => Some(InboundFrame::Closed),
        Err(e) => Some(InboundFrame::Failed(e.to_string())),
    }
}

/// Writes queued frames to `sink` until the connection closes.
///
/// Returns the send error that ended the writer, if any.
async fn write_outbound<E, S>(
    connection: &Connection<E>,
    mut outbound: mpsc::Receiver<Outbound>,
    sink: &mut S,
) -> Option<String>
where
    E: EventKind,
    S: Sink<Message> + Unpin,
    S::Error: std::fmt::Display,
{
    loop {
        // Queued frames win over a pending close so the buffer is flushed first.
        let item = tokio::select! {
            biased;
            item = outbound.recv() => item,
            _ = connection.close_requested() => None,
        };
        match item {
            Some(Outbound::Text(text)) => {
                if let Err(e) = sink.send(Message::Text(text)).await {
                    return Some(e.to_string());
                }
            }
            Some(Outbound::Close) | None => break,
        }
    }
    let _ = sink.send(Message::Close(None)).await;
    None
}

/// Runs one socket until either side ends it.
pub async fn serve_socket<E: EventKind>(hub: Arc<RealtimeHub<E>>, socket: WebSocket) {
    let (mut sink, stream) = socket.split();
    let (connection, outbound) = hub.accept();
    let connection_id = connection.id();

    let writer = Arc::clone(&connection);
    let mut send_task =
        tokio::spawn(async move { write_outbound(&writer, outbound, &mut sink).await });

    let frames = stream.filter_map(|message| async move { to_frame(message) });
    let reader = hub.run(Arc::clone(&connection), Box::pin(frames));

    tokio::select! {
        _ = reader => {
            send_task.abort();
        }
        result = &mut send_task => {
            let how = match result {
                Ok(Some(reason)) => {
                    tracing::debug!(connection_id = %connection_id, error = %reason, "Send error, closing connection");
                    Disconnect::Errored(reason)
                }
                Ok(None) => Disconnect::Closed,
                Err(e) => Disconnect::Errored(e.to_string()),
            };
            hub.disconnect(&connection, how);
        }
    }
}
