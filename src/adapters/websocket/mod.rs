//! WebSocket adapters for machine reporters and live dashboards.
//!
//! # Architecture
//!
//! ```text
//!   reporter socket                         dashboard socket
//!         │                                        ▲
//!         ▼                                        │ machineData
//! ┌──────────────────┐   ┌────────────────┐   ┌──────────────────────┐
//! │ RealtimeHub      │──▶│ TelemetryRelay │──▶│ RealtimeHub          │
//! │ <AgentEvent>     │   │ owner routing  │   │ <DashboardEvent>     │
//! └──────────────────┘   └────────────────┘   └──────────────────────┘
//! ```
//!
//! # Components
//!
//! - [`connection`] - One connection: listener table, state, outbound queue
//! - [`hub`] - Accepts connections for one role and routes `{e, d}` frames
//! - [`transport`] - Bridges an axum socket to a hub connection
//! - [`relay`] - Login, telemetry persistence, owner-scoped fan-out
//! - [`handler`] - Axum upgrade routes

pub mod connection;
pub mod handler;
pub mod hub;
pub mod relay;
pub mod transport;

pub use connection::{Connection, Disconnect, ListenerId, Outbound, SendError};
pub use handler::{websocket_router, WebSocketState};
pub use hub::{ConnectionHandler, InboundFrame, RealtimeHub, DEFAULT_OUTBOUND_BUFFER};
pub use relay::TelemetryRelay;
pub use transport::{serve_socket, upgrade};
