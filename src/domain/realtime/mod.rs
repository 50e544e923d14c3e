//! Realtime domain - wire envelope, role event sets and connection lifecycle.

mod connection_state;
mod envelope;
mod events;

pub use connection_state::ConnectionState;
pub use envelope::{encode, Envelope, MalformedEnvelope};
pub use events::{AgentEvent, DashboardEvent, EventKind, ServerEvent};
