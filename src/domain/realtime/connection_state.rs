//! Lifecycle of one realtime connection.

use crate::domain::foundation::StateMachine;

/// `Connecting -> Open -> {Closed | Errored}`.
///
/// Only `Open` dispatches inbound messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ConnectionState {
    #[default]
    Connecting,
    Open,
    Closed,
    Errored,
}

impl ConnectionState {
    pub fn accepts_messages(&self) -> bool {
        matches!(self, ConnectionState::Open)
    }
}

impl StateMachine for ConnectionState {
    fn valid_transitions(&self) -> Vec<Self> {
        use ConnectionState::*;
        match self {
            // A handshake can fail before the socket is ever open.
            Connecting => vec![Open, Closed, Errored],
            Open => vec![Closed, Errored],
            Closed | Errored => vec![],
        }
    }
}
