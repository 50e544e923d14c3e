//! Foundation module - Shared domain primitives.
//!
//! Identifiers, timestamps, the state machine trait and the error vocabulary
//! used by the pairing, machine and realtime modules.

mod auth;
mod errors;
mod ids;
mod secret;
mod state_machine;
mod timestamp;

pub use auth::{AuthError, AuthenticatedUser};
pub use errors::{ErrorCode, ValidationError};
pub use ids::{ConnectionId, HardwareId, MachineId, UserId};
pub use secret::{generate_secret, SECRET_BYTES};
pub use state_machine::StateMachine;
pub use timestamp::Timestamp;
