//! Adapters - Implementations of port interfaces.
//!
//! - `auth` - Session validators (JWT, fixed table)
//! - `clock` - Controllable clock for tests
//! - `http` - REST endpoints, auth middleware, router
//! - `machine` - Machine repository
//! - `pairing` - Pairing key stores (memory, Redis)
//! - `user` - User directory
//! - `websocket` - Realtime hubs, transport and telemetry relay

pub mod auth;
pub mod clock;
pub mod http;
pub mod machine;
pub mod pairing;
pub mod user;
pub mod websocket;

pub use auth::{JwtSessionValidator, MockSessionValidator};
pub use clock::ManualClock;
pub use machine::InMemoryMachineRepository;
pub use pairing::{InMemoryPairingKeyStore, RedisPairingKeyStore};
pub use user::{InMemoryUserRepository, RecordingSessionValidator};
pub use websocket::{RealtimeHub, TelemetryRelay};
