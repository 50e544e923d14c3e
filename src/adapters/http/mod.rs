//! HTTP adapters - REST API implementations.
//!
//! Each area has its own module for endpoint exposure; `router` assembles
//! them under `/v1` next to the websocket paths.

pub mod error;
pub mod machines;
pub mod middleware;
pub mod pairing;
pub mod router;
pub mod system;

pub use error::{status_for, ApiError, ErrorResponse};
pub use machines::{machine_routes, MachinesAppState};
pub use middleware::{auth_middleware, AuthState, RequireAuth};
pub use pairing::{pairing_routes, PairingAppState};
pub use router::{build_router, AppState, RouterSettings};
pub use system::{system_routes, SystemAppState};
