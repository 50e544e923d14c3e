//! HTTP adapter for the pairing flow.
//!
//! - `GET /v1/machines/@newkey` - Issue a pairing key for the current user
//! - `POST /v1/machines/@signup` - Redeem a pairing key and register a machine

pub mod dto;
pub mod handlers;
pub mod routes;

pub use dto::*;
pub use handlers::PairingAppState;
pub use routes::pairing_routes;
