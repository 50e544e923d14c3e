//! HTTP adapter for machine management.
//!
//! - `GET /v1/users/@me/machines` - List the current user's machines
//! - `DELETE /v1/machines/:id` - Remove one of the current user's machines

pub mod dto;
pub mod handlers;
pub mod routes;

pub use dto::*;
pub use handlers::MachinesAppState;
pub use routes::machine_routes;
