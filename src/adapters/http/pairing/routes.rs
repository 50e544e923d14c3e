//! Axum router for the pairing endpoints.

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::{create_new_key, signup, PairingAppState};

/// Create the pairing router, mounted under `/v1`.
///
/// # Routes
/// - `GET /machines/@newkey` - requires authentication
/// - `POST /machines/@signup` - authenticated by the pairing key itself
pub fn pairing_routes() -> Router<PairingAppState> {
    Router::new()
        .route("/machines/@newkey", get(create_new_key))
        .route("/machines/@signup", post(signup))
}
