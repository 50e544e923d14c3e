//! Bearer session authentication for the `/v1` routes.
//!
//! `auth_middleware` resolves `Authorization: Bearer <token>` through the
//! `SessionValidator` port and stores the `AuthenticatedUser` in request
//! extensions. Handlers that need a user take the `RequireAuth` extractor;
//! public routes (`@signup`, `ping`) simply never look.

use std::sync::Arc;

use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::adapters::http::error::ApiError;
use crate::domain::foundation::{AuthenticatedUser, ErrorCode};
use crate::ports::SessionValidator;

pub type AuthState = Arc<dyn SessionValidator>;

/// Token part of a `Bearer` header value; `None` for other schemes or blanks.
pub fn bearer_token(value: &str) -> Option<&str> {
    value.strip_prefix("Bearer ").map(str::trim).filter(|t| !t.is_empty())
}

/// Anonymous requests pass through untouched. A presented token must be
/// valid: a rejected token is 401, an unreachable validator 503.
pub async fn auth_middleware(
    State(validator): State<AuthState>,
    mut request: Request,
    next: Next,
) -> Response {
    let token = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(bearer_token)
        .map(str::to_owned);

    if let Some(token) = token {
        match validator.validate(&token).await {
            Ok(user) => {
                request.extensions_mut().insert(user);
            }
            Err(e) => return ApiError::from(e).into_response(),
        }
    }
    next.run(request).await
}

/// The authenticated caller. Rejects with 401 `UNAUTHENTICATED` when the
/// middleware attached no user.
#[derive(Debug, Clone)]
pub struct RequireAuth(pub AuthenticatedUser);

#[async_trait]
impl<S> FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .map(RequireAuth)
            .ok_or(AuthRejection::Unauthenticated)
    }
}

#[derive(Debug, Clone)]
pub enum AuthRejection {
    Unauthenticated,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            AuthRejection::Unauthenticated => {
                ApiError::new(ErrorCode::Unauthenticated, "Authentication required")
                    .into_response()
            }
        }
    }
}
