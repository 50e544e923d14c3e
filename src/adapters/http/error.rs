//! JSON error responses shared by every HTTP module.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::domain::foundation::{AuthError, ErrorCode, ValidationError};
use crate::domain::machine::{MachineError, RegistrationError};
use crate::domain::pairing::PairingError;

/// Body of every non-2xx JSON response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorResponse {
    /// Stable `ErrorCode` string.
    pub error_code: String,
    pub message: String,
    /// `{"field": ...}` for validation failures.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// HTTP status for each stable error code.
pub fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::ValidationFailed => StatusCode::BAD_REQUEST,
        ErrorCode::MachineAlreadyRegistered => StatusCode::BAD_REQUEST,
        ErrorCode::KeyExpiredOrInvalid => StatusCode::FORBIDDEN,
        ErrorCode::Forbidden => StatusCode::FORBIDDEN,
        ErrorCode::OwnerNotFound => StatusCode::NOT_FOUND,
        ErrorCode::MachineNotFound => StatusCode::NOT_FOUND,
        ErrorCode::Unauthenticated => StatusCode::UNAUTHORIZED,
        ErrorCode::StorageError => StatusCode::INTERNAL_SERVER_ERROR,
        ErrorCode::AuthUnavailable => StatusCode::SERVICE_UNAVAILABLE,
    }
}

/// API error type that converts domain errors to HTTP responses.
///
/// Storage detail is logged, never returned to the client.
#[derive(Debug)]
pub struct ApiError {
    code: ErrorCode,
    message: String,
    details: Option<serde_json::Value>,
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
        }
    }

    pub fn code(&self) -> ErrorCode {
        self.code
    }

    fn storage(detail: &str) -> Self {
        tracing::error!(error = %detail, "Storage failure while handling request");
        Self::new(ErrorCode::StorageError, "A storage error occurred")
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        let details = match &err {
            ValidationError::EmptyField { field }
            | ValidationError::InvalidFormat { field, .. } => Some(serde_json::json!({ "field": field })),
            ValidationError::InvalidTransition { .. } => None,
        };
        Self {
            code: ErrorCode::ValidationFailed,
            message: err.to_string(),
            details,
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::new(ErrorCode::ValidationFailed, rejection.body_text())
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        if err.requires_reauthentication() {
            return Self::new(ErrorCode::Unauthenticated, err.to_string());
        }
        tracing::error!(error = %err, "Session validator unavailable");
        Self::new(
            ErrorCode::AuthUnavailable,
            "Authentication service unavailable",
        )
    }
}

impl From<PairingError> for ApiError {
    fn from(err: PairingError) -> Self {
        match &err {
            PairingError::Storage(detail) => Self::storage(detail),
            _ => Self::new(err.code(), err.to_string()),
        }
    }
}

impl From<RegistrationError> for ApiError {
    fn from(err: RegistrationError) -> Self {
        match err {
            RegistrationError::Validation(v) => v.into(),
            RegistrationError::Storage(detail) => Self::storage(&detail),
            other => Self::new(other.code(), other.to_string()),
        }
    }
}

impl From<MachineError> for ApiError {
    fn from(err: MachineError) -> Self {
        match err {
            MachineError::Validation(v) => v.into(),
            MachineError::Storage(detail) => Self::storage(&detail),
            other => Self::new(other.code(), other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = status_for(self.code);
        let body = ErrorResponse {
            error_code: self.code.as_str().to_string(),
            message: self.message,
            details: self.details,
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::MachineId;

    #[test]
    fn registration_errors_map_to_documented_statuses() {
        let cases = [
            (RegistrationError::KeyExpiredOrInvalid, StatusCode::FORBIDDEN),
            (RegistrationError::OwnerNotFound, StatusCode::NOT_FOUND),
            (RegistrationError::MachineAlreadyRegistered, StatusCode::BAD_REQUEST),
            (RegistrationError::Storage("disk full".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError::from(err).into_response().status(), status);
        }
    }

    #[test]
    fn machine_errors_map_to_documented_statuses() {
        let id = MachineId::new();
        assert_eq!(
            ApiError::from(MachineError::NotFound(id)).into_response().status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::from(MachineError::Forbidden(id)).into_response().status(),
            StatusCode::FORBIDDEN
        );
    }

    #[test]
    fn auth_errors_distinguish_bad_tokens_from_outages() {
        assert_eq!(
            ApiError::from(AuthError::TokenExpired).into_response().status(),
            StatusCode::UNAUTHORIZED
        );
        let outage = ApiError::from(AuthError::service_unavailable("jwks timeout"));
        assert_eq!(outage.code(), ErrorCode::AuthUnavailable);
        assert!(!outage.message.contains("jwks"));
        assert_eq!(outage.into_response().status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn storage_detail_is_not_exposed() {
        let err = ApiError::from(PairingError::storage("redis://secret-host refused"));
        assert_eq!(err.code(), ErrorCode::StorageError);
        assert!(!err.message.contains("secret-host"));
    }

    #[test]
    fn validation_error_names_the_field() {
        let err = ApiError::from(ValidationError::empty_field("hostname"));
        assert_eq!(err.code(), ErrorCode::ValidationFailed);
        assert_eq!(err.details, Some(serde_json::json!({"field": "hostname"})));
    }

    #[test]
    fn body_omits_details_unless_present() {
        let body = ErrorResponse {
            error_code: "MACHINE_NOT_FOUND".into(),
            message: "Not found".into(),
            details: None,
        };
        let json = serde_json::to_string(&body).unwrap();
        assert!(!json.contains("details"));
    }
}
