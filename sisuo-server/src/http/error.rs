//! API error type with IntoResponse
//!
//! Errors become `{"success": false, "errCode", "errMsg"}` bodies. The HTTP
//! status is always 200; existing clients read the outcome from the body.
//!
//! | errCode | errMsg |
//! |---|---|
//! | 100 | validation message |
//! | 101 | `RegisAccountExist` |
//! | 102 | `LoginFail1` (unknown account), `LoginFail2` (wrong password) |
//! | 103 | `NotFound` |
//! | 500 | `InternalError` |

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::auth::{AuthError, LoginFailure};
use crate::db::DbError;
use crate::models::ValidationError;

/// API error type with envelope mapping
#[derive(Debug)]
pub enum ApiError {
    /// Missing or malformed request field
    Validation(ValidationError),

    /// Resource not found
    NotFound { resource: &'static str, id: String },

    /// Account handle already registered
    AlreadyExists { account: String },

    /// Unknown account or wrong password
    AuthenticationFailed(LoginFailure),

    /// Store unreachable or malformed document (logged, generic message)
    Infrastructure { message: String },
}

impl ApiError {
    pub fn code(&self) -> u16 {
        match self {
            Self::Validation(_) => 100,
            Self::AlreadyExists { .. } => 101,
            Self::AuthenticationFailed(_) => 102,
            Self::NotFound { .. } => 103,
            Self::Infrastructure { .. } => 500,
        }
    }

    pub fn message(&self) -> String {
        match self {
            Self::Validation(e) => e.to_string(),
            Self::AlreadyExists { .. } => "RegisAccountExist".into(),
            Self::AuthenticationFailed(LoginFailure::UnknownAccount) => "LoginFail1".into(),
            Self::AuthenticationFailed(LoginFailure::WrongPassword) => "LoginFail2".into(),
            Self::NotFound { .. } => "NotFound".into(),
            Self::Infrastructure { .. } => "InternalError".into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            Self::Infrastructure { message } => {
                // Log the actual error, return generic message
                tracing::error!("Infrastructure error: {}", message);
            }
            Self::NotFound { resource, id } => {
                tracing::debug!(resource, id = %id, "not found");
            }
            _ => {}
        }

        let body = json!({
            "success": false,
            "errCode": self.code(),
            "errMsg": self.message(),
        });
        (StatusCode::OK, Json(body)).into_response()
    }
}

impl From<ValidationError> for ApiError {
    fn from(e: ValidationError) -> Self {
        Self::Validation(e)
    }
}

impl From<DbError> for ApiError {
    fn from(e: DbError) -> Self {
        match e {
            DbError::NotFound { resource, id } => Self::NotFound { resource, id },
            DbError::Store(e) => Self::Infrastructure {
                message: e.to_string(),
            },
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::Validation(e) => Self::Validation(e),
            AuthError::AlreadyExists { account } => Self::AlreadyExists { account },
            AuthError::AuthenticationFailed(reason) => Self::AuthenticationFailed(reason),
            AuthError::Db(e) => e.into(),
            AuthError::Hash(message) => Self::Infrastructure { message },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::StoreError;
    use axum::body::to_bytes;
    use serde_json::Value;

    async fn body_of(err: ApiError) -> (StatusCode, Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn errors_are_http_200_envelopes() {
        let (status, body) = body_of(ApiError::Validation(ValidationError::Empty {
            field: "userId",
        }))
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], false);
        assert_eq!(body["errCode"], 100);
        assert_eq!(body["errMsg"], "userId cannot be empty");
    }

    #[tokio::test]
    async fn account_codes_keep_legacy_messages() {
        let (_, body) = body_of(ApiError::AlreadyExists {
            account: "alice".into(),
        })
        .await;
        assert_eq!(body["errCode"], 101);
        assert_eq!(body["errMsg"], "RegisAccountExist");

        let (_, body) = body_of(ApiError::AuthenticationFailed(LoginFailure::UnknownAccount)).await;
        assert_eq!(body["errCode"], 102);
        assert_eq!(body["errMsg"], "LoginFail1");

        let (_, body) = body_of(ApiError::AuthenticationFailed(LoginFailure::WrongPassword)).await;
        assert_eq!(body["errMsg"], "LoginFail2");
    }

    #[tokio::test]
    async fn store_errors_hide_details() {
        let err: ApiError = DbError::Store(StoreError::InvalidUpdate("secret detail".into())).into();
        let (_, body) = body_of(err).await;
        assert_eq!(body["errCode"], 500);
        assert_eq!(body["errMsg"], "InternalError");
    }

    #[test]
    fn not_found_maps_from_db() {
        let err: ApiError = DbError::NotFound {
            resource: "board",
            id: "k1".into(),
        }
        .into();
        assert_eq!(err.code(), 103);
    }
}
