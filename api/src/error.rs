use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use casting_agency_service::ServiceError;
use serde_json::json;
use tracing::{error, warn};

use crate::auth::AuthError;

const INTERNAL_MESSAGE: &str = "An error has occurred, please try again";

/// Every way a request can fail, rendered as the JSON error envelope.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("Resource not found")]
    NotFound,

    #[error("{0}")]
    ValidationFailed(String),

    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Auth(e) if e.is_internal() => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Auth(_) => StatusCode::UNAUTHORIZED,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::ValidationFailed(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// The message clients see. Internal details stay in the logs.
    pub fn message(&self) -> String {
        if self.status().is_server_error() {
            INTERNAL_MESSAGE.to_owned()
        } else {
            self.to_string()
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self {
            ApiError::Auth(e) if !e.is_internal() => {
                warn!(code = e.code(), error = ?e, "Request rejected");
            }
            _ if status.is_server_error() => error!(error = %self, "Request failed"),
            _ => {}
        }

        let body = json!({
            "success": false,
            "error": status.as_u16(),
            "message": self.message(),
        });
        (status, Json(body)).into_response()
    }
}

impl From<ServiceError> for ApiError {
    fn from(e: ServiceError) -> Self {
        match e {
            ServiceError::NotFound { .. } => ApiError::NotFound,
            ServiceError::Validation(message) => ApiError::ValidationFailed(message),
            ServiceError::Db(e) => ApiError::Internal(e.to_string()),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::ValidationFailed(rejection.body_text())
    }
}

/// Non-numeric ids never name a record.
impl From<PathRejection> for ApiError {
    fn from(_: PathRejection) -> Self {
        ApiError::NotFound
    }
}
