use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;
use tracing::{error, warn};

/// Errors surfaced to the client as `{"error": ...}` JSON.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),
    #[error("{message}")]
    Conflict {
        message: String,
        redirect: &'static str,
    },
    #[error("Invalid credentials")]
    Auth,
    #[error("{0}")]
    NotFound(String),
    #[error(transparent)]
    Database(#[from] sqlx::Error),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Duplicate registration; the client is told to log in instead.
    pub fn email_taken() -> Self {
        Self::Conflict {
            message: "User already exists".into(),
            redirect: "login",
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    redirect: Option<&'static str>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::Validation(message) => {
                warn!(%message, "request validation failed");
                (
                    StatusCode::BAD_REQUEST,
                    ErrorBody {
                        error: message,
                        redirect: None,
                    },
                )
            }
            ApiError::Conflict { message, redirect } => {
                warn!(%message, "conflict");
                (
                    StatusCode::BAD_REQUEST,
                    ErrorBody {
                        error: message,
                        redirect: Some(redirect),
                    },
                )
            }
            ApiError::Auth => (
                StatusCode::BAD_REQUEST,
                ErrorBody {
                    error: "Invalid credentials".into(),
                    redirect: None,
                },
            ),
            ApiError::NotFound(message) => (
                StatusCode::NOT_FOUND,
                ErrorBody {
                    error: message,
                    redirect: None,
                },
            ),
            ApiError::Database(e) => {
                error!(error = %e, "database error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorBody {
                        error: "internal server error".into(),
                        redirect: None,
                    },
                )
            }
            ApiError::Internal(e) => {
                error!(error = %e, "internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorBody {
                        error: "internal server error".into(),
                        redirect: None,
                    },
                )
            }
        };
        (status, Json(body)).into_response()
    }
}
