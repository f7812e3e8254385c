//! HTTP error responses.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use pipeline_core::ContractError;
use serde::Serialize;

use crate::engine::EngineError;

#[derive(Debug)]
pub enum AppError {
    /// Parametros invalidos
    BadRequest(String),

    /// La fuente de agregados fallo
    Upstream { message: String, transient: bool },

    /// Error interno
    Internal(String),
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    message: String,
}

impl From<ContractError> for AppError {
    fn from(err: ContractError) -> Self {
        AppError::BadRequest(err.to_string())
    }
}

impl From<EngineError> for AppError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::Contract(e) => e.into(),
            EngineError::Upstream(e) => AppError::Upstream {
                transient: e.is_transient(),
                message: e.to_string(),
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error, message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "Bad Request", msg),
            AppError::Upstream {
                message,
                transient: true,
            } => (
                StatusCode::SERVICE_UNAVAILABLE,
                "Service Unavailable",
                message,
            ),
            AppError::Upstream { message, .. } => (StatusCode::BAD_GATEWAY, "Bad Gateway", message),
            AppError::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal Server Error",
                msg,
            ),
        };

        let body = Json(ErrorResponse {
            error: error.to_string(),
            message,
        });

        (status, body).into_response()
    }
}
