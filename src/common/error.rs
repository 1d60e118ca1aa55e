// src/common/error.rs

use std::collections::HashMap;

use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

// Erros de domínio. Os handlers nunca devolvem isso direto: convertem para ApiError.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("{0}")]
    BadRequest(String),

    #[error("Lead not found")]
    LeadNotFound,

    #[error("Note not found")]
    NoteNotFound,

    #[error("Gym not found")]
    GymNotFound,

    #[error("User not found")]
    UserNotFound,

    #[error("E-mail já existe")]
    EmailAlreadyExists,

    #[error("Token inválido")]
    InvalidToken,

    #[error("Phone verification not configured")]
    PhoneVerificationNotConfigured,

    #[error("Google OAuth not configured")]
    OAuthNotConfigured,

    #[error("Falha no login com Google: {0}")]
    OAuthFailed(String),

    #[error("Erro de banco de dados: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Erro de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),

    #[error("Erro no provedor externo: {0}")]
    UpstreamError(#[from] reqwest::Error),

    #[error("Erro interno do servidor")]
    InternalServerError(#[from] anyhow::Error),
}

// O formato de erro que sai pela API.
#[derive(Debug, Serialize, Error)]
#[error("{status}: {error}")]
pub struct ApiError {
    #[serde(skip)]
    pub status: StatusCode,
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

impl ApiError {
    pub fn new(status: StatusCode, error: impl Into<String>) -> Self {
        Self {
            status,
            error: error.into(),
            details: None,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self)).into_response()
    }
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        match err {
            AppError::ValidationError(errors) => {
                let mut details: HashMap<String, Vec<String>> = HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages = field_errors
                        .iter()
                        .map(|e| {
                            e.message
                                .as_ref()
                                .map(|m| m.to_string())
                                .unwrap_or_else(|| e.code.to_string())
                        })
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                ApiError {
                    status: StatusCode::BAD_REQUEST,
                    error: "One or more fields are invalid.".into(),
                    details: serde_json::to_value(details).ok(),
                }
            }
            AppError::BadRequest(message) => ApiError::new(StatusCode::BAD_REQUEST, message),
            e @ (AppError::PhoneVerificationNotConfigured | AppError::OAuthNotConfigured) => {
                ApiError::new(StatusCode::BAD_REQUEST, e.to_string())
            }
            e @ (AppError::LeadNotFound
            | AppError::NoteNotFound
            | AppError::GymNotFound
            | AppError::UserNotFound) => ApiError::new(StatusCode::NOT_FOUND, e.to_string()),
            AppError::EmailAlreadyExists => {
                ApiError::new(StatusCode::CONFLICT, "This e-mail is already in use.")
            }
            AppError::InvalidToken => ApiError::new(
                StatusCode::UNAUTHORIZED,
                "Missing or invalid authentication token.",
            ),
            // Todo o resto vira 500. O detalhe fica só no log.
            ref e => {
                tracing::error!("Erro Interno do Servidor: {}", e);
                ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "An unexpected error occurred.")
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::new(StatusCode::BAD_REQUEST, rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::new(StatusCode::BAD_REQUEST, rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::new(StatusCode::BAD_REQUEST, rejection.body_text())
    }
}
