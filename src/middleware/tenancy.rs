// src/middleware/tenancy.rs

use axum::{extract::FromRequestParts, http::request::Parts};
use uuid::Uuid;

use crate::{
    common::error::{ApiError, AppError},
    middleware::auth::AuthenticatedUser,
};

// A academia do usuário logado. Vem do token, nunca do corpo da requisição.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GymContext(pub Uuid);

impl<S> FromRequestParts<S> for GymContext
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .map(|user| GymContext(user.0.gym_id))
            .ok_or_else(|| AppError::InvalidToken.into())
    }
}
