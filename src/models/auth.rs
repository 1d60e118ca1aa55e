// src/models/auth.rs

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::models::user::{User, UserRole};

// Estrutura de dados ("claims") dentro do JWT
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid, // ID do usuário
    #[serde(rename = "gymId")]
    pub gym_id: Uuid,
    pub role: UserRole,
    pub exp: usize,
    pub iat: usize,
}

/// O que interessa do perfil devolvido pelo Google.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoogleProfile {
    pub google_id: String,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub profile_picture: Option<String>,
}

/// Resultado do login via Google.
#[derive(Debug, Clone)]
pub struct OAuthLogin {
    pub access_token: String,
    // true quando usuário e academia acabaram de ser criados
    pub is_new: bool,
    pub user: User,
}

#[derive(Debug, Deserialize)]
pub struct GoogleCallbackParams {
    pub code: Option<String>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MeUser {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub profile_picture: Option<String>,
    pub role: UserRole,
}

impl From<User> for MeUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            profile_picture: user.profile_picture,
            role: user.role,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MeResponse {
    pub user: MeUser,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct OkResponse {
    pub ok: bool,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct SendCodePayload {
    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "98765 43210")]
    pub phone: String,
    /// ISO do país (IN, US, GB) para números sem `+`.
    #[schema(example = "IN")]
    pub country: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct VerifyCodePayload {
    #[validate(length(min = 1, message = "required"))]
    pub phone: String,
    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "123456")]
    pub code: String,
    pub country: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct PhoneCodeResponse {
    pub ok: bool,
    #[schema(example = "pending")]
    pub status: String,
}
