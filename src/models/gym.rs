// src/models/gym.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

// A academia: dona dos leads e dos usuários.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Gym {
    #[serde(rename = "_id")]
    pub id: Uuid,
    #[schema(example = "Iron Temple")]
    pub name: String,
    pub owner_first_name: String,
    pub owner_last_name: String,
    pub address_line1: String,
    pub address_line2: Option<String>,
    pub city: String,
    pub state: String,
    pub country: String,
    pub phone: String,
    pub phone_verified: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateGymPayload {
    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "Iron Temple")]
    pub name: String,
    #[validate(length(min = 1, message = "required"))]
    pub owner_first_name: String,
    #[validate(length(min = 1, message = "required"))]
    pub owner_last_name: String,
    #[validate(length(min = 1, message = "required"))]
    pub address_line1: String,
    pub address_line2: Option<String>,
    #[validate(length(min = 1, message = "required"))]
    pub city: String,
    #[validate(length(min = 1, message = "required"))]
    pub state: String,
    #[validate(length(min = 1, message = "required"))]
    pub country: String,
    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "+919876543210")]
    pub phone: String,
    #[serde(default)]
    pub phone_verified: bool,
}

/// Dados do formulário de cadastro. Campos ausentes ficam como estão.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateGymPayload {
    pub name: Option<String>,
    pub owner_first_name: Option<String>,
    pub owner_last_name: Option<String>,
    pub address_line1: Option<String>,
    pub address_line2: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
    pub phone: Option<String>,
    pub phone_verified: Option<bool>,
}

/// Academia provisória criada no primeiro login com Google,
/// até o dono preencher o cadastro.
pub fn placeholder_gym(first_name: Option<&str>, last_name: Option<&str>) -> CreateGymPayload {
    let or_default = |value: Option<&str>, fallback: &str| {
        value
            .filter(|v| !v.trim().is_empty())
            .unwrap_or(fallback)
            .to_string()
    };

    CreateGymPayload {
        name: "My Gym".into(),
        owner_first_name: or_default(first_name, "Owner"),
        owner_last_name: or_default(last_name, "Name"),
        address_line1: "TBD".into(),
        address_line2: None,
        city: "TBD".into(),
        state: "TBD".into(),
        country: "TBD".into(),
        phone: "0000000000".into(),
        phone_verified: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholder_uses_profile_names_when_present() {
        let gym = placeholder_gym(Some("Ana"), Some("Souza"));
        assert_eq!(gym.name, "My Gym");
        assert_eq!(gym.owner_first_name, "Ana");
        assert_eq!(gym.owner_last_name, "Souza");
        assert_eq!(gym.city, "TBD");
        assert_eq!(gym.phone, "0000000000");
        assert!(!gym.phone_verified);
    }

    #[test]
    fn placeholder_falls_back_to_owner_name() {
        let gym = placeholder_gym(None, Some(""));
        assert_eq!(gym.owner_first_name, "Owner");
        assert_eq!(gym.owner_last_name, "Name");
    }
}
