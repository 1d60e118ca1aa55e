// src/services/auth.rs

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{user_repo::NewUser, GymRepository, UserRepository},
    models::{
        auth::{Claims, GoogleProfile, OAuthLogin},
        gym::placeholder_gym,
        user::{User, UserRole},
    },
};

#[derive(Clone)]
pub struct AuthService {
    user_repo: UserRepository,
    gym_repo: GymRepository,
    jwt_secret: String,
    token_ttl: Duration,
    pool: PgPool,
}

impl AuthService {
    pub fn new(
        user_repo: UserRepository,
        gym_repo: GymRepository,
        jwt_secret: String,
        token_ttl: Duration,
        pool: PgPool,
    ) -> Self {
        Self {
            user_repo,
            gym_repo,
            jwt_secret,
            token_ttl,
            pool,
        }
    }

    /// Login com Google. Sem usuário: cria academia provisória + dono.
    /// Usuário só com e-mail: vincula o googleId.
    pub async fn validate_oauth_login(&self, profile: GoogleProfile) -> Result<OAuthLogin, AppError> {
        // --- INÍCIO DA TRANSAÇÃO ---
        let mut tx = self.pool.begin().await?;

        let existing = self
            .user_repo
            .find_by_google_id_or_email(&mut *tx, &profile.google_id, &profile.email)
            .await?;

        let (user, is_new) = match existing {
            None => {
                let gym = self
                    .gym_repo
                    .create(
                        &mut *tx,
                        &placeholder_gym(profile.first_name.as_deref(), profile.last_name.as_deref()),
                    )
                    .await?;

                let user = self
                    .user_repo
                    .create_user(
                        &mut *tx,
                        NewUser {
                            email: &profile.email,
                            google_id: Some(&profile.google_id),
                            first_name: profile.first_name.as_deref().unwrap_or_default(),
                            last_name: profile.last_name.as_deref().unwrap_or_default(),
                            profile_picture: profile.profile_picture.as_deref(),
                            gym_id: gym.id,
                            role: UserRole::Owner,
                        },
                    )
                    .await?;

                tracing::info!("Novo dono {} com academia provisória {}", user.id, gym.id);
                (user, true)
            }
            Some(user) if user.google_id.is_none() => {
                let linked = self
                    .user_repo
                    .link_google(
                        &mut *tx,
                        user.id,
                        &profile.google_id,
                        profile.first_name.as_deref(),
                        profile.last_name.as_deref(),
                        profile.profile_picture.as_deref(),
                    )
                    .await?;

                tracing::info!("Conta Google vinculada ao usuário {}", linked.id);
                (linked, false)
            }
            Some(user) => (user, false),
        };

        tx.commit().await?;
        // --- FIM DA TRANSAÇÃO ---

        let access_token = self.issue_token(&user)?;

        Ok(OAuthLogin {
            access_token,
            is_new,
            user,
        })
    }

    pub fn issue_token(&self, user: &User) -> Result<String, AppError> {
        let now = Utc::now();
        let expires_at = now + self.token_ttl;

        let claims = Claims {
            sub: user.id,
            gym_id: user.gym_id,
            role: user.role,
            exp: expires_at.timestamp() as usize,
            iat: now.timestamp() as usize,
        };

        Ok(encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_ref()),
        )?)
    }

    pub fn validate_token(&self, token: &str) -> Result<Claims, AppError> {
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_ref()),
            &Validation::default(),
        )
        .map_err(|_| AppError::InvalidToken)?;

        Ok(token_data.claims)
    }

    /// Usuário do token. Se sumiu do banco, o token não vale mais.
    pub async fn get_me(&self, user_id: Uuid) -> Result<User, AppError> {
        self.user_repo
            .find_by_id(self.user_repo.pool(), user_id)
            .await?
            .ok_or(AppError::InvalidToken)
    }
}
