// src/db/user_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::user::{UpdateUserPayload, User, UserRole},
};

const USER_COLUMNS: &str = "id, email, google_id, first_name, last_name, profile_picture, \
    gym_id, role, is_active, created_at, updated_at";

/// Dados para gravar um usuário novo.
#[derive(Debug, Clone)]
pub struct NewUser<'a> {
    pub email: &'a str,
    pub google_id: Option<&'a str>,
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub profile_picture: Option<&'a str>,
    pub gym_id: Uuid,
    pub role: UserRole,
}

// O repositório de usuários, responsável por todas as interações com a tabela 'users'
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub async fn find_by_id<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<User>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(executor)
        .await?;
        Ok(user)
    }

    /// Primeiro por googleId; se não houver, por e-mail (evita duplicar o e-mail).
    pub async fn find_by_google_id_or_email<'e, E>(
        &self,
        executor: E,
        google_id: &str,
        email: &str,
    ) -> Result<Option<User>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            SELECT {USER_COLUMNS} FROM users
            WHERE google_id = $1 OR email = $2
            ORDER BY (google_id = $1) DESC NULLS LAST
            LIMIT 1
            "#
        ))
        .bind(google_id)
        .bind(email)
        .fetch_optional(executor)
        .await?;
        Ok(user)
    }

    pub async fn list_by_gym<'e, E>(
        &self,
        executor: E,
        gym_id: Uuid,
        role: Option<UserRole>,
    ) -> Result<Vec<User>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let users = sqlx::query_as::<_, User>(&format!(
            r#"
            SELECT {USER_COLUMNS} FROM users
            WHERE gym_id = $1 AND ($2::user_role IS NULL OR role = $2)
            ORDER BY created_at ASC
            "#
        ))
        .bind(gym_id)
        .bind(role)
        .fetch_all(executor)
        .await?;
        Ok(users)
    }

    // Cria um novo usuário, com tratamento específico para e-mail duplicado.
    pub async fn create_user<'e, E>(&self, executor: E, user: NewUser<'_>) -> Result<User, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let created = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (
                id, email, google_id, first_name, last_name, profile_picture, gym_id, role
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(user.email)
        .bind(user.google_id)
        .bind(user.first_name)
        .bind(user.last_name)
        .bind(user.profile_picture)
        .bind(user.gym_id)
        .bind(user.role)
        .fetch_one(executor)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() && db_err.constraint() == Some("users_email_key") {
                    return AppError::EmailAlreadyExists;
                }
            }
            e.into()
        })?;

        Ok(created)
    }

    /// Vincula a conta Google e preenche só o que estiver vazio.
    pub async fn link_google<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        google_id: &str,
        first_name: Option<&str>,
        last_name: Option<&str>,
        profile_picture: Option<&str>,
    ) -> Result<User, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            UPDATE users SET
                google_id = $2,
                profile_picture = COALESCE(profile_picture, $3),
                first_name = CASE WHEN first_name = '' THEN COALESCE($4, first_name) ELSE first_name END,
                last_name = CASE WHEN last_name = '' THEN COALESCE($5, last_name) ELSE last_name END,
                updated_at = NOW()
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(google_id)
        .bind(profile_picture)
        .bind(first_name)
        .bind(last_name)
        .fetch_one(executor)
        .await?;
        Ok(user)
    }

    pub async fn update<'e, E>(
        &self,
        executor: E,
        gym_id: Uuid,
        id: Uuid,
        payload: &UpdateUserPayload,
    ) -> Result<Option<User>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            UPDATE users SET
                first_name = COALESCE($3, first_name),
                last_name = COALESCE($4, last_name),
                profile_picture = COALESCE($5, profile_picture),
                role = COALESCE($6, role),
                updated_at = NOW()
            WHERE id = $1 AND gym_id = $2
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(gym_id)
        .bind(payload.first_name.as_deref())
        .bind(payload.last_name.as_deref())
        .bind(payload.profile_picture.as_deref())
        .bind(payload.role)
        .fetch_optional(executor)
        .await?;
        Ok(user)
    }

    pub async fn deactivate<'e, E>(
        &self,
        executor: E,
        gym_id: Uuid,
        id: Uuid,
    ) -> Result<Option<User>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            UPDATE users SET is_active = FALSE, updated_at = NOW()
            WHERE id = $1 AND gym_id = $2
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(gym_id)
        .fetch_optional(executor)
        .await?;
        Ok(user)
    }
}
