// src/db/gym_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::gym::{CreateGymPayload, Gym, UpdateGymPayload},
};

const GYM_COLUMNS: &str = "id, name, owner_first_name, owner_last_name, address_line1, \
    address_line2, city, state, country, phone, phone_verified, created_at, updated_at";

#[derive(Clone)]
pub struct GymRepository {
    pool: PgPool,
}

impl GymRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub async fn create<'e, E>(&self, executor: E, gym: &CreateGymPayload) -> Result<Gym, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let created = sqlx::query_as::<_, Gym>(&format!(
            r#"
            INSERT INTO gyms (
                id, name, owner_first_name, owner_last_name, address_line1, address_line2,
                city, state, country, phone, phone_verified
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING {GYM_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(&gym.name)
        .bind(&gym.owner_first_name)
        .bind(&gym.owner_last_name)
        .bind(&gym.address_line1)
        .bind(gym.address_line2.as_deref())
        .bind(&gym.city)
        .bind(&gym.state)
        .bind(&gym.country)
        .bind(&gym.phone)
        .bind(gym.phone_verified)
        .fetch_one(executor)
        .await?;

        Ok(created)
    }

    pub async fn find_by_id<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<Gym>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let gym = sqlx::query_as::<_, Gym>(&format!("SELECT {GYM_COLUMNS} FROM gyms WHERE id = $1"))
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(gym)
    }

    // COALESCE: o que não veio no payload continua como está.
    pub async fn update<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        payload: &UpdateGymPayload,
    ) -> Result<Option<Gym>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let gym = sqlx::query_as::<_, Gym>(&format!(
            r#"
            UPDATE gyms SET
                name = COALESCE($2, name),
                owner_first_name = COALESCE($3, owner_first_name),
                owner_last_name = COALESCE($4, owner_last_name),
                address_line1 = COALESCE($5, address_line1),
                address_line2 = COALESCE($6, address_line2),
                city = COALESCE($7, city),
                state = COALESCE($8, state),
                country = COALESCE($9, country),
                phone = COALESCE($10, phone),
                phone_verified = COALESCE($11, phone_verified),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {GYM_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(payload.name.as_deref())
        .bind(payload.owner_first_name.as_deref())
        .bind(payload.owner_last_name.as_deref())
        .bind(payload.address_line1.as_deref())
        .bind(payload.address_line2.as_deref())
        .bind(payload.city.as_deref())
        .bind(payload.state.as_deref())
        .bind(payload.country.as_deref())
        .bind(payload.phone.as_deref())
        .bind(payload.phone_verified)
        .fetch_optional(executor)
        .await?;

        Ok(gym)
    }
}
