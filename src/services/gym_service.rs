// src/services/gym_service.rs

use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::GymRepository,
    models::gym::{CreateGymPayload, Gym, UpdateGymPayload},
};

#[derive(Clone)]
pub struct GymService {
    repo: GymRepository,
}

impl GymService {
    pub fn new(repo: GymRepository) -> Self {
        Self { repo }
    }

    pub async fn create(&self, payload: &CreateGymPayload) -> Result<Gym, AppError> {
        let gym = self.repo.create(self.repo.pool(), payload).await?;
        tracing::info!("Academia {} criada", gym.id);
        Ok(gym)
    }

    /// Só a própria academia é visível: qualquer outro id é 404.
    pub async fn get(&self, caller_gym: Uuid, id: Uuid) -> Result<Gym, AppError> {
        if id != caller_gym {
            return Err(AppError::GymNotFound);
        }
        self.repo
            .find_by_id(self.repo.pool(), id)
            .await?
            .ok_or(AppError::GymNotFound)
    }

    pub async fn update(
        &self,
        caller_gym: Uuid,
        id: Uuid,
        payload: &UpdateGymPayload,
    ) -> Result<Gym, AppError> {
        if id != caller_gym {
            return Err(AppError::GymNotFound);
        }
        self.repo
            .update(self.repo.pool(), id, payload)
            .await?
            .ok_or(AppError::GymNotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::test_db::TestDb;
    use sqlx::postgres::PgPoolOptions;
    use testresult::TestResult;

    // Pool que nunca conecta: a checagem de dono vem antes de qualquer SQL.
    fn offline_service() -> TestResult<GymService> {
        let pool = PgPoolOptions::new().connect_lazy("postgres://nobody@127.0.0.1:1/none")?;
        Ok(GymService::new(GymRepository::new(pool)))
    }

    #[tokio::test]
    async fn another_gyms_id_is_not_found_without_touching_the_database() -> TestResult {
        let service = offline_service()?;
        let mine = Uuid::new_v4();
        let theirs = Uuid::new_v4();

        assert!(matches!(service.get(mine, theirs).await, Err(AppError::GymNotFound)));
        assert!(matches!(
            service.update(mine, theirs, &UpdateGymPayload::default()).await,
            Err(AppError::GymNotFound)
        ));
        Ok(())
    }

    #[tokio::test]
    async fn own_gym_update_keeps_absent_fields() -> TestResult {
        let db = TestDb::new().await;
        let service = GymService::new(GymRepository::new(db.pool.clone()));
        let gym_id = db.gym().await;
        let other_id = db.gym().await;
        let before = service.get(gym_id, gym_id).await?;

        let updated = service
            .update(
                gym_id,
                gym_id,
                &UpdateGymPayload {
                    name: Some("Iron Temple".into()),
                    ..Default::default()
                },
            )
            .await?;
        assert_eq!(updated.name, "Iron Temple");
        assert_eq!(updated.city, before.city);
        assert_eq!(updated.phone, before.phone);

        // Existe no banco, mas é de outra academia.
        assert!(matches!(service.get(gym_id, other_id).await, Err(AppError::GymNotFound)));
        Ok(())
    }
}
