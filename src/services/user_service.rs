// src/services/user_service.rs

use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{user_repo::NewUser, UserRepository},
    models::user::{CreateUserPayload, UpdateUserPayload, User, UserRole},
};

#[derive(Clone)]
pub struct UserService {
    repo: UserRepository,
}

impl UserService {
    pub fn new(repo: UserRepository) -> Self {
        Self { repo }
    }

    pub async fn list(&self, gym_id: Uuid, role: Option<UserRole>) -> Result<Vec<User>, AppError> {
        self.repo.list_by_gym(self.repo.pool(), gym_id, role).await
    }

    pub async fn create(&self, gym_id: Uuid, payload: &CreateUserPayload) -> Result<User, AppError> {
        let user = self
            .repo
            .create_user(
                self.repo.pool(),
                NewUser {
                    email: &payload.email,
                    google_id: None,
                    first_name: &payload.first_name,
                    last_name: &payload.last_name,
                    profile_picture: payload.profile_picture.as_deref(),
                    gym_id,
                    role: payload.role,
                },
            )
            .await?;

        tracing::info!("Usuário {} criado no gym {}", user.id, gym_id);
        Ok(user)
    }

    pub async fn get(&self, gym_id: Uuid, id: Uuid) -> Result<User, AppError> {
        self.repo
            .find_by_id(self.repo.pool(), id)
            .await?
            .filter(|user| user.gym_id == gym_id)
            .ok_or(AppError::UserNotFound)
    }

    pub async fn update(
        &self,
        gym_id: Uuid,
        id: Uuid,
        payload: &UpdateUserPayload,
    ) -> Result<User, AppError> {
        self.repo
            .update(self.repo.pool(), gym_id, id, payload)
            .await?
            .ok_or(AppError::UserNotFound)
    }

    /// Desativa; o registro continua no banco.
    pub async fn deactivate(&self, gym_id: Uuid, id: Uuid) -> Result<User, AppError> {
        let user = self
            .repo
            .deactivate(self.repo.pool(), gym_id, id)
            .await?
            .ok_or(AppError::UserNotFound)?;

        tracing::info!("Usuário {} desativado", id);
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::test_db::TestDb;
    use testresult::TestResult;

    fn payload(email: &str, role: UserRole) -> CreateUserPayload {
        CreateUserPayload {
            email: email.into(),
            first_name: "Caio".into(),
            last_name: "Reis".into(),
            profile_picture: None,
            role,
        }
    }

    #[tokio::test]
    async fn users_of_another_gym_are_not_found() -> TestResult {
        let db = TestDb::new().await;
        let service = UserService::new(UserRepository::new(db.pool.clone()));
        let gym = db.gym().await;
        let other_gym = db.gym().await;

        let user = service.create(gym, &payload("caio@gym.com", UserRole::Trainer)).await?;

        assert_eq!(service.get(gym, user.id).await?.email, "caio@gym.com");
        assert!(matches!(service.get(other_gym, user.id).await, Err(AppError::UserNotFound)));
        assert!(matches!(
            service.update(other_gym, user.id, &UpdateUserPayload::default()).await,
            Err(AppError::UserNotFound)
        ));
        assert!(matches!(
            service.deactivate(other_gym, user.id).await,
            Err(AppError::UserNotFound)
        ));
        assert!(service.list(other_gym, None).await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn listing_filters_by_role_and_deactivate_keeps_the_row() -> TestResult {
        let db = TestDb::new().await;
        let service = UserService::new(UserRepository::new(db.pool.clone()));
        let gym = db.gym().await;

        service.create(gym, &payload("owner@gym.com", UserRole::Owner)).await?;
        let trainer = service.create(gym, &payload("coach@gym.com", UserRole::Trainer)).await?;

        let trainers = service.list(gym, Some(UserRole::Trainer)).await?;
        let ids: Vec<Uuid> = trainers.iter().map(|u| u.id).collect();
        assert_eq!(ids, vec![trainer.id]);

        let deactivated = service.deactivate(gym, trainer.id).await?;
        assert!(!deactivated.is_active);
        assert!(!service.get(gym, trainer.id).await?.is_active);

        assert!(matches!(
            service.create(gym, &payload("coach@gym.com", UserRole::Admin)).await,
            Err(AppError::EmailAlreadyExists)
        ));
        Ok(())
    }
}
