// src/services/lead_service.rs

use async_trait::async_trait;
use chrono::{Local, Utc};
#[cfg(test)]
use mockall::automock;
use uuid::Uuid;

use crate::{
    common::{
        error::AppError,
        pagination::{Paginated, Pagination},
    },
    db::LeadRepository,
    models::lead::{
        BulkDeleteResult, BulkUpdateResult, CreateLeadPayload, Lead, ListLeadsParams, Note,
        PreferencesPatch, StatusPayload, UpdateLeadPayload,
    },
    services::{
        lead_mutation::{preference_patch, NewLead},
        lead_query::build_lead_query,
    },
};

/// Operações sobre leads, sempre dentro do gym do chamador
/// (exceto as em lote, que recebem ids crus).
#[cfg_attr(test, automock)]
#[async_trait]
pub trait LeadService: Send + Sync {
    /// Filtra, ordena e pagina. Count e busca rodam em paralelo.
    async fn list(&self, gym_id: Uuid, params: ListLeadsParams)
    -> Result<Paginated<Lead>, AppError>;

    async fn create(&self, gym_id: Uuid, payload: CreateLeadPayload) -> Result<Lead, AppError>;

    async fn get(&self, gym_id: Uuid, id: Uuid) -> Result<Lead, AppError>;

    /// Grava só as chaves presentes.
    async fn update(
        &self,
        gym_id: Uuid,
        id: Uuid,
        payload: UpdateLeadPayload,
    ) -> Result<Lead, AppError>;

    /// Merge campo a campo em `preferences`; `null` limpa o campo.
    async fn update_preferences(
        &self,
        gym_id: Uuid,
        id: Uuid,
        preferences: PreferencesPatch,
    ) -> Result<Lead, AppError>;

    /// Substitui `status` por inteiro e atualiza `lastInteractionDate`.
    async fn update_status(
        &self,
        gym_id: Uuid,
        id: Uuid,
        status: StatusPayload,
    ) -> Result<Lead, AppError>;

    /// Remove de vez. `None` se não havia o que remover.
    async fn delete(&self, gym_id: Uuid, id: Uuid) -> Result<Option<Lead>, AppError>;

    async fn archive(&self, gym_id: Uuid, id: Uuid, is_archived: bool)
    -> Result<Lead, AppError>;

    async fn add_note(
        &self,
        gym_id: Uuid,
        id: Uuid,
        content: String,
    ) -> Result<Option<Lead>, AppError>;

    async fn update_note(
        &self,
        gym_id: Uuid,
        id: Uuid,
        note_id: Uuid,
        content: String,
    ) -> Result<Lead, AppError>;

    async fn delete_note(
        &self,
        gym_id: Uuid,
        id: Uuid,
        note_id: Uuid,
    ) -> Result<Option<Lead>, AppError>;

    /// `updated` é o tamanho da lista pedida, não o número de linhas afetadas.
    async fn bulk_archive(
        &self,
        ids: Vec<Uuid>,
        is_archived: bool,
    ) -> Result<BulkUpdateResult, AppError>;

    async fn bulk_delete(&self, ids: Vec<Uuid>) -> Result<BulkDeleteResult, AppError>;
}

#[derive(Clone)]
pub struct PgLeadService {
    repo: LeadRepository,
}

impl PgLeadService {
    pub fn new(repo: LeadRepository) -> Self {
        Self { repo }
    }
}

#[async_trait]
impl LeadService for PgLeadService {
    async fn list(
        &self,
        gym_id: Uuid,
        params: ListLeadsParams,
    ) -> Result<Paginated<Lead>, AppError> {
        let query = build_lead_query(gym_id, &params, &Local)?;
        let pool = self.repo.pool();

        let (total, data) = tokio::try_join!(
            self.repo.count(pool, &query),
            self.repo.find(pool, &query),
        )?;

        Ok(Paginated {
            data,
            pagination: Pagination::new(total, query.page),
        })
    }

    async fn create(&self, gym_id: Uuid, payload: CreateLeadPayload) -> Result<Lead, AppError> {
        let new_lead = NewLead::from_payload(gym_id, payload, Utc::now());
        let lead = self.repo.insert(self.repo.pool(), new_lead).await?;

        tracing::info!("Lead {} criado no gym {}", lead.id, gym_id);
        Ok(lead)
    }

    async fn get(&self, gym_id: Uuid, id: Uuid) -> Result<Lead, AppError> {
        self.repo
            .find_by_id(self.repo.pool(), gym_id, id)
            .await?
            .ok_or(AppError::LeadNotFound)
    }

    async fn update(
        &self,
        gym_id: Uuid,
        id: Uuid,
        payload: UpdateLeadPayload,
    ) -> Result<Lead, AppError> {
        let changes = payload.into_changes(Utc::now());
        tracing::debug!("Lead {}: {} campo(s) alterado(s)", id, changes.len());

        self.repo
            .apply_changes(self.repo.pool(), gym_id, id, changes)
            .await?
            .ok_or(AppError::LeadNotFound)
    }

    async fn update_preferences(
        &self,
        gym_id: Uuid,
        id: Uuid,
        preferences: PreferencesPatch,
    ) -> Result<Lead, AppError> {
        let patch = preference_patch(&preferences)?;

        self.repo
            .merge_preferences(self.repo.pool(), gym_id, id, patch)
            .await?
            .ok_or(AppError::LeadNotFound)
    }

    async fn update_status(
        &self,
        gym_id: Uuid,
        id: Uuid,
        status: StatusPayload,
    ) -> Result<Lead, AppError> {
        let now = Utc::now();

        self.repo
            .replace_status(self.repo.pool(), gym_id, id, status.into_status(now), now)
            .await?
            .ok_or(AppError::LeadNotFound)
    }

    async fn delete(&self, gym_id: Uuid, id: Uuid) -> Result<Option<Lead>, AppError> {
        let deleted = self.repo.delete(self.repo.pool(), gym_id, id).await?;
        if deleted.is_some() {
            tracing::info!("Lead {} removido do gym {}", id, gym_id);
        }
        Ok(deleted)
    }

    async fn archive(
        &self,
        gym_id: Uuid,
        id: Uuid,
        is_archived: bool,
    ) -> Result<Lead, AppError> {
        self.repo
            .set_archived(self.repo.pool(), gym_id, id, is_archived)
            .await?
            .ok_or(AppError::LeadNotFound)
    }

    async fn add_note(
        &self,
        gym_id: Uuid,
        id: Uuid,
        content: String,
    ) -> Result<Option<Lead>, AppError> {
        let note = Note::new(content, Utc::now());
        self.repo.push_note(self.repo.pool(), gym_id, id, note).await
    }

    async fn update_note(
        &self,
        gym_id: Uuid,
        id: Uuid,
        note_id: Uuid,
        content: String,
    ) -> Result<Lead, AppError> {
        self.repo
            .set_note_content(self.repo.pool(), gym_id, id, note_id, &content)
            .await?
            .ok_or(AppError::NoteNotFound)
    }

    async fn delete_note(
        &self,
        gym_id: Uuid,
        id: Uuid,
        note_id: Uuid,
    ) -> Result<Option<Lead>, AppError> {
        self.repo.pull_note(self.repo.pool(), gym_id, id, note_id).await
    }

    async fn bulk_archive(
        &self,
        ids: Vec<Uuid>,
        is_archived: bool,
    ) -> Result<BulkUpdateResult, AppError> {
        let affected = self
            .repo
            .set_archived_many(self.repo.pool(), &ids, is_archived)
            .await?;
        tracing::debug!("bulk-archive: {} pedido(s), {} afetado(s)", ids.len(), affected);

        Ok(BulkUpdateResult {
            updated: ids.len() as u64,
        })
    }

    async fn bulk_delete(&self, ids: Vec<Uuid>) -> Result<BulkDeleteResult, AppError> {
        let deleted = self.repo.delete_many(self.repo.pool(), &ids).await?;
        tracing::info!("bulk-delete: {} lead(s) removido(s)", deleted);

        Ok(BulkDeleteResult { deleted })
    }
}
