// src/handlers/leads.rs

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{
        error::{ApiError, AppError},
        extract::{AppJson, AppPath, AppQuery},
        pagination::Paginated,
    },
    config::AppState,
    middleware::tenancy::GymContext,
    models::lead::{
        AddNotePayload, ArchivePayload, BulkArchivePayload, BulkDeletePayload, BulkDeleteResult,
        BulkUpdateResult, CreateLeadPayload, Lead, ListLeadsParams, PreferencesPatch, StatusPayload,
        UpdateLeadPayload, UpdateNotePayload,
    },
};

// =============================================================================
//  LISTAGEM E CRUD
// =============================================================================

// GET /api/leads
#[utoipa::path(
    get,
    path = "/api/leads",
    tag = "Leads",
    params(ListLeadsParams),
    responses(
        (status = 200, description = "Página de leads do gym", body = Paginated<Lead>),
        (status = 400, description = "Filtro inválido")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_leads(
    State(app_state): State<AppState>,
    gym: GymContext,
    AppQuery(params): AppQuery<ListLeadsParams>,
) -> Result<impl IntoResponse, ApiError> {
    let page = app_state.lead_service.list(gym.0, params).await?;
    Ok((StatusCode::OK, Json(page)))
}

// POST /api/leads
#[utoipa::path(
    post,
    path = "/api/leads",
    tag = "Leads",
    request_body = CreateLeadPayload,
    responses(
        (status = 201, description = "Lead criado", body = Lead),
        (status = 400, description = "Dados inválidos")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_lead(
    State(app_state): State<AppState>,
    gym: GymContext,
    AppJson(payload): AppJson<CreateLeadPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let lead = app_state.lead_service.create(gym.0, payload).await?;
    Ok((StatusCode::CREATED, Json(lead)))
}

// GET /api/leads/{id}
#[utoipa::path(
    get,
    path = "/api/leads/{id}",
    tag = "Leads",
    params(("id" = Uuid, Path, description = "ID do lead")),
    responses(
        (status = 200, description = "Lead", body = Lead),
        (status = 404, description = "Lead not found")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_lead(
    State(app_state): State<AppState>,
    gym: GymContext,
    AppPath(id): AppPath<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let lead = app_state.lead_service.get(gym.0, id).await?;
    Ok(Json(lead))
}

// PUT /api/leads/{id}
#[utoipa::path(
    put,
    path = "/api/leads/{id}",
    tag = "Leads",
    params(("id" = Uuid, Path, description = "ID do lead")),
    request_body = UpdateLeadPayload,
    responses(
        (status = 200, description = "Lead atualizado", body = Lead),
        (status = 404, description = "Lead not found")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_lead(
    State(app_state): State<AppState>,
    gym: GymContext,
    AppPath(id): AppPath<Uuid>,
    AppJson(payload): AppJson<UpdateLeadPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let lead = app_state.lead_service.update(gym.0, id, payload).await?;
    Ok(Json(lead))
}

// DELETE /api/leads/{id}
#[utoipa::path(
    delete,
    path = "/api/leads/{id}",
    tag = "Leads",
    params(("id" = Uuid, Path, description = "ID do lead")),
    responses(
        (status = 200, description = "Lead removido, ou null se não existia", body = Option<Lead>)
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_lead(
    State(app_state): State<AppState>,
    gym: GymContext,
    AppPath(id): AppPath<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let deleted = app_state.lead_service.delete(gym.0, id).await?;
    Ok(Json(deleted))
}

// =============================================================================
//  SUB-DOCUMENTOS
// =============================================================================

// PUT /api/leads/{id}/preferences
#[utoipa::path(
    put,
    path = "/api/leads/{id}/preferences",
    tag = "Leads",
    params(("id" = Uuid, Path, description = "ID do lead")),
    request_body = PreferencesPatch,
    responses(
        (status = 200, description = "Preferências mescladas campo a campo", body = Lead),
        (status = 404, description = "Lead not found")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_preferences(
    State(app_state): State<AppState>,
    gym: GymContext,
    AppPath(id): AppPath<Uuid>,
    AppJson(preferences): AppJson<PreferencesPatch>,
) -> Result<impl IntoResponse, ApiError> {
    let lead = app_state
        .lead_service
        .update_preferences(gym.0, id, preferences)
        .await?;
    Ok(Json(lead))
}

// PUT /api/leads/{id}/status
#[utoipa::path(
    put,
    path = "/api/leads/{id}/status",
    tag = "Leads",
    params(("id" = Uuid, Path, description = "ID do lead")),
    request_body = StatusPayload,
    responses(
        (status = 200, description = "Status substituído por inteiro", body = Lead),
        (status = 404, description = "Lead not found")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_status(
    State(app_state): State<AppState>,
    gym: GymContext,
    AppPath(id): AppPath<Uuid>,
    AppJson(status): AppJson<StatusPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let lead = app_state.lead_service.update_status(gym.0, id, status).await?;
    Ok(Json(lead))
}

// PATCH /api/leads/{id}/archive
#[utoipa::path(
    patch,
    path = "/api/leads/{id}/archive",
    tag = "Leads",
    params(("id" = Uuid, Path, description = "ID do lead")),
    request_body = ArchivePayload,
    responses(
        (status = 200, description = "Flag de arquivamento gravada", body = Lead),
        (status = 404, description = "Lead not found")
    ),
    security(("api_jwt" = []))
)]
pub async fn archive_lead(
    State(app_state): State<AppState>,
    gym: GymContext,
    AppPath(id): AppPath<Uuid>,
    AppJson(payload): AppJson<ArchivePayload>,
) -> Result<impl IntoResponse, ApiError> {
    let lead = app_state
        .lead_service
        .archive(gym.0, id, payload.is_archived)
        .await?;
    Ok(Json(lead))
}

// POST /api/leads/{id}/notes
#[utoipa::path(
    post,
    path = "/api/leads/{id}/notes",
    tag = "Leads",
    params(("id" = Uuid, Path, description = "ID do lead")),
    request_body = AddNotePayload,
    responses(
        (status = 201, description = "Nota adicionada, ou null se o lead não existe", body = Option<Lead>)
    ),
    security(("api_jwt" = []))
)]
pub async fn add_note(
    State(app_state): State<AppState>,
    gym: GymContext,
    AppPath(id): AppPath<Uuid>,
    AppJson(payload): AppJson<AddNotePayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let lead = app_state
        .lead_service
        .add_note(gym.0, id, payload.content)
        .await?;
    Ok((StatusCode::CREATED, Json(lead)))
}

// PUT /api/leads/{id}/notes/{note_id}
#[utoipa::path(
    put,
    path = "/api/leads/{id}/notes/{note_id}",
    tag = "Leads",
    params(
        ("id" = Uuid, Path, description = "ID do lead"),
        ("note_id" = Uuid, Path, description = "ID da nota")
    ),
    request_body = UpdateNotePayload,
    responses(
        (status = 200, description = "Conteúdo da nota atualizado", body = Lead),
        (status = 404, description = "Note not found")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_note(
    State(app_state): State<AppState>,
    gym: GymContext,
    AppPath((id, note_id)): AppPath<(Uuid, Uuid)>,
    AppJson(payload): AppJson<UpdateNotePayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let lead = app_state
        .lead_service
        .update_note(gym.0, id, note_id, payload.content)
        .await?;
    Ok(Json(lead))
}

// DELETE /api/leads/{id}/notes/{note_id}
#[utoipa::path(
    delete,
    path = "/api/leads/{id}/notes/{note_id}",
    tag = "Leads",
    params(
        ("id" = Uuid, Path, description = "ID do lead"),
        ("note_id" = Uuid, Path, description = "ID da nota")
    ),
    responses(
        (status = 200, description = "Nota removida, ou null se o lead não existe", body = Option<Lead>)
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_note(
    State(app_state): State<AppState>,
    gym: GymContext,
    AppPath((id, note_id)): AppPath<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, ApiError> {
    let lead = app_state.lead_service.delete_note(gym.0, id, note_id).await?;
    Ok(Json(lead))
}

// =============================================================================
//  EM LOTE
// =============================================================================

// PATCH /api/leads/bulk-archive
#[utoipa::path(
    patch,
    path = "/api/leads/bulk-archive",
    tag = "Leads",
    request_body = BulkArchivePayload,
    responses(
        (status = 200, description = "`updated` = quantidade de ids enviados", body = BulkUpdateResult)
    ),
    security(("api_jwt" = []))
)]
pub async fn bulk_archive(
    State(app_state): State<AppState>,
    _gym: GymContext,
    AppJson(payload): AppJson<BulkArchivePayload>,
) -> Result<impl IntoResponse, ApiError> {
    let result = app_state
        .lead_service
        .bulk_archive(payload.ids, payload.is_archived)
        .await?;
    Ok(Json(result))
}

// DELETE /api/leads/bulk-delete
#[utoipa::path(
    delete,
    path = "/api/leads/bulk-delete",
    tag = "Leads",
    request_body = BulkDeletePayload,
    responses(
        (status = 200, description = "Quantidade removida", body = BulkDeleteResult)
    ),
    security(("api_jwt" = []))
)]
pub async fn bulk_delete(
    State(app_state): State<AppState>,
    _gym: GymContext,
    AppJson(payload): AppJson<BulkDeletePayload>,
) -> Result<impl IntoResponse, ApiError> {
    let result = app_state.lead_service.bulk_delete(payload.ids).await?;
    Ok(Json(result))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{body::to_bytes, response::Response};
    use chrono::Utc;
    use serde_json::{json, Value};
    use testresult::TestResult;

    use super::*;
    use crate::{
        common::pagination::{PageRequest, Pagination},
        models::lead::{FollowUpStatus, InterestLevel, LeadStatus, Preferences},
        services::lead_service::MockLeadService,
    };

    const GYM: Uuid = Uuid::from_u128(0x6d);

    fn lead(id: u128, first: &str, last: &str) -> Lead {
        let now = Utc::now();
        Lead {
            id: Uuid::from_u128(id),
            gym_id: GYM,
            first_name: first.into(),
            last_name: last.into(),
            full_name: format!("{first} {last}"),
            phone: "+919876543210".into(),
            email: format!("{}@mail.com", first.to_lowercase()),
            gender: None,
            date_of_birth: None,
            height: None,
            weight: None,
            height_unit: None,
            weight_unit: None,
            preferences: Preferences::default(),
            status: LeadStatus {
                inquiry_date: now,
                assigned_to: None,
                interest_level: InterestLevel::Cold,
                follow_up_status: FollowUpStatus::NewInquiry,
                preferred_package: None,
                preferred_pt_package: None,
                how_heard_about_gym: None,
            },
            notes: vec![],
            is_archived: false,
            last_interaction_date: now,
            created_at: now,
            updated_at: now,
        }
    }

    fn state(service: MockLeadService) -> State<AppState> {
        State(AppState::for_tests(Arc::new(service)))
    }

    async fn body_json(response: Response) -> TestResult<Value> {
        let bytes = to_bytes(response.into_body(), usize::MAX).await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    #[tokio::test]
    async fn list_returns_data_and_pagination() -> TestResult {
        let mut service = MockLeadService::new();
        service
            .expect_list()
            .once()
            .withf(|gym, params| *gym == GYM && params.interest_level.as_deref() == Some("high"))
            .return_once(|_, _| {
                Ok(Paginated {
                    data: vec![],
                    pagination: Pagination::new(25, PageRequest::new(Some(4), Some(10))),
                })
            });

        let params = ListLeadsParams {
            interest_level: Some("high".into()),
            page: Some(4),
            ..Default::default()
        };
        let response = list_leads(state(service), GymContext(GYM), AppQuery(params))
            .await?
            .into_response();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await?;
        assert_eq!(body["data"], json!([]));
        assert_eq!(
            body["pagination"],
            json!({ "total": 25, "page": 4, "limit": 10, "totalPages": 3 })
        );

        Ok(())
    }

    #[tokio::test]
    async fn list_surfaces_filter_errors_as_400() -> TestResult {
        let mut service = MockLeadService::new();
        service
            .expect_list()
            .return_once(|_, _| Err(AppError::BadRequest("interestLevel inválido".into())));

        let result = list_leads(
            state(service),
            GymContext(GYM),
            AppQuery(ListLeadsParams::default()),
        )
        .await;

        let Err(error) = result else {
            panic!("esperava erro");
        };
        assert_eq!(error.status, StatusCode::BAD_REQUEST);

        Ok(())
    }

    #[tokio::test]
    async fn create_rejects_invalid_email_before_the_service() -> TestResult {
        let mut service = MockLeadService::new();
        service.expect_create().never();

        let payload: CreateLeadPayload = serde_json::from_value(json!({
            "firstName": "Maria",
            "lastName": "Silva",
            "phone": "+919876543210",
            "email": "not-an-email"
        }))?;

        let result = create_lead(state(service), GymContext(GYM), AppJson(payload)).await;

        let Err(error) = result else {
            panic!("esperava erro de validação");
        };
        assert_eq!(error.status, StatusCode::BAD_REQUEST);
        assert!(error.details.is_some_and(|d| d.get("email").is_some()));

        Ok(())
    }

    #[tokio::test]
    async fn create_returns_201_with_full_name() -> TestResult {
        let mut service = MockLeadService::new();
        service
            .expect_create()
            .once()
            .withf(|gym, payload| *gym == GYM && payload.first_name == "Maria")
            .return_once(|_, _| Ok(lead(1, "Maria", "Silva")));

        let payload: CreateLeadPayload = serde_json::from_value(json!({
            "firstName": "Maria",
            "lastName": "Silva",
            "phone": "+919876543210",
            "email": "maria@mail.com"
        }))?;

        let response = create_lead(state(service), GymContext(GYM), AppJson(payload))
            .await?
            .into_response();

        assert_eq!(response.status(), StatusCode::CREATED);
        let body = body_json(response).await?;
        assert_eq!(body["fullName"], "Maria Silva");
        assert_eq!(body["status"]["interestLevel"], "Cold");
        assert_eq!(body["status"]["followUpStatus"], "New Inquiry");
        assert_eq!(body["_id"], Uuid::from_u128(1).to_string());

        Ok(())
    }

    #[tokio::test]
    async fn missing_lead_is_404_with_message() -> TestResult {
        let mut service = MockLeadService::new();
        service
            .expect_get()
            .return_once(|_, _| Err(AppError::LeadNotFound));

        let result = get_lead(state(service), GymContext(GYM), AppPath(Uuid::from_u128(9))).await;

        let Err(error) = result else {
            panic!("esperava 404");
        };
        assert_eq!(error.status, StatusCode::NOT_FOUND);
        assert_eq!(error.error, "Lead not found");

        Ok(())
    }

    #[tokio::test]
    async fn delete_of_missing_lead_returns_null() -> TestResult {
        let mut service = MockLeadService::new();
        service.expect_delete().return_once(|_, _| Ok(None));

        let response = delete_lead(state(service), GymContext(GYM), AppPath(Uuid::from_u128(9)))
            .await?
            .into_response();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await?, Value::Null);

        Ok(())
    }

    #[tokio::test]
    async fn update_note_mismatch_is_note_not_found() -> TestResult {
        let mut service = MockLeadService::new();
        service
            .expect_update_note()
            .once()
            .withf(|_, id, note_id, content| {
                *id == Uuid::from_u128(1) && *note_id == Uuid::from_u128(2) && content == "edit"
            })
            .return_once(|_, _, _, _| Err(AppError::NoteNotFound));

        let result = update_note(
            state(service),
            GymContext(GYM),
            AppPath((Uuid::from_u128(1), Uuid::from_u128(2))),
            AppJson(UpdateNotePayload {
                content: "edit".into(),
            }),
        )
        .await;

        let Err(error) = result else {
            panic!("esperava 404");
        };
        assert_eq!(error.status, StatusCode::NOT_FOUND);
        assert_eq!(error.error, "Note not found");

        Ok(())
    }

    #[tokio::test]
    async fn add_note_ignores_client_date_and_returns_201() -> TestResult {
        let mut service = MockLeadService::new();
        service
            .expect_add_note()
            .once()
            .withf(|gym, _, content| *gym == GYM && content == "Called back")
            .return_once(|_, _, _| Ok(Some(lead(1, "Maria", "Silva"))));

        let payload: AddNotePayload = serde_json::from_value(json!({
            "content": "Called back",
            "date": "1999-01-01"
        }))?;

        let response = add_note(
            state(service),
            GymContext(GYM),
            AppPath(Uuid::from_u128(1)),
            AppJson(payload),
        )
        .await?
        .into_response();

        assert_eq!(response.status(), StatusCode::CREATED);

        Ok(())
    }

    #[tokio::test]
    async fn preferences_body_keeps_null_apart_from_absent() -> TestResult {
        let mut service = MockLeadService::new();
        service
            .expect_update_preferences()
            .once()
            .withf(|_, _, patch| {
                patch.medical_concerns == Some(None)
                    && patch.activity_level.is_none()
                    && patch.previous_gym_experience == Some(Some(true))
            })
            .return_once(|_, id, _| Ok(lead(id.as_u128(), "Sara", "Dias")));

        let patch: PreferencesPatch = serde_json::from_value(json!({
            "medicalConcerns": null,
            "previousGymExperience": true
        }))?;

        let response = update_preferences(
            state(service),
            GymContext(GYM),
            AppPath(Uuid::from_u128(5)),
            AppJson(patch),
        )
        .await?
        .into_response();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await?["fullName"], "Sara Dias");

        Ok(())
    }

    #[tokio::test]
    async fn bulk_archive_forwards_ids_and_flag() -> TestResult {
        let mut service = MockLeadService::new();
        service
            .expect_bulk_archive()
            .once()
            .withf(|ids, archived| ids.len() == 2 && *archived)
            .return_once(|ids, _| {
                Ok(BulkUpdateResult {
                    updated: ids.len() as u64,
                })
            });

        let payload: BulkArchivePayload = serde_json::from_value(json!({
            "ids": [Uuid::from_u128(1), Uuid::from_u128(404)],
            "isArchived": true
        }))?;

        let response = bulk_archive(state(service), GymContext(GYM), AppJson(payload))
            .await?
            .into_response();

        assert_eq!(body_json(response).await?, json!({ "updated": 2 }));

        Ok(())
    }

    #[tokio::test]
    async fn bulk_delete_reports_deleted_count() -> TestResult {
        let mut service = MockLeadService::new();
        service
            .expect_bulk_delete()
            .once()
            .return_once(|_| Ok(BulkDeleteResult { deleted: 1 }));

        let response = bulk_delete(
            state(service),
            GymContext(GYM),
            AppJson(BulkDeletePayload {
                ids: vec![Uuid::from_u128(1), Uuid::from_u128(2)],
            }),
        )
        .await?
        .into_response();

        assert_eq!(body_json(response).await?, json!({ "deleted": 1 }));

        Ok(())
    }
}
