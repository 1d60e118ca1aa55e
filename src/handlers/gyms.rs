// src/handlers/gyms.rs

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{
        error::{ApiError, AppError},
        extract::{AppJson, AppPath},
    },
    config::AppState,
    middleware::tenancy::GymContext,
    models::gym::{CreateGymPayload, Gym, UpdateGymPayload},
};

// POST /api/gyms
#[utoipa::path(
    post,
    path = "/api/gyms",
    tag = "Gyms",
    request_body = CreateGymPayload,
    responses(
        (status = 201, description = "Academia criada", body = Gym),
        (status = 400, description = "Dados inválidos")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_gym(
    State(app_state): State<AppState>,
    AppJson(payload): AppJson<CreateGymPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let gym = app_state.gym_service.create(&payload).await?;
    Ok((StatusCode::CREATED, Json(gym)))
}

// GET /api/gyms/{id}
#[utoipa::path(
    get,
    path = "/api/gyms/{id}",
    tag = "Gyms",
    params(("id" = Uuid, Path, description = "ID da academia")),
    responses(
        (status = 200, description = "Academia", body = Gym),
        (status = 404, description = "Gym not found")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_gym(
    State(app_state): State<AppState>,
    gym: GymContext,
    AppPath(id): AppPath<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let found = app_state.gym_service.get(gym.0, id).await?;
    Ok(Json(found))
}

// PUT /api/gyms/{id}
#[utoipa::path(
    put,
    path = "/api/gyms/{id}",
    tag = "Gyms",
    params(("id" = Uuid, Path, description = "ID da academia")),
    request_body = UpdateGymPayload,
    responses(
        (status = 200, description = "Cadastro atualizado", body = Gym),
        (status = 404, description = "Gym not found")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_gym(
    State(app_state): State<AppState>,
    gym: GymContext,
    AppPath(id): AppPath<Uuid>,
    AppJson(payload): AppJson<UpdateGymPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let updated = app_state.gym_service.update(gym.0, id, &payload).await?;
    Ok(Json(updated))
}
