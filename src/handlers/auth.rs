// src/handlers/auth.rs

use axum::{
    extract::State,
    http::{header::LOCATION, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use axum_extra::extract::{
    cookie::{Cookie, SameSite},
    CookieJar,
};
use serde_json::json;
use validator::Validate;

use crate::{
    common::{
        error::{ApiError, AppError},
        extract::{AppJson, AppQuery},
    },
    config::AppState,
    middleware::auth::{AuthenticatedUser, ACCESS_TOKEN_COOKIE},
    models::auth::{
        GoogleCallbackParams, MeResponse, OAuthLogin, OkResponse, PhoneCodeResponse,
        SendCodePayload, VerifyCodePayload,
    },
};

// O cookie de sessão dura 7 dias, independente do `exp` do token.
const SESSION_COOKIE_DAYS: i64 = 7;

fn session_cookie(token: String, secure: bool) -> Cookie<'static> {
    Cookie::build((ACCESS_TOKEN_COOKIE, token))
        .http_only(true)
        .same_site(SameSite::Lax)
        .path("/")
        .max_age(time::Duration::days(SESSION_COOKIE_DAYS))
        .secure(secure)
        .build()
}

// =============================================================================
//  GOOGLE OAUTH
// =============================================================================

// GET /api/auth/google
#[utoipa::path(
    get,
    path = "/api/auth/google",
    tag = "Auth",
    responses(
        (status = 302, description = "Redireciona para o consentimento do Google"),
        (status = 400, description = "Google OAuth não configurado")
    )
)]
pub async fn google_login(State(app_state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let url = app_state.google_oauth.authorization_url()?;
    Ok((StatusCode::FOUND, [(LOCATION, url.to_string())]))
}

async fn complete_google_login(
    app_state: &AppState,
    params: GoogleCallbackParams,
) -> Result<OAuthLogin, AppError> {
    if let Some(error) = params.error {
        return Err(AppError::OAuthFailed(error));
    }
    let code = params
        .code
        .filter(|c| !c.is_empty())
        .ok_or_else(|| AppError::OAuthFailed("missing authorization code".into()))?;

    let profile = app_state.google_oauth.exchange_code(&code).await?;
    app_state.auth_service.validate_oauth_login(profile).await
}

// GET /api/auth/google/callback
#[utoipa::path(
    get,
    path = "/api/auth/google/callback",
    tag = "Auth",
    params(
        ("code" = Option<String>, Query, description = "Código de autorização do Google")
    ),
    responses(
        (status = 302, description = "Cookie access_token gravado; vai para /register (novo) ou /leads"),
        (status = 500, description = "Falha no login, corpo { message }")
    )
)]
pub async fn google_callback(
    State(app_state): State<AppState>,
    jar: CookieJar,
    AppQuery(params): AppQuery<GoogleCallbackParams>,
) -> Response {
    match complete_google_login(&app_state, params).await {
        Ok(login) => {
            let config = &app_state.config;
            let path = if login.is_new { "/register" } else { "/leads" };
            let location = format!("{}{}", config.frontend_url.trim_end_matches('/'), path);

            tracing::info!("Login Google do usuário {} (novo: {})", login.user.id, login.is_new);

            (
                StatusCode::FOUND,
                jar.add(session_cookie(login.access_token, config.production)),
                [(LOCATION, location)],
            )
                .into_response()
        }
        Err(e) => {
            tracing::error!("[Google Callback Error] {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "message": e.to_string() })),
            )
                .into_response()
        }
    }
}

// =============================================================================
//  SESSÃO
// =============================================================================

// POST /api/auth/logout
#[utoipa::path(
    post,
    path = "/api/auth/logout",
    tag = "Auth",
    responses((status = 200, description = "Cookie removido", body = OkResponse))
)]
pub async fn logout(jar: CookieJar) -> impl IntoResponse {
    (
        jar.remove(Cookie::build(ACCESS_TOKEN_COOKIE).path("/")),
        Json(OkResponse { ok: true }),
    )
}

// GET /api/auth/me
#[utoipa::path(
    get,
    path = "/api/auth/me",
    tag = "Auth",
    responses(
        (status = 200, description = "Usuário logado", body = MeResponse),
        (status = 401, description = "Token ausente, inválido ou de usuário inexistente")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_me(
    State(app_state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> Result<impl IntoResponse, ApiError> {
    let user = app_state.auth_service.get_me(claims.sub).await?;
    Ok(Json(MeResponse { user: user.into() }))
}

// =============================================================================
//  VERIFICAÇÃO DE TELEFONE
// =============================================================================

// POST /api/auth/phone/send-code
#[utoipa::path(
    post,
    path = "/api/auth/phone/send-code",
    tag = "Auth",
    request_body = SendCodePayload,
    responses(
        (status = 200, description = "SMS enviado", body = PhoneCodeResponse),
        (status = 400, description = "Telefone inválido ou verificação não configurada")
    )
)]
pub async fn send_code(
    State(app_state): State<AppState>,
    AppJson(payload): AppJson<SendCodePayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let status = app_state
        .phone_service
        .send_code(&payload.phone, payload.country.as_deref())
        .await?;
    Ok(Json(PhoneCodeResponse { ok: true, status }))
}

// POST /api/auth/phone/verify-code
#[utoipa::path(
    post,
    path = "/api/auth/phone/verify-code",
    tag = "Auth",
    request_body = VerifyCodePayload,
    responses(
        (status = 200, description = "ok = true quando o código foi aprovado", body = PhoneCodeResponse),
        (status = 400, description = "Telefone/código inválido ou verificação não configurada")
    )
)]
pub async fn verify_code(
    State(app_state): State<AppState>,
    AppJson(payload): AppJson<VerifyCodePayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let status = app_state
        .phone_service
        .check_code(&payload.phone, &payload.code, payload.country.as_deref())
        .await?;
    Ok(Json(PhoneCodeResponse {
        ok: status == "approved",
        status,
    }))
}
