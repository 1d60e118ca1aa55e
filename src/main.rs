//src/main.rs

use axum::{
    middleware as axum_middleware,
    routing::{delete, get, patch, post, put},
    Router,
};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod common;
mod config;
mod db;
mod docs;
mod handlers;
mod middleware;
mod models;
mod services;

use crate::config::{AppState, Config};
use crate::docs::ApiDoc;
use crate::middleware::auth::auth_guard;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .compact()
        .init();

    let config = Config::from_env()?;
    let port = config.port;

    let app_state = AppState::new(config).await?;

    // Aplica as migrações do SQLx na inicialização
    sqlx::migrate!().run(&app_state.db_pool).await?;
    tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

    let app = router(app_state);

    let listener = TcpListener::bind(("0.0.0.0", port)).await?;
    tracing::info!("🚀 Servidor escutando em {}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}

fn router(app_state: AppState) -> Router {
    // Rotas públicas de autenticação
    let auth_routes = Router::new()
        .route("/google", get(handlers::auth::google_login))
        .route("/google/callback", get(handlers::auth::google_callback))
        .route("/logout", post(handlers::auth::logout))
        .route("/phone/send-code", post(handlers::auth::send_code))
        .route("/phone/verify-code", post(handlers::auth::verify_code));

    let me_routes = Router::new()
        .route("/me", get(handlers::auth::get_me))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    // As rotas fixas (bulk-*) vêm antes de /{id}; o roteador prioriza o segmento literal.
    let lead_routes = Router::new()
        .route(
            "/",
            get(handlers::leads::list_leads).post(handlers::leads::create_lead),
        )
        .route("/bulk-archive", patch(handlers::leads::bulk_archive))
        .route("/bulk-delete", delete(handlers::leads::bulk_delete))
        .route(
            "/{id}",
            get(handlers::leads::get_lead)
                .put(handlers::leads::update_lead)
                .delete(handlers::leads::delete_lead),
        )
        .route("/{id}/preferences", put(handlers::leads::update_preferences))
        .route("/{id}/status", put(handlers::leads::update_status))
        .route("/{id}/archive", patch(handlers::leads::archive_lead))
        .route("/{id}/notes", post(handlers::leads::add_note))
        .route(
            "/{id}/notes/{note_id}",
            put(handlers::leads::update_note).delete(handlers::leads::delete_note),
        )
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    let gym_routes = Router::new()
        .route("/", post(handlers::gyms::create_gym))
        .route(
            "/{id}",
            get(handlers::gyms::get_gym).put(handlers::gyms::update_gym),
        )
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    let user_routes = Router::new()
        .route(
            "/",
            get(handlers::users::list_users).post(handlers::users::create_user),
        )
        .route(
            "/{id}",
            get(handlers::users::get_user)
                .put(handlers::users::update_user)
                .delete(handlers::users::deactivate_user),
        )
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/api/health", get(|| async { "OK" }))
        .nest("/api/auth", auth_routes.merge(me_routes))
        .nest("/api/leads", lead_routes)
        .nest("/api/gyms", gym_routes)
        .nest("/api/users", user_routes)
        .with_state(app_state)
}
