// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use crate::common;
use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Auth ---
        handlers::auth::google_login,
        handlers::auth::google_callback,
        handlers::auth::logout,
        handlers::auth::get_me,
        handlers::auth::send_code,
        handlers::auth::verify_code,

        // --- Leads ---
        handlers::leads::list_leads,
        handlers::leads::create_lead,
        handlers::leads::get_lead,
        handlers::leads::update_lead,
        handlers::leads::delete_lead,
        handlers::leads::update_preferences,
        handlers::leads::update_status,
        handlers::leads::archive_lead,
        handlers::leads::add_note,
        handlers::leads::update_note,
        handlers::leads::delete_note,
        handlers::leads::bulk_archive,
        handlers::leads::bulk_delete,

        // --- Gyms ---
        handlers::gyms::create_gym,
        handlers::gyms::get_gym,
        handlers::gyms::update_gym,

        // --- Users ---
        handlers::users::list_users,
        handlers::users::create_user,
        handlers::users::get_user,
        handlers::users::update_user,
        handlers::users::deactivate_user,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::MeUser,
            models::auth::MeResponse,
            models::auth::OkResponse,
            models::auth::SendCodePayload,
            models::auth::VerifyCodePayload,
            models::auth::PhoneCodeResponse,

            // --- Leads ---
            models::lead::Gender,
            models::lead::ActivityLevel,
            models::lead::WellnessGoal,
            models::lead::PrimaryFitnessFocus,
            models::lead::PreferredGymTime,
            models::lead::WorkoutIntensity,
            models::lead::MedicalConcern,
            models::lead::InterestLevel,
            models::lead::FollowUpStatus,
            models::lead::LeadSource,
            models::lead::Preferences,
            models::lead::PreferencesPatch,
            models::lead::LeadStatus,
            models::lead::Note,
            models::lead::Lead,
            models::lead::SortOrder,

            // --- Payloads ---
            models::lead::NotePayload,
            models::lead::StatusPayload,
            models::lead::CreateLeadPayload,
            models::lead::UpdateLeadPayload,
            models::lead::ArchivePayload,
            models::lead::AddNotePayload,
            models::lead::UpdateNotePayload,
            models::lead::BulkArchivePayload,
            models::lead::BulkDeletePayload,
            models::lead::BulkUpdateResult,
            models::lead::BulkDeleteResult,

            // --- Paginação ---
            common::pagination::Pagination,

            // --- Gyms ---
            models::gym::Gym,
            models::gym::CreateGymPayload,
            models::gym::UpdateGymPayload,

            // --- Users ---
            models::user::UserRole,
            models::user::User,
            models::user::CreateUserPayload,
            models::user::UpdateUserPayload,
        )
    ),
    tags(
        (name = "Auth", description = "Login com Google, sessão e verificação de telefone"),
        (name = "Leads", description = "Gestão de Leads da academia"),
        (name = "Gyms", description = "Cadastro da academia"),
        (name = "Users", description = "Usuários da academia")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(
                Http::new(HttpAuthScheme::Bearer)
            ),
        );
    }
}
