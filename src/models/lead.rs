// src/models/lead.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::common::{dates, patch};

// =============================================================================
//  ENUMS (os textos são contrato de API, não mexer na grafia)
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "lead_gender")]
pub enum Gender {
    Male,
    Female,
    #[serde(rename = "Non binary/Other")]
    #[sqlx(rename = "Non binary/Other")]
    NonBinaryOther,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum ActivityLevel {
    Sedentary,
    #[serde(rename = "Lightly active")]
    LightlyActive,
    #[serde(rename = "Moderately active")]
    ModeratelyActive,
    #[serde(rename = "Very active")]
    VeryActive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum WellnessGoal {
    #[serde(rename = "Lose weight")]
    LoseWeight,
    #[serde(rename = "Gain weight")]
    GainWeight,
    #[serde(rename = "Build muscle")]
    BuildMuscle,
    #[serde(rename = "Modify My Diet")]
    ModifyMyDiet,
    #[serde(rename = "Manage Stress")]
    ManageStress,
    #[serde(rename = "Improve Step Count")]
    ImproveStepCount,
    #[serde(rename = "General wellness")]
    GeneralWellness,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum PrimaryFitnessFocus {
    #[serde(rename = "Gym workouts")]
    GymWorkouts,
    Yoga,
    Meditation,
    Nutrition,
    Recovery,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum PreferredGymTime {
    Morning,
    Afternoon,
    Evening,
    #[serde(rename = "Late evening")]
    LateEvening,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum WorkoutIntensity {
    Light,
    Moderate,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum MedicalConcern {
    Diabetes,
    Hypertension,
    Asthma,
    Others,
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
pub enum InterestLevel {
    Hot,
    Warm,
    #[default]
    Cold,
}

impl InterestLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            InterestLevel::Hot => "Hot",
            InterestLevel::Warm => "Warm",
            InterestLevel::Cold => "Cold",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
pub enum FollowUpStatus {
    #[default]
    #[serde(rename = "New Inquiry")]
    NewInquiry,
    #[serde(rename = "Needs Follow-Up")]
    NeedsFollowUp,
    Engaged,
    Converted,
    Archived,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum LeadSource {
    #[serde(rename = "Social Media")]
    SocialMedia,
    #[serde(rename = "Word of Mouth")]
    WordOfMouth,
    #[serde(rename = "Walk-in")]
    WalkIn,
    #[serde(rename = "WellVantage B2C App")]
    WellVantageB2CApp,
}

// =============================================================================
//  SUB-DOCUMENTOS (JSONB)
// =============================================================================

/// Preferências do lead. Todos os campos são independentes e opcionais.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Preferences {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub activity_level: Option<ActivityLevel>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub wellness_goals: Option<Vec<WellnessGoal>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary_fitness_focus: Option<PrimaryFitnessFocus>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub preferred_gym_time: Option<PreferredGymTime>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub preferred_workout_intensity: Option<WorkoutIntensity>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub medical_concerns: Option<Vec<MedicalConcern>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(example = "Old knee injury")]
    pub medical_concerns_other: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_gym_experience: Option<bool>,
}

/// Corpo de PUT /leads/:id/preferences. Chave ausente fica como está;
/// `null` explícito limpa o campo gravado.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PreferencesPatch {
    #[serde(
        default,
        deserialize_with = "patch::double_option",
        skip_serializing_if = "Option::is_none"
    )]
    #[schema(value_type = Option<ActivityLevel>)]
    pub activity_level: Option<Option<ActivityLevel>>,

    #[serde(
        default,
        deserialize_with = "patch::double_option",
        skip_serializing_if = "Option::is_none"
    )]
    #[schema(value_type = Option<Vec<WellnessGoal>>)]
    pub wellness_goals: Option<Option<Vec<WellnessGoal>>>,

    #[serde(
        default,
        deserialize_with = "patch::double_option",
        skip_serializing_if = "Option::is_none"
    )]
    #[schema(value_type = Option<PrimaryFitnessFocus>)]
    pub primary_fitness_focus: Option<Option<PrimaryFitnessFocus>>,

    #[serde(
        default,
        deserialize_with = "patch::double_option",
        skip_serializing_if = "Option::is_none"
    )]
    #[schema(value_type = Option<PreferredGymTime>)]
    pub preferred_gym_time: Option<Option<PreferredGymTime>>,

    #[serde(
        default,
        deserialize_with = "patch::double_option",
        skip_serializing_if = "Option::is_none"
    )]
    #[schema(value_type = Option<WorkoutIntensity>)]
    pub preferred_workout_intensity: Option<Option<WorkoutIntensity>>,

    #[serde(
        default,
        deserialize_with = "patch::double_option",
        skip_serializing_if = "Option::is_none"
    )]
    #[schema(value_type = Option<Vec<MedicalConcern>>)]
    pub medical_concerns: Option<Option<Vec<MedicalConcern>>>,

    #[serde(
        default,
        deserialize_with = "patch::double_option",
        skip_serializing_if = "Option::is_none"
    )]
    #[schema(value_type = Option<String>)]
    pub medical_concerns_other: Option<Option<String>>,

    #[serde(
        default,
        deserialize_with = "patch::double_option",
        skip_serializing_if = "Option::is_none"
    )]
    #[schema(value_type = Option<bool>)]
    pub previous_gym_experience: Option<Option<bool>>,
}

/// Situação do lead no funil. Sempre presente, com defaults na criação.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LeadStatus {
    pub inquiry_date: DateTime<Utc>,

    // Texto livre. Não é validado como referência a um usuário.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<String>,

    pub interest_level: InterestLevel,

    pub follow_up_status: FollowUpStatus,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferred_package: Option<String>,

    #[serde(
        default,
        rename = "preferredPTPackage",
        skip_serializing_if = "Option::is_none"
    )]
    pub preferred_pt_package: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub how_heard_about_gym: Option<LeadSource>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Note {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub content: String,
    pub date: DateTime<Utc>,
}

// =============================================================================
//  LEAD
// =============================================================================

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Lead {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub gym_id: Uuid,

    #[schema(example = "Maria")]
    pub first_name: String,
    #[schema(example = "Silva")]
    pub last_name: String,
    // Calculado na consulta: "<firstName> <lastName>"
    pub full_name: String,

    #[schema(example = "+919876543210")]
    pub phone: String,
    #[schema(example = "maria@email.com")]
    pub email: String,
    pub gender: Option<Gender>,
    pub date_of_birth: Option<DateTime<Utc>>,
    pub height: Option<f64>,
    pub weight: Option<f64>,
    pub height_unit: Option<String>,
    pub weight_unit: Option<String>,

    #[sqlx(json)]
    pub preferences: Preferences,
    #[sqlx(json)]
    pub status: LeadStatus,
    #[sqlx(json)]
    pub notes: Vec<Note>,

    pub is_archived: bool,
    pub last_interaction_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
//  PAYLOADS
// =============================================================================

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NotePayload {
    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "Called, will visit on Monday")]
    pub content: String,

    #[serde(default, deserialize_with = "dates::deserialize_optional")]
    #[schema(value_type = Option<String>, format = DateTime)]
    pub date: Option<DateTime<Utc>>,
}

/// Status enviado pelo cliente (criação ou troca do sub-documento inteiro).
#[derive(Debug, Clone, Default, PartialEq, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StatusPayload {
    #[serde(default, deserialize_with = "dates::deserialize_optional")]
    #[schema(value_type = Option<String>, format = DateTime)]
    pub inquiry_date: Option<DateTime<Utc>>,
    pub assigned_to: Option<String>,
    pub interest_level: Option<InterestLevel>,
    pub follow_up_status: Option<FollowUpStatus>,
    pub preferred_package: Option<String>,
    #[serde(rename = "preferredPTPackage")]
    pub preferred_pt_package: Option<String>,
    pub how_heard_about_gym: Option<LeadSource>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateLeadPayload {
    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "Maria")]
    pub first_name: String,

    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "Silva")]
    pub last_name: String,

    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "+919876543210")]
    pub phone: String,

    #[validate(email(message = "invalid_email"))]
    #[schema(example = "maria@email.com")]
    pub email: String,

    pub gender: Option<Gender>,

    #[serde(default, deserialize_with = "dates::deserialize_optional")]
    #[schema(value_type = Option<String>, format = Date, example = "1990-05-20")]
    pub date_of_birth: Option<DateTime<Utc>>,

    pub height: Option<f64>,
    pub weight: Option<f64>,
    #[schema(example = "cm")]
    pub height_unit: Option<String>,
    #[schema(example = "kg")]
    pub weight_unit: Option<String>,

    pub preferences: Option<Preferences>,
    pub status: Option<StatusPayload>,

    #[validate(nested)]
    pub notes: Option<Vec<NotePayload>>,
}

/// PUT /leads/:id. Só as chaves presentes são gravadas; `preferences` e
/// `status`, se vierem, substituem o sub-documento inteiro.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateLeadPayload {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    #[validate(email(message = "invalid_email"))]
    pub email: Option<String>,
    pub gender: Option<Gender>,
    #[serde(default, deserialize_with = "dates::deserialize_optional")]
    #[schema(value_type = Option<String>, format = Date)]
    pub date_of_birth: Option<DateTime<Utc>>,
    pub height: Option<f64>,
    pub weight: Option<f64>,
    pub height_unit: Option<String>,
    pub weight_unit: Option<String>,
    pub preferences: Option<Preferences>,
    pub status: Option<StatusPayload>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ArchivePayload {
    pub is_archived: bool,
}

/// O cliente pode mandar `date`, mas a nota sempre recebe a hora do servidor.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct AddNotePayload {
    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "Asked about the annual plan")]
    pub content: String,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct UpdateNotePayload {
    #[validate(length(min = 1, message = "required"))]
    pub content: String,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BulkArchivePayload {
    pub ids: Vec<Uuid>,
    pub is_archived: bool,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct BulkDeletePayload {
    pub ids: Vec<Uuid>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct BulkUpdateResult {
    pub updated: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct BulkDeleteResult {
    pub deleted: u64,
}

// =============================================================================
//  FILTRO DA LISTAGEM (GET /leads)
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

/// Parâmetros crus da listagem, como chegam na query string.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ListLeadsParams {
    /// Busca parcial (sem diferenciar maiúsculas) em firstName ou lastName.
    pub search: Option<String>,
    /// Hot, Warm, Cold ou os sinônimos antigos high, medium, low.
    pub interest_level: Option<String>,
    /// Aceito, mas ignorado: o filtro por responsável está desligado.
    pub assigned_to: Option<String>,
    /// Comparação exata com status.followUpStatus.
    pub follow_up_status: Option<String>,
    pub created_at_from: Option<String>,
    pub created_at_to: Option<String>,
    /// Dia (YYYY-MM-DD, hora local). Tem precedência sobre createdAtFrom/To.
    pub last_interaction_date: Option<String>,
    pub is_archived: Option<bool>,
    pub page: Option<u64>,
    pub limit: Option<u64>,
    pub sort_by: Option<String>,
    #[param(inline)]
    pub sort_order: Option<SortOrder>,
}
