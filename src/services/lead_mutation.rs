// src/services/lead_mutation.rs
//
// Regras de escrita do lead, sem banco: defaults da criação, patch de
// preferências e as colunas tocadas por um PUT parcial.

use chrono::{DateTime, Utc};
use serde_json::Value;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::lead::{
        CreateLeadPayload, Gender, LeadStatus, Note, NotePayload, Preferences, PreferencesPatch,
        StatusPayload, UpdateLeadPayload,
    },
};

/// Lead pronto para INSERT, com todos os defaults resolvidos.
#[derive(Debug, Clone, PartialEq)]
pub struct NewLead {
    pub gym_id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub email: String,
    pub gender: Option<Gender>,
    pub date_of_birth: Option<DateTime<Utc>>,
    pub height: Option<f64>,
    pub weight: Option<f64>,
    pub height_unit: Option<String>,
    pub weight_unit: Option<String>,
    pub preferences: Preferences,
    pub status: LeadStatus,
    pub notes: Vec<Note>,
    pub last_interaction_date: DateTime<Utc>,
}

impl NewLead {
    pub fn from_payload(gym_id: Uuid, payload: CreateLeadPayload, now: DateTime<Utc>) -> Self {
        let notes = payload
            .notes
            .unwrap_or_default()
            .into_iter()
            .map(|note| note.into_note(now))
            .collect();

        Self {
            gym_id,
            first_name: payload.first_name,
            last_name: payload.last_name,
            phone: payload.phone,
            email: payload.email,
            gender: payload.gender,
            date_of_birth: payload.date_of_birth,
            height: payload.height,
            weight: payload.weight,
            height_unit: payload.height_unit,
            weight_unit: payload.weight_unit,
            preferences: payload.preferences.unwrap_or_default(),
            status: payload.status.unwrap_or_default().into_status(now),
            notes,
            last_interaction_date: now,
        }
    }
}

impl StatusPayload {
    /// Status completo: inquiryDate, interestLevel e followUpStatus ganham
    /// default quando ausentes; o resto fica como veio.
    pub fn into_status(self, now: DateTime<Utc>) -> LeadStatus {
        LeadStatus {
            inquiry_date: self.inquiry_date.unwrap_or(now),
            assigned_to: self.assigned_to,
            interest_level: self.interest_level.unwrap_or_default(),
            follow_up_status: self.follow_up_status.unwrap_or_default(),
            preferred_package: self.preferred_package,
            preferred_pt_package: self.preferred_pt_package,
            how_heard_about_gym: self.how_heard_about_gym,
        }
    }
}

impl NotePayload {
    pub fn into_note(self, now: DateTime<Utc>) -> Note {
        Note::new(self.content, self.date.unwrap_or(now))
    }
}

impl Note {
    pub fn new(content: String, date: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            content,
            date,
        }
    }
}

/// Objeto JSON só com as chaves enviadas (`null` incluído).
/// Aplicado com `||`, deixa intactos os campos que não vieram.
pub fn preference_patch(preferences: &PreferencesPatch) -> Result<Value, AppError> {
    serde_json::to_value(preferences)
        .map_err(|e| anyhow::anyhow!("Falha ao serializar preferências: {}", e).into())
}

/// Uma coluna a ser gravada por PUT /leads/:id.
#[derive(Debug, Clone, PartialEq)]
pub enum LeadChange {
    FirstName(String),
    LastName(String),
    Phone(String),
    Email(String),
    Gender(Gender),
    DateOfBirth(DateTime<Utc>),
    Height(f64),
    Weight(f64),
    HeightUnit(String),
    WeightUnit(String),
    Preferences(Preferences),
    Status(LeadStatus),
}

impl LeadChange {
    pub fn column(&self) -> &'static str {
        match self {
            LeadChange::FirstName(_) => "first_name",
            LeadChange::LastName(_) => "last_name",
            LeadChange::Phone(_) => "phone",
            LeadChange::Email(_) => "email",
            LeadChange::Gender(_) => "gender",
            LeadChange::DateOfBirth(_) => "date_of_birth",
            LeadChange::Height(_) => "height",
            LeadChange::Weight(_) => "weight",
            LeadChange::HeightUnit(_) => "height_unit",
            LeadChange::WeightUnit(_) => "weight_unit",
            LeadChange::Preferences(_) => "preferences",
            LeadChange::Status(_) => "status",
        }
    }
}

impl UpdateLeadPayload {
    /// Só as chaves presentes viram mudança. String vazia é valor, não ausência.
    pub fn into_changes(self, now: DateTime<Utc>) -> Vec<LeadChange> {
        let mut changes = Vec::new();

        if let Some(v) = self.first_name {
            changes.push(LeadChange::FirstName(v));
        }
        if let Some(v) = self.last_name {
            changes.push(LeadChange::LastName(v));
        }
        if let Some(v) = self.phone {
            changes.push(LeadChange::Phone(v));
        }
        if let Some(v) = self.email {
            changes.push(LeadChange::Email(v));
        }
        if let Some(v) = self.gender {
            changes.push(LeadChange::Gender(v));
        }
        if let Some(v) = self.date_of_birth {
            changes.push(LeadChange::DateOfBirth(v));
        }
        if let Some(v) = self.height {
            changes.push(LeadChange::Height(v));
        }
        if let Some(v) = self.weight {
            changes.push(LeadChange::Weight(v));
        }
        if let Some(v) = self.height_unit {
            changes.push(LeadChange::HeightUnit(v));
        }
        if let Some(v) = self.weight_unit {
            changes.push(LeadChange::WeightUnit(v));
        }
        if let Some(v) = self.preferences {
            changes.push(LeadChange::Preferences(v));
        }
        if let Some(v) = self.status {
            changes.push(LeadChange::Status(v.into_status(now)));
        }

        changes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::lead::{ActivityLevel, FollowUpStatus, InterestLevel, LeadSource};
    use chrono::TimeZone;
    use serde_json::json;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    fn create_payload(body: Value) -> CreateLeadPayload {
        serde_json::from_value(body).unwrap()
    }

    #[test]
    fn lead_without_status_gets_cold_new_inquiry() {
        let payload = create_payload(json!({
            "firstName": "Maria",
            "lastName": "Silva",
            "phone": "+919876543210",
            "email": "maria@email.com"
        }));

        let lead = NewLead::from_payload(Uuid::from_u128(1), payload, now());

        assert_eq!(lead.status.interest_level, InterestLevel::Cold);
        assert_eq!(lead.status.follow_up_status, FollowUpStatus::NewInquiry);
        assert_eq!(lead.status.inquiry_date, now());
        assert_eq!(lead.preferences, Preferences::default());
        assert!(lead.notes.is_empty());
        assert_eq!(lead.last_interaction_date, now());
    }

    #[test]
    fn provided_status_values_win_over_defaults() {
        let payload = create_payload(json!({
            "firstName": "Maria",
            "lastName": "Silva",
            "phone": "1",
            "email": "maria@email.com",
            "status": {
                "inquiryDate": "2024-01-10T09:00:00Z",
                "interestLevel": "Hot",
                "followUpStatus": "Engaged",
                "preferredPTPackage": "10 sessions",
                "howHeardAboutGym": "Walk-in"
            }
        }));

        let status = NewLead::from_payload(Uuid::nil(), payload, now()).status;

        assert_eq!(
            status.inquiry_date,
            Utc.with_ymd_and_hms(2024, 1, 10, 9, 0, 0).unwrap()
        );
        assert_eq!(status.interest_level, InterestLevel::Hot);
        assert_eq!(status.follow_up_status, FollowUpStatus::Engaged);
        assert_eq!(status.preferred_pt_package.as_deref(), Some("10 sessions"));
        assert_eq!(status.how_heard_about_gym, Some(LeadSource::WalkIn));
    }

    #[test]
    fn notes_keep_given_date_or_get_now() {
        let payload = create_payload(json!({
            "firstName": "Maria",
            "lastName": "Silva",
            "phone": "1",
            "email": "maria@email.com",
            "notes": [
                { "content": "first", "date": "2024-02-01T00:00:00Z" },
                { "content": "second" }
            ]
        }));

        let notes = NewLead::from_payload(Uuid::nil(), payload, now()).notes;

        assert_eq!(notes.len(), 2);
        assert_eq!(notes[0].content, "first");
        assert_eq!(notes[0].date, Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap());
        assert_eq!(notes[1].date, now());
        assert_ne!(notes[0].id, notes[1].id);
    }

    #[test]
    fn preference_patch_only_carries_present_fields() {
        let prefs: PreferencesPatch =
            serde_json::from_value(json!({ "activityLevel": "Very active" })).unwrap();

        let patch = preference_patch(&prefs).unwrap();

        assert_eq!(patch, json!({ "activityLevel": "Very active" }));
    }

    #[test]
    fn preference_patch_keeps_empty_lists() {
        let prefs = PreferencesPatch {
            medical_concerns: Some(Some(vec![])),
            previous_gym_experience: Some(Some(false)),
            ..Default::default()
        };

        let patch = preference_patch(&prefs).unwrap();

        assert_eq!(
            patch,
            json!({ "medicalConcerns": [], "previousGymExperience": false })
        );
    }

    #[test]
    fn explicit_null_stays_in_the_patch_to_clear_the_field() {
        let prefs: PreferencesPatch = serde_json::from_value(json!({
            "medicalConcerns": null,
            "activityLevel": "Sedentary"
        }))
        .unwrap();

        assert_eq!(prefs.medical_concerns, Some(None));
        assert_eq!(prefs.wellness_goals, None);

        let patch = preference_patch(&prefs).unwrap();

        assert_eq!(
            patch,
            json!({ "activityLevel": "Sedentary", "medicalConcerns": null })
        );
    }

    #[test]
    fn cleared_field_reads_back_as_absent() {
        let stored: Preferences = serde_json::from_value(json!({
            "activityLevel": "Very active",
            "medicalConcerns": null
        }))
        .unwrap();

        assert_eq!(stored.activity_level, Some(ActivityLevel::VeryActive));
        assert_eq!(stored.medical_concerns, None);
    }

    #[test]
    fn status_replacement_drops_fields_not_sent() {
        let payload: StatusPayload =
            serde_json::from_value(json!({ "followUpStatus": "Converted" })).unwrap();

        let status = payload.into_status(now());

        assert_eq!(status.follow_up_status, FollowUpStatus::Converted);
        assert_eq!(status.interest_level, InterestLevel::Cold);
        assert_eq!(status.assigned_to, None);
        assert_eq!(status.preferred_package, None);
        assert_eq!(status.inquiry_date, now());
    }

    #[test]
    fn update_changes_follow_present_keys_only() {
        let payload: UpdateLeadPayload = serde_json::from_value(json!({
            "firstName": "Ana",
            "email": "",
            "weight": 70.5,
            "phone": null
        }))
        .unwrap();

        let changes = payload.into_changes(now());

        assert_eq!(
            changes,
            vec![
                LeadChange::FirstName("Ana".into()),
                LeadChange::Email(String::new()),
                LeadChange::Weight(70.5),
            ]
        );
        let columns: Vec<_> = changes.iter().map(LeadChange::column).collect();
        assert_eq!(columns, vec!["first_name", "email", "weight"]);
    }

    #[test]
    fn empty_update_has_no_changes() {
        assert!(UpdateLeadPayload::default().into_changes(now()).is_empty());
    }
}
