// src/services/lead_query.rs
//
// Traduz os parâmetros de GET /leads numa consulta tipada (LeadQuery).
// Nada aqui toca o banco: o repositório só renderiza o que sai daqui.

use chrono::{DateTime, Days, Months, NaiveDate, TimeZone, Utc};
use uuid::Uuid;

use crate::{
    common::{dates, error::AppError, pagination::PageRequest},
    models::lead::{InterestLevel, ListLeadsParams, SortOrder},
};

/// Campos de lead que podem aparecer num predicado.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeadField {
    FirstName,
    LastName,
    InterestLevel,
    FollowUpStatus,
    LastInteractionDate,
    CreatedAt,
}

impl LeadField {
    /// Expressão SQL da coluna (ou caminho JSONB) correspondente.
    pub fn sql(&self) -> &'static str {
        match self {
            LeadField::FirstName => "first_name",
            LeadField::LastName => "last_name",
            LeadField::InterestLevel => "status->>'interestLevel'",
            LeadField::FollowUpStatus => "status->>'followUpStatus'",
            LeadField::LastInteractionDate => "last_interaction_date",
            LeadField::CreatedAt => "created_at",
        }
    }
}

/// Um filtro por campo. Todos são combinados com AND.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    /// Igualdade de texto.
    Exact { field: LeadField, value: String },
    /// Regex (já escapada, case-insensitive) casando em QUALQUER um dos campos.
    Pattern { fields: Vec<LeadField>, pattern: String },
    /// Intervalo fechado; os limites ausentes não entram.
    Range {
        field: LeadField,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    },
}

/// Chave de ordenação resolvida a partir de `sortBy`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SortKey {
    Column(&'static str),
    /// Caminho dentro de um sub-documento JSONB (ex: status.interestLevel).
    Json { column: &'static str, path: Vec<String> },
    /// Campo que não existe no lead: a ordem fica a cargo do banco.
    Unknown(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeadSort {
    pub key: SortKey,
    pub order: SortOrder,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeadQuery {
    pub gym_id: Uuid,
    pub is_archived: bool,
    pub predicates: Vec<Predicate>,
    pub sort: LeadSort,
    pub page: PageRequest,
}

pub const DEFAULT_SORT_BY: &str = "lastInteractionDate";

/// Monta a consulta de listagem para o gym do chamador.
///
/// Regras:
/// - `search` vazio (ou só espaços) não filtra;
/// - `interestLevel` aceita high/medium/low como sinônimos de Hot/Warm/Cold;
/// - `assignedTo` é aceito e ignorado;
/// - `lastInteractionDate` (um dia) suprime o intervalo de `createdAt`;
/// - `isArchived` ausente vale `false`.
pub fn build_lead_query<Tz: TimeZone>(
    gym_id: Uuid,
    params: &ListLeadsParams,
    tz: &Tz,
) -> Result<LeadQuery, AppError> {
    let mut predicates = Vec::new();

    if let Some(term) = non_empty(&params.search) {
        predicates.push(Predicate::Pattern {
            fields: vec![LeadField::FirstName, LeadField::LastName],
            pattern: regex::escape(term),
        });
    }

    if let Some(raw) = non_empty(&params.interest_level) {
        let level = normalize_interest_level(raw).ok_or_else(|| {
            AppError::BadRequest(format!(
                "interestLevel must be one of Hot, Warm, Cold, high, medium, low (got '{raw}')"
            ))
        })?;
        predicates.push(Predicate::Exact {
            field: LeadField::InterestLevel,
            value: level.as_str().to_string(),
        });
    }

    if non_empty(&params.assigned_to).is_some() {
        tracing::debug!("Filtro assignedTo recebido e ignorado (desativado)");
    }

    if let Some(status) = non_empty(&params.follow_up_status) {
        predicates.push(Predicate::Exact {
            field: LeadField::FollowUpStatus,
            value: status.to_string(),
        });
    }

    if let Some(day) = non_empty(&params.last_interaction_date) {
        let (start, end) = day_window(day, tz)?;
        predicates.push(Predicate::Range {
            field: LeadField::LastInteractionDate,
            from: Some(start),
            to: Some(end),
        });
    } else {
        let from = parse_bound("createdAtFrom", &params.created_at_from)?;
        let to = parse_bound("createdAtTo", &params.created_at_to)?;
        if from.is_some() || to.is_some() {
            predicates.push(Predicate::Range {
                field: LeadField::CreatedAt,
                from,
                to,
            });
        }
    }

    if params.page == Some(0) {
        return Err(AppError::BadRequest("page must be at least 1".into()));
    }
    if params.limit == Some(0) {
        return Err(AppError::BadRequest("limit must be at least 1".into()));
    }

    let sort_by = non_empty(&params.sort_by).unwrap_or(DEFAULT_SORT_BY);

    Ok(LeadQuery {
        gym_id,
        is_archived: params.is_archived.unwrap_or(false),
        predicates,
        sort: LeadSort {
            key: resolve_sort_key(sort_by),
            order: params.sort_order.unwrap_or_default(),
        },
        page: PageRequest::new(params.page, params.limit),
    })
}

/// high → Hot, medium → Warm, low → Cold. Os valores canônicos passam direto.
pub fn normalize_interest_level(raw: &str) -> Option<InterestLevel> {
    match raw {
        "Hot" | "high" => Some(InterestLevel::Hot),
        "Warm" | "medium" => Some(InterestLevel::Warm),
        "Cold" | "low" => Some(InterestLevel::Cold),
        _ => None,
    }
}

/// Janela local `[dia 00:00:00.000, dia 23:59:59.999]` para um `YYYY-MM-DD`.
///
/// Mês ou dia inválidos (ou zero) viram 1; valores fora da faixa transbordam
/// para frente (2024-02-30 cai em 1º de março). Só o ano é obrigatório.
pub fn day_window<Tz: TimeZone>(
    day: &str,
    tz: &Tz,
) -> Result<(DateTime<Utc>, DateTime<Utc>), AppError> {
    let mut parts = day.trim().split('-').map(|p| p.trim().parse::<u32>().ok());

    let year = parts
        .next()
        .flatten()
        .and_then(|y| i32::try_from(y).ok())
        .ok_or_else(|| {
            AppError::BadRequest(format!("lastInteractionDate must be YYYY-MM-DD (got '{day}')"))
        })?;
    let month = parts.next().flatten().filter(|m| *m > 0).unwrap_or(1);
    let dom = parts.next().flatten().filter(|d| *d > 0).unwrap_or(1);

    let date = NaiveDate::from_ymd_opt(year, 1, 1)
        .and_then(|d| d.checked_add_months(Months::new(month - 1)))
        .and_then(|d| d.checked_add_days(Days::new(u64::from(dom - 1))))
        .ok_or_else(|| {
            AppError::BadRequest(format!("lastInteractionDate out of range (got '{day}')"))
        })?;

    let start = date
        .and_hms_milli_opt(0, 0, 0, 0)
        .map(|naive| dates::local_to_utc(tz, naive));
    let end = date
        .and_hms_milli_opt(23, 59, 59, 999)
        .map(|naive| dates::local_to_utc(tz, naive));

    match (start, end) {
        (Some(start), Some(end)) => Ok((start, end)),
        _ => Err(AppError::BadRequest(format!(
            "lastInteractionDate out of range (got '{day}')"
        ))),
    }
}

/// `sortBy` é aplicado como caminho de campo, sem checar se é ordenável.
pub fn resolve_sort_key(sort_by: &str) -> SortKey {
    let column = match sort_by {
        "_id" | "id" => Some("id"),
        "gymId" => Some("gym_id"),
        "firstName" => Some("first_name"),
        "lastName" => Some("last_name"),
        "phone" => Some("phone"),
        "email" => Some("email"),
        "gender" => Some("gender"),
        "dateOfBirth" => Some("date_of_birth"),
        "height" => Some("height"),
        "weight" => Some("weight"),
        "heightUnit" => Some("height_unit"),
        "weightUnit" => Some("weight_unit"),
        "isArchived" => Some("is_archived"),
        "lastInteractionDate" => Some("last_interaction_date"),
        "createdAt" => Some("created_at"),
        "updatedAt" => Some("updated_at"),
        "preferences" => Some("preferences"),
        "status" => Some("status"),
        "notes" => Some("notes"),
        _ => None,
    };
    if let Some(column) = column {
        return SortKey::Column(column);
    }

    if let Some((head, rest)) = sort_by.split_once('.') {
        let column = match head {
            "preferences" => Some("preferences"),
            "status" => Some("status"),
            "notes" => Some("notes"),
            _ => None,
        };
        if let Some(column) = column {
            if !rest.is_empty() {
                return SortKey::Json {
                    column,
                    path: rest.split('.').map(str::to_string).collect(),
                };
            }
        }
    }

    SortKey::Unknown(sort_by.to_string())
}

fn parse_bound(name: &str, raw: &Option<String>) -> Result<Option<DateTime<Utc>>, AppError> {
    match non_empty(raw) {
        None => Ok(None),
        Some(value) => dates::parse_date_time(value)
            .map(Some)
            .ok_or_else(|| AppError::BadRequest(format!("{name} must be a date (got '{value}')"))),
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}
