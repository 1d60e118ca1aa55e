// src/db/lead_repo.rs

use chrono::{DateTime, Utc};
use sqlx::{types::Json, Executor, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::lead::{Lead, LeadStatus, Note, SortOrder},
    services::{
        lead_mutation::{LeadChange, NewLead},
        lead_query::{LeadQuery, Predicate, SortKey},
    },
};

// Colunas devolvidas em toda leitura de lead (inclui o fullName calculado).
const LEAD_COLUMNS: &str = "id, gym_id, first_name, last_name, \
    first_name || ' ' || last_name AS full_name, \
    phone, email, gender, date_of_birth, height, weight, height_unit, weight_unit, \
    preferences, status, notes, is_archived, last_interaction_date, created_at, updated_at";

#[derive(Clone)]
pub struct LeadRepository {
    pool: PgPool,
}

impl LeadRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    // =========================================================================
    //  LEITURA
    // =========================================================================

    pub async fn find<'e, E>(&self, executor: E, query: &LeadQuery) -> Result<Vec<Lead>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let mut qb = select_query(query);
        let leads = qb.build_query_as::<Lead>().fetch_all(executor).await?;
        Ok(leads)
    }

    pub async fn count<'e, E>(&self, executor: E, query: &LeadQuery) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let mut qb = count_query(query);
        let total = qb.build_query_scalar::<i64>().fetch_one(executor).await?;
        Ok(u64::try_from(total).unwrap_or_default())
    }

    pub async fn find_by_id<'e, E>(
        &self,
        executor: E,
        gym_id: Uuid,
        id: Uuid,
    ) -> Result<Option<Lead>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let lead = sqlx::query_as::<_, Lead>(&format!(
            "SELECT {LEAD_COLUMNS} FROM leads WHERE id = $1 AND gym_id = $2"
        ))
        .bind(id)
        .bind(gym_id)
        .fetch_optional(executor)
        .await?;

        Ok(lead)
    }

    // =========================================================================
    //  ESCRITA (CAMPOS DO TOPO)
    // =========================================================================

    pub async fn insert<'e, E>(&self, executor: E, lead: NewLead) -> Result<Lead, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let created = sqlx::query_as::<_, Lead>(&format!(
            r#"
            INSERT INTO leads (
                id, gym_id, first_name, last_name, phone, email, gender,
                date_of_birth, height, weight, height_unit, weight_unit,
                preferences, status, notes, last_interaction_date
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
            RETURNING {LEAD_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(lead.gym_id)
        .bind(lead.first_name)
        .bind(lead.last_name)
        .bind(lead.phone)
        .bind(lead.email)
        .bind(lead.gender)
        .bind(lead.date_of_birth)
        .bind(lead.height)
        .bind(lead.weight)
        .bind(lead.height_unit)
        .bind(lead.weight_unit)
        .bind(Json(lead.preferences))
        .bind(Json(lead.status))
        .bind(Json(lead.notes))
        .bind(lead.last_interaction_date)
        .fetch_one(executor)
        .await?;

        Ok(created)
    }

    /// SET parcial: só as colunas presentes em `changes`.
    pub async fn apply_changes<'e, E>(
        &self,
        executor: E,
        gym_id: Uuid,
        id: Uuid,
        changes: Vec<LeadChange>,
    ) -> Result<Option<Lead>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let mut qb = update_query(gym_id, id, changes);
        let lead = qb.build_query_as::<Lead>().fetch_optional(executor).await?;
        Ok(lead)
    }

    pub async fn delete<'e, E>(
        &self,
        executor: E,
        gym_id: Uuid,
        id: Uuid,
    ) -> Result<Option<Lead>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let lead = sqlx::query_as::<_, Lead>(&format!(
            "DELETE FROM leads WHERE id = $1 AND gym_id = $2 RETURNING {LEAD_COLUMNS}"
        ))
        .bind(id)
        .bind(gym_id)
        .fetch_optional(executor)
        .await?;

        Ok(lead)
    }

    pub async fn set_archived<'e, E>(
        &self,
        executor: E,
        gym_id: Uuid,
        id: Uuid,
        is_archived: bool,
    ) -> Result<Option<Lead>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let lead = sqlx::query_as::<_, Lead>(&format!(
            r#"
            UPDATE leads SET is_archived = $3, updated_at = NOW()
            WHERE id = $1 AND gym_id = $2
            RETURNING {LEAD_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(gym_id)
        .bind(is_archived)
        .fetch_optional(executor)
        .await?;

        Ok(lead)
    }

    // =========================================================================
    //  SUB-DOCUMENTOS
    // =========================================================================

    /// `||` mescla chave a chave: o que não está no patch fica como estava.
    pub async fn merge_preferences<'e, E>(
        &self,
        executor: E,
        gym_id: Uuid,
        id: Uuid,
        patch: serde_json::Value,
    ) -> Result<Option<Lead>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let lead = sqlx::query_as::<_, Lead>(&format!(
            r#"
            UPDATE leads
            SET preferences = COALESCE(preferences, '{{}}'::jsonb) || $3::jsonb,
                updated_at = NOW()
            WHERE id = $1 AND gym_id = $2
            RETURNING {LEAD_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(gym_id)
        .bind(patch)
        .fetch_optional(executor)
        .await?;

        Ok(lead)
    }

    /// Troca o status inteiro e carimba a última interação.
    pub async fn replace_status<'e, E>(
        &self,
        executor: E,
        gym_id: Uuid,
        id: Uuid,
        status: LeadStatus,
        now: DateTime<Utc>,
    ) -> Result<Option<Lead>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let lead = sqlx::query_as::<_, Lead>(&format!(
            r#"
            UPDATE leads
            SET status = $3, last_interaction_date = $4, updated_at = NOW()
            WHERE id = $1 AND gym_id = $2
            RETURNING {LEAD_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(gym_id)
        .bind(Json(status))
        .bind(now)
        .fetch_optional(executor)
        .await?;

        Ok(lead)
    }

    pub async fn push_note<'e, E>(
        &self,
        executor: E,
        gym_id: Uuid,
        id: Uuid,
        note: Note,
    ) -> Result<Option<Lead>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let now = note.date;
        let lead = sqlx::query_as::<_, Lead>(&format!(
            r#"
            UPDATE leads
            SET notes = notes || $3::jsonb, last_interaction_date = $4, updated_at = NOW()
            WHERE id = $1 AND gym_id = $2
            RETURNING {LEAD_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(gym_id)
        .bind(Json(vec![note]))
        .bind(now)
        .fetch_optional(executor)
        .await?;

        Ok(lead)
    }

    /// Só a `content` muda; id, data e posição da nota ficam.
    /// `None` quando o par (lead, nota) não existe.
    pub async fn set_note_content<'e, E>(
        &self,
        executor: E,
        gym_id: Uuid,
        id: Uuid,
        note_id: Uuid,
        content: &str,
    ) -> Result<Option<Lead>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let lead = sqlx::query_as::<_, Lead>(&format!(
            r#"
            UPDATE leads
            SET notes = (
                    SELECT COALESCE(
                        jsonb_agg(
                            CASE WHEN n->>'_id' = $3
                                 THEN jsonb_set(n, '{{content}}', to_jsonb($4::text))
                                 ELSE n
                            END
                            ORDER BY ord
                        ),
                        '[]'::jsonb
                    )
                    FROM jsonb_array_elements(notes) WITH ORDINALITY AS t(n, ord)
                ),
                updated_at = NOW()
            WHERE id = $1 AND gym_id = $2
              AND notes @> jsonb_build_array(jsonb_build_object('_id', $3::text))
            RETURNING {LEAD_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(gym_id)
        .bind(note_id.to_string())
        .bind(content)
        .fetch_optional(executor)
        .await?;

        Ok(lead)
    }

    pub async fn pull_note<'e, E>(
        &self,
        executor: E,
        gym_id: Uuid,
        id: Uuid,
        note_id: Uuid,
    ) -> Result<Option<Lead>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let lead = sqlx::query_as::<_, Lead>(&format!(
            r#"
            UPDATE leads
            SET notes = (
                    SELECT COALESCE(jsonb_agg(n ORDER BY ord), '[]'::jsonb)
                    FROM jsonb_array_elements(notes) WITH ORDINALITY AS t(n, ord)
                    WHERE n->>'_id' <> $3
                ),
                updated_at = NOW()
            WHERE id = $1 AND gym_id = $2
            RETURNING {LEAD_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(gym_id)
        .bind(note_id.to_string())
        .fetch_optional(executor)
        .await?;

        Ok(lead)
    }

    // =========================================================================
    //  EM LOTE (sem filtro de gym: os ids vêm como estão)
    // =========================================================================

    pub async fn set_archived_many<'e, E>(
        &self,
        executor: E,
        ids: &[Uuid],
        is_archived: bool,
    ) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query(
            "UPDATE leads SET is_archived = $1, updated_at = NOW() WHERE id = ANY($2)",
        )
        .bind(is_archived)
        .bind(ids)
        .execute(executor)
        .await?;

        Ok(result.rows_affected())
    }

    pub async fn delete_many<'e, E>(&self, executor: E, ids: &[Uuid]) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM leads WHERE id = ANY($1)")
            .bind(ids)
            .execute(executor)
            .await?;

        Ok(result.rows_affected())
    }
}

// =============================================================================
//  RENDERIZAÇÃO DA CONSULTA
// =============================================================================

fn select_query(query: &LeadQuery) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new(format!("SELECT {LEAD_COLUMNS} FROM leads"));
    push_filters(&mut qb, query);
    push_sort(&mut qb, query);

    qb.push(" LIMIT ");
    qb.push_bind(to_i64(query.page.limit));
    qb.push(" OFFSET ");
    qb.push_bind(to_i64(query.page.skip()));
    qb
}

fn count_query(query: &LeadQuery) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new("SELECT COUNT(*) FROM leads");
    push_filters(&mut qb, query);
    qb
}

fn push_filters(qb: &mut QueryBuilder<'static, Postgres>, query: &LeadQuery) {
    qb.push(" WHERE gym_id = ");
    qb.push_bind(query.gym_id);
    qb.push(" AND is_archived = ");
    qb.push_bind(query.is_archived);

    for predicate in &query.predicates {
        match predicate {
            Predicate::Exact { field, value } => {
                qb.push(format!(" AND {} = ", field.sql()));
                qb.push_bind(value.clone());
            }
            Predicate::Pattern { fields, pattern } => {
                qb.push(" AND (");
                for (i, field) in fields.iter().enumerate() {
                    if i > 0 {
                        qb.push(" OR ");
                    }
                    qb.push(format!("{} ~* ", field.sql()));
                    qb.push_bind(pattern.clone());
                }
                qb.push(")");
            }
            Predicate::Range { field, from, to } => {
                if let Some(from) = from {
                    qb.push(format!(" AND {} >= ", field.sql()));
                    qb.push_bind(*from);
                }
                if let Some(to) = to {
                    qb.push(format!(" AND {} <= ", field.sql()));
                    qb.push_bind(*to);
                }
            }
        }
    }
}

// Nulos/ausentes vêm primeiro no ASC e por último no DESC.
fn push_sort(qb: &mut QueryBuilder<'static, Postgres>, query: &LeadQuery) {
    let direction = match query.sort.order {
        SortOrder::Asc => "ASC NULLS FIRST",
        SortOrder::Desc => "DESC NULLS LAST",
    };

    match &query.sort.key {
        SortKey::Column(column) => {
            qb.push(format!(" ORDER BY {column} {direction}"));
        }
        SortKey::Json { column, path } => {
            qb.push(format!(" ORDER BY {column} #> "));
            qb.push_bind(path.clone());
            qb.push(format!(" {direction}"));
        }
        SortKey::Unknown(key) => {
            tracing::debug!("sortBy '{}' não corresponde a nenhum campo; sem ordenação", key);
        }
    }
}

fn update_query(
    gym_id: Uuid,
    id: Uuid,
    changes: Vec<LeadChange>,
) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new("UPDATE leads SET updated_at = NOW()");

    for change in changes {
        qb.push(format!(", {} = ", change.column()));
        match change {
            LeadChange::FirstName(v)
            | LeadChange::LastName(v)
            | LeadChange::Phone(v)
            | LeadChange::Email(v)
            | LeadChange::HeightUnit(v)
            | LeadChange::WeightUnit(v) => {
                qb.push_bind(v);
            }
            LeadChange::Gender(v) => {
                qb.push_bind(v);
            }
            LeadChange::DateOfBirth(v) => {
                qb.push_bind(v);
            }
            LeadChange::Height(v) | LeadChange::Weight(v) => {
                qb.push_bind(v);
            }
            LeadChange::Preferences(v) => {
                qb.push_bind(Json(v));
            }
            LeadChange::Status(v) => {
                qb.push_bind(Json(v));
            }
        }
    }

    qb.push(" WHERE id = ");
    qb.push_bind(id);
    qb.push(" AND gym_id = ");
    qb.push_bind(gym_id);
    qb.push(format!(" RETURNING {LEAD_COLUMNS}"));
    qb
}

fn to_i64(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        common::pagination::PageRequest,
        services::lead_query::{LeadField, LeadSort},
    };
    use chrono::TimeZone;

    fn query(predicates: Vec<Predicate>, key: SortKey, order: SortOrder) -> LeadQuery {
        LeadQuery {
            gym_id: Uuid::from_u128(1),
            is_archived: false,
            predicates,
            sort: LeadSort { key, order },
            page: PageRequest::new(Some(2), Some(10)),
        }
    }

    fn where_clause(sql: &str) -> &str {
        let start = sql.find(" WHERE ").unwrap();
        let end = sql.find(" ORDER BY ").or_else(|| sql.find(" LIMIT ")).unwrap_or(sql.len());
        &sql[start..end]
    }

    #[test]
    fn listing_is_always_scoped_by_gym_and_archive_flag() {
        let q = query(vec![], SortKey::Column("last_interaction_date"), SortOrder::Desc);
        let qb = select_query(&q);

        assert_eq!(
            where_clause(qb.sql()),
            " WHERE gym_id = $1 AND is_archived = $2"
        );
        assert!(qb.sql().ends_with(
            " ORDER BY last_interaction_date DESC NULLS LAST LIMIT $3 OFFSET $4"
        ));
    }

    #[test]
    fn search_is_an_or_over_both_names() {
        let q = query(
            vec![Predicate::Pattern {
                fields: vec![LeadField::FirstName, LeadField::LastName],
                pattern: "ana".into(),
            }],
            SortKey::Column("created_at"),
            SortOrder::Asc,
        );
        let qb = select_query(&q);

        assert_eq!(
            where_clause(qb.sql()),
            " WHERE gym_id = $1 AND is_archived = $2 AND (first_name ~* $3 OR last_name ~* $4)"
        );
        assert!(!qb.sql().contains("email ~*"));
        assert!(qb.sql().contains("ORDER BY created_at ASC NULLS FIRST"));
    }

    #[test]
    fn status_filters_read_from_the_jsonb_document() {
        let q = query(
            vec![
                Predicate::Exact {
                    field: LeadField::InterestLevel,
                    value: "Hot".into(),
                },
                Predicate::Exact {
                    field: LeadField::FollowUpStatus,
                    value: "Engaged".into(),
                },
            ],
            SortKey::Unknown("nope".into()),
            SortOrder::Desc,
        );
        let qb = select_query(&q);

        assert!(qb.sql().contains(
            "AND status->>'interestLevel' = $3 AND status->>'followUpStatus' = $4"
        ));
        assert!(!qb.sql().contains("ORDER BY"));
    }

    #[test]
    fn ranges_render_only_present_bounds() {
        let from = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let q = query(
            vec![Predicate::Range {
                field: LeadField::CreatedAt,
                from: Some(from),
                to: None,
            }],
            SortKey::Column("created_at"),
            SortOrder::Desc,
        );
        let qb = count_query(&q);

        assert_eq!(
            qb.sql(),
            "SELECT COUNT(*) FROM leads WHERE gym_id = $1 AND is_archived = $2 AND created_at >= $3"
        );
    }

    #[test]
    fn json_sort_paths_are_bound_not_interpolated() {
        let q = query(
            vec![],
            SortKey::Json {
                column: "status",
                path: vec!["interestLevel'; DROP TABLE leads; --".into()],
            },
            SortOrder::Asc,
        );
        let qb = select_query(&q);

        assert!(qb.sql().contains(" ORDER BY status #> $3 ASC NULLS FIRST"));
        assert!(!qb.sql().contains("DROP TABLE"));
    }

    #[test]
    fn update_sets_only_the_changed_columns() {
        let qb = update_query(
            Uuid::from_u128(1),
            Uuid::from_u128(2),
            vec![
                LeadChange::FirstName("Ana".into()),
                LeadChange::Weight(70.0),
            ],
        );

        assert!(qb.sql().starts_with(
            "UPDATE leads SET updated_at = NOW(), first_name = $1, weight = $2 WHERE id = $3 AND gym_id = $4 RETURNING "
        ));
    }
}
