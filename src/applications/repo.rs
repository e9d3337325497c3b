use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;

use crate::applications::dto::ApplicationUpdate;

/// Lifecycle stage of a tracked application. Stored as the Postgres enum
/// `application_status`; the wire form is the lowercase tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "application_status", rename_all = "lowercase")]
pub enum ApplicationStatus {
    #[default]
    Saved,
    Applied,
    Oa,
    Interview,
    Offer,
    Rejected,
    Withdrawn,
}

/// Application record in the database. Serialized as-is in responses.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Application {
    pub id: i64,
    pub user_id: i64,
    pub company_name: String,
    pub role: String,
    pub location: Option<String>,
    pub recruiter: Option<String>,
    #[serde(with = "time::serde::rfc3339::option")]
    pub date_applied: Option<OffsetDateTime>,
    pub job_url: Option<String>,
    pub notes: Option<String>,
    pub status: ApplicationStatus,
    #[serde(with = "time::serde::rfc3339")]
    pub last_activity: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// Fields supplied at creation time, already validated.
#[derive(Debug)]
pub struct NewApplication {
    pub company_name: String,
    pub role: String,
    pub location: Option<String>,
    pub recruiter: Option<String>,
    pub date_applied: Option<OffsetDateTime>,
    pub job_url: Option<String>,
    pub notes: Option<String>,
    pub status: ApplicationStatus,
}

const COLUMNS: &str = r#"id, user_id, company_name, role, location, recruiter, date_applied,
                   job_url, notes, status, last_activity, created_at, updated_at"#;

impl Application {
    /// Insert a new row owned by `owner_id`. `last_activity` and the
    /// bookkeeping timestamps come from the database defaults.
    pub async fn create(
        db: &PgPool,
        owner_id: i64,
        fields: NewApplication,
    ) -> sqlx::Result<Application> {
        sqlx::query_as::<_, Application>(&format!(
            r#"
            INSERT INTO applications
                (user_id, company_name, role, location, recruiter, date_applied, job_url, notes, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {COLUMNS}
            "#
        ))
        .bind(owner_id)
        .bind(&fields.company_name)
        .bind(&fields.role)
        .bind(&fields.location)
        .bind(&fields.recruiter)
        .bind(fields.date_applied)
        .bind(&fields.job_url)
        .bind(&fields.notes)
        .bind(fields.status)
        .fetch_one(db)
        .await
    }

    /// All rows owned by `owner_id`, newest first (id breaks ties so the
    /// order is deterministic).
    pub async fn list_by_user(db: &PgPool, owner_id: i64) -> sqlx::Result<Vec<Application>> {
        sqlx::query_as::<_, Application>(&format!(
            r#"
            SELECT {COLUMNS}
            FROM applications
            WHERE user_id = $1
            ORDER BY created_at DESC, id DESC
            "#
        ))
        .bind(owner_id)
        .fetch_all(db)
        .await
    }

    /// Single row scoped by (id, owner). `None` covers both true absence
    /// and rows belonging to someone else, so callers cannot tell the two
    /// apart.
    pub async fn get_by_id(
        db: &PgPool,
        owner_id: i64,
        id: i64,
    ) -> sqlx::Result<Option<Application>> {
        sqlx::query_as::<_, Application>(&format!(
            r#"
            SELECT {COLUMNS}
            FROM applications
            WHERE id = $1 AND user_id = $2
            "#
        ))
        .bind(id)
        .bind(owner_id)
        .fetch_optional(db)
        .await
    }

    /// Partial update inside a transaction: read the owned row, apply the
    /// field mask, write every column back with a fresh `updated_at`. An
    /// error anywhere before commit rolls the whole thing back. The read
    /// takes a row lock (`FOR UPDATE`) so concurrent partial updates on
    /// the same row serialize instead of overwriting each other's fields.
    pub async fn update(
        db: &PgPool,
        owner_id: i64,
        id: i64,
        mask: &ApplicationUpdate,
    ) -> sqlx::Result<Option<Application>> {
        let mut tx = db.begin().await?;

        let current = sqlx::query_as::<_, Application>(&format!(
            r#"
            SELECT {COLUMNS}
            FROM applications
            WHERE id = $1 AND user_id = $2
            FOR UPDATE
            "#
        ))
        .bind(id)
        .bind(owner_id)
        .fetch_optional(&mut *tx)
        .await?;

        let mut app = match current {
            Some(app) => app,
            None => return Ok(None),
        };
        mask.apply(&mut app);

        let updated = sqlx::query_as::<_, Application>(&format!(
            r#"
            UPDATE applications
            SET company_name = $3, role = $4, location = $5, recruiter = $6,
                date_applied = $7, job_url = $8, notes = $9, status = $10,
                updated_at = now()
            WHERE id = $1 AND user_id = $2
            RETURNING {COLUMNS}
            "#
        ))
        .bind(id)
        .bind(owner_id)
        .bind(&app.company_name)
        .bind(&app.role)
        .bind(&app.location)
        .bind(&app.recruiter)
        .bind(app.date_applied)
        .bind(&app.job_url)
        .bind(&app.notes)
        .bind(app.status)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(Some(updated))
    }

    /// Physically remove the owned row; false when nothing matched.
    pub async fn delete(db: &PgPool, owner_id: i64, id: i64) -> sqlx::Result<bool> {
        let result = sqlx::query("DELETE FROM applications WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(owner_id)
            .execute(db)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
