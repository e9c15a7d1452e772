use anyhow::Result;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::signup::{SignupKind, SignupRow, SignupStatus};

/// Optional filters for the dashboard list and CSV export.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SignupFilter {
    pub kind: Option<SignupKind>,
    pub status: Option<SignupStatus>,
}

/// Newest first.
pub async fn list_signups(pool: &PgPool, filter: SignupFilter) -> Result<Vec<SignupRow>> {
    Ok(sqlx::query_as::<_, SignupRow>(
        r#"
        SELECT id, kind, email, name, company, role, team_size, use_case, message,
               status, notes, created_at
        FROM signups
        WHERE ($1::text IS NULL OR kind = $1)
          AND ($2::text IS NULL OR status = $2)
        ORDER BY created_at DESC
        "#,
    )
    .bind(filter.kind.map(|k| k.as_str()))
    .bind(filter.status.map(|s| s.as_str()))
    .fetch_all(pool)
    .await?)
}

/// Sets the status and returns the previous one, or `None` if no such signup.
pub async fn update_status(pool: &PgPool, id: Uuid, status: SignupStatus) -> Result<Option<String>> {
    Ok(sqlx::query_scalar(
        r#"
        UPDATE signups AS s
        SET status = $2
        FROM (SELECT id, status AS previous FROM signups WHERE id = $1 FOR UPDATE) AS old
        WHERE s.id = old.id
        RETURNING old.previous
        "#,
    )
    .bind(id)
    .bind(status.as_str())
    .fetch_optional(pool)
    .await?)
}

/// Replaces the internal notes. Returns false if no such signup.
pub async fn update_notes(pool: &PgPool, id: Uuid, notes: Option<&str>) -> Result<bool> {
    let result = sqlx::query("UPDATE signups SET notes = $2 WHERE id = $1")
        .bind(id)
        .bind(notes)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
