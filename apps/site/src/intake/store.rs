use anyhow::Result;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::intake::validation::NewSignup;
use crate::models::signup::SignupKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted(Uuid),
    /// Waitlist email already on file; nothing written.
    Duplicate,
}

/// Inserts a validated signup. Waitlist emails are unique (case-insensitive);
/// applications are not.
pub async fn insert_signup(pool: &PgPool, signup: &NewSignup, ip_hash: &str) -> Result<InsertOutcome> {
    let id = Uuid::new_v4();
    let conflict_clause = match signup.kind {
        SignupKind::Waitlist => "ON CONFLICT (kind, lower(email)) WHERE kind = 'waitlist' DO NOTHING",
        SignupKind::Application => "",
    };

    let sql = format!(
        r#"
        INSERT INTO signups
            (id, kind, email, name, company, role, team_size, use_case, message, status, ip_hash)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, 'new', $10)
        {conflict_clause}
        RETURNING id
        "#
    );

    let inserted: Option<Uuid> = sqlx::query_scalar(&sql)
        .bind(id)
        .bind(signup.kind.as_str())
        .bind(&signup.email)
        .bind(&signup.name)
        .bind(&signup.company)
        .bind(&signup.role)
        .bind(&signup.team_size)
        .bind(&signup.use_case)
        .bind(&signup.message)
        .bind(ip_hash)
        .fetch_optional(pool)
        .await?;

    Ok(match inserted {
        Some(id) => {
            info!(%id, kind = signup.kind.as_str(), "stored signup");
            InsertOutcome::Inserted(id)
        }
        None => InsertOutcome::Duplicate,
    })
}
