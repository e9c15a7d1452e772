//! Audit trail for administrative actions.
//!
//! Entries are append-only. Writing one is best-effort: [`log_action`] never
//! returns an error, so a failing sink cannot fail the action being audited.

use std::fmt;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    StatusChange,
    NoteUpdate,
    CsvExport,
    AdminLogin,
    AdminLogout,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditAction::StatusChange => "status_change",
            AuditAction::NoteUpdate => "note_update",
            AuditAction::CsvExport => "csv_export",
            AuditAction::AdminLogin => "admin_login",
            AuditAction::AdminLogout => "admin_logout",
        }
    }
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct AuditEntry {
    pub id: Uuid,
    pub action: String,
    pub target_identifier: Option<String>,
    pub metadata: Option<Value>,
    pub created_at: DateTime<Utc>,
}

impl AuditEntry {
    pub fn new(action: AuditAction, target_identifier: Option<String>, metadata: Option<Value>) -> Self {
        Self {
            id: Uuid::new_v4(),
            action: action.as_str().to_string(),
            target_identifier,
            metadata,
            created_at: Utc::now(),
        }
    }
}

#[async_trait]
pub trait AuditSink: Send + Sync {
    async fn record(&self, entry: &AuditEntry) -> Result<()>;

    /// Most recent entries first.
    async fn recent(&self, limit: i64) -> Result<Vec<AuditEntry>>;
}

/// Postgres-backed sink writing to `audit_log`.
#[derive(Clone)]
pub struct PgAuditSink {
    pool: PgPool,
}

impl PgAuditSink {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AuditSink for PgAuditSink {
    async fn record(&self, entry: &AuditEntry) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO audit_log (id, action, target_identifier, metadata, created_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(entry.id)
        .bind(&entry.action)
        .bind(&entry.target_identifier)
        .bind(&entry.metadata)
        .bind(entry.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn recent(&self, limit: i64) -> Result<Vec<AuditEntry>> {
        Ok(sqlx::query_as::<_, AuditEntry>(
            "SELECT * FROM audit_log ORDER BY created_at DESC LIMIT $1",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?)
    }
}

/// Appends an audit entry. Serialization and persistence failures are logged
/// and swallowed.
pub async fn log_action<M>(
    sink: &dyn AuditSink,
    action: AuditAction,
    target_identifier: Option<String>,
    metadata: Option<&M>,
) where
    M: Serialize + ?Sized,
{
    let metadata = match metadata.map(serde_json::to_value).transpose() {
        Ok(value) => value,
        Err(e) => {
            tracing::error!(%action, "audit metadata could not be serialized: {e}");
            return;
        }
    };

    let entry = AuditEntry::new(action, target_identifier, metadata);
    if let Err(e) = sink.record(&entry).await {
        tracing::error!(%action, target = ?entry.target_identifier, "audit write failed: {e:?}");
    }
}

#[cfg(test)]
pub use test_sinks::{FailingAuditSink, MemoryAuditSink};

#[cfg(test)]
mod test_sinks {
    use std::sync::Mutex;

    use super::*;

    #[derive(Default)]
    pub struct MemoryAuditSink {
        entries: Mutex<Vec<AuditEntry>>,
    }

    impl MemoryAuditSink {
        pub fn entries(&self) -> Vec<AuditEntry> {
            self.entries.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl AuditSink for MemoryAuditSink {
        async fn record(&self, entry: &AuditEntry) -> Result<()> {
            self.entries.lock().unwrap().push(entry.clone());
            Ok(())
        }

        async fn recent(&self, limit: i64) -> Result<Vec<AuditEntry>> {
            let entries = self.entries.lock().unwrap();
            Ok(entries.iter().rev().take(limit as usize).cloned().collect())
        }
    }

    pub struct FailingAuditSink;

    #[async_trait]
    impl AuditSink for FailingAuditSink {
        async fn record(&self, _entry: &AuditEntry) -> Result<()> {
            anyhow::bail!("connection refused")
        }

        async fn recent(&self, _limit: i64) -> Result<Vec<AuditEntry>> {
            anyhow::bail!("connection refused")
        }
    }
}
