//! Admin guard chain.
//!
//! Every admin mutation runs, in order: session check, rate limit, the
//! mutation itself, then a best-effort audit write. A failed check
//! short-circuits before anything is changed or recorded.

pub mod audit;
pub mod client;
pub mod clock;
pub mod rate_limit;
pub mod secret;
pub mod session;

use std::future::Future;
use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;

pub use audit::{log_action, AuditAction, AuditSink};
pub use client::{client_key, ClientIp};
pub use rate_limit::{RateLimitOptions, RateLimiter};
pub use session::SessionToken;

use crate::errors::AppError;

/// Bucket shared by every authenticated admin.
pub const ADMIN_BUCKET: &str = "admin";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GuardError {
    #[error("unauthorized")]
    Unauthorized,

    #[error("rate limited")]
    RateLimited,
}

/// Outcome of a guarded mutation: the value to hand back to the caller and the
/// metadata to attach to its audit entry.
pub struct Audited<T, M> {
    pub value: T,
    pub metadata: Option<M>,
}

impl<T, M> Audited<T, M> {
    pub fn new(value: T, metadata: M) -> Self {
        Self {
            value,
            metadata: Some(metadata),
        }
    }

    pub fn bare(value: T) -> Self {
        Self {
            value,
            metadata: None,
        }
    }
}

pub struct AdminGuard {
    admin_key: Option<String>,
    limiter: Arc<RateLimiter>,
    audit: Arc<dyn AuditSink>,
    limits: RateLimitOptions,
}

impl AdminGuard {
    pub fn new(admin_key: Option<String>, limiter: Arc<RateLimiter>, audit: Arc<dyn AuditSink>) -> Self {
        if admin_key.is_none() {
            tracing::warn!("ADMIN_KEY is not set; the admin surface will reject every request");
        }
        Self {
            admin_key,
            limiter,
            audit,
            limits: RateLimitOptions::default(),
        }
    }

    #[cfg(test)]
    pub fn with_limits(mut self, limits: RateLimitOptions) -> Self {
        self.limits = limits;
        self
    }

    pub fn admin_key(&self) -> Option<&str> {
        self.admin_key.as_deref()
    }

    pub fn audit_sink(&self) -> &dyn AuditSink {
        self.audit.as_ref()
    }

    pub fn is_key_valid(&self, candidate: Option<&str>) -> bool {
        secret::is_key_valid(self.admin_key(), candidate)
    }

    /// Session check only, for read-only admin views.
    pub fn assert_session(&self, token: &SessionToken) -> Result<(), GuardError> {
        session::assert_session(token, self.admin_key()).map_err(|e| {
            tracing::warn!("admin request rejected: no valid session");
            e
        })
    }

    /// Runs `mutation` behind the full guard chain and audits it on success.
    ///
    /// Guard failures and mutation errors are returned without an audit entry.
    /// Audit failures are never returned.
    pub async fn run<T, M, F, Fut>(
        &self,
        token: &SessionToken,
        action: AuditAction,
        target_identifier: Option<String>,
        mutation: F,
    ) -> Result<T, AppError>
    where
        M: Serialize,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Audited<T, M>, AppError>>,
    {
        self.assert_session(token)?;
        self.limiter.assert_rate_limit(ADMIN_BUCKET, self.limits)?;

        let Audited { value, metadata } = mutation().await?;

        log_action(self.audit_sink(), action, target_identifier, metadata.as_ref()).await;
        Ok(value)
    }

    /// Best-effort audit of an action that happens outside [`AdminGuard::run`].
    pub async fn record<M: Serialize + ?Sized>(
        &self,
        action: AuditAction,
        target_identifier: Option<String>,
        metadata: Option<&M>,
    ) {
        log_action(self.audit_sink(), action, target_identifier, metadata).await;
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    use serde_json::{json, Value};

    use super::audit::{FailingAuditSink, MemoryAuditSink};
    use super::clock::ManualClock;
    use super::rate_limit::MemoryBucketStore;
    use super::*;

    const KEY: &str = "correct-horse-battery-staple";

    fn guard_with(audit: Arc<dyn AuditSink>, limits: RateLimitOptions) -> AdminGuard {
        let limiter = Arc::new(RateLimiter::new(
            Arc::new(ManualClock::starting_at(0)),
            Arc::new(MemoryBucketStore::new()),
        ));
        AdminGuard::new(Some(KEY.to_string()), limiter, audit).with_limits(limits)
    }

    fn session(value: &str) -> SessionToken {
        SessionToken::new(Some(value.to_string()))
    }

    #[tokio::test]
    async fn test_valid_session_runs_mutation_and_audits() {
        let sink = Arc::new(MemoryAuditSink::default());
        let guard = guard_with(sink.clone(), RateLimitOptions::default());

        let out = guard
            .run(&session(KEY), AuditAction::StatusChange, Some("row-1".into()), || async {
                Ok(Audited::new(7, json!({ "from": "new", "to": "contacted" })))
            })
            .await
            .unwrap();

        assert_eq!(out, 7);
        let entries = sink.entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].action, "status_change");
        assert_eq!(entries[0].target_identifier.as_deref(), Some("row-1"));
    }

    #[tokio::test]
    async fn test_invalid_session_short_circuits_without_side_effects() {
        let sink = Arc::new(MemoryAuditSink::default());
        let guard = guard_with(sink.clone(), RateLimitOptions::default());
        let counter = AtomicU32::new(0);
        let calls = &counter;

        let result = guard
            .run(&session("wrong"), AuditAction::NoteUpdate, None, move || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(Audited::<(), Value>::bare(()))
            })
            .await;

        assert!(matches!(result, Err(AppError::Unauthorized)));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert!(sink.entries().is_empty());
        assert_eq!(guard.limiter.count(ADMIN_BUCKET), 0);
    }

    #[tokio::test]
    async fn test_rate_limit_short_circuits_without_side_effects() {
        let sink = Arc::new(MemoryAuditSink::default());
        let guard = guard_with(sink.clone(), RateLimitOptions::new(2, Duration::from_secs(60)));
        let counter = AtomicU32::new(0);
        let calls = &counter;

        for _ in 0..3 {
            let _ = guard
                .run(&session(KEY), AuditAction::CsvExport, None, move || async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(Audited::<(), Value>::bare(()))
                })
                .await;
        }

        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(sink.entries().len(), 2);

        let last = guard
            .run(&session(KEY), AuditAction::CsvExport, None, || async {
                Ok(Audited::<(), Value>::bare(()))
            })
            .await;
        assert!(matches!(last, Err(AppError::RateLimited)));
    }

    #[tokio::test]
    async fn test_mutation_error_is_not_audited() {
        let sink = Arc::new(MemoryAuditSink::default());
        let guard = guard_with(sink.clone(), RateLimitOptions::default());

        let result = guard
            .run(&session(KEY), AuditAction::StatusChange, None, || async {
                Err::<Audited<(), Value>, _>(AppError::NotFound("missing".into()))
            })
            .await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
        assert!(sink.entries().is_empty());
    }

    #[tokio::test]
    async fn test_audit_failure_does_not_fail_the_action() {
        let guard = guard_with(Arc::new(FailingAuditSink), RateLimitOptions::default());

        let out = guard
            .run(&session(KEY), AuditAction::NoteUpdate, Some("row".into()), || async {
                Ok(Audited::new("saved", json!({ "length": 12 })))
            })
            .await
            .unwrap();

        assert_eq!(out, "saved");
    }

    #[tokio::test]
    async fn test_missing_admin_key_rejects_even_empty_cookie() {
        let limiter = Arc::new(RateLimiter::in_memory());
        let guard = AdminGuard::new(None, limiter, Arc::new(MemoryAuditSink::default()));
        assert_eq!(
            guard.assert_session(&SessionToken::new(Some(String::new()))),
            Err(GuardError::Unauthorized)
        );
        assert!(!guard.is_key_valid(Some("anything")));
    }
}
