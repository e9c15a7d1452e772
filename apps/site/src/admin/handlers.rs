use std::time::Duration;

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use axum_extra::extract::cookie::CookieJar;
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;
use uuid::Uuid;

use crate::admin::store::{list_signups, update_notes, update_status, SignupFilter};
use crate::errors::{ActionResult, AppError};
use crate::export::signups_to_csv;
use crate::guard::audit::AuditEntry;
use crate::guard::client::hash_ip;
use crate::guard::session::{login_cookie, logout_cookie};
use crate::guard::{client_key, AuditAction, Audited, ClientIp, RateLimitOptions, SessionToken};
use crate::models::signup::{SignupKind, SignupRow, SignupStatus};
use crate::state::AppState;

pub const MAX_NOTES_LEN: usize = 5000;
pub const AUDIT_PAGE_SIZE: i64 = 200;

/// Login attempts allowed per hashed IP per window.
pub const LOGIN_LIMIT: RateLimitOptions = RateLimitOptions {
    max: 10,
    window: Duration::from_secs(15 * 60),
};

#[derive(Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub key: Option<String>,
}

#[derive(Deserialize, Default)]
pub struct SignupQuery {
    pub kind: Option<String>,
    pub status: Option<String>,
}

impl SignupQuery {
    fn into_filter(self) -> Result<SignupFilter, AppError> {
        let kind = match self.kind.as_deref().filter(|k| !k.is_empty()) {
            Some(k) => Some(
                SignupKind::parse(k).ok_or_else(|| AppError::Validation(format!("Unknown kind '{k}'")))?,
            ),
            None => None,
        };
        let status = match self.status.as_deref().filter(|s| !s.is_empty()) {
            Some(s) => Some(
                SignupStatus::parse(s)
                    .ok_or_else(|| AppError::Validation(format!("Unknown status '{s}'")))?,
            ),
            None => None,
        };
        Ok(SignupFilter { kind, status })
    }
}

#[derive(Deserialize)]
pub struct StatusUpdate {
    pub status: String,
}

#[derive(Deserialize)]
pub struct NotesUpdate {
    #[serde(default)]
    pub notes: Option<String>,
}

// Admin extractors are taken as `Result`s so a malformed request is only
// reported after the session check; before it, everything is a 404.

fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    payload
        .map(|Json(value)| value)
        .map_err(|e| AppError::Validation(e.body_text()))
}

fn path_id(id: Result<Path<Uuid>, PathRejection>) -> Result<Uuid, AppError> {
    id.map(|Path(id)| id)
        .map_err(|e| AppError::Validation(e.body_text()))
}

fn query_params(query: Result<Query<SignupQuery>, QueryRejection>) -> Result<SignupQuery, AppError> {
    query
        .map(|Query(q)| q)
        .map_err(|e| AppError::Validation(e.body_text()))
}

fn status_change_metadata(previous: &str, next: SignupStatus) -> Value {
    json!({ "from": previous, "to": next.as_str() })
}

fn export_metadata(rows: usize, kind: Option<&str>) -> Value {
    json!({ "rows": rows, "kind": kind })
}

/// POST /admin/login
pub async fn handle_login(
    State(state): State<AppState>,
    ClientIp(ip): ClientIp,
    jar: CookieJar,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<(CookieJar, Json<ActionResult>), AppError> {
    let salt = &state.config.ip_hash_salt;
    state
        .limiter
        .assert_rate_limit(&client_key("admin-login", &ip, salt), LOGIN_LIMIT)?;

    // A malformed body is just another wrong key.
    let key = payload
        .ok()
        .and_then(|Json(req)| req.key)
        .unwrap_or_default();
    if !state.guard.is_key_valid(Some(key.as_str())) {
        tracing::warn!(ip_hash = %hash_ip(&ip, salt), "admin login rejected");
        return Err(AppError::Unauthorized);
    }

    state
        .guard
        .record(AuditAction::AdminLogin, None, Some(&json!({ "ip_hash": hash_ip(&ip, salt) })))
        .await;
    info!("admin signed in");

    let jar = jar.add(login_cookie(key, state.config.secure_cookies));
    Ok((jar, Json(ActionResult::success("Signed in"))))
}

/// POST /admin/logout
pub async fn handle_logout(
    State(state): State<AppState>,
    token: SessionToken,
    jar: CookieJar,
) -> Result<(CookieJar, Json<ActionResult>), AppError> {
    let result = state
        .guard
        .run(&token, AuditAction::AdminLogout, None, || async {
            Ok(Audited::<_, Value>::bare(ActionResult::success("Signed out")))
        })
        .await?;

    let jar = jar.add(logout_cookie(state.config.secure_cookies));
    Ok((jar, Json(result)))
}

/// GET /admin/signups
pub async fn handle_list_signups(
    State(state): State<AppState>,
    token: SessionToken,
    query: Result<Query<SignupQuery>, QueryRejection>,
) -> Result<Json<Vec<SignupRow>>, AppError> {
    state.guard.assert_session(&token)?;
    let filter = query_params(query)?.into_filter()?;
    Ok(Json(list_signups(&state.db, filter).await?))
}

/// POST /admin/signups/:id/status
pub async fn handle_update_status(
    State(state): State<AppState>,
    token: SessionToken,
    id: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<StatusUpdate>, JsonRejection>,
) -> Result<Json<ActionResult>, AppError> {
    let db = &state.db;
    let target = id.as_ref().ok().map(|Path(id)| id.to_string());
    let result = state
        .guard
        .run(&token, AuditAction::StatusChange, target, || async move {
            let id = path_id(id)?;
            let req = json_body(payload)?;
            let status = SignupStatus::parse(req.status.trim())
                .ok_or_else(|| AppError::Validation(format!("Unknown status '{}'", req.status)))?;
            let previous = update_status(db, id, status)
                .await?
                .ok_or_else(|| AppError::NotFound(format!("Signup {id} not found")))?;

            Ok::<_, AppError>(Audited::new(
                ActionResult::success(format!("Status set to {}", status.as_str())),
                status_change_metadata(&previous, status),
            ))
        })
        .await?;
    Ok(Json(result))
}

/// POST /admin/signups/:id/notes
pub async fn handle_update_notes(
    State(state): State<AppState>,
    token: SessionToken,
    id: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<NotesUpdate>, JsonRejection>,
) -> Result<Json<ActionResult>, AppError> {
    let db = &state.db;
    let target = id.as_ref().ok().map(|Path(id)| id.to_string());
    let result = state
        .guard
        .run(&token, AuditAction::NoteUpdate, target, || async move {
            let id = path_id(id)?;
            let req = json_body(payload)?;
            let notes = req.notes.as_deref().map(str::trim).filter(|n| !n.is_empty());
            let length = notes.map(|n| n.chars().count()).unwrap_or(0);
            if length > MAX_NOTES_LEN {
                return Err(AppError::Validation(format!(
                    "Notes must be {MAX_NOTES_LEN} characters or fewer"
                )));
            }
            if !update_notes(db, id, notes).await? {
                return Err(AppError::NotFound(format!("Signup {id} not found")));
            }

            Ok::<_, AppError>(Audited::new(
                ActionResult::success("Notes saved"),
                json!({ "length": length }),
            ))
        })
        .await?;
    Ok(Json(result))
}

/// GET /admin/export.csv
pub async fn handle_export_csv(
    State(state): State<AppState>,
    token: SessionToken,
    query: Result<Query<SignupQuery>, QueryRejection>,
) -> Result<Response, AppError> {
    let db = &state.db;
    let csv = state
        .guard
        .run(&token, AuditAction::CsvExport, None, || async move {
            let query = query_params(query)?;
            let kind = query.kind.clone();
            let filter = SignupQuery { kind: query.kind, status: None }.into_filter()?;
            let rows = list_signups(db, filter).await?;
            let rows_exported = rows.len();
            Ok::<_, AppError>(Audited::new(
                signups_to_csv(&rows),
                export_metadata(rows_exported, kind.as_deref()),
            ))
        })
        .await?;

    let filename = format!("signups-{}.csv", Utc::now().format("%Y%m%d"));
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
            (header::CACHE_CONTROL, "no-store".to_string()),
        ],
        csv,
    )
        .into_response())
}

/// GET /admin/audit
pub async fn handle_audit_log(
    State(state): State<AppState>,
    token: SessionToken,
) -> Result<Json<Vec<AuditEntry>>, AppError> {
    state.guard.assert_session(&token)?;
    let entries = state.guard.audit_sink().recent(AUDIT_PAGE_SIZE).await?;
    Ok(Json(entries))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::guard::audit::MemoryAuditSink;
    use crate::routes::build_router;
    use crate::state::test_state_with_sink;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use std::sync::Arc;
    use tower::ServiceExt;

    const KEY: &str = "test-admin-key";

    async fn send(app: axum::Router, request: Request<Body>) -> Response {
        app.oneshot(request).await.unwrap()
    }

    fn login_request(key: &str) -> Request<Body> {
        Request::post("/admin/login")
            .header(header::CONTENT_TYPE, "application/json")
            .header("x-forwarded-for", "198.51.100.20")
            .body(Body::from(json!({ "key": key }).to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_login_with_correct_key_sets_cookie_and_audits() {
        let (state, audit) = test_state_with_audit(Some(KEY));
        let response = send(build_router(state), login_request(KEY)).await;

        assert_eq!(response.status(), StatusCode::OK);
        let cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|v| v.to_str().ok())
            .unwrap()
            .to_string();
        assert!(cookie.starts_with("admin_session="));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("Max-Age=28800"));

        let entries = audit.entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].action, "admin_login");
    }

    #[tokio::test]
    async fn test_login_with_wrong_key_is_not_found() {
        let (state, audit) = test_state_with_audit(Some(KEY));
        let response = send(build_router(state), login_request("guess")).await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(response.headers().get(header::SET_COOKIE).is_none());
        assert!(audit.entries().is_empty());
    }

    #[tokio::test]
    async fn test_login_is_rate_limited_per_ip() {
        let (state, _audit) = test_state_with_audit(Some(KEY));
        for _ in 0..LOGIN_LIMIT.max {
            let response = send(build_router(state.clone()), login_request("guess")).await;
            assert_eq!(response.status(), StatusCode::NOT_FOUND);
        }
        let response = send(build_router(state), login_request(KEY)).await;
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    }

    #[tokio::test]
    async fn test_login_disabled_without_configured_key() {
        let (state, _audit) = test_state_with_audit(None);
        let response = send(build_router(state), login_request("")).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_admin_routes_without_session_are_not_found() {
        let (state, audit) = test_state_with_audit(Some(KEY));
        let id = Uuid::new_v4();

        let requests = vec![
            Request::get("/admin/signups").body(Body::empty()).unwrap(),
            Request::get("/admin/export.csv").body(Body::empty()).unwrap(),
            Request::get("/admin/audit").body(Body::empty()).unwrap(),
            Request::post("/admin/logout").body(Body::empty()).unwrap(),
            Request::post(format!("/admin/signups/{id}/status"))
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"status":"contacted"}"#))
                .unwrap(),
            Request::post(format!("/admin/signups/{id}/notes"))
                .header(header::CONTENT_TYPE, "application/json")
                .header(header::COOKIE, "admin_session=wrong")
                .body(Body::from(r#"{"notes":"hi"}"#))
                .unwrap(),
        ];

        for request in requests {
            let uri = request.uri().clone();
            let response = send(build_router(state.clone()), request).await;
            assert_eq!(response.status(), StatusCode::NOT_FOUND, "{uri} should be hidden");
        }
        assert!(audit.entries().is_empty());
        assert_eq!(state.limiter.count(crate::guard::ADMIN_BUCKET), 0);
    }

    #[tokio::test]
    async fn test_logout_clears_cookie_and_audits() {
        let (state, audit) = test_state_with_audit(Some(KEY));
        let request = Request::post("/admin/logout")
            .header(header::COOKIE, format!("admin_session={KEY}"))
            .body(Body::empty())
            .unwrap();
        let response = send(build_router(state), request).await;

        assert_eq!(response.status(), StatusCode::OK);
        let cookie = response.headers().get(header::SET_COOKIE).unwrap().to_str().unwrap();
        assert!(cookie.contains("Max-Age=0"));
        assert_eq!(audit.entries()[0].action, "admin_logout");
    }

    #[tokio::test]
    async fn test_audit_log_lists_recent_entries_with_session() {
        let (state, _audit) = test_state_with_audit(Some(KEY));
        send(build_router(state.clone()), login_request(KEY)).await;

        let request = Request::get("/admin/audit")
            .header(header::COOKIE, format!("admin_session={KEY}"))
            .body(Body::empty())
            .unwrap();
        let response = send(build_router(state), request).await;
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let entries: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(entries[0]["action"], "admin_login");
    }

    fn session_post(uri: String, body: &str) -> Request<Body> {
        Request::post(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::COOKIE, format!("admin_session={KEY}"))
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_malformed_requests_without_session_are_not_found() {
        let (state, audit) = test_state_with_audit(Some(KEY));
        let id = Uuid::new_v4();

        let requests = vec![
            Request::post("/admin/signups/not-a-uuid/status")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"status":"contacted"}"#))
                .unwrap(),
            Request::post(format!("/admin/signups/{id}/notes"))
                .body(Body::from("notes=hi"))
                .unwrap(),
            Request::post(format!("/admin/signups/{id}/status"))
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from("{"))
                .unwrap(),
            Request::post("/admin/login").body(Body::empty()).unwrap(),
            Request::post("/admin/login")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from("{"))
                .unwrap(),
        ];

        for request in requests {
            let uri = request.uri().clone();
            let response = send(build_router(state.clone()), request).await;
            assert_eq!(response.status(), StatusCode::NOT_FOUND, "{uri} should be hidden");
        }
        assert!(audit.entries().is_empty());
    }

    #[tokio::test]
    async fn test_malformed_requests_with_session_are_rejected_as_invalid() {
        let (state, audit) = test_state_with_audit(Some(KEY));

        let bad_id = session_post("/admin/signups/not-a-uuid/status".into(), r#"{"status":"new"}"#);
        let response = send(build_router(state.clone()), bad_id).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let bad_body = session_post(format!("/admin/signups/{}/notes", Uuid::new_v4()), "{");
        let response = send(build_router(state), bad_body).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        assert!(audit.entries().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_status_is_invalid_and_not_audited() {
        let (state, audit) = test_state_with_audit(Some(KEY));
        let request = session_post(
            format!("/admin/signups/{}/status", Uuid::new_v4()),
            r#"{"status":"archived"}"#,
        );
        let response = send(build_router(state), request).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
        assert!(audit.entries().is_empty());
    }

    #[tokio::test]
    async fn test_oversized_notes_are_invalid_and_not_audited() {
        let (state, audit) = test_state_with_audit(Some(KEY));
        let notes = "n".repeat(MAX_NOTES_LEN + 1);
        let request = session_post(
            format!("/admin/signups/{}/notes", Uuid::new_v4()),
            &json!({ "notes": notes }).to_string(),
        );
        let response = send(build_router(state), request).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(audit.entries().is_empty());
    }

    #[tokio::test]
    async fn test_rotating_forwarded_for_does_not_reset_login_limit() {
        let (state, _audit) = test_state_with_audit(Some(KEY));
        for i in 0..LOGIN_LIMIT.max {
            let request = Request::post("/admin/login")
                .header(header::CONTENT_TYPE, "application/json")
                .header("x-forwarded-for", format!("203.0.113.{i}"))
                .body(Body::from(r#"{"key":"guess"}"#))
                .unwrap();
            let response = send(build_router(state.clone()), request).await;
            assert_eq!(response.status(), StatusCode::NOT_FOUND);
        }

        let request = Request::post("/admin/login")
            .header(header::CONTENT_TYPE, "application/json")
            .header("x-forwarded-for", "198.51.100.250")
            .body(Body::from(json!({ "key": KEY }).to_string()))
            .unwrap();
        let response = send(build_router(state), request).await;
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    }

    #[test]
    fn test_status_change_metadata_records_both_states() {
        assert_eq!(
            status_change_metadata("new", SignupStatus::Qualified),
            json!({ "from": "new", "to": "qualified" })
        );
    }

    #[test]
    fn test_export_metadata_records_rows_and_kind() {
        assert_eq!(
            export_metadata(3, Some("waitlist")),
            json!({ "rows": 3, "kind": "waitlist" })
        );
        assert_eq!(export_metadata(0, None), json!({ "rows": 0, "kind": null }));
    }

    #[test]
    fn test_signup_query_rejects_unknown_filters() {
        let query = SignupQuery {
            kind: Some("newsletter".into()),
            status: None,
        };
        assert!(matches!(query.into_filter(), Err(AppError::Validation(_))));

        let query = SignupQuery {
            kind: Some(String::new()),
            status: Some("qualified".into()),
        };
        let filter = query.into_filter().unwrap();
        assert_eq!(filter.kind, None);
        assert_eq!(filter.status, Some(SignupStatus::Qualified));
    }

    fn test_state_with_audit(admin_key: Option<&str>) -> (AppState, Arc<MemoryAuditSink>) {
        let audit = Arc::new(MemoryAuditSink::default());
        let state = test_state_with_sink(admin_key, audit.clone());
        (state, audit)
    }
}
