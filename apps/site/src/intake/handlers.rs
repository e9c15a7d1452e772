use std::time::Duration;

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use tracing::{error, info};

use crate::errors::ActionResult;
use crate::guard::client::hash_ip;
use crate::guard::{client_key, ClientIp, RateLimitOptions};
use crate::intake::store::{insert_signup, InsertOutcome};
use crate::intake::validation::{
    validate_application, validate_waitlist, ApplicationForm, FieldErrors, NewSignup, WaitlistForm,
};
use crate::models::signup::SignupKind;
use crate::notify::{templates, SideEffects};
use crate::state::AppState;

pub const COOLDOWN_SECS: i64 = 60;

/// Anonymous submissions allowed per hashed IP per window.
pub const INTAKE_LIMIT: RateLimitOptions = RateLimitOptions {
    max: 5,
    window: Duration::from_secs(10 * 60),
};

const GENERIC_FAILURE: &str = "Something went wrong. Please try again in a few minutes.";
const UNREADABLE_FORM: &str = "We couldn't read that submission. Please check the form and try again.";

fn cooldown_cookie_name(kind: SignupKind) -> &'static str {
    match kind {
        SignupKind::Waitlist => "waitlist_cooldown",
        SignupKind::Application => "apply_cooldown",
    }
}

fn cooldown_cookie(kind: SignupKind, secure: bool) -> Cookie<'static> {
    Cookie::build((cooldown_cookie_name(kind), "1"))
        .path("/")
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::seconds(COOLDOWN_SECS))
        .build()
}

/// POST /api/waitlist
pub async fn handle_waitlist(
    State(state): State<AppState>,
    ClientIp(ip): ClientIp,
    jar: CookieJar,
    payload: Result<Json<WaitlistForm>, JsonRejection>,
) -> (CookieJar, Json<ActionResult>) {
    submit(&state, &ip, jar, SignupKind::Waitlist, || {
        read_form(payload, |form| validate_waitlist(&form))
    })
    .await
}

/// POST /api/apply
pub async fn handle_apply(
    State(state): State<AppState>,
    ClientIp(ip): ClientIp,
    jar: CookieJar,
    payload: Result<Json<ApplicationForm>, JsonRejection>,
) -> (CookieJar, Json<ActionResult>) {
    submit(&state, &ip, jar, SignupKind::Application, || {
        read_form(payload, |form| validate_application(&form))
    })
    .await
}

/// A body that doesn't deserialize gets a form-level message; field problems
/// get per-field messages.
fn read_form<T>(
    payload: Result<Json<T>, JsonRejection>,
    validate: impl FnOnce(T) -> Result<NewSignup, FieldErrors>,
) -> Result<NewSignup, ActionResult> {
    let Json(form) = payload.map_err(|e| {
        tracing::debug!("unreadable form body: {}", e.body_text());
        ActionResult::failure(UNREADABLE_FORM)
    })?;
    validate(form).map_err(ActionResult::invalid)
}

/// Cooldown cookie, then per-IP rate limit, then validation, then the write.
/// Emails go out after the write and cannot change the result.
async fn submit<V>(
    state: &AppState,
    ip: &str,
    jar: CookieJar,
    kind: SignupKind,
    validate: V,
) -> (CookieJar, Json<ActionResult>)
where
    V: FnOnce() -> Result<NewSignup, ActionResult>,
{
    if jar.get(cooldown_cookie_name(kind)).is_some() {
        return (
            jar,
            Json(ActionResult::failure(
                "You just submitted this form. Please wait a minute before trying again.",
            )),
        );
    }

    let key = client_key(kind.as_str(), ip, &state.config.ip_hash_salt);
    if state.limiter.assert_rate_limit(&key, INTAKE_LIMIT).is_err() {
        return (jar, Json(ActionResult::failure(GENERIC_FAILURE)));
    }

    let signup = match validate() {
        Ok(signup) => signup,
        Err(result) => return (jar, Json(result)),
    };

    let ip_hash = hash_ip(ip, &state.config.ip_hash_salt);
    let outcome = match insert_signup(&state.db, &signup, &ip_hash).await {
        Ok(outcome) => outcome,
        Err(e) => {
            error!(kind = kind.as_str(), "failed to store signup: {e:?}");
            return (jar, Json(ActionResult::failure(GENERIC_FAILURE)));
        }
    };

    let jar = jar.add(cooldown_cookie(kind, state.config.secure_cookies));

    if outcome == InsertOutcome::Duplicate {
        info!(kind = kind.as_str(), "duplicate waitlist signup ignored");
        return (jar, Json(ActionResult::success("You're already on the list.")));
    }

    let effects = send_notifications(state, &signup).await;
    info!(
        kind = kind.as_str(),
        side_effect_failures = effects.failures(),
        "signup accepted"
    );

    let message = match kind {
        SignupKind::Waitlist => "Thanks! You're on the waitlist.",
        SignupKind::Application => "Thanks! We'll be in touch soon.",
    };
    (jar, Json(ActionResult::success(message)))
}

async fn send_notifications(state: &AppState, signup: &NewSignup) -> SideEffects {
    let mut effects = SideEffects::new();

    let confirmation = match signup.kind {
        SignupKind::Waitlist => templates::waitlist_confirmation(signup),
        SignupKind::Application => templates::application_confirmation(signup),
    };
    effects
        .run("confirmation_email", state.mailer.send(&confirmation))
        .await;

    match state.mailer.team_inbox() {
        Some(inbox) => {
            let notice = templates::team_notification(signup, inbox);
            effects.run("team_notification", state.mailer.send(&notice)).await;
        }
        None => effects.skip("team_notification", "NOTIFY_EMAIL is not set"),
    }

    effects
}
