//! Field validation for the public intake forms.
//!
//! Forms deserialize every field as optional text, so a missing, blank or
//! out-of-range field produces a field-level message. A body that is not a
//! JSON object of strings never reaches here; the handler answers it with a
//! form-level message.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::models::signup::SignupKind;

pub type FieldErrors = BTreeMap<&'static str, String>;

pub const MAX_EMAIL_LEN: usize = 254;
pub const MAX_NAME_LEN: usize = 120;
pub const MAX_COMPANY_LEN: usize = 160;
pub const MAX_MESSAGE_LEN: usize = 2000;

const ROLES: &[&str] = &[
    "security_engineer",
    "platform_engineer",
    "engineering_leader",
    "founder",
    "other",
];

const TEAM_SIZES: &[&str] = &["1-10", "11-50", "51-200", "201-1000", "1000+"];

const USE_CASES: &[&str] = &[
    "agent_permissions",
    "audit_trails",
    "policy_enforcement",
    "evaluation",
    "other",
];

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WaitlistForm {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApplicationForm {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub team_size: Option<String>,
    #[serde(default)]
    pub use_case: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// A validated submission, ready to persist.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewSignup {
    pub kind: SignupKind,
    pub email: String,
    pub name: Option<String>,
    pub company: Option<String>,
    pub role: Option<String>,
    pub team_size: Option<String>,
    pub use_case: Option<String>,
    pub message: Option<String>,
}

pub fn validate_waitlist(form: &WaitlistForm) -> Result<NewSignup, FieldErrors> {
    let mut errors = FieldErrors::new();

    let email = required_email(form.email.as_deref(), &mut errors);
    let name = optional_text("name", form.name.as_deref(), MAX_NAME_LEN, &mut errors);
    let company = optional_text("company", form.company.as_deref(), MAX_COMPANY_LEN, &mut errors);
    let role = optional_choice("role", form.role.as_deref(), ROLES, &mut errors);

    if !errors.is_empty() {
        return Err(errors);
    }
    Ok(NewSignup {
        kind: SignupKind::Waitlist,
        email: email.unwrap_or_default(),
        name,
        company,
        role,
        team_size: None,
        use_case: None,
        message: None,
    })
}

pub fn validate_application(form: &ApplicationForm) -> Result<NewSignup, FieldErrors> {
    let mut errors = FieldErrors::new();

    let name = required_text("name", form.name.as_deref(), MAX_NAME_LEN, &mut errors);
    let email = required_email(form.email.as_deref(), &mut errors);
    let company = required_text("company", form.company.as_deref(), MAX_COMPANY_LEN, &mut errors);
    let role = required_choice("role", form.role.as_deref(), ROLES, &mut errors);
    let team_size = required_choice("team_size", form.team_size.as_deref(), TEAM_SIZES, &mut errors);
    let use_case = required_choice("use_case", form.use_case.as_deref(), USE_CASES, &mut errors);
    let message = optional_text("message", form.message.as_deref(), MAX_MESSAGE_LEN, &mut errors);

    if !errors.is_empty() {
        return Err(errors);
    }
    Ok(NewSignup {
        kind: SignupKind::Application,
        email: email.unwrap_or_default(),
        name,
        company,
        role,
        team_size,
        use_case,
        message,
    })
}

/// Deliberately loose: one `@`, a non-empty local part, a dotted domain, no
/// whitespace. Deliverability is the email provider's problem.
pub fn is_valid_email(email: &str) -> bool {
    if email.len() > MAX_EMAIL_LEN || email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    let labels: Vec<&str> = domain.split('.').collect();
    labels.len() >= 2 && labels.iter().all(|l| !l.is_empty())
}

fn trimmed(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn required_email(value: Option<&str>, errors: &mut FieldErrors) -> Option<String> {
    match trimmed(value) {
        None => {
            errors.insert("email", "Email is required.".to_string());
            None
        }
        Some(email) if !is_valid_email(email) => {
            errors.insert("email", "Enter a valid email address.".to_string());
            None
        }
        Some(email) => Some(email.to_lowercase()),
    }
}

fn optional_text(
    field: &'static str,
    value: Option<&str>,
    max_len: usize,
    errors: &mut FieldErrors,
) -> Option<String> {
    let value = trimmed(value)?;
    if value.chars().count() > max_len {
        errors.insert(field, format!("Must be {max_len} characters or fewer."));
        return None;
    }
    Some(value.to_string())
}

fn required_text(
    field: &'static str,
    value: Option<&str>,
    max_len: usize,
    errors: &mut FieldErrors,
) -> Option<String> {
    if trimmed(value).is_none() {
        errors.insert(field, "This field is required.".to_string());
        return None;
    }
    optional_text(field, value, max_len, errors)
}

fn optional_choice(
    field: &'static str,
    value: Option<&str>,
    allowed: &[&str],
    errors: &mut FieldErrors,
) -> Option<String> {
    let value = trimmed(value)?;
    if !allowed.contains(&value) {
        errors.insert(field, "Select one of the listed options.".to_string());
        return None;
    }
    Some(value.to_string())
}

fn required_choice(
    field: &'static str,
    value: Option<&str>,
    allowed: &[&str],
    errors: &mut FieldErrors,
) -> Option<String> {
    if trimmed(value).is_none() {
        errors.insert(field, "Please choose an option.".to_string());
        return None;
    }
    optional_choice(field, value, allowed, errors)
}
