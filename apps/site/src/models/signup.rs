use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignupKind {
    Waitlist,
    Application,
}

impl SignupKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SignupKind::Waitlist => "waitlist",
            SignupKind::Application => "application",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "waitlist" => Some(SignupKind::Waitlist),
            "application" => Some(SignupKind::Application),
            _ => None,
        }
    }
}

/// Triage state set from the admin dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignupStatus {
    New,
    Contacted,
    Qualified,
    Rejected,
}

impl SignupStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SignupStatus::New => "new",
            SignupStatus::Contacted => "contacted",
            SignupStatus::Qualified => "qualified",
            SignupStatus::Rejected => "rejected",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "new" => Some(SignupStatus::New),
            "contacted" => Some(SignupStatus::Contacted),
            "qualified" => Some(SignupStatus::Qualified),
            "rejected" => Some(SignupStatus::Rejected),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SignupRow {
    pub id: Uuid,
    pub kind: String,
    pub email: String,
    pub name: Option<String>,
    pub company: Option<String>,
    pub role: Option<String>,
    pub team_size: Option<String>,
    pub use_case: Option<String>,
    pub message: Option<String>,
    pub status: String,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}
