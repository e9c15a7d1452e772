pub mod csv;

use crate::models::signup::SignupRow;

pub const SIGNUP_HEADERS: &[&str] = &[
    "id",
    "kind",
    "email",
    "name",
    "company",
    "role",
    "team_size",
    "use_case",
    "message",
    "status",
    "notes",
    "created_at",
];

/// Serialises signups in `SIGNUP_HEADERS` column order.
pub fn signups_to_csv(rows: &[SignupRow]) -> String {
    let cells: Vec<Vec<String>> = rows
        .iter()
        .map(|r| {
            let opt = |v: &Option<String>| v.clone().unwrap_or_default();
            vec![
                r.id.to_string(),
                r.kind.clone(),
                r.email.clone(),
                opt(&r.name),
                opt(&r.company),
                opt(&r.role),
                opt(&r.team_size),
                opt(&r.use_case),
                opt(&r.message),
                r.status.clone(),
                opt(&r.notes),
                r.created_at.to_rfc3339(),
            ]
        })
        .collect();
    csv::to_csv(SIGNUP_HEADERS, &cells)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use uuid::Uuid;

    #[test]
    fn test_signup_rows_follow_header_order() {
        let row = SignupRow {
            id: Uuid::nil(),
            kind: "application".into(),
            email: "ada@example.com".into(),
            name: Some("Ada".into()),
            company: None,
            role: Some("founder".into()),
            team_size: Some("11-50".into()),
            use_case: Some("audit_trails".into()),
            message: Some("Hello, world".into()),
            status: "new".into(),
            notes: None,
            created_at: Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap(),
        };

        let csv = signups_to_csv(&[row]);
        let mut lines = csv.split("\r\n");
        assert_eq!(lines.next().unwrap(), SIGNUP_HEADERS.join(","));
        assert_eq!(
            lines.next().unwrap(),
            "00000000-0000-0000-0000-000000000000,application,ada@example.com,Ada,,founder,\
             11-50,audit_trails,\"Hello, world\",new,,2026-01-02T03:04:05+00:00"
        );
        assert!(!csv.contains("abc"), "ip hash must not be exported");
    }
}
