use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

pub const DEFAULT_AIRSOFT_CLUB: &str = "No Club/Freelancer";

#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: i32,
    pub email: String,
    pub username: Option<String>,
    pub airsoft_club: String,
    pub password_hash: String,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn profile(&self) -> UserProfile {
        UserProfile {
            id: self.id,
            email: self.email.clone(),
            username: self.username.clone().unwrap_or_default(),
            airsoft_club: self.airsoft_club.clone(),
            is_admin: self.is_admin,
            created_at: self.created_at,
        }
    }
}

/// Public view of a user; never carries the password hash.
#[derive(Debug, Clone, Serialize)]
pub struct UserProfile {
    pub id: i32,
    pub email: String,
    pub username: String,
    pub airsoft_club: String,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub username: String,
    pub airsoft_club: String,
    pub password_hash: String,
    pub is_admin: bool,
}

pub fn normalize_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Cheap shape check: one `@`, non-empty local part, dotted domain.
pub fn is_plausible_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
}

pub fn normalize_club(raw: Option<&str>) -> String {
    match raw.map(str::trim) {
        Some(club) if !club.is_empty() => club.to_string(),
        _ => DEFAULT_AIRSOFT_CLUB.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emails_are_trimmed_and_lowercased() {
        assert_eq!(normalize_email("  Op@Example.COM "), "op@example.com");
    }

    #[test]
    fn plausible_email_shapes() {
        assert!(is_plausible_email("op@example.com"));
        assert!(!is_plausible_email("op.example.com"));
        assert!(!is_plausible_email("@example.com"));
        assert!(!is_plausible_email("op@example"));
        assert!(!is_plausible_email("op@@example.com"));
        assert!(!is_plausible_email("o p@example.com"));
    }

    #[test]
    fn club_defaults_when_blank() {
        assert_eq!(normalize_club(None), DEFAULT_AIRSOFT_CLUB);
        assert_eq!(normalize_club(Some("   ")), DEFAULT_AIRSOFT_CLUB);
        assert_eq!(normalize_club(Some(" Wolves ")), "Wolves");
    }

    #[test]
    fn profile_hides_password_hash() {
        let user = User {
            id: 1,
            email: "op@example.com".into(),
            username: None,
            airsoft_club: DEFAULT_AIRSOFT_CLUB.into(),
            password_hash: "$argon2id$secret".into(),
            is_admin: false,
            created_at: Utc::now(),
        };
        let json = serde_json::to_value(user.profile()).unwrap();
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["username"], "");
    }
}
