use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::ModelError;
use crate::notification::NotificationPreferences;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ProfileAddress {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub street: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zip_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfilePreferences {
    pub language: String,
    pub timezone: String,
    pub notifications: NotificationPreferences,
}

impl Default for ProfilePreferences {
    fn default() -> Self {
        Self {
            language: "vi".into(),
            timezone: "Asia/Ho_Chi_Minh".into(),
            notifications: NotificationPreferences { email: true, browser: true, mobile: false },
        }
    }
}

/// The signed-in administrator's own profile.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: u64,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<ProfileAddress>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub biography: Option<String>,
    pub role: String,
    pub permissions: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_login: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub preferences: ProfilePreferences,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileUpdateInput {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub address: Option<ProfileAddress>,
    #[serde(default)]
    pub biography: Option<String>,
    #[serde(default)]
    pub preferences: Option<ProfilePreferences>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PasswordChangeInput {
    pub current_password: String,
    pub new_password: String,
    pub confirm_password: String,
}

impl ProfileUpdateInput {
    pub fn validate(&self) -> Result<(), ModelError> {
        if self.first_name.trim().is_empty() || self.last_name.trim().is_empty() {
            return Err(ModelError::Validation("first and last name required".into()));
        }
        crate::user::validate_email(&self.email)
    }
}

impl UserProfile {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Merge an update: optional fields only overwrite when present.
    pub fn apply(&mut self, input: ProfileUpdateInput, now: DateTime<Utc>) {
        self.first_name = input.first_name;
        self.last_name = input.last_name;
        self.email = input.email;
        if input.phone_number.is_some() {
            self.phone_number = input.phone_number;
        }
        if input.address.is_some() {
            self.address = input.address;
        }
        if input.biography.is_some() {
            self.biography = input.biography;
        }
        if let Some(prefs) = input.preferences {
            self.preferences = prefs;
        }
        self.updated_at = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile() -> UserProfile {
        let now = Utc::now();
        UserProfile {
            id: 1,
            username: "admin".into(),
            email: "admin@example.com".into(),
            first_name: "Viet".into(),
            last_name: "Le".into(),
            avatar: None,
            phone_number: Some("0987654321".into()),
            address: None,
            biography: Some("Frontend Developer".into()),
            role: "Admin".into(),
            permissions: vec!["manage_users".into()],
            last_login: None,
            created_at: now,
            updated_at: now,
            preferences: ProfilePreferences::default(),
        }
    }

    #[test]
    fn apply_only_overwrites_present_optionals() {
        let mut p = profile();
        p.apply(
            ProfileUpdateInput {
                first_name: "Nam".into(),
                last_name: "Tran".into(),
                email: "nam@example.com".into(),
                phone_number: None,
                address: None,
                biography: Some("Backend".into()),
                preferences: None,
            },
            Utc::now(),
        );
        assert_eq!(p.full_name(), "Nam Tran");
        assert_eq!(p.phone_number.as_deref(), Some("0987654321"));
        assert_eq!(p.biography.as_deref(), Some("Backend"));
        assert_eq!(p.preferences.language, "vi");
    }

    #[test]
    fn update_requires_names_and_email() {
        let input = ProfileUpdateInput {
            first_name: "".into(),
            last_name: "Tran".into(),
            email: "nam@example.com".into(),
            phone_number: None,
            address: None,
            biography: None,
            preferences: None,
        };
        assert!(input.validate().is_err());
    }
}
