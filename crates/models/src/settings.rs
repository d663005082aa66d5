use serde::{Deserialize, Serialize};

use crate::errors::ModelError;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneralSettings {
    pub site_name: String,
    pub site_description: String,
    pub contact_email: String,
    pub contact_phone: String,
    pub address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub favicon: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailSettings {
    pub smtp_host: String,
    pub smtp_port: u16,
    pub smtp_user: String,
    pub smtp_password: String,
    pub sender_name: String,
    pub sender_email: String,
    pub enable_ssl: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationSettings {
    pub enable_email_notifications: bool,
    pub new_order_notification: bool,
    pub order_status_notification: bool,
    pub low_stock_notification: bool,
    pub low_stock_threshold: u32,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecuritySettings {
    pub password_min_length: u32,
    pub password_require_uppercase: bool,
    pub password_require_numbers: bool,
    pub password_require_symbols: bool,
    pub max_login_attempts: u32,
    /// minutes
    pub lockout_duration: u32,
    /// minutes
    pub session_timeout: u32,
    pub enable_two_factor: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct SystemSettings {
    pub general: GeneralSettings,
    pub email: EmailSettings,
    pub notification: NotificationSettings,
    pub security: SecuritySettings,
}

/// Section-level patch: a present section replaces the stored one wholesale.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct SettingsPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub general: Option<GeneralSettings>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<EmailSettings>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notification: Option<NotificationSettings>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub security: Option<SecuritySettings>,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            site_name: "Admin Dashboard".into(),
            site_description: "Administration console".into(),
            contact_email: "admin@example.com".into(),
            contact_phone: "0123456789".into(),
            address: "Ha Noi, Viet Nam".into(),
            logo: None,
            favicon: None,
        }
    }
}

impl Default for EmailSettings {
    fn default() -> Self {
        Self {
            smtp_host: "smtp.example.com".into(),
            smtp_port: 587,
            smtp_user: String::new(),
            smtp_password: String::new(),
            sender_name: "Admin System".into(),
            sender_email: "noreply@example.com".into(),
            enable_ssl: true,
        }
    }
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            enable_email_notifications: true,
            new_order_notification: true,
            order_status_notification: true,
            low_stock_notification: true,
            low_stock_threshold: 10,
        }
    }
}

impl Default for SecuritySettings {
    fn default() -> Self {
        Self {
            password_min_length: 8,
            password_require_uppercase: true,
            password_require_numbers: true,
            password_require_symbols: true,
            max_login_attempts: 5,
            lockout_duration: 30,
            session_timeout: 60,
            enable_two_factor: false,
        }
    }
}

impl SystemSettings {
    pub fn merge(&mut self, patch: SettingsPatch) {
        if let Some(general) = patch.general { self.general = general; }
        if let Some(email) = patch.email { self.email = email; }
        if let Some(notification) = patch.notification { self.notification = notification; }
        if let Some(security) = patch.security { self.security = security; }
    }

    pub fn validate(&self) -> Result<(), ModelError> {
        if self.general.site_name.trim().is_empty() {
            return Err(ModelError::Validation("site name required".into()));
        }
        crate::user::validate_email(&self.general.contact_email)?;
        crate::user::validate_email(&self.email.sender_email)?;
        if self.email.smtp_port == 0 {
            return Err(ModelError::Validation("smtp port must be within 1..=65535".into()));
        }
        if self.security.password_min_length < 6 {
            return Err(ModelError::Validation("password minimum length must be >= 6".into()));
        }
        if self.security.max_login_attempts == 0 {
            return Err(ModelError::Validation("max login attempts must be >= 1".into()));
        }
        if self.security.session_timeout == 0 {
            return Err(ModelError::Validation("session timeout must be >= 1 minute".into()));
        }
        Ok(())
    }
}

impl SecuritySettings {
    /// Check a candidate password against the configured policy.
    pub fn check_password(&self, password: &str) -> Result<(), ModelError> {
        if (password.chars().count() as u32) < self.password_min_length {
            return Err(ModelError::Validation(format!(
                "password must be at least {} characters",
                self.password_min_length
            )));
        }
        if self.password_require_uppercase && !password.chars().any(|c| c.is_uppercase()) {
            return Err(ModelError::Validation("password needs an uppercase letter".into()));
        }
        if self.password_require_numbers && !password.chars().any(|c| c.is_ascii_digit()) {
            return Err(ModelError::Validation("password needs a digit".into()));
        }
        if self.password_require_symbols && password.chars().all(|c| c.is_alphanumeric()) {
            return Err(ModelError::Validation("password needs a symbol".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(SystemSettings::default().validate().is_ok());
    }

    #[test]
    fn merge_replaces_only_present_sections() {
        let mut settings = SystemSettings::default();
        let general = GeneralSettings { site_name: "Shop Admin".into(), ..GeneralSettings::default() };
        settings.merge(SettingsPatch { general: Some(general), ..SettingsPatch::default() });
        assert_eq!(settings.general.site_name, "Shop Admin");
        assert_eq!(settings.email, EmailSettings::default());
    }

    #[test]
    fn password_policy() {
        let policy = SecuritySettings::default();
        assert!(policy.check_password("short").is_err());
        assert!(policy.check_password("alllowercase1!").is_err());
        assert!(policy.check_password("NoDigits!!").is_err());
        assert!(policy.check_password("NoSymbol123").is_err());
        assert!(policy.check_password("Str0ng!pass").is_ok());

        let lax = SecuritySettings {
            password_require_uppercase: false,
            password_require_numbers: false,
            password_require_symbols: false,
            ..SecuritySettings::default()
        };
        assert!(lax.check_password("plainpassword").is_ok());
    }
}
