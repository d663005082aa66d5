use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entity::Entity;
use crate::errors::ModelError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationType {
    Info,
    Success,
    Warning,
    Error,
}

impl NotificationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationType::Info => "info",
            NotificationType::Success => "success",
            NotificationType::Warning => "warning",
            NotificationType::Error => "error",
        }
    }
}

impl FromStr for NotificationType {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "info" => Ok(NotificationType::Info),
            "success" => Ok(NotificationType::Success),
            "warning" => Ok(NotificationType::Warning),
            "error" => Ok(NotificationType::Error),
            _ => Err(ModelError::invalid("notification type", s)),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationCategory {
    Order,
    User,
    Product,
    System,
}

impl NotificationCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationCategory::Order => "order",
            NotificationCategory::User => "user",
            NotificationCategory::Product => "product",
            NotificationCategory::System => "system",
        }
    }
}

impl fmt::Display for NotificationCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

impl FromStr for NotificationCategory {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "order" => Ok(NotificationCategory::Order),
            "user" => Ok(NotificationCategory::User),
            "product" => Ok(NotificationCategory::Product),
            "system" => Ok(NotificationCategory::System),
            _ => Err(ModelError::invalid("notification category", s)),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: NotificationType,
    pub title: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link_to: Option<String>,
    pub read: bool,
    pub created_at: DateTime<Utc>,
    pub category: NotificationCategory,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

/// Content of a notification; `read` and `created_at` are owned by the service.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NotificationInput {
    #[serde(rename = "type")]
    pub kind: NotificationType,
    pub title: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link_to: Option<String>,
    pub category: NotificationCategory,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

/// Per-channel delivery switches on a user's profile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationPreferences {
    pub email: bool,
    pub browser: bool,
    pub mobile: bool,
}

impl Entity for Notification {
    type Id = String;
    const KIND: &'static str = "notification";

    fn id(&self) -> &String { &self.id }
}

impl NotificationInput {
    pub fn validate(&self) -> Result<(), ModelError> {
        if self.title.trim().is_empty() {
            return Err(ModelError::Validation("notification title required".into()));
        }
        if self.message.trim().is_empty() {
            return Err(ModelError::Validation("notification message required".into()));
        }
        Ok(())
    }
}

impl Notification {
    pub fn from_input(id: String, input: NotificationInput, now: DateTime<Utc>) -> Self {
        Self {
            id,
            kind: input.kind,
            title: input.title,
            message: input.message,
            link_to: input.link_to,
            read: false,
            created_at: now,
            category: input.category,
            data: input.data,
        }
    }

    /// Replace the content; read state and timestamp stay.
    pub fn apply(&mut self, input: NotificationInput) {
        self.kind = input.kind;
        self.title = input.title;
        self.message = input.message;
        self.link_to = input.link_to;
        self.category = input.category;
        self.data = input.data;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_serializes_as_type_field() {
        let n = Notification::from_input(
            "1".into(),
            NotificationInput {
                kind: NotificationType::Warning,
                title: "Low stock".into(),
                message: "Laptop ABC is running low".into(),
                link_to: Some("/products/2".into()),
                category: NotificationCategory::Product,
                data: Some(serde_json::json!({"product_id": 2, "stock": 5})),
            },
            Utc::now(),
        );
        let v = serde_json::to_value(&n).unwrap();
        assert_eq!(v["type"], "warning");
        assert_eq!(v["category"], "product");
        assert_eq!(v["read"], false);
    }

    #[test]
    fn apply_keeps_read_flag() {
        let input = NotificationInput {
            kind: NotificationType::Info,
            title: "t".into(),
            message: "m".into(),
            link_to: None,
            category: NotificationCategory::System,
            data: None,
        };
        let mut n = Notification::from_input("9".into(), input.clone(), Utc::now());
        n.read = true;
        n.apply(NotificationInput { title: "changed".into(), ..input });
        assert!(n.read);
        assert_eq!(n.title, "changed");
    }
}
