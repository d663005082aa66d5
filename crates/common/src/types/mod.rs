use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug)]
pub struct Health {
    pub status: &'static str,
}

/// `{"count": n}` payload for counter endpoints.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct CountBody {
    pub count: u64,
}

/// JSON error payload returned by the admin API and parsed back by REST clients.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ErrorBody {
    pub error: String,
    pub code: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>, code: u16, detail: impl Into<String>) -> Self {
        Self { error: error.into(), code, detail: Some(detail.into()) }
    }

    /// Best human-readable message: the detail when present, else the title.
    pub fn message(&self) -> &str {
        self.detail.as_deref().unwrap_or(&self.error)
    }
}
