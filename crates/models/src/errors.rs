use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ModelError {
    #[error("validation error: {0}")]
    Validation(String),
    #[error("invalid {field}: {value:?}")]
    InvalidValue { field: &'static str, value: String },
}

impl ModelError {
    pub fn invalid(field: &'static str, value: &str) -> Self {
        Self::InvalidValue { field, value: value.to_string() }
    }
}
