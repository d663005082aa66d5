use serde::{Deserialize, Serialize};

use crate::entity::Entity;
use crate::errors::ModelError;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Company {
    pub name: String,
    pub catch_phrase: String,
    pub bs: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Address {
    pub street: String,
    pub suite: String,
    pub city: String,
    pub zipcode: String,
}

/// A managed user account as listed on the users screen.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserData {
    pub id: u64,
    pub name: String,
    pub username: String,
    pub email: String,
    pub phone: String,
    pub website: String,
    #[serde(default)]
    pub company: Company,
    #[serde(default)]
    pub address: Address,
}

/// Create/update payload; company and address are kept as-is on update.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInput {
    pub name: String,
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub website: String,
}

impl Entity for UserData {
    type Id = u64;
    const KIND: &'static str = "user";

    fn id(&self) -> &u64 { &self.id }
}

pub fn validate_email(email: &str) -> Result<(), ModelError> {
    let trimmed = email.trim();
    match trimmed.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(()),
        _ => Err(ModelError::Validation("invalid email".into())),
    }
}

pub fn validate_name(name: &str) -> Result<(), ModelError> {
    if name.trim().is_empty() {
        return Err(ModelError::Validation("name required".into()));
    }
    Ok(())
}

impl UserInput {
    pub fn validate(&self) -> Result<(), ModelError> {
        validate_name(&self.name)?;
        if self.username.trim().is_empty() {
            return Err(ModelError::Validation("username required".into()));
        }
        if self.username.chars().any(char::is_whitespace) {
            return Err(ModelError::Validation("username must not contain spaces".into()));
        }
        validate_email(&self.email)
    }
}

impl UserData {
    pub fn from_input(id: u64, input: UserInput) -> Self {
        Self {
            id,
            name: input.name,
            username: input.username,
            email: input.email,
            phone: input.phone,
            website: input.website,
            company: Company::default(),
            address: Address::default(),
        }
    }

    pub fn apply(&mut self, input: UserInput) {
        self.name = input.name;
        self.username = input.username;
        self.email = input.email;
        self.phone = input.phone;
        self.website = input.website;
    }
}
