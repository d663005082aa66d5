use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::domain::{AuthUser, Credentials};
use crate::auth::errors::AuthError;
use crate::auth::repository::AuthRepository;
use crate::storage::JsonMapStore;

/// One persisted account: the user plus its (optional) credentials.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct AccountRecord {
    user: AuthUser,
    #[serde(default)]
    credentials: Option<Credentials>,
}

/// Auth repository over a JSON map store keyed by user id.
pub struct StoreAuthRepository {
    store: Arc<JsonMapStore<Uuid, AccountRecord>>,
}

impl StoreAuthRepository {
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, AuthError> {
        Ok(Self { store: JsonMapStore::new(path).await? })
    }

    pub fn in_memory() -> Self {
        Self { store: JsonMapStore::in_memory() }
    }
}

#[async_trait]
impl AuthRepository for StoreAuthRepository {
    async fn find_user_by_username(&self, username: &str) -> Result<Option<AuthUser>, AuthError> {
        Ok(self
            .store
            .values()
            .await
            .into_iter()
            .map(|a| a.user)
            .find(|u| u.username.eq_ignore_ascii_case(username)))
    }

    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<AuthUser>, AuthError> {
        Ok(self.store.get(&id).await.map(|a| a.user))
    }

    async fn create_user(&self, username: &str, email: &str, name: &str) -> Result<AuthUser, AuthError> {
        let user = AuthUser { id: Uuid::new_v4(), username: username.to_string(), email: email.to_string(), name: name.to_string() };
        let created = user.clone();
        let inserted = self
            .store
            .update_map(move |map| {
                if map.values().any(|a| a.user.username.eq_ignore_ascii_case(&user.username)) {
                    return Ok(false);
                }
                map.insert(user.id, AccountRecord { user, credentials: None });
                Ok(true)
            })
            .await?;
        if !inserted {
            return Err(AuthError::Conflict);
        }
        Ok(created)
    }

    async fn get_credentials(&self, user_id: Uuid) -> Result<Option<Credentials>, AuthError> {
        Ok(self.store.get(&user_id).await.and_then(|a| a.credentials))
    }

    async fn upsert_password(&self, user_id: Uuid, password_hash: String, password_algorithm: String) -> Result<Credentials, AuthError> {
        let creds = Credentials { user_id, password_hash, password_algorithm };
        let stored = creds.clone();
        let found = self
            .store
            .update_map(move |map| match map.get_mut(&user_id) {
                Some(account) => {
                    account.credentials = Some(stored);
                    Ok(true)
                }
                None => Ok(false),
            })
            .await?;
        if !found {
            return Err(AuthError::NotFound);
        }
        Ok(creds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn usernames_are_unique_case_insensitively() {
        let repo = StoreAuthRepository::in_memory();
        let admin = repo.create_user("admin", "admin@example.com", "Admin").await.unwrap();
        assert!(matches!(repo.create_user("ADMIN", "x@example.com", "X").await, Err(AuthError::Conflict)));
        assert_eq!(repo.find_user_by_username("Admin").await.unwrap(), Some(admin.clone()));
        assert_eq!(repo.find_user_by_id(admin.id).await.unwrap(), Some(admin));
    }

    #[tokio::test]
    async fn credentials_persist_across_reopen() -> Result<(), anyhow::Error> {
        let path = std::env::temp_dir().join(format!("accounts_{}.json", Uuid::new_v4()));
        let repo = StoreAuthRepository::open(&path).await?;
        let user = repo.create_user("ops", "ops@example.com", "Ops").await?;
        repo.upsert_password(user.id, "hash".into(), "argon2".into()).await?;

        let reopened = StoreAuthRepository::open(&path).await?;
        let creds = reopened.get_credentials(user.id).await?.expect("credentials");
        assert_eq!(creds.password_hash, "hash");
        assert!(matches!(reopened.upsert_password(Uuid::new_v4(), "h".into(), "argon2".into()).await, Err(AuthError::NotFound)));
        let _ = tokio::fs::remove_file(&path).await;
        Ok(())
    }
}
