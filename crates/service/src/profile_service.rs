use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{info, instrument};
use uuid::Uuid;

use models::profile::{PasswordChangeInput, ProfileUpdateInput, UserProfile};

use crate::auth::errors::AuthError;
use crate::auth::repository::AuthRepository;
use crate::auth::AuthService;
use crate::errors::ServiceError;
use crate::settings_service::SettingsService;
use crate::storage::JsonDocStore;

/// The signed-in administrator's profile and password management.
pub struct ProfileService<R: AuthRepository> {
    store: JsonDocStore<UserProfile>,
    auth: Arc<AuthService<R>>,
    settings: SettingsService,
}

impl<R: AuthRepository> ProfileService<R> {
    pub async fn open(
        path: impl Into<PathBuf>,
        initial: impl FnOnce() -> UserProfile,
        auth: Arc<AuthService<R>>,
        settings: SettingsService,
    ) -> Result<Self, ServiceError> {
        Ok(Self { store: JsonDocStore::new(path, initial).await?, auth, settings })
    }

    pub fn in_memory(profile: UserProfile, auth: Arc<AuthService<R>>, settings: SettingsService) -> Self {
        Self { store: JsonDocStore::in_memory(profile), auth, settings }
    }

    pub async fn get(&self) -> UserProfile {
        self.store.get().await
    }

    #[instrument(skip(self, input))]
    pub async fn update(&self, input: ProfileUpdateInput) -> Result<UserProfile, ServiceError> {
        input.validate()?;
        let now = Utc::now();
        let profile = self
            .store
            .update(|p| {
                p.apply(input, now);
                Ok(())
            })
            .await?;
        info!("profile updated");
        Ok(profile)
    }

    pub async fn update_avatar(&self, avatar: Option<String>) -> Result<UserProfile, ServiceError> {
        let now = Utc::now();
        self.store
            .update(|p| {
                p.avatar = avatar.filter(|a| !a.trim().is_empty());
                p.updated_at = now;
                Ok(())
            })
            .await
    }

    pub async fn record_login(&self, at: DateTime<Utc>) -> Result<(), ServiceError> {
        self.store
            .update(|p| {
                p.last_login = Some(at);
                Ok(())
            })
            .await
            .map(|_| ())
    }

    /// Change the password of `user_id`: the confirmation must match, the new
    /// password must satisfy the configured policy, and the current password
    /// must verify.
    #[instrument(skip(self, input))]
    pub async fn change_password(&self, user_id: Uuid, input: PasswordChangeInput) -> Result<(), ServiceError> {
        if input.new_password != input.confirm_password {
            return Err(ServiceError::Validation("password confirmation does not match".into()));
        }
        if input.new_password == input.current_password {
            return Err(ServiceError::Validation("new password must differ from the current one".into()));
        }
        self.settings.get().await.security.check_password(&input.new_password)?;

        match self.auth.change_password(user_id, &input.current_password, &input.new_password).await {
            Ok(()) => Ok(()),
            Err(AuthError::Unauthorized) => Err(ServiceError::Validation("current password is incorrect".into())),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::domain::{LoginInput, RegisterInput};
    use crate::auth::repository::mock::MockAuthRepository;
    use crate::auth::AuthConfig;
    use crate::seed;

    async fn fixture() -> (ProfileService<MockAuthRepository>, Arc<AuthService<MockAuthRepository>>, Uuid) {
        let auth = Arc::new(AuthService::new(Arc::new(MockAuthRepository::default()), AuthConfig::new("secret", 1)));
        let user = auth
            .register(RegisterInput { username: "admin".into(), email: "admin@example.com".into(), name: "Admin".into(), password: "admin12345".into() })
            .await
            .unwrap();
        let svc = ProfileService::in_memory(seed::demo_profile(Utc::now()), auth.clone(), SettingsService::in_memory());
        (svc, auth, user.id)
    }

    fn change(current: &str, new: &str, confirm: &str) -> PasswordChangeInput {
        PasswordChangeInput { current_password: current.into(), new_password: new.into(), confirm_password: confirm.into() }
    }

    #[tokio::test]
    async fn password_change_checks_confirmation_policy_and_current() {
        let (svc, auth, uid) = fixture().await;

        let err = svc.change_password(uid, change("admin12345", "Str0ng!pass", "Str0ng!pas")).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));

        let err = svc.change_password(uid, change("admin12345", "weakpassword", "weakpassword")).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));

        let err = svc.change_password(uid, change("wrong-one", "Str0ng!pass", "Str0ng!pass")).await.unwrap_err();
        assert_eq!(err, ServiceError::Validation("current password is incorrect".into()));

        svc.change_password(uid, change("admin12345", "Str0ng!pass", "Str0ng!pass")).await.unwrap();
        assert!(auth.login(LoginInput { username: "admin".into(), password: "Str0ng!pass".into() }).await.is_ok());
    }

    #[tokio::test]
    async fn update_validates_and_keeps_absent_optionals() {
        let (svc, _, _) = fixture().await;
        let before = svc.get().await;
        let input = ProfileUpdateInput {
            first_name: "Nam".into(),
            last_name: "Tran".into(),
            email: "not-an-email".into(),
            phone_number: None,
            address: None,
            biography: None,
            preferences: None,
        };
        assert!(svc.update(input.clone()).await.is_err());
        assert_eq!(svc.get().await, before);

        let updated = svc.update(ProfileUpdateInput { email: "nam@example.com".into(), ..input }).await.unwrap();
        assert_eq!(updated.full_name(), "Nam Tran");
        assert_eq!(updated.phone_number, before.phone_number);

        let with_avatar = svc.update_avatar(Some("/avatars/nam.png".into())).await.unwrap();
        assert_eq!(with_avatar.avatar.as_deref(), Some("/avatars/nam.png"));
        assert_eq!(svc.update_avatar(Some("  ".into())).await.unwrap().avatar, None);
    }
}
