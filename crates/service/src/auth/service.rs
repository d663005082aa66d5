use std::sync::Arc;

use argon2::{Argon2, password_hash::{PasswordHasher, PasswordVerifier, SaltString}, PasswordHash};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header as JwtHeader, Validation};
use rand::rngs::OsRng;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use super::domain::{AuthSession, AuthUser, Claims, LoginInput, RegisterInput};
use super::errors::AuthError;
use super::repository::AuthRepository;

/// Auth service configuration
#[derive(Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub token_ttl: Duration,
    pub password_algorithm: String,
}

impl AuthConfig {
    pub fn new(jwt_secret: impl Into<String>, token_ttl_hours: i64) -> Self {
        Self { jwt_secret: jwt_secret.into(), token_ttl: Duration::hours(token_ttl_hours), password_algorithm: "argon2".into() }
    }
}

/// Auth business service independent of web framework
pub struct AuthService<R: AuthRepository> {
    repo: Arc<R>,
    cfg: AuthConfig,
}

fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    Ok(Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AuthError::HashError(e.to_string()))?
        .to_string())
}

impl<R: AuthRepository> AuthService<R> {
    pub fn new(repo: Arc<R>, cfg: AuthConfig) -> Self { Self { repo, cfg } }

    /// Register a new user with a hashed password.
    ///
    /// # Examples
    /// ```
    /// use service::auth::{service::{AuthService, AuthConfig}, repository::mock::MockAuthRepository};
    /// use service::auth::domain::RegisterInput;
    /// use std::sync::Arc;
    /// let repo = Arc::new(MockAuthRepository::default());
    /// let svc = AuthService::new(repo, AuthConfig::new("secret", 12));
    /// let input = RegisterInput { username: "admin".into(), email: "admin@example.com".into(), name: "Admin".into(), password: "Secret123".into() };
    /// let user = tokio_test::block_on(svc.register(input)).unwrap();
    /// assert_eq!(user.username, "admin");
    /// ```
    #[instrument(skip(self, input), fields(username = %input.username))]
    pub async fn register(&self, input: RegisterInput) -> Result<AuthUser, AuthError> {
        if input.username.trim().is_empty() {
            return Err(AuthError::Validation("username required".into()));
        }
        if input.password.len() < 8 {
            return Err(AuthError::Validation("password too short (>=8)".into()));
        }
        if let Some(existing) = self.repo.find_user_by_username(&input.username).await? {
            debug!("user exists: {}", existing.username);
            return Err(AuthError::Conflict);
        }

        let user = self.repo.create_user(input.username.trim(), &input.email, &input.name).await?;
        let hash = hash_password(&input.password)?;
        let _cred = self.repo.upsert_password(user.id, hash, self.cfg.password_algorithm.clone()).await?;
        info!(user_id = %user.id, username = %user.username, "user_registered");
        Ok(user)
    }

    /// Create the account if no user with that name exists yet. Returns whether it was created.
    pub async fn ensure_user(&self, input: RegisterInput) -> Result<bool, AuthError> {
        if self.repo.find_user_by_username(&input.username).await?.is_some() {
            return Ok(false);
        }
        self.register(input).await.map(|_| true)
    }

    /// Authenticate a user and issue a token.
    ///
    /// # Examples
    /// ```
    /// use service::auth::{service::{AuthService, AuthConfig}, repository::mock::MockAuthRepository};
    /// use service::auth::domain::{RegisterInput, LoginInput};
    /// use std::sync::Arc;
    /// let repo = Arc::new(MockAuthRepository::default());
    /// let svc = AuthService::new(repo.clone(), AuthConfig::new("secret", 12));
    /// let _ = tokio_test::block_on(svc.register(RegisterInput { username: "ops".into(), email: "u@e.com".into(), name: "N".into(), password: "Passw0rd".into() }));
    /// let session = tokio_test::block_on(svc.login(LoginInput { username: "ops".into(), password: "Passw0rd".into() })).unwrap();
    /// assert_eq!(session.user.email, "u@e.com");
    /// assert!(!session.token.is_empty());
    /// ```
    #[instrument(skip(self, input), fields(username = %input.username))]
    pub async fn login(&self, input: LoginInput) -> Result<AuthSession, AuthError> {
        let user = self.repo
            .find_user_by_username(&input.username)
            .await?
            .ok_or(AuthError::Unauthorized)?;

        self.verify_password(user.id, &input.password).await?;

        let now = Utc::now();
        let expires_at = now + self.cfg.token_ttl;
        let claims = Claims { sub: user.username.clone(), uid: user.id, iat: now.timestamp(), exp: expires_at.timestamp() };
        let token = encode(&JwtHeader::default(), &claims, &EncodingKey::from_secret(self.cfg.jwt_secret.as_bytes()))
            .map_err(|e| AuthError::TokenError(e.to_string()))?;

        info!(user_id = %user.id, "login_succeeded");
        Ok(AuthSession { user, token, expires_at })
    }

    async fn verify_password(&self, user_id: Uuid, password: &str) -> Result<(), AuthError> {
        let cred = self.repo
            .get_credentials(user_id)
            .await?
            .ok_or(AuthError::Unauthorized)?;

        let parsed = PasswordHash::new(&cred.password_hash).map_err(|e| AuthError::HashError(e.to_string()))?;
        if Argon2::default().verify_password(password.as_bytes(), &parsed).is_err() {
            warn!(%user_id, "password mismatch");
            return Err(AuthError::Unauthorized);
        }
        Ok(())
    }

    /// Decode and validate a token (signature and expiry).
    pub fn verify_token(&self, token: &str) -> Result<Claims, AuthError> {
        decode::<Claims>(token, &DecodingKey::from_secret(self.cfg.jwt_secret.as_bytes()), &Validation::default())
            .map(|data| data.claims)
            .map_err(|e| AuthError::TokenError(e.to_string()))
    }

    /// The user a token belongs to.
    pub async fn current_user(&self, token: &str) -> Result<AuthUser, AuthError> {
        let claims = self.verify_token(token)?;
        self.repo.find_user_by_id(claims.uid).await?.ok_or(AuthError::Unauthorized)
    }

    pub async fn find_user(&self, id: Uuid) -> Result<AuthUser, AuthError> {
        self.repo.find_user_by_id(id).await?.ok_or(AuthError::NotFound)
    }

    /// Replace a user's password after checking the current one. Policy checks
    /// beyond the minimum length are the caller's job.
    #[instrument(skip(self, current, new_password))]
    pub async fn change_password(&self, user_id: Uuid, current: &str, new_password: &str) -> Result<(), AuthError> {
        if self.repo.find_user_by_id(user_id).await?.is_none() {
            return Err(AuthError::NotFound);
        }
        self.verify_password(user_id, current).await?;
        if new_password.len() < 8 {
            return Err(AuthError::Validation("password too short (>=8)".into()));
        }
        let hash = hash_password(new_password)?;
        self.repo.upsert_password(user_id, hash, self.cfg.password_algorithm.clone()).await?;
        info!("password_changed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::repository::mock::MockAuthRepository;

    fn svc(secret: &str) -> AuthService<MockAuthRepository> {
        AuthService::new(Arc::new(MockAuthRepository::default()), AuthConfig::new(secret, 1))
    }

    fn admin() -> RegisterInput {
        RegisterInput { username: "admin".into(), email: "admin@example.com".into(), name: "Admin".into(), password: "admin12345".into() }
    }

    #[tokio::test]
    async fn login_issues_verifiable_token() {
        let svc = svc("secret");
        let user = svc.register(admin()).await.unwrap();
        let session = svc.login(LoginInput { username: "admin".into(), password: "admin12345".into() }).await.unwrap();
        let claims = svc.verify_token(&session.token).unwrap();
        assert_eq!(claims.uid, user.id);
        assert_eq!(svc.current_user(&session.token).await.unwrap(), user);
    }

    #[tokio::test]
    async fn wrong_password_and_foreign_token_are_rejected() {
        let svc1 = svc("secret");
        svc1.register(admin()).await.unwrap();
        let err = svc1.login(LoginInput { username: "admin".into(), password: "nope".into() }).await.unwrap_err();
        assert!(matches!(err, AuthError::Unauthorized));

        let svc2 = svc("other-secret");
        svc2.register(admin()).await.unwrap();
        let token = svc2.login(LoginInput { username: "admin".into(), password: "admin12345".into() }).await.unwrap().token;
        assert!(matches!(svc1.verify_token(&token), Err(AuthError::TokenError(_))));
        assert!(svc1.verify_token("not-a-jwt").is_err());
    }

    #[tokio::test]
    async fn ensure_user_is_idempotent_and_register_conflicts() {
        let svc = svc("secret");
        assert!(svc.ensure_user(admin()).await.unwrap());
        assert!(!svc.ensure_user(admin()).await.unwrap());
        assert!(matches!(svc.register(admin()).await, Err(AuthError::Conflict)));
    }

    #[tokio::test]
    async fn change_password_requires_current() {
        let svc = svc("secret");
        let user = svc.register(admin()).await.unwrap();
        let err = svc.change_password(user.id, "wrong", "N3w-password").await.unwrap_err();
        assert!(matches!(err, AuthError::Unauthorized));

        svc.change_password(user.id, "admin12345", "N3w-password").await.unwrap();
        assert!(svc.login(LoginInput { username: "admin".into(), password: "admin12345".into() }).await.is_err());
        assert!(svc.login(LoginInput { username: "admin".into(), password: "N3w-password".into() }).await.is_ok());
    }
}
