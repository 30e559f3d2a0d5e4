use std::sync::Arc;

use argon2::{Argon2, password_hash::{PasswordHasher, PasswordVerifier, SaltString}, PasswordHash};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header as JwtHeader, Validation};
use models::user::Role;
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};
use tracing::{info, debug, warn, instrument};
use uuid::Uuid;

use super::domain::{RegisterInput, LoginInput, AuthUser, AuthSession};
use super::errors::AuthError;
use super::repository::AuthRepository;
use crate::access::Requester;

/// Auth service configuration
#[derive(Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub token_ttl_hours: i64,
}

impl From<&configs::AuthConfig> for AuthConfig {
    fn from(c: &configs::AuthConfig) -> Self {
        Self { jwt_secret: c.jwt_secret.clone(), token_ttl_hours: c.token_ttl_hours }
    }
}

/// JWT payload issued at login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub uid: String,
    pub role: Role,
    pub iat: i64,
    pub exp: i64,
}

/// Auth business service independent of web framework
pub struct AuthService {
    repo: Arc<dyn AuthRepository>,
    cfg: AuthConfig,
}

impl AuthService {
    pub fn new(repo: Arc<dyn AuthRepository>, cfg: AuthConfig) -> Self { Self { repo, cfg } }

    /// Register a new user with a hashed password.
    ///
    /// # Examples
    /// ```
    /// use service::auth::{service::{AuthService, AuthConfig}, repository::memory::InMemoryAuthRepository};
    /// use service::auth::domain::RegisterInput;
    /// use std::sync::Arc;
    /// let repo = Arc::new(InMemoryAuthRepository::default());
    /// let svc = AuthService::new(repo, AuthConfig { jwt_secret: "secret".into(), token_ttl_hours: 1 });
    /// let input = RegisterInput { email: "user@example.com".into(), name: "Test".into(), password: "Secret123".into(), role: None };
    /// let user = tokio_test::block_on(svc.register(input)).unwrap();
    /// assert_eq!(user.email, "user@example.com");
    /// assert_eq!(user.role, models::user::Role::User);
    /// ```
    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn register(&self, input: RegisterInput) -> Result<AuthUser, AuthError> {
        models::user::validate_email(&input.email).map_err(|e| AuthError::Validation(e.to_string()))?;
        models::user::validate_name(&input.name).map_err(|e| AuthError::Validation(e.to_string()))?;
        if input.password.len() < 8 {
            return Err(AuthError::Validation("password too short (>=8)".into()));
        }
        let role = match input.role.unwrap_or(Role::User) {
            Role::Admin => return Err(AuthError::Validation("role admin can not be self-assigned".into())),
            r => r,
        };
        if let Some(existing) = self.repo.find_user_by_email(&input.email).await? {
            debug!("user exists: {}", existing.email);
            return Err(AuthError::Conflict);
        }

        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(input.password.as_bytes(), &salt)
            .map_err(|e| AuthError::HashError(e.to_string()))?
            .to_string();

        let user = self.repo.create_user(&input.email, &input.name, role, hash).await?;
        info!(user_id = %user.id, email = %user.email, role = %user.role, "user_registered");
        Ok(user)
    }

    /// Authenticate a user and issue a token.
    ///
    /// # Examples
    /// ```
    /// use service::auth::{service::{AuthService, AuthConfig}, repository::memory::InMemoryAuthRepository};
    /// use service::auth::domain::{RegisterInput, LoginInput};
    /// use std::sync::Arc;
    /// let repo = Arc::new(InMemoryAuthRepository::default());
    /// let svc = AuthService::new(repo, AuthConfig { jwt_secret: "secret".into(), token_ttl_hours: 1 });
    /// let _ = tokio_test::block_on(svc.register(RegisterInput { email: "u@e.com".into(), name: "N".into(), password: "Passw0rd".into(), role: None }));
    /// let session = tokio_test::block_on(svc.login(LoginInput { email: "u@e.com".into(), password: "Passw0rd".into() })).unwrap();
    /// assert_eq!(session.user.email, "u@e.com");
    /// assert!(!session.token.is_empty());
    /// ```
    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn login(&self, input: LoginInput) -> Result<AuthSession, AuthError> {
        let Some(user) = self.repo.find_user_by_email(&input.email).await? else {
            warn!("login for unknown email");
            return Err(AuthError::Unauthorized);
        };

        let cred = self.repo
            .get_credentials(user.id)
            .await?
            .ok_or(AuthError::Unauthorized)?;

        let parsed = PasswordHash::new(&cred.password_hash).map_err(|e| AuthError::HashError(e.to_string()))?;
        if Argon2::default().verify_password(input.password.as_bytes(), &parsed).is_err() {
            warn!(user_id = %user.id, "login with wrong password");
            return Err(AuthError::Unauthorized);
        }

        let token = self.issue_token(&user)?;
        info!(user_id = %user.id, "user_logged_in");
        Ok(AuthSession { user, token })
    }

    pub fn issue_token(&self, user: &AuthUser) -> Result<String, AuthError> {
        let now = chrono::Utc::now();
        let claims = Claims {
            sub: user.email.clone(),
            uid: user.id.to_string(),
            role: user.role,
            iat: now.timestamp(),
            exp: (now + chrono::Duration::hours(self.cfg.token_ttl_hours)).timestamp(),
        };
        encode(&JwtHeader::default(), &claims, &EncodingKey::from_secret(self.cfg.jwt_secret.as_bytes()))
            .map_err(|e| AuthError::TokenError(e.to_string()))
    }

    /// Verify signature and expiry; no store access.
    pub fn decode_token(&self, token: &str) -> Result<Claims, AuthError> {
        let data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.cfg.jwt_secret.as_bytes()),
            &Validation::new(Algorithm::HS256),
        )
        .map_err(|e| AuthError::TokenError(e.to_string()))?;
        Ok(data.claims)
    }

    /// Resolve a bearer token to the requester, reloading the user so a
    /// deleted account or changed role takes effect immediately.
    #[instrument(skip(self, token))]
    pub async fn authenticate(&self, token: &str) -> Result<Requester, AuthError> {
        let claims = self.decode_token(token)?;
        let uid = Uuid::parse_str(&claims.uid).map_err(|e| AuthError::TokenError(e.to_string()))?;
        let Some(user) = self.repo.find_user_by_id(uid).await? else {
            warn!(user_id = %uid, "token for unknown user");
            return Err(AuthError::Unauthorized);
        };
        Ok(Requester::new(user.id, user.role))
    }

    pub async fn current_user(&self, requester: &Requester) -> Result<AuthUser, AuthError> {
        self.repo.find_user_by_id(requester.id).await?.ok_or(AuthError::NotFound)
    }

    /// Create the bootstrap admin unless the email is already registered.
    /// Admins can not come from `register`, so this is the only way in.
    #[instrument(skip(self, password))]
    pub async fn ensure_admin(&self, email: &str, password: &str) -> Result<AuthUser, AuthError> {
        if let Some(existing) = self.repo.find_user_by_email(email).await? {
            if existing.role != Role::Admin {
                warn!(user_id = %existing.id, "bootstrap admin email belongs to a non-admin account");
            }
            return Ok(existing);
        }
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AuthError::HashError(e.to_string()))?
            .to_string();
        let user = self.repo.create_user(email, "Administrator", Role::Admin, hash).await?;
        info!(user_id = %user.id, "admin_bootstrapped");
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::repository::memory::InMemoryAuthRepository;

    fn svc() -> AuthService {
        AuthService::new(
            Arc::new(InMemoryAuthRepository::default()),
            AuthConfig { jwt_secret: "test-secret".into(), token_ttl_hours: 1 },
        )
    }

    fn register(email: &str, role: Option<Role>) -> RegisterInput {
        RegisterInput { email: email.into(), name: "Pat".into(), password: "Passw0rd!".into(), role }
    }

    #[tokio::test]
    async fn register_rejects_admin_and_duplicates() {
        let s = svc();
        assert!(matches!(s.register(register("a@b.c", Some(Role::Admin))).await, Err(AuthError::Validation(_))));
        let u = s.register(register("A@B.c", Some(Role::Provider))).await.unwrap();
        assert_eq!(u.email, "a@b.c");
        assert_eq!(u.role, Role::Provider);
        assert!(matches!(s.register(register("a@b.c", None)).await, Err(AuthError::Conflict)));
    }

    #[tokio::test]
    async fn register_validates_fields() {
        let s = svc();
        assert!(matches!(s.register(register("no-at-sign", None)).await, Err(AuthError::Validation(_))));
        let short = RegisterInput { password: "short".into(), ..register("x@y.z", None) };
        assert!(matches!(s.register(short).await, Err(AuthError::Validation(_))));
    }

    #[tokio::test]
    async fn login_issues_token_that_authenticates() {
        let s = svc();
        let u = s.register(register("p@q.r", None)).await.unwrap();
        let session = s.login(LoginInput { email: "p@q.r".into(), password: "Passw0rd!".into() }).await.unwrap();
        let claims = s.decode_token(&session.token).unwrap();
        assert_eq!(claims.uid, u.id.to_string());
        assert!(claims.exp > claims.iat);

        let requester = s.authenticate(&session.token).await.unwrap();
        assert_eq!(requester, Requester::new(u.id, Role::User));
        assert_eq!(s.current_user(&requester).await.unwrap(), u);
    }

    #[tokio::test]
    async fn login_failures_are_unauthorized() {
        let s = svc();
        s.register(register("p@q.r", None)).await.unwrap();
        let wrong = s.login(LoginInput { email: "p@q.r".into(), password: "nope-nope".into() }).await;
        assert!(matches!(wrong, Err(AuthError::Unauthorized)));
        let unknown = s.login(LoginInput { email: "x@q.r".into(), password: "Passw0rd!".into() }).await;
        assert!(matches!(unknown, Err(AuthError::Unauthorized)));
    }

    #[tokio::test]
    async fn tampered_or_foreign_tokens_are_rejected() {
        let s = svc();
        let u = s.register(register("p@q.r", None)).await.unwrap();
        let token = s.issue_token(&u).unwrap();
        assert!(matches!(s.decode_token(&format!("{token}x")), Err(AuthError::TokenError(_))));

        let other = AuthService::new(
            Arc::new(InMemoryAuthRepository::default()),
            AuthConfig { jwt_secret: "other".into(), token_ttl_hours: 1 },
        );
        assert!(matches!(other.decode_token(&token), Err(AuthError::TokenError(_))));
        // valid signature, but the user is unknown to this store
        let foreign = AuthService::new(
            Arc::new(InMemoryAuthRepository::default()),
            AuthConfig { jwt_secret: "test-secret".into(), token_ttl_hours: 1 },
        );
        assert!(matches!(foreign.authenticate(&token).await, Err(AuthError::Unauthorized)));
    }

    #[tokio::test]
    async fn ensure_admin_is_idempotent() {
        let s = svc();
        let a = s.ensure_admin("root@example.com", "changeme123").await.unwrap();
        assert_eq!(a.role, Role::Admin);
        let again = s.ensure_admin("root@example.com", "ignored-now").await.unwrap();
        assert_eq!(again.id, a.id);
        let session = s.login(LoginInput { email: "root@example.com".into(), password: "changeme123".into() }).await.unwrap();
        assert_eq!(session.user.role, Role::Admin);
    }

    #[tokio::test]
    async fn expired_token_is_rejected() {
        let s = AuthService::new(
            Arc::new(InMemoryAuthRepository::default()),
            AuthConfig { jwt_secret: "test-secret".into(), token_ttl_hours: -2 },
        );
        let u = s.register(register("p@q.r", None)).await.unwrap();
        let token = s.issue_token(&u).unwrap();
        assert!(matches!(s.decode_token(&token), Err(AuthError::TokenError(_))));
    }
}
