use async_trait::async_trait;
use models::user::Role;
use uuid::Uuid;

use super::domain::{AuthUser, Credentials};
use super::errors::AuthError;

/// Repository abstraction for auth-related persistence.
#[async_trait]
pub trait AuthRepository: Send + Sync {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<AuthUser>, AuthError>;
    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<AuthUser>, AuthError>;
    /// Fails with `Conflict` when the email is taken.
    async fn create_user(&self, email: &str, name: &str, role: Role, password_hash: String) -> Result<AuthUser, AuthError>;
    async fn get_credentials(&self, user_id: Uuid) -> Result<Option<Credentials>, AuthError>;
}

/// In-memory repository for tests, doc examples and `STORE=memory` runs
pub mod memory {
    use super::*;
    use std::collections::HashMap;
    use tokio::sync::RwLock;

    #[derive(Default)]
    pub struct InMemoryAuthRepository {
        users: RwLock<HashMap<Uuid, (AuthUser, String)>>, // key: user_id, value: (user, password_hash)
    }

    #[async_trait]
    impl AuthRepository for InMemoryAuthRepository {
        async fn find_user_by_email(&self, email: &str) -> Result<Option<AuthUser>, AuthError> {
            let email = email.trim().to_ascii_lowercase();
            let users = self.users.read().await;
            Ok(users.values().find(|(u, _)| u.email == email).map(|(u, _)| u.clone()))
        }

        async fn find_user_by_id(&self, id: Uuid) -> Result<Option<AuthUser>, AuthError> {
            Ok(self.users.read().await.get(&id).map(|(u, _)| u.clone()))
        }

        async fn create_user(&self, email: &str, name: &str, role: Role, password_hash: String) -> Result<AuthUser, AuthError> {
            let email = email.trim().to_ascii_lowercase();
            let mut users = self.users.write().await;
            if users.values().any(|(u, _)| u.email == email) {
                return Err(AuthError::Conflict);
            }
            let user = AuthUser { id: Uuid::new_v4(), email, name: name.trim().to_string(), role };
            users.insert(user.id, (user.clone(), password_hash));
            Ok(user)
        }

        async fn get_credentials(&self, user_id: Uuid) -> Result<Option<Credentials>, AuthError> {
            let users = self.users.read().await;
            Ok(users.get(&user_id).map(|(_, hash)| Credentials { user_id, password_hash: hash.clone() }))
        }
    }
}
