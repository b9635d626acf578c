use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use summer_core::domain::{PostAuthor, User, UserChanges};
use summer_core::error::RepoError;
use summer_core::ports::UserRepository;

/// In-memory user store. Email uniqueness is checked under the write lock,
/// mirroring the unique index of the SQL schema.
#[derive(Default)]
pub struct InMemoryUserRepository {
    users: RwLock<HashMap<Uuid, User>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Display names keyed by user id, for joining posts to authors.
    pub(crate) async fn authors(&self) -> HashMap<Uuid, PostAuthor> {
        self.users
            .read()
            .await
            .values()
            .map(|u| {
                (
                    u.id,
                    PostAuthor {
                        first_name: u.first_name.clone(),
                        last_name: u.last_name.clone(),
                    },
                )
            })
            .collect()
    }

    /// Flip the active flag. There is no HTTP surface for this; it exists so
    /// deactivated accounts can be exercised.
    pub async fn set_active(&self, id: Uuid, is_active: bool) -> Result<(), RepoError> {
        let mut users = self.users.write().await;
        let user = users.get_mut(&id).ok_or(RepoError::NotFound)?;
        user.is_active = is_active;
        Ok(())
    }
}

fn email_taken(users: &HashMap<Uuid, User>, email: &str, except: Option<Uuid>) -> bool {
    users
        .values()
        .any(|u| u.email == email && Some(u.id) != except)
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn insert(&self, user: User) -> Result<User, RepoError> {
        let mut users = self.users.write().await;
        if email_taken(&users, &user.email, None) {
            return Err(RepoError::Constraint("users.email".to_string()));
        }
        if users.contains_key(&user.id) {
            return Err(RepoError::Constraint("users.id".to_string()));
        }
        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepoError> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn update_profile(&self, id: Uuid, changes: UserChanges) -> Result<(), RepoError> {
        let mut users = self.users.write().await;
        if !users.contains_key(&id) {
            return Err(RepoError::NotFound);
        }
        if let Some(email) = &changes.email {
            if email_taken(&users, email, Some(id)) {
                return Err(RepoError::Constraint("users.email".to_string()));
            }
        }
        if let Some(user) = users.get_mut(&id) {
            user.apply(&changes);
        }
        Ok(())
    }

    async fn record_login(&self, id: Uuid, at: DateTime<Utc>) -> Result<(), RepoError> {
        if let Some(user) = self.users.write().await.get_mut(&id) {
            user.last_login = Some(at);
        }
        Ok(())
    }

    async fn set_photo_url(
        &self,
        id: Uuid,
        url: &str,
        at: DateTime<Utc>,
    ) -> Result<(), RepoError> {
        let mut users = self.users.write().await;
        let user = users.get_mut(&id).ok_or(RepoError::NotFound)?;
        user.photo_url = Some(url.to_string());
        user.updated_at = at;
        Ok(())
    }
}
