use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// User entity - a registered member of the network.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    /// Lower-cased and trimmed; unique across all users.
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub photo_url: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
}

impl User {
    /// Create a new active user with generated ID and timestamps.
    ///
    /// Callers are expected to pass already normalized fields.
    pub fn new(first_name: String, last_name: String, email: String, password_hash: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            first_name,
            last_name,
            email,
            password_hash,
            photo_url: None,
            is_active: true,
            created_at: now,
            updated_at: now,
            last_login: None,
        }
    }

    /// Apply a partial profile update in place.
    pub fn apply(&mut self, changes: &UserChanges) {
        if let Some(first_name) = &changes.first_name {
            self.first_name = first_name.clone();
        }
        if let Some(last_name) = &changes.last_name {
            self.last_name = last_name.clone();
        }
        if let Some(email) = &changes.email {
            self.email = email.clone();
        }
        if let Some(password_hash) = &changes.password_hash {
            self.password_hash = password_hash.clone();
        }
        self.updated_at = changes.updated_at;
    }
}

/// A validated set of profile changes. `None` fields are left untouched.
#[derive(Debug, Clone)]
pub struct UserChanges {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub password_hash: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl UserChanges {
    pub fn is_empty(&self) -> bool {
        self.first_name.is_none()
            && self.last_name.is_none()
            && self.email.is_none()
            && self.password_hash.is_none()
    }
}
