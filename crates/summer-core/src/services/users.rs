//! Account lifecycle: signup, login, profile reads and updates, photos.

use std::sync::Arc;

use chrono::Utc;

use crate::domain::{User, UserChanges};
use crate::error::{DomainError, RepoError};
use crate::ports::{PasswordService, PhotoStorage, UserRepository};
use crate::validation::{
    is_allowed_photo, is_valid_email, is_valid_password, mask_email, normalize_email,
    sanitize_file_name,
};

use super::parse_id;

const INVALID_CREDENTIALS: &str = "Invalid email or password";

/// Signup payload. Empty strings count as missing.
#[derive(Debug, Clone, Default)]
pub struct SignupInput {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
}

/// Partial profile update. Only `Some` fields are considered.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

/// An uploaded file as received from the client.
#[derive(Debug, Clone)]
pub struct PhotoUpload {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// User-facing account operations.
#[derive(Clone)]
pub struct UserService {
    users: Arc<dyn UserRepository>,
    passwords: Arc<dyn PasswordService>,
    photos: Arc<dyn PhotoStorage>,
}

impl UserService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        passwords: Arc<dyn PasswordService>,
        photos: Arc<dyn PhotoStorage>,
    ) -> Self {
        Self {
            users,
            passwords,
            photos,
        }
    }

    /// Register a new account.
    ///
    /// All validation happens before anything is written. Email uniqueness is
    /// checked up front and again by the store on insert.
    pub async fn signup(&self, input: SignupInput) -> Result<User, DomainError> {
        let first_name = input.first_name.trim();
        let last_name = input.last_name.trim();
        let email = normalize_email(&input.email);

        for (field, value) in [
            ("first_name", first_name),
            ("last_name", last_name),
            ("email", email.as_str()),
            ("password", input.password.as_str()),
        ] {
            if value.is_empty() {
                return Err(DomainError::validation(format!("{field} is required")));
            }
        }

        if !is_valid_email(&email) {
            return Err(DomainError::validation("Invalid email format"));
        }
        if !is_valid_password(&input.password) {
            return Err(DomainError::validation(
                "Password must be at least 6 characters long",
            ));
        }

        if self.users.find_by_email(&email).await?.is_some() {
            tracing::debug!(email = %mask_email(&email), "Signup rejected: email taken");
            return Err(Self::email_taken());
        }

        let password_hash = self.hash(&input.password).await?;
        let user = User::new(
            first_name.to_string(),
            last_name.to_string(),
            email,
            password_hash,
        );

        let saved = self.users.insert(user).await.map_err(|e| match e {
            RepoError::Constraint(_) => Self::email_taken(),
            other => other.into(),
        })?;

        tracing::info!(user_id = %saved.id, "User created");
        Ok(saved)
    }

    /// Check credentials and stamp the login time.
    ///
    /// Unknown emails and wrong passwords produce the same error.
    pub async fn login(&self, email: &str, password: &str) -> Result<User, DomainError> {
        let email = normalize_email(email);
        if email.is_empty() || password.is_empty() {
            return Err(DomainError::validation("Email and password are required"));
        }

        let Some(mut user) = self.users.find_by_email(&email).await? else {
            tracing::debug!(email = %mask_email(&email), "Login failed: unknown email");
            return Err(DomainError::Unauthorized(INVALID_CREDENTIALS.to_string()));
        };

        let valid = self
            .passwords
            .verify(password, &user.password_hash)
            .await
            .map_err(|e| DomainError::Internal(e.to_string()))?;
        if !valid {
            tracing::debug!(user_id = %user.id, "Login failed: bad password");
            return Err(DomainError::Unauthorized(INVALID_CREDENTIALS.to_string()));
        }

        if !user.is_active {
            return Err(DomainError::Unauthorized(
                "Account is deactivated".to_string(),
            ));
        }

        let now = Utc::now();
        self.users.record_login(user.id, now).await?;
        user.last_login = Some(now);

        tracing::info!(user_id = %user.id, "User logged in");
        Ok(user)
    }

    /// Look up a user by a client-supplied id.
    pub async fn find_by_id(&self, id: &str) -> Result<User, DomainError> {
        let id = parse_id(id).ok_or(DomainError::NotFound("User"))?;
        self.users
            .find_by_id(id)
            .await?
            .ok_or(DomainError::NotFound("User"))
    }

    /// Apply a partial profile update.
    pub async fn update_profile(&self, id: &str, update: ProfileUpdate) -> Result<(), DomainError> {
        let id = parse_id(id).ok_or(DomainError::NotFound("User"))?;

        let first_name = match update.first_name {
            Some(name) => Some(Self::required_name(&name, "First name cannot be empty")?),
            None => None,
        };
        let last_name = match update.last_name {
            Some(name) => Some(Self::required_name(&name, "Last name cannot be empty")?),
            None => None,
        };

        let email = match update.email {
            Some(raw) => {
                let email = normalize_email(&raw);
                if !is_valid_email(&email) {
                    return Err(DomainError::validation("Invalid email format"));
                }
                if let Some(existing) = self.users.find_by_email(&email).await? {
                    if existing.id != id {
                        return Err(DomainError::Duplicate("Email already in use".to_string()));
                    }
                }
                Some(email)
            }
            None => None,
        };

        // A blank password means "leave unchanged".
        let password_hash = match update.password.as_deref().map(str::trim) {
            Some(password) if !password.is_empty() => {
                if !is_valid_password(password) {
                    return Err(DomainError::validation(
                        "Password must be at least 6 characters",
                    ));
                }
                Some(self.hash(password).await?)
            }
            _ => None,
        };

        let changes = UserChanges {
            first_name,
            last_name,
            email,
            password_hash,
            updated_at: Utc::now(),
        };
        if changes.is_empty() {
            return Err(DomainError::validation("No valid fields to update"));
        }

        self.users
            .update_profile(id, changes)
            .await
            .map_err(|e| match e {
                RepoError::NotFound => DomainError::NotFound("User"),
                RepoError::Constraint(_) => {
                    DomainError::Duplicate("Email already in use".to_string())
                }
                other => other.into(),
            })?;

        tracing::info!(user_id = %id, "User profile updated");
        Ok(())
    }

    /// Store a new profile photo and return its public URL.
    ///
    /// `public_root` is the absolute URL under which stored files are served.
    /// Previous photos are left in storage.
    pub async fn upload_photo(
        &self,
        id: &str,
        upload: PhotoUpload,
        public_root: &str,
    ) -> Result<String, DomainError> {
        let user = self.find_by_id(id).await?;

        if upload.file_name.is_empty() {
            return Err(DomainError::validation("No selected file"));
        }
        if !is_allowed_photo(&upload.file_name) {
            return Err(DomainError::validation("File type not allowed"));
        }

        let now = Utc::now();
        let file_name = sanitize_file_name(&format!(
            "{}_{}_{}",
            user.id,
            now.timestamp_micros(),
            upload.file_name
        ));

        self.photos
            .save(&file_name, &upload.bytes)
            .await
            .map_err(|e| DomainError::Internal(e.to_string()))?;

        let photo_url = format!("{}/{}", public_root.trim_end_matches('/'), file_name);
        self.users.set_photo_url(user.id, &photo_url, now).await?;

        tracing::info!(user_id = %user.id, file = %file_name, bytes = upload.bytes.len(), "Profile photo stored");
        Ok(photo_url)
    }

    fn required_name(raw: &str, message: &str) -> Result<String, DomainError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(DomainError::validation(message));
        }
        Ok(trimmed.to_string())
    }

    async fn hash(&self, password: &str) -> Result<String, DomainError> {
        self.passwords
            .hash(password)
            .await
            .map_err(|e| DomainError::Internal(e.to_string()))
    }

    fn email_taken() -> DomainError {
        DomainError::Duplicate("User with this email already exists".to_string())
    }
}
