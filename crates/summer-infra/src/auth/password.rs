//! Argon2 password hashing implementation.

use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use async_trait::async_trait;

use summer_core::ports::{AuthError, PasswordService};

/// Argon2id password service. Every hash carries its own random salt and
/// parameters in PHC string form, so parameter changes keep old hashes
/// verifiable.
///
/// Hashing and verification run on tokio's blocking pool.
pub struct Argon2PasswordService {
    argon2: Argon2<'static>,
}

impl Argon2PasswordService {
    pub fn new() -> Self {
        Self {
            argon2: Argon2::default(),
        }
    }

    /// Build with explicit cost parameters (memory in KiB, iterations,
    /// parallelism).
    pub fn with_params(m_cost: u32, t_cost: u32, p_cost: u32) -> Result<Self, AuthError> {
        let params = Params::new(m_cost, t_cost, p_cost, None)
            .map_err(|e| AuthError::HashingError(e.to_string()))?;
        Ok(Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        })
    }
}

impl Default for Argon2PasswordService {
    fn default() -> Self {
        Self::new()
    }
}

fn hash_with(argon2: &Argon2<'_>, password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| AuthError::HashingError(e.to_string()))
}

fn verify_with(argon2: &Argon2<'_>, password: &str, hash: &str) -> Result<bool, AuthError> {
    let parsed_hash =
        PasswordHash::new(hash).map_err(|e| AuthError::HashingError(e.to_string()))?;

    Ok(argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

async fn run_blocking<T, F>(task: F) -> Result<T, AuthError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, AuthError> + Send + 'static,
{
    tokio::task::spawn_blocking(task)
        .await
        .map_err(|e| AuthError::HashingError(e.to_string()))?
}

#[async_trait]
impl PasswordService for Argon2PasswordService {
    async fn hash(&self, password: &str) -> Result<String, AuthError> {
        let argon2 = self.argon2.clone();
        let password = password.to_owned();
        run_blocking(move || hash_with(&argon2, &password)).await
    }

    async fn verify(&self, password: &str, hash: &str) -> Result<bool, AuthError> {
        let argon2 = self.argon2.clone();
        let password = password.to_owned();
        let hash = hash.to_owned();
        run_blocking(move || verify_with(&argon2, &password, &hash)).await
    }
}
