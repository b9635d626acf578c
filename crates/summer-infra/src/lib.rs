//! # Summer Infrastructure
//!
//! Concrete implementations of the ports defined in `summer-core`:
//! PostgreSQL and in-memory repositories, Argon2 password hashing and
//! local-disk photo storage.
//!
//! ## Feature Flags
//!
//! - `full` (default) - All features enabled
//! - `minimal` - No external database, in-memory repositories only
//! - `postgres` - PostgreSQL repositories via SeaORM

pub mod auth;
pub mod database;
pub mod memory;
pub mod storage;

pub use auth::Argon2PasswordService;
pub use database::DatabaseConfig;
pub use memory::{InMemoryPostRepository, InMemoryUserRepository};
pub use storage::LocalPhotoStorage;

#[cfg(feature = "postgres")]
pub use database::{DatabasePool, PostgresPostRepository, PostgresUserRepository};
