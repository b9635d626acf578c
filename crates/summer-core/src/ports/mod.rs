//! Ports - trait definitions for external dependencies.
//! These are the "interfaces" that infrastructure must implement.

mod auth;
mod repository;
mod storage;

pub use auth::{AuthError, PasswordService};
pub use repository::{PostRepository, UserRepository};
pub use storage::{PhotoStorage, StorageError};
