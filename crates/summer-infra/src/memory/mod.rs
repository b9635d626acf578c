//! In-memory repositories - used when no database is configured and in tests.
//!
//! Each collection sits behind one async `RwLock`, so every mutation is
//! atomic with respect to the others. Data is lost on process restart.

mod posts;
mod users;

pub use posts::InMemoryPostRepository;
pub use users::InMemoryUserRepository;
