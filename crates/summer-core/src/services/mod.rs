//! Application services - the operations the HTTP layer drives.

mod posts;
mod users;

pub use posts::PostService;
pub use users::{PhotoUpload, ProfileUpdate, SignupInput, UserService};

use uuid::Uuid;

/// Parse a client-supplied id. Malformed ids are indistinguishable from
/// missing entities to callers.
fn parse_id(raw: &str) -> Option<Uuid> {
    Uuid::parse_str(raw.trim()).ok()
}
