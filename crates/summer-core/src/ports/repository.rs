use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{LikeToggle, Post, PostSort, PostWithAuthor, User, UserChanges};
use crate::error::RepoError;

/// User store.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Persist a new user. Returns `RepoError::Constraint` if the email is
    /// already taken.
    async fn insert(&self, user: User) -> Result<User, RepoError>;

    /// Find a user by their unique ID.
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepoError>;

    /// Find a user by their (already normalized) email address.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError>;

    /// Apply profile changes. Returns `RepoError::NotFound` if no user has
    /// this id and `RepoError::Constraint` if the new email is taken.
    async fn update_profile(&self, id: Uuid, changes: UserChanges) -> Result<(), RepoError>;

    /// Stamp the last successful login.
    async fn record_login(&self, id: Uuid, at: DateTime<Utc>) -> Result<(), RepoError>;

    /// Store the public URL of the user's profile photo.
    async fn set_photo_url(&self, id: Uuid, url: &str, at: DateTime<Utc>)
    -> Result<(), RepoError>;
}

/// Post store, including the author join and the like set.
#[async_trait]
pub trait PostRepository: Send + Sync {
    async fn insert(&self, post: Post) -> Result<Post, RepoError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, RepoError>;

    /// All posts joined with their authors, ordered by `sort`.
    ///
    /// Posts whose author no longer exists are left out.
    async fn list_with_authors(&self, sort: PostSort) -> Result<Vec<PostWithAuthor>, RepoError>;

    /// Atomically flip `user_id`'s like on a post.
    ///
    /// Returns `None` when the post does not exist. Concurrent toggles on the
    /// same post must serialize so that `likes` always equals the size of
    /// `liked_by`.
    async fn toggle_like(&self, post_id: Uuid, user_id: Uuid)
    -> Result<Option<LikeToggle>, RepoError>;
}
