//! Feed operations: posting, listing and like toggles.

use std::sync::Arc;

use crate::domain::{LikeToggle, Post, PostAuthor, PostSort, PostWithAuthor};
use crate::error::DomainError;
use crate::ports::{PostRepository, UserRepository};

use super::parse_id;

#[derive(Clone)]
pub struct PostService {
    posts: Arc<dyn PostRepository>,
    users: Arc<dyn UserRepository>,
}

impl PostService {
    pub fn new(posts: Arc<dyn PostRepository>, users: Arc<dyn UserRepository>) -> Self {
        Self { posts, users }
    }

    /// Publish a post on behalf of an existing user.
    pub async fn create_post(
        &self,
        user_id: &str,
        content: &str,
    ) -> Result<PostWithAuthor, DomainError> {
        if user_id.trim().is_empty() {
            return Err(DomainError::validation("User ID is required"));
        }
        let content = content.trim();
        if content.is_empty() {
            return Err(DomainError::validation("Post content is required"));
        }

        let user_id = parse_id(user_id).ok_or(DomainError::NotFound("User"))?;
        let author = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or(DomainError::NotFound("User"))?;

        let post = self
            .posts
            .insert(Post::new(author.id, content.to_string()))
            .await?;

        tracing::info!(post_id = %post.id, user_id = %author.id, "Post created");
        Ok(PostWithAuthor {
            post,
            author: PostAuthor {
                first_name: author.first_name,
                last_name: author.last_name,
            },
        })
    }

    /// The whole feed, joined with author names.
    pub async fn list_posts(&self, sort: PostSort) -> Result<Vec<PostWithAuthor>, DomainError> {
        let posts = self.posts.list_with_authors(sort).await?;
        tracing::debug!(sort = %sort, count = posts.len(), "Listed posts");
        Ok(posts)
    }

    /// Like the post if `user_id` does not like it yet, otherwise unlike it.
    ///
    /// The acting user id only has to be well formed; it is not checked
    /// against the user store.
    pub async fn toggle_like(
        &self,
        post_id: &str,
        user_id: &str,
    ) -> Result<LikeToggle, DomainError> {
        if user_id.trim().is_empty() {
            return Err(DomainError::validation("User ID is required"));
        }
        let user_id = parse_id(user_id).ok_or_else(|| DomainError::validation("Invalid user ID"))?;
        let post_id = parse_id(post_id).ok_or(DomainError::NotFound("Post"))?;

        let toggle = self
            .posts
            .toggle_like(post_id, user_id)
            .await?
            .ok_or(DomainError::NotFound("Post"))?;

        tracing::info!(
            post_id = %post_id,
            user_id = %user_id,
            action = %toggle.action,
            likes = toggle.likes,
            "Like toggled"
        );
        Ok(toggle)
    }
}
