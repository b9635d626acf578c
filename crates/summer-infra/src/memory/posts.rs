use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use summer_core::domain::{LikeToggle, Post, PostSort, PostWithAuthor, sort_posts};
use summer_core::error::RepoError;
use summer_core::ports::PostRepository;

use super::InMemoryUserRepository;

/// In-memory post store. Joins against the shared user store for author
/// names.
pub struct InMemoryPostRepository {
    posts: RwLock<HashMap<Uuid, Post>>,
    users: Arc<InMemoryUserRepository>,
}

impl InMemoryPostRepository {
    pub fn new(users: Arc<InMemoryUserRepository>) -> Self {
        Self {
            posts: RwLock::new(HashMap::new()),
            users,
        }
    }
}

#[async_trait]
impl PostRepository for InMemoryPostRepository {
    async fn insert(&self, post: Post) -> Result<Post, RepoError> {
        let mut posts = self.posts.write().await;
        if posts.contains_key(&post.id) {
            return Err(RepoError::Constraint("posts.id".to_string()));
        }
        posts.insert(post.id, post.clone());
        Ok(post)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, RepoError> {
        Ok(self.posts.read().await.get(&id).cloned())
    }

    async fn list_with_authors(&self, sort: PostSort) -> Result<Vec<PostWithAuthor>, RepoError> {
        let authors = self.users.authors().await;

        let mut joined: Vec<PostWithAuthor> = self
            .posts
            .read()
            .await
            .values()
            .filter_map(|post| {
                authors.get(&post.user_id).map(|author| PostWithAuthor {
                    post: post.clone(),
                    author: author.clone(),
                })
            })
            .collect();

        sort_posts(&mut joined, sort);
        Ok(joined)
    }

    async fn toggle_like(
        &self,
        post_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<LikeToggle>, RepoError> {
        let mut posts = self.posts.write().await;
        Ok(posts
            .get_mut(&post_id)
            .map(|post| post.toggle_like(user_id, Utc::now())))
    }
}
