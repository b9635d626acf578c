use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Post entity - a short text entry in the feed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    pub user_id: Uuid,
    pub content: String,
    /// Always equal to `liked_by.len()`.
    pub likes: i64,
    /// Ids of users currently liking the post, in the order they liked it.
    /// Never holds the same id twice.
    pub liked_by: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Post {
    /// Create a new post with no likes.
    pub fn new(user_id: Uuid, content: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id,
            content,
            likes: 0,
            liked_by: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_liked_by(&self, user_id: Uuid) -> bool {
        self.liked_by.contains(&user_id)
    }

    /// Flip `user_id`'s membership in the liked-by set.
    ///
    /// The counter is recomputed from the set rather than adjusted, so the
    /// two cannot drift apart.
    pub fn toggle_like(&mut self, user_id: Uuid, now: DateTime<Utc>) -> LikeToggle {
        let action = if self.is_liked_by(user_id) {
            self.liked_by.retain(|id| *id != user_id);
            LikeAction::Unliked
        } else {
            self.liked_by.push(user_id);
            LikeAction::Liked
        };
        self.likes = self.liked_by.len() as i64;
        self.updated_at = now;

        LikeToggle {
            action,
            likes: self.likes,
        }
    }
}

/// Display name of a post's author, as joined from the user store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostAuthor {
    pub first_name: String,
    pub last_name: String,
}

/// A post joined with its author.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostWithAuthor {
    pub post: Post,
    pub author: PostAuthor,
}

/// What a like toggle did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LikeAction {
    Liked,
    Unliked,
}

impl LikeAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            LikeAction::Liked => "liked",
            LikeAction::Unliked => "unliked",
        }
    }
}

impl fmt::Display for LikeAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of a like toggle: the action taken and the new counter value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LikeToggle {
    pub action: LikeAction,
    pub likes: i64,
}

/// Feed ordering.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostSort {
    /// Newest first.
    #[default]
    New,
    /// Oldest first.
    Old,
    /// Most liked first, ties broken newest first.
    Likes,
}

impl PostSort {
    pub fn as_str(&self) -> &'static str {
        match self {
            PostSort::New => "new",
            PostSort::Old => "old",
            PostSort::Likes => "likes",
        }
    }

    /// Parse a query-string value, falling back to [`PostSort::New`] for
    /// anything missing or unrecognized.
    pub fn parse_or_default(value: Option<&str>) -> Self {
        value.and_then(|v| v.parse().ok()).unwrap_or_default()
    }

    /// Compare two posts under this ordering.
    pub fn compare(&self, a: &Post, b: &Post) -> Ordering {
        match self {
            PostSort::New => b.created_at.cmp(&a.created_at),
            PostSort::Old => a.created_at.cmp(&b.created_at),
            PostSort::Likes => b
                .likes
                .cmp(&a.likes)
                .then_with(|| b.created_at.cmp(&a.created_at)),
        }
    }
}

impl FromStr for PostSort {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "new" => Ok(PostSort::New),
            "old" => Ok(PostSort::Old),
            "likes" => Ok(PostSort::Likes),
            other => Err(format!("unknown sort mode: {other}")),
        }
    }
}

impl fmt::Display for PostSort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sort a materialized feed in place. The sort is stable.
pub fn sort_posts(posts: &mut [PostWithAuthor], sort: PostSort) {
    posts.sort_by(|a, b| sort.compare(&a.post, &b.post));
}
