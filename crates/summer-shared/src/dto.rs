//! Data Transfer Objects - request/response types for the API.
//!
//! Request fields are optional so that missing fields reach the service
//! layer and get its field-specific error messages.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// `POST /auth/signup`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SignupRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

/// `POST /auth/login`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// `PUT /auth/user/{id}`. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateUserRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

/// `POST /posts`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreatePostRequest {
    pub user_id: Option<String>,
    pub content: Option<String>,
}

/// `POST /posts/{id}/like`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ToggleLikeRequest {
    pub user_id: Option<String>,
}

/// `GET /posts?sort=...`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListPostsQuery {
    pub sort: Option<String>,
}

/// A user's public profile. Never includes credentials.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub photo_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignupResponse {
    pub message: String,
    pub user_id: String,
    pub user: UserResponse,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub message: String,
    pub user: UserResponse,
}

/// `{"user": {...}}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserEnvelope {
    pub user: UserResponse,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhotoResponse {
    pub success: bool,
    pub photo_url: String,
}

/// Author display name embedded in posts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthorResponse {
    pub first_name: String,
    pub last_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostResponse {
    pub id: String,
    pub content: String,
    pub likes: i64,
    pub created_at: DateTime<Utc>,
    pub user: AuthorResponse,
    pub liked_by: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePostResponse {
    pub message: String,
    pub post_id: String,
    pub post: PostResponse,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostListResponse {
    pub posts: Vec<PostResponse>,
    pub count: usize,
    pub sort: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToggleLikeResponse {
    pub message: String,
    pub action: String,
    pub likes: i64,
}

/// Banner served at `GET /`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WelcomeResponse {
    pub message: String,
    pub status: String,
}
