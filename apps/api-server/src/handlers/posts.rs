//! Feed handlers.

use actix_web::{HttpResponse, web};

use summer_core::domain::PostSort;
use summer_shared::dto::{
    CreatePostRequest, CreatePostResponse, ListPostsQuery, PostListResponse, ToggleLikeRequest,
    ToggleLikeResponse,
};

use super::post_response;
use crate::middleware::error::AppResult;
use crate::state::AppState;

/// POST /posts
pub async fn create_post(
    state: web::Data<AppState>,
    body: web::Json<CreatePostRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();

    let created = state
        .posts
        .create_post(
            req.user_id.as_deref().unwrap_or_default(),
            req.content.as_deref().unwrap_or_default(),
        )
        .await?;

    Ok(HttpResponse::Created().json(CreatePostResponse {
        message: "Post created successfully".to_string(),
        post_id: created.post.id.to_string(),
        post: post_response(created),
    }))
}

/// GET /posts?sort={new|old|likes}
///
/// Unknown sort values fall back to `new`; the mode actually used is echoed.
pub async fn list_posts(
    state: web::Data<AppState>,
    query: web::Query<ListPostsQuery>,
) -> AppResult<HttpResponse> {
    let sort = PostSort::parse_or_default(query.sort.as_deref());
    let posts: Vec<_> = state
        .posts
        .list_posts(sort)
        .await?
        .into_iter()
        .map(post_response)
        .collect();

    Ok(HttpResponse::Ok().json(PostListResponse {
        count: posts.len(),
        posts,
        sort: sort.to_string(),
    }))
}

/// POST /posts/{id}/like
///
/// A missing body is treated like a missing `user_id`.
pub async fn toggle_like(
    state: web::Data<AppState>,
    path: web::Path<String>,
    body: Option<web::Json<ToggleLikeRequest>>,
) -> AppResult<HttpResponse> {
    let user_id = body.and_then(|b| b.into_inner().user_id).unwrap_or_default();
    let toggle = state.posts.toggle_like(&path, &user_id).await?;

    Ok(HttpResponse::Ok().json(ToggleLikeResponse {
        message: format!("Post {} successfully", toggle.action),
        action: toggle.action.to_string(),
        likes: toggle.likes,
    }))
}
