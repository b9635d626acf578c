//! HTTP handlers and route configuration.

mod auth;
mod health;
mod posts;
mod users;

#[cfg(test)]
mod tests;

use std::path::Path;

use actix_files::Files;
use actix_web::web;

use summer_core::domain::{PostWithAuthor, User};
use summer_shared::dto::{AuthorResponse, PostResponse, UserResponse};

use crate::middleware::error::AppError;

/// Public path prefix of stored photos.
pub const UPLOADS_PATH: &str = "/static/uploads";

/// Configure all application routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(health::welcome))
        .service(
            web::scope("/auth")
                .route("/signup", web::post().to(auth::signup))
                .route("/login", web::post().to(auth::login))
                .route("/logout", web::post().to(auth::logout))
                .route("/user/{id}", web::get().to(users::get_user))
                .route("/user/{id}", web::put().to(users::update_user))
                .route("/user/{id}/photo", web::post().to(users::upload_photo)),
        )
        .service(
            web::scope("/posts")
                .route("", web::post().to(posts::create_post))
                .route("", web::get().to(posts::list_posts))
                .route("/{id}/like", web::post().to(posts::toggle_like)),
        );
}

/// Serve stored photos read-only from the upload root.
pub fn uploads_service(root: &Path) -> Files {
    Files::new(UPLOADS_PATH, root)
}

/// Malformed JSON bodies render as regular 400 errors.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        tracing::debug!(error = %err, "Rejected JSON body");
        AppError::BadRequest("Invalid JSON body".to_string()).into()
    })
}

pub fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(|err, _req| {
        AppError::BadRequest(format!("Invalid query string: {err}")).into()
    })
}

fn user_response(user: User) -> UserResponse {
    UserResponse {
        id: user.id.to_string(),
        first_name: user.first_name,
        last_name: user.last_name,
        email: user.email,
        photo_url: user.photo_url,
        created_at: user.created_at,
        updated_at: user.updated_at,
    }
}

fn post_response(entry: PostWithAuthor) -> PostResponse {
    let PostWithAuthor { post, author } = entry;
    PostResponse {
        id: post.id.to_string(),
        content: post.content,
        likes: post.likes,
        created_at: post.created_at,
        user: AuthorResponse {
            first_name: author.first_name,
            last_name: author.last_name,
        },
        liked_by: post.liked_by.iter().map(ToString::to_string).collect(),
    }
}
