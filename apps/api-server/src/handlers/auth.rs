//! Authentication handlers.

use actix_web::{HttpResponse, web};

use summer_core::services::SignupInput;
use summer_shared::MessageResponse;
use summer_shared::dto::{LoginRequest, LoginResponse, SignupRequest, SignupResponse};

use super::user_response;
use crate::middleware::error::AppResult;
use crate::state::AppState;

/// POST /auth/signup
pub async fn signup(
    state: web::Data<AppState>,
    body: web::Json<SignupRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();

    let user = state
        .users
        .signup(SignupInput {
            first_name: req.first_name.unwrap_or_default(),
            last_name: req.last_name.unwrap_or_default(),
            email: req.email.unwrap_or_default(),
            password: req.password.unwrap_or_default(),
        })
        .await?;

    Ok(HttpResponse::Created().json(SignupResponse {
        message: "User created successfully".to_string(),
        user_id: user.id.to_string(),
        user: user_response(user),
    }))
}

/// POST /auth/login
pub async fn login(
    state: web::Data<AppState>,
    body: web::Json<LoginRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();

    let user = state
        .users
        .login(
            req.email.as_deref().unwrap_or_default(),
            req.password.as_deref().unwrap_or_default(),
        )
        .await?;

    Ok(HttpResponse::Ok().json(LoginResponse {
        message: "Login successful".to_string(),
        user: user_response(user),
    }))
}

/// POST /auth/logout
///
/// Sessions are not tracked server side.
pub async fn logout() -> HttpResponse {
    HttpResponse::Ok().json(MessageResponse::new("Logged out successfully"))
}
