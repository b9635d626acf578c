//! Service banner.

use actix_web::HttpResponse;
use summer_shared::dto::WelcomeResponse;

/// GET /
pub async fn welcome() -> HttpResponse {
    HttpResponse::Ok().json(WelcomeResponse {
        message: "Welcome to the Summer API!".to_string(),
        status: "running".to_string(),
    })
}
