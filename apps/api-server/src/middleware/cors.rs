//! Cross-origin policy.

use actix_cors::Cors;

/// Build the CORS middleware. With no configured origins every origin is
/// accepted.
pub fn cors_policy(allowed_origins: &[String]) -> Cors {
    if allowed_origins.is_empty() {
        return Cors::permissive();
    }

    allowed_origins.iter().fold(
        Cors::default()
            .allow_any_method()
            .allow_any_header()
            .max_age(3600),
        |cors, origin| cors.allowed_origin(origin),
    )
}
