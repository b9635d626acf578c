//! Profile handlers: read, partial update and photo upload.

use actix_multipart::Multipart;
use actix_web::{HttpMessage, HttpRequest, HttpResponse, web};
use futures::StreamExt;
use serde_json::{Map, Value};

use summer_core::services::{PhotoUpload, ProfileUpdate};
use summer_shared::SuccessResponse;
use summer_shared::dto::{PhotoResponse, UpdateUserRequest, UserEnvelope};

use super::user_response;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// Multipart field carrying the photo.
const PHOTO_FIELD: &str = "photo";

/// GET /auth/user/{id}
pub async fn get_user(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let user = state.users.find_by_id(&path).await?;

    Ok(HttpResponse::Ok().json(UserEnvelope {
        user: user_response(user),
    }))
}

/// PUT /auth/user/{id}
///
/// A missing, unparsable or empty body is answered with "No data provided".
pub async fn update_user(
    state: web::Data<AppState>,
    path: web::Path<String>,
    body: Option<web::Json<Map<String, Value>>>,
) -> AppResult<HttpResponse> {
    let fields = match body {
        Some(body) if !body.is_empty() => body.into_inner(),
        _ => return Err(AppError::BadRequest("No data provided".to_string())),
    };

    let req: UpdateUserRequest = serde_json::from_value(Value::Object(fields))
        .map_err(|_| AppError::BadRequest("Invalid JSON body".to_string()))?;

    state
        .users
        .update_profile(
            &path,
            ProfileUpdate {
                first_name: req.first_name,
                last_name: req.last_name,
                email: req.email,
                password: req.password,
            },
        )
        .await?;

    Ok(HttpResponse::Ok().json(SuccessResponse::ok()))
}

/// POST /auth/user/{id}/photo
pub async fn upload_photo(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<String>,
    mut payload: Multipart,
) -> AppResult<HttpResponse> {
    let user_id = path.into_inner();

    // Unknown users are reported before anything about the body.
    state.users.find_by_id(&user_id).await?;

    if !req.content_type().starts_with("multipart/form-data") {
        return Err(no_file_part());
    }
    let upload = read_photo_field(&mut payload, state.uploads.max_bytes)
        .await?
        .ok_or_else(no_file_part)?;

    let public_root = state.public_uploads_root(&req);
    let photo_url = state
        .users
        .upload_photo(&user_id, upload, &public_root)
        .await?;

    Ok(HttpResponse::Ok().json(PhotoResponse {
        success: true,
        photo_url,
    }))
}

/// Pull the `photo` file out of the form, skipping any other parts.
async fn read_photo_field(
    payload: &mut Multipart,
    limit: usize,
) -> AppResult<Option<PhotoUpload>> {
    while let Some(field) = payload.next().await {
        let mut field = field.map_err(malformed)?;

        // Only a part carrying a filename is a file upload.
        let file_name = field
            .content_disposition()
            .filter(|cd| cd.get_name() == Some(PHOTO_FIELD))
            .and_then(|cd| cd.get_filename())
            .map(str::to_string);

        let mut bytes = Vec::new();
        while let Some(chunk) = field.next().await {
            let chunk = chunk.map_err(malformed)?;
            if file_name.is_none() {
                continue;
            }
            if bytes.len() + chunk.len() > limit {
                return Err(AppError::BadRequest("File too large".to_string()));
            }
            bytes.extend_from_slice(&chunk);
        }

        if let Some(file_name) = file_name {
            return Ok(Some(PhotoUpload { file_name, bytes }));
        }
    }

    Ok(None)
}

fn no_file_part() -> AppError {
    AppError::BadRequest("No file part in request".to_string())
}

fn malformed(err: actix_multipart::MultipartError) -> AppError {
    tracing::debug!(error = %err, "Malformed multipart body");
    AppError::BadRequest("Malformed multipart body".to_string())
}
