//! HTTP tests over in-memory adapters.

use std::sync::Arc;

use actix_web::http::StatusCode;
use actix_web::http::header::CONTENT_TYPE;
use actix_web::{App, test as actix_test, web};
use serde_json::{Value, json};
use tempfile::TempDir;

use summer_core::domain::User;
use summer_core::services::SignupInput;
use summer_infra::{
    Argon2PasswordService, InMemoryPostRepository, InMemoryUserRepository, LocalPhotoStorage,
};

use super::*;
use crate::state::{AppState, UploadSettings};

const BOUNDARY: &str = "summer-test-boundary";

struct Fixture {
    state: AppState,
    _uploads: TempDir,
}

async fn fixture() -> Fixture {
    fixture_with_limit(1024 * 1024).await
}

async fn fixture_with_limit(max_bytes: usize) -> Fixture {
    let uploads = tempfile::tempdir().unwrap();
    let users = Arc::new(InMemoryUserRepository::new());
    let posts = Arc::new(InMemoryPostRepository::new(users.clone()));
    let passwords = Arc::new(Argon2PasswordService::with_params(1024, 1, 1).unwrap());
    let photos = LocalPhotoStorage::init(uploads.path()).await.unwrap();
    let settings = UploadSettings {
        dir: photos.root().to_path_buf(),
        max_bytes,
        public_base_url: None,
    };

    let state = AppState::from_parts(users, posts, passwords, photos, settings);

    Fixture {
        state,
        _uploads: uploads,
    }
}

fn test_app(
    state: AppState,
) -> App<
    impl actix_web::dev::ServiceFactory<
        actix_web::dev::ServiceRequest,
        Config = (),
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let upload_dir = state.uploads.dir.clone();
    App::new()
        .app_data(web::Data::new(state))
        .app_data(json_config())
        .app_data(query_config())
        .configure(configure_routes)
        .service(uploads_service(&upload_dir))
}

async fn seed_user(state: &AppState, first_name: &str, email: &str) -> User {
    state
        .users
        .signup(SignupInput {
            first_name: first_name.to_string(),
            last_name: "Tester".to_string(),
            email: email.to_string(),
            password: "secret1".to_string(),
        })
        .await
        .unwrap()
}

fn multipart_body(field: &str, file_name: &str, bytes: &[u8]) -> Vec<u8> {
    let mut body = format!(
        "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"{file_name}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
    )
    .into_bytes();
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
    body
}

fn multipart_text_field(field: &str, value: &str) -> Vec<u8> {
    format!(
        "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{field}\"\r\n\r\n{value}\r\n--{BOUNDARY}--\r\n"
    )
    .into_bytes()
}

fn multipart_request(uri: &str, body: Vec<u8>) -> actix_test::TestRequest {
    actix_test::TestRequest::post()
        .uri(uri)
        .insert_header((
            CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        ))
        .set_payload(body)
}

#[actix_web::test]
async fn welcome_banner() {
    let f = fixture().await;
    let app = actix_test::init_service(test_app(f.state.clone())).await;

    let req = actix_test::TestRequest::get().uri("/").to_request();
    let body: Value = actix_test::call_and_read_body_json(&app, req).await;

    assert_eq!(
        body,
        json!({ "message": "Welcome to the Summer API!", "status": "running" })
    );
}

#[actix_web::test]
async fn signup_returns_public_profile() {
    let f = fixture().await;
    let app = actix_test::init_service(test_app(f.state.clone())).await;

    let req = actix_test::TestRequest::post()
        .uri("/auth/signup")
        .set_json(json!({
            "first_name": "Ada",
            "last_name": "Lovelace",
            "email": "Ada@Example.com",
            "password": "secret1"
        }))
        .to_request();
    let resp = actix_test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let body: Value = actix_test::read_body_json(resp).await;
    assert_eq!(body["message"], "User created successfully");
    assert_eq!(body["user"]["email"], "ada@example.com");
    assert_eq!(body["user"]["id"], body["user_id"]);
    assert!(body["user"]["photo_url"].is_null());
    assert!(body["user"].get("password_hash").is_none());
    assert!(body["user"].get("password").is_none());
}

#[actix_web::test]
async fn signup_validation_and_conflict() {
    let f = fixture().await;
    seed_user(&f.state, "Ada", "ada@example.com").await;
    let app = actix_test::init_service(test_app(f.state.clone())).await;

    let cases = [
        (
            json!({ "last_name": "L", "email": "x@example.com", "password": "secret1" }),
            StatusCode::BAD_REQUEST,
            "first_name is required",
        ),
        (
            json!({ "first_name": "A", "last_name": "L", "email": "nope", "password": "secret1" }),
            StatusCode::BAD_REQUEST,
            "Invalid email format",
        ),
        (
            json!({ "first_name": "A", "last_name": "L", "email": "b@example.com", "password": "123" }),
            StatusCode::BAD_REQUEST,
            "Password must be at least 6 characters long",
        ),
        (
            json!({ "first_name": "A", "last_name": "L", "email": "ADA@example.com", "password": "secret1" }),
            StatusCode::CONFLICT,
            "User with this email already exists",
        ),
    ];

    for (payload, status, message) in cases {
        let req = actix_test::TestRequest::post()
            .uri("/auth/signup")
            .set_json(payload)
            .to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), status, "{message}");
        let body: Value = actix_test::read_body_json(resp).await;
        assert_eq!(body, json!({ "error": message }));
    }
}

#[actix_web::test]
async fn malformed_json_is_bad_request() {
    let f = fixture().await;
    let app = actix_test::init_service(test_app(f.state.clone())).await;

    let req = actix_test::TestRequest::post()
        .uri("/auth/signup")
        .insert_header((CONTENT_TYPE, "application/json"))
        .set_payload("{not json")
        .to_request();
    let resp = actix_test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = actix_test::read_body_json(resp).await;
    assert_eq!(body["error"], "Invalid JSON body");
}

#[actix_web::test]
async fn login_success_and_identical_failures() {
    let f = fixture().await;
    seed_user(&f.state, "Ada", "ada@example.com").await;
    let app = actix_test::init_service(test_app(f.state.clone())).await;

    let req = actix_test::TestRequest::post()
        .uri("/auth/login")
        .set_json(json!({ "email": "ada@example.com", "password": "secret1" }))
        .to_request();
    let resp = actix_test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = actix_test::read_body_json(resp).await;
    assert_eq!(body["message"], "Login successful");
    assert_eq!(body["user"]["first_name"], "Ada");

    let mut errors = Vec::new();
    for payload in [
        json!({ "email": "ada@example.com", "password": "wrong-password" }),
        json!({ "email": "ghost@example.com", "password": "secret1" }),
    ] {
        let req = actix_test::TestRequest::post()
            .uri("/auth/login")
            .set_json(payload)
            .to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        let body: Value = actix_test::read_body_json(resp).await;
        errors.push(body);
    }
    assert_eq!(errors[0], errors[1]);
    assert_eq!(errors[0]["error"], "Invalid email or password");

    let req = actix_test::TestRequest::post()
        .uri("/auth/login")
        .set_json(json!({ "email": "ada@example.com" }))
        .to_request();
    let resp = actix_test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = actix_test::read_body_json(resp).await;
    assert_eq!(body["error"], "Email and password are required");
}

#[actix_web::test]
async fn logout_always_succeeds() {
    let f = fixture().await;
    let app = actix_test::init_service(test_app(f.state.clone())).await;

    let req = actix_test::TestRequest::post().uri("/auth/logout").to_request();
    let resp = actix_test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = actix_test::read_body_json(resp).await;
    assert_eq!(body, json!({ "message": "Logged out successfully" }));
}

#[actix_web::test]
async fn get_user_by_id() {
    let f = fixture().await;
    let user = seed_user(&f.state, "Ada", "ada@example.com").await;
    let app = actix_test::init_service(test_app(f.state.clone())).await;

    let req = actix_test::TestRequest::get()
        .uri(&format!("/auth/user/{}", user.id))
        .to_request();
    let resp = actix_test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = actix_test::read_body_json(resp).await;
    assert_eq!(body["user"]["email"], "ada@example.com");

    for id in [uuid::Uuid::new_v4().to_string(), "not-a-uuid".to_string()] {
        let req = actix_test::TestRequest::get()
            .uri(&format!("/auth/user/{id}"))
            .to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let body: Value = actix_test::read_body_json(resp).await;
        assert_eq!(body, json!({ "error": "User not found" }));
    }
}

#[actix_web::test]
async fn update_user_rules() {
    let f = fixture().await;
    let ada = seed_user(&f.state, "Ada", "ada@example.com").await;
    seed_user(&f.state, "Grace", "grace@example.com").await;
    let app = actix_test::init_service(test_app(f.state.clone())).await;
    let uri = format!("/auth/user/{}", ada.id);

    let req = actix_test::TestRequest::put().uri(&uri).set_json(json!({})).to_request();
    let resp = actix_test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = actix_test::read_body_json(resp).await;
    assert_eq!(body["error"], "No data provided");

    let cases = [
        (json!({ "first_name": "  " }), StatusCode::BAD_REQUEST, "First name cannot be empty"),
        (json!({ "email": "bad" }), StatusCode::BAD_REQUEST, "Invalid email format"),
        (json!({ "email": "Grace@example.com" }), StatusCode::CONFLICT, "Email already in use"),
        (json!({ "password": "abc" }), StatusCode::BAD_REQUEST, "Password must be at least 6 characters"),
    ];
    for (payload, status, message) in cases {
        let req = actix_test::TestRequest::put().uri(&uri).set_json(payload).to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), status, "{message}");
        let body: Value = actix_test::read_body_json(resp).await;
        assert_eq!(body["error"], message);
    }

    let req = actix_test::TestRequest::put()
        .uri(&uri)
        .set_json(json!({ "first_name": " Augusta ", "password": "newsecret" }))
        .to_request();
    let resp = actix_test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = actix_test::read_body_json(resp).await;
    assert_eq!(body, json!({ "success": true }));

    let req = actix_test::TestRequest::get().uri(&uri).to_request();
    let body: Value = actix_test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["user"]["first_name"], "Augusta");

    let req = actix_test::TestRequest::post()
        .uri("/auth/login")
        .set_json(json!({ "email": "ada@example.com", "password": "newsecret" }))
        .to_request();
    let resp = actix_test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let req = actix_test::TestRequest::put()
        .uri(&format!("/auth/user/{}", uuid::Uuid::new_v4()))
        .set_json(json!({ "first_name": "Nobody" }))
        .to_request();
    let resp = actix_test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn photo_upload_is_served_back() {
    let f = fixture().await;
    let user = seed_user(&f.state, "Ada", "ada@example.com").await;
    let app = actix_test::init_service(test_app(f.state.clone())).await;
    let image = b"\x89PNG\r\n\x1a\nnot-really-a-png".to_vec();

    let req = multipart_request(
        &format!("/auth/user/{}/photo", user.id),
        multipart_body("photo", "avatar.png", &image),
    )
    .to_request();
    let resp = actix_test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = actix_test::read_body_json(resp).await;
    assert_eq!(body["success"], true);

    let photo_url = body["photo_url"].as_str().unwrap().to_string();
    assert!(photo_url.ends_with("_avatar.png"), "{photo_url}");
    let path = &photo_url[photo_url.find(UPLOADS_PATH).unwrap()..];

    let req = actix_test::TestRequest::get().uri(path).to_request();
    let resp = actix_test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let served = actix_test::read_body(resp).await;
    assert_eq!(served.as_ref(), image.as_slice());

    let req = actix_test::TestRequest::get()
        .uri(&format!("/auth/user/{}", user.id))
        .to_request();
    let profile: Value = actix_test::call_and_read_body_json(&app, req).await;
    assert_eq!(profile["user"]["photo_url"], photo_url.as_str());
}

#[actix_web::test]
async fn photo_upload_rejections() {
    let f = fixture_with_limit(16).await;
    let user = seed_user(&f.state, "Ada", "ada@example.com").await;
    let app = actix_test::init_service(test_app(f.state.clone())).await;
    let uri = format!("/auth/user/{}/photo", user.id);

    let cases = [
        (multipart_body("photo", "notes.txt", b"hello"), "File type not allowed"),
        (multipart_body("photo", "", b"hello"), "No selected file"),
        (multipart_body("avatar", "a.png", b"hello"), "No file part in request"),
        (multipart_body("photo", "big.png", &[0u8; 64]), "File too large"),
        (multipart_text_field("photo", "avatar.png"), "No file part in request"),
    ];
    for (body, message) in cases {
        let req = multipart_request(&uri, body).to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "{message}");
        let body: Value = actix_test::read_body_json(resp).await;
        assert_eq!(body["error"], message);
    }

    let req = actix_test::TestRequest::post()
        .uri(&uri)
        .set_json(json!({ "photo": "inline" }))
        .to_request();
    let resp = actix_test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = actix_test::read_body_json(resp).await;
    assert_eq!(body["error"], "No file part in request");

    let req = multipart_request(
        &format!("/auth/user/{}/photo", uuid::Uuid::new_v4()),
        multipart_body("photo", "a.png", b"hello"),
    )
    .to_request();
    let resp = actix_test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn create_post_and_errors() {
    let f = fixture().await;
    let user = seed_user(&f.state, "Ada", "ada@example.com").await;
    let app = actix_test::init_service(test_app(f.state.clone())).await;

    let req = actix_test::TestRequest::post()
        .uri("/posts")
        .set_json(json!({ "user_id": user.id.to_string(), "content": "  Hello summer  " }))
        .to_request();
    let resp = actix_test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = actix_test::read_body_json(resp).await;
    assert_eq!(body["message"], "Post created successfully");
    assert_eq!(body["post"]["id"], body["post_id"]);
    assert_eq!(body["post"]["content"], "Hello summer");
    assert_eq!(body["post"]["likes"], 0);
    assert_eq!(body["post"]["liked_by"], json!([]));
    assert_eq!(
        body["post"]["user"],
        json!({ "first_name": "Ada", "last_name": "Tester" })
    );

    let cases = [
        (json!({ "content": "hi" }), StatusCode::BAD_REQUEST, "User ID is required"),
        (
            json!({ "user_id": user.id.to_string(), "content": "   " }),
            StatusCode::BAD_REQUEST,
            "Post content is required",
        ),
        (
            json!({ "user_id": uuid::Uuid::new_v4().to_string(), "content": "hi" }),
            StatusCode::NOT_FOUND,
            "User not found",
        ),
    ];
    for (payload, status, message) in cases {
        let req = actix_test::TestRequest::post()
            .uri("/posts")
            .set_json(payload)
            .to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), status, "{message}");
        let body: Value = actix_test::read_body_json(resp).await;
        assert_eq!(body["error"], message);
    }
}

#[actix_web::test]
async fn like_toggle_and_feed_ordering() {
    let f = fixture().await;
    let ada = seed_user(&f.state, "Ada", "ada@example.com").await;
    let grace = seed_user(&f.state, "Grace", "grace@example.com").await;
    let first = f.state.posts.create_post(&ada.id.to_string(), "first").await.unwrap();
    let second = f.state.posts.create_post(&grace.id.to_string(), "second").await.unwrap();
    let app = actix_test::init_service(test_app(f.state.clone())).await;
    let like_uri = format!("/posts/{}/like", first.post.id);

    for (user, action, likes) in [(&grace, "liked", 1), (&ada, "liked", 2), (&grace, "unliked", 1)] {
        let req = actix_test::TestRequest::post()
            .uri(&like_uri)
            .set_json(json!({ "user_id": user.id.to_string() }))
            .to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = actix_test::read_body_json(resp).await;
        assert_eq!(body["action"], action);
        assert_eq!(body["likes"], likes);
        assert_eq!(body["message"], format!("Post {action} successfully"));
    }

    let req = actix_test::TestRequest::get().uri("/posts").to_request();
    let body: Value = actix_test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["sort"], "new");
    assert_eq!(body["count"], 2);
    assert_eq!(body["posts"][0]["id"], second.post.id.to_string());

    let req = actix_test::TestRequest::get().uri("/posts?sort=likes").to_request();
    let body: Value = actix_test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["sort"], "likes");
    assert_eq!(body["posts"][0]["id"], first.post.id.to_string());
    assert_eq!(body["posts"][0]["liked_by"], json!([ada.id.to_string()]));

    let req = actix_test::TestRequest::get().uri("/posts?sort=old").to_request();
    let body: Value = actix_test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["posts"][0]["id"], first.post.id.to_string());

    let req = actix_test::TestRequest::get().uri("/posts?sort=popular").to_request();
    let body: Value = actix_test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["sort"], "new");
}

#[actix_web::test]
async fn like_toggle_errors() {
    let f = fixture().await;
    let ada = seed_user(&f.state, "Ada", "ada@example.com").await;
    let post = f.state.posts.create_post(&ada.id.to_string(), "hello").await.unwrap();
    let app = actix_test::init_service(test_app(f.state.clone())).await;

    let cases = [
        (
            format!("/posts/{}/like", post.post.id),
            json!({}),
            StatusCode::BAD_REQUEST,
            "User ID is required",
        ),
        (
            format!("/posts/{}/like", post.post.id),
            json!({ "user_id": "not-a-uuid" }),
            StatusCode::BAD_REQUEST,
            "Invalid user ID",
        ),
        (
            format!("/posts/{}/like", uuid::Uuid::new_v4()),
            json!({ "user_id": ada.id.to_string() }),
            StatusCode::NOT_FOUND,
            "Post not found",
        ),
    ];
    for (uri, payload, status, message) in cases {
        let req = actix_test::TestRequest::post()
            .uri(&uri)
            .set_json(payload)
            .to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), status, "{message}");
        let body: Value = actix_test::read_body_json(resp).await;
        assert_eq!(body["error"], message);
    }
}
