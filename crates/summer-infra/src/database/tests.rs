use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Utc;
use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult, Value};
use uuid::Uuid;

use summer_core::domain::{LikeAction, PostSort, User, UserChanges};
use summer_core::error::RepoError;
use summer_core::ports::{PostRepository, UserRepository};

use crate::database::DatabasePool;
use crate::database::entity::{post, post_like, user};
use crate::database::postgres_repo::{PostgresPostRepository, PostgresUserRepository};

fn user_model(id: Uuid, email: &str) -> user::Model {
    let now = Utc::now();
    user::Model {
        id,
        first_name: "Ada".to_owned(),
        last_name: "Lovelace".to_owned(),
        email: email.to_owned(),
        password_hash: "$argon2id$hash".to_owned(),
        photo_url: None,
        is_active: true,
        created_at: now.into(),
        updated_at: now.into(),
        last_login: None,
    }
}

fn post_model(id: Uuid, user_id: Uuid, likes: i64) -> post::Model {
    let now = Utc::now();
    post::Model {
        id,
        user_id,
        content: "hello".to_owned(),
        likes,
        created_at: now.into(),
        updated_at: now.into(),
    }
}

fn like_model(post_id: Uuid, user_id: Uuid) -> post_like::Model {
    post_like::Model {
        post_id,
        user_id,
        created_at: Utc::now().into(),
    }
}

fn count_row(n: i64) -> BTreeMap<&'static str, Value> {
    BTreeMap::from([("num_items", Value::BigInt(Some(n)))])
}

fn exec_ok(rows_affected: u64) -> MockExecResult {
    MockExecResult {
        last_insert_id: 0,
        rows_affected,
    }
}

#[tokio::test]
async fn test_find_user_by_id() {
    let user_id = Uuid::new_v4();

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results(vec![vec![user_model(user_id, "ada@example.com")]])
        .into_connection();

    let repo = PostgresUserRepository::new(db);

    let result: Option<User> = UserRepository::find_by_id(&repo, user_id).await.unwrap();

    let user = result.expect("user present");
    assert_eq!(user.id, user_id);
    assert_eq!(user.email, "ada@example.com");
    assert!(user.is_active);
    assert!(user.last_login.is_none());
}

#[tokio::test]
async fn test_find_user_by_email_missing() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results(vec![Vec::<user::Model>::new()])
        .into_connection();

    let repo = PostgresUserRepository::new(db);

    let result = repo.find_by_email("nobody@example.com").await.unwrap();
    assert!(result.is_none());
}

#[tokio::test]
async fn test_update_profile_of_missing_user_is_not_found() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_exec_results(vec![exec_ok(0)])
        .into_connection();

    let repo = PostgresUserRepository::new(db);
    let changes = UserChanges {
        first_name: Some("Grace".to_owned()),
        last_name: None,
        email: None,
        password_hash: None,
        updated_at: Utc::now(),
    };

    let result = repo.update_profile(Uuid::new_v4(), changes).await;
    assert!(matches!(result, Err(RepoError::NotFound)));
}

#[tokio::test]
async fn test_find_post_by_id_includes_like_set() {
    let post_id = Uuid::new_v4();
    let author_id = Uuid::new_v4();
    let liker = Uuid::new_v4();
    let now = Utc::now();

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results(vec![vec![post::Model {
            id: post_id,
            user_id: author_id,
            content: "hello".to_owned(),
            likes: 1,
            created_at: now.into(),
            updated_at: now.into(),
        }]])
        .append_query_results(vec![vec![crate::database::entity::post_like::Model {
            post_id,
            user_id: liker,
            created_at: now.into(),
        }]])
        .into_connection();

    let repo = PostgresPostRepository::new(db);

    let post = PostRepository::find_by_id(&repo, post_id)
        .await
        .unwrap()
        .expect("post present");
    assert_eq!(post.content, "hello");
    assert_eq!(post.likes, 1);
    assert_eq!(post.liked_by, vec![liker]);
}

#[tokio::test]
async fn test_toggle_like_on_missing_post_returns_none() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results(vec![Vec::<post::Model>::new()])
        .into_connection();

    let repo = PostgresPostRepository::new(db);

    let result = repo
        .toggle_like(Uuid::new_v4(), Uuid::new_v4())
        .await
        .unwrap();
    assert!(result.is_none());
}

#[tokio::test]
async fn test_toggle_like_inserts_and_recounts() {
    let post_id = Uuid::new_v4();
    let liker = Uuid::new_v4();

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results(vec![vec![post_model(post_id, Uuid::new_v4(), 0)]])
        .append_query_results(vec![Vec::<post_like::Model>::new()])
        .append_query_results(vec![vec![like_model(post_id, liker)]])
        .append_query_results(vec![vec![count_row(1)]])
        .append_exec_results(vec![exec_ok(1)])
        .into_connection();

    let repo = PostgresPostRepository::new(db);

    let toggle = repo
        .toggle_like(post_id, liker)
        .await
        .unwrap()
        .expect("post present");
    assert_eq!(toggle.action, LikeAction::Liked);
    assert_eq!(toggle.likes, 1);

    let log = format!(
        "{:?}",
        Arc::try_unwrap(repo.db)
            .expect("sole handle")
            .into_transaction_log()
    );
    assert!(log.contains("FOR UPDATE"), "{log}");
    assert!(log.contains("INSERT INTO"), "{log}");
    assert!(log.contains("COUNT"), "{log}");
}

#[tokio::test]
async fn test_toggle_like_deletes_existing_like() {
    let post_id = Uuid::new_v4();
    let liker = Uuid::new_v4();

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results(vec![vec![post_model(post_id, Uuid::new_v4(), 1)]])
        .append_query_results(vec![vec![like_model(post_id, liker)]])
        .append_query_results(vec![vec![count_row(0)]])
        .append_exec_results(vec![exec_ok(1), exec_ok(1)])
        .into_connection();

    let repo = PostgresPostRepository::new(db);

    let toggle = repo
        .toggle_like(post_id, liker)
        .await
        .unwrap()
        .expect("post present");
    assert_eq!(toggle.action, LikeAction::Unliked);
    assert_eq!(toggle.likes, 0);

    let log = format!(
        "{:?}",
        Arc::try_unwrap(repo.db)
            .expect("sole handle")
            .into_transaction_log()
    );
    assert!(log.contains("DELETE FROM"), "{log}");
}

#[tokio::test]
async fn test_feed_drops_authorless_posts_and_attaches_likes() {
    let author_id = Uuid::new_v4();
    let kept = Uuid::new_v4();
    let orphan = Uuid::new_v4();
    let liker = Uuid::new_v4();

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results(vec![vec![
            (
                post_model(kept, author_id, 1),
                Some(user_model(author_id, "ada@example.com")),
            ),
            (post_model(orphan, Uuid::new_v4(), 0), None),
        ]])
        .append_query_results(vec![vec![like_model(kept, liker)]])
        .into_connection();

    let repo = PostgresPostRepository::new(db);

    let feed = repo.list_with_authors(PostSort::Likes).await.unwrap();
    assert_eq!(feed.len(), 1);
    assert_eq!(feed[0].post.id, kept);
    assert_eq!(feed[0].post.liked_by, vec![liker]);
    assert_eq!(feed[0].author.first_name, "Ada");
    assert_eq!(feed[0].author.last_name, "Lovelace");

    let log = format!(
        "{:?}",
        Arc::try_unwrap(repo.db)
            .expect("sole handle")
            .into_transaction_log()
    );
    assert!(log.contains(r#"\"likes\" DESC"#), "{log}");
    assert!(log.contains(" IN ("), "{log}");
}

#[tokio::test]
async fn test_pool_is_shared_with_repositories() {
    let user_id = Uuid::new_v4();
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results(vec![vec![user_model(user_id, "ada@example.com")]])
        .into_connection();

    let pool = DatabasePool::from_connection(db);
    let users = PostgresUserRepository::new(pool.shared());
    let posts = PostgresPostRepository::new(pool.shared());

    let found = UserRepository::find_by_id(&users, user_id).await.unwrap();
    assert!(found.is_some());

    // Still referenced by the repositories.
    assert!(!pool.clone().close().await.unwrap());

    drop(users);
    drop(posts);
    assert!(pool.close().await.unwrap());
}
