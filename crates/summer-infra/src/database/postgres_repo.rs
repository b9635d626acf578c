//! PostgreSQL repository implementations.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use summer_core::domain::{
    LikeAction, LikeToggle, Post, PostAuthor, PostSort, PostWithAuthor, User, UserChanges,
};
use summer_core::error::RepoError;
use summer_core::ports::{PostRepository, UserRepository};
use summer_core::validation::mask_email;

use super::entity::post::{self, Entity as PostEntity};
use super::entity::post_like::{self, Entity as PostLikeEntity};
use super::entity::user::{self, Entity as UserEntity};
use super::postgres_base::{PostgresBaseRepository, map_db_err};

/// PostgreSQL user repository.
pub type PostgresUserRepository = PostgresBaseRepository<UserEntity>;

/// PostgreSQL post repository.
pub type PostgresPostRepository = PostgresBaseRepository<PostEntity>;

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn insert(&self, user: User) -> Result<User, RepoError> {
        let model = self.insert_model(user::ActiveModel::from(user)).await?;
        Ok(model.into())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepoError> {
        Ok(self.find_model(id).await?.map(Into::into))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        tracing::debug!(user_email = %mask_email(email), "Finding user by email");

        let result = UserEntity::find()
            .filter(user::Column::Email.eq(email))
            .one(self.conn())
            .await
            .map_err(map_db_err)?;

        Ok(result.map(Into::into))
    }

    async fn update_profile(&self, id: Uuid, changes: UserChanges) -> Result<(), RepoError> {
        let mut update = UserEntity::update_many()
            .col_expr(
                user::Column::UpdatedAt,
                Expr::value(changes.updated_at.fixed_offset()),
            )
            .filter(user::Column::Id.eq(id));

        if let Some(first_name) = changes.first_name {
            update = update.col_expr(user::Column::FirstName, Expr::value(first_name));
        }
        if let Some(last_name) = changes.last_name {
            update = update.col_expr(user::Column::LastName, Expr::value(last_name));
        }
        if let Some(email) = changes.email {
            update = update.col_expr(user::Column::Email, Expr::value(email));
        }
        if let Some(password_hash) = changes.password_hash {
            update = update.col_expr(user::Column::PasswordHash, Expr::value(password_hash));
        }

        let result = update.exec(self.conn()).await.map_err(map_db_err)?;
        if result.rows_affected == 0 {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }

    async fn record_login(&self, id: Uuid, at: DateTime<Utc>) -> Result<(), RepoError> {
        UserEntity::update_many()
            .col_expr(user::Column::LastLogin, Expr::value(Some(at.fixed_offset())))
            .filter(user::Column::Id.eq(id))
            .exec(self.conn())
            .await
            .map_err(map_db_err)?;
        Ok(())
    }

    async fn set_photo_url(
        &self,
        id: Uuid,
        url: &str,
        at: DateTime<Utc>,
    ) -> Result<(), RepoError> {
        let result = UserEntity::update_many()
            .col_expr(user::Column::PhotoUrl, Expr::value(Some(url.to_string())))
            .col_expr(user::Column::UpdatedAt, Expr::value(at.fixed_offset()))
            .filter(user::Column::Id.eq(id))
            .exec(self.conn())
            .await
            .map_err(map_db_err)?;

        if result.rows_affected == 0 {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }
}

impl PostgresPostRepository {
    /// Like sets for the given posts, each in like order.
    async fn liked_by_for(&self, post_ids: &[Uuid]) -> Result<HashMap<Uuid, Vec<Uuid>>, RepoError> {
        let mut liked_by: HashMap<Uuid, Vec<Uuid>> = HashMap::new();
        if post_ids.is_empty() {
            return Ok(liked_by);
        }

        let likes = PostLikeEntity::find()
            .filter(post_like::Column::PostId.is_in(post_ids.iter().copied()))
            .order_by_asc(post_like::Column::CreatedAt)
            .all(self.conn())
            .await
            .map_err(map_db_err)?;

        for like in likes {
            liked_by.entry(like.post_id).or_default().push(like.user_id);
        }
        Ok(liked_by)
    }
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn insert(&self, post: Post) -> Result<Post, RepoError> {
        let model = self.insert_model(post::ActiveModel::from(post)).await?;
        Ok(model.into_domain(Vec::new()))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, RepoError> {
        let Some(model) = self.find_model(id).await? else {
            return Ok(None);
        };
        let liked_by = self
            .liked_by_for(&[id])
            .await?
            .remove(&id)
            .unwrap_or_default();
        Ok(Some(model.into_domain(liked_by)))
    }

    async fn list_with_authors(&self, sort: PostSort) -> Result<Vec<PostWithAuthor>, RepoError> {
        let query = PostEntity::find().find_also_related(UserEntity);
        let query = match sort {
            PostSort::New => query.order_by_desc(post::Column::CreatedAt),
            PostSort::Old => query.order_by_asc(post::Column::CreatedAt),
            PostSort::Likes => query
                .order_by_desc(post::Column::Likes)
                .order_by_desc(post::Column::CreatedAt),
        };

        let rows = query.all(self.conn()).await.map_err(map_db_err)?;

        // Posts without an author are dropped, as with an inner join.
        let rows: Vec<(post::Model, user::Model)> = rows
            .into_iter()
            .filter_map(|(post, author)| author.map(|author| (post, author)))
            .collect();

        let ids: Vec<Uuid> = rows.iter().map(|(post, _)| post.id).collect();
        let mut liked_by = self.liked_by_for(&ids).await?;

        Ok(rows
            .into_iter()
            .map(|(post, author)| {
                let likes = liked_by.remove(&post.id).unwrap_or_default();
                PostWithAuthor {
                    post: post.into_domain(likes),
                    author: PostAuthor {
                        first_name: author.first_name,
                        last_name: author.last_name,
                    },
                }
            })
            .collect())
    }

    async fn toggle_like(
        &self,
        post_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<LikeToggle>, RepoError> {
        let txn = self.conn().begin().await.map_err(map_db_err)?;

        // Row lock serializes concurrent toggles on this post.
        let locked = PostEntity::find_by_id(post_id)
            .lock_exclusive()
            .one(&txn)
            .await
            .map_err(map_db_err)?;
        if locked.is_none() {
            txn.rollback().await.map_err(map_db_err)?;
            return Ok(None);
        }

        let now = Utc::now();
        let existing = PostLikeEntity::find_by_id((post_id, user_id))
            .one(&txn)
            .await
            .map_err(map_db_err)?;

        let action = if existing.is_some() {
            PostLikeEntity::delete_by_id((post_id, user_id))
                .exec(&txn)
                .await
                .map_err(map_db_err)?;
            LikeAction::Unliked
        } else {
            post_like::ActiveModel {
                post_id: Set(post_id),
                user_id: Set(user_id),
                created_at: Set(now.fixed_offset()),
            }
            .insert(&txn)
            .await
            .map_err(map_db_err)?;
            LikeAction::Liked
        };

        let likes = PostLikeEntity::find()
            .filter(post_like::Column::PostId.eq(post_id))
            .count(&txn)
            .await
            .map_err(map_db_err)? as i64;

        PostEntity::update_many()
            .col_expr(post::Column::Likes, Expr::value(likes))
            .col_expr(post::Column::UpdatedAt, Expr::value(now.fixed_offset()))
            .filter(post::Column::Id.eq(post_id))
            .exec(&txn)
            .await
            .map_err(map_db_err)?;

        txn.commit().await.map_err(map_db_err)?;

        Ok(Some(LikeToggle { action, likes }))
    }
}
