use std::marker::PhantomData;
use std::sync::Arc;

use sea_orm::{
    ActiveModelBehavior, ActiveModelTrait, DbConn, DbErr, EntityTrait, IntoActiveModel,
    PrimaryKeyTrait, SqlErr,
};

use summer_core::error::RepoError;

/// Shared state and helpers for the PostgreSQL repositories.
pub struct PostgresBaseRepository<E>
where
    E: EntityTrait,
{
    pub(crate) db: Arc<DbConn>,
    _entity: PhantomData<E>,
}

impl<E> PostgresBaseRepository<E>
where
    E: EntityTrait,
{
    pub fn new(db: impl Into<Arc<DbConn>>) -> Self {
        Self {
            db: db.into(),
            _entity: PhantomData,
        }
    }

    pub(crate) fn conn(&self) -> &DbConn {
        &self.db
    }

    pub(crate) async fn find_model<ID>(&self, id: ID) -> Result<Option<E::Model>, RepoError>
    where
        ID: Into<<E::PrimaryKey as PrimaryKeyTrait>::ValueType>,
    {
        E::find_by_id(id).one(self.conn()).await.map_err(map_db_err)
    }

    pub(crate) async fn insert_model(&self, model: E::ActiveModel) -> Result<E::Model, RepoError>
    where
        E::Model: IntoActiveModel<E::ActiveModel>,
        E::ActiveModel: ActiveModelTrait<Entity = E> + ActiveModelBehavior + Send,
    {
        model.insert(self.conn()).await.map_err(map_db_err)
    }
}

/// Translate a SeaORM error into the repository taxonomy.
///
/// Unique-index violations become `Constraint` so racing inserts surface as
/// conflicts rather than internal errors.
pub(crate) fn map_db_err(err: DbErr) -> RepoError {
    if let Some(SqlErr::UniqueConstraintViolation(detail)) = err.sql_err() {
        return RepoError::Constraint(detail);
    }

    match err {
        DbErr::RecordNotFound(_) => RepoError::NotFound,
        DbErr::ConnectionAcquire(_) | DbErr::Conn(_) => RepoError::Connection(err.to_string()),
        other => RepoError::Query(other.to_string()),
    }
}
