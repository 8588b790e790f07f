use std::marker::PhantomData;
use std::sync::Arc;

use sea_orm::{DbConn, DbErr, EntityTrait, SqlErr};

use quill_core::error::RepoError;

/// PostgreSQL repository over a single SeaORM entity.
///
/// The pool handle is shared through an `Arc`; `DbConn` itself is not `Clone`
/// when SeaORM's mock driver is compiled in.
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
    pub fn new(db: Arc<DbConn>) -> Self {
        Self {
            db,
            _entity: PhantomData,
        }
    }

    pub(crate) fn conn(&self) -> &DbConn {
        &self.db
    }
}

/// Classify a SeaORM error at the repository boundary.
pub(crate) fn map_db_err(err: DbErr) -> RepoError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(detail)) => return RepoError::Constraint(detail),
        Some(SqlErr::ForeignKeyConstraintViolation(detail)) => {
            return RepoError::ForeignKey(detail);
        }
        _ => {}
    }

    match &err {
        DbErr::RecordNotFound(_) | DbErr::RecordNotUpdated => RepoError::NotFound,
        DbErr::Conn(_) | DbErr::ConnectionAcquire(_) => RepoError::Connection(err.to_string()),
        _ => RepoError::Query(err.to_string()),
    }
}
