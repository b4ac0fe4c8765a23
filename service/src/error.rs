use sea_orm::{DbErr, RuntimeErr};
use thiserror::Error;

use crate::auth::Role;

/// An error from a recipe or ingredient operation
#[derive(Error, Debug)]
pub enum ServiceError {
    /// The referenced record does not exist
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i32 },
    /// The caller's role may not perform the action
    #[error("role `{}` may not {action}", role.as_str())]
    Forbidden { role: Role, action: &'static str },
    /// The input was rejected before anything was written
    #[error("invalid input: {0}")]
    Validation(String),
    /// The write lost against another writer, or would break a reference
    #[error("conflict: {0}")]
    Conflict(String),
    /// The database failed; any open transaction was rolled back
    #[error(transparent)]
    Db(DbErr),
}

/// Lock or serialization failures come back as [`ServiceError::Conflict`]: the caller
/// lost a race against another writer and may retry.
impl From<DbErr> for ServiceError {
    fn from(err: DbErr) -> Self {
        if is_write_contention(&err) {
            Self::Conflict(format!("another writer holds the record, retry ({err})"))
        } else {
            Self::Db(err)
        }
    }
}

// SQLite BUSY / LOCKED and their extended codes; Postgres serialization_failure and
// deadlock_detected.
const CONTENTION_CODES: &[&str] = &[
    "5", "261", "517", "773", "6", "262", "518", "40001", "40P01",
];

fn is_write_contention(err: &DbErr) -> bool {
    let (DbErr::Exec(RuntimeErr::SqlxError(err)) | DbErr::Query(RuntimeErr::SqlxError(err))) =
        err
    else {
        return false;
    };
    err.as_database_error()
        .and_then(|db_err| db_err.code())
        .is_some_and(|code| CONTENTION_CODES.contains(&&*code))
}

impl ServiceError {
    pub(crate) fn recipe_not_found(id: i32) -> Self {
        Self::NotFound {
            entity: "recipe",
            id,
        }
    }

    pub(crate) fn ingredient_not_found(id: i32) -> Self {
        Self::NotFound {
            entity: "ingredient",
            id,
        }
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;
