// Repository pattern - isolates all database side effects
pub mod communities;
pub mod posts;
pub mod users;
pub mod votes;

use rusqlite::ffi;
use thiserror::Error;

pub use communities::{CommunityRepository, SqliteCommunityRepository};
pub use posts::{PostRepository, SqlitePostRepository};
pub use users::{SqliteUserRepository, UserRepository};
pub use votes::{SqliteVoteRepository, VoteRepository};

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("Database error: {0}")]
    Pool(#[from] r2d2::Error),

    #[error("SQL error: {0}")]
    Sql(rusqlite::Error),

    #[error("{0}")]
    UniqueViolation(String),

    #[error("{0}")]
    ForeignKeyViolation(String),
}

impl From<rusqlite::Error> for RepositoryError {
    fn from(err: rusqlite::Error) -> Self {
        let constraint = match &err {
            rusqlite::Error::SqliteFailure(e, msg)
                if e.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                Some((
                    e.extended_code,
                    msg.clone().unwrap_or_else(|| e.to_string()),
                ))
            }
            _ => None,
        };

        match constraint {
            Some((ffi::SQLITE_CONSTRAINT_UNIQUE | ffi::SQLITE_CONSTRAINT_PRIMARYKEY, detail)) => {
                RepositoryError::UniqueViolation(detail)
            }
            Some((ffi::SQLITE_CONSTRAINT_FOREIGNKEY, detail)) => {
                RepositoryError::ForeignKeyViolation(detail)
            }
            _ => RepositoryError::Sql(err),
        }
    }
}

/// Fresh row id. v7 ids sort by creation time.
pub(crate) fn new_id() -> String {
    uuid::Uuid::now_v7().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_pool;

    #[test]
    fn unique_failures_are_classified() {
        let pool = test_pool();
        let conn = pool.get().unwrap();
        conn.execute(
            "INSERT INTO users (id, username, password_hash) VALUES ('u1', 'alice', 'x')",
            [],
        )
        .unwrap();
        let err = conn
            .execute(
                "INSERT INTO users (id, username, password_hash) VALUES ('u2', 'alice', 'x')",
                [],
            )
            .unwrap_err();

        assert!(matches!(
            RepositoryError::from(err),
            RepositoryError::UniqueViolation(_)
        ));
    }

    #[test]
    fn foreign_key_failures_are_classified() {
        let pool = test_pool();
        let conn = pool.get().unwrap();
        let err = conn
            .execute(
                "INSERT INTO posts (id, title, text, subreddit_id) VALUES ('p1', 't', 'x', 'nope')",
                [],
            )
            .unwrap_err();

        assert!(matches!(
            RepositoryError::from(err),
            RepositoryError::ForeignKeyViolation(_)
        ));
    }

    #[test]
    fn other_failures_stay_sql_errors() {
        let pool = test_pool();
        let conn = pool.get().unwrap();
        let err = conn.execute("SELECT * FROM no_such_table", []).unwrap_err();
        assert!(matches!(RepositoryError::from(err), RepositoryError::Sql(_)));
    }
}
