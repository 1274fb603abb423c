use async_trait::async_trait;
use rusqlite::{params, OptionalExtension, Row};

use super::{new_id, RepositoryError};
use crate::db::models::{Vote, VoteKind};
use crate::state::DbPool;

/// The two vote ledgers. Each table carries UNIQUE(user_id, post_id), which
/// is what actually prevents duplicate votes under concurrent submission.
#[async_trait]
pub trait VoteRepository: Send + Sync {
    async fn find(
        &self,
        kind: VoteKind,
        user_id: &str,
        post_id: &str,
    ) -> Result<Option<Vote>, RepositoryError>;

    async fn create(
        &self,
        kind: VoteKind,
        user_id: &str,
        post_id: &str,
    ) -> Result<Vote, RepositoryError>;

    async fn delete(&self, kind: VoteKind, id: &str) -> Result<bool, RepositoryError>;

    /// Every vote of one direction, in insertion order
    async fn list(&self, kind: VoteKind) -> Result<Vec<Vote>, RepositoryError>;
}

pub struct SqliteVoteRepository {
    pool: DbPool,
}

impl SqliteVoteRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn vote_from_row(row: &Row<'_>) -> rusqlite::Result<Vote> {
    Ok(Vote {
        id: row.get(0)?,
        user_id: row.get(1)?,
        post_id: row.get(2)?,
        created_at: row.get(3)?,
    })
}

#[async_trait]
impl VoteRepository for SqliteVoteRepository {
    async fn find(
        &self,
        kind: VoteKind,
        user_id: &str,
        post_id: &str,
    ) -> Result<Option<Vote>, RepositoryError> {
        let conn = self.pool.get()?;
        let vote = conn
            .query_row(
                &format!(
                    "SELECT id, user_id, post_id, created_at FROM {}
                     WHERE user_id = ?1 AND post_id = ?2",
                    kind.table()
                ),
                params![user_id, post_id],
                vote_from_row,
            )
            .optional()?;
        Ok(vote)
    }

    async fn create(
        &self,
        kind: VoteKind,
        user_id: &str,
        post_id: &str,
    ) -> Result<Vote, RepositoryError> {
        let conn = self.pool.get()?;
        let id = new_id();

        conn.execute(
            &format!(
                "INSERT INTO {} (id, user_id, post_id) VALUES (?1, ?2, ?3)",
                kind.table()
            ),
            params![id, user_id, post_id],
        )?;

        let vote = conn.query_row(
            &format!(
                "SELECT id, user_id, post_id, created_at FROM {} WHERE id = ?1",
                kind.table()
            ),
            params![id],
            vote_from_row,
        )?;
        Ok(vote)
    }

    async fn delete(&self, kind: VoteKind, id: &str) -> Result<bool, RepositoryError> {
        let conn = self.pool.get()?;
        let rows = conn.execute(
            &format!("DELETE FROM {} WHERE id = ?1", kind.table()),
            params![id],
        )?;
        Ok(rows > 0)
    }

    async fn list(&self, kind: VoteKind) -> Result<Vec<Vote>, RepositoryError> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT id, user_id, post_id, created_at FROM {} ORDER BY rowid",
            kind.table()
        ))?;
        let votes = stmt
            .query_map([], vote_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(votes)
    }
}
