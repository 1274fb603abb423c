use async_trait::async_trait;
use rusqlite::{params, OptionalExtension, Row};

use super::{new_id, RepositoryError};
use crate::db::models::Community;
use crate::state::DbPool;

#[async_trait]
pub trait CommunityRepository: Send + Sync {
    /// All communities in insertion order
    async fn list(&self) -> Result<Vec<Community>, RepositoryError>;

    async fn find(&self, id: &str) -> Result<Option<Community>, RepositoryError>;

    async fn create(&self, name: &str, owner_id: Option<&str>)
        -> Result<Community, RepositoryError>;

    /// Returns false when no row matched
    async fn delete(&self, id: &str) -> Result<bool, RepositoryError>;
}

pub struct SqliteCommunityRepository {
    pool: DbPool,
}

impl SqliteCommunityRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

const COMMUNITY_COLUMNS: &str = "id, name, user_id, created_at";

fn community_from_row(row: &Row<'_>) -> rusqlite::Result<Community> {
    Ok(Community {
        id: row.get(0)?,
        name: row.get(1)?,
        user_id: row.get(2)?,
        created_at: row.get(3)?,
    })
}

#[async_trait]
impl CommunityRepository for SqliteCommunityRepository {
    async fn list(&self) -> Result<Vec<Community>, RepositoryError> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM subreddits ORDER BY rowid",
            COMMUNITY_COLUMNS
        ))?;
        let communities = stmt
            .query_map([], community_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(communities)
    }

    async fn find(&self, id: &str) -> Result<Option<Community>, RepositoryError> {
        let conn = self.pool.get()?;
        let community = conn
            .query_row(
                &format!("SELECT {} FROM subreddits WHERE id = ?1", COMMUNITY_COLUMNS),
                params![id],
                community_from_row,
            )
            .optional()?;
        Ok(community)
    }

    async fn create(
        &self,
        name: &str,
        owner_id: Option<&str>,
    ) -> Result<Community, RepositoryError> {
        let conn = self.pool.get()?;
        let id = new_id();

        conn.execute(
            "INSERT INTO subreddits (id, name, user_id) VALUES (?1, ?2, ?3)",
            params![id, name, owner_id],
        )?;

        let community = conn.query_row(
            &format!("SELECT {} FROM subreddits WHERE id = ?1", COMMUNITY_COLUMNS),
            params![id],
            community_from_row,
        )?;
        Ok(community)
    }

    async fn delete(&self, id: &str) -> Result<bool, RepositoryError> {
        let conn = self.pool.get()?;
        let rows = conn.execute("DELETE FROM subreddits WHERE id = ?1", params![id])?;
        Ok(rows > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_pool;

    #[tokio::test]
    async fn create_list_delete() {
        let repo = SqliteCommunityRepository::new(test_pool());
        let rust = repo.create("rust", None).await.unwrap();
        repo.create("golang", None).await.unwrap();

        let names: Vec<String> = repo
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, vec!["rust", "golang"]);

        assert!(repo.delete(&rust.id).await.unwrap());
        assert!(!repo.delete(&rust.id).await.unwrap());
        assert!(repo.find(&rust.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn unknown_owner_is_rejected() {
        let repo = SqliteCommunityRepository::new(test_pool());
        let err = repo.create("rust", Some("ghost")).await.unwrap_err();
        assert!(matches!(err, RepositoryError::ForeignKeyViolation(_)));
    }

    #[tokio::test]
    async fn names_are_unique() {
        let repo = SqliteCommunityRepository::new(test_pool());
        repo.create("rust", None).await.unwrap();
        let err = repo.create("rust", None).await.unwrap_err();
        assert!(matches!(err, RepositoryError::UniqueViolation(_)));
    }
}
