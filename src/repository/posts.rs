use async_trait::async_trait;
use rusqlite::{params, OptionalExtension, Row};

use super::{new_id, RepositoryError};
use crate::db::models::{NewPost, Post};
use crate::state::DbPool;

/// Post tree storage. Parent links are plain foreign keys, so a post can
/// only ever point at a row that already existed when it was inserted.
#[async_trait]
pub trait PostRepository: Send + Sync {
    async fn create(&self, post: NewPost) -> Result<Post, RepositoryError>;

    async fn find(&self, id: &str) -> Result<Option<Post>, RepositoryError>;

    /// Every post, in insertion order
    async fn list(&self) -> Result<Vec<Post>, RepositoryError>;

    /// Overwrites only the fields that are `Some`. Returns `None` for an
    /// unknown id.
    async fn update(
        &self,
        id: &str,
        title: Option<&str>,
        text: Option<&str>,
    ) -> Result<Option<Post>, RepositoryError>;

    /// Deletes the row and hands it back, or `None` if it did not exist
    async fn delete(&self, id: &str) -> Result<Option<Post>, RepositoryError>;
}

pub struct SqlitePostRepository {
    pool: DbPool,
}

impl SqlitePostRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

const POST_COLUMNS: &str =
    "id, title, text, user_id, subreddit_id, parent_id, created_at, updated_at";

fn post_from_row(row: &Row<'_>) -> rusqlite::Result<Post> {
    Ok(Post {
        id: row.get(0)?,
        title: row.get(1)?,
        text: row.get(2)?,
        user_id: row.get(3)?,
        subreddit_id: row.get(4)?,
        parent_id: row.get(5)?,
        created_at: row.get(6)?,
        updated_at: row.get(7)?,
    })
}

fn select_post(conn: &rusqlite::Connection, id: &str) -> rusqlite::Result<Option<Post>> {
    conn.query_row(
        &format!("SELECT {} FROM posts WHERE id = ?1", POST_COLUMNS),
        params![id],
        post_from_row,
    )
    .optional()
}

#[async_trait]
impl PostRepository for SqlitePostRepository {
    async fn create(&self, post: NewPost) -> Result<Post, RepositoryError> {
        let conn = self.pool.get()?;
        let id = new_id();

        conn.execute(
            "INSERT INTO posts (id, title, text, user_id, subreddit_id, parent_id)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                id,
                post.title,
                post.text,
                post.user_id,
                post.subreddit_id,
                post.parent_id
            ],
        )?;

        select_post(&conn, &id)?.ok_or(RepositoryError::Sql(rusqlite::Error::QueryReturnedNoRows))
    }

    async fn find(&self, id: &str) -> Result<Option<Post>, RepositoryError> {
        let conn = self.pool.get()?;
        Ok(select_post(&conn, id)?)
    }

    async fn list(&self) -> Result<Vec<Post>, RepositoryError> {
        let conn = self.pool.get()?;
        let mut stmt =
            conn.prepare(&format!("SELECT {} FROM posts ORDER BY rowid", POST_COLUMNS))?;
        let posts = stmt
            .query_map([], post_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(posts)
    }

    async fn update(
        &self,
        id: &str,
        title: Option<&str>,
        text: Option<&str>,
    ) -> Result<Option<Post>, RepositoryError> {
        let conn = self.pool.get()?;

        let rows = conn.execute(
            "UPDATE posts
             SET title = COALESCE(?2, title),
                 text = COALESCE(?3, text),
                 updated_at = datetime('now')
             WHERE id = ?1",
            params![id, title, text],
        )?;

        if rows == 0 {
            return Ok(None);
        }
        Ok(select_post(&conn, id)?)
    }

    async fn delete(&self, id: &str) -> Result<Option<Post>, RepositoryError> {
        let mut conn = self.pool.get()?;
        let tx = conn.transaction()?;

        let Some(post) = select_post(&tx, id)? else {
            return Ok(None);
        };
        tx.execute("DELETE FROM posts WHERE id = ?1", params![id])?;
        tx.commit()?;

        Ok(Some(post))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_pool;

    fn new_post(title: &str, parent_id: Option<&str>) -> NewPost {
        NewPost {
            title: title.to_string(),
            text: "body".to_string(),
            parent_id: parent_id.map(str::to_string),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn replies_reference_their_parent() {
        let repo = SqlitePostRepository::new(test_pool());
        let root = repo.create(new_post("root", None)).await.unwrap();
        let reply = repo.create(new_post("reply", Some(&root.id))).await.unwrap();

        assert_eq!(reply.parent_id.as_deref(), Some(root.id.as_str()));
        let titles: Vec<String> = repo
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.title)
            .collect();
        assert_eq!(titles, vec!["root", "reply"]);
    }

    #[tokio::test]
    async fn reply_to_missing_parent_is_rejected() {
        let repo = SqlitePostRepository::new(test_pool());
        let err = repo
            .create(new_post("orphan", Some("missing")))
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::ForeignKeyViolation(_)));
    }

    #[tokio::test]
    async fn update_only_touches_supplied_fields() {
        let repo = SqlitePostRepository::new(test_pool());
        let post = repo.create(new_post("before", None)).await.unwrap();

        let updated = repo
            .update(&post.id, Some("after"), None)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.title, "after");
        assert_eq!(updated.text, "body");

        assert!(repo.update("missing", Some("x"), None).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn delete_returns_the_removed_row() {
        let repo = SqlitePostRepository::new(test_pool());
        let post = repo.create(new_post("doomed", None)).await.unwrap();

        let deleted = repo.delete(&post.id).await.unwrap().unwrap();
        assert_eq!(deleted, post);
        assert!(repo.find(&post.id).await.unwrap().is_none());
        assert!(repo.delete(&post.id).await.unwrap().is_none());
    }
}
