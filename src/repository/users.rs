use std::collections::HashMap;

use async_trait::async_trait;
use rusqlite::{params, params_from_iter, OptionalExtension, Row};

use super::{new_id, RepositoryError};
use crate::db::models::{User, UserProfile};
use crate::state::DbPool;

/// Ids bound per `IN (...)` lookup, below SQLite's historical limit of 999
/// host parameters.
const PROFILE_BATCH: usize = 500;

/// Identity store: user records keyed by id and by unique username.
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create(&self, username: &str, password_hash: &str) -> Result<User, RepositoryError>;

    async fn find_by_id(&self, id: &str) -> Result<Option<User>, RepositoryError>;

    /// Exact, case-sensitive match.
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepositoryError>;

    /// Profiles for the given ids. Unknown ids are left out of the map.
    async fn profiles(&self, ids: &[String])
        -> Result<HashMap<String, UserProfile>, RepositoryError>;
}

pub struct SqliteUserRepository {
    pool: DbPool,
}

impl SqliteUserRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        username: row.get(1)?,
        password_hash: row.get(2)?,
        created_at: row.get(3)?,
    })
}

#[async_trait]
impl UserRepository for SqliteUserRepository {
    async fn create(&self, username: &str, password_hash: &str) -> Result<User, RepositoryError> {
        let conn = self.pool.get()?;
        let id = new_id();

        conn.execute(
            "INSERT INTO users (id, username, password_hash) VALUES (?1, ?2, ?3)",
            params![id, username, password_hash],
        )?;

        let user = conn.query_row(
            "SELECT id, username, password_hash, created_at FROM users WHERE id = ?1",
            params![id],
            user_from_row,
        )?;
        Ok(user)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<User>, RepositoryError> {
        let conn = self.pool.get()?;
        let user = conn
            .query_row(
                "SELECT id, username, password_hash, created_at FROM users WHERE id = ?1",
                params![id],
                user_from_row,
            )
            .optional()?;
        Ok(user)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepositoryError> {
        let conn = self.pool.get()?;
        let user = conn
            .query_row(
                "SELECT id, username, password_hash, created_at FROM users WHERE username = ?1",
                params![username],
                user_from_row,
            )
            .optional()?;
        Ok(user)
    }

    async fn profiles(
        &self,
        ids: &[String],
    ) -> Result<HashMap<String, UserProfile>, RepositoryError> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let conn = self.pool.get()?;
        let mut profiles = HashMap::with_capacity(ids.len());

        for batch in ids.chunks(PROFILE_BATCH) {
            let placeholders = vec!["?"; batch.len()].join(", ");
            let sql = format!(
                "SELECT id, username, created_at FROM users WHERE id IN ({})",
                placeholders
            );

            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt.query_map(params_from_iter(batch.iter()), |row| {
                Ok(UserProfile {
                    id: row.get(0)?,
                    username: row.get(1)?,
                    created_at: row.get(2)?,
                })
            })?;
            for profile in rows {
                let profile = profile?;
                profiles.insert(profile.id.clone(), profile);
            }
        }

        Ok(profiles)
    }
}
