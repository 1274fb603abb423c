use std::sync::Arc;

use crate::auth::Identity;
use crate::db::models::Community;
use crate::error::{AppError, AppResult};
use crate::repository::{CommunityRepository, RepositoryError};

pub struct CommunityService {
    communities: Arc<dyn CommunityRepository>,
}

impl CommunityService {
    pub fn new(communities: Arc<dyn CommunityRepository>) -> Self {
        Self { communities }
    }

    pub async fn list(&self) -> AppResult<Vec<Community>> {
        Ok(self.communities.list().await?)
    }

    /// Owner is the caller, or nobody for anonymous submissions.
    pub async fn create(&self, name: Option<&str>, caller: &Identity) -> AppResult<Community> {
        let Some(name) = name.filter(|n| !n.is_empty()) else {
            return Err(AppError::Validation("Name is required".into()));
        };

        match self.communities.create(name, caller.user_id()).await {
            Ok(community) => {
                tracing::debug!(community_id = %community.id, "Created subreddit {}", name);
                Ok(community)
            }
            Err(RepositoryError::UniqueViolation(_)) => Err(AppError::Conflict(
                "Subreddit name already exists".into(),
            )),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn delete(&self, community_id: &str) -> AppResult<Community> {
        let not_found = || AppError::NotFound("Subreddit does not exist".into());

        let community = self
            .communities
            .find(community_id)
            .await?
            .ok_or_else(not_found)?;

        if !self.communities.delete(community_id).await? {
            return Err(not_found());
        }
        Ok(community)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_pool;
    use crate::repository::{SqliteCommunityRepository, SqliteUserRepository, UserRepository};

    #[tokio::test]
    async fn create_attributes_owner() {
        let pool = test_pool();
        let user = SqliteUserRepository::new(pool.clone())
            .create("alice", "hash")
            .await
            .unwrap();
        let service = CommunityService::new(Arc::new(SqliteCommunityRepository::new(pool)));

        let owned = service
            .create(Some("rust"), &Identity::Resolved(user.profile()))
            .await
            .unwrap();
        assert_eq!(owned.user_id.as_deref(), Some(user.id.as_str()));

        let orphan = service
            .create(Some("golang"), &Identity::Anonymous)
            .await
            .unwrap();
        assert!(orphan.user_id.is_none());
        assert_eq!(service.list().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn empty_name_and_duplicates_are_rejected() {
        let service = CommunityService::new(Arc::new(SqliteCommunityRepository::new(test_pool())));
        let anon = Identity::Anonymous;

        assert!(matches!(
            service.create(None, &anon).await,
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            service.create(Some(""), &anon).await,
            Err(AppError::Validation(_))
        ));

        service.create(Some("rust"), &anon).await.unwrap();
        assert!(matches!(
            service.create(Some("rust"), &anon).await,
            Err(AppError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn delete_unknown_is_not_found() {
        let service = CommunityService::new(Arc::new(SqliteCommunityRepository::new(test_pool())));
        let err = service.delete("missing").await.unwrap_err();
        assert_eq!(err.to_string(), "Subreddit does not exist");

        let community = service
            .create(Some("rust"), &Identity::Anonymous)
            .await
            .unwrap();
        let deleted = service.delete(&community.id).await.unwrap();
        assert_eq!(deleted, community);
    }
}
