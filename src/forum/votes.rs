use std::sync::Arc;

use crate::auth::Identity;
use crate::db::models::{Vote, VoteKind};
use crate::error::{AppError, AppResult};
use crate::repository::{RepositoryError, VoteRepository};

/// Outcome of withdrawing a vote. A missing vote is not an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Removal {
    Removed(Vote),
    Missing,
}

pub struct VoteLedger {
    votes: Arc<dyn VoteRepository>,
}

impl VoteLedger {
    pub fn new(votes: Arc<dyn VoteRepository>) -> Self {
        Self { votes }
    }

    pub async fn cast(&self, kind: VoteKind, post_id: &str, caller: &Identity) -> AppResult<Vote> {
        let user = caller.require()?;

        if self.votes.find(kind, &user.id, post_id).await?.is_some() {
            tracing::debug!(user_id = %user.id, post_id, "{} already recorded", kind);
        }

        match self.votes.create(kind, &user.id, post_id).await {
            Ok(vote) => Ok(vote),
            Err(RepositoryError::UniqueViolation(_)) => Err(AppError::DuplicateVote(kind)),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn remove(
        &self,
        kind: VoteKind,
        post_id: &str,
        caller: &Identity,
    ) -> AppResult<Removal> {
        let user = caller.require()?;

        let Some(vote) = self.votes.find(kind, &user.id, post_id).await? else {
            return Ok(Removal::Missing);
        };

        // Lost a race with a concurrent removal
        if !self.votes.delete(kind, &vote.id).await? {
            return Ok(Removal::Missing);
        }
        Ok(Removal::Removed(vote))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_pool;
    use crate::repository::{SqliteUserRepository, SqliteVoteRepository, UserRepository};
    use crate::state::DbPool;

    async fn setup() -> (DbPool, VoteLedger, Identity) {
        let pool = test_pool();
        let user = SqliteUserRepository::new(pool.clone())
            .create("alice", "hash")
            .await
            .unwrap();
        pool.get()
            .unwrap()
            .execute(
                "INSERT INTO posts (id, title, text) VALUES ('p1', 't', 'x')",
                [],
            )
            .unwrap();
        let ledger = VoteLedger::new(Arc::new(SqliteVoteRepository::new(pool.clone())));
        (pool, ledger, Identity::Resolved(user.profile()))
    }

    #[tokio::test]
    async fn anonymous_callers_cannot_vote() {
        let (_pool, ledger, _alice) = setup().await;
        assert!(matches!(
            ledger.cast(VoteKind::Up, "p1", &Identity::Anonymous).await,
            Err(AppError::Unauthenticated)
        ));
        assert!(matches!(
            ledger.remove(VoteKind::Up, "p1", &Identity::Anonymous).await,
            Err(AppError::Unauthenticated)
        ));
    }

    #[tokio::test]
    async fn second_upvote_is_a_duplicate() {
        let (_pool, ledger, alice) = setup().await;
        let vote = ledger.cast(VoteKind::Up, "p1", &alice).await.unwrap();
        assert_eq!(vote.post_id, "p1");

        assert!(matches!(
            ledger.cast(VoteKind::Up, "p1", &alice).await,
            Err(AppError::DuplicateVote(VoteKind::Up))
        ));
    }

    #[tokio::test]
    async fn up_and_down_may_coexist() {
        let (_pool, ledger, alice) = setup().await;
        ledger.cast(VoteKind::Up, "p1", &alice).await.unwrap();
        ledger.cast(VoteKind::Down, "p1", &alice).await.unwrap();
    }

    #[tokio::test]
    async fn removing_reports_missing_votes() {
        let (_pool, ledger, alice) = setup().await;
        assert_eq!(
            ledger.remove(VoteKind::Down, "p1", &alice).await.unwrap(),
            Removal::Missing
        );

        let vote = ledger.cast(VoteKind::Down, "p1", &alice).await.unwrap();
        assert_eq!(
            ledger.remove(VoteKind::Down, "p1", &alice).await.unwrap(),
            Removal::Removed(vote)
        );
    }
}
