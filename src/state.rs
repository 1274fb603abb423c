use std::sync::Arc;

use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;

use crate::auth::{CredentialService, TokenSigner};
use crate::config::Config;
use crate::forum::{CommunityService, PostService, VoteLedger};
use crate::repository::{
    CommunityRepository, PostRepository, SqliteCommunityRepository, SqlitePostRepository,
    SqliteUserRepository, SqliteVoteRepository, UserRepository, VoteRepository,
};

pub type DbPool = Pool<SqliteConnectionManager>;

#[derive(Clone)]
pub struct AppState {
    pub credentials: Arc<CredentialService>,
    pub posts: Arc<PostService>,
    pub communities: Arc<CommunityService>,
    pub votes: Arc<VoteLedger>,
}

impl AppState {
    /// Wire every service against the SQLite repositories sharing `pool`.
    pub fn new(pool: DbPool, config: &Config) -> anyhow::Result<Self> {
        let users: Arc<dyn UserRepository> = Arc::new(SqliteUserRepository::new(pool.clone()));
        let communities: Arc<dyn CommunityRepository> =
            Arc::new(SqliteCommunityRepository::new(pool.clone()));
        let posts: Arc<dyn PostRepository> = Arc::new(SqlitePostRepository::new(pool.clone()));
        let votes: Arc<dyn VoteRepository> = Arc::new(SqliteVoteRepository::new(pool));

        let signer = TokenSigner::new(config.jwt_secret()?, config.auth.token_hours);

        Ok(Self {
            credentials: Arc::new(CredentialService::new(
                users.clone(),
                signer,
                config.auth.bcrypt_cost,
            )),
            posts: Arc::new(PostService::new(
                posts,
                users,
                communities.clone(),
                votes.clone(),
                config.policy.enforce_post_ownership,
            )),
            communities: Arc::new(CommunityService::new(communities)),
            votes: Arc::new(VoteLedger::new(votes)),
        })
    }
}
