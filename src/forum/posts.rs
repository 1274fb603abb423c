use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use serde::Serialize;

use crate::auth::Identity;
use crate::db::models::{Community, NewPost, Post, UserProfile, Vote, VoteKind};
use crate::error::{AppError, AppResult};
use crate::forum::tree::{ChildIndex, PostNode};
use crate::repository::{CommunityRepository, PostRepository, UserRepository, VoteRepository};

const POST_NOT_FOUND: &str = "Post does not exist";

/// A listed post with its author, community, both vote ledgers and two
/// levels of replies.
#[derive(Debug, Clone, Serialize)]
pub struct PostDetail {
    #[serde(flatten)]
    pub post: Post,
    pub user: Option<UserProfile>,
    pub subreddit: Option<Community>,
    pub upvotes: Vec<Vote>,
    pub downvotes: Vec<Vote>,
    pub children: Vec<PostNode>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum PostListing {
    Flat(Vec<Post>),
    Tree(Vec<PostDetail>),
}

/// Fields accepted when submitting a post.
#[derive(Debug, Clone, Default)]
pub struct PostDraft {
    pub title: Option<String>,
    pub text: Option<String>,
    pub subreddit_id: Option<String>,
    pub parent_id: Option<String>,
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

pub struct PostService {
    posts: Arc<dyn PostRepository>,
    users: Arc<dyn UserRepository>,
    communities: Arc<dyn CommunityRepository>,
    votes: Arc<dyn VoteRepository>,
    enforce_ownership: bool,
}

impl PostService {
    pub fn new(
        posts: Arc<dyn PostRepository>,
        users: Arc<dyn UserRepository>,
        communities: Arc<dyn CommunityRepository>,
        votes: Arc<dyn VoteRepository>,
        enforce_ownership: bool,
    ) -> Self {
        Self {
            posts,
            users,
            communities,
            votes,
            enforce_ownership,
        }
    }

    pub async fn create(&self, draft: PostDraft, caller: &Identity) -> AppResult<Post> {
        let (Some(title), Some(text)) = (
            non_empty(draft.title.as_deref()),
            non_empty(draft.text.as_deref()),
        ) else {
            return Err(AppError::Validation("Title and Text are required".into()));
        };

        let post = self
            .posts
            .create(NewPost {
                title: title.to_string(),
                text: text.to_string(),
                user_id: caller.user_id().map(str::to_string),
                subreddit_id: non_empty(draft.subreddit_id.as_deref()).map(str::to_string),
                parent_id: non_empty(draft.parent_id.as_deref()).map(str::to_string),
            })
            .await?;

        tracing::debug!(post_id = %post.id, parent_id = ?post.parent_id, "Created post");
        Ok(post)
    }

    pub async fn list_all(&self, include_tree: bool) -> AppResult<PostListing> {
        let posts = self.posts.list().await?;
        if !include_tree {
            return Ok(PostListing::Flat(posts));
        }

        let author_ids: Vec<String> = posts
            .iter()
            .filter_map(|p| p.user_id.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let authors = self.users.profiles(&author_ids).await?;

        let communities: HashMap<String, Community> = self
            .communities
            .list()
            .await?
            .into_iter()
            .map(|c| (c.id.clone(), c))
            .collect();

        let mut upvotes = group_by_post(self.votes.list(VoteKind::Up).await?);
        let mut downvotes = group_by_post(self.votes.list(VoteKind::Down).await?);

        let index = ChildIndex::new(&posts);
        let details = posts
            .iter()
            .map(|post| PostDetail {
                post: post.clone(),
                user: post
                    .user_id
                    .as_ref()
                    .and_then(|id| authors.get(id).cloned()),
                subreddit: post
                    .subreddit_id
                    .as_ref()
                    .and_then(|id| communities.get(id).cloned()),
                upvotes: upvotes.remove(&post.id).unwrap_or_default(),
                downvotes: downvotes.remove(&post.id).unwrap_or_default(),
                children: index.replies(post),
            })
            .collect();

        Ok(PostListing::Tree(details))
    }

    pub async fn update(
        &self,
        post_id: &str,
        title: Option<&str>,
        text: Option<&str>,
        caller: &Identity,
    ) -> AppResult<Post> {
        let title = non_empty(title);
        let text = non_empty(text);
        if title.is_none() && text.is_none() {
            return Err(AppError::Validation("Title or Text is required".into()));
        }

        let existing = self.find_existing(post_id).await?;
        self.authorize(&existing, caller)?;

        self.posts
            .update(post_id, title, text)
            .await?
            .ok_or_else(|| AppError::NotFound(POST_NOT_FOUND.into()))
    }

    pub async fn delete(&self, post_id: &str, caller: &Identity) -> AppResult<Post> {
        let existing = self.find_existing(post_id).await?;
        self.authorize(&existing, caller)?;

        let deleted = self
            .posts
            .delete(post_id)
            .await?
            .ok_or_else(|| AppError::NotFound(POST_NOT_FOUND.into()))?;

        tracing::debug!(post_id = %deleted.id, "Deleted post");
        Ok(deleted)
    }

    async fn find_existing(&self, post_id: &str) -> AppResult<Post> {
        self.posts
            .find(post_id)
            .await?
            .ok_or_else(|| AppError::NotFound(POST_NOT_FOUND.into()))
    }

    /// With ownership enforcement off, any caller may edit any post.
    fn authorize(&self, post: &Post, caller: &Identity) -> AppResult<()> {
        if !self.enforce_ownership {
            return Ok(());
        }

        let user = caller.require()?;
        if post.user_id.as_deref() == Some(user.id.as_str()) {
            Ok(())
        } else {
            Err(AppError::Forbidden)
        }
    }
}

fn group_by_post(votes: Vec<Vote>) -> HashMap<String, Vec<Vote>> {
    let mut grouped: HashMap<String, Vec<Vote>> = HashMap::new();
    for vote in votes {
        grouped.entry(vote.post_id.clone()).or_default().push(vote);
    }
    grouped
}
