use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: String,
}

impl User {
    /// The user record with the password hash stripped.
    pub fn profile(&self) -> UserProfile {
        UserProfile {
            id: self.id.clone(),
            username: self.username.clone(),
            created_at: self.created_at.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: String,
    pub username: String,
    pub created_at: String,
}

/// A community ("subreddit").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Community {
    pub id: String,
    pub name: String,
    pub user_id: Option<String>,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: String,
    pub title: String,
    pub text: String,
    pub user_id: Option<String>,
    pub subreddit_id: Option<String>,
    pub parent_id: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Default)]
pub struct NewPost {
    pub title: String,
    pub text: String,
    pub user_id: Option<String>,
    pub subreddit_id: Option<String>,
    pub parent_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vote {
    pub id: String,
    pub user_id: String,
    pub post_id: String,
    pub created_at: String,
}

/// Direction of a vote. Each direction is its own ledger table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VoteKind {
    Up,
    Down,
}

impl VoteKind {
    pub fn table(self) -> &'static str {
        match self {
            VoteKind::Up => "upvotes",
            VoteKind::Down => "downvotes",
        }
    }

    /// Key used for the vote in response envelopes.
    pub fn key(self) -> &'static str {
        match self {
            VoteKind::Up => "upvote",
            VoteKind::Down => "downvote",
        }
    }
}

impl std::fmt::Display for VoteKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VoteKind::Up => write!(f, "Upvote"),
            VoteKind::Down => write!(f, "Downvote"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_serialization_omits_password_hash() {
        let user = User {
            id: "u1".into(),
            username: "alice".into(),
            password_hash: "$2b$secret".into(),
            created_at: "2024-01-01 00:00:00".into(),
        };
        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("passwordHash").is_none());
        assert_eq!(json["username"], "alice");
    }

    #[test]
    fn post_fields_are_camel_case() {
        let post = Post {
            id: "p1".into(),
            title: "Hello".into(),
            text: "World".into(),
            user_id: None,
            subreddit_id: Some("s1".into()),
            parent_id: None,
            created_at: String::new(),
            updated_at: String::new(),
        };
        let json = serde_json::to_value(&post).unwrap();
        assert_eq!(json["subredditId"], "s1");
        assert!(json["parentId"].is_null());
        assert!(json["userId"].is_null());
    }
}
