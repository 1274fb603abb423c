//! Fixed-depth expansion of the post forest.

use std::collections::HashMap;

use serde::Serialize;

use crate::db::models::Post;

/// Levels of replies included under a listed post: its children, and their
/// children. Anything deeper is left out of that nesting.
pub const TREE_DEPTH: usize = 2;

/// A post with its replies. Nodes at the expansion limit carry no
/// `children` key at all, rather than an empty list.
#[derive(Debug, Clone, Serialize)]
pub struct PostNode {
    #[serde(flatten)]
    pub post: Post,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<PostNode>>,
}

/// Parent id → direct replies, preserving input order.
pub struct ChildIndex<'a> {
    by_parent: HashMap<&'a str, Vec<&'a Post>>,
}

impl<'a> ChildIndex<'a> {
    pub fn new(posts: &'a [Post]) -> Self {
        let mut by_parent: HashMap<&str, Vec<&Post>> = HashMap::new();
        for post in posts {
            if let Some(parent) = post.parent_id.as_deref() {
                by_parent.entry(parent).or_default().push(post);
            }
        }
        Self { by_parent }
    }

    pub fn children_of(&self, post_id: &str) -> &[&'a Post] {
        self.by_parent
            .get(post_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// `post` with `depth` levels of replies below it.
    pub fn expand(&self, post: &Post, depth: usize) -> PostNode {
        let children = (depth > 0).then(|| {
            self.children_of(&post.id)
                .iter()
                .map(|child| self.expand(child, depth - 1))
                .collect()
        });

        PostNode {
            post: post.clone(),
            children,
        }
    }

    /// Replies of `post`, each expanded so that the whole nesting spans
    /// [`TREE_DEPTH`] levels.
    pub fn replies(&self, post: &Post) -> Vec<PostNode> {
        self.expand(post, TREE_DEPTH).children.unwrap_or_default()
    }
}
