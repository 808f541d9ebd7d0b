use serde::{Deserialize, Serialize};
use serde_json::Value;
use time::OffsetDateTime;

use super::repo::{Post, PostWithAuthor};
use crate::users::PublicUser;

/// Body of create and edit. An owner id, if sent, is ignored.
#[derive(Debug, Default, Deserialize)]
pub struct PostRequest {
    pub title: Option<Value>,
    pub content: Option<Value>,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
}

/// Returned by create and edit.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostSummary {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub user_id: i64,
}

impl From<Post> for PostSummary {
    fn from(p: Post) -> Self {
        Self {
            id: p.id,
            title: p.title,
            content: p.content,
            user_id: p.user_id,
        }
    }
}

/// Post with its author, as listed and fetched.
#[derive(Debug, Serialize)]
pub struct PostDetails {
    pub id: i64,
    pub title: String,
    pub content: String,
    #[serde(with = "time::serde::rfc3339")]
    pub published: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated: OffsetDateTime,
    pub user: PublicUser,
}

impl From<PostWithAuthor> for PostDetails {
    fn from(PostWithAuthor { post, author }: PostWithAuthor) -> Self {
        Self {
            id: post.id,
            title: post.title,
            content: post.content,
            published: post.published,
            updated: post.updated,
            user: author.into(),
        }
    }
}
