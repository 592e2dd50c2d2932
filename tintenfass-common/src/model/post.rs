use crate::model::{
    Id,
    author::{Author, AuthorMarker, full_name},
};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash)]
pub struct PostMarker;

/// Stored shape of a blog post. The author is held by reference; comments
/// are embedded and owned exclusively by the post.
#[derive(Clone, Eq, PartialEq, Debug, Hash, Deserialize, Serialize)]
pub struct Post {
    pub id: Id<PostMarker>,
    pub title: String,
    pub content: Option<String>,
    pub author: Id<AuthorMarker>,
    pub comments: Vec<Comment>,
    #[serde(with = "time::serde::rfc3339")]
    pub created: OffsetDateTime,
}

/// A free-text note embedded in a post, with no identity beyond its
/// position in the sequence.
#[derive(Clone, Eq, PartialEq, Debug, Default, Hash, Deserialize, Serialize)]
pub struct Comment {
    pub content: String,
}

#[derive(Clone, Eq, PartialEq, Debug, Default, Hash, Deserialize, Serialize)]
pub struct CreatePost {
    pub title: String,
    pub content: String,
    pub author: Id<AuthorMarker>,
}

/// Partial update. `id`, when present, must match the path id.
#[derive(Clone, Eq, PartialEq, Debug, Default, Hash, Deserialize, Serialize)]
pub struct UpdatePost {
    pub id: Option<Id<PostMarker>>,
    pub title: Option<String>,
    pub content: Option<String>,
    pub author: Option<Id<AuthorMarker>>,
}

/// The public representation of a post: the author appears as their
/// resolved full name instead of the stored reference.
#[derive(Clone, Eq, PartialEq, Debug, Hash, Deserialize, Serialize)]
pub struct AuthoredPost {
    pub id: Id<PostMarker>,
    pub author: String,
    pub content: Option<String>,
    pub title: String,
    pub comments: Vec<Comment>,
    #[serde(with = "time::serde::rfc3339")]
    pub created: OffsetDateTime,
}

impl AuthoredPost {
    #[must_use]
    pub fn new(post: Post, author: &Author) -> Self {
        Self::with_name_parts(post, &author.first_name, &author.last_name)
    }

    #[must_use]
    pub fn with_name_parts(post: Post, first_name: &str, last_name: &str) -> Self {
        Self {
            id: post.id,
            author: full_name(first_name, last_name),
            content: post.content,
            title: post.title,
            comments: post.comments,
            created: post.created,
        }
    }
}

/// Reply shape of a post update: only the directly updatable fields.
#[derive(Clone, Eq, PartialEq, Debug, Hash, Deserialize, Serialize)]
pub struct UpdatedPost {
    pub id: Id<PostMarker>,
    pub title: String,
    pub content: Option<String>,
}

impl From<Post> for UpdatedPost {
    fn from(post: Post) -> Self {
        Self {
            id: post.id,
            title: post.title,
            content: post.content,
        }
    }
}
