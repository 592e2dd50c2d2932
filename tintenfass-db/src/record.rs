use sqlx::types::Json;
use time::OffsetDateTime;
use tintenfass_common::model::{
    ModelValidationError,
    author::{Author, UserName, full_name},
    post::{AuthoredPost, Comment, Post},
};

#[derive(Clone, Eq, PartialEq, Debug, Default, sqlx::FromRow)]
pub(crate) struct AuthorRecord {
    pub author_id: i64,
    pub first_name: String,
    pub last_name: String,
    pub user_name: String,
}

#[derive(Clone, Debug, sqlx::FromRow)]
pub(crate) struct PostRecord {
    pub post_id: i64,
    pub title: String,
    pub content: Option<String>,
    pub author_id: i64,
    pub comments: Json<Vec<Comment>>,
    pub created: OffsetDateTime,
}

/// A post row joined with its author's name parts. The names are absent
/// when the reference dangles, which read paths treat as a data error.
#[derive(Clone, Debug, sqlx::FromRow)]
pub(crate) struct AuthoredPostRecord {
    pub post_id: i64,
    pub title: String,
    pub content: Option<String>,
    pub comments: Json<Vec<Comment>>,
    pub created: OffsetDateTime,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

impl TryFrom<AuthorRecord> for Author {
    type Error = ModelValidationError;

    fn try_from(value: AuthorRecord) -> Result<Self, Self::Error> {
        Ok(Self {
            id: value.author_id.cast_unsigned().into(),
            first_name: value.first_name,
            last_name: value.last_name,
            user_name: UserName::new(value.user_name)?,
        })
    }
}

impl From<PostRecord> for Post {
    fn from(value: PostRecord) -> Self {
        Self {
            id: value.post_id.cast_unsigned().into(),
            title: value.title,
            content: value.content,
            author: value.author_id.cast_unsigned().into(),
            comments: value.comments.0,
            created: value.created,
        }
    }
}

impl TryFrom<AuthoredPostRecord> for AuthoredPost {
    type Error = ModelValidationError;

    fn try_from(value: AuthoredPostRecord) -> Result<Self, Self::Error> {
        let (Some(first_name), Some(last_name)) = (value.first_name, value.last_name) else {
            return Err(ModelValidationError::DanglingAuthor);
        };

        Ok(Self {
            id: value.post_id.cast_unsigned().into(),
            author: full_name(&first_name, &last_name),
            content: value.content,
            title: value.title,
            comments: value.comments.0,
            created: value.created,
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::record::{AuthorRecord, AuthoredPostRecord, PostRecord};
    use sqlx::types::Json;
    use time::macros::datetime;
    use tintenfass_common::model::{
        ModelValidationError,
        author::Author,
        post::{AuthoredPost, Comment, Post},
    };

    #[test]
    fn author_record_converts() {
        let record = AuthorRecord {
            author_id: 7,
            first_name: "Ada".to_owned(),
            last_name: "Lovelace".to_owned(),
            user_name: "ada".to_owned(),
        };

        let author = Author::try_from(record).unwrap();
        assert_eq!(author.id.get(), 7);
        assert_eq!(author.user_name.get(), "ada");
    }

    #[test]
    fn author_record_rejects_invalid_user_name() {
        let record = AuthorRecord {
            author_id: 7,
            user_name: String::new(),
            ..AuthorRecord::default()
        };

        assert!(matches!(
            Author::try_from(record),
            Err(ModelValidationError::UserName(_))
        ));
    }

    #[test]
    fn post_record_converts() {
        let record = PostRecord {
            post_id: 3,
            title: "T".to_owned(),
            content: None,
            author_id: 7,
            comments: Json(vec![Comment {
                content: "first!".to_owned(),
            }]),
            created: datetime!(2025-01-01 00:00 UTC),
        };

        let post = Post::from(record);
        assert_eq!(post.id.get(), 3);
        assert_eq!(post.author.get(), 7);
        assert_eq!(post.comments.len(), 1);
    }

    #[test]
    fn joined_record_resolves_author_name() {
        let record = AuthoredPostRecord {
            post_id: 3,
            title: "T".to_owned(),
            content: Some("C".to_owned()),
            comments: Json(Vec::new()),
            created: datetime!(2025-01-01 00:00 UTC),
            first_name: Some("Ada".to_owned()),
            last_name: Some("Lovelace".to_owned()),
        };

        let authored = AuthoredPost::try_from(record).unwrap();
        assert_eq!(authored.author, "Ada Lovelace");
    }

    #[test]
    fn joined_record_with_dangling_author_is_an_error() {
        let record = AuthoredPostRecord {
            post_id: 3,
            title: "T".to_owned(),
            content: None,
            comments: Json(Vec::new()),
            created: datetime!(2025-01-01 00:00 UTC),
            first_name: None,
            last_name: None,
        };

        assert!(matches!(
            AuthoredPost::try_from(record),
            Err(ModelValidationError::DanglingAuthor)
        ));
    }
}
