use crate::record::{AuthorRecord, AuthoredPostRecord, PostRecord};
use sqlx::{
    PgPool,
    migrate::{MigrateError, Migrator},
    postgres::PgPoolOptions,
};
use thiserror::Error;
use tintenfass_common::model::{
    Id, ModelValidationError,
    author::{Author, AuthorMarker, CreateAuthor, UpdateAuthor, UserName},
    post::{AuthoredPost, CreatePost, Post, PostMarker, UpdatePost},
};

pub type Result<T, E = DbError> = std::result::Result<T, E>;

static MIGRATOR: Migrator = sqlx::migrate!();

#[derive(Debug, Error)]
pub enum DbError {
    #[error("An object in the database was invalid: {0}")]
    Data(#[from] ModelValidationError),
    #[error("Error running migrations: {0}")]
    Migrate(#[from] MigrateError),
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

#[derive(Debug)]
pub struct DbClient {
    pool: PgPool,
}

impl DbClient {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connects and brings the schema up to date.
    pub async fn connect(url: &str) -> Result<Self> {
        let pool = PgPoolOptions::new().connect(url).await?;
        MIGRATOR.run(&pool).await?;

        Ok(Self { pool })
    }

    /// Pool that connects on first use. Runs no migrations.
    pub fn connect_lazy(url: &str) -> Result<Self> {
        let pool = PgPoolOptions::new().connect_lazy(url)?;

        Ok(Self { pool })
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }

    pub async fn list_authors(&self) -> Result<Vec<Author>> {
        let records: Vec<AuthorRecord> = sqlx::query_as(
            "
            SELECT author_id, first_name, last_name, user_name
            FROM authors
            ORDER BY author_id
            ",
        )
        .fetch_all(&self.pool)
        .await?;

        let authors = records
            .into_iter()
            .map(Author::try_from)
            .collect::<Result<_, _>>()?;
        Ok(authors)
    }

    pub async fn fetch_author(&self, author_id: Id<AuthorMarker>) -> Result<Option<Author>> {
        let record: Option<AuthorRecord> = sqlx::query_as(
            "
            SELECT author_id, first_name, last_name, user_name
            FROM authors
            WHERE author_id = $1
            ",
        )
        .bind(author_id.get().cast_signed())
        .fetch_optional(&self.pool)
        .await?;

        let author = record.map(Author::try_from).transpose()?;
        Ok(author)
    }

    pub async fn fetch_author_by_user_name(&self, user_name: &UserName) -> Result<Option<Author>> {
        let record: Option<AuthorRecord> = sqlx::query_as(
            "
            SELECT author_id, first_name, last_name, user_name
            FROM authors
            WHERE user_name = $1
            ",
        )
        .bind(user_name.get())
        .fetch_optional(&self.pool)
        .await?;

        let author = record.map(Author::try_from).transpose()?;
        Ok(author)
    }

    /// Uniqueness check for updates: is the user name held by any author
    /// other than the one being updated?
    pub async fn user_name_taken_by_other(
        &self,
        user_name: &UserName,
        excluded: Id<AuthorMarker>,
    ) -> Result<bool> {
        let taken = sqlx::query_scalar(
            "
            SELECT EXISTS(
                SELECT 1 FROM authors
                WHERE user_name = $1 AND author_id <> $2
            )
            ",
        )
        .bind(user_name.get())
        .bind(excluded.get().cast_signed())
        .fetch_one(&self.pool)
        .await?;

        Ok(taken)
    }

    pub async fn create_author(&self, author: &CreateAuthor) -> Result<Author> {
        let record: AuthorRecord = sqlx::query_as(
            "
            INSERT INTO authors (first_name, last_name, user_name)
            VALUES ($1, $2, $3)
            RETURNING author_id, first_name, last_name, user_name
            ",
        )
        .bind(&author.first_name)
        .bind(&author.last_name)
        .bind(author.user_name.get())
        .fetch_one(&self.pool)
        .await?;

        Ok(record.try_into()?)
    }

    pub async fn update_author(
        &self,
        author_id: Id<AuthorMarker>,
        changes: &UpdateAuthor,
    ) -> Result<Option<Author>> {
        let record: Option<AuthorRecord> = sqlx::query_as(
            "
            UPDATE authors SET
                first_name = COALESCE($2, first_name),
                last_name = COALESCE($3, last_name),
                user_name = COALESCE($4, user_name)
            WHERE author_id = $1
            RETURNING author_id, first_name, last_name, user_name
            ",
        )
        .bind(author_id.get().cast_signed())
        .bind(changes.first_name.as_deref())
        .bind(changes.last_name.as_deref())
        .bind(changes.user_name.as_ref().map(UserName::get))
        .fetch_optional(&self.pool)
        .await?;

        let author = record.map(Author::try_from).transpose()?;
        Ok(author)
    }

    /// Removes the author's posts, then the author. The two statements are
    /// not transactional; a failure in between leaves the posts removed and
    /// the author in place.
    pub async fn delete_author(&self, author_id: Id<AuthorMarker>) -> Result<()> {
        sqlx::query("DELETE FROM posts WHERE author_id = $1")
            .bind(author_id.get().cast_signed())
            .execute(&self.pool)
            .await?;

        sqlx::query("DELETE FROM authors WHERE author_id = $1")
            .bind(author_id.get().cast_signed())
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    pub async fn list_posts(&self) -> Result<Vec<AuthoredPost>> {
        let records: Vec<AuthoredPostRecord> = sqlx::query_as(
            "
            SELECT
                posts.post_id, posts.title, posts.content, posts.comments, posts.created,
                authors.first_name, authors.last_name
            FROM posts LEFT JOIN authors ON authors.author_id = posts.author_id
            ORDER BY posts.post_id
            ",
        )
        .fetch_all(&self.pool)
        .await?;

        let posts = records
            .into_iter()
            .map(AuthoredPost::try_from)
            .collect::<Result<_, _>>()?;
        Ok(posts)
    }

    pub async fn fetch_post(&self, post_id: Id<PostMarker>) -> Result<Option<AuthoredPost>> {
        let record: Option<AuthoredPostRecord> = sqlx::query_as(
            "
            SELECT
                posts.post_id, posts.title, posts.content, posts.comments, posts.created,
                authors.first_name, authors.last_name
            FROM posts LEFT JOIN authors ON authors.author_id = posts.author_id
            WHERE posts.post_id = $1
            ",
        )
        .bind(post_id.get().cast_signed())
        .fetch_optional(&self.pool)
        .await?;

        let post = record.map(AuthoredPost::try_from).transpose()?;
        Ok(post)
    }

    pub async fn create_post(&self, post: &CreatePost) -> Result<Post> {
        let record: PostRecord = sqlx::query_as(
            "
            INSERT INTO posts (title, content, author_id)
            VALUES ($1, $2, $3)
            RETURNING post_id, title, content, author_id, comments, created
            ",
        )
        .bind(&post.title)
        .bind(&post.content)
        .bind(post.author.get().cast_signed())
        .fetch_one(&self.pool)
        .await?;

        Ok(record.into())
    }

    pub async fn update_post(
        &self,
        post_id: Id<PostMarker>,
        changes: &UpdatePost,
    ) -> Result<Option<Post>> {
        let record: Option<PostRecord> = sqlx::query_as(
            "
            UPDATE posts SET
                title = COALESCE($2, title),
                content = COALESCE($3, content),
                author_id = COALESCE($4, author_id)
            WHERE post_id = $1
            RETURNING post_id, title, content, author_id, comments, created
            ",
        )
        .bind(post_id.get().cast_signed())
        .bind(changes.title.as_deref())
        .bind(changes.content.as_deref())
        .bind(changes.author.map(|author| author.get().cast_signed()))
        .fetch_optional(&self.pool)
        .await?;

        Ok(record.map(Post::from))
    }

    /// Idempotent: removing an absent post is still success.
    pub async fn delete_post(&self, post_id: Id<PostMarker>) -> Result<()> {
        sqlx::query("DELETE FROM posts WHERE post_id = $1")
            .bind(post_id.get().cast_signed())
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
