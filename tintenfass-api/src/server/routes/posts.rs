use crate::server::{Result, ServerError, ServerRouter, json::Json};
use axum::{extract::State, http::StatusCode};
use axum_extra::routing::{RouterExt, TypedPath};
use serde::Deserialize;
use std::sync::Arc;
use tintenfass_common::model::{
    Id,
    post::{AuthoredPost, CreatePost, PostMarker, UpdatePost, UpdatedPost},
};
use tintenfass_db::client::DbClient;

pub fn routes() -> ServerRouter {
    ServerRouter::new()
        .typed_get(list_posts)
        .typed_post(create_post)
        .typed_get(get_post)
        .typed_put(update_post)
        .typed_delete(delete_post)
        .typed_delete(delete_post_root)
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/posts", rejection(ServerError))]
struct PostsPath();

#[derive(TypedPath, Deserialize)]
#[typed_path("/posts/{id}", rejection(ServerError))]
struct PostPath {
    id: Id<PostMarker>,
}

/// Legacy alias of `DELETE /posts/{id}` kept from the original surface.
#[derive(TypedPath, Deserialize)]
#[typed_path("/{id}", rejection(ServerError))]
struct RootPostPath {
    id: Id<PostMarker>,
}

async fn list_posts(
    PostsPath(): PostsPath,
    State(db): State<Arc<DbClient>>,
) -> Result<Json<Vec<AuthoredPost>>> {
    let posts = db.list_posts().await?;

    Ok(Json(posts))
}

async fn get_post(
    PostPath { id }: PostPath,
    State(db): State<Arc<DbClient>>,
) -> Result<Json<AuthoredPost>> {
    let post = db
        .fetch_post(id)
        .await?
        .ok_or(ServerError::PostByIdNotFound(id))?;

    Ok(Json(post))
}

async fn create_post(
    PostsPath(): PostsPath,
    State(db): State<Arc<DbClient>>,
    Json(post): Json<CreatePost>,
) -> Result<(StatusCode, Json<AuthoredPost>)> {
    let author = db
        .fetch_author(post.author)
        .await?
        .ok_or(ServerError::PostAuthorNotFound(post.author))?;

    let created = db.create_post(&post).await?;

    Ok((
        StatusCode::CREATED,
        Json(AuthoredPost::new(created, &author)),
    ))
}

async fn update_post(
    PostPath { id }: PostPath,
    State(db): State<Arc<DbClient>>,
    Json(changes): Json<UpdatePost>,
) -> Result<Json<UpdatedPost>> {
    if changes.id.is_some_and(|body_id| body_id != id) {
        return Err(ServerError::IdMismatch);
    }

    // A changed author reference is validated the same way create is.
    if let Some(author_id) = changes.author
        && db.fetch_author(author_id).await?.is_none()
    {
        return Err(ServerError::PostAuthorNotFound(author_id));
    }

    let updated = db
        .update_post(id, &changes)
        .await?
        .ok_or(ServerError::PostByIdNotFound(id))?;

    Ok(Json(updated.into()))
}

async fn delete_post(
    PostPath { id }: PostPath,
    State(db): State<Arc<DbClient>>,
) -> Result<StatusCode> {
    db.delete_post(id).await?;

    Ok(StatusCode::NO_CONTENT)
}

async fn delete_post_root(
    RootPostPath { id }: RootPostPath,
    State(db): State<Arc<DbClient>>,
) -> Result<StatusCode> {
    db.delete_post(id).await?;

    Ok(StatusCode::NO_CONTENT)
}
