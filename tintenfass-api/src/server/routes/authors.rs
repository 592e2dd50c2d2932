use crate::server::{Result, ServerError, ServerRouter, json::Json};
use axum::{extract::State, http::StatusCode};
use axum_extra::routing::{RouterExt, TypedPath};
use serde::Deserialize;
use std::sync::Arc;
use tintenfass_common::model::{
    Id,
    author::{AuthorMarker, AuthorSummary, CreateAuthor, UpdateAuthor},
};
use tintenfass_db::client::DbClient;

pub fn routes() -> ServerRouter {
    ServerRouter::new()
        .typed_get(list_authors)
        .typed_post(create_author)
        .typed_put(update_author)
        .typed_delete(delete_author)
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/authors", rejection(ServerError))]
struct AuthorsPath();

#[derive(TypedPath, Deserialize)]
#[typed_path("/authors/{id}", rejection(ServerError))]
struct AuthorPath {
    id: Id<AuthorMarker>,
}

async fn list_authors(
    AuthorsPath(): AuthorsPath,
    State(db): State<Arc<DbClient>>,
) -> Result<Json<Vec<AuthorSummary>>> {
    let authors = db.list_authors().await?;

    Ok(Json(authors.into_iter().map(AuthorSummary::from).collect()))
}

async fn create_author(
    AuthorsPath(): AuthorsPath,
    State(db): State<Arc<DbClient>>,
    Json(author): Json<CreateAuthor>,
) -> Result<(StatusCode, Json<AuthorSummary>)> {
    if db
        .fetch_author_by_user_name(&author.user_name)
        .await?
        .is_some()
    {
        return Err(ServerError::UserNameTaken(author.user_name));
    }

    let created = db.create_author(&author).await?;

    Ok((StatusCode::CREATED, Json(created.into())))
}

async fn update_author(
    AuthorPath { id }: AuthorPath,
    State(db): State<Arc<DbClient>>,
    Json(changes): Json<UpdateAuthor>,
) -> Result<Json<AuthorSummary>> {
    if changes.id.is_some_and(|body_id| body_id != id) {
        return Err(ServerError::IdMismatch);
    }

    if let Some(user_name) = &changes.user_name
        && db.user_name_taken_by_other(user_name, id).await?
    {
        return Err(ServerError::UserNameTaken(user_name.clone()));
    }

    let updated = db
        .update_author(id, &changes)
        .await?
        .ok_or(ServerError::AuthorByIdNotFound(id))?;

    Ok(Json(updated.into()))
}

async fn delete_author(
    AuthorPath { id }: AuthorPath,
    State(db): State<Arc<DbClient>>,
) -> Result<StatusCode> {
    db.delete_author(id).await?;

    Ok(StatusCode::NO_CONTENT)
}
