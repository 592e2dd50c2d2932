use axum::{
    Router,
    extract::{
        FromRef, Request,
        rejection::{JsonRejection, PathRejection},
    },
    http::{StatusCode, Uri},
    response::{IntoResponse, Response},
};
use json::Json;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tintenfass_common::model::{
    Id,
    author::{AuthorMarker, UserName},
    post::PostMarker,
};
use tintenfass_db::client::{DbClient, DbError};
use tracing::error;

mod json;
pub mod lifecycle;
mod routes;

pub type ServerRouter = Router<ServerState>;

#[derive(Clone, Debug, FromRef)]
pub struct ServerState {
    pub db_client: Arc<DbClient>,
}

pub fn routes() -> ServerRouter {
    routes::routes().fallback(fallback)
}

pub async fn fallback(request: Request) -> ServerError {
    ServerError::UnknownRoute(request.into_parts().0.uri)
}

pub type Result<T, E = ServerError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Unknown route requested: {0}")]
    UnknownRoute(Uri),
    #[error("Path rejected: {0}")]
    PathRejection(#[from] PathRejection),
    #[error("Incoming JSON rejected: {0}")]
    JsonRejection(#[from] JsonRejection),
    #[error("JSON response could not be serialized: {0}")]
    JsonResponse(#[from] serde_json::Error),
    #[error(transparent)]
    Database(#[from] DbError),
    #[error("Request path id and request body id values must match")]
    IdMismatch,
    #[error("Username `{0}` already taken")]
    UserNameTaken(UserName),
    #[error("The referenced author with id {0} does not exist")]
    PostAuthorNotFound(Id<AuthorMarker>),
    #[error("Author with id {0} was not found.")]
    AuthorByIdNotFound(Id<AuthorMarker>),
    #[error("Post with id {0} was not found.")]
    PostByIdNotFound(Id<PostMarker>),
}

impl ServerError {
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            ServerError::UnknownRoute(_)
            | ServerError::AuthorByIdNotFound(_)
            | ServerError::PostByIdNotFound(_) => StatusCode::NOT_FOUND,
            ServerError::PathRejection(_)
            | ServerError::JsonRejection(_)
            | ServerError::IdMismatch
            | ServerError::UserNameTaken(_)
            | ServerError::PostAuthorNotFound(_) => StatusCode::BAD_REQUEST,
            ServerError::JsonResponse(_) | ServerError::Database(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Body message: descriptive for validation failures, opaque for
    /// everything else.
    fn public_message(&self) -> String {
        match self {
            ServerError::UnknownRoute(_) => "Not Found".to_owned(),
            ServerError::PathRejection(rejection) => rejection.body_text(),
            ServerError::JsonRejection(rejection) => rejection.body_text(),
            _ if self.status().is_server_error() => "internal server error".to_owned(),
            _ => self.to_string(),
        }
    }
}

#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
struct ErrorResponse {
    message: String,
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();

        error!(error = %self, %status, "Replying with error");

        let error_response = ErrorResponse {
            message: self.public_message(),
        };
        (status, Json(error_response)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use crate::server::ServerError;
    use axum::http::{StatusCode, Uri};
    use tintenfass_common::model::{ModelValidationError, author::UserName};
    use tintenfass_db::client::DbError;

    #[test]
    fn unknown_route_replies_not_found() {
        let err = ServerError::UnknownRoute(Uri::from_static("/nope"));
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
        assert_eq!(err.public_message(), "Not Found");
    }

    #[test]
    fn validation_failures_are_client_errors_with_detail() {
        let err = ServerError::IdMismatch;
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            err.public_message(),
            "Request path id and request body id values must match"
        );

        let err = ServerError::UserNameTaken(UserName::new("ada".to_owned()).unwrap());
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.public_message(), "Username `ada` already taken");

        let err = ServerError::PostAuthorNotFound(7.into());
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn missing_entities_are_not_found() {
        assert_eq!(
            ServerError::AuthorByIdNotFound(7.into()).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ServerError::PostByIdNotFound(3.into()).status(),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn store_failures_are_opaque_server_errors() {
        let err = ServerError::Database(DbError::Data(ModelValidationError::DanglingAuthor));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.public_message(), "internal server error");
    }
}
