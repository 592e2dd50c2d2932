use crate::server::ServerRouter;
use axum::Router;

mod authors;
mod posts;

pub fn routes() -> ServerRouter {
    Router::new().merge(authors::routes()).merge(posts::routes())
}
