use crate::server::{ServerState, routes};
use std::{future::IntoFuture, net::SocketAddr, sync::Arc};
use thiserror::Error;
use tintenfass_db::client::{DbClient, DbError};
use tokio::{
    net::TcpListener,
    task::{JoinError, JoinHandle},
};
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;
use tracing::info;

#[derive(Debug, Error)]
pub enum ServeError {
    #[error("Error connecting to the database: {0}")]
    Database(#[from] DbError),
    #[error("Error binding tcp listener: {0}")]
    TcpBind(std::io::Error),
    #[error("Error serving server: {0}")]
    TcpServe(std::io::Error),
    #[error("Server task failed: {0}")]
    Join(#[from] JoinError),
}

/// Handle to a running server, returned by [`Server::run`] and consumed by
/// [`Server::close`]. There is no process-global server state.
#[derive(Debug)]
pub struct Server {
    db_client: Arc<DbClient>,
    local_addr: SocketAddr,
    shutdown: CancellationToken,
    serve_task: JoinHandle<Result<(), std::io::Error>>,
}

impl Server {
    /// Connects the database, binds the listener, and starts serving. A
    /// bind failure tears the database connection down again before it is
    /// surfaced.
    pub async fn run(database_url: &str, address: SocketAddr) -> Result<Self, ServeError> {
        let db_client = Arc::new(DbClient::connect(database_url).await?);

        let listener = match TcpListener::bind(address).await {
            Ok(listener) => listener,
            Err(err) => {
                db_client.close().await;
                return Err(ServeError::TcpBind(err));
            }
        };
        let local_addr = match listener.local_addr() {
            Ok(local_addr) => local_addr,
            Err(err) => {
                db_client.close().await;
                return Err(ServeError::TcpBind(err));
            }
        };

        let state = ServerState {
            db_client: Arc::clone(&db_client),
        };
        let app = routes()
            .with_state(state)
            .layer(TraceLayer::new_for_http());

        let shutdown = CancellationToken::new();
        let serve_task = tokio::spawn(
            axum::serve(listener, app)
                .with_graceful_shutdown(shutdown.clone().cancelled_owned())
                .into_future(),
        );

        info!(%local_addr, "Listening");

        Ok(Self {
            db_client,
            local_addr,
            shutdown,
            serve_task,
        })
    }

    #[must_use]
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Tears down the database connection, then stops the listener, in
    /// that order.
    pub async fn close(self) -> Result<(), ServeError> {
        self.db_client.close().await;

        self.shutdown.cancel();
        self.serve_task.await?.map_err(ServeError::TcpServe)
    }
}
