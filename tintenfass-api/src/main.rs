use serde::Deserialize;
use std::net::{IpAddr, SocketAddr};
use thiserror::Error;
use tintenfass_api::server::lifecycle::{ServeError, Server};
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Error)]
enum InitError {
    #[error("Error parsing .env file: {0}")]
    Dotenv(#[from] dotenvy::Error),
    #[error("Error parsing environment: {0}")]
    Envy(#[from] envy::Error),
    #[error("Error waiting for shutdown signal: {0}")]
    Signal(std::io::Error),
    #[error(transparent)]
    Serve(#[from] ServeError),
}

#[derive(Clone, Eq, PartialEq, Debug, Hash, Deserialize)]
struct Env {
    server_address: IpAddr,
    server_port: u16,
    database_url: String,
}

fn install_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "tintenfass_api=debug,tintenfass_db=debug,\
                tower_http=debug,axum::rejection=trace,sqlx=debug"
                    .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn get_env() -> Result<Env, InitError> {
    if let Err(e) = dotenvy::dotenv() {
        if e.not_found() {
            debug!("No .dotenv file found");
        } else {
            return Err(e.into());
        }
    }

    envy::from_env().map_err(InitError::from)
}

#[tokio::main]
async fn main() -> Result<(), InitError> {
    install_tracing();
    let env = get_env()?;

    let server_address = SocketAddr::new(env.server_address, env.server_port);
    let server = Server::run(&env.database_url, server_address).await?;

    tokio::signal::ctrl_c().await.map_err(InitError::Signal)?;
    server.close().await?;

    Ok(())
}
