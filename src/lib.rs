pub mod config;
pub mod crypto;
pub mod error;
pub mod push;
pub mod types;

mod adapters;
mod app;
mod ports;
mod state;
#[cfg(test)]
mod test_support;

pub use app::app;
pub use push::{generate_vapid_credentials, resolve_vapid_config};

use std::net::SocketAddr;

pub async fn serve(addr: SocketAddr, config: config::AppConfig) -> Result<(), error::ServeError> {
    let router = app(config)?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "listening");
    axum::serve(listener, router).await?;
    Ok(())
}
