//! HTTP surface and CLI for application form downloads

mod cli;
pub mod config;
pub mod error;
pub mod routes;
mod server;
pub mod state;
pub mod telemetry;

pub use routes::router;
pub use state::AppState;

pub async fn run() -> anyhow::Result<()> {
    cli::run().await
}
