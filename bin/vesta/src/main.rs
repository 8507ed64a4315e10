//! Vesta storage provider marketplace inspector.

mod cli;
mod commands;
mod snapshot;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    cli::run().await
}
