//! `serve` command: host the local HTTP playground.

use anyhow::Result;

use crate::domain::models::Config;
use crate::infrastructure::setup;
use crate::server;

pub async fn handle_serve(config: &Config, port: Option<u16>) -> Result<()> {
    let (pipeline, store) = setup::build_pipeline(config).await?;
    let port = port.unwrap_or(config.server.port);
    server::serve(pipeline, store, port).await
}
