// ABOUTME: Server binary for the helpdesk ticketing API
// ABOUTME: Loads configuration, initializes the store and provider, and serves HTTP
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! # Helpdesk Server Binary
//!
//! Starts the support-ticketing REST API with JWT authentication, SQLite
//! storage, and AI-assisted ticket resolution.

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use helpdesk_server::{
    config::environment::{DatabaseUrl, ServerConfig},
    database_plugins::{factory::Database, DatabaseProvider},
    llm::MistralProvider,
    logging,
    resources::ServerResources,
    server,
};
use tracing::info;

#[derive(Parser)]
#[command(name = "helpdesk-server")]
#[command(about = "Helpdesk API - AI-assisted support ticketing backend")]
pub struct Args {
    /// Override HTTP port
    #[arg(long)]
    http_port: Option<u16>,

    /// Override database URL (sqlite:<path>)
    #[arg(long)]
    database_url: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging before anything that might warn
    logging::init_from_env()?;

    let mut config = ServerConfig::from_env()?;
    if let Some(http_port) = args.http_port {
        config.http_port = http_port;
    }
    if let Some(database_url) = &args.database_url {
        config.database_url = DatabaseUrl::parse(database_url)?;
    }

    info!("Starting helpdesk server");
    info!("{}", config.summary());

    let database = Database::new(&config.database_url.to_connection_string()).await?;
    info!("Database ready: {}", database.backend_info());

    let provider = MistralProvider::from_config(&config.ai)?;

    let http_port = config.http_port;
    let resources = Arc::new(ServerResources::new(
        database,
        Arc::new(provider),
        Arc::new(config),
    ));

    server::serve(resources, http_port).await?;

    Ok(())
}
