//! HTTP server command

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;

use blog_server::db::{create_pool_with_options, migrations};
use blog_server::http::run_server;
use blog_server::PgStore;

use crate::config::{FileConfig, Settings};

/// Arguments for the serve command
#[derive(Parser, Debug, Clone)]
pub struct ServeArgs {
    /// Address to bind to (default: 127.0.0.1:8000)
    #[arg(long, short = 'b', env = "BLOG_BIND")]
    pub bind: Option<SocketAddr>,

    /// Allow permissive CORS (all origins) - use with caution
    #[arg(long)]
    pub cors_permissive: bool,

    /// Database URL (overrides config file)
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    pub database_url: Option<String>,

    /// Public prefix for image URLs (default: /media/)
    #[arg(long, env = "BLOG_MEDIA_URL")]
    pub media_url: Option<String>,

    /// Directory to serve under the media URL
    #[arg(long, env = "BLOG_MEDIA_ROOT")]
    pub media_root: Option<PathBuf>,

    /// Request timeout in seconds (default: 30)
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Maximum database connections (default: 5)
    #[arg(long)]
    pub max_connections: Option<u32>,
}

/// Run the HTTP server
pub async fn run_serve(args: ServeArgs) -> Result<()> {
    let settings = Settings::resolve(&args, FileConfig::load()?)?;

    tracing::info!("Starting blog server on {}", settings.bind);

    let pool = create_pool_with_options(settings.database_url()?, settings.max_connections)
        .await
        .context("Failed to create database pool")?;

    migrations::run(&pool)
        .await
        .context("Failed to run migrations")?;

    // Blocks until shutdown
    run_server(Arc::new(PgStore::new(pool)), settings.server_config())
        .await
        .context("Server error")?;

    Ok(())
}
