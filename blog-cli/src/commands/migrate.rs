//! Schema migration command

use anyhow::{Context, Result};
use clap::Parser;

use blog_server::db::{create_pool, migrations};

use crate::config::FileConfig;

#[derive(Parser, Debug)]
pub struct MigrateArgs {
    /// Database URL (overrides config file)
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    pub database_url: Option<String>,
}

/// Create any missing tables and indexes, then exit
pub async fn run_migrate(args: MigrateArgs) -> Result<()> {
    let database_url = match args.database_url {
        Some(url) => url,
        None => FileConfig::load()?
            .database_url
            .context("DATABASE_URL not set. Set via --database-url, DATABASE_URL env, .env or config.toml")?,
    };

    let pool = create_pool(&database_url)
        .await
        .context("Failed to create database pool")?;

    migrations::run(&pool)
        .await
        .context("Failed to run migrations")?;

    tracing::info!("Schema is up to date");
    Ok(())
}
