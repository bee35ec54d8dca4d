//! Settings file and resolution
//!
//! Precedence: CLI flags / environment (via clap `env`), then
//! `~/.blog/config.toml` (or `$BLOG_CONFIG`), then built-in defaults.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Deserialize;

use blog_server::context::MediaUrl;
use blog_server::db::pool::DEFAULT_MAX_CONNECTIONS;
use blog_server::ServerConfig;

use crate::commands::serve::ServeArgs;

const DEFAULT_BIND: &str = "127.0.0.1:8000";
const DEFAULT_MEDIA_URL: &str = "/media/";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Contents of `config.toml`; every key is optional
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub database_url: Option<String>,
    pub bind: Option<SocketAddr>,
    pub media_url: Option<String>,
    pub media_root: Option<PathBuf>,
    pub cors_permissive: Option<bool>,
    pub request_timeout_secs: Option<u64>,
    pub max_connections: Option<u32>,
}

impl FileConfig {
    /// `$BLOG_CONFIG`, else `~/.blog/config.toml`.
    pub fn path() -> PathBuf {
        if let Ok(path) = std::env::var("BLOG_CONFIG") {
            return PathBuf::from(path);
        }
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".blog")
            .join("config.toml")
    }

    /// Load the config file; a missing file is an empty config.
    pub fn load() -> Result<Self> {
        let path = Self::path();
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file");
            return Ok(Self::default());
        }

        let raw = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::parse(&raw).with_context(|| format!("Invalid config file {}", path.display()))
    }

    pub fn parse(raw: &str) -> Result<Self> {
        Ok(toml::from_str(raw)?)
    }
}

/// Fully resolved settings
#[derive(Debug, Clone)]
pub struct Settings {
    pub database_url: Option<String>,
    pub bind: SocketAddr,
    pub media_url: String,
    pub media_root: Option<PathBuf>,
    pub cors_permissive: bool,
    pub request_timeout_secs: u64,
    pub max_connections: u32,
}

impl Settings {
    pub fn resolve(args: &ServeArgs, file: FileConfig) -> Result<Self> {
        let bind = match args.bind.or(file.bind) {
            Some(bind) => bind,
            None => DEFAULT_BIND.parse().context("invalid default bind address")?,
        };

        Ok(Self {
            database_url: args.database_url.clone().or(file.database_url),
            bind,
            media_url: args
                .media_url
                .clone()
                .or(file.media_url)
                .unwrap_or_else(|| DEFAULT_MEDIA_URL.to_owned()),
            media_root: args.media_root.clone().or(file.media_root),
            cors_permissive: args.cors_permissive || file.cors_permissive.unwrap_or(false),
            request_timeout_secs: args
                .timeout
                .or(file.request_timeout_secs)
                .unwrap_or(DEFAULT_TIMEOUT_SECS),
            max_connections: args
                .max_connections
                .or(file.max_connections)
                .unwrap_or(DEFAULT_MAX_CONNECTIONS),
        })
    }

    pub fn database_url(&self) -> Result<&str> {
        self.database_url.as_deref().context(
            "DATABASE_URL not set. Set via --database-url, DATABASE_URL env, .env or config.toml",
        )
    }

    pub fn server_config(&self) -> ServerConfig {
        ServerConfig {
            bind_addr: self.bind,
            cors_permissive: self.cors_permissive,
            media_url: MediaUrl::new(&self.media_url),
            media_root: self.media_root.clone(),
            request_timeout: Duration::from_secs(self.request_timeout_secs),
        }
    }
}

/// Hide the password part of a connection string.
pub fn redact_database_url(url: &str) -> String {
    let Some(scheme_end) = url.find("://") else {
        return url.to_owned();
    };
    let rest = &url[scheme_end + 3..];
    let Some(at) = rest.rfind('@') else {
        return url.to_owned();
    };
    let userinfo = &rest[..at];
    match userinfo.find(':') {
        Some(colon) => format!(
            "{}{}:****{}",
            &url[..scheme_end + 3],
            &userinfo[..colon],
            &rest[at..]
        ),
        None => url.to_owned(),
    }
}

#[derive(Parser, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show config file path
    Path,
    /// Show resolved settings (flags and environment applied)
    Show(ServeArgs),
}

pub fn run_config(args: ConfigArgs) -> Result<()> {
    match args.command {
        ConfigCommands::Path => {
            println!("{}", FileConfig::path().display());
            Ok(())
        }
        ConfigCommands::Show(serve_args) => {
            let settings = Settings::resolve(&serve_args, FileConfig::load()?)?;
            let database_url = settings
                .database_url
                .as_deref()
                .map(redact_database_url)
                .unwrap_or_else(|| "<unset>".to_owned());

            println!("database_url = {}", database_url);
            println!("bind = {}", settings.bind);
            println!("media_url = {}", settings.media_url);
            match &settings.media_root {
                Some(root) => println!("media_root = {}", root.display()),
                None => println!("media_root = <unset>"),
            }
            println!("cors_permissive = {}", settings.cors_permissive);
            println!("request_timeout_secs = {}", settings.request_timeout_secs);
            println!("max_connections = {}", settings.max_connections);
            Ok(())
        }
    }
}
