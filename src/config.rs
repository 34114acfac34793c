use anyhow::{Context, Result};
use clap::Parser;
use std::env;

/// Centralized application configuration.
/// Combines environment variables and CLI arguments.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub storage_dir: String,
    pub public_url: Option<String>,
}

/// Command-line + environment configuration.
#[derive(Parser, Debug)]
#[command(author, version, about = "Markdown document server backed by blob storage")]
pub struct Args {
    /// Host to bind to (overrides MDPAGE_HOST)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind to (overrides MDPAGE_PORT)
    #[arg(long)]
    pub port: Option<u16>,

    /// Directory where blobs are stored (overrides MDPAGE_STORAGE_DIR)
    #[arg(long)]
    pub storage_dir: Option<String>,

    /// Public base URL blob links are built from (overrides MDPAGE_PUBLIC_URL)
    #[arg(long)]
    pub public_url: Option<String>,
}

impl AppConfig {
    /// Parse environment variables + CLI args into AppConfig.
    pub fn from_env_and_args() -> Result<Self> {
        // Parse CLI once
        let args = Args::parse();

        // --- Environment fallback ---
        let env_host = env::var("MDPAGE_HOST").unwrap_or_else(|_| "0.0.0.0".into());
        let env_port = match env::var("MDPAGE_PORT") {
            Ok(value) => value
                .parse::<u16>()
                .with_context(|| format!("parsing MDPAGE_PORT value `{}`", value))?,
            Err(env::VarError::NotPresent) => 3000,
            Err(err) => return Err(err).context("reading MDPAGE_PORT"),
        };
        let env_storage = env::var("MDPAGE_STORAGE_DIR").unwrap_or_else(|_| "./data/blobs".into());
        let env_public = env::var("MDPAGE_PUBLIC_URL").ok();

        // --- Merge ---
        Ok(Self {
            host: args.host.unwrap_or(env_host),
            port: args.port.unwrap_or(env_port),
            storage_dir: args.storage_dir.unwrap_or(env_storage),
            public_url: args.public_url.or(env_public),
        })
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Base URL the service is reachable at; blob URLs hang off this.
    pub fn public_base(&self) -> String {
        match &self.public_url {
            Some(url) => url.trim_end_matches('/').to_string(),
            None => format!("http://{}:{}", self.host, self.port),
        }
    }
}
