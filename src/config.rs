//! Configuration resolution
//!
//! Layered priority, highest first: command-line argument, environment
//! variable (via clap's env fallback), optional TOML config file, compiled
//! default. The downloader binary path is configuration because its name
//! varies between hosts (yt-dlp, yt-dlp.exe, a wrapper script).

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Deserialize;
use tracing::info;

const DEFAULT_BIND: &str = "127.0.0.1:8080";
const DEFAULT_AUDD_URL: &str = "https://api.audd.io/";
const DEFAULT_ALLOWED_ORIGIN: &str = "http://localhost:5173";
const DEFAULT_DOWNLOADER: &str = "yt-dlp";
const DEFAULT_WORK_DIR: &str = "./songs";
const DEFAULT_EXTRACTION_TIMEOUT_SECS: u64 = 120;

/// Command-line arguments (each falls back to its environment variable)
#[derive(Debug, Default, Parser)]
#[command(name = "toktune", about = "Song recognition service for social-media video links")]
pub struct Cli {
    /// Path to a TOML config file
    #[arg(long, env = "TOKTUNE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Address to listen on
    #[arg(long, env = "TOKTUNE_BIND")]
    pub bind: Option<String>,

    /// audd.io API token
    #[arg(long, env = "TOKTUNE_AUDD_TOKEN")]
    pub audd_token: Option<String>,

    /// audd.io endpoint override
    #[arg(long, env = "TOKTUNE_AUDD_URL", hide = true)]
    pub audd_url: Option<String>,

    /// Front-end origin allowed by CORS
    #[arg(long, env = "TOKTUNE_ALLOWED_ORIGIN")]
    pub allowed_origin: Option<String>,

    /// Downloader executable name or path
    #[arg(long, env = "TOKTUNE_DOWNLOADER")]
    pub downloader: Option<String>,

    /// Directory for temporary clip files
    #[arg(long, env = "TOKTUNE_WORK_DIR")]
    pub work_dir: Option<PathBuf>,
}

/// Optional TOML config file contents
#[derive(Debug, Default, Deserialize)]
pub struct FileConfig {
    pub bind: Option<String>,
    pub audd_token: Option<String>,
    pub audd_url: Option<String>,
    pub allowed_origin: Option<String>,
    pub downloader: Option<String>,
    pub work_dir: Option<PathBuf>,
    pub extraction_timeout_secs: Option<u64>,
}

/// Resolved application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub bind: String,
    pub audd_token: String,
    pub audd_url: String,
    pub allowed_origin: String,
    pub downloader: String,
    pub work_dir: PathBuf,
    pub extraction_timeout: Duration,
}

impl Config {
    /// Resolve configuration from CLI/env, file, and defaults.
    pub fn resolve(cli: &Cli) -> Result<Self> {
        let file = match &cli.config {
            Some(path) => {
                let raw = std::fs::read_to_string(path)
                    .with_context(|| format!("Could not read config file {}", path.display()))?;
                let parsed: FileConfig = toml::from_str(&raw)
                    .with_context(|| format!("Could not parse config file {}", path.display()))?;
                info!(path = %path.display(), "Loaded config file");
                parsed
            }
            None => FileConfig::default(),
        };

        Ok(Self {
            bind: cli
                .bind
                .clone()
                .or(file.bind)
                .unwrap_or_else(|| DEFAULT_BIND.to_string()),
            audd_token: cli
                .audd_token
                .clone()
                .or(file.audd_token)
                .unwrap_or_default(),
            audd_url: cli
                .audd_url
                .clone()
                .or(file.audd_url)
                .unwrap_or_else(|| DEFAULT_AUDD_URL.to_string()),
            allowed_origin: cli
                .allowed_origin
                .clone()
                .or(file.allowed_origin)
                .unwrap_or_else(|| DEFAULT_ALLOWED_ORIGIN.to_string()),
            downloader: cli
                .downloader
                .clone()
                .or(file.downloader)
                .unwrap_or_else(|| DEFAULT_DOWNLOADER.to_string()),
            work_dir: cli
                .work_dir
                .clone()
                .or(file.work_dir)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_WORK_DIR)),
            extraction_timeout: Duration::from_secs(
                file.extraction_timeout_secs
                    .unwrap_or(DEFAULT_EXTRACTION_TIMEOUT_SECS),
            ),
        })
    }
}
