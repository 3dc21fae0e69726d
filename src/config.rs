//! Command-line arguments, environment settings and manifest loading.

use clap::Parser;
use serde_json::Value;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{GitopsError, Result};

pub const DEFAULT_API_URL: &str = "https://api.pingdom.com/api/3.1";
pub const API_URL_ENV: &str = "PINGDOM_API_URL";

/// Reconcile Pingdom health checks against a declarative YAML manifest.
#[derive(Parser, Debug, Clone)]
#[command(name = "pingdom-gitops", version = crate::version::VERSION, about)]
pub struct Cli {
    /// Path to the `pingdom-checks` manifest
    #[arg(allow_hyphen_values = true)]
    pub config_path: PathBuf,

    /// Pingdom API token, sent as a bearer token. Tokens may start with `-`.
    #[arg(allow_hyphen_values = true)]
    pub api_key: String,
}

pub fn print_usage() {
    println!("GitOps: Pingdom Manager");
    println!("Usage: pingdom-gitops <config-path> <api-key>");
}

/// Connection settings for the Pingdom API.
#[derive(Clone)]
pub struct ApiSettings {
    pub base_url: String,
    pub api_key: String,
}

impl std::fmt::Debug for ApiSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiSettings")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

impl ApiSettings {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }

    /// Reads `PINGDOM_API_URL` (after `.env` has been loaded), falling back to the public API.
    pub fn from_env(api_key: impl Into<String>) -> Self {
        let base_url = env::var(API_URL_ENV)
            .ok()
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());
        Self::new(base_url, api_key)
    }
}

/// Reads the manifest from disk into a generic value tree.
pub fn load_document(path: &Path) -> Result<Value> {
    if !path.exists() {
        return Err(GitopsError::ConfigNotFound(path.to_path_buf()));
    }
    let content = fs::read_to_string(path)?;
    parse_document(&content)
}

pub fn parse_document(content: &str) -> Result<Value> {
    let document: Value = serde_yaml::from_str(content)?;
    Ok(document)
}
