//! Server configuration, read from the command line with environment fallbacks.

use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_JWT_SECRET: &str = "change-me";

/// Ten years.
pub const MAX_TOKEN_TTL_SECS: u64 = 10 * 365 * 24 * 3600;

#[derive(Debug, Clone, Parser)]
#[command(name = "docuform", about = "Document type authoring and themed PDF rendering service")]
pub struct ServerConfig {
    #[arg(long, env = "DOCUFORM_HOST", default_value = "127.0.0.1")]
    pub host: String,

    #[arg(long, env = "DOCUFORM_PORT", default_value_t = 8080)]
    pub port: u16,

    /// SQLite database file, created on first start.
    #[arg(long, env = "DOCUFORM_DATABASE", default_value = "docuform.sqlite")]
    pub database: PathBuf,

    #[arg(long, env = "DOCUFORM_JWT_SECRET", default_value = DEFAULT_JWT_SECRET, hide_env_values = true)]
    pub jwt_secret: String,

    /// Lifetime of issued bearer tokens. Seven days by default.
    #[arg(
        long,
        env = "DOCUFORM_TOKEN_TTL_SECS",
        default_value_t = 7 * 24 * 3600,
        value_parser = clap::value_parser!(u64).range(1..=MAX_TOKEN_TTL_SECS)
    )]
    pub token_ttl_secs: u64,

    /// Chromium or Chrome executable used for PDF rendering.
    #[arg(long, env = "DOCUFORM_CHROME", default_value = "chromium")]
    pub chrome: PathBuf,

    #[arg(long, env = "DOCUFORM_RENDER_TIMEOUT_SECS", default_value_t = 30)]
    pub render_timeout_secs: u64,

    /// Directory receiving uploaded profile pictures.
    #[arg(long, env = "DOCUFORM_UPLOAD_DIR", default_value = "uploads/profile-pictures")]
    pub upload_dir: PathBuf,

    /// Upper bound for JSON request bodies, in bytes.
    #[arg(long, env = "DOCUFORM_JSON_LIMIT", default_value_t = 10 * 1024 * 1024)]
    pub json_limit: usize,
}

impl ServerConfig {
    pub fn token_ttl(&self) -> Duration {
        Duration::from_secs(self.token_ttl_secs)
    }

    pub fn render_timeout(&self) -> Duration {
        Duration::from_secs(self.render_timeout_secs)
    }
}
