//! Application configuration loaded via OrthoConfig.
//!
//! Values come from `COMPANION_*` environment variables, configuration files
//! and command-line flags. Secrets are not configured here; see
//! [`crate::inbound::http::launch_config`].

use std::net::{Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;

const DEFAULT_DATA_DIR: &str = "user_data";
const DEFAULT_PORT: u16 = 8000;
const DEFAULT_FLUSH_INTERVAL_SECS: u64 = 60;
const DEFAULT_NOTIFY_TIMEOUT_MS: u64 = 5_000;
const DEFAULT_NOTIFY_QUEUE_CAPACITY: usize = 1_024;
const DEFAULT_PLATFORM_API_BASE: &str = "https://api.telegram.org";
const DEFAULT_ALLOWED_ORIGINS: &str = "http://localhost:8080,http://127.0.0.1:8080";

/// Runtime settings for the companion server.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "COMPANION")]
pub struct AppSettings {
    /// Directory holding per-user records and the identity index.
    pub data_dir: Option<PathBuf>,
    /// Socket address the HTTP listener binds to.
    pub bind_addr: Option<SocketAddr>,
    /// Seconds between write-behind flushes.
    #[ortho_config(default = DEFAULT_FLUSH_INTERVAL_SECS)]
    pub flush_interval_secs: u64,
    /// Timeout for one notification delivery attempt, in milliseconds.
    #[ortho_config(default = DEFAULT_NOTIFY_TIMEOUT_MS)]
    pub notify_timeout_ms: u64,
    /// Capacity of the pending notification queue.
    #[ortho_config(default = DEFAULT_NOTIFY_QUEUE_CAPACITY)]
    pub notify_queue_capacity: usize,
    /// Base URL of the messaging platform's bot API.
    pub platform_api_base: Option<String>,
    /// Comma-separated browser origins allowed to call the API.
    pub allowed_origins: Option<String>,
}

impl AppSettings {
    pub fn data_dir(&self) -> PathBuf {
        self.data_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR))
    }

    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
            .unwrap_or_else(|| SocketAddr::from((Ipv4Addr::UNSPECIFIED, DEFAULT_PORT)))
    }

    /// Flush period. Zero is raised to one second so the timer never spins.
    pub fn flush_interval(&self) -> Duration {
        Duration::from_secs(self.flush_interval_secs.max(1))
    }

    pub fn notify_timeout(&self) -> Duration {
        Duration::from_millis(self.notify_timeout_ms)
    }

    /// Queue capacity; tokio channels reject zero so it is raised to one.
    pub fn notify_queue_capacity(&self) -> usize {
        self.notify_queue_capacity.max(1)
    }

    pub fn platform_api_base(&self) -> &str {
        self.platform_api_base
            .as_deref()
            .unwrap_or(DEFAULT_PLATFORM_API_BASE)
    }

    /// Origins for the CORS allow-list, trimmed with blanks dropped.
    pub fn allowed_origins(&self) -> Vec<String> {
        self.allowed_origins
            .as_deref()
            .unwrap_or(DEFAULT_ALLOWED_ORIGINS)
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(str::to_owned)
            .collect()
    }
}
