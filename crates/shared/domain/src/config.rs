use serde::Deserialize;
use std::borrow::Cow;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::ops::{Deref, DerefMut};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Top-level application configuration.
#[derive(Default, Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfigInner {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub fetch: FetchConfig,
    pub log: LogConfig,
}

/// Thin Arc-wrapped config for inexpensive cloning into subsystems.
#[derive(Default, Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(flatten, default)]
    inner: Arc<AppConfigInner>,
}

impl Deref for AppConfig {
    type Target = AppConfigInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl DerefMut for AppConfig {
    fn deref_mut(&mut self) -> &mut AppConfigInner {
        Arc::make_mut(&mut self.inner)
    }
}

impl AppConfig {
    /// Checks the invariants deserialization cannot express.
    ///
    /// # Errors
    /// Returns a description of the first offending key.
    pub fn validate(&self) -> Result<(), Cow<'static, str>> {
        if self.fetch.max_concurrent == 0 {
            return Err("fetch.max_concurrent must be at least 1".into());
        }
        if self.fetch.max_file_size == 0 {
            return Err("fetch.max_file_size must be greater than zero".into());
        }
        if self.fetch.timeout_secs == 0 {
            return Err("fetch.timeout_secs must be greater than zero".into());
        }
        if self.server.public_base().is_empty() {
            return Err("server.public_url must not be empty".into());
        }
        Ok(())
    }
}

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub address: IpAddr,
    pub port: u16,
    /// Base prepended to logical paths when reporting stored images.
    pub public_url: String,
    pub shutdown_grace_secs: u64,
    /// Tokio worker threads; `None` lets the runtime pick.
    pub worker_threads: Option<usize>,
}

impl ServerConfig {
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.address, self.port)
    }

    /// `public_url` without trailing slashes, ready to be joined with a `/`-prefixed path.
    #[must_use]
    pub fn public_base(&self) -> &str {
        self.public_url.trim().trim_end_matches('/')
    }

    #[must_use]
    pub const fn shutdown_grace(&self) -> Duration {
        Duration::from_secs(self.shutdown_grace_secs)
    }
}

/// Image store location.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub root: PathBuf,
}

/// Limits applied to outbound image downloads.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Largest accepted body, in bytes.
    pub max_file_size: u64,
    /// Whole-request timeout, in seconds.
    pub timeout_secs: u64,
    /// Downloads allowed in flight at once.
    pub max_concurrent: usize,
}

impl FetchConfig {
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Logging output.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub level: String,
    /// Directory for rolling log files; console only when unset.
    pub directory: Option<PathBuf>,
    /// JSON lines for file output.
    pub json: bool,
    /// Explicit filter directives; `RUST_LOG` applies when unset.
    pub filter: Option<String>,
}

// --- Default ---

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: 8080,
            public_url: "http://localhost:8080".to_owned(),
            shutdown_grace_secs: 5,
            worker_threads: None,
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self { root: PathBuf::from("./data") }
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self { max_file_size: 10 << 20, timeout_secs: 10, max_concurrent: 20 }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self { level: "info".to_owned(), directory: None, json: false, filter: None }
    }
}
