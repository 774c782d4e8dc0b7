use std::path::PathBuf;
use std::time::Duration;

/// Application-level constants
pub const APP_NAME: &str = "Careline";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Storage key holding the bearer token.
pub const TOKEN_KEY: &str = "token";

/// Backend used when `CARELINE_API_URL` is unset (local development server).
pub const DEFAULT_API_URL: &str = "http://localhost:5000";

const ENV_API_URL: &str = "CARELINE_API_URL";
const ENV_AUTH_URL: &str = "CARELINE_AUTH_URL";
const ENV_STORAGE: &str = "CARELINE_STORAGE";
const ENV_DATA_DIR: &str = "CARELINE_DATA_DIR";
const ENV_TIMEOUT: &str = "CARELINE_TIMEOUT_SECS";

/// Default tracing filter when `RUST_LOG` is not set.
pub fn default_log_filter() -> &'static str {
    "careline_lib=info,careline=info"
}

/// Get the application data directory (`~/.careline`).
///
/// Falls back to the current directory when no home directory can be resolved.
pub fn app_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".careline")
}

/// Where the credential store keeps its file.
pub fn credentials_path(data_dir: &std::path::Path) -> PathBuf {
    data_dir.join("credentials.json")
}

/// Which credential store implementation to use for this process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    /// Persistent owner-only file in the data directory.
    File,
    /// Process-lifetime map; nothing survives exit.
    Memory,
}

impl StorageBackend {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "file" => Some(Self::File),
            "memory" => Some(Self::Memory),
            _ => None,
        }
    }
}

/// Runtime configuration for the client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub api_url: String,
    pub auth_url: String,
    pub storage: StorageBackend,
    pub data_dir: PathBuf,
    /// Request timeout; `None` keeps the HTTP client's defaults.
    pub timeout: Option<Duration>,
}

impl ClientConfig {
    /// Configuration pointing both services at `api_url`, file storage in the default data dir.
    pub fn new(api_url: &str) -> Self {
        let api_url = trim_url(api_url);
        Self {
            auth_url: api_url.clone(),
            api_url,
            storage: StorageBackend::File,
            data_dir: app_data_dir(),
            timeout: None,
        }
    }

    /// Build from `CARELINE_*` environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let api_url = get(ENV_API_URL).unwrap_or_else(|| DEFAULT_API_URL.to_string());
        let mut config = Self::new(&api_url);

        if let Some(auth) = get(ENV_AUTH_URL) {
            config.auth_url = trim_url(&auth);
        }
        if let Some(raw) = get(ENV_STORAGE) {
            match StorageBackend::parse(&raw) {
                Some(storage) => config.storage = storage,
                None => tracing::warn!(value = %raw, "Unknown {ENV_STORAGE}, using file storage"),
            }
        }
        if let Some(dir) = get(ENV_DATA_DIR) {
            config.data_dir = PathBuf::from(dir);
        }
        if let Some(raw) = get(ENV_TIMEOUT) {
            match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => config.timeout = Some(Duration::from_secs(secs)),
                _ => tracing::warn!(value = %raw, "Ignoring invalid {ENV_TIMEOUT}"),
            }
        }
        config
    }
}

fn trim_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}
