//! Application configuration types.
//!
//! The top-level [`Config`] struct is deserialized from JSON and carries all
//! sub-configs for the HTTP server, the request-tracking service, the metadata
//! catalog, and the fixed request policy. Every section defaults sensibly so a
//! completely empty `{}` file is valid. Environment variables are overlaid on
//! top of the file with [`Config::apply_env`].

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::Error;

/// Environment variable holding the tracking-service base URL.
pub const ENV_TRACKING_URL: &str = "OVERSEERR_URL";
/// Environment variable holding the tracking-service API key.
pub const ENV_TRACKING_API_KEY: &str = "OVERSEERR_API_KEY";
/// Environment variable holding the catalog API key.
pub const ENV_CATALOG_API_KEY: &str = "TMDB_API_KEY";
/// Environment variable overriding the catalog language.
pub const ENV_CATALOG_LANGUAGE: &str = "TMDB_LANGUAGE";
/// Environment variable overriding the bind host.
pub const ENV_HOST: &str = "REELQUEST_HOST";
/// Environment variable overriding the bind port.
pub const ENV_PORT: &str = "REELQUEST_PORT";

// ---------------------------------------------------------------------------
// Top-level Config
// ---------------------------------------------------------------------------

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub tracking: TrackingConfig,
    pub catalog: CatalogConfig,
    pub requests: RequestDefaults,
}

impl Config {
    /// Deserialize a `Config` from a JSON string.
    pub fn from_json(json_str: &str) -> Result<Self> {
        serde_json::from_str(json_str)
            .map_err(|e| Error::Validation(format!("config parse error: {e}")))
    }

    /// Load configuration from a file, failing on unreadable or invalid JSON.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            Error::Validation(format!("cannot read config {}: {e}", path.display()))
        })?;
        Self::from_json(&contents)
    }

    /// Load configuration from a file path, falling back to defaults if the
    /// path is `None` or the file does not exist.
    pub fn load_or_default(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            return Self::default();
        };

        match std::fs::read_to_string(path) {
            Ok(contents) => Self::from_json(&contents).unwrap_or_else(|e| {
                tracing::warn!("Failed to parse config file {}: {e}", path.display());
                Self::default()
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!("No config file at {}; using defaults", path.display());
                Self::default()
            }
            Err(e) => {
                tracing::warn!("Failed to read config file {}: {e}", path.display());
                Self::default()
            }
        }
    }

    /// Overlay values from the process environment.
    pub fn apply_env(&mut self) {
        self.apply_vars(|name| std::env::var(name).ok());
    }

    /// Overlay values from an arbitrary variable source. Empty values are
    /// ignored.
    pub fn apply_vars(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(url) = get(ENV_TRACKING_URL) {
            self.tracking.url = Some(url);
        }
        if let Some(key) = get(ENV_TRACKING_API_KEY) {
            self.tracking.api_key = Some(key);
        }
        if let Some(key) = get(ENV_CATALOG_API_KEY) {
            self.catalog.api_key = Some(key);
        }
        if let Some(language) = get(ENV_CATALOG_LANGUAGE) {
            self.catalog.language = language;
        }
        if let Some(host) = get(ENV_HOST) {
            self.server.host = host;
        }
        if let Some(port) = get(ENV_PORT) {
            match port.parse() {
                Ok(p) => self.server.port = p,
                Err(_) => tracing::warn!("Ignoring invalid {ENV_PORT} value: {port}"),
            }
        }
    }

    /// Fail unless every remote service the server depends on is configured.
    ///
    /// The returned [`Error::ConfigurationMissing`] names every absent
    /// setting, not just the first.
    pub fn require_services(&self) -> Result<()> {
        let mut missing = self.tracking.missing_settings();
        if self.catalog.api_key.as_deref().map_or(true, str::is_empty) {
            missing.push(ENV_CATALOG_API_KEY.to_string());
        }

        if missing.is_empty() {
            Ok(())
        } else {
            Err(Error::ConfigurationMissing(missing))
        }
    }

    /// Return a list of validation warnings (non-fatal issues).
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        if self.server.port == 0 {
            warnings.push("server.port is 0; a random port will be assigned".into());
        }

        if self.tracking.recent_requests == 0 {
            warnings.push(
                "tracking.recent_requests is 0; pending requests will never be detected".into(),
            );
        }

        if self.tracking.timeout_secs == 0 {
            warnings.push("tracking.timeout_secs is 0; remote calls will fail immediately".into());
        }

        if self.catalog.requests_per_second == 0 {
            warnings.push("catalog.requests_per_second is 0; using 1".into());
        }

        if !self.requests.movie_root_folder.starts_with('/')
            || !self.requests.series_root_folder.starts_with('/')
        {
            warnings.push("request root folders should be absolute paths".into());
        }

        warnings
    }
}

fn is_http_url(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}

// ---------------------------------------------------------------------------
// Sub-configs
// ---------------------------------------------------------------------------

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub static_dir: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 3000,
            static_dir: None,
        }
    }
}

/// Request-tracking service (Overseerr) connection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackingConfig {
    pub url: Option<String>,
    pub api_key: Option<String>,
    pub timeout_secs: u64,
    /// How many of the most recently added requests are scanned for a
    /// pending match.
    pub recent_requests: u32,
}

impl TrackingConfig {
    /// Settings that must be fixed before the tracking service can be called.
    pub fn missing_settings(&self) -> Vec<String> {
        let mut missing = Vec::new();
        match self.url.as_deref() {
            None => missing.push(ENV_TRACKING_URL.to_string()),
            Some(url) if !is_http_url(url) => {
                missing.push(format!("{ENV_TRACKING_URL} (not an http(s) URL)"))
            }
            Some(_) => {}
        }
        if self.api_key.as_deref().map_or(true, str::is_empty) {
            missing.push(ENV_TRACKING_API_KEY.to_string());
        }
        missing
    }

    /// Fail with [`Error::ConfigurationMissing`] unless both URL and key are set.
    pub fn require(&self) -> Result<()> {
        let missing = self.missing_settings();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(Error::ConfigurationMissing(missing))
        }
    }
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            url: None,
            api_key: None,
            timeout_secs: 10,
            recent_requests: 20,
        }
    }
}

/// Metadata catalog (TMDB) settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub language: String,
    /// Watch-provider region used for provider listings.
    pub region: String,
    pub requests_per_second: u32,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.themoviedb.org/3".into(),
            api_key: None,
            language: "fr-FR".into(),
            region: "FR".into(),
            requests_per_second: 30,
        }
    }
}

/// Fixed policy attached to every acquisition request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RequestDefaults {
    pub user_id: u64,
    pub is_4k: bool,
    pub movie_root_folder: String,
    pub series_root_folder: String,
}

impl Default for RequestDefaults {
    fn default() -> Self {
        Self {
            user_id: 1,
            is_4k: false,
            movie_root_folder: "/mnt/plex/Movies".into(),
            series_root_folder: "/mnt/plex/Series".into(),
        }
    }
}
