//! Configuration loading
//!
//! Bootstrap configuration comes from a TOML file, resolved in priority order:
//! 1. Explicit path (command-line argument)
//! 2. `EDUTRACK_CONFIG` environment variable
//! 3. User config file (`~/.config/edutrack/config.toml` on Linux)
//! 4. System config file (`/etc/edutrack/config.toml`, Linux only)
//! 5. Compiled defaults
//!
//! A missing file at step 3 or 4 is not an error: startup continues with
//! defaults and a warning. An explicitly named file that cannot be read is.
//!
//! Individual values can then be overridden from the environment
//! (`EDUTRACK_PORT`, `EDUTRACK_PIXEL_ENDPOINT`).

use crate::events::{EventDefaults, RouteEventKind, RouteTrackingDescriptor};
use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

pub const CONFIG_ENV_VAR: &str = "EDUTRACK_CONFIG";
pub const PORT_ENV_VAR: &str = "EDUTRACK_PORT";
pub const PIXEL_ENDPOINT_ENV_VAR: &str = "EDUTRACK_PIXEL_ENDPOINT";

/// Upper bound for the page-view settle delay
pub const MAX_SETTLE_DELAY_MS: u64 = 60_000;

/// Idle lifetime of a collector session (30 minutes)
pub const DEFAULT_SESSION_TTL_SECS: u64 = 1800;

/// Bootstrap configuration loaded from TOML
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    /// HTTP port of the collector service
    pub port: u16,
    pub logging: LoggingConfig,
    pub tracking: TrackingSettings,
    pub pixel: PixelSettings,
    pub data_layer: DataLayerSettings,
    /// Extra or overriding route descriptors
    pub routes: Vec<RouteEntry>,
}

impl Default for TomlConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            logging: LoggingConfig::default(),
            tracking: TrackingSettings::default(),
            pixel: PixelSettings::default(),
            data_layer: DataLayerSettings::default(),
            routes: Vec::new(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Event defaults and page-view timing
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TrackingSettings {
    /// Delay between navigation and the page-view event
    pub settle_delay_ms: u64,
    pub default_currency: String,
    pub default_category: String,
    /// Start from the built-in route table before applying `[[routes]]`
    pub include_default_routes: bool,
    /// Collector sessions idle this long are torn down; 0 keeps them forever
    pub session_ttl_secs: u64,
}

impl Default for TrackingSettings {
    fn default() -> Self {
        let defaults = EventDefaults::default();
        Self {
            settle_delay_ms: 500,
            default_currency: defaults.currency,
            default_category: defaults.content_category,
            include_default_routes: true,
            session_ttl_secs: DEFAULT_SESSION_TTL_SECS,
        }
    }
}

impl TrackingSettings {
    pub fn event_defaults(&self) -> EventDefaults {
        EventDefaults {
            currency: self.default_currency.clone(),
            content_category: self.default_category.clone(),
            ..EventDefaults::default()
        }
    }

    pub fn settle_delay(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.settle_delay_ms)
    }

    pub fn session_ttl(&self) -> Option<std::time::Duration> {
        match self.session_ttl_secs {
            0 => None,
            secs => Some(std::time::Duration::from_secs(secs)),
        }
    }
}

/// Client-side pixel forwarding
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PixelSettings {
    /// Conversions endpoint; the pixel is unavailable when unset
    pub endpoint: Option<String>,
    pub pixel_id: Option<String>,
    /// Whether new sessions start with tracking consent granted
    pub consent_default: bool,
    pub timeout_ms: u64,
}

impl Default for PixelSettings {
    fn default() -> Self {
        Self {
            endpoint: None,
            pixel_id: None,
            consent_default: true,
            timeout_ms: 5000,
        }
    }
}

/// Shape of data-layer records
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DataLayerSettings {
    /// Fixed value for the record's `event` key; the event name is used when unset
    pub event_key: Option<String>,
}

/// One `[[routes]]` table entry
#[derive(Debug, Clone, Deserialize)]
pub struct RouteEntry {
    pub path: String,
    #[serde(default)]
    pub event_kind: RouteEventKind,
    pub content_name: String,
    pub content_category: String,
    pub content_ids: Vec<String>,
}

impl RouteEntry {
    pub fn to_descriptor(&self) -> Result<RouteTrackingDescriptor> {
        RouteTrackingDescriptor::new(
            self.event_kind.clone(),
            self.content_name.clone(),
            self.content_category.clone(),
            self.content_ids.clone(),
        )
        .map_err(|e| Error::Config(format!("route '{}': {}", self.path, e)))
    }
}

fn default_port() -> u16 {
    5730
}

impl TomlConfig {
    /// Parse and validate a TOML document
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: TomlConfig = toml::from_str(content)
            .map_err(|e| Error::Config(format!("Invalid TOML: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a specific file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Cannot read config file {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&content)
    }

    /// Resolve and load configuration following the priority order above
    pub fn load(cli_path: Option<&Path>) -> Result<Self> {
        let mut config = match ConfigResolver::new().resolve(cli_path)? {
            Some(path) => {
                info!("Loading configuration from {}", path.display());
                Self::from_file(&path)?
            }
            None => {
                warn!("No configuration file found, using compiled defaults");
                Self::default()
            }
        };
        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Apply `EDUTRACK_PORT` / `EDUTRACK_PIXEL_ENDPOINT` overrides
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(port) = std::env::var(PORT_ENV_VAR) {
            self.port = port
                .parse()
                .map_err(|_| Error::Config(format!("{} is not a valid port: {}", PORT_ENV_VAR, port)))?;
        }
        if let Ok(endpoint) = std::env::var(PIXEL_ENDPOINT_ENV_VAR) {
            self.pixel.endpoint = if endpoint.trim().is_empty() {
                None
            } else {
                Some(endpoint)
            };
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.tracking.settle_delay_ms > MAX_SETTLE_DELAY_MS {
            return Err(Error::Config(format!(
                "tracking.settle_delay_ms must be <= {} (got {})",
                MAX_SETTLE_DELAY_MS, self.tracking.settle_delay_ms
            )));
        }
        for entry in &self.routes {
            if entry.path.is_empty() {
                return Err(Error::Config("route path must not be empty".to_string()));
            }
            entry.to_descriptor()?;
        }
        Ok(())
    }
}

/// Locates the configuration file
pub struct ConfigResolver {
    search_paths: Vec<PathBuf>,
}

impl ConfigResolver {
    /// Resolver using the platform's standard locations
    pub fn new() -> Self {
        let mut search_paths = Vec::new();
        if let Some(dir) = dirs::config_dir() {
            search_paths.push(dir.join("edutrack").join("config.toml"));
        }
        if cfg!(target_os = "linux") {
            search_paths.push(PathBuf::from("/etc/edutrack/config.toml"));
        }
        Self { search_paths }
    }

    /// Resolver with explicit search locations
    pub fn with_search_paths(search_paths: Vec<PathBuf>) -> Self {
        Self { search_paths }
    }

    /// Find the file to load, or `None` when compiled defaults apply
    pub fn resolve(&self, cli_path: Option<&Path>) -> Result<Option<PathBuf>> {
        // Priority 1: Command-line argument
        if let Some(path) = cli_path {
            return require_exists(path.to_path_buf());
        }

        // Priority 2: Environment variable
        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            if !path.trim().is_empty() {
                return require_exists(PathBuf::from(path));
            }
        }

        // Priority 3/4: Standard locations
        Ok(self.search_paths.iter().find(|p| p.exists()).cloned())
    }
}

impl Default for ConfigResolver {
    fn default() -> Self {
        Self::new()
    }
}

fn require_exists(path: PathBuf) -> Result<Option<PathBuf>> {
    if path.exists() {
        Ok(Some(path))
    } else {
        Err(Error::Config(format!("Config file not found: {}", path.display())))
    }
}
