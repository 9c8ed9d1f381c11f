use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

pub const DEFAULT_BIND: &str = "0.0.0.0:8080";
pub const DEFAULT_GEONAMES_URL: &str = "http://api.geonames.org";
pub const DEFAULT_MAX_ROWS: u32 = 20;
pub const DEFAULT_LANGUAGE: &str = "en-US";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

const STORE_FILE_NAME: &str = "locations.json";

/// HTTP listener settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: DEFAULT_BIND.to_string(),
        }
    }
}

/// Where the location collection lives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct StoreConfig {
    /// JSON file holding the collection; the platform data dir is used if unset.
    pub path: Option<PathBuf>,
}

/// GeoNames access.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeonamesConfig {
    pub username: Option<String>,
    pub base_url: String,
    pub max_rows: u32,
    pub timeout_secs: u64,
}

impl Default for GeonamesConfig {
    fn default() -> Self {
        Self {
            username: None,
            base_url: DEFAULT_GEONAMES_URL.to_string(),
            max_rows: DEFAULT_MAX_ROWS,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

/// Weather service access.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeatherConfig {
    pub base_url: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub language: String,
    pub timeout_secs: u64,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            username: None,
            password: None,
            language: DEFAULT_LANGUAGE.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// [geonames]
/// username = "demo"
///
/// [weather]
/// base_url = "https://twcservice.mybluemix.net"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub store: StoreConfig,
    pub geonames: GeonamesConfig,
    pub weather: WeatherConfig,
}

impl Config {
    /// Load config from disk, or return an empty default if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            // First run: no config file, return empty.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::config_file_path()?;
        self.save_to(&path)?;
        Ok(path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        Ok(Self::project_dirs()?.config_dir().join("config.toml"))
    }

    fn project_dirs() -> Result<ProjectDirs> {
        ProjectDirs::from("dev", "weather-task", "weather-web")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))
    }

    /// Overlay settings from the process environment.
    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_env_from(|key| std::env::var(key).ok())
    }

    /// Overlay settings from an arbitrary variable lookup.
    ///
    /// `VCAP_SERVICES` is applied first so that the explicit `WEATHER_URI`
    /// wins when both are present.
    pub fn apply_env_from<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(services) = lookup("VCAP_SERVICES") {
            self.apply_vcap_services(&services)?;
        }
        if let Some(uri) = lookup("WEATHER_URI") {
            self.weather.base_url = Some(uri);
        }
        if let Some(username) = lookup("GEONAMES_USERNAME") {
            self.geonames.username = Some(username);
        }
        if let Some(path) = lookup("LOCATIONS_STORE_PATH") {
            self.store.path = Some(PathBuf::from(path));
        }
        if let Some(port) = lookup("PORT") {
            let port: u16 = port
                .trim()
                .parse()
                .with_context(|| format!("PORT is not a valid port number: {port}"))?;
            self.server.bind = with_port(&self.server.bind, port);
        }
        Ok(())
    }

    /// Pick up Weather Insights credentials bound by Cloud Foundry.
    fn apply_vcap_services(&mut self, raw: &str) -> Result<()> {
        let services: serde_json::Value =
            serde_json::from_str(raw).context("Failed to parse VCAP_SERVICES as JSON")?;

        let Some(credentials) = services
            .get("weatherinsights")
            .and_then(|list| list.get(0))
            .and_then(|service| service.get("credentials"))
        else {
            return Ok(());
        };

        if let Some(url) = credentials.get("url").and_then(|v| v.as_str()) {
            self.weather.base_url = Some(url.to_string());
        }
        if let Some(username) = credentials.get("username").and_then(|v| v.as_str()) {
            self.weather.username = Some(username.to_string());
        }
        if let Some(password) = credentials.get("password").and_then(|v| v.as_str()) {
            self.weather.password = Some(password.to_string());
        }
        Ok(())
    }

    pub fn geonames_username(&self) -> Result<&str> {
        self.geonames
            .username
            .as_deref()
            .filter(|u| !u.is_empty())
            .ok_or_else(|| {
                anyhow!(
                    "No GeoNames username configured.\n\
                     Hint: run `weather-web configure` or set GEONAMES_USERNAME."
                )
            })
    }

    pub fn weather_base_url(&self) -> Result<&str> {
        self.weather
            .base_url
            .as_deref()
            .filter(|u| !u.is_empty())
            .ok_or_else(|| {
                anyhow!(
                    "No weather service URL configured.\n\
                     Hint: run `weather-web configure` or set WEATHER_URI."
                )
            })
    }

    /// The configured store file, or `<data dir>/locations.json`.
    pub fn store_path(&self) -> Result<PathBuf> {
        match &self.store.path {
            Some(path) => Ok(path.clone()),
            None => Ok(Self::project_dirs()?.data_dir().join(STORE_FILE_NAME)),
        }
    }

    /// Copy suitable for printing: secrets are masked.
    pub fn redacted(&self) -> Self {
        let mut cfg = self.clone();
        if cfg.weather.password.is_some() {
            cfg.weather.password = Some("********".to_string());
        }
        cfg
    }
}

fn with_port(bind: &str, port: u16) -> String {
    let host = bind.rsplit_once(':').map(|(host, _)| host).unwrap_or(bind);
    format!("{host}:{port}")
}
