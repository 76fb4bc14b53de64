use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::ConfigError;

const DEFAULT_CONFIG: &str = include_str!("../../../config/default.toml");

/// Persisted user settings. The core only ever reads these.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub general: GeneralSettings,
    pub display: DisplaySettings,
    pub auth: AuthSettings,
    pub cache: CacheSettings,
    pub api: ApiSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralSettings {
    pub default_username: String,
    pub default_layout: Layout,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplaySettings {
    pub show_cover_images: bool,
    pub show_ratings: bool,
    pub show_progress: bool,
    pub show_genres: bool,
    pub grid_columns: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthSettings {
    pub access_token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheSettings {
    pub ttl_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiSettings {
    pub endpoint: String,
}

/// How a block is laid out by the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Layout {
    #[default]
    Card,
    Table,
}

impl FromStr for Layout {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "card" => Ok(Self::Card),
            "table" => Ok(Self::Table),
            _ => Err(ConfigError::InvalidValue {
                key: "layout",
                value: s.to_string(),
            }),
        }
    }
}

/// Opaque bearer token attached to authenticated calls.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(***)")
    }
}

/// Immutable defaults injected into the config resolver.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolverDefaults {
    pub default_username: Option<String>,
    pub default_layout: Layout,
}

impl Settings {
    /// Load settings: user file (if it exists) merged over built-in defaults.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::config_path())
    }

    /// Load settings from `path`, merged over built-in defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let mut merged: toml::Table =
            toml::from_str(DEFAULT_CONFIG).map_err(|e| ConfigError::Settings(e.to_string()))?;

        if path.exists() {
            let user_str = std::fs::read_to_string(path)?;
            let user: toml::Table =
                toml::from_str(&user_str).map_err(|e| ConfigError::Settings(e.to_string()))?;
            merge_tables(&mut merged, user);
        } else {
            tracing::debug!(path = %path.display(), "No settings file, using defaults");
        }

        toml::Value::Table(merged)
            .try_into()
            .map_err(|e: toml::de::Error| ConfigError::Settings(e.to_string()))
    }

    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| ConfigError::Settings(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Path to the user settings file (XDG on Linux, AppData on Windows).
    pub fn config_path() -> PathBuf {
        ProjectDirs::from("", "", "shiori")
            .map(|d| d.config_dir().join("config.toml"))
            .unwrap_or_else(|| PathBuf::from("config.toml"))
    }

    pub fn resolver_defaults(&self) -> ResolverDefaults {
        let username = self.general.default_username.trim();
        ResolverDefaults {
            default_username: (!username.is_empty()).then(|| username.to_string()),
            default_layout: self.general.default_layout,
        }
    }

    pub fn credential(&self) -> Option<Credential> {
        let token = self.auth.access_token.trim();
        (!token.is_empty()).then(|| Credential::new(token))
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache.ttl_secs)
    }

    pub fn endpoint(&self) -> Result<Url, ConfigError> {
        Url::parse(&self.api.endpoint).map_err(|e| ConfigError::InvalidValue {
            key: "endpoint",
            value: format!("{}: {e}", self.api.endpoint),
        })
    }
}

impl Default for Settings {
    fn default() -> Self {
        toml::from_str(DEFAULT_CONFIG).expect("built-in default config is valid TOML")
    }
}

fn merge_tables(base: &mut toml::Table, overlay: toml::Table) {
    for (key, value) in overlay {
        match (base.get_mut(&key), value) {
            (Some(toml::Value::Table(base_table)), toml::Value::Table(overlay_table)) => {
                merge_tables(base_table, overlay_table);
            }
            (_, value) => {
                base.insert(key, value);
            }
        }
    }
}
