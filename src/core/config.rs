use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf, time::Duration};
use tracing::debug;

pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-3-flash-preview";

/// Environment variables consulted, in order, when no API key is configured.
pub const API_KEY_ENV_VARS: [&str; 2] = ["GEMINI_API_KEY", "API_KEY"];

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct GeminiProviderConfig {
    #[serde(default = "default_gemini_base_url")]
    pub base_url: String,
    #[serde(default = "default_gemini_model")]
    pub model: String,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for GeminiProviderConfig {
    fn default() -> Self {
        GeminiProviderConfig {
            base_url: default_gemini_base_url(),
            model: default_gemini_model(),
            api_key: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl GeminiProviderConfig {
    /// The configured key, else the first non-empty key from the environment.
    pub fn resolve_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .filter(|key| !key.trim().is_empty())
            .or_else(|| {
                API_KEY_ENV_VARS
                    .iter()
                    .filter_map(|var| std::env::var(var).ok())
                    .find(|key| !key.trim().is_empty())
            })
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ProvidersConfig {
    pub gemini: Option<GeminiProviderConfig>,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        ProvidersConfig {
            gemini: Some(GeminiProviderConfig::default()),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    #[serde(default)]
    pub providers: ProvidersConfig,
    #[serde(default = "default_currency_symbol")]
    pub currency_symbol: String,
    pub data_path: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            providers: ProvidersConfig::default(),
            currency_symbol: default_currency_symbol(),
            data_path: None,
        }
    }
}

impl AppConfig {
    /// Loads the default config file, or the defaults if there is none yet.
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        if !config_path.exists() {
            debug!(
                "No config file at {}, using defaults",
                config_path.display()
            );
            return Ok(Self::default());
        }
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = project_dirs()?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn default_data_path(&self) -> Result<PathBuf> {
        if let Some(custom_path) = &self.data_path {
            return Ok(PathBuf::from(custom_path));
        }
        let proj_dirs = project_dirs()?;
        Ok(proj_dirs.data_dir().to_path_buf())
    }

    /// Gemini settings, falling back to the defaults when the section is absent.
    pub fn gemini(&self) -> GeminiProviderConfig {
        self.providers.gemini.clone().unwrap_or_default()
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        debug!("Successfully loaded config");
        Ok(config)
    }
}

fn project_dirs() -> Result<ProjectDirs> {
    ProjectDirs::from("com", "subaudit", "subaudit")
        .context("Could not determine project directories")
}

fn default_gemini_base_url() -> String {
    DEFAULT_GEMINI_BASE_URL.to_string()
}

fn default_gemini_model() -> String {
    DEFAULT_GEMINI_MODEL.to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_currency_symbol() -> String {
    "$".to_string()
}
