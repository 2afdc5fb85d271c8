use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings
    #[serde(default)]
    pub general: GeneralConfig,

    /// Web server settings
    #[serde(default)]
    pub web: WebConfig,

    /// GitHub OAuth application credentials
    #[serde(default)]
    pub github: GitHubConfig,

    /// OpenAI API settings
    #[serde(default)]
    pub openai: OpenAiConfig,

    /// PlantUML rendering server
    #[serde(default)]
    pub plantuml: PlantUmlConfig,

    /// Caps applied before analysis to bound memory and prompt size
    #[serde(default)]
    pub limits: LimitsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebConfig {
    /// Port for the API server
    #[serde(default = "default_port")]
    pub port: u16,

    /// Host to bind to
    #[serde(default = "default_host")]
    pub host: String,
}

/// GitHub OAuth application credentials. Usually supplied through the
/// environment rather than the config file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GitHubConfig {
    #[serde(default)]
    pub client_id: String,

    #[serde(default)]
    pub client_secret: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAiConfig {
    /// API key; empty means the AI generation paths are unavailable
    #[serde(default)]
    pub api_key: String,

    /// Model used for diagram generation
    #[serde(default = "default_model")]
    pub model: String,

    /// API base URL (override for proxies or compatible endpoints)
    #[serde(default = "default_openai_base_url")]
    pub base_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlantUmlConfig {
    /// Base URL of the PlantUML rendering server
    #[serde(default = "default_plantuml_server")]
    pub server_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LimitsConfig {
    /// Maximum number of code files fetched per repository analysis
    #[serde(default = "default_max_files")]
    pub max_files: usize,

    /// Files larger than this many bytes are skipped
    #[serde(default = "default_max_file_size")]
    pub max_file_size: u64,
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

fn default_port() -> u16 {
    3001
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_openai_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_plantuml_server() -> String {
    "http://www.plantuml.com/plantuml".to_string()
}

fn default_max_files() -> usize {
    15
}

fn default_max_file_size() -> u64 {
    100_000
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            host: default_host(),
        }
    }
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: default_model(),
            base_url: default_openai_base_url(),
        }
    }
}

impl Default for PlantUmlConfig {
    fn default() -> Self {
        Self {
            server_url: default_plantuml_server(),
        }
    }
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_files: default_max_files(),
            max_file_size: default_max_file_size(),
        }
    }
}

impl Config {
    /// Load configuration from file, or create default if not found.
    /// Environment variables override file values for secrets and the port.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = path.map(PathBuf::from).or_else(Self::default_config_path);

        let mut config = if let Some(ref path) = config_path {
            if path.exists() {
                let contents = std::fs::read_to_string(path)
                    .with_context(|| format!("Failed to read config from {:?}", path))?;
                toml::from_str(&contents)
                    .with_context(|| format!("Failed to parse config from {:?}", path))?
            } else {
                Config::default()
            }
        } else {
            Config::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// Override secrets and the port from the environment, matching the
    /// variable names the deployment expects.
    fn apply_env_overrides(&mut self) {
        if let Ok(client_id) = std::env::var("GITHUB_CLIENT_ID") {
            self.github.client_id = client_id;
        }
        if let Ok(client_secret) = std::env::var("GITHUB_CLIENT_SECRET") {
            self.github.client_secret = client_secret;
        }
        if let Ok(api_key) = std::env::var("OPENAI_API_KEY") {
            self.openai.api_key = api_key;
        }
        if let Ok(port) = std::env::var("PORT") {
            match port.parse() {
                Ok(port) => self.web.port = port,
                Err(_) => tracing::warn!("Ignoring unparseable PORT value: {}", port),
            }
        }
    }

    /// Save configuration to file
    pub fn save(&self, path: Option<&Path>) -> Result<()> {
        let config_path = path
            .map(PathBuf::from)
            .or_else(Self::default_config_path)
            .context("No config path available")?;

        // Ensure parent directory exists
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
        }

        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(&config_path, contents)
            .with_context(|| format!("Failed to write config to {:?}", config_path))?;

        Ok(())
    }

    /// Get the default configuration file path
    pub fn default_config_path() -> Option<PathBuf> {
        ProjectDirs::from("com", "umlforge", "umlforge")
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Names of required credentials that are still unset, for startup
    /// diagnostics.
    pub fn missing_credentials(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.github.client_id.is_empty() {
            missing.push("GITHUB_CLIENT_ID");
        }
        if self.github.client_secret.is_empty() {
            missing.push("GITHUB_CLIENT_SECRET");
        }
        if self.openai.api_key.is_empty() {
            missing.push("OPENAI_API_KEY");
        }
        missing
    }
}
