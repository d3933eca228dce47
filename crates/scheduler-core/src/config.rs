use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

/// Default Teamup API host.
pub const TEAMUP_API_BASE: &str = "https://api.teamup.com";

/// Environment variable overriding `teamup.api_key`.
pub const ENV_API_KEY: &str = "TEAMUP_API_KEY";
/// Environment variable overriding `teamup.password`.
pub const ENV_PASSWORD: &str = "TEAMUP_PASSWORD";

/// Configuration validation errors
#[derive(Debug, Clone)]
pub struct ConfigValidationError {
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Result of config validation
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationResult {
    /// Returns true if there are no errors (warnings are OK)
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    pub fn add_warning(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Get a user-friendly message summarizing all errors
    pub fn error_summary(&self) -> String {
        self.errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ")
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Teamup backend settings
    #[serde(default)]
    pub teamup: TeamupConfig,
}

/// Credentials and room binding for the Teamup backend.
#[derive(Clone, Serialize, Deserialize)]
pub struct TeamupConfig {
    /// API key sent as `Teamup-Token`
    pub api_key: String,

    /// Calendar password sent as `Teamup-Password` (only for protected calendars)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,

    /// Teamup calendar key, the account-level identifier
    pub calendar_id: String,

    /// Name of the sub-calendar representing the room
    pub room_id: String,

    /// API host, overridable for proxies and tests
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout in seconds (0 disables the timeout)
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_base_url() -> String {
    TEAMUP_API_BASE.to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}

impl Default for TeamupConfig {
    fn default() -> Self {
        Self {
            api_key: "YOUR_TEAMUP_API_KEY".to_string(),
            password: None,
            calendar_id: String::new(),
            room_id: String::new(),
            base_url: default_base_url(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

// Hand-written so credentials never end up in logs.
impl std::fmt::Debug for TeamupConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TeamupConfig")
            .field("api_key", &"<redacted>")
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("calendar_id", &self.calendar_id)
            .field("room_id", &self.room_id)
            .field("base_url", &self.base_url)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .finish()
    }
}

impl TeamupConfig {
    /// Check if the API key is set to something other than the placeholder
    pub fn is_configured(&self) -> bool {
        !self.api_key.is_empty() && !self.api_key.starts_with("YOUR_")
    }

    /// Password to send, treating an empty string as none.
    pub fn effective_password(&self) -> Option<&str> {
        self.password.as_deref().filter(|p| !p.is_empty())
    }
}

impl Config {
    /// Load configuration from the default location, creating it if it doesn't exist
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            let config = Self::default();
            config.save_to(&config_path)?;
            tracing::info!("Wrote default configuration to {}", config_path.display());
            return Self::load_from(&config_path);
        }

        Self::load_from(&config_path)
    }

    /// Load configuration from a specific file and apply environment overrides
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;

        let mut config: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;

        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Load configuration and validate it
    ///
    /// Returns an error if validation fails with critical errors.
    pub fn load_validated(path: Option<&Path>) -> Result<(Self, ValidationResult)> {
        let config = match path {
            Some(path) => Self::load_from(path)?,
            None => Self::load()?,
        };
        let validation = config.validate();

        if !validation.is_valid() {
            anyhow::bail!(
                "Configuration validation failed: {}",
                validation.error_summary()
            );
        }

        for warning in &validation.warnings {
            tracing::warn!("Config warning: {}", warning);
        }

        Ok((config, validation))
    }

    /// Replace secrets with values from the environment when present.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(key) = lookup(ENV_API_KEY).filter(|k| !k.is_empty()) {
            self.teamup.api_key = key;
        }
        if let Some(password) = lookup(ENV_PASSWORD) {
            self.teamup.password = Some(password);
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::default();
        let teamup = &self.teamup;

        if teamup.api_key.is_empty() {
            result.add_error("teamup.api_key", "API key must not be empty");
        } else if !teamup.is_configured() {
            result.add_warning(
                "teamup.api_key",
                format!("API key is a placeholder; set it or export {}", ENV_API_KEY),
            );
        }

        if teamup.calendar_id.trim().is_empty() {
            result.add_error("teamup.calendar_id", "Calendar ID must not be empty");
        }

        if teamup.room_id.is_empty() {
            result.add_error("teamup.room_id", "Room ID must not be empty");
        }

        self.validate_url(&teamup.base_url, "teamup.base_url", &mut result);

        if teamup.request_timeout_secs == 0 {
            result.add_warning(
                "teamup.request_timeout_secs",
                "Request timeout disabled (0 seconds)",
            );
        }

        result
    }

    fn validate_url(&self, url_str: &str, field_name: &str, result: &mut ValidationResult) {
        match Url::parse(url_str) {
            Ok(url) => {
                if url.scheme() != "http" && url.scheme() != "https" {
                    result.add_error(
                        field_name,
                        format!("URL must use http or https scheme, got: {}", url.scheme()),
                    );
                }

                if url.host().is_none() {
                    result.add_error(field_name, "URL must have a host");
                }
            }
            Err(e) => {
                result.add_error(field_name, format!("Invalid URL: {}", e));
            }
        }
    }

    /// Save configuration to a file, creating parent directories as needed
    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;

        std::fs::write(config_path, contents).context("Failed to write config file")?;

        Ok(())
    }

    /// Get the path to the configuration file
    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Failed to get config directory")?
            .join("scheduler");

        Ok(config_dir.join("config.toml"))
    }
}
