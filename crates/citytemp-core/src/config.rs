use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use url::Url;

use crate::error::ConfigError;

/// Optional settings file looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = "citytemp.toml";

/// Optional dotenv file looked up in the working directory.
pub const ENV_FILE_NAME: &str = ".env";

pub const DEFAULT_WEATHER_API_URL: &str = "http://api.weatherapi.com/v1";
pub const DEFAULT_DATABASE_URL: &str = "sqlite://citytemp.db";
pub const DEFAULT_PROJECT_NAME: &str = "citytemp";
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8000";

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

/// Result of settings validation
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

    /// Get a single-line summary of all errors
    pub fn error_summary(&self) -> String {
        self.errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ")
    }
}

/// Process settings, read once at startup and handed to the components
/// that need them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Key for the weather provider (`WEATHER_API_KEY`)
    pub weather_api_key: String,

    /// Base URL of the weather provider (`WEATHER_API_URL`)
    pub weather_api_url: String,

    /// Storage connection string (`DATABASE_URL`)
    pub database_url: String,

    /// Label reported by the health endpoint (`PROJECT_NAME`)
    pub project_name: String,

    /// Address the HTTP server listens on (`BIND_ADDR`)
    pub bind_addr: String,
}

/// Where the SQLite database lives, parsed from `database_url`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatabaseLocation {
    Memory,
    File(PathBuf),
}

impl Settings {
    /// Load settings from the working directory's `citytemp.toml` and `.env`
    /// (both optional) and the process environment.
    ///
    /// Precedence, highest first: process environment, `.env`, `citytemp.toml`.
    pub fn load() -> Result<Self> {
        let vars = std::env::vars_os()
            .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)))
            .collect();
        Self::load_from(Path::new("."), vars)
    }

    /// Load settings with `dir` holding `citytemp.toml` and `.env`, and
    /// `vars` standing in for the process environment.
    pub fn load_from(dir: &Path, vars: HashMap<String, String>) -> Result<Self> {
        let mut merged = read_env_file(&dir.join(ENV_FILE_NAME))?;
        merged.extend(vars);
        Self::build(Some(&dir.join(CONFIG_FILE_NAME)), Some(merged))
    }

    /// Load settings from an explicit variable map instead of the process environment.
    pub fn from_vars(vars: HashMap<String, String>) -> Result<Self> {
        Self::build(None, Some(vars))
    }

    fn build(file: Option<&Path>, vars: Option<HashMap<String, String>>) -> Result<Self> {
        let mut builder = config::Config::builder()
            .set_default("weather_api_key", "")?
            .set_default("weather_api_url", DEFAULT_WEATHER_API_URL)?
            .set_default("database_url", DEFAULT_DATABASE_URL)?
            .set_default("project_name", DEFAULT_PROJECT_NAME)?
            .set_default("bind_addr", DEFAULT_BIND_ADDR)?;

        if let Some(path) = file {
            builder = builder.add_source(config::File::from(path).required(false));
        }

        let env_source = vars.map(|v| v.into_iter().collect::<config::Map<String, String>>());
        builder = builder.add_source(config::Environment::default().source(env_source));

        let settings: Settings = builder
            .build()
            .context("Failed to read settings")?
            .try_deserialize()
            .context("Failed to parse settings")?;

        Ok(settings)
    }

    /// Load settings and validate them
    ///
    /// Warnings are logged; errors fail the load.
    pub fn load_validated() -> Result<(Self, ValidationResult)> {
        let settings = Self::load()?;
        let validation = settings.validate();

        if !validation.is_valid() {
            return Err(ConfigError::Invalid(validation.error_summary()).into());
        }

        for warning in &validation.warnings {
            tracing::warn!("Settings warning: {}", warning);
        }

        Ok((settings, validation))
    }

    /// Validate the settings
    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::default();

        if self.weather_api_key.trim().is_empty() {
            result.add_error("weather_api_key", "WEATHER_API_KEY must be set");
        }

        self.validate_url(&self.weather_api_url, "weather_api_url", &mut result);

        if let Err(e) = self.database_location() {
            result.add_error("database_url", e.to_string());
        }

        if self.bind_addr.parse::<SocketAddr>().is_err() {
            result.add_error(
                "bind_addr",
                format!("Not a socket address: {}", self.bind_addr),
            );
        }

        if self.project_name.trim().is_empty() {
            result.add_warning("project_name", "Project name is empty");
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

    /// Parse `database_url` into a SQLite location.
    ///
    /// Accepts `sqlite://<path>`, `sqlite:<path>`, a bare path, or `:memory:`.
    pub fn database_location(&self) -> Result<DatabaseLocation, ConfigError> {
        let raw = self.database_url.trim();
        if raw.is_empty() {
            return Err(ConfigError::MissingSetting("DATABASE_URL".to_string()));
        }

        let rest = if let Some(rest) = raw.strip_prefix("sqlite://") {
            rest
        } else if let Some(rest) = raw.strip_prefix("sqlite:") {
            rest
        } else if let Some((scheme, _)) = raw.split_once("://") {
            return Err(ConfigError::Invalid(format!(
                "Unsupported database scheme: {}",
                scheme
            )));
        } else {
            raw
        };

        match rest {
            "" => Err(ConfigError::Invalid("Database path is empty".to_string())),
            ":memory:" => Ok(DatabaseLocation::Memory),
            path => Ok(DatabaseLocation::File(PathBuf::from(path))),
        }
    }

    /// Socket address for the HTTP server
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        self.bind_addr
            .parse()
            .map_err(|_| ConfigError::Invalid(format!("Not a socket address: {}", self.bind_addr)))
    }
}

/// Variables from a dotenv file; a missing file yields none.
fn read_env_file(path: &Path) -> Result<HashMap<String, String>> {
    let entries = match dotenvy::from_path_iter(path) {
        Ok(entries) => entries,
        Err(e) if e.not_found() => return Ok(HashMap::new()),
        Err(e) => {
            return Err(e).with_context(|| format!("Failed to open {}", path.display()));
        }
    };

    let vars = entries
        .collect::<Result<HashMap<_, _>, _>>()
        .with_context(|| format!("Failed to parse {}", path.display()))?;
    tracing::debug!("Read {} variables from {}", vars.len(), path.display());
    Ok(vars)
}
