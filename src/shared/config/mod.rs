//! Application configuration module
//!
//! Settings come from the environment (`DATABASE_URL`, `PORT`,
//! `CORS_ORIGINS`, `DATABASE_MAX_CONNECTIONS`) or are assembled with
//! [`AppConfigBuilder`] in tests and embedding code.

use thiserror::Error;

/// Port the server listens on when `PORT` is unset
pub const DEFAULT_PORT: u16 = 3001;
/// Origin allowed by CORS when `CORS_ORIGINS` is unset
pub const DEFAULT_CORS_ORIGIN: &str = "http://localhost:5173";
/// Pool size when `DATABASE_MAX_CONNECTIONS` is unset
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// Application configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Store location, e.g. `sqlite://syllabus.db`. `None` disables every
    /// database-backed route.
    pub database_url: Option<String>,
    pub port: u16,
    pub cors_origins: Vec<String>,
    pub max_connections: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_url: None,
            port: DEFAULT_PORT,
            cors_origins: vec![DEFAULT_CORS_ORIGIN.to_string()],
            max_connections: DEFAULT_MAX_CONNECTIONS,
        }
    }
}

impl AppConfig {
    /// Create a new AppConfigBuilder
    pub fn builder() -> AppConfigBuilder {
        AppConfigBuilder::default()
    }

    /// Read the configuration from process environment variables
    pub fn from_env() -> Result<AppConfig, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read the configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<AppConfig, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut builder = AppConfig::builder();

        if let Some(url) = lookup("DATABASE_URL").filter(|url| !url.trim().is_empty()) {
            builder = builder.database_url(url.trim().to_string());
        }

        if let Some(port) = lookup("PORT") {
            let port = port
                .trim()
                .parse::<u16>()
                .map_err(|_| ConfigError::InvalidNumber("PORT", port.clone()))?;
            builder = builder.port(port);
        }

        if let Some(origins) = lookup("CORS_ORIGINS") {
            builder = builder.cors_origins(parse_origins(&origins));
        }

        if let Some(max) = lookup("DATABASE_MAX_CONNECTIONS") {
            let max = max
                .trim()
                .parse::<u32>()
                .map_err(|_| ConfigError::InvalidNumber("DATABASE_MAX_CONNECTIONS", max.clone()))?;
            builder = builder.max_connections(max);
        }

        builder.build()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.port == 0 {
            return Err(ConfigError::MissingValue("PORT"));
        }
        if self.max_connections == 0 {
            return Err(ConfigError::MissingValue("DATABASE_MAX_CONNECTIONS"));
        }
        if let Some(origin) = self
            .cors_origins
            .iter()
            .find(|origin| !origin.starts_with("http://") && !origin.starts_with("https://"))
        {
            return Err(ConfigError::InvalidUrl(origin.clone()));
        }
        Ok(())
    }

    /// Whether a store location was configured
    pub fn database_configured(&self) -> bool {
        self.database_url.is_some()
    }
}

/// Split a comma separated origin list, dropping blanks
pub fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(str::to_string)
        .collect()
}

/// Builder for AppConfig
#[derive(Debug, Default)]
pub struct AppConfigBuilder {
    database_url: Option<String>,
    port: Option<u16>,
    cors_origins: Option<Vec<String>>,
    max_connections: Option<u32>,
}

impl AppConfigBuilder {
    /// Set the store location
    pub fn database_url(mut self, url: impl Into<String>) -> Self {
        self.database_url = Some(url.into());
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    pub fn cors_origins(mut self, origins: Vec<String>) -> Self {
        self.cors_origins = Some(origins);
        self
    }

    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = Some(max);
        self
    }

    /// Build and validate the configuration
    pub fn build(self) -> Result<AppConfig, ConfigError> {
        let defaults = AppConfig::default();
        let config = AppConfig {
            database_url: self.database_url,
            port: self.port.unwrap_or(defaults.port),
            cors_origins: self.cors_origins.unwrap_or(defaults.cors_origins),
            max_connections: self.max_connections.unwrap_or(defaults.max_connections),
        };
        config.validate()?;
        Ok(config)
    }
}

/// Configuration errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid URL: {0}")]
    InvalidUrl(String),
    #[error("missing value: {0}")]
    MissingValue(&'static str),
    #[error("{0} must be a number, got '{1}'")]
    InvalidNumber(&'static str, String),
}
