use std::env;
use std::time::Duration;

/// Database configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub acquire_timeout_secs: u64,
    pub idle_timeout_secs: u64,
    pub max_lifetime_secs: u64,
    pub test_before_acquire: bool,
    pub migrations_path: String,
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

impl LogFormat {
    pub fn from_str(s: &str) -> Result<Self, String> {
        match s.to_lowercase().as_str() {
            "pretty" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            _ => Err(format!("Invalid LOG_FORMAT: {}. Must be one of: pretty, json", s)),
        }
    }
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// `None` runs the service on the in-memory store
    pub database: Option<DatabaseConfig>,
    pub log_level: String,
    pub log_format: LogFormat,
    pub http_port: u16,
    pub environment: String,
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> Result<T, String> {
    parse_value(key, env::var(key).ok(), default)
}

/// Unset keeps the default; a value that does not parse is an error.
fn parse_value<T: std::str::FromStr>(
    key: &str,
    raw: Option<String>,
    default: T,
) -> Result<T, String> {
    match raw {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|_| format!("Invalid {}: {}", key, raw)),
        None => Ok(default),
    }
}

impl DatabaseConfig {
    /// Create database config from environment variables.
    /// Returns `Ok(None)` when `DATABASE_URL` is not set.
    pub fn from_env() -> Result<Option<Self>, String> {
        let url = match env::var("DATABASE_URL") {
            Ok(url) if !url.trim().is_empty() => url,
            _ => return Ok(None),
        };

        let config = Self {
            url,
            max_connections: env_parse("DATABASE_MAX_CONNECTIONS", 10)?,
            acquire_timeout_secs: env_parse("DATABASE_ACQUIRE_TIMEOUT_SECS", 30)?,
            idle_timeout_secs: env_parse("DATABASE_IDLE_TIMEOUT_SECS", 600)?, // 10 minutes
            max_lifetime_secs: env_parse("DATABASE_MAX_LIFETIME_SECS", 1800)?, // 30 minutes
            test_before_acquire: env_parse("DATABASE_TEST_BEFORE_ACQUIRE", true)?,
            migrations_path: env::var("MIGRATIONS_PATH")
                .unwrap_or_else(|_| "./migrations".to_string()),
        };
        config.validate()?;
        Ok(Some(config))
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.max_connections == 0 {
            return Err("DATABASE_MAX_CONNECTIONS must be greater than 0".to_string());
        }
        if self.acquire_timeout_secs == 0 {
            return Err("DATABASE_ACQUIRE_TIMEOUT_SECS must be greater than 0".to_string());
        }
        Ok(())
    }

    /// Get acquire timeout as Duration
    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_secs(self.acquire_timeout_secs)
    }

    /// Get idle timeout as Duration
    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_timeout_secs)
    }

    /// Get max lifetime as Duration
    pub fn max_lifetime(&self) -> Duration {
        Duration::from_secs(self.max_lifetime_secs)
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "postgresql://localhost/tipster".to_string(),
            max_connections: 10,
            acquire_timeout_secs: 30,
            idle_timeout_secs: 600,
            max_lifetime_secs: 1800,
            test_before_acquire: true,
            migrations_path: "./migrations".to_string(),
        }
    }
}

impl AppConfig {
    /// Create application config from environment variables
    pub fn from_env() -> Result<Self, String> {
        let database = DatabaseConfig::from_env()?;

        let log_level = env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
        let log_format =
            LogFormat::from_str(&env::var("LOG_FORMAT").unwrap_or_else(|_| "pretty".to_string()))?;

        let http_port = env_parse("HTTP_PORT", 8000u16)?;

        let environment = env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string());

        // Validate log level
        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&log_level.to_lowercase().as_str()) {
            return Err(format!(
                "Invalid LOG_LEVEL: {}. Must be one of: {:?}",
                log_level, valid_log_levels
            ));
        }

        // Validate environment
        let valid_environments = ["development", "staging", "production"];
        if !valid_environments.contains(&environment.to_lowercase().as_str()) {
            return Err(format!(
                "Invalid ENVIRONMENT: {}. Must be one of: {:?}",
                environment, valid_environments
            ));
        }

        let config = Self {
            database,
            log_level: log_level.to_lowercase(),
            log_format,
            http_port,
            environment: environment.to_lowercase(),
        };

        if config.is_production() && config.database.is_none() {
            return Err("DATABASE_URL is required in production".to_string());
        }

        Ok(config)
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// Check if running in development
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }

    /// Get database URL (convenience method)
    pub fn database_url(&self) -> Option<&str> {
        self.database.as_ref().map(|db| db.url.as_str())
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database: None,
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            http_port: 8000,
            environment: "development".to_string(),
        }
    }
}
