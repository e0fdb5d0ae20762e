//! Configuration module
//!
//! Configuration is read once at startup from the environment (and an optional
//! `.env` file) and then handed to each component explicitly. Nothing reads the
//! environment after boot, so tests can build a `Config` pointing at a
//! temporary directory.

use std::env;
use std::path::{Path, PathBuf};

// Common constants
const SERVER_PORT: u16 = 3000;
const UPLOAD_DIR: &str = "uploads";
const MAX_FILE_SIZE_MB: u64 = 500;
const MAX_REQUEST_SIZE_MB: u64 = 2048;
const HTTP_RATE_LIMIT_PER_MINUTE: u32 = 100;
const HTTP_CONCURRENCY_LIMIT: usize = 1024;
const REQUEST_TIMEOUT_SECS: u64 = 300;

const BYTES_PER_MB: u64 = 1024 * 1024;

/// HTTP server settings
#[derive(Clone, Debug)]
pub struct BaseConfig {
    pub server_port: u16,
    pub cors_origins: Vec<String>,
    pub environment: String,
    pub http_rate_limit_per_minute: u32,
    pub http_concurrency_limit: usize,
    pub request_timeout_secs: u64,
    /// Framework-level cap on a whole request body. Kept above the per-file
    /// limit so oversized files are rejected by the validator, not the transport.
    pub max_request_size_bytes: u64,
}

/// Upload storage settings
#[derive(Clone, Debug)]
pub struct StorageConfig {
    pub upload_dir: PathBuf,
    /// Directory for transient export archives; `None` means the system temp dir.
    pub export_dir: Option<PathBuf>,
    pub max_file_size_bytes: u64,
}

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config {
    pub base: BaseConfig,
    pub storage: StorageConfig,
}

impl Config {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup and validate it.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = lookup("ENVIRONMENT")
            .or_else(|| lookup("APP_ENV"))
            .unwrap_or_else(|| "development".to_string());

        let cors_origins: Vec<String> = lookup("CORS_ORIGINS")
            .unwrap_or_else(|| "*".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let server_port = match lookup("PORT") {
            Some(port) => port
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number"))?,
            None => SERVER_PORT,
        };

        let max_file_size_mb = parse_or(&lookup, "MAX_FILE_SIZE_MB", MAX_FILE_SIZE_MB);
        let max_request_size_mb = parse_or(&lookup, "MAX_REQUEST_SIZE_MB", MAX_REQUEST_SIZE_MB);

        let base = BaseConfig {
            server_port,
            cors_origins,
            environment,
            http_rate_limit_per_minute: parse_or(
                &lookup,
                "HTTP_RATE_LIMIT_PER_MINUTE",
                HTTP_RATE_LIMIT_PER_MINUTE,
            ),
            http_concurrency_limit: parse_or(
                &lookup,
                "HTTP_CONCURRENCY_LIMIT",
                HTTP_CONCURRENCY_LIMIT,
            ),
            request_timeout_secs: parse_or(&lookup, "REQUEST_TIMEOUT_SECS", REQUEST_TIMEOUT_SECS),
            max_request_size_bytes: max_request_size_mb.saturating_mul(BYTES_PER_MB),
        };

        let storage = StorageConfig {
            upload_dir: lookup("UPLOAD_DIR")
                .filter(|s| !s.trim().is_empty())
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(UPLOAD_DIR)),
            export_dir: lookup("EXPORT_DIR")
                .filter(|s| !s.trim().is_empty())
                .map(PathBuf::from),
            max_file_size_bytes: max_file_size_mb.saturating_mul(BYTES_PER_MB),
        };

        let config = Config { base, storage };
        config.validate()?;
        Ok(config)
    }

    /// Configuration with defaults rooted at `upload_dir`, for embedding and tests.
    pub fn with_upload_dir(upload_dir: impl Into<PathBuf>) -> Self {
        Config {
            base: BaseConfig {
                server_port: SERVER_PORT,
                cors_origins: vec!["*".to_string()],
                environment: "development".to_string(),
                http_rate_limit_per_minute: HTTP_RATE_LIMIT_PER_MINUTE,
                http_concurrency_limit: HTTP_CONCURRENCY_LIMIT,
                request_timeout_secs: REQUEST_TIMEOUT_SECS,
                max_request_size_bytes: MAX_REQUEST_SIZE_MB * BYTES_PER_MB,
            },
            storage: StorageConfig {
                upload_dir: upload_dir.into(),
                export_dir: None,
                max_file_size_bytes: MAX_FILE_SIZE_MB * BYTES_PER_MB,
            },
        }
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.is_production() && self.base.cors_origins.iter().any(|o| o == "*") {
            return Err(anyhow::anyhow!(
                "CORS_ORIGINS cannot be '*' in production. Please specify explicit origins."
            ));
        }

        if self.storage.max_file_size_bytes == 0 {
            return Err(anyhow::anyhow!("MAX_FILE_SIZE_MB must be greater than 0"));
        }

        if self.base.max_request_size_bytes < self.storage.max_file_size_bytes {
            return Err(anyhow::anyhow!(
                "MAX_REQUEST_SIZE_MB must be at least MAX_FILE_SIZE_MB"
            ));
        }

        if self.base.http_rate_limit_per_minute == 0 {
            return Err(anyhow::anyhow!(
                "HTTP_RATE_LIMIT_PER_MINUTE must be greater than 0"
            ));
        }

        Ok(())
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let env = self.base.environment.to_lowercase();
        env == "production" || env == "prod"
    }

    pub fn server_port(&self) -> u16 {
        self.base.server_port
    }

    pub fn cors_origins(&self) -> &[String] {
        &self.base.cors_origins
    }

    pub fn environment(&self) -> &str {
        &self.base.environment
    }

    pub fn http_rate_limit_per_minute(&self) -> u32 {
        self.base.http_rate_limit_per_minute
    }

    pub fn http_concurrency_limit(&self) -> usize {
        self.base.http_concurrency_limit.max(1)
    }

    pub fn request_timeout_secs(&self) -> u64 {
        self.base.request_timeout_secs.max(1)
    }

    pub fn max_request_size_bytes(&self) -> u64 {
        self.base.max_request_size_bytes
    }

    pub fn upload_dir(&self) -> &Path {
        &self.storage.upload_dir
    }

    pub fn export_dir(&self) -> Option<&Path> {
        self.storage.export_dir.as_deref()
    }

    pub fn max_file_size_bytes(&self) -> u64 {
        self.storage.max_file_size_bytes
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    lookup(key)
        .and_then(|value| value.trim().parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_environment_is_empty() {
        let config = Config::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.upload_dir(), Path::new("uploads"));
        assert_eq!(config.server_port(), 3000);
        assert_eq!(config.max_file_size_bytes(), 500 * 1024 * 1024);
        assert!(config.export_dir().is_none());
        assert!(!config.is_production());
    }

    #[test]
    fn upload_dir_overrides_default() {
        let config =
            Config::from_lookup(lookup_from(&[("UPLOAD_DIR", "/srv/media")])).unwrap();
        assert_eq!(config.upload_dir(), Path::new("/srv/media"));
    }

    #[test]
    fn invalid_port_is_rejected() {
        let result = Config::from_lookup(lookup_from(&[("PORT", "not-a-port")]));
        assert!(result.is_err());
    }

    #[test]
    fn wildcard_cors_rejected_in_production() {
        let result = Config::from_lookup(lookup_from(&[("ENVIRONMENT", "production")]));
        assert!(result.is_err());

        let config = Config::from_lookup(lookup_from(&[
            ("ENVIRONMENT", "prod"),
            ("CORS_ORIGINS", "https://app.example.com, https://m.example.com"),
        ]))
        .unwrap();
        assert!(config.is_production());
        assert_eq!(config.cors_origins().len(), 2);
    }

    #[test]
    fn request_cap_must_cover_file_limit() {
        let result = Config::from_lookup(lookup_from(&[
            ("MAX_FILE_SIZE_MB", "100"),
            ("MAX_REQUEST_SIZE_MB", "10"),
        ]));
        assert!(result.is_err());
    }

    #[test]
    fn unparsable_numbers_fall_back_to_defaults() {
        let config = Config::from_lookup(lookup_from(&[
            ("HTTP_RATE_LIMIT_PER_MINUTE", "lots"),
            ("REQUEST_TIMEOUT_SECS", "-1"),
        ]))
        .unwrap();
        assert_eq!(config.http_rate_limit_per_minute(), 100);
        assert_eq!(config.request_timeout_secs(), 300);
    }
}
