//! Pipeline configuration.
//!
//! One TOML file binds the run-scoped object key and the connection
//! parameters of both stores:
//!
//! ```toml
//! [run]
//! s3_key = "prefix/stock.csv"
//!
//! [s3]
//! bucket = "dagster"
//! access_key = "test"
//! secret_key = "test"
//! endpoint_url = "http://localstack:4566"
//!
//! [redis]
//! host = "redis"
//! port = 6379
//! ```
//!
//! The config is built once before a run starts and only borrowed afterwards.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Placeholder printed instead of the secret key.
pub const REDACTED: &str = "***";

/// Errors from loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("read config file '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("serialize config TOML: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Complete configuration for one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineConfig {
    #[serde(default)]
    pub run: RunConfig,
    pub s3: S3Config,
    pub redis: RedisConfig,
}

/// Run-scoped parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunConfig {
    /// Key of the object to fetch.
    #[serde(default)]
    pub s3_key: String,
}

/// Object-store connection parameters.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct S3Config {
    pub bucket: String,
    pub access_key: String,
    pub secret_key: String,
    pub endpoint_url: String,
    #[serde(default = "default_region")]
    pub region: String,
}

/// Key-value store connection parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedisConfig {
    pub host: String,
    #[serde(default = "default_redis_port")]
    pub port: u16,
}

fn default_region() -> String {
    "us-east-1".into()
}

fn default_redis_port() -> u16 {
    6379
}

impl fmt::Debug for S3Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("S3Config")
            .field("bucket", &self.bucket)
            .field("access_key", &self.access_key)
            .field("secret_key", &REDACTED)
            .field("endpoint_url", &self.endpoint_url)
            .field("region", &self.region)
            .finish()
    }
}

impl RedisConfig {
    /// Connection URL in the form the `redis` crate expects.
    pub fn url(&self) -> String {
        if self.host.contains(':') {
            format!("redis://[{}]:{}/", self.host, self.port)
        } else {
            format!("redis://{}:{}/", self.host, self.port)
        }
    }
}

impl PipelineConfig {
    /// Load a config from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parse a config from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// The docker-compose deployment: LocalStack S3 and a `redis` service.
    pub fn docker(s3_key: impl Into<String>) -> Self {
        Self {
            run: RunConfig {
                s3_key: s3_key.into(),
            },
            s3: S3Config {
                bucket: "dagster".into(),
                access_key: "test".into(),
                secret_key: "test".into(),
                endpoint_url: "http://localstack:4566".into(),
                region: default_region(),
            },
            redis: RedisConfig {
                host: "redis".into(),
                port: default_redis_port(),
            },
        }
    }

    /// Replace the object key. Only meaningful before the run starts.
    pub fn with_s3_key(mut self, s3_key: impl Into<String>) -> Self {
        self.run.s3_key = s3_key.into();
        self
    }

    /// Check that every field a run needs is present and well-formed.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let required = [
            ("run.s3_key", &self.run.s3_key),
            ("s3.bucket", &self.s3.bucket),
            ("s3.endpoint_url", &self.s3.endpoint_url),
            ("s3.region", &self.s3.region),
            ("redis.host", &self.redis.host),
        ];
        for (name, value) in required {
            if value.trim().is_empty() {
                return Err(ConfigError::Invalid(format!("{name} must not be empty")));
            }
        }

        let endpoint = self.s3.endpoint_url.as_str();
        if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
            return Err(ConfigError::Invalid(format!(
                "s3.endpoint_url must start with http:// or https:// (got '{endpoint}')"
            )));
        }

        if self.redis.port == 0 {
            return Err(ConfigError::Invalid("redis.port must be non-zero".into()));
        }

        Ok(())
    }

    /// Copy safe to print: the secret key is replaced by `***`.
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        copy.s3.secret_key = REDACTED.into();
        copy
    }

    /// Render as TOML with the secret key redacted.
    pub fn to_redacted_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(&self.redacted())?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL: &str = r#"
[run]
s3_key = "prefix/stock.csv"

[s3]
bucket = "dagster"
access_key = "test"
secret_key = "hunter2"
endpoint_url = "http://localstack:4566"

[redis]
host = "redis"
port = 6380
"#;

    #[test]
    fn parses_full_file() {
        let config = PipelineConfig::from_toml(FULL).unwrap();
        assert_eq!(config.run.s3_key, "prefix/stock.csv");
        assert_eq!(config.s3.bucket, "dagster");
        assert_eq!(config.s3.region, "us-east-1");
        assert_eq!(config.redis.port, 6380);
        config.validate().unwrap();
    }

    #[test]
    fn run_table_and_port_are_optional() {
        let toml = r#"
[s3]
bucket = "b"
access_key = "a"
secret_key = "s"
endpoint_url = "https://s3.amazonaws.com"
region = "eu-west-1"

[redis]
host = "localhost"
"#;
        let config = PipelineConfig::from_toml(toml).unwrap();
        assert_eq!(config.run.s3_key, "");
        assert_eq!(config.redis.port, 6379);
        assert_eq!(config.s3.region, "eu-west-1");
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let config = config.with_s3_key("k.csv");
        config.validate().unwrap();
    }

    #[test]
    fn missing_store_table_is_parse_error() {
        let err = PipelineConfig::from_toml("[run]\ns3_key = \"k\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn docker_profile_matches_compose_services() {
        let config = PipelineConfig::docker("week_4/stock.csv");
        assert_eq!(config.s3.endpoint_url, "http://localstack:4566");
        assert_eq!(config.s3.bucket, "dagster");
        assert_eq!(config.redis.url(), "redis://redis:6379/");
        config.validate().unwrap();
    }

    #[test]
    fn rejects_endpoint_without_scheme() {
        let mut config = PipelineConfig::docker("k");
        config.s3.endpoint_url = "localstack:4566".into();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("endpoint_url"));
    }

    #[test]
    fn rejects_zero_port() {
        let mut config = PipelineConfig::docker("k");
        config.redis.port = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn ipv6_redis_host_is_bracketed() {
        let redis = RedisConfig {
            host: "::1".into(),
            port: 6379,
        };
        assert_eq!(redis.url(), "redis://[::1]:6379/");
    }

    #[test]
    fn secret_never_printed() {
        let config = PipelineConfig::from_toml(FULL).unwrap();
        assert!(!format!("{config:?}").contains("hunter2"));

        let rendered = config.to_redacted_toml().unwrap();
        assert!(!rendered.contains("hunter2"));
        assert!(rendered.contains(REDACTED));

        let back = PipelineConfig::from_toml(&rendered).unwrap();
        assert_eq!(back.s3.bucket, config.s3.bucket);
    }

    #[test]
    fn from_file_reports_path() {
        let err = PipelineConfig::from_file(Path::new("/nonexistent/stockpeak.toml")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/stockpeak.toml"));
    }
}
