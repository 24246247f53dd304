//! Configuration management
//!
//! Loads configuration from:
//! 1. Default values
//! 2. Configuration file (config/local.toml)
//! 3. Environment variables (override)
//! 4. `NEYNAR_API_KEY` / `OPENAI_API_KEY` (override)

use serde::Deserialize;
use std::path::PathBuf;

use crate::error::AppError;

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub neynar: NeynarConfig,
    pub openai: OpenAiConfig,
    #[serde(default)]
    pub launch: LaunchConfig,
    pub http: HttpConfig,
    pub logging: LoggingConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Bind address (e.g., "127.0.0.1")
    pub host: String,
    /// Port number (e.g., 8080)
    pub port: u16,
}

impl ServerConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Cast indexing API (Neynar)
#[derive(Debug, Clone, Deserialize)]
pub struct NeynarConfig {
    pub api_key: Option<String>,
    /// e.g., "https://api.neynar.com"
    pub base_url: String,
}

/// Generation API (OpenAI-compatible chat completions)
#[derive(Debug, Clone, Deserialize)]
pub struct OpenAiConfig {
    pub api_key: Option<String>,
    /// e.g., "https://api.openai.com/v1"
    pub base_url: String,
}

/// Host launch context
#[derive(Debug, Clone, Deserialize, Default)]
pub struct LaunchConfig {
    /// JSON launch descriptor written by the embedding host.
    /// When unset the app always starts on the paste screen.
    pub context_path: Option<PathBuf>,
}

/// Outbound HTTP client settings
#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    /// Transport timeout for upstream calls
    pub timeout_seconds: u64,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    pub level: String,
    /// Log format: "pretty" or "json"
    pub format: String,
}

impl AppConfig {
    /// Load configuration from file and environment
    ///
    /// # Loading Order
    /// 1. Default values
    /// 2. config/default.toml (if exists)
    /// 3. config/local.toml (if exists)
    /// 4. Environment variables (ELI5CAST__*)
    /// 5. NEYNAR_API_KEY / OPENAI_API_KEY
    ///
    /// # Errors
    /// Returns `ConfigMissing` if either API key is absent, `Config`
    /// if the configuration is otherwise invalid
    pub fn load() -> Result<Self, AppError> {
        use config::{Config, Environment, File};

        let config = Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8080)?
            .set_default("neynar.base_url", "https://api.neynar.com")?
            .set_default("openai.base_url", "https://api.openai.com/v1")?
            .set_default("http.timeout_seconds", 30)?
            .set_default("logging.level", "info")?
            .set_default("logging.format", "pretty")?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            .add_source(
                Environment::with_prefix("ELI5CAST")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_override_option("neynar.api_key", std::env::var("NEYNAR_API_KEY").ok())?
            .set_override_option("openai.api_key", std::env::var("OPENAI_API_KEY").ok())?
            .build()
            .map_err(|e| AppError::Config(e.to_string()))?;

        let app_config: Self = config
            .try_deserialize()
            .map_err(|e| AppError::Config(e.to_string()))?;
        app_config.validate()?;
        Ok(app_config)
    }

    /// Fail fast when a secret is missing, before any client is built.
    pub fn validate(&self) -> Result<(), AppError> {
        self.neynar_api_key()?;
        self.openai_api_key()?;

        for (name, base_url) in [
            ("neynar.base_url", &self.neynar.base_url),
            ("openai.base_url", &self.openai.base_url),
        ] {
            url::Url::parse(base_url)
                .map_err(|e| AppError::Config(format!("{name} is not a valid URL: {e}")))?;
        }

        if self.http.timeout_seconds == 0 {
            return Err(AppError::Config(
                "http.timeout_seconds must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    pub fn neynar_api_key(&self) -> Result<&str, AppError> {
        non_blank(self.neynar.api_key.as_deref())
            .ok_or_else(|| AppError::ConfigMissing("Neynar".to_string()))
    }

    pub fn openai_api_key(&self) -> Result<&str, AppError> {
        non_blank(self.openai.api_key.as_deref())
            .ok_or_else(|| AppError::ConfigMissing("OpenAI".to_string()))
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> AppConfig {
        AppConfig {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
            },
            neynar: NeynarConfig {
                api_key: Some("neynar-test-key".to_string()),
                base_url: "https://api.neynar.com".to_string(),
            },
            openai: OpenAiConfig {
                api_key: Some("openai-test-key".to_string()),
                base_url: "https://api.openai.com/v1".to_string(),
            },
            launch: LaunchConfig::default(),
            http: HttpConfig {
                timeout_seconds: 30,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                format: "pretty".to_string(),
            },
        }
    }

    #[test]
    fn valid_config_passes() {
        assert!(valid_config().validate().is_ok());
    }

    #[test]
    fn missing_neynar_key_fails_fast() {
        let mut config = valid_config();
        config.neynar.api_key = None;

        let err = config.validate().unwrap_err();
        assert!(matches!(err, AppError::ConfigMissing(ref name) if name == "Neynar"));
    }

    #[test]
    fn blank_openai_key_counts_as_missing() {
        let mut config = valid_config();
        config.openai.api_key = Some("   ".to_string());

        let err = config.validate().unwrap_err();
        assert!(matches!(err, AppError::ConfigMissing(ref name) if name == "OpenAI"));
    }

    #[test]
    fn rejects_malformed_base_url() {
        let mut config = valid_config();
        config.openai.base_url = "not a url".to_string();

        assert!(matches!(config.validate(), Err(AppError::Config(_))));
    }

    #[test]
    fn rejects_zero_timeout() {
        let mut config = valid_config();
        config.http.timeout_seconds = 0;

        assert!(matches!(config.validate(), Err(AppError::Config(_))));
    }

    #[test]
    fn bind_addr_joins_host_and_port() {
        assert_eq!(valid_config().server.bind_addr(), "127.0.0.1:8080");
    }
}
