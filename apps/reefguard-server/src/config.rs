//! Server configuration.
//!
//! Sources are layered, later ones win:
//!
//! 1. Built-in defaults
//! 2. YAML file passed with `--config`
//! 3. Environment variables prefixed with `REEFGUARD__`, nested keys split
//!    on `__` (e.g. `REEFGUARD__SERVER__BIND_ADDR=0.0.0.0:8087`)

use std::collections::HashSet;
use std::net::{Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Yaml};
use reef_auth::{AuthConfig, AuthNMode};
use reef_catalog::CatalogConfig;
use serde::{Deserialize, Serialize};

pub const ENV_PREFIX: &str = "REEFGUARD__";

const DEFAULT_PORT: u16 = 8087;
const DEFAULT_BODY_LIMIT_BYTES: usize = 1024 * 1024;
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("failed to load configuration: {0}")]
    Load(#[from] Box<figment::Error>),

    #[error("invalid configuration: {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

impl ConfigError {
    fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub auth: AuthConfig,
    pub catalog: CatalogConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    /// Requests still running after this many seconds get 504.
    pub request_timeout_secs: u64,
    pub body_limit_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from((Ipv4Addr::LOCALHOST, DEFAULT_PORT)),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            body_limit_bytes: DEFAULT_BODY_LIMIT_BYTES,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    /// `EnvFilter` directive; `RUST_LOG` takes precedence when set.
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_owned(),
            format: LogFormat::Text,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl AppConfig {
    /// Load configuration from defaults, an optional YAML file and the
    /// environment.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::NotFound`] if `path` is given but does not exist
    /// - [`ConfigError::Load`] on malformed input or unknown keys
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = path
            && !path.is_file()
        {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }
        figment(path).extract().map_err(|e| ConfigError::Load(Box::new(e)))
    }

    /// Semantic checks serde cannot express.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Invalid`] naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.request_timeout_secs == 0 {
            return Err(ConfigError::invalid(
                "server.request_timeout_secs",
                "must be greater than zero",
            ));
        }
        if self.server.body_limit_bytes == 0 {
            return Err(ConfigError::invalid(
                "server.body_limit_bytes",
                "must be greater than zero",
            ));
        }
        if !self.auth.login_url.starts_with('/') {
            return Err(ConfigError::invalid(
                "auth.login_url",
                "must be an absolute path",
            ));
        }

        let mut seen = HashSet::new();
        for mapping in &self.auth.tokens {
            if mapping.token.is_empty() {
                return Err(ConfigError::invalid("auth.tokens", "token must not be empty"));
            }
            if !seen.insert(mapping.token.as_str()) {
                return Err(ConfigError::invalid(
                    "auth.tokens",
                    format!("duplicate token for user '{}'", mapping.identity.username),
                ));
            }
        }
        if self.auth.mode == AuthNMode::StaticTokens && self.auth.tokens.is_empty() {
            tracing::warn!("No static tokens configured; every request will be anonymous");
        }
        Ok(())
    }
}

fn figment(path: Option<&Path>) -> Figment {
    let mut figment = Figment::from(Serialized::defaults(AppConfig::default()));
    if let Some(path) = path {
        figment = figment.merge(Yaml::file(path));
    }
    figment.merge(Env::prefixed(ENV_PREFIX).split("__"))
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use std::io::Write;

    use figment::Jail;
    use reef_auth::{IdentityConfig, TokenMapping};
    use reef_guard::DEFAULT_LOGIN_URL;

    use super::*;

    fn yaml_file(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn defaults_without_file() {
        Jail::expect_with(|_| {
            let config = AppConfig::load(None).unwrap();

            assert_eq!(config.server.bind_addr.port(), DEFAULT_PORT);
            assert_eq!(config.auth.login_url, DEFAULT_LOGIN_URL);
            assert_eq!(config.auth.mode, AuthNMode::StaticTokens);
            assert_eq!(config.catalog, CatalogConfig::default());
            config.validate().unwrap();
            Ok(())
        });
    }

    #[test]
    fn yaml_file_overrides_defaults() {
        let file = yaml_file(
            r"
server:
  bind_addr: 0.0.0.0:9000
logging:
  format: json
auth:
  login_url: /login/
  tokens:
    - token: dev-admin
      identity:
        username: ada
        role: admin
catalog:
  home_featured_limit: 5
",
        );

        Jail::expect_with(|_| {
            let config = AppConfig::load(Some(file.path())).unwrap();

            assert_eq!(config.server.bind_addr.port(), 9000);
            assert_eq!(config.server.request_timeout_secs, DEFAULT_REQUEST_TIMEOUT_SECS);
            assert_eq!(config.logging.format, LogFormat::Json);
            assert_eq!(config.auth.login_url, "/login/");
            assert_eq!(config.auth.tokens.len(), 1);
            assert_eq!(config.auth.tokens[0].identity.username, "ada");
            assert_eq!(config.catalog.home_featured_limit, 5);
            assert_eq!(config.catalog.home_recent_events_limit, 5);
            Ok(())
        });
    }

    #[test]
    fn environment_overrides_file() {
        let file = yaml_file("server:\n  request_timeout_secs: 10\n");

        Jail::expect_with(|jail| {
            jail.set_env("REEFGUARD__SERVER__REQUEST_TIMEOUT_SECS", "5");
            jail.set_env("REEFGUARD__AUTH__MODE", "accept_all");

            let config = AppConfig::load(Some(file.path())).unwrap();

            assert_eq!(config.server.request_timeout_secs, 5);
            assert_eq!(config.auth.mode, AuthNMode::AcceptAll);
            Ok(())
        });
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let file = yaml_file("server:\n  bind_adress: 0.0.0.0:9000\n");

        Jail::expect_with(|_| {
            let err = AppConfig::load(Some(file.path())).unwrap_err();
            assert!(matches!(err, ConfigError::Load(_)), "{err}");
            Ok(())
        });
    }

    #[test]
    fn missing_file_is_reported() {
        let err = AppConfig::load(Some(Path::new("/nonexistent/reefguard.yaml"))).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
    }

    #[test]
    fn validate_rejects_bad_values() {
        let mut config = AppConfig::default();
        config.server.request_timeout_secs = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid {
                field: "server.request_timeout_secs",
                ..
            })
        ));

        let mut config = AppConfig::default();
        config.auth.login_url = "login".to_owned();
        assert!(config.validate().is_err());

        let mapping = TokenMapping {
            token: "same".to_owned(),
            identity: IdentityConfig::default(),
        };
        let mut config = AppConfig::default();
        config.auth.tokens = vec![mapping.clone(), mapping];
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid {
                field: "auth.tokens",
                ..
            })
        ));
    }
}
