use crate::{ClientError, ClientResult};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

const DEFAULT_API_VERSION: &str = "v1";
const DEFAULT_REQUEST_TIMEOUT: &str = "15s";
const DEFAULT_PAGE_SIZE: usize = 25;

pub const API_URL_ENV: &str = "CROMWELL_API_URL";
pub const API_VERSION_ENV: &str = "CROMWELL_API_VERSION";
pub const REQUEST_TIMEOUT_ENV: &str = "CROMWELL_REQUEST_TIMEOUT";
pub const AUTH_TOKEN_ENV: &str = "CROMWELL_AUTH_TOKEN";
pub const PAGE_SIZE_ENV: &str = "CROMWELL_PAGE_SIZE";

/// Connection settings for a Cromwell server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
  pub api_url: String,
  pub api_version: String,
  pub request_timeout: Duration,
  /// Sent as `Authorization: Bearer <token>` when present.
  pub auth_token: Option<String>,
  pub page_size: usize,
}

/// On-disk shape of [`Config`]; durations are humantime strings (`15s`, `1m`).
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
struct UserConfig {
  api_url: Option<String>,
  api_version: Option<String>,
  request_timeout: Option<String>,
  auth_token: Option<String>,
  page_size: Option<usize>,
}

fn parse_timeout(value: &str) -> ClientResult<Duration> {
  humantime::parse_duration(value.trim()).map_err(|err| {
    ClientError::config_error(format!("Invalid request timeout `{}`: {}", value, err))
  })
}

fn read_env(key: &str) -> Option<String> {
  std::env::var(key)
    .ok()
    .map(|value| value.trim().to_string())
    .filter(|value| !value.is_empty())
}

impl Config {
  pub fn new(api_url: impl Into<String>) -> Self {
    Config {
      api_url: api_url.into(),
      api_version: DEFAULT_API_VERSION.to_string(),
      request_timeout: Duration::from_secs(15),
      auth_token: None,
      page_size: DEFAULT_PAGE_SIZE,
    }
  }

  fn from_user_config(user: UserConfig) -> ClientResult<Self> {
    let api_url = user
      .api_url
      .filter(|url| !url.trim().is_empty())
      .ok_or_else(|| ClientError::config_error("Missing api-url"))?;

    let request_timeout = user
      .request_timeout
      .as_deref()
      .unwrap_or(DEFAULT_REQUEST_TIMEOUT);

    let config = Config {
      api_url,
      api_version: user
        .api_version
        .unwrap_or_else(|| DEFAULT_API_VERSION.to_string()),
      request_timeout: parse_timeout(request_timeout)?,
      auth_token: user.auth_token.filter(|token| !token.is_empty()),
      page_size: user.page_size.unwrap_or(DEFAULT_PAGE_SIZE),
    };
    config.validate()?;

    Ok(config)
  }

  /// Reads the `CROMWELL_*` variables, loading a `.env` file first when
  /// one exists.
  pub fn from_env() -> ClientResult<Self> {
    if let Ok(path) = dotenv::dotenv() {
      log::debug!("Loaded environment from {}", path.display());
    }

    let page_size = match read_env(PAGE_SIZE_ENV) {
      Some(value) => Some(value.parse::<usize>().map_err(|err| {
        ClientError::config_error(format!("Invalid {} `{}`: {}", PAGE_SIZE_ENV, value, err))
      })?),
      None => None,
    };

    Self::from_user_config(UserConfig {
      api_url: read_env(API_URL_ENV),
      api_version: read_env(API_VERSION_ENV),
      request_timeout: read_env(REQUEST_TIMEOUT_ENV),
      auth_token: read_env(AUTH_TOKEN_ENV),
      page_size,
    })
  }

  pub fn from_yaml(yaml: &str) -> ClientResult<Self> {
    let user: UserConfig = serde_yaml::from_str(yaml)
      .map_err(|err| ClientError::config_error(format!("Invalid config: {}", err)))?;

    Self::from_user_config(user)
  }

  pub fn from_file(path: impl AsRef<Path>) -> ClientResult<Self> {
    let yaml = std::fs::read_to_string(path)?;

    Self::from_yaml(&yaml)
  }

  pub fn validate(&self) -> ClientResult<()> {
    if !self.api_url.starts_with("http://") && !self.api_url.starts_with("https://") {
      return Err(ClientError::config_error(format!(
        "api-url must be an http(s) URL, got `{}`",
        self.api_url
      )));
    }
    if self.api_version.is_empty() {
      return Err(ClientError::config_error("api-version cannot be empty"));
    }
    if self.page_size == 0 {
      return Err(ClientError::config_error("page-size must be positive"));
    }

    Ok(())
  }

  pub fn bearer_token(&self) -> Option<String> {
    self
      .auth_token
      .as_ref()
      .map(|token| format!("Bearer {}", token))
  }

  pub fn with_api_version(mut self, api_version: impl Into<String>) -> Self {
    self.api_version = api_version.into();
    self
  }

  pub fn with_auth_token(mut self, token: impl Into<String>) -> Self {
    self.auth_token = Some(token.into());
    self
  }

  pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
    self.request_timeout = timeout;
    self
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_yaml_defaults() {
    let config = Config::from_yaml("api-url: http://localhost:8000/").unwrap();
    assert_eq!(config, Config::new("http://localhost:8000/"));
    assert_eq!(config.request_timeout, Duration::from_secs(15));
    assert_eq!(config.bearer_token(), None);
  }

  #[test]
  fn test_yaml_overrides() {
    let yaml = r#"
api-url: https://cromwell.example.com
api-version: v2
request-timeout: 1m 30s
auth-token: secret
page-size: 50
"#;
    let config = Config::from_yaml(yaml).unwrap();
    assert_eq!(config.api_version, "v2");
    assert_eq!(config.request_timeout, Duration::from_secs(90));
    assert_eq!(config.bearer_token(), Some("Bearer secret".to_string()));
    assert_eq!(config.page_size, 50);
  }

  #[test]
  fn test_invalid_config() {
    assert_eq!(
      Config::from_yaml("api-version: v1").unwrap_err().to_string(),
      "Config error: Missing api-url"
    );
    assert!(Config::from_yaml("api-url: localhost:8000").is_err());
    assert!(Config::from_yaml("api-url: http://x\nrequest-timeout: soon").is_err());
    assert!(Config::from_yaml("api-url: http://x\npage-size: 0").is_err());
  }
}
