//! Engine endpoint configuration.

use reqwest::Url;
use tracing::debug;

use super::EngineError;
use crate::consts::DOCKER_HOST_ENV;

/// Where the engine lives.
///
/// Whatever scheme the address was given with (`tcp://` usually), the engine
/// is always spoken to over plain HTTP. Only host and port are kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
  endpoint: Url,
}

impl EngineConfig {
  /// Read the endpoint from `DOCKER_HOST`.
  pub fn from_env() -> Result<Self, EngineError> {
    let raw = std::env::var(DOCKER_HOST_ENV).map_err(|_| EngineError::MissingHost)?;
    Self::from_host(&raw)
  }

  /// Parse an endpoint address such as `tcp://127.0.0.1:2375`.
  pub fn from_host(raw: &str) -> Result<Self, EngineError> {
    let invalid = |reason: String| EngineError::InvalidHost {
      value: raw.to_string(),
      reason,
    };

    let parsed = Url::parse(raw).map_err(|e| invalid(e.to_string()))?;
    let host = parsed
      .host_str()
      .filter(|h| !h.is_empty())
      .ok_or_else(|| invalid("no host".to_string()))?;

    let endpoint = match parsed.port() {
      Some(port) => format!("http://{}:{}", host, port),
      None => format!("http://{}", host),
    };
    let endpoint = Url::parse(&endpoint).map_err(|e| invalid(e.to_string()))?;

    debug!(endpoint = %endpoint, "resolved engine endpoint");
    Ok(Self { endpoint })
  }

  /// Base URL of the engine API.
  pub fn endpoint(&self) -> &Url {
    &self.endpoint
  }

  /// URL of an API path on the engine.
  pub fn url(&self, path: &str) -> Url {
    let mut url = self.endpoint.clone();
    url.set_path(path);
    url
  }
}
