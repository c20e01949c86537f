//! Docker Engine API client.

use std::io::Write;
use std::time::Duration;

use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use tracing::{debug, info, warn};

use super::{ContainerEngine, ContainerInfo, ContainerSpec, EngineConfig, EngineError, ImageInfo, RemoveOptions};

/// Error body the engine sends with non-2xx responses.
#[derive(Debug, Deserialize)]
struct ApiMessage {
  message: String,
}

/// One line of the build output stream.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct BuildMessage {
  stream: Option<String>,
  status: Option<String>,
  error: Option<String>,
}

/// Handle to a Docker-compatible engine reachable over HTTP.
#[derive(Debug, Clone)]
pub struct DockerEngine {
  client: Client,
  config: EngineConfig,
}

impl DockerEngine {
  /// Create a handle. No request is made until the first call.
  pub fn new(config: EngineConfig) -> Result<Self, EngineError> {
    let client = Client::builder()
      .user_agent(concat!("build_ruby/", env!("CARGO_PKG_VERSION")))
      .build()?;
    Ok(Self { client, config })
  }

  pub fn config(&self) -> &EngineConfig {
    &self.config
  }
}

/// Turn a non-2xx response into an [`EngineError::Api`].
async fn check(response: Response) -> Result<Response, EngineError> {
  let status = response.status();
  if status.is_success() {
    return Ok(response);
  }

  let body = response.text().await.unwrap_or_default();
  let message = match serde_json::from_str::<ApiMessage>(&body) {
    Ok(msg) => msg.message,
    Err(_) => body.trim().to_string(),
  };
  Err(EngineError::Api {
    status: status.as_u16(),
    message,
  })
}

/// Forward one line of build output to the log, failing on engine-reported errors.
fn forward_build_line(line: &[u8], log: &mut dyn Write) -> Result<(), EngineError> {
  let line = String::from_utf8_lossy(line);
  let line = line.trim();
  if line.is_empty() {
    return Ok(());
  }

  let msg: BuildMessage = serde_json::from_str(line)?;
  if let Some(error) = msg.error {
    return Err(EngineError::BuildFailed(error.trim_end().to_string()));
  }
  if let Some(stream) = msg.stream {
    log.write_all(stream.as_bytes())?;
  }
  if let Some(status) = msg.status {
    writeln!(log, "{}", status)?;
  }
  Ok(())
}

impl ContainerEngine for DockerEngine {
  async fn build_image(&self, name: &str, context: Vec<u8>, log: &mut dyn Write) -> Result<(), EngineError> {
    info!(image = %name, context_size = context.len(), "building image");

    let mut response = check(
      self
        .client
        .post(self.config.url("/build"))
        .query(&[("t", name), ("nocache", "false"), ("q", "false"), ("rm", "false")])
        .header(CONTENT_TYPE, "application/x-tar")
        .body(context)
        .send()
        .await?,
    )
    .await?;

    let mut pending: Vec<u8> = Vec::new();
    while let Some(chunk) = response.chunk().await? {
      pending.extend_from_slice(&chunk);
      while let Some(pos) = pending.iter().position(|b| *b == b'\n') {
        let line: Vec<u8> = pending.drain(..=pos).collect();
        forward_build_line(&line, log)?;
      }
    }
    forward_build_line(&pending, log)?;
    log.flush()?;

    info!(image = %name, "image built");
    Ok(())
  }

  async fn inspect_image(&self, name: &str) -> Result<ImageInfo, EngineError> {
    let response = check(
      self
        .client
        .get(self.config.url(&format!("/images/{}/json", name)))
        .send()
        .await?,
    )
    .await?;

    let image: ImageInfo = serde_json::from_slice(&response.bytes().await?)?;
    debug!(image = %name, id = %image.id, "inspected image");
    Ok(image)
  }

  async fn create_container(&self, name: &str, spec: &ContainerSpec) -> Result<ContainerInfo, EngineError> {
    let response = check(
      self
        .client
        .post(self.config.url("/containers/create"))
        .query(&[("name", name)])
        .json(spec)
        .send()
        .await?,
    )
    .await?;

    let container: ContainerInfo = serde_json::from_slice(&response.bytes().await?)?;
    for warning in container.warnings.iter().flatten() {
      warn!(container = %container.id, %warning, "engine warning");
    }
    info!(container = %container.id, image = %spec.image, "created container");
    Ok(container)
  }

  async fn stop_container(&self, id: &str, timeout: Duration) -> Result<(), EngineError> {
    let response = self
      .client
      .post(self.config.url(&format!("/containers/{}/stop", id)))
      .query(&[("t", timeout.as_secs())])
      .send()
      .await?;

    if response.status() == StatusCode::NOT_MODIFIED {
      debug!(container = %id, "container already stopped");
      return Ok(());
    }
    check(response).await?;
    debug!(container = %id, "stopped container");
    Ok(())
  }

  async fn copy_from_container(&self, id: &str, path: &str) -> Result<Vec<u8>, EngineError> {
    let response = check(
      self
        .client
        .get(self.config.url(&format!("/containers/{}/archive", id)))
        .query(&[("path", path)])
        .send()
        .await?,
    )
    .await?;

    let bytes = response.bytes().await?;
    debug!(container = %id, path, size = bytes.len(), "copied from container");
    Ok(bytes.to_vec())
  }

  async fn remove_container(&self, id: &str, options: RemoveOptions) -> Result<(), EngineError> {
    check(
      self
        .client
        .delete(self.config.url(&format!("/containers/{}", id)))
        .query(&[("v", options.volumes), ("force", options.force)])
        .send()
        .await?,
    )
    .await?;

    info!(container = %id, "removed container");
    Ok(())
  }
}
