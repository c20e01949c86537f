//! Container engine access.
//!
//! [`ContainerEngine`] is the seam between the pipeline and the engine: the
//! six calls the pipeline makes, nothing more. [`DockerEngine`] implements it
//! over the Docker Engine HTTP API.

mod config;
mod docker;

use std::io::Write;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use config::EngineConfig;
pub use docker::DockerEngine;

/// Errors that can occur while talking to the container engine.
#[derive(Debug, Error)]
pub enum EngineError {
  #[error("DOCKER_HOST is not set")]
  MissingHost,

  #[error("invalid DOCKER_HOST {value:?}: {reason}")]
  InvalidHost { value: String, reason: String },

  #[error("engine request failed: {0}")]
  Http(#[from] reqwest::Error),

  #[error("engine returned {status}: {message}")]
  Api { status: u16, message: String },

  #[error("image build failed: {0}")]
  BuildFailed(String),

  #[error("unexpected engine response: {0}")]
  Decode(#[from] serde_json::Error),

  #[error("io error: {0}")]
  Io(#[from] std::io::Error),
}

/// An image as reported by inspect.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ImageInfo {
  #[serde(rename = "Id")]
  pub id: String,
}

/// A freshly created container.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ContainerInfo {
  #[serde(rename = "Id")]
  pub id: String,
  #[serde(rename = "Warnings", default)]
  pub warnings: Option<Vec<String>>,
}

/// Container creation body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ContainerSpec {
  pub image: String,
  pub cmd: Vec<String>,
  pub attach_stdin: bool,
  pub attach_stdout: bool,
}

impl ContainerSpec {
  /// A detached container from `image` that runs `cmd` and nothing else.
  pub fn detached(image: &str, cmd: &[&str]) -> Self {
    Self {
      image: image.to_string(),
      cmd: cmd.iter().map(|s| s.to_string()).collect(),
      attach_stdin: false,
      attach_stdout: false,
    }
  }
}

/// Options for removing a container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RemoveOptions {
  /// Remove the container's anonymous volumes too
  pub volumes: bool,
  /// Kill the container first if it is running
  pub force: bool,
}

/// The engine operations the build pipeline relies on.
#[allow(async_fn_in_trait)]
pub trait ContainerEngine {
  /// Build an image tagged `name` from a tar build context, streaming the
  /// build output to `log`.
  async fn build_image(&self, name: &str, context: Vec<u8>, log: &mut dyn Write) -> Result<(), EngineError>;

  /// Resolve an image name to its canonical ID.
  async fn inspect_image(&self, name: &str) -> Result<ImageInfo, EngineError>;

  /// Create (but don't start) a container.
  async fn create_container(&self, name: &str, spec: &ContainerSpec) -> Result<ContainerInfo, EngineError>;

  /// Stop a container, waiting at most `timeout` before it is killed.
  /// Stopping a container that isn't running succeeds.
  async fn stop_container(&self, id: &str, timeout: Duration) -> Result<(), EngineError>;

  /// Copy `path` out of a container as a tar archive.
  async fn copy_from_container(&self, id: &str, path: &str) -> Result<Vec<u8>, EngineError>;

  /// Remove a container.
  async fn remove_container(&self, id: &str, options: RemoveOptions) -> Result<(), EngineError>;
}
