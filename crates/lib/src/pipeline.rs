//! The package build run.
//!
//! One run is strictly sequential:
//!
//! 1. render the Dockerfile
//! 2. pack it as the only entry of a build context
//! 3. build the image and resolve its ID
//! 4. create a throwaway container from it and stop it straight away
//! 5. copy the package out of the container into `out_dir`
//! 6. remove the container
//!
//! Any failure ends the run. Nothing already created on the engine is cleaned
//! up in that case, and the image is never removed, not even on success.

use std::io::Write;
use std::path::PathBuf;

use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use crate::archive::{self, ArchiveError, ExtractedEntry};
use crate::consts::{IMAGE_PREFIX, NOOP_CMD, STOP_TIMEOUT};
use crate::engine::{ContainerEngine, ContainerSpec, EngineError, RemoveOptions};
use crate::render::{self, RenderError};
use crate::request::BuildRequest;

/// Errors that end a pipeline run.
#[derive(Debug, Error)]
pub enum PipelineError {
  #[error("failed to render Dockerfile: {0}")]
  Render(#[from] RenderError),

  #[error("archive error: {0}")]
  Archive(#[from] ArchiveError),

  #[error("failed to build image {image}: {source}")]
  Build { image: String, source: EngineError },

  #[error("failed to inspect image {image}: {source}")]
  Inspect { image: String, source: EngineError },

  #[error("failed to create container from image {image_id}: {source}")]
  CreateContainer { image_id: String, source: EngineError },

  #[error("failed to stop container {id}: {source}")]
  StopContainer { id: String, source: EngineError },

  #[error("failed to copy {path} out of container {id}: {source}")]
  CopyPackage { id: String, path: String, source: EngineError },

  #[error("failed to remove container {id}: {source}")]
  RemoveContainer { id: String, source: EngineError },
}

/// Progress notifications, in the order they happen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event<'a> {
  DockerfileRendered { dockerfile: &'a str },
  ImageBuilt { name: &'a str },
  CreatingContainer { image_id: &'a str },
  CopyingPackage { path: &'a str },
  PackageExtracted { entry: &'a ExtractedEntry },
  RemovingContainer { id: &'a str },
}

/// Settings for a run that don't come from the build request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineOptions {
  /// Directory the package is written to
  pub out_dir: PathBuf,
  /// CPU count handed to the in-container compile
  pub num_cpu: usize,
}

impl Default for PipelineOptions {
  fn default() -> Self {
    Self {
      out_dir: PathBuf::from("."),
      num_cpu: render::host_cpu_count(),
    }
  }
}

/// What a successful run produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildOutcome {
  pub dockerfile: String,
  pub image_name: String,
  pub image_id: String,
  pub container_id: String,
  pub package: ExtractedEntry,
}

/// A fresh, unique image name.
pub fn generate_image_name() -> String {
  format!("{}_{}", IMAGE_PREFIX, Uuid::new_v4())
}

/// Container name derived from an image ID.
///
/// Container names can't contain `:`, so a digest prefix such as `sha256:`
/// is dropped.
pub fn container_name_for(image_id: &str) -> &str {
  image_id.rsplit_once(':').map(|(_, hex)| hex).unwrap_or(image_id)
}

/// Where the package ends up inside the built image.
pub fn container_package_path(file_name: &str) -> String {
  format!("/{}", file_name)
}

/// Run the whole build for one request.
///
/// Build output is streamed to `log`; `on_event` is told about each step.
pub async fn build_package<E, F>(
  engine: &E,
  request: &BuildRequest,
  options: &PipelineOptions,
  log: &mut dyn Write,
  mut on_event: F,
) -> Result<BuildOutcome, PipelineError>
where
  E: ContainerEngine,
  F: FnMut(Event<'_>),
{
  let dockerfile = render::render_dockerfile(request, options.num_cpu)?;
  on_event(Event::DockerfileRendered {
    dockerfile: &dockerfile,
  });
  let context = archive::pack_dockerfile(&dockerfile)?;

  let image_name = generate_image_name();
  info!(image = %image_name, version = %request.version, distro = %request.distro, "starting build");
  engine
    .build_image(&image_name, context, log)
    .await
    .map_err(|source| PipelineError::Build {
      image: image_name.clone(),
      source,
    })?;
  on_event(Event::ImageBuilt { name: &image_name });

  let image = engine
    .inspect_image(&image_name)
    .await
    .map_err(|source| PipelineError::Inspect {
      image: image_name.clone(),
      source,
    })?;

  on_event(Event::CreatingContainer { image_id: &image.id });
  let spec = ContainerSpec::detached(&image.id, &[NOOP_CMD]);
  let container = engine
    .create_container(container_name_for(&image.id), &spec)
    .await
    .map_err(|source| PipelineError::CreateContainer {
      image_id: image.id.clone(),
      source,
    })?;

  engine
    .stop_container(&container.id, STOP_TIMEOUT)
    .await
    .map_err(|source| PipelineError::StopContainer {
      id: container.id.clone(),
      source,
    })?;

  let file_name = request.package_file_name();
  let path = container_package_path(&file_name);
  on_event(Event::CopyingPackage { path: &path });
  let tarball = engine
    .copy_from_container(&container.id, &path)
    .await
    .map_err(|source| PipelineError::CopyPackage {
      id: container.id.clone(),
      path: path.clone(),
      source,
    })?;
  let package = archive::extract_first(&tarball, &options.out_dir.join(&file_name))?;
  on_event(Event::PackageExtracted { entry: &package });

  on_event(Event::RemovingContainer { id: &container.id });
  let remove = RemoveOptions {
    volumes: true,
    force: false,
  };
  engine
    .remove_container(&container.id, remove)
    .await
    .map_err(|source| PipelineError::RemoveContainer {
      id: container.id.clone(),
      source,
    })?;

  info!(package = %package.path.display(), size = package.size, "package built");
  Ok(BuildOutcome {
    dockerfile,
    image_name,
    image_id: image.id,
    container_id: container.id,
    package,
  })
}
