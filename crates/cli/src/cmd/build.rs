//! Implementation of the package build.
//!
//! Connects to the engine named by `DOCKER_HOST`, runs the build pipeline and
//! writes the package into the current directory.

use std::io;
use std::time::Instant;

use anyhow::{Context, Result};
use tracing::debug;

use rubybuild_lib::engine::{DockerEngine, EngineConfig};
use rubybuild_lib::pipeline::{Event, PipelineOptions, build_package};
use rubybuild_lib::request::BuildRequest;

use crate::output::{format_bytes, format_duration, print_block, print_info, print_stat, print_success, truncate_id};

/// Execute the build.
///
/// Build output from the engine is streamed to stdout as it arrives. On
/// success the package has been written to the current directory and the
/// throwaway container removed; the image is left on the engine.
///
/// # Errors
///
/// Returns an error if the engine can't be configured or any pipeline step fails.
pub fn cmd_build(request: &BuildRequest) -> Result<()> {
  let start = Instant::now();

  let config = EngineConfig::from_env().context("Failed to configure container engine")?;
  let engine = DockerEngine::new(config).context("Failed to create engine client")?;
  debug!(endpoint = %engine.config().endpoint(), "using engine");

  let options = PipelineOptions::default();
  let rt = tokio::runtime::Runtime::new().context("Failed to create async runtime")?;
  let outcome = rt
    .block_on(build_package(&engine, request, &options, &mut io::stdout(), print_event))
    .context("Build failed")?;

  println!();
  print_success("Package built!");
  print_stat("Package", &outcome.package.path.display().to_string());
  print_stat("Size", &format_bytes(outcome.package.size));
  print_stat("Image", &outcome.image_name);
  print_stat("Duration", &format_duration(start.elapsed()));

  Ok(())
}

fn print_event(event: Event<'_>) {
  match event {
    Event::DockerfileRendered { dockerfile } => {
      print_info("Using Dockerfile:");
      print_block(dockerfile);
    },
    Event::ImageBuilt { name } => print_success(&format!("Created image with name {}", name)),
    Event::CreatingContainer { image_id } => {
      print_info(&format!("Creating container from image id {}", truncate_id(image_id)))
    },
    Event::CopyingPackage { path } => print_info(&format!("Copying {} out of the container", path)),
    Event::PackageExtracted { entry } => print_info(&format!(
      "Extracted package file {} ({} bytes)",
      entry.name, entry.size
    )),
    Event::RemovingContainer { id } => print_info(&format!("Removing container {}", truncate_id(id))),
  }
}
