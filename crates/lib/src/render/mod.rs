//! Dockerfile rendering.
//!
//! The template is a fixed asset compiled into the binary. Everything that
//! varies between builds is passed in as template variables:
//!
//! | variable       | value                                              |
//! |----------------|----------------------------------------------------|
//! | `distro`       | base image tag                                     |
//! | `ruby_version` | version as given                                   |
//! | `arch`         | package architecture                               |
//! | `iteration`    | `--iteration <value> \` or empty                   |
//! | `download_url` | source tarball URL                                 |
//! | `file_name`    | package file name                                  |
//! | `num_cpu`      | host CPU count, used for `make -j`                 |

mod templates;

use serde::Serialize;
use tera::{Context, Tera};
use thiserror::Error;
use tracing::debug;

use crate::request::{BuildRequest, download_url};

pub use templates::DOCKERFILE_TEMPLATE;

const TEMPLATE_NAME: &str = "Dockerfile";

/// Errors that can occur while rendering the Dockerfile.
#[derive(Debug, Error)]
pub enum RenderError {
  #[error("version {0:?} needs at least two dot-separated components")]
  MalformedVersion(String),

  #[error("Dockerfile template is empty")]
  EmptyTemplate,

  #[error("template error: {0}")]
  Template(#[from] tera::Error),
}

#[derive(Debug, Serialize)]
struct BuildVars<'a> {
  distro: &'a str,
  ruby_version: &'a str,
  arch: &'a str,
  iteration: String,
  download_url: String,
  file_name: String,
  num_cpu: usize,
}

/// Number of logical processors on this host.
pub fn host_cpu_count() -> usize {
  std::thread::available_parallelism().map(|p| p.get()).unwrap_or(1)
}

/// The `fpm` flag fragment for a packaging iteration, ending in a line
/// continuation so it can sit on its own line in a `RUN` instruction.
pub fn iteration_flag(iteration: &str) -> String {
  if iteration.is_empty() {
    String::new()
  } else {
    format!("--iteration {} \\", iteration)
  }
}

/// Render the embedded Dockerfile template for a request.
pub fn render_dockerfile(request: &BuildRequest, num_cpu: usize) -> Result<String, RenderError> {
  render_template(DOCKERFILE_TEMPLATE, request, num_cpu)
}

/// Render an arbitrary Dockerfile template for a request.
pub fn render_template(template: &str, request: &BuildRequest, num_cpu: usize) -> Result<String, RenderError> {
  if template.trim().is_empty() {
    return Err(RenderError::EmptyTemplate);
  }

  let download_url =
    download_url(&request.version).ok_or_else(|| RenderError::MalformedVersion(request.version.clone()))?;

  let vars = BuildVars {
    distro: &request.base_image,
    ruby_version: &request.version,
    arch: &request.arch,
    iteration: iteration_flag(&request.iteration),
    download_url,
    file_name: request.package_file_name(),
    num_cpu,
  };
  debug!(?vars, "rendering Dockerfile");

  let mut tera = Tera::default();
  tera.add_raw_template(TEMPLATE_NAME, template)?;
  let context = Context::from_serialize(&vars)?;
  Ok(tera.render(TEMPLATE_NAME, &context)?)
}
