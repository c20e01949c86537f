//! Build inputs.
//!
//! A [`BuildRequest`] is created once from the command line and never changes
//! afterwards. Only two things are checked: the version must be non-empty and
//! the distro must be one we have a base image for. Arch and iteration go
//! through verbatim.

mod distro;
mod naming;

use thiserror::Error;

pub use distro::{base_image, known_distros};
pub use naming::{download_url, major_minor, package_file_name};

/// Input problems the user can fix by changing their flags.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RequestError {
  #[error("You didn't specify a Ruby version to build!")]
  MissingVersion,

  #[error("You specified a distro that I don't know how to build for: {0:?}")]
  UnknownDistro(String),
}

/// Validated inputs for one package build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildRequest {
  /// Ruby version, e.g. `2.1.1` or `2.0.0-p451`
  pub version: String,
  /// Distro key as given by the user
  pub distro: String,
  /// Base image tag the distro key resolves to
  pub base_image: String,
  /// Package architecture, `none` to leave it out of the file name
  pub arch: String,
  /// Packaging iteration, possibly empty
  pub iteration: String,
}

impl BuildRequest {
  /// Validate raw inputs into a request.
  pub fn resolve(version: &str, distro: &str, arch: &str, iteration: &str) -> Result<Self, RequestError> {
    if version.is_empty() {
      return Err(RequestError::MissingVersion);
    }
    let base_image = base_image(distro).ok_or_else(|| RequestError::UnknownDistro(distro.to_string()))?;

    Ok(Self {
      version: version.to_string(),
      distro: distro.to_string(),
      base_image: base_image.to_string(),
      arch: arch.to_string(),
      iteration: iteration.to_string(),
    })
  }

  /// File name of the package this request produces.
  pub fn package_file_name(&self) -> String {
    package_file_name(&self.version, &self.iteration, &self.arch)
  }
}
