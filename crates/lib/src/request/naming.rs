//! Names and URLs derived from a Ruby version.

use crate::consts::{ARCH_NONE, RUBY_DOWNLOAD_BASE};

/// The first two dot-separated components of a version.
///
/// `"2.0.0-p451"` → `"2.0"`. Returns `None` when the version has fewer than
/// two components.
pub fn major_minor(version: &str) -> Option<String> {
  let mut parts = version.splitn(3, '.');
  let major = parts.next()?;
  let minor = parts.next()?;
  Some(format!("{}.{}", major, minor))
}

/// Source tarball URL on the Ruby mirror.
pub fn download_url(version: &str) -> Option<String> {
  let series = major_minor(version)?;
  Some(format!("{}/{}/ruby-{}.tar.gz", RUBY_DOWNLOAD_BASE, series, version))
}

/// File name of the package produced for the given inputs.
///
/// The iteration suffix is only added when non-empty, the arch suffix only
/// when the arch isn't `none`.
pub fn package_file_name(version: &str, iteration: &str, arch: &str) -> String {
  let mut name = format!("ruby-{}", version);
  if !iteration.is_empty() {
    name.push('_');
    name.push_str(iteration);
  }
  if arch != ARCH_NONE {
    name.push('_');
    name.push_str(arch);
  }
  name.push_str(".deb");
  name
}
