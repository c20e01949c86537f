//! Distros this tool knows how to build for.

use std::collections::BTreeMap;
use std::sync::LazyLock;

/// Distro key → base image tag. Both codenames and image tags are accepted.
static DISTROS: LazyLock<BTreeMap<&'static str, &'static str>> = LazyLock::new(|| {
  BTreeMap::from([
    ("ubuntu_precise", "ubuntu:12.04"),
    ("ubuntu:12.04", "ubuntu:12.04"),
    ("ubuntu_raring", "ubuntu:13.04"),
    ("ubuntu:13.04", "ubuntu:13.04"),
    ("ubuntu_trusty", "ubuntu:14.04"),
    ("ubuntu:14.04", "ubuntu:14.04"),
  ])
});

/// Resolve a distro key to the base image tag used in the Dockerfile.
pub fn base_image(distro: &str) -> Option<&'static str> {
  DISTROS.get(distro).copied()
}

/// All recognized distro keys, sorted.
pub fn known_distros() -> impl Iterator<Item = &'static str> {
  DISTROS.keys().copied()
}
