//! Fixed values shared across the build pipeline.

use std::time::Duration;

/// Environment variable naming the container engine endpoint.
pub const DOCKER_HOST_ENV: &str = "DOCKER_HOST";

/// Prefix of every image name this tool creates.
pub const IMAGE_PREFIX: &str = "ruby_build";

/// Base URL of the Ruby source tarball mirror.
pub const RUBY_DOWNLOAD_BASE: &str = "http://cache.ruby-lang.org/pub/ruby";

/// Name of the build definition inside the build context.
pub const DOCKERFILE_NAME: &str = "Dockerfile";

/// Command given to the throwaway container. It only exists so the engine
/// materializes a filesystem we can copy from.
pub const NOOP_CMD: &str = "date";

/// Grace period for stopping the throwaway container.
pub const STOP_TIMEOUT: Duration = Duration::from_secs(1);

/// Arch value that suppresses the arch suffix in the package name.
pub const ARCH_NONE: &str = "none";

pub const DEFAULT_ARCH: &str = "amd64";
pub const DEFAULT_DISTRO: &str = "ubuntu:12.04";
