mod cmd;
mod output;

use clap::{CommandFactory, Parser};
use tracing_subscriber::EnvFilter;

use rubybuild_lib::consts::{DEFAULT_ARCH, DEFAULT_DISTRO};
use rubybuild_lib::request::{BuildRequest, known_distros};

use crate::cmd::cmd_build;
use crate::output::print_error;

/// Build ruby debs from source for Ubuntu
#[derive(Parser, Debug)]
#[command(name = "build_ruby")]
#[command(author, version, about, long_about = None)]
#[command(after_help = distros_help())]
struct Cli {
  /// Required. The version to build, eg. 2.1.0 (for recent versions with no patch release) or 2.0.0-p451
  #[arg(short, long)]
  ruby: Option<String>,

  /// Which distro to use for the build
  #[arg(short, long, default_value = DEFAULT_DISTRO)]
  distro: String,

  /// Arch to use in package filename, eg: 'none', 'all', 'amd64' etc.
  #[arg(short, long, default_value = DEFAULT_ARCH)]
  arch: String,

  /// Packaging iteration, eg: 37s~precise
  #[arg(short, long)]
  iteration: Option<String>,

  /// Enable verbose output
  #[arg(short, long)]
  verbose: bool,
}

fn distros_help() -> String {
  let distros: Vec<_> = known_distros().collect();
  format!("Known distros: {}", distros.join(", "))
}

fn main() {
  let cli = Cli::parse();

  let filter = if cli.verbose {
    EnvFilter::new("rubybuild_lib=debug,build_ruby=debug")
  } else {
    EnvFilter::from_default_env()
  };
  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .without_time()
    .init();

  let request = match BuildRequest::resolve(
    cli.ruby.as_deref().unwrap_or_default(),
    &cli.distro,
    &cli.arch,
    cli.iteration.as_deref().unwrap_or_default(),
  ) {
    Ok(request) => request,
    Err(e) => {
      print_error(&e.to_string());
      let _ = Cli::command().print_help();
      std::process::exit(1);
    },
  };

  if let Err(e) = cmd_build(&request) {
    print_error(&format!("{:#}", e));
    std::process::exit(2);
  }
}
