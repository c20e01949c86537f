//! Template content for the Dockerfile renderer.

/// Dockerfile template that builds Ruby from source and packages it with fpm.
pub const DOCKERFILE_TEMPLATE: &str = include_str!(concat!(
  env!("CARGO_MANIFEST_DIR"),
  "/../../templates/Dockerfile.template"
));
