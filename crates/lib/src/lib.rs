//! rubybuild-lib: Core types and logic for build_ruby
//!
//! This crate provides the pieces that turn a Ruby version into a `.deb`
//! package by way of a container engine:
//! - `request`: validated build inputs and the names derived from them
//! - `render`: Dockerfile rendering from the embedded template
//! - `archive`: single-entry tar build contexts and artifact extraction
//! - `engine`: the container engine API client
//! - `pipeline`: the sequential build → create → copy → remove run

pub mod archive;
pub mod consts;
pub mod engine;
pub mod pipeline;
pub mod render;
pub mod request;
