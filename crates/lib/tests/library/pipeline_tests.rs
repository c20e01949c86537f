//! End-to-end pipeline runs against the fake engine.

use std::time::Duration;

use rubybuild_lib::engine::{ContainerSpec, RemoveOptions};
use rubybuild_lib::pipeline::{Event, PipelineError, PipelineOptions, build_package};
use rubybuild_lib::request::BuildRequest;
use tempfile::TempDir;

use crate::common::{Call, FailAt, FakeEngine};

const PACKAGE: &[u8] = b"!<arch>\ndebian-binary   fake package body";

fn options(temp: &TempDir) -> PipelineOptions {
  PipelineOptions {
    out_dir: temp.path().to_path_buf(),
    num_cpu: 4,
  }
}

fn precise_request() -> BuildRequest {
  BuildRequest::resolve("2.1.1", "ubuntu:12.04", "amd64", "").unwrap()
}

#[tokio::test]
async fn builds_package_end_to_end() {
  let temp = TempDir::new().unwrap();
  let engine = FakeEngine::new(PACKAGE);
  let mut log = Vec::new();

  let outcome = build_package(&engine, &precise_request(), &options(&temp), &mut log, |_| {})
    .await
    .unwrap();

  assert!(outcome.dockerfile.contains("ubuntu:12.04"));
  assert!(
    outcome
      .dockerfile
      .contains("http://cache.ruby-lang.org/pub/ruby/2.1/ruby-2.1.1.tar.gz")
  );
  assert_eq!(outcome.package.path, temp.path().join("ruby-2.1.1_amd64.deb"));
  assert_eq!(outcome.package.name, "ruby-2.1.1_amd64.deb");
  assert_eq!(outcome.package.size, PACKAGE.len() as u64);
  assert_eq!(std::fs::read(temp.path().join("ruby-2.1.1_amd64.deb")).unwrap(), PACKAGE);

  let log = String::from_utf8(log).unwrap();
  assert!(log.contains("Step 1 : FROM ubuntu:12.04"));
  assert!(log.contains(&format!("Successfully built {}", outcome.image_name)));
}

#[tokio::test]
async fn calls_engine_in_order() {
  let temp = TempDir::new().unwrap();
  let engine = FakeEngine::new(PACKAGE);

  let outcome = build_package(&engine, &precise_request(), &options(&temp), &mut Vec::new(), |_| {})
    .await
    .unwrap();

  let image_name = outcome.image_name.clone();
  let container_name = outcome.image_id.strip_prefix("sha256:").unwrap().to_string();
  let container_id = format!("container-{}", container_name);
  assert_eq!(outcome.container_id, container_id);

  assert_eq!(
    engine.calls(),
    vec![
      Call::Build {
        name: image_name.clone()
      },
      Call::Inspect { name: image_name },
      Call::Create {
        name: container_name,
        spec: ContainerSpec::detached(&outcome.image_id, &["date"]),
      },
      Call::Stop {
        id: container_id.clone(),
        timeout: Duration::from_secs(1),
      },
      Call::Copy {
        id: container_id.clone(),
        path: "/ruby-2.1.1_amd64.deb".to_string(),
      },
      Call::Remove {
        id: container_id,
        options: RemoveOptions {
          volumes: true,
          force: false,
        },
      },
    ]
  );
}

#[tokio::test]
async fn reports_events_in_order() {
  let temp = TempDir::new().unwrap();
  let engine = FakeEngine::new(PACKAGE);
  let mut seen = Vec::new();

  build_package(&engine, &precise_request(), &options(&temp), &mut Vec::new(), |event| {
    let label = match event {
      Event::DockerfileRendered { .. } => "rendered",
      Event::ImageBuilt { .. } => "built",
      Event::CreatingContainer { .. } => "creating",
      Event::CopyingPackage { .. } => "copying",
      Event::PackageExtracted { .. } => "extracted",
      Event::RemovingContainer { .. } => "removing",
    };
    seen.push(label);
  })
  .await
  .unwrap();

  assert_eq!(
    seen,
    vec!["rendered", "built", "creating", "copying", "extracted", "removing"]
  );
}

#[tokio::test]
async fn iteration_and_arch_shape_the_package_name() {
  let temp = TempDir::new().unwrap();
  let engine = FakeEngine::new(PACKAGE);
  let request = BuildRequest::resolve("2.1.1", "ubuntu_precise", "none", "37s~precise").unwrap();

  let outcome = build_package(&engine, &request, &options(&temp), &mut Vec::new(), |_| {})
    .await
    .unwrap();

  assert_eq!(outcome.package.path, temp.path().join("ruby-2.1.1_37s~precise.deb"));
  assert!(outcome.dockerfile.contains("--iteration 37s~precise \\"));
  assert!(engine.calls().contains(&Call::Copy {
    id: outcome.container_id.clone(),
    path: "/ruby-2.1.1_37s~precise.deb".to_string(),
  }));
}

#[tokio::test]
async fn repeated_runs_differ_only_in_image_identity() {
  let temp = TempDir::new().unwrap();
  let engine = FakeEngine::new(PACKAGE);
  let request = precise_request();

  let first = build_package(&engine, &request, &options(&temp), &mut Vec::new(), |_| {})
    .await
    .unwrap();
  let second = build_package(&engine, &request, &options(&temp), &mut Vec::new(), |_| {})
    .await
    .unwrap();

  assert_ne!(first.image_name, second.image_name);
  assert_ne!(first.container_id, second.container_id);
  assert_eq!(first.package.path, second.package.path);
  assert_eq!(first.dockerfile, second.dockerfile);

  let dockerfiles = engine.dockerfiles.borrow();
  assert_eq!(dockerfiles.len(), 2);
  assert_eq!(dockerfiles[0], dockerfiles[1]);
}

#[tokio::test]
async fn build_failure_creates_no_container() {
  let temp = TempDir::new().unwrap();
  let engine = FakeEngine::failing_at(PACKAGE, FailAt::Build);

  let result = build_package(&engine, &precise_request(), &options(&temp), &mut Vec::new(), |_| {}).await;

  assert!(matches!(result, Err(PipelineError::Build { .. })));
  let calls = engine.calls();
  assert_eq!(calls.len(), 1);
  assert!(matches!(calls[0], Call::Build { .. }));
  assert!(!temp.path().join("ruby-2.1.1_amd64.deb").exists());
}

#[tokio::test]
async fn copy_failure_leaves_container_behind() {
  let temp = TempDir::new().unwrap();
  let engine = FakeEngine::failing_at(PACKAGE, FailAt::Copy);

  let result = build_package(&engine, &precise_request(), &options(&temp), &mut Vec::new(), |_| {}).await;

  match result {
    Err(PipelineError::CopyPackage { path, .. }) => assert_eq!(path, "/ruby-2.1.1_amd64.deb"),
    other => panic!("expected CopyPackage error, got {:?}", other),
  }
  assert!(!engine.calls().iter().any(|c| matches!(c, Call::Remove { .. })));
}

#[tokio::test]
async fn remove_failure_is_fatal_after_extraction() {
  let temp = TempDir::new().unwrap();
  let engine = FakeEngine::failing_at(PACKAGE, FailAt::Remove);

  let result = build_package(&engine, &precise_request(), &options(&temp), &mut Vec::new(), |_| {}).await;

  assert!(matches!(result, Err(PipelineError::RemoveContainer { .. })));
  let removes = engine
    .calls()
    .iter()
    .filter(|c| matches!(c, Call::Remove { .. }))
    .count();
  assert_eq!(removes, 1, "removal is not retried");
  assert_eq!(std::fs::read(temp.path().join("ruby-2.1.1_amd64.deb")).unwrap(), PACKAGE);
}

#[tokio::test]
async fn malformed_version_never_reaches_engine() {
  let temp = TempDir::new().unwrap();
  let engine = FakeEngine::new(PACKAGE);
  let request = BuildRequest::resolve("2", "ubuntu:12.04", "amd64", "").unwrap();

  let result = build_package(&engine, &request, &options(&temp), &mut Vec::new(), |_| {}).await;

  assert!(matches!(result, Err(PipelineError::Render(_))));
  assert!(engine.calls().is_empty());
}

#[tokio::test]
async fn missing_output_directory_is_archive_error() {
  let temp = TempDir::new().unwrap();
  let engine = FakeEngine::new(PACKAGE);
  let options = PipelineOptions {
    out_dir: temp.path().join("does-not-exist"),
    num_cpu: 1,
  };

  let result = build_package(&engine, &precise_request(), &options, &mut Vec::new(), |_| {}).await;

  assert!(matches!(result, Err(PipelineError::Archive(_))));
  assert!(!engine.calls().iter().any(|c| matches!(c, Call::Remove { .. })));
}
