//! Single-entry tar archives.
//!
//! The engine takes its build context as a tar stream and hands files copied
//! out of a container back as a tar stream. Both sides only ever carry one
//! file here.

use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

use crate::consts::DOCKERFILE_NAME;

/// Errors that can occur while packing or unpacking an archive.
#[derive(Debug, Error)]
pub enum ArchiveError {
  #[error("archive io error: {0}")]
  Io(#[from] io::Error),

  #[error("archive contains no entries")]
  Empty,

  #[error("failed to create {}: {source}", path.display())]
  CreateFile { path: PathBuf, source: io::Error },
}

/// A file read back out of an archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
  pub name: String,
  pub data: Vec<u8>,
}

/// Result of extracting an entry to disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedEntry {
  /// Entry name as recorded in the archive
  pub name: String,
  /// Size recorded in the entry header
  pub size: u64,
  /// Local file the bytes were written to
  pub path: PathBuf,
}

/// Build a context archive holding `contents` as the `Dockerfile`.
pub fn pack_dockerfile(contents: &str) -> Result<Vec<u8>, ArchiveError> {
  pack_single(DOCKERFILE_NAME, contents.as_bytes())
}

/// Build an archive with one regular file entry.
pub fn pack_single(name: &str, contents: &[u8]) -> Result<Vec<u8>, ArchiveError> {
  let mut header = tar::Header::new_ustar();
  header.set_size(contents.len() as u64);
  header.set_mode(0o644);
  header.set_entry_type(tar::EntryType::Regular);

  let mut builder = tar::Builder::new(Vec::new());
  builder.append_data(&mut header, name, contents)?;
  let bytes = builder.into_inner()?;

  debug!(name, size = contents.len(), archive_size = bytes.len(), "packed archive");
  Ok(bytes)
}

/// Read the first entry of an archive into memory.
pub fn read_first(archive: &[u8]) -> Result<ArchiveEntry, ArchiveError> {
  let mut archive = tar::Archive::new(archive);
  let mut entry = archive.entries()?.next().ok_or(ArchiveError::Empty)??;

  let name = entry.path()?.to_string_lossy().into_owned();
  let mut data = Vec::with_capacity(entry.header().size()? as usize);
  entry.read_to_end(&mut data)?;

  Ok(ArchiveEntry { name, data })
}

/// Write the first entry of an archive to `dest`.
///
/// `dest` is created (or truncated); the entry's own name is only reported,
/// never used as a path.
pub fn extract_first(archive: &[u8], dest: &Path) -> Result<ExtractedEntry, ArchiveError> {
  let mut archive = tar::Archive::new(archive);
  let mut entry = archive.entries()?.next().ok_or(ArchiveError::Empty)??;

  let name = entry.path()?.to_string_lossy().into_owned();
  let size = entry.header().size()?;

  let mut out = File::create(dest).map_err(|e| ArchiveError::CreateFile {
    path: dest.to_path_buf(),
    source: e,
  })?;
  let written = io::copy(&mut entry, &mut out)?;
  out.sync_all()?;

  debug!(entry = %name, size, written, path = %dest.display(), "extracted archive entry");
  Ok(ExtractedEntry {
    name,
    size,
    path: dest.to_path_buf(),
  })
}
