use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;

use crate::foundation::error::{PosterError, PosterResult};

/// A file to place inside the archive folder.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PackedFile {
    /// File name inside the folder.
    pub name: String,
    /// Encoded file contents.
    pub bytes: Vec<u8>,
}

/// Capability that bundles files into one compressed archive.
pub trait ArchivePacker: Send + Sync {
    /// Pack `files` under `folder/` and return the archive bytes.
    fn pack(&self, folder: &str, files: &[PackedFile]) -> PosterResult<Vec<u8>>;
}

/// ZIP packer backed by the `zip` crate.
#[derive(Clone, Copy, Debug)]
pub struct ZipPacker {
    compression: zip::CompressionMethod,
}

impl Default for ZipPacker {
    fn default() -> Self {
        Self {
            compression: zip::CompressionMethod::Deflated,
        }
    }
}

impl ZipPacker {
    /// Store files without compression.
    pub fn stored() -> Self {
        Self {
            compression: zip::CompressionMethod::Stored,
        }
    }
}

impl ArchivePacker for ZipPacker {
    fn pack(&self, folder: &str, files: &[PackedFile]) -> PosterResult<Vec<u8>> {
        let options =
            zip::write::SimpleFileOptions::default().compression_method(self.compression);
        let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));

        let prefix = if folder.is_empty() {
            String::new()
        } else {
            zip.add_directory(format!("{folder}/"), options)
                .context("add archive folder")?;
            format!("{folder}/")
        };
        for file in files {
            zip.start_file(format!("{prefix}{}", file.name), options)
                .with_context(|| format!("start archive entry '{}'", file.name))?;
            zip.write_all(&file.bytes)
                .with_context(|| format!("write archive entry '{}'", file.name))?;
        }
        Ok(zip.finish().context("finish archive")?.into_inner())
    }
}

/// A packed poster archive.
#[derive(Clone)]
pub struct Archive {
    /// Download file name, e.g. `xiaohongshu-posters.zip`.
    pub file_name: String,
    /// Paths of the packed files inside the archive, in entry order.
    pub entries: Vec<String>,
    /// Archive bytes.
    pub bytes: Arc<[u8]>,
}

impl std::fmt::Debug for Archive {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Archive")
            .field("file_name", &self.file_name)
            .field("entries", &self.entries)
            .field("bytes_len", &self.bytes.len())
            .finish()
    }
}

impl Archive {
    /// Write the archive into `dir` under its download name.
    pub fn write_to_dir(&self, dir: impl AsRef<Path>) -> PosterResult<PathBuf> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir)
            .with_context(|| format!("create output dir '{}'", dir.display()))?;
        let path = dir.join(&self.file_name);
        std::fs::write(&path, &self.bytes)
            .map_err(|e| PosterError::export(format!("write '{}': {e}", path.display())))?;
        Ok(path)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/export/archive.rs"]
mod tests;
