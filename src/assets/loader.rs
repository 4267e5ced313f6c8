use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use rayon::prelude::*;

use crate::assets::blob::BlobRegistry;
use crate::assets::data_url::{decode_data_url, is_data_url};
use crate::assets::decode::{DecodedBitmap, decode_image};
use crate::assets::source::{Source, SourceLocator, UploadFile};
use crate::foundation::error::{PosterError, PosterResult};

/// Shared cancellation flag threaded through a load batch.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// Fresh, uncancelled token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Idempotent.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    /// Return `true` once cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    fn check(&self) -> PosterResult<()> {
        if self.is_cancelled() {
            Err(PosterError::Cancelled)
        } else {
            Ok(())
        }
    }
}

/// Resolves sources into decoded bitmaps.
///
/// Template sources are read from `templates_root` (or decoded from `data:` URLs). Upload bytes are
/// exposed through a short-lived `blob:` handle that is revoked once decoding finishes, whether it
/// succeeded or not.
pub struct ImageLoader {
    templates_root: PathBuf,
    blobs: BlobRegistry,
    pool: rayon::ThreadPool,
}

impl ImageLoader {
    /// Create a loader. `threads = None` uses rayon's default worker count.
    pub fn new(
        templates_root: impl Into<PathBuf>,
        blobs: BlobRegistry,
        threads: Option<usize>,
    ) -> PosterResult<Self> {
        Ok(Self {
            templates_root: templates_root.into(),
            blobs,
            pool: build_thread_pool(threads)?,
        })
    }

    /// Registry used for upload handles.
    pub fn blobs(&self) -> &BlobRegistry {
        &self.blobs
    }

    /// Load and decode one source.
    pub fn load(&self, source: &Source) -> PosterResult<DecodedBitmap> {
        let decoded = match &source.locator {
            SourceLocator::Url(src) => self.load_url(src),
            SourceLocator::File(file) => self.load_file(file),
        };
        decoded.map_err(|e| match e {
            PosterError::Cancelled | PosterError::ImageLoad { .. } => e,
            other => PosterError::image_load(&source.name, other),
        })
    }

    /// Load every source concurrently; the first failure fails the whole batch.
    ///
    /// Results are returned in source order. Each load checks `cancel` before and after decoding,
    /// and a cancelled batch fails with [`PosterError::Cancelled`].
    #[tracing::instrument(skip_all, fields(sources = sources.len()))]
    pub fn load_all(
        &self,
        sources: &[Source],
        cancel: &CancelToken,
    ) -> PosterResult<Vec<Arc<DecodedBitmap>>> {
        let images = self.pool.install(|| {
            sources
                .par_iter()
                .map(|source| -> PosterResult<Arc<DecodedBitmap>> {
                    cancel.check()?;
                    let bitmap = self.load(source)?;
                    cancel.check()?;
                    tracing::debug!(
                        name = %source.name,
                        width = bitmap.width,
                        height = bitmap.height,
                        "decoded source"
                    );
                    Ok(Arc::new(bitmap))
                })
                .collect::<PosterResult<Vec<_>>>()
        })?;
        cancel.check()?;
        Ok(images)
    }

    fn load_url(&self, src: &str) -> PosterResult<DecodedBitmap> {
        if is_data_url(src) {
            let data = decode_data_url(src)?;
            return decode_image(&data.bytes);
        }
        if src.contains("://") {
            return Err(PosterError::validation(format!(
                "remote template sources are not supported: '{src}'"
            )));
        }
        let path = self.templates_root.join(Path::new(&normalize_rel_path(src)?));
        let bytes = std::fs::read(&path).map_err(|e| {
            PosterError::validation(format!("read template '{}': {e}", path.display()))
        })?;
        decode_image(&bytes)
    }

    fn load_file(&self, file: &UploadFile) -> PosterResult<DecodedBitmap> {
        let handle = self.blobs.register(Arc::clone(&file.bytes));
        let bytes = handle
            .bytes()
            .ok_or_else(|| PosterError::validation("upload handle revoked before decode"))?;
        decode_image(&bytes)
    }
}

/// Normalize and validate template-relative paths.
///
/// The normalized result uses `/` separators, removes `.` segments, and rejects absolute paths or
/// parent traversals (`..`).
pub fn normalize_rel_path(source: &str) -> PosterResult<String> {
    let s = source.replace('\\', "/");
    if s.starts_with('/') {
        return Err(PosterError::validation("template paths must be relative"));
    }
    if s.is_empty() {
        return Err(PosterError::validation("template path must be non-empty"));
    }

    let mut out = Vec::<&str>::new();
    for part in s.split('/') {
        if part.is_empty() || part == "." {
            continue;
        }
        if part == ".." {
            return Err(PosterError::validation(
                "template paths must not contain '..'",
            ));
        }
        out.push(part);
    }

    if out.is_empty() {
        return Err(PosterError::validation(
            "template path must contain a file name",
        ));
    }

    Ok(out.join("/"))
}

fn build_thread_pool(threads: Option<usize>) -> PosterResult<rayon::ThreadPool> {
    if let Some(n) = threads
        && n == 0
    {
        return Err(PosterError::validation(
            "loader 'threads' must be >= 1 when set",
        ));
    }
    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| PosterError::validation(format!("failed to build rayon thread pool: {e}")))
}

#[cfg(test)]
#[path = "../../tests/unit/assets/loader.rs"]
mod tests;
