use std::collections::HashMap;
use std::sync::Arc;

use rayon::prelude::*;

use crate::assets::data_url::decode_data_url;
use crate::export::archive::{Archive, ArchivePacker, PackedFile};
use crate::foundation::config::PosterConfig;
use crate::foundation::error::{PosterError, PosterResult};
use crate::render::canvas::PosterCanvas;
use crate::render::entry::Entry;

/// Serializes a canvas into PNG bytes.
pub trait BlobEncoder: Send + Sync {
    /// Direct PNG encoding. `None` when this path is unavailable for `canvas`.
    fn to_blob(&self, canvas: &PosterCanvas) -> Option<Vec<u8>>;

    /// PNG as a base64 `data:` URL, used when [`BlobEncoder::to_blob`] yields nothing.
    fn to_data_url(&self, canvas: &PosterCanvas) -> PosterResult<String> {
        canvas.to_data_url()
    }
}

/// Default encoder: PNG through the `image` crate.
#[derive(Clone, Copy, Debug, Default)]
pub struct PngBlobEncoder;

impl BlobEncoder for PngBlobEncoder {
    fn to_blob(&self, canvas: &PosterCanvas) -> Option<Vec<u8>> {
        match canvas.encode_png() {
            Ok(bytes) => Some(bytes),
            Err(e) => {
                tracing::warn!(error = %e, "direct png encoding failed");
                None
            }
        }
    }
}

/// Archive naming.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExportSettings {
    /// Download name of the archive.
    pub archive_name: String,
    /// Folder inside the archive holding every poster.
    pub folder: String,
    /// Appended to each sanitized base name.
    pub file_suffix: String,
}

impl ExportSettings {
    /// Naming taken from `config`.
    pub fn from_config(config: &PosterConfig) -> Self {
        Self {
            archive_name: config.archive_name.clone(),
            folder: config.archive_folder.clone(),
            file_suffix: config.file_suffix.clone(),
        }
    }
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self::from_config(&PosterConfig::default())
    }
}

/// Strip the final extension, then collapse every run of characters outside ASCII word
/// characters, `.`, `-` and U+4E00..=U+9FA5 into a single `_`.
pub fn sanitize_base_name(name: &str) -> String {
    let base = match name.rfind('.') {
        Some(i) if i + 1 < name.len() && !name[i + 1..].contains('/') => &name[..i],
        _ => name,
    };

    let mut out = String::with_capacity(base.len());
    let mut in_run = false;
    for c in base.chars() {
        let keep = c.is_ascii_alphanumeric()
            || matches!(c, '_' | '.' | '-' | '\u{4e00}'..='\u{9fa5}');
        if keep {
            out.push(c);
            in_run = false;
        } else if !in_run {
            out.push('_');
            in_run = true;
        }
    }
    out
}

/// Base file name for the entry at `index`; empty names become `image-<index + 1>`.
pub fn entry_base_name(name: &str, index: usize) -> String {
    let base = if name.is_empty() {
        String::new()
    } else {
        sanitize_base_name(name)
    };
    if base.is_empty() {
        format!("image-{}", index + 1)
    } else {
        base
    }
}

/// Encode every captioned entry and pack the results into one archive.
///
/// Entries whose caption is blank are skipped. Encoding fans out over the rayon pool. An entry
/// whose canvas cannot be serialized by either path is left out; if nothing remains the export
/// fails with [`PosterError::Export`]. Without a packer the export fails with
/// [`PosterError::ExportUnavailable`] before any encoding starts.
#[tracing::instrument(skip_all, fields(entries = entries.len()))]
pub fn export_entries(
    entries: &[Entry],
    settings: &ExportSettings,
    encoder: &dyn BlobEncoder,
    packer: Option<&dyn ArchivePacker>,
) -> PosterResult<Archive> {
    if entries.is_empty() {
        return Err(PosterError::export("no posters to export; build a preview first"));
    }
    let packer = packer.ok_or(PosterError::ExportUnavailable)?;

    let encoded: Vec<Option<(String, Vec<u8>)>> = entries
        .par_iter()
        .enumerate()
        .map(|(index, entry)| {
            if !entry.has_caption() {
                return None;
            }
            let bytes = encode_canvas(encoder, &entry.canvas, &entry.name)?;
            Some((entry_base_name(&entry.name, index), bytes))
        })
        .collect();

    let mut seen = HashMap::<String, usize>::new();
    let files: Vec<PackedFile> = encoded
        .into_iter()
        .flatten()
        .map(|(base, bytes)| {
            let n = seen.entry(base.clone()).or_insert(0);
            *n += 1;
            let base = if *n == 1 { base } else { format!("{base}-{n}") };
            PackedFile {
                name: format!("{base}{}", settings.file_suffix),
                bytes,
            }
        })
        .collect();

    if files.is_empty() {
        return Err(PosterError::export("no poster could be encoded"));
    }

    let bytes = packer.pack(&settings.folder, &files)?;
    let paths = files
        .iter()
        .map(|f| {
            if settings.folder.is_empty() {
                f.name.clone()
            } else {
                format!("{}/{}", settings.folder, f.name)
            }
        })
        .collect::<Vec<_>>();
    tracing::debug!(files = paths.len(), bytes = bytes.len(), "packed archive");

    Ok(Archive {
        file_name: settings.archive_name.clone(),
        entries: paths,
        bytes: Arc::from(bytes),
    })
}

fn encode_canvas(encoder: &dyn BlobEncoder, canvas: &PosterCanvas, name: &str) -> Option<Vec<u8>> {
    if let Some(bytes) = encoder.to_blob(canvas) {
        return Some(bytes);
    }
    tracing::warn!(name, "falling back to data url encoding");
    match encoder
        .to_data_url(canvas)
        .and_then(|url| decode_data_url(&url))
    {
        Ok(data) => Some(data.bytes),
        Err(e) => {
            tracing::warn!(name, error = %e, "poster skipped; no encoding available");
            None
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/export/exporter.rs"]
mod tests;
