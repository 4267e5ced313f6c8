use std::collections::HashSet;
use std::sync::Arc;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::assets::blob::{BlobRegistry, BlobUrl};
use crate::assets::decode::DecodedBitmap;
use crate::assets::loader::{CancelToken, ImageLoader};
use crate::assets::source::{
    SelectedTemplates, Source, TemplateLibrary, UploadFile, resolve_sources, shuffle_sources,
};
use crate::export::archive::{Archive, ArchivePacker, ZipPacker};
use crate::export::exporter::{BlobEncoder, ExportSettings, PngBlobEncoder, export_entries};
use crate::foundation::config::PosterConfig;
use crate::foundation::error::{PosterError, PosterResult};
use crate::render::entry::Entry;
use crate::render::poster::PosterRenderer;
use crate::session::captions::{has_any_caption, parse_captions};

/// Counts behind the status line and the font label.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize)]
pub struct StatusSummary {
    /// Selected templates.
    pub templates: usize,
    /// Uploaded files.
    pub uploads: usize,
    /// Templates plus uploads.
    pub images: usize,
    /// Parsed caption lines, blank interior lines included.
    pub captions: usize,
    /// Images that will pair with no caption line.
    pub missing_captions: usize,
    /// Entries in the current preview.
    pub entries: usize,
    /// Distinct fonts used by the current preview.
    pub fonts: usize,
}

/// A build that has been validated and resolved but not loaded yet.
///
/// Loading needs no access to the session, so it may run on another thread while the session
/// stays usable. Beginning another build on the same session cancels this one.
pub struct BuildJob {
    sources: Vec<Source>,
    captions: Vec<String>,
    token: CancelToken,
    loader: Arc<ImageLoader>,
}

impl std::fmt::Debug for BuildJob {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BuildJob")
            .field("sources", &self.sources.len())
            .field("captions", &self.captions.len())
            .field("cancelled", &self.token.is_cancelled())
            .finish()
    }
}

impl BuildJob {
    /// Sources in pairing order.
    pub fn sources(&self) -> &[Source] {
        &self.sources
    }

    /// Cancellation handle for this build.
    pub fn cancel_token(&self) -> &CancelToken {
        &self.token
    }

    /// Decode every source concurrently. Fails as a whole if any source fails.
    pub fn load(self) -> PosterResult<LoadedBuild> {
        let images = self.loader.load_all(&self.sources, &self.token)?;
        Ok(LoadedBuild {
            sources: self.sources,
            captions: self.captions,
            images,
            token: self.token,
        })
    }
}

/// Decoded images waiting to be turned into entries.
#[derive(Debug)]
pub struct LoadedBuild {
    sources: Vec<Source>,
    captions: Vec<String>,
    images: Vec<Arc<DecodedBitmap>>,
    token: CancelToken,
}

/// Owns everything one user's poster workflow needs: the template selection, uploads, captions,
/// the font pool and its random source, the current preview and the archive download slot.
pub struct PosterSession {
    config: PosterConfig,
    library: TemplateLibrary,
    selected: SelectedTemplates,
    uploads: Vec<UploadFile>,
    captions: String,
    rng: StdRng,
    entries: Vec<Entry>,
    renderer: PosterRenderer,
    loader: Arc<ImageLoader>,
    blobs: BlobRegistry,
    encoder: Box<dyn BlobEncoder>,
    packer: Option<Box<dyn ArchivePacker>>,
    export_settings: ExportSettings,
    last_archive: Option<BlobUrl>,
    in_flight: Option<CancelToken>,
}

impl std::fmt::Debug for PosterSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PosterSession")
            .field("templates", &self.library.len())
            .field("selected", &self.selected.len())
            .field("uploads", &self.uploads.len())
            .field("entries", &self.entries.len())
            .field("archive", &self.archive_url())
            .finish()
    }
}

impl PosterSession {
    /// Session over a validated `config`, seeded from the OS.
    pub fn new(config: PosterConfig) -> PosterResult<Self> {
        Self::with_rng(config, StdRng::from_os_rng())
    }

    /// Session with a deterministic font and shuffle sequence.
    pub fn with_seed(config: PosterConfig, seed: u64) -> PosterResult<Self> {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }

    fn with_rng(config: PosterConfig, rng: StdRng) -> PosterResult<Self> {
        config.validate()?;
        let blobs = BlobRegistry::new();
        let loader = ImageLoader::new(
            config.templates_root.clone(),
            blobs.clone(),
            config.loader_threads,
        )?;
        Ok(Self {
            library: TemplateLibrary::new(config.templates.clone())?,
            selected: SelectedTemplates::new(),
            uploads: Vec::new(),
            captions: String::new(),
            rng,
            entries: Vec::new(),
            renderer: PosterRenderer::new(&config)?,
            loader: Arc::new(loader),
            blobs,
            encoder: Box::new(PngBlobEncoder),
            packer: Some(Box::new(ZipPacker::default())),
            export_settings: ExportSettings::from_config(&config),
            last_archive: None,
            in_flight: None,
            config,
        })
    }

    /// Replace the archive packer. `None` makes export fail with
    /// [`PosterError::ExportUnavailable`].
    pub fn set_packer(&mut self, packer: Option<Box<dyn ArchivePacker>>) {
        self.packer = packer;
    }

    /// Replace the canvas encoder used by export.
    pub fn set_encoder(&mut self, encoder: Box<dyn BlobEncoder>) {
        self.encoder = encoder;
    }

    /// Active configuration.
    pub fn config(&self) -> &PosterConfig {
        &self.config
    }

    /// Template catalog.
    pub fn library(&self) -> &TemplateLibrary {
        &self.library
    }

    /// Current template selection.
    pub fn selected(&self) -> &SelectedTemplates {
        &self.selected
    }

    /// Select a template by name.
    pub fn select_template(&mut self, name: &str) -> PosterResult<()> {
        self.selected.select(&self.library, name)
    }

    /// Deselect a template by name.
    pub fn deselect_template(&mut self, name: &str) {
        self.selected.deselect(name);
    }

    /// Flip a template's selection; returns whether it is now selected.
    pub fn toggle_template(&mut self, name: &str) -> PosterResult<bool> {
        self.selected.toggle(&self.library, name)
    }

    /// Select every template in the catalog.
    pub fn select_all_templates(&mut self) {
        self.selected.select_all(&self.library);
    }

    /// Deselect every template.
    pub fn clear_templates(&mut self) {
        self.selected.clear();
    }

    /// Replace the uploaded files.
    pub fn set_uploads(&mut self, uploads: Vec<UploadFile>) {
        self.uploads = uploads;
    }

    /// Uploaded files, in upload order.
    pub fn uploads(&self) -> &[UploadFile] {
        &self.uploads
    }

    /// Replace the raw caption input.
    pub fn set_captions(&mut self, text: impl Into<String>) {
        self.captions = text.into();
    }

    /// Parsed caption lines.
    pub fn caption_lines(&self) -> Vec<String> {
        parse_captions(&self.captions)
    }

    /// Current preview entries.
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// URL of the last exported archive, while its slot is live.
    pub fn archive_url(&self) -> Option<&str> {
        self.last_archive.as_ref().map(BlobUrl::url)
    }

    /// Registry holding upload and archive handles.
    pub fn blobs(&self) -> &BlobRegistry {
        &self.blobs
    }

    /// Validate inputs, resolve sources and start a new build.
    ///
    /// Any previous build that has not finished is cancelled and the preview is cleared. Nothing
    /// changes when validation fails.
    pub fn begin_build(&mut self, shuffle: bool) -> PosterResult<BuildJob> {
        let mut sources = resolve_sources(&self.library, &self.selected, &self.uploads);
        if sources.is_empty() {
            return Err(PosterError::NoSourcesSelected);
        }
        let captions = self.caption_lines();
        if !has_any_caption(&captions) {
            return Err(PosterError::NoCaptionProvided);
        }

        if let Some(prev) = self.in_flight.take() {
            prev.cancel();
        }
        self.clear();
        if shuffle {
            shuffle_sources(&mut sources, &mut self.rng);
        }

        let token = CancelToken::new();
        self.in_flight = Some(token.clone());
        tracing::debug!(
            sources = sources.len(),
            captions = captions.len(),
            shuffle,
            "build started"
        );
        Ok(BuildJob {
            sources,
            captions,
            token,
            loader: Arc::clone(&self.loader),
        })
    }

    /// Pair loaded images with captions, assign fonts and render every entry in order.
    ///
    /// Returns the number of entries in the new preview.
    pub fn finish_build(&mut self, loaded: LoadedBuild) -> PosterResult<usize> {
        if loaded.token.is_cancelled() {
            return Err(PosterError::Cancelled);
        }
        self.in_flight = None;

        let max_edge = self.config.layout.max_canvas_edge;
        let mut entries = Vec::new();
        for (i, (source, image)) in loaded.sources.into_iter().zip(loaded.images).enumerate() {
            let caption = loaded.captions.get(i).cloned().unwrap_or_default();
            if caption.trim().is_empty() {
                tracing::debug!(name = %source.name, "no caption; entry dropped");
                continue;
            }
            let font = self.pick_font();
            entries.push(Entry::new(source.name, caption, image, font, max_edge)?);
        }
        if entries.is_empty() {
            return Err(PosterError::NoRenderableEntries);
        }

        for entry in &mut entries {
            self.renderer.render(entry)?;
        }
        self.entries = entries;
        Ok(self.entries.len())
    }

    /// Full build: validate, load concurrently, render sequentially.
    #[tracing::instrument(skip(self))]
    pub fn build(&mut self, shuffle: bool) -> PosterResult<usize> {
        let job = self.begin_build(shuffle)?;
        let loaded = match job.load() {
            Ok(loaded) => loaded,
            Err(e) => {
                self.in_flight = None;
                return Err(e);
            }
        };
        self.finish_build(loaded)
    }

    /// Give every entry a new random font and redraw it. No-op without a preview.
    #[tracing::instrument(skip(self), fields(entries = self.entries.len()))]
    pub fn reroll_fonts(&mut self) -> PosterResult<()> {
        if self.entries.is_empty() {
            return Ok(());
        }
        let mut entries = std::mem::take(&mut self.entries);
        for entry in &mut entries {
            entry.font = self.pick_font();
        }
        let rendered = entries
            .iter_mut()
            .try_for_each(|entry| self.renderer.render(entry).map(drop));
        self.entries = entries;
        rendered
    }

    /// Drop the current preview.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Counts for the status line.
    pub fn status(&self) -> StatusSummary {
        let templates = self.selected.len();
        let uploads = self.uploads.len();
        let images = templates + uploads;
        let captions = self.caption_lines().len();
        StatusSummary {
            templates,
            uploads,
            images,
            captions,
            missing_captions: images.saturating_sub(captions),
            entries: self.entries.len(),
            fonts: self.font_variety(),
        }
    }

    /// Number of distinct fonts in the current preview.
    pub fn font_variety(&self) -> usize {
        self.entries
            .iter()
            .map(|e| e.font.as_str())
            .collect::<HashSet<_>>()
            .len()
    }

    /// Pack the current preview into an archive.
    ///
    /// The previous archive's download slot is revoked first. The preview is untouched whether
    /// export succeeds or not.
    #[tracing::instrument(skip(self), fields(entries = self.entries.len()))]
    pub fn export(&mut self) -> PosterResult<Archive> {
        if let Some(prev) = self.last_archive.take() {
            prev.revoke();
        }
        let archive = export_entries(
            &self.entries,
            &self.export_settings,
            self.encoder.as_ref(),
            self.packer.as_deref(),
        )?;
        self.last_archive = Some(self.blobs.register(Arc::clone(&archive.bytes)));
        Ok(archive)
    }

    fn pick_font(&mut self) -> String {
        let pool = &self.config.font_pool;
        pool[self.rng.random_range(0..pool.len())].clone()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/preview.rs"]
mod tests;
