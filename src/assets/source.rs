use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use rand::Rng;
use rand::seq::SliceRandom;

use crate::foundation::config::Template;
use crate::foundation::error::{PosterError, PosterResult};

/// Where a source came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize)]
pub enum SourceKind {
    /// Built-in catalog image.
    Template,
    /// User-supplied file.
    Upload,
}

/// In-memory user upload.
#[derive(Clone)]
pub struct UploadFile {
    /// Original file name.
    pub name: String,
    /// Encoded image bytes.
    pub bytes: Arc<[u8]>,
}

impl std::fmt::Debug for UploadFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UploadFile")
            .field("name", &self.name)
            .field("bytes_len", &self.bytes.len())
            .finish()
    }
}

impl UploadFile {
    /// Wrap already-read bytes.
    pub fn new(name: impl Into<String>, bytes: impl Into<Arc<[u8]>>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }

    /// Read an upload from disk, named after its file name.
    pub fn from_path(path: impl AsRef<Path>) -> PosterResult<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)
            .with_context(|| format!("read upload '{}'", path.display()))?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(Self::new(name, bytes))
    }
}

/// Location of a source's encoded bytes.
#[derive(Clone, Debug)]
pub enum SourceLocator {
    /// Catalog `src`: a path relative to the templates root, or a `data:` URL.
    Url(String),
    /// Upload held in memory.
    File(UploadFile),
}

/// Background image source; templates and uploads normalize to this shape.
#[derive(Clone, Debug)]
pub struct Source {
    /// Template or upload.
    pub kind: SourceKind,
    /// Display name, also used to name exported files.
    pub name: String,
    /// Where to read the bytes from.
    pub locator: SourceLocator,
}

impl Source {
    /// Source for a catalog template.
    pub fn template(t: &Template) -> Self {
        Self {
            kind: SourceKind::Template,
            name: t.name.clone(),
            locator: SourceLocator::Url(t.src.clone()),
        }
    }

    /// Source for an upload.
    pub fn upload(file: UploadFile) -> Self {
        Self {
            kind: SourceKind::Upload,
            name: file.name.clone(),
            locator: SourceLocator::File(file),
        }
    }
}

/// Ordered, read-only template catalog.
#[derive(Clone, Debug, Default)]
pub struct TemplateLibrary {
    templates: Vec<Template>,
}

impl TemplateLibrary {
    /// Build a catalog, rejecting duplicate names.
    pub fn new(templates: Vec<Template>) -> PosterResult<Self> {
        let mut seen = HashSet::new();
        for t in &templates {
            if !seen.insert(t.name.as_str()) {
                return Err(PosterError::validation(format!(
                    "duplicate template name '{}'",
                    t.name
                )));
            }
        }
        Ok(Self { templates })
    }

    /// Templates in catalog order.
    pub fn iter(&self) -> impl Iterator<Item = &Template> {
        self.templates.iter()
    }

    /// Lookup a template by name.
    pub fn get(&self, name: &str) -> Option<&Template> {
        self.templates.iter().find(|t| t.name == name)
    }

    /// Number of templates.
    pub fn len(&self) -> usize {
        self.templates.len()
    }

    /// Return `true` when the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

/// Set of selected template names; every name exists in the library it was built against.
#[derive(Clone, Debug, Default)]
pub struct SelectedTemplates {
    names: HashSet<String>,
}

impl SelectedTemplates {
    /// Empty selection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Select `name`.
    pub fn select(&mut self, library: &TemplateLibrary, name: &str) -> PosterResult<()> {
        if library.get(name).is_none() {
            return Err(PosterError::validation(format!("unknown template '{name}'")));
        }
        self.names.insert(name.to_owned());
        Ok(())
    }

    /// Deselect `name`; unknown names are ignored.
    pub fn deselect(&mut self, name: &str) {
        self.names.remove(name);
    }

    /// Flip the selection of `name` and return the new state.
    pub fn toggle(&mut self, library: &TemplateLibrary, name: &str) -> PosterResult<bool> {
        if self.names.remove(name) {
            return Ok(false);
        }
        self.select(library, name)?;
        Ok(true)
    }

    /// Select every template in `library`.
    pub fn select_all(&mut self, library: &TemplateLibrary) {
        self.names.extend(library.iter().map(|t| t.name.clone()));
    }

    /// Deselect everything.
    pub fn clear(&mut self) {
        self.names.clear();
    }

    /// Return `true` when `name` is selected.
    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    /// Number of selected templates.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Return `true` when nothing is selected.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Selected templates in catalog order.
    pub fn in_catalog_order<'a>(&self, library: &'a TemplateLibrary) -> Vec<&'a Template> {
        library.iter().filter(|t| self.contains(&t.name)).collect()
    }
}

/// Merge selected templates (catalog order) and uploads (given order) into one source list.
pub fn resolve_sources(
    library: &TemplateLibrary,
    selected: &SelectedTemplates,
    uploads: &[UploadFile],
) -> Vec<Source> {
    selected
        .in_catalog_order(library)
        .into_iter()
        .map(Source::template)
        .chain(uploads.iter().cloned().map(Source::upload))
        .collect()
}

/// Uniform random permutation (Fisher–Yates) of the source list.
pub fn shuffle_sources<R: Rng + ?Sized>(sources: &mut [Source], rng: &mut R) {
    sources.shuffle(rng);
}

#[cfg(test)]
#[path = "../../tests/unit/assets/source.rs"]
mod tests;
