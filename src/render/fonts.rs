use std::borrow::Cow;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use crate::foundation::config::FontFace;
use crate::foundation::error::{PosterError, PosterResult};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
/// RGBA8 brush color used by Parley text layout.
pub(crate) struct TextBrushRgba8 {
    /// Red channel.
    pub(crate) r: u8,
    /// Green channel.
    pub(crate) g: u8,
    /// Blue channel.
    pub(crate) b: u8,
    /// Alpha channel.
    pub(crate) a: u8,
}

impl TextBrushRgba8 {
    pub(crate) fn opaque([r, g, b]: [u8; 3]) -> Self {
        Self { r, g, b, a: 255 }
    }
}

const GENERIC_FAMILIES: &[&str] = &[
    "serif",
    "sans-serif",
    "monospace",
    "cursive",
    "fantasy",
    "system-ui",
    "emoji",
];

/// Configured font faces, registered into a Parley collection on first use.
///
/// A family counts as ready once its file was read and Parley accepted at least one face from it.
/// Families without a configured file, or whose file fails to load, are left to the fallback chain.
pub(crate) struct FontBook {
    sources: HashMap<String, PathBuf>,
    registered: HashMap<String, String>,
    failed: HashSet<String>,
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<TextBrushRgba8>,
}

impl FontBook {
    pub(crate) fn new(faces: &[FontFace]) -> Self {
        Self {
            sources: faces
                .iter()
                .map(|f| (f.family.clone(), f.source.clone()))
                .collect(),
            registered: HashMap::new(),
            failed: HashSet::new(),
            font_ctx: parley::FontContext::default(),
            layout_ctx: parley::LayoutContext::new(),
        }
    }

    /// Load `family` if needed. Returns whether it can be used for shaping.
    pub(crate) fn ensure_ready(&mut self, family: &str) -> bool {
        if self.registered.contains_key(family) {
            return true;
        }
        if self.failed.contains(family) {
            return false;
        }
        let Some(path) = self.sources.get(family).cloned() else {
            return false;
        };
        match self.register(&path) {
            Ok(name) => {
                tracing::debug!(family, registered = %name, path = %path.display(), "font ready");
                self.registered.insert(family.to_owned(), name);
                true
            }
            Err(e) => {
                tracing::warn!(family, path = %path.display(), error = %e, "font failed to load");
                self.failed.insert(family.to_owned());
                false
            }
        }
    }

    /// Whether any configured face has been registered.
    pub(crate) fn has_faces(&self) -> bool {
        !self.registered.is_empty()
    }

    /// CSS-style font stack source: the primary family, then `fallbacks`.
    pub(crate) fn stack_source(&self, family: &str, fallbacks: &[String]) -> String {
        std::iter::once(family)
            .chain(fallbacks.iter().map(String::as_str))
            .map(|name| {
                if GENERIC_FAMILIES.contains(&name) {
                    name.to_owned()
                } else {
                    let resolved = self.registered.get(name).map_or(name, String::as_str);
                    format!("\"{}\"", resolved.replace('"', ""))
                }
            })
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Shape a single unwrapped line.
    pub(crate) fn layout_line(
        &mut self,
        text: &str,
        stack_source: &str,
        size_px: f32,
        weight: f32,
        brush: TextBrushRgba8,
    ) -> PosterResult<parley::Layout<TextBrushRgba8>> {
        if !size_px.is_finite() || size_px <= 0.0 {
            return Err(PosterError::validation(
                "text size_px must be finite and > 0",
            ));
        }

        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(Cow::Owned(stack_source.to_owned())),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(size_px));
        builder.push_default(parley::style::StyleProperty::FontWeight(
            parley::style::FontWeight::new(weight),
        ));
        builder.push_default(parley::style::StyleProperty::Brush(brush));

        let mut layout: parley::Layout<TextBrushRgba8> = builder.build(text);
        layout.break_all_lines(None);
        Ok(layout)
    }

    fn register(&mut self, path: &Path) -> PosterResult<String> {
        let bytes = std::fs::read(path)
            .map_err(|e| PosterError::validation(format!("read font '{}': {e}", path.display())))?;
        let families = self
            .font_ctx
            .collection
            .register_fonts(parley::fontique::Blob::from(bytes), None);
        let family_id = families
            .first()
            .map(|(id, _)| *id)
            .ok_or_else(|| PosterError::validation("no font families registered from font bytes"))?;
        Ok(self
            .font_ctx
            .collection
            .family_name(family_id)
            .ok_or_else(|| PosterError::validation("registered font family has no name"))?
            .to_string())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/fonts.rs"]
mod tests;
