use std::sync::Arc;

use crate::assets::decode::DecodedBitmap;
use crate::foundation::error::PosterResult;
use crate::layout::font_size::fit_canvas_to_image;
use crate::render::canvas::PosterCanvas;

/// One poster job: a decoded source image paired with its caption.
#[derive(Debug)]
pub struct Entry {
    /// Display name of the source (template name or upload file name).
    pub name: String,
    /// Caption text, possibly multi-line.
    pub caption: String,
    /// Decoded source image.
    pub image: Arc<DecodedBitmap>,
    /// Target surface, sized to the image bounded by the canvas edge limit.
    pub canvas: PosterCanvas,
    /// Family name drawn from the font pool.
    pub font: String,
}

impl Entry {
    /// Build an entry with a canvas fitted to `image`.
    pub fn new(
        name: impl Into<String>,
        caption: impl Into<String>,
        image: Arc<DecodedBitmap>,
        font: impl Into<String>,
        max_canvas_edge: u32,
    ) -> PosterResult<Self> {
        let (w, h) = fit_canvas_to_image(image.width, image.height, max_canvas_edge);
        Ok(Self {
            name: name.into(),
            caption: caption.into(),
            canvas: PosterCanvas::new(w, h)?,
            image,
            font: font.into(),
        })
    }

    /// Whether the caption has any visible text.
    pub fn has_caption(&self) -> bool {
        !self.caption.trim().is_empty()
    }
}
