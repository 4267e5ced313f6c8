use std::io::Cursor;
use std::sync::Arc;

use anyhow::Context;

use crate::assets::data_url::encode_data_url;
use crate::assets::decode::{DecodedBitmap, unpremultiply_rgba8_in_place};
use crate::foundation::error::{PosterError, PosterResult};

/// Mutable raster surface for one poster, premultiplied RGBA8.
pub struct PosterCanvas {
    pixmap: vello_cpu::Pixmap,
}

impl std::fmt::Debug for PosterCanvas {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PosterCanvas")
            .field("width", &self.width())
            .field("height", &self.height())
            .finish()
    }
}

impl PosterCanvas {
    /// Allocate a transparent canvas.
    pub fn new(width: u32, height: u32) -> PosterResult<Self> {
        let (w, h) = pixmap_dims(width, height)?;
        Ok(Self {
            pixmap: vello_cpu::Pixmap::new(w, h),
        })
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.pixmap.width() as u32
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.pixmap.height() as u32
    }

    /// Reset every pixel to transparent.
    pub fn clear(&mut self) {
        self.pixmap.data_as_u8_slice_mut().fill(0);
    }

    /// Premultiplied pixel at `(x, y)`.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width() || y >= self.height() {
            return None;
        }
        let i = ((y as usize) * (self.width() as usize) + x as usize) * 4;
        let px = self.pixmap.data_as_u8_slice().get(i..i + 4)?;
        Some([px[0], px[1], px[2], px[3]])
    }

    /// Straight-alpha RGBA8 copy of the canvas.
    pub fn to_rgba8(&self) -> Vec<u8> {
        let mut data = self.pixmap.data_as_u8_slice().to_vec();
        unpremultiply_rgba8_in_place(&mut data);
        data
    }

    /// Encode the canvas as PNG bytes.
    pub fn encode_png(&self) -> PosterResult<Vec<u8>> {
        let img = image::RgbaImage::from_raw(self.width(), self.height(), self.to_rgba8())
            .ok_or_else(|| PosterError::export("canvas buffer size mismatch"))?;
        let mut out = Vec::new();
        image::DynamicImage::ImageRgba8(img)
            .write_to(&mut Cursor::new(&mut out), image::ImageFormat::Png)
            .context("encode canvas as png")?;
        Ok(out)
    }

    /// Encode the canvas as a `data:image/png;base64,...` URL.
    pub fn to_data_url(&self) -> PosterResult<String> {
        Ok(encode_data_url("image/png", &self.encode_png()?))
    }

    pub(crate) fn pixmap_mut(&mut self) -> &mut vello_cpu::Pixmap {
        &mut self.pixmap
    }
}

/// Resample `bitmap` to exactly `width`x`height` and wrap it as a vello image paint.
pub(crate) fn bitmap_paint(
    bitmap: &DecodedBitmap,
    width: u32,
    height: u32,
) -> PosterResult<vello_cpu::Image> {
    let src = image::RgbaImage::from_raw(
        bitmap.width,
        bitmap.height,
        bitmap.rgba8_premul.to_vec(),
    )
    .ok_or_else(|| PosterError::validation("bitmap byte len mismatch"))?;
    let bytes = if (bitmap.width, bitmap.height) == (width, height) {
        src.into_raw()
    } else {
        // Premultiplied data filters without dark fringes.
        image::imageops::resize(&src, width, height, image::imageops::FilterType::Triangle)
            .into_raw()
    };
    let pixmap = pixmap_from_premul_bytes(&bytes, width, height)?;
    Ok(vello_cpu::Image {
        image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
        sampler: vello_cpu::peniko::ImageSampler::default(),
    })
}

fn pixmap_dims(width: u32, height: u32) -> PosterResult<(u16, u16)> {
    if width == 0 || height == 0 {
        return Err(PosterError::validation("canvas dimensions must be > 0"));
    }
    let w: u16 = width
        .try_into()
        .map_err(|_| PosterError::validation("canvas width exceeds u16"))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| PosterError::validation("canvas height exceeds u16"))?;
    Ok((w, h))
}

fn pixmap_from_premul_bytes(
    bytes: &[u8],
    width: u32,
    height: u32,
) -> PosterResult<vello_cpu::Pixmap> {
    let (w, h) = pixmap_dims(width, height)?;
    if bytes.len()
        != (width as usize)
            .saturating_mul(height as usize)
            .saturating_mul(4)
    {
        return Err(PosterError::validation("pixmap byte len mismatch"));
    }
    // Pixmap stores PremulRgba8; our bytes are already premultiplied.
    let pixels: Vec<vello_cpu::peniko::color::PremulRgba8> = bytes
        .chunks_exact(4)
        .map(|px| {
            vello_cpu::peniko::color::PremulRgba8::from_u8_array([px[0], px[1], px[2], px[3]])
        })
        .collect();
    let may_have_opacities = bytes.chunks_exact(4).any(|px| px[3] != 255);
    Ok(vello_cpu::Pixmap::from_parts_with_opacity(
        pixels,
        w,
        h,
        may_have_opacities,
    ))
}

#[cfg(test)]
#[path = "../../tests/unit/render/canvas.rs"]
mod tests;
