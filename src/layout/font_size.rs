use crate::foundation::config::LayoutPolicy;

/// Font size and line advance for a caption block.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct FontMetrics {
    /// Font size in pixels.
    pub size: u32,
    /// Distance between consecutive line centers, in pixels.
    pub line_height: f32,
}

impl FontMetrics {
    /// Height of a block of `lines` lines.
    pub fn block_height(&self, lines: usize) -> f32 {
        lines as f32 * self.line_height
    }
}

/// Canvas dimensions for an image: the longest edge is capped at `max_edge`, aspect ratio is
/// preserved, and images are never upscaled.
pub fn fit_canvas_to_image(width: u32, height: u32, max_edge: u32) -> (u32, u32) {
    let longest = width.max(height).max(1) as f64;
    let scale = (max_edge as f64 / longest).min(1.0);
    let w = (width as f64 * scale).round() as u32;
    let h = (height as f64 * scale).round() as u32;
    (w.max(1), h.max(1))
}

/// Derive the caption font size from the canvas size and line count.
///
/// Width first: the usable width (minus side padding) divided by the line budget, floored, then
/// scaled down for breathing room. Height second: if the block would exceed the allowed share of
/// the canvas height, the size shrinks proportionally.
///
/// The block stays within `block_height_ratio` of the canvas height only while the shrunk size is
/// at least `min_fitted_font_size`. On very short canvases that floor (20 by default) wins, and the
/// block may then be taller than the allowed share.
pub fn estimate_font_size(
    lines: &[String],
    canvas_width: u32,
    canvas_height: u32,
    policy: &LayoutPolicy,
) -> FontMetrics {
    if lines.is_empty() {
        return FontMetrics {
            size: policy.default_font_size,
            line_height: policy.default_line_height,
        };
    }

    let width = canvas_width as f64;
    let padding = width * policy.horizontal_padding_ratio as f64;
    let usable = width - padding * 2.0;

    let mut size = ((usable / policy.line_budget as f64).floor() as u32)
        .max(policy.min_initial_font_size);
    size = ((size as f64 * policy.breathing_factor as f64).floor() as u32)
        .max(policy.min_breathing_font_size);

    let ratio = policy.line_height_ratio as f64;
    let total = lines.len() as f64 * size as f64 * ratio;
    let max_height = canvas_height as f64 * policy.block_height_ratio as f64;
    if total > max_height {
        size = ((size as f64 * (max_height / total)).floor() as u32)
            .max(policy.min_fitted_font_size);
    }

    FontMetrics {
        size,
        line_height: (size as f64 * ratio) as f32,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/layout/font_size.rs"]
mod tests;
