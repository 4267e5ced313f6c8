use std::collections::HashMap;

use crate::foundation::config::{LayoutPolicy, PosterConfig};
use crate::foundation::error::{PosterError, PosterResult};
use crate::layout::font_size::{FontMetrics, estimate_font_size};
use crate::render::canvas::bitmap_paint;
use crate::render::entry::Entry;
use crate::render::fonts::{FontBook, TextBrushRgba8};
use crate::text::chunk::chunk;

/// Where each caption line goes on a canvas.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct CaptionLayout {
    /// Caption split into display lines.
    pub lines: Vec<String>,
    /// Font size and line advance for the block.
    pub metrics: FontMetrics,
    /// Horizontal center shared by every line.
    pub center_x: f32,
    /// Vertical center of the first line.
    pub first_center_y: f32,
}

impl CaptionLayout {
    /// Chunk `caption` and center the resulting block on a `width`x`height` canvas.
    pub fn plan(caption: &str, width: u32, height: u32, policy: &LayoutPolicy) -> Self {
        let lines = chunk(caption, policy.line_budget);
        let metrics = estimate_font_size(&lines, width, height, policy);
        let n = lines.len().max(1) as f32;
        Self {
            center_x: width as f32 / 2.0,
            first_center_y: height as f32 / 2.0 - (n - 1.0) * metrics.line_height / 2.0,
            lines,
            metrics,
        }
    }

    /// Vertical center of every line, top to bottom.
    pub fn line_centers(&self) -> impl Iterator<Item = f32> + '_ {
        (0..self.lines.len()).map(|i| self.first_center_y + i as f32 * self.metrics.line_height)
    }
}

/// Draws entries: background image scaled to the canvas, then the centered caption block.
pub struct PosterRenderer {
    fonts: FontBook,
    policy: LayoutPolicy,
    fallbacks: Vec<String>,
    brush: TextBrushRgba8,
    weight: f32,
    font_data: HashMap<(u64, u32), vello_cpu::peniko::FontData>,
}

impl PosterRenderer {
    /// Renderer for `config`. Font files are only read when a family is first drawn.
    pub fn new(config: &PosterConfig) -> PosterResult<Self> {
        Ok(Self {
            fonts: FontBook::new(&config.fonts),
            policy: config.layout,
            fallbacks: config.fallback_families.clone(),
            brush: TextBrushRgba8::opaque(config.text_rgb()?),
            weight: config.font_weight,
            font_data: HashMap::new(),
        })
    }

    /// Redraw `entry.canvas` from scratch.
    ///
    /// Waits for the entry's font (and the fallback families) to be loaded before shaping. A
    /// non-blank caption that no configured face can draw fails with
    /// [`PosterError::FontUnavailable`]; blank captions only get the image.
    #[tracing::instrument(skip_all, fields(name = %entry.name, font = %entry.font))]
    pub fn render(&mut self, entry: &mut Entry) -> PosterResult<CaptionLayout> {
        let width = entry.canvas.width();
        let height = entry.canvas.height();
        let plan = CaptionLayout::plan(&entry.caption, width, height, &self.policy);

        entry.canvas.clear();
        let pixmap = entry.canvas.pixmap_mut();
        let mut ctx = vello_cpu::RenderContext::new(pixmap.width(), pixmap.height());

        ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        ctx.set_paint(bitmap_paint(&entry.image, width, height)?);
        ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
            0.0,
            0.0,
            width as f64,
            height as f64,
        ));

        if entry.has_caption() {
            let drawn = if self.fonts_ready(&entry.font) {
                self.draw_caption(&mut ctx, &plan, &entry.font)?
            } else {
                0
            };
            if drawn == 0 {
                return Err(PosterError::FontUnavailable {
                    font: entry.font.clone(),
                });
            }
        }

        ctx.flush();
        ctx.render_to_pixmap(entry.canvas.pixmap_mut());
        tracing::debug!(
            lines = plan.lines.len(),
            size = plan.metrics.size,
            width,
            height,
            "rendered poster"
        );
        Ok(plan)
    }

    fn fonts_ready(&mut self, family: &str) -> bool {
        let mut any = self.fonts.ensure_ready(family);
        for fallback in &self.fallbacks {
            any |= self.fonts.ensure_ready(fallback);
        }
        any && self.fonts.has_faces()
    }

    fn draw_caption(
        &mut self,
        ctx: &mut vello_cpu::RenderContext,
        plan: &CaptionLayout,
        family: &str,
    ) -> PosterResult<usize> {
        let stack = self.fonts.stack_source(family, &self.fallbacks);
        ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
            self.brush.r,
            self.brush.g,
            self.brush.b,
            self.brush.a,
        ));

        let mut drawn = 0;
        for (line, center_y) in plan.lines.iter().zip(plan.line_centers()) {
            if line.trim().is_empty() {
                continue;
            }
            let layout = self.fonts.layout_line(
                line,
                &stack,
                plan.metrics.size as f32,
                self.weight,
                self.brush,
            )?;
            // Glyph y is relative to the layout top, so centering the box centers the line.
            let origin = kurbo::Vec2::new(
                plan.center_x as f64 - layout.width() as f64 / 2.0,
                center_y as f64 - layout.height() as f64 / 2.0,
            );
            ctx.set_transform(affine_to_cpu(kurbo::Affine::translate(origin)));

            for pline in layout.lines() {
                for item in pline.items() {
                    let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                        continue;
                    };
                    let font = run.run().font();
                    let font = self
                        .font_data
                        .entry((font.data.id(), font.index))
                        .or_insert_with(|| {
                            vello_cpu::peniko::FontData::new(
                                vello_cpu::peniko::Blob::from(font.data.data().to_vec()),
                                font.index,
                            )
                        })
                        .clone();
                    let glyphs = run
                        .positioned_glyphs()
                        .map(|g| vello_cpu::Glyph {
                            id: g.id,
                            x: g.x,
                            y: g.y,
                        })
                        .collect::<Vec<_>>();
                    drawn += glyphs.len();
                    ctx.glyph_run(&font)
                        .font_size(run.run().font_size())
                        .fill_glyphs(glyphs.into_iter());
                }
            }
        }
        Ok(drawn)
    }
}

fn affine_to_cpu(a: kurbo::Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

#[cfg(test)]
#[path = "../../tests/unit/render/poster.rs"]
mod tests;
