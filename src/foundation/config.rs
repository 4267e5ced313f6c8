use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use crate::foundation::error::{PosterError, PosterResult};

/// Fixed layout policy values.
///
/// Defaults reproduce the reference poster look exactly; overriding them through configuration is
/// supported but not expected in normal use.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LayoutPolicy {
    /// Longest canvas edge in pixels; larger images are scaled down, never up.
    pub max_canvas_edge: u32,
    /// Maximum graphemes per display line.
    pub line_budget: usize,
    /// Horizontal padding per side, as a fraction of canvas width.
    pub horizontal_padding_ratio: f32,
    /// Maximum caption block height, as a fraction of canvas height.
    pub block_height_ratio: f32,
    /// Floor for the width-derived font size.
    pub min_initial_font_size: u32,
    /// Scale applied to the width-derived font size.
    pub breathing_factor: f32,
    /// Floor after the breathing scale.
    pub min_breathing_font_size: u32,
    /// Floor after shrinking to fit the block height.
    pub min_fitted_font_size: u32,
    /// Line height as a multiple of font size.
    pub line_height_ratio: f32,
    /// Font size used when there are no lines.
    pub default_font_size: u32,
    /// Line height used when there are no lines.
    pub default_line_height: f32,
}

impl Default for LayoutPolicy {
    fn default() -> Self {
        Self {
            max_canvas_edge: 1600,
            line_budget: 7,
            horizontal_padding_ratio: 0.08,
            block_height_ratio: 0.78,
            min_initial_font_size: 24,
            breathing_factor: 0.7,
            min_breathing_font_size: 18,
            min_fitted_font_size: 20,
            line_height_ratio: 1.3,
            default_font_size: 42,
            default_line_height: 54.0,
        }
    }
}

impl LayoutPolicy {
    /// Reject values that would make layout degenerate.
    pub fn validate(&self) -> PosterResult<()> {
        if self.max_canvas_edge == 0 {
            return Err(PosterError::validation("max_canvas_edge must be > 0"));
        }
        if self.line_budget == 0 {
            return Err(PosterError::validation("line_budget must be > 0"));
        }
        if !(0.0..0.5).contains(&self.horizontal_padding_ratio) {
            return Err(PosterError::validation(
                "horizontal_padding_ratio must be in [0, 0.5)",
            ));
        }
        let ratios = [
            ("block_height_ratio", self.block_height_ratio),
            ("breathing_factor", self.breathing_factor),
        ];
        for (name, v) in ratios {
            if !v.is_finite() || v <= 0.0 || v > 1.0 {
                return Err(PosterError::validation(format!("{name} must be in (0, 1]")));
            }
        }
        if !self.line_height_ratio.is_finite() || self.line_height_ratio <= 0.0 {
            return Err(PosterError::validation("line_height_ratio must be > 0"));
        }
        Ok(())
    }
}

/// Named background image in the template catalog.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Template {
    /// Unique display name, e.g. `IMG_5315.JPG`.
    pub name: String,
    /// Path relative to `templates_root`, or a `data:` URL.
    pub src: String,
}

/// Font file backing a family name.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct FontFace {
    /// Family name used in the font pool and fallback chain.
    pub family: String,
    /// Path to a `.ttf`/`.otf`/`.ttc` file, relative to the config file.
    pub source: PathBuf,
}

/// Application configuration.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PosterConfig {
    /// Layout constants.
    pub layout: LayoutPolicy,
    /// Template catalog, in display order.
    pub templates: Vec<Template>,
    /// Directory that relative template sources resolve against.
    pub templates_root: PathBuf,
    /// Families randomly assigned to entries.
    pub font_pool: Vec<String>,
    /// Font files registered on demand.
    pub fonts: Vec<FontFace>,
    /// Families tried after the assigned font for glyph coverage.
    pub fallback_families: Vec<String>,
    /// Caption fill color as `#RRGGBB`.
    pub text_color: String,
    /// Caption font weight.
    pub font_weight: f32,
    /// File name offered for the archive download.
    pub archive_name: String,
    /// Folder inside the archive that holds the posters.
    pub archive_folder: String,
    /// Suffix appended to each sanitized poster name.
    pub file_suffix: String,
    /// Worker threads used for image decoding. `None` uses rayon defaults.
    pub loader_threads: Option<usize>,
}

impl Default for PosterConfig {
    fn default() -> Self {
        Self {
            layout: LayoutPolicy::default(),
            templates: Vec::new(),
            templates_root: PathBuf::from("."),
            font_pool: [
                "ZCOOL KuaiLe",
                "ZCOOL XiaoWei",
                "Noto Sans HK",
                "Noto Sans TC",
                "Noto Serif HK",
                "Noto Sans SC",
            ]
            .into_iter()
            .map(str::to_owned)
            .collect(),
            fonts: Vec::new(),
            fallback_families: ["Noto Sans SC", "Noto Color Emoji", "sans-serif"]
                .into_iter()
                .map(str::to_owned)
                .collect(),
            text_color: "#413F3F".to_owned(),
            font_weight: 700.0,
            archive_name: "xiaohongshu-posters.zip".to_owned(),
            archive_folder: "posters".to_owned(),
            file_suffix: "-poster.png".to_owned(),
            loader_threads: None,
        }
    }
}

impl PosterConfig {
    /// Parse configuration from a JSON reader.
    pub fn from_reader<R: std::io::Read>(r: R) -> PosterResult<Self> {
        let cfg: Self = serde_json::from_reader(r)
            .map_err(|e| PosterError::validation(format!("parse config JSON: {e}")))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Parse configuration from a JSON file on disk.
    ///
    /// Relative `templates_root` and font sources are resolved against the file's directory.
    pub fn from_path(path: impl AsRef<Path>) -> PosterResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            PosterError::validation(format!("open config JSON '{}': {e}", path.display()))
        })?;
        let mut cfg = Self::from_reader(BufReader::new(f))?;
        if let Some(base) = path.parent() {
            cfg.rebase(base);
        }
        Ok(cfg)
    }

    /// Validate catalog and policy invariants.
    pub fn validate(&self) -> PosterResult<()> {
        self.layout.validate()?;
        if self.font_pool.is_empty() {
            return Err(PosterError::validation("font_pool must be non-empty"));
        }
        let mut seen = std::collections::HashSet::new();
        for t in &self.templates {
            if t.name.is_empty() {
                return Err(PosterError::validation("template name must be non-empty"));
            }
            if !seen.insert(t.name.as_str()) {
                return Err(PosterError::validation(format!(
                    "duplicate template name '{}'",
                    t.name
                )));
            }
        }
        parse_hex_rgb(&self.text_color)?;
        if self.archive_name.is_empty() || self.archive_folder.is_empty() {
            return Err(PosterError::validation(
                "archive_name and archive_folder must be non-empty",
            ));
        }
        if self.loader_threads == Some(0) {
            return Err(PosterError::validation("loader_threads must be >= 1 when set"));
        }
        Ok(())
    }

    /// Caption color as RGB bytes.
    pub fn text_rgb(&self) -> PosterResult<[u8; 3]> {
        parse_hex_rgb(&self.text_color)
    }

    fn rebase(&mut self, base: &Path) {
        if self.templates_root.is_relative() {
            self.templates_root = base.join(&self.templates_root);
        }
        for face in &mut self.fonts {
            if face.source.is_relative() {
                face.source = base.join(&face.source);
            }
        }
    }
}

/// Parse `#RRGGBB` into RGB bytes.
pub fn parse_hex_rgb(s: &str) -> PosterResult<[u8; 3]> {
    let hex = s
        .strip_prefix('#')
        .filter(|h| h.len() == 6 && h.is_ascii())
        .ok_or_else(|| PosterError::validation(format!("color '{s}' must be #RRGGBB")))?;
    let mut out = [0u8; 3];
    for (i, c) in out.iter_mut().enumerate() {
        *c = u8::from_str_radix(&hex[i * 2..i * 2 + 2], 16)
            .map_err(|_| PosterError::validation(format!("color '{s}' must be #RRGGBB")))?;
    }
    Ok(out)
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/config.rs"]
mod tests;
