//! Grapheme segmentation.
//!
//! Line budgets are measured in user-perceived characters, so every text operation goes through a
//! [`GraphemeSegmenter`]. [`UnicodeSegmenter`] implements extended grapheme clusters (UAX #29);
//! [`CodePointSegmenter`] is the conservative fallback that treats each `char` as one unit. The
//! fallback never drops or reorders text, it only over-counts combined sequences (an emoji with a
//! skin-tone modifier counts as two), which makes lines wrap earlier than necessary.

use unicode_segmentation::UnicodeSegmentation;

/// Pluggable "split into user-perceived characters" capability.
pub trait GraphemeSegmenter: Send + Sync {
    /// Return `(byte_offset, grapheme)` pairs covering `text` in order.
    fn grapheme_indices<'a>(&self, text: &'a str) -> Vec<(usize, &'a str)>;

    /// Number of graphemes in `text`.
    fn count(&self, text: &str) -> usize {
        self.grapheme_indices(text).len()
    }
}

/// Extended grapheme cluster segmentation backed by `unicode-segmentation`.
#[derive(Clone, Copy, Debug, Default)]
pub struct UnicodeSegmenter;

impl GraphemeSegmenter for UnicodeSegmenter {
    fn grapheme_indices<'a>(&self, text: &'a str) -> Vec<(usize, &'a str)> {
        text.grapheme_indices(true).collect()
    }

    fn count(&self, text: &str) -> usize {
        text.graphemes(true).count()
    }
}

/// Code-point segmentation used when cluster data is unavailable.
#[derive(Clone, Copy, Debug, Default)]
pub struct CodePointSegmenter;

impl GraphemeSegmenter for CodePointSegmenter {
    fn grapheme_indices<'a>(&self, text: &'a str) -> Vec<(usize, &'a str)> {
        text.char_indices()
            .map(|(i, c)| (i, &text[i..i + c.len_utf8()]))
            .collect()
    }

    fn count(&self, text: &str) -> usize {
        text.chars().count()
    }
}

/// Segmenter used by the default text pipeline.
pub fn default_segmenter() -> &'static dyn GraphemeSegmenter {
    static SEGMENTER: UnicodeSegmenter = UnicodeSegmenter;
    &SEGMENTER
}

#[cfg(test)]
#[path = "../../tests/unit/text/segment.rs"]
mod tests;
