use crate::text::segment::{GraphemeSegmenter, default_segmenter};
use crate::text::tokenize::tokenize_with;

/// Default display-line budget, in graphemes.
pub const LINE_BUDGET: usize = 7;

/// Chunk with the default segmenter.
pub fn chunk(text: &str, limit: usize) -> Vec<String> {
    chunk_with(text, limit, default_segmenter())
}

/// Greedily pack caption tokens into display lines of at most `limit` graphemes.
///
/// Exceptions to the budget: a single token longer than `limit` gets a line of its own (words are
/// never hyphenated), and punctuation is glued to the preceding text instead of opening a line.
/// The result always holds at least one line; a blank caption yields `[""]`.
pub fn chunk_with(text: &str, limit: usize, seg: &dyn GraphemeSegmenter) -> Vec<String> {
    let mut lines: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut count = 0usize;

    for token in tokenize_with(text, seg) {
        if count == 0
            && token.is_punctuation
            && let Some(prev) = lines.last_mut()
        {
            prev.push_str(token.text);
            continue;
        }

        if count > 0 && count + token.grapheme_len > limit {
            if token.is_punctuation {
                current.push_str(token.text);
                lines.push(std::mem::take(&mut current));
                count = 0;
                continue;
            }
            lines.push(std::mem::take(&mut current));
            count = 0;
        } else if count == 0 && token.grapheme_len > limit {
            lines.push(token.text.to_owned());
            continue;
        }

        current.push_str(token.text);
        count += token.grapheme_len;
    }

    if count > 0 || lines.is_empty() {
        lines.push(current);
    }
    lines
}

#[cfg(test)]
#[path = "../../tests/unit/text/chunk.rs"]
mod tests;
