use crate::text::segment::{GraphemeSegmenter, default_segmenter};

/// Punctuation that must not start a display line.
///
/// The set is a fixed list of ASCII and CJK sentence, quote and bracket marks rather than a
/// Unicode category test.
pub const PUNCTUATION: &[&str] = &[
    // ASCII
    ",", ".", "!", "?", ";", ":", "'", "\"", "(", ")", "[", "]", "{", "}", "-", "~",
    // CJK / fullwidth
    "，", "。", "！", "？", "；", "：", "、", "…", "—", "～", "·", "“", "”", "‘", "’", "「",
    "」", "『", "』", "（", "）", "《", "》", "〈", "〉", "【", "】", "〔", "〕",
];

/// Minimal caption unit treated atomically by the chunker.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Token<'a> {
    /// Token text, borrowed from the caption.
    pub text: &'a str,
    /// Whether the token is a single punctuation mark from [`PUNCTUATION`].
    pub is_punctuation: bool,
    /// Length in graphemes.
    pub grapheme_len: usize,
}

/// Tokenize with the default segmenter.
pub fn tokenize(text: &str) -> Vec<Token<'_>> {
    tokenize_with(text, default_segmenter())
}

/// Split `text` into tokens.
///
/// ASCII words (`[A-Za-z0-9]+` runs joined by single `'` or `-`) are kept whole; every other
/// non-whitespace grapheme becomes its own token; whitespace is dropped.
pub fn tokenize_with<'a>(text: &'a str, seg: &dyn GraphemeSegmenter) -> Vec<Token<'a>> {
    let graphemes = seg.grapheme_indices(text);
    let mut tokens = Vec::new();
    let mut i = 0;
    while i < graphemes.len() {
        let (start, g) = graphemes[i];
        if let Some(end) = match_word(&graphemes, i) {
            let stop = graphemes.get(end).map_or(text.len(), |(off, _)| *off);
            tokens.push(Token {
                text: &text[start..stop],
                is_punctuation: false,
                grapheme_len: end - i,
            });
            i = end;
            continue;
        }
        i += 1;
        if g.chars().all(char::is_whitespace) {
            continue;
        }
        tokens.push(Token {
            text: g,
            is_punctuation: is_punctuation(g),
            grapheme_len: 1,
        });
    }
    tokens
}

/// Return `true` when `g` is one of the fixed punctuation marks.
pub fn is_punctuation(g: &str) -> bool {
    PUNCTUATION.contains(&g)
}

fn is_word_grapheme(g: &str) -> bool {
    g.len() == 1 && g.as_bytes()[0].is_ascii_alphanumeric()
}

fn is_joiner(g: &str) -> bool {
    g == "'" || g == "-"
}

// Returns the exclusive grapheme index where the word starting at `i` ends.
fn match_word(graphemes: &[(usize, &str)], i: usize) -> Option<usize> {
    let run = |from: usize| {
        graphemes[from..]
            .iter()
            .take_while(|(_, g)| is_word_grapheme(g))
            .count()
    };

    let first = run(i);
    if first == 0 {
        return None;
    }
    let mut end = i + first;
    while end + 1 < graphemes.len() && is_joiner(graphemes[end].1) {
        let next = run(end + 1);
        if next == 0 {
            break;
        }
        end += 1 + next;
    }
    Some(end)
}

#[cfg(test)]
#[path = "../../tests/unit/text/tokenize.rs"]
mod tests;
