use super::*;

#[test]
fn unicode_segmenter_keeps_clusters_together() {
    let s = UnicodeSegmenter;
    // "e" + combining acute, thumbs-up + skin tone, CJK.
    let text = "e\u{301}\u{1F44D}\u{1F3FD}字";
    let parts: Vec<&str> = s.grapheme_indices(text).into_iter().map(|(_, g)| g).collect();
    assert_eq!(parts, vec!["e\u{301}", "\u{1F44D}\u{1F3FD}", "字"]);
    assert_eq!(s.count(text), 3);
}

#[test]
fn code_point_fallback_over_counts_but_preserves_text() {
    let s = CodePointSegmenter;
    let text = "e\u{301}字";
    let parts = s.grapheme_indices(text);
    assert_eq!(parts.len(), 3);
    let joined: String = parts.iter().map(|(_, g)| *g).collect();
    assert_eq!(joined, text);
    assert_eq!(parts[1].0, 1);
}

#[test]
fn crlf_is_one_grapheme() {
    assert_eq!(default_segmenter().count("a\r\nb"), 3);
}
