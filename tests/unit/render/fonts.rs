use super::*;

fn book_with(dir: &std::path::Path) -> FontBook {
    std::fs::write(dir.join("garbage.ttf"), b"definitely not a font").unwrap();
    FontBook::new(&[
        FontFace {
            family: "Broken".to_owned(),
            source: dir.join("garbage.ttf"),
        },
        FontFace {
            family: "Missing".to_owned(),
            source: dir.join("nope.ttf"),
        },
    ])
}

#[test]
fn unconfigured_and_unloadable_families_are_not_ready() {
    let dir = tempfile::tempdir().unwrap();
    let mut book = book_with(dir.path());
    assert!(!book.ensure_ready("ZCOOL KuaiLe"));
    assert!(!book.ensure_ready("Broken"));
    assert!(!book.ensure_ready("Missing"));
    // Cached failure; the file is not read again.
    std::fs::remove_file(dir.path().join("garbage.ttf")).unwrap();
    assert!(!book.ensure_ready("Broken"));
    assert!(!book.has_faces());
}

#[test]
fn stack_source_quotes_names_and_keeps_generics_bare() {
    let book = FontBook::new(&[]);
    let stack = book.stack_source(
        "Ma Shan Zheng",
        &["Noto Sans SC".to_owned(), "sans-serif".to_owned()],
    );
    assert_eq!(stack, "\"Ma Shan Zheng\", \"Noto Sans SC\", sans-serif");
}

#[test]
fn layout_rejects_non_positive_sizes() {
    let mut book = FontBook::new(&[]);
    let brush = TextBrushRgba8::opaque([0x41, 0x3f, 0x3f]);
    assert!(book.layout_line("hi", "sans-serif", 0.0, 700.0, brush).is_err());
    assert!(book.layout_line("hi", "sans-serif", f32::NAN, 700.0, brush).is_err());
}
