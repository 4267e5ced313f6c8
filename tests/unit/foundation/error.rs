use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        PosterError::image_load("a.jpg", "bad header")
            .to_string()
            .contains("image load error: 'a.jpg': bad header")
    );
    assert!(
        PosterError::export("x")
            .to_string()
            .contains("export error:")
    );
    assert!(
        PosterError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(
        PosterError::NoSourcesSelected
            .to_string()
            .contains("no images selected")
    );
    assert!(
        PosterError::FontUnavailable {
            font: "ZCOOL KuaiLe".to_owned()
        }
        .to_string()
        .starts_with("font unavailable: no configured face can draw 'ZCOOL KuaiLe'")
    );
    assert!(
        PosterError::ExportUnavailable
            .to_string()
            .contains("export unavailable")
    );
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = PosterError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}

#[test]
fn input_errors_are_classified() {
    assert!(PosterError::NoSourcesSelected.is_input_error());
    assert!(PosterError::NoCaptionProvided.is_input_error());
    assert!(!PosterError::NoRenderableEntries.is_input_error());
    assert!(!PosterError::image_load("x", "y").is_input_error());
}
