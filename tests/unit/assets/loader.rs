use std::io::Cursor;

use super::*;
use crate::assets::data_url::encode_data_url;
use crate::assets::source::SourceKind;

fn png_bytes(w: u32, h: u32) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(w, h, image::Rgba([200, 180, 160, 255]));
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

fn template(name: &str, src: &str) -> Source {
    Source {
        kind: SourceKind::Template,
        name: name.to_owned(),
        locator: SourceLocator::Url(src.to_owned()),
    }
}

fn loader(root: &Path) -> ImageLoader {
    ImageLoader::new(root, BlobRegistry::new(), Some(2)).unwrap()
}

#[test]
fn loads_templates_data_urls_and_uploads_in_order() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir_all(dir.path().join("templates")).unwrap();
    std::fs::write(dir.path().join("templates/a.png"), png_bytes(3, 2)).unwrap();

    let sources = vec![
        template("a.png", "templates/a.png"),
        template("inline", &encode_data_url("image/png", &png_bytes(5, 4))),
        Source::upload(UploadFile::new("up.png", png_bytes(7, 6))),
    ];

    let l = loader(dir.path());
    let images = l.load_all(&sources, &CancelToken::new()).unwrap();
    let dims: Vec<(u32, u32)> = images.iter().map(|b| (b.width, b.height)).collect();
    assert_eq!(dims, vec![(3, 2), (5, 4), (7, 6)]);
    assert_eq!(l.blobs().live_count(), 0);
}

#[test]
fn one_bad_source_fails_the_batch_and_releases_handles() {
    let dir = tempfile::tempdir().unwrap();
    let sources = vec![
        Source::upload(UploadFile::new("good.png", png_bytes(2, 2))),
        Source::upload(UploadFile::new("broken.png", b"not a png".to_vec())),
    ];

    let l = loader(dir.path());
    let err = l.load_all(&sources, &CancelToken::new()).unwrap_err();
    match err {
        PosterError::ImageLoad { name, .. } => assert_eq!(name, "broken.png"),
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(l.blobs().live_count(), 0);
}

#[test]
fn missing_and_escaping_templates_are_load_errors() {
    let dir = tempfile::tempdir().unwrap();
    let l = loader(dir.path());
    for src in ["templates/missing.png", "../outside.png", "https://example.com/a.png"] {
        let err = l.load(&template("t", src)).unwrap_err();
        assert!(matches!(err, PosterError::ImageLoad { .. }), "{src}: {err}");
    }
}

#[test]
fn cancelled_batch_is_discarded() {
    let dir = tempfile::tempdir().unwrap();
    let sources = vec![Source::upload(UploadFile::new("a.png", png_bytes(2, 2)))];
    let token = CancelToken::new();
    token.cancel();
    assert!(token.is_cancelled());

    let l = loader(dir.path());
    assert!(matches!(
        l.load_all(&sources, &token),
        Err(PosterError::Cancelled)
    ));
    assert_eq!(l.blobs().live_count(), 0);
}

#[test]
fn zero_threads_is_rejected() {
    assert!(ImageLoader::new(".", BlobRegistry::new(), Some(0)).is_err());
}

#[test]
fn normalize_rel_path_rules() {
    assert_eq!(normalize_rel_path("a/./b\\c.png").unwrap(), "a/b/c.png");
    assert!(normalize_rel_path("/abs.png").is_err());
    assert!(normalize_rel_path("a/../b.png").is_err());
    assert!(normalize_rel_path("").is_err());
    assert!(normalize_rel_path("./.").is_err());
}
