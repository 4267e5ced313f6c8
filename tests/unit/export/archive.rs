use std::io::Read;

use super::*;

fn files() -> Vec<PackedFile> {
    vec![
        PackedFile {
            name: "a-poster.png".to_owned(),
            bytes: b"first".to_vec(),
        },
        PackedFile {
            name: "b-poster.png".to_owned(),
            bytes: b"second".to_vec(),
        },
    ]
}

#[test]
fn zip_packer_places_files_under_folder() {
    for packer in [ZipPacker::default(), ZipPacker::stored()] {
        let bytes = packer.pack("posters", &files()).unwrap();
        let mut zip = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        let mut names: Vec<String> = zip.file_names().map(str::to_owned).collect();
        names.sort();
        assert_eq!(
            names,
            vec!["posters/", "posters/a-poster.png", "posters/b-poster.png"]
        );

        let mut body = String::new();
        zip.by_name("posters/b-poster.png")
            .unwrap()
            .read_to_string(&mut body)
            .unwrap();
        assert_eq!(body, "second");
    }
}

#[test]
fn empty_folder_packs_at_root() {
    let bytes = ZipPacker::default().pack("", &files()).unwrap();
    let zip = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
    assert!(zip.file_names().any(|n| n == "a-poster.png"));
}

#[test]
fn write_to_dir_uses_download_name() {
    let dir = tempfile::tempdir().unwrap();
    let archive = Archive {
        file_name: "out.zip".to_owned(),
        entries: vec![],
        bytes: Arc::from(&b"zipbytes"[..]),
    };
    let path = archive.write_to_dir(dir.path().join("nested")).unwrap();
    assert_eq!(path.file_name().unwrap(), "out.zip");
    assert_eq!(std::fs::read(path).unwrap(), b"zipbytes");
}
