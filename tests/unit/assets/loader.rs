use super::*;

fn scratch_dir(name: &str) -> PathBuf {
    let dir = PathBuf::from("target").join("unit_loader").join(name);
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

#[test]
fn normalize_path_slash_normalization() {
    assert_eq!(normalize_rel_path("a/b.png").unwrap(), "a/b.png");
    assert_eq!(normalize_rel_path("a\\b.png").unwrap(), "a/b.png");
    assert_eq!(normalize_rel_path("./a//b.png").unwrap(), "a/b.png");
    assert_eq!(normalize_rel_path("a/b.png?v=2").unwrap(), "a/b.png");
    assert!(normalize_rel_path("../x.png").is_err());
    assert!(normalize_rel_path("/abs.png").is_err());
    assert!(normalize_rel_path("./").is_err());
}

#[test]
fn fs_loader_reads_site_root_paths_below_root() {
    let dir = scratch_dir("site_root");
    std::fs::create_dir_all(dir.join("stickers")).unwrap();
    std::fs::write(dir.join("stickers").join("dove.png"), b"png-bytes").unwrap();

    let loader = FsAssetLoader::new(&dir);
    let bytes = pollster::block_on(loader.load(&AssetRef::from("/stickers/dove.png"))).unwrap();
    assert_eq!(bytes, b"png-bytes");

    let rel = pollster::block_on(loader.load(&AssetRef::from("stickers/dove.png"))).unwrap();
    assert_eq!(rel, b"png-bytes");
}

#[test]
fn fs_loader_reports_missing_and_remote_assets() {
    let dir = scratch_dir("missing");
    let loader = FsAssetLoader::new(&dir);

    let err = pollster::block_on(loader.load(&AssetRef::from("/nope.png"))).unwrap_err();
    assert!(matches!(err, LoveNotesError::Asset(_)));

    let err =
        pollster::block_on(loader.load(&AssetRef::from("https://cdn.test/a.png"))).unwrap_err();
    assert!(err.to_string().contains("remote asset"));

    let err = pollster::block_on(loader.load(&AssetRef::from("/../etc/passwd"))).unwrap_err();
    assert!(err.to_string().contains(".."));
}

#[test]
fn loaders_decode_data_urls_inline() {
    let r = AssetRef::from("data:text/plain;base64,aGk=");
    let fs = FsAssetLoader::new("does-not-matter");
    assert_eq!(pollster::block_on(fs.load(&r)).unwrap(), b"hi");

    let mem = MemoryAssetLoader::new();
    assert_eq!(pollster::block_on(mem.load(&r)).unwrap(), b"hi");
}

#[test]
fn memory_loader_matches_exact_reference() {
    let mem = MemoryAssetLoader::new().with("/bg.jpg", vec![1, 2, 3]);
    assert_eq!(
        pollster::block_on(mem.load(&AssetRef::from("/bg.jpg"))).unwrap(),
        vec![1, 2, 3]
    );
    assert!(pollster::block_on(mem.load(&AssetRef::from("bg.jpg"))).is_err());
}
