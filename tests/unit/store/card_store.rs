use super::*;
use crate::scene::background::Background;
use crate::scene::element::ElementKind;
use crate::scene::model::SceneModel;

fn scratch_dir(name: &str) -> PathBuf {
    let dir = PathBuf::from("target").join("unit_card_store").join(name);
    let _ = std::fs::remove_dir_all(&dir);
    dir
}

fn sample_card() -> Card {
    let mut m = SceneModel::new();
    m.add_default(ElementKind::text("Happy Valentine's"));
    m.add_default(ElementKind::sticker("/stickers/te-amo.png"));
    m.set_background(Background::image("/backgrounds/pink-swirl.jpg"));
    let mut card = m.to_card();
    card.audio_url = Some("https://youtu.be/dQw4w9WgXcQ".to_string());
    card
}

#[test]
fn memory_store_put_get() {
    let store = MemoryCardStore::new();
    let id = CardId::parse("card-1").unwrap();
    assert!(pollster::block_on(store.get(&id)).unwrap().is_none());

    let card = sample_card();
    pollster::block_on(store.put(&id, &card)).unwrap();
    assert_eq!(pollster::block_on(store.get(&id)).unwrap(), Some(card));
    assert_eq!(store.len(), 1);
}

#[test]
fn memory_store_is_isolated_from_callers() {
    let store = MemoryCardStore::new();
    let id = CardId::parse("card-2").unwrap();
    let mut card = sample_card();
    pollster::block_on(store.put(&id, &card)).unwrap();
    card.elements.clear();
    let stored = pollster::block_on(store.get(&id)).unwrap().unwrap();
    assert_eq!(stored.elements.len(), 2);
}

#[test]
fn fs_store_round_trip_and_overwrite() {
    let dir = scratch_dir("round_trip");
    let store = FsCardStore::new(&dir);
    let id = CardId::parse("card-abc").unwrap();
    assert!(pollster::block_on(store.get(&id)).unwrap().is_none());

    let card = sample_card();
    pollster::block_on(store.put(&id, &card)).unwrap();
    assert!(store.path_for(&id).is_file());
    assert_eq!(pollster::block_on(store.get(&id)).unwrap(), Some(card.clone()));

    let mut changed = card;
    changed.audio_url = None;
    pollster::block_on(store.put(&id, &changed)).unwrap();
    assert_eq!(pollster::block_on(store.get(&id)).unwrap(), Some(changed));

    let leftovers: Vec<_> = std::fs::read_dir(&dir)
        .unwrap()
        .flatten()
        .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
        .collect();
    assert!(leftovers.is_empty());
}

#[test]
fn fs_store_record_shape() {
    let dir = scratch_dir("shape");
    let store = FsCardStore::new(&dir);
    let id = CardId::parse("card-shape").unwrap();
    pollster::block_on(store.put(&id, &sample_card())).unwrap();

    let v: serde_json::Value =
        serde_json::from_slice(&std::fs::read(store.path_for(&id)).unwrap()).unwrap();
    assert_eq!(v["id"], "card-shape");
    assert_eq!(v["data"]["background"], "url(/backgrounds/pink-swirl.jpg)");
    assert_eq!(v["data"]["audioUrl"], "https://youtu.be/dQw4w9WgXcQ");
    assert_eq!(v["data"]["elements"][0]["type"], "text");
}

#[test]
fn fs_store_reports_corrupt_files() {
    let dir = scratch_dir("corrupt");
    std::fs::create_dir_all(&dir).unwrap();
    let store = FsCardStore::new(&dir);
    let id = CardId::parse("card-bad").unwrap();
    std::fs::write(store.path_for(&id), b"{not json").unwrap();
    let err = pollster::block_on(store.get(&id)).unwrap_err();
    assert!(matches!(err, LoveNotesError::Store(_)));
}
