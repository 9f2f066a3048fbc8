use jbxstore::{Catalog, Error, PlaylistCreation, PlaylistStore, SongAddition, SongId};
use tempfile::TempDir;

fn test_catalog() -> Catalog {
    Catalog::from_songs([
        SongId::new("a", "b"),
        SongId::new("queen", "we will rock you"),
        SongId::new("a-ha", "take on me"),
    ])
}

fn create_test_store(catalog: &Catalog) -> (TempDir, PlaylistStore) {
    let temp_dir = tempfile::tempdir().unwrap();
    let store = PlaylistStore::load(&temp_dir.path().join("playlists.txt"), catalog).unwrap();
    (temp_dir, store)
}

fn file_content(temp_dir: &TempDir) -> String {
    std::fs::read_to_string(temp_dir.path().join("playlists.txt")).unwrap()
}

#[test]
fn test_create_then_show_empty() {
    let catalog = test_catalog();
    let (temp_dir, mut store) = create_test_store(&catalog);

    assert_eq!(store.create("p").unwrap(), PlaylistCreation::Created);
    assert_eq!(store.create("p").unwrap(), PlaylistCreation::NameTaken);

    let playlist = store.get("p").unwrap();
    assert!(playlist.is_empty());
    assert_eq!(file_content(&temp_dir), "p\n");
}

#[test]
fn test_names_match_exactly() {
    let catalog = test_catalog();
    let (_temp_dir, mut store) = create_test_store(&catalog);

    store.create("rock").unwrap();
    assert_eq!(store.create("ro").unwrap(), PlaylistCreation::Created);
    assert_eq!(store.create("rock2").unwrap(), PlaylistCreation::Created);
    assert_eq!(store.len(), 3);
    assert!(store.get("roc").is_none());
}

#[test]
fn test_invalid_names_rejected() {
    let catalog = test_catalog();
    let (_temp_dir, mut store) = create_test_store(&catalog);

    assert_eq!(store.create("a::b").unwrap(), PlaylistCreation::InvalidName);
    assert_eq!(store.create("a;b").unwrap(), PlaylistCreation::InvalidName);
    assert!(store.is_empty());
}

#[test]
fn test_add_song_rewrites_file() {
    let catalog = test_catalog();
    let (temp_dir, mut store) = create_test_store(&catalog);

    store.create("first").unwrap();
    store.create("second").unwrap();

    let song = SongId::new("a", "b");
    assert_eq!(store.add_song("second", &song).unwrap(), SongAddition::Added);
    assert_eq!(
        store
            .add_song("second", &SongId::new("queen", "we will rock you"))
            .unwrap(),
        SongAddition::Added
    );

    assert_eq!(
        file_content(&temp_dir),
        "first\nsecond::a-b;queen-we will rock you;\n"
    );
    assert_eq!(store.get("second").unwrap().songs()[0], song);
}

#[test]
fn test_add_song_twice_is_rejected() {
    let catalog = test_catalog();
    let (temp_dir, mut store) = create_test_store(&catalog);

    store.create("p").unwrap();
    let song = SongId::new("a", "b");
    store.add_song("p", &song).unwrap();
    let before = file_content(&temp_dir);

    assert_eq!(store.add_song("p", &song).unwrap(), SongAddition::AlreadyPresent);
    assert_eq!(file_content(&temp_dir), before);
    assert_eq!(store.get("p").unwrap().songs().len(), 1);
}

#[test]
fn test_add_song_to_missing_playlist() {
    let catalog = test_catalog();
    let (_temp_dir, mut store) = create_test_store(&catalog);

    assert_eq!(
        store.add_song("nope", &SongId::new("a", "b")).unwrap(),
        SongAddition::NoSuchPlaylist
    );
}

#[test]
fn test_reload_preserves_order_and_songs() {
    let catalog = test_catalog();
    let temp_dir = tempfile::tempdir().unwrap();
    let path = temp_dir.path().join("playlists.txt");
    std::fs::write(&path, "eighties::a-ha-take on me;a-b;\n\nempty\n").unwrap();

    let store = PlaylistStore::load(&path, &catalog).unwrap();
    let names: Vec<&str> = store.iter().map(|p| p.name()).collect();
    assert_eq!(names, vec!["eighties", "empty"]);
    assert_eq!(
        store.get("eighties").unwrap().songs(),
        &[SongId::new("a-ha", "take on me"), SongId::new("a", "b")]
    );
}

#[test]
fn test_unknown_song_in_file_is_malformed() {
    let catalog = test_catalog();
    let temp_dir = tempfile::tempdir().unwrap();
    let path = temp_dir.path().join("playlists.txt");
    std::fs::write(&path, "p::ghost-track;\n").unwrap();

    assert!(matches!(
        PlaylistStore::load(&path, &catalog),
        Err(Error::MalformedLine { line: 1, .. })
    ));
}
