use jbxstore::{Catalog, Error, SongId};
use tempfile::TempDir;

fn create_test_catalog(content: &str) -> (TempDir, Catalog) {
    let temp_dir = tempfile::tempdir().unwrap();
    let path = temp_dir.path().join("songs.txt");
    std::fs::write(&path, content).unwrap();
    let catalog = Catalog::load(&path).unwrap();
    (temp_dir, catalog)
}

fn ids(songs: impl IntoIterator<Item = SongId>) -> Vec<String> {
    songs.into_iter().map(|s| s.to_string()).collect()
}

#[test]
fn test_load_groups_titles_by_artist() {
    let (_temp_dir, catalog) = create_test_catalog(
        "Queen--Bohemian Rhapsody\nqueen--we will rock you\n\nqueen--bohemian rhapsody\nxavier--song1\n",
    );

    assert_eq!(catalog.len(), 3);
    assert_eq!(catalog.artists().collect::<Vec<_>>(), vec!["queen", "xavier"]);
    assert!(catalog.contains(&SongId::new("queen", "bohemian rhapsody")));
}

#[test]
fn test_missing_catalog_is_an_error() {
    let temp_dir = tempfile::tempdir().unwrap();
    let result = Catalog::load(&temp_dir.path().join("songs.txt"));
    assert!(matches!(result, Err(Error::Io { .. })));
}

#[test]
fn test_malformed_line_is_reported() {
    let temp_dir = tempfile::tempdir().unwrap();
    let path = temp_dir.path().join("songs.txt");
    std::fs::write(&path, "queen--we will rock you\nno separator here\n").unwrap();

    match Catalog::load(&path) {
        Err(Error::MalformedLine { line, content, .. }) => {
            assert_eq!(line, 2);
            assert_eq!(content, "no separator here");
        }
        other => panic!("unexpected result: {:?}", other),
    }
}

#[test]
fn test_search_artist_match_takes_all_titles() {
    let (_temp_dir, catalog) =
        create_test_catalog("xavier--song1\nxavier--ballad\nmaria--xylophone\nbob--tune\n");

    let results = catalog.search(&["xa"]);
    assert_eq!(ids(results), vec!["xavier-ballad", "xavier-song1"]);
}

#[test]
fn test_search_unions_terms_case_insensitively() {
    let (_temp_dir, catalog) =
        create_test_catalog("xavier--song1\nmaria--xylophone\nbob--tune\n");

    let results = catalog.search(&["XYLO", "Bob", "xavier"]);
    assert_eq!(ids(results), vec!["bob-tune", "maria-xylophone", "xavier-song1"]);

    assert!(catalog.search(&["nothing"]).is_empty());
}

#[test]
fn test_search_scenario_single_match() {
    let (_temp_dir, catalog) = create_test_catalog("xavier--song1\nqueen--we will rock you\n");
    assert_eq!(ids(catalog.search(&["x"])), vec!["xavier-song1"]);
}

#[test]
fn test_resolve_handles_dashes() {
    let (_temp_dir, catalog) =
        create_test_catalog("a-ha--take on me\nqueen--bohemian rhapsody\nabba--dancing-queen\n");

    assert_eq!(
        catalog.resolve("A-HA-Take On Me"),
        Some(SongId::new("a-ha", "take on me"))
    );
    assert_eq!(
        catalog.resolve("abba-dancing-queen"),
        Some(SongId::new("abba", "dancing-queen"))
    );
    assert_eq!(catalog.resolve("queen-unknown"), None);
    assert_eq!(catalog.resolve("queen"), None);
}
