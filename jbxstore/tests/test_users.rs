use jbxstore::{is_valid_email, Error, Registration, UserStore};
use tempfile::TempDir;

fn create_test_store() -> (TempDir, UserStore) {
    let temp_dir = tempfile::tempdir().unwrap();
    let store = UserStore::load(&temp_dir.path().join("users.txt")).unwrap();
    (temp_dir, store)
}

#[test]
fn test_missing_file_gives_empty_store() {
    let (_temp_dir, store) = create_test_store();
    assert!(store.is_empty());
}

#[test]
fn test_register_twice_is_taken() {
    let (_temp_dir, mut store) = create_test_store();

    assert_eq!(store.register("u@x.com", "pw").unwrap(), Registration::Created);
    assert_eq!(
        store.register("u@x.com", "other").unwrap(),
        Registration::EmailTaken
    );
    assert!(store.verify("u@x.com", "pw"));
    assert!(!store.verify("u@x.com", "other"));
}

#[test]
fn test_invalid_email_checked_before_uniqueness() {
    let (_temp_dir, mut store) = create_test_store();

    assert_eq!(
        store.register("not-an-email", "pw").unwrap(),
        Registration::InvalidEmail
    );
    assert!(store.is_empty());
    assert!(!store.path().exists());
}

#[test]
fn test_registration_is_persisted() {
    let (temp_dir, mut store) = create_test_store();
    store.register("u@x.com", "secret phrase").unwrap();
    store.register("v@y.org", "pw").unwrap();

    let content = std::fs::read_to_string(temp_dir.path().join("users.txt")).unwrap();
    assert_eq!(content, "u@x.com secret phrase\nv@y.org pw\n");

    let reloaded = UserStore::load(store.path()).unwrap();
    assert_eq!(reloaded.len(), 2);
    assert!(reloaded.verify("u@x.com", "secret phrase"));
}

#[test]
fn test_malformed_users_file() {
    let temp_dir = tempfile::tempdir().unwrap();
    let path = temp_dir.path().join("users.txt");
    std::fs::write(&path, "u@x.com pw\n\nbroken\n").unwrap();

    assert!(matches!(
        UserStore::load(&path),
        Err(Error::MalformedLine { line: 3, .. })
    ));
}

#[test]
fn test_email_pattern() {
    assert!(is_valid_email("u@x.com"));
    assert!(is_valid_email("first.last+tag@mail.example.org"));
    assert!(!is_valid_email("u@x"));
    assert!(!is_valid_email("@x.com"));
    assert!(!is_valid_email("u@x.c"));
    assert!(!is_valid_email("u x@x.com"));
}
