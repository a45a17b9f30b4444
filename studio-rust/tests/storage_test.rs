use copyfunnel_studio::{
    storage::{
        FileStorage, MemoryStorage, PersistenceStore, StorageBackend, StorageKey, StoredValue,
    },
    AdminSettings,
};
use std::sync::Arc;

#[test]
fn memory_store_distinguishes_absent_present_and_corrupt() {
    let backend = Arc::new(MemoryStorage::new());
    let store = PersistenceStore::new(backend.clone());

    assert_eq!(store.load::<AdminSettings>(StorageKey::Settings), StoredValue::Absent);

    let settings = AdminSettings::default();
    store.save(StorageKey::Settings, &settings).unwrap();
    assert_eq!(store.load(StorageKey::Settings), StoredValue::Present(settings));
    assert_eq!(backend.keys(), vec!["admin_settings".to_string()]);

    backend.write("admin_settings", "{not json").unwrap();
    assert!(store.load::<AdminSettings>(StorageKey::Settings).is_corrupt());
}

#[test]
fn wrong_shape_is_corrupt() {
    let backend = Arc::new(MemoryStorage::new());
    let store = PersistenceStore::new(backend.clone());

    backend.write("funnel_history", r#"{"items": []}"#).unwrap();
    let loaded = store.load::<Vec<copyfunnel_studio::GeneratedFunnel>>(StorageKey::History);
    assert!(matches!(loaded, StoredValue::Corrupt { .. }));
    assert_eq!(loaded.into_option(StorageKey::History), None);
}

#[test]
fn remove_makes_the_record_absent() {
    let store = PersistenceStore::in_memory();
    store.save(StorageKey::History, &Vec::<String>::new()).unwrap();
    assert!(store.contains(StorageKey::History).unwrap());

    store.remove(StorageKey::History).unwrap();
    assert!(!store.contains(StorageKey::History).unwrap());
    store.remove(StorageKey::History).unwrap();
}

#[test]
fn file_storage_persists_one_file_per_key() {
    let dir = tempfile::tempdir().unwrap();
    let data_dir = dir.path().join("data");

    {
        let store = PersistenceStore::new(Arc::new(FileStorage::open(&data_dir).unwrap()));
        let settings = AdminSettings {
            model_temperature: 0.3,
            ..AdminSettings::default()
        };
        store.save(StorageKey::Settings, &settings).unwrap();
    }

    assert!(data_dir.join("admin_settings.json").is_file());
    let leftovers: Vec<_> = std::fs::read_dir(&data_dir)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .filter(|name| name.ends_with(".tmp"))
        .collect();
    assert!(leftovers.is_empty(), "temporary files left behind: {leftovers:?}");

    let store = PersistenceStore::new(Arc::new(FileStorage::open(&data_dir).unwrap()));
    let StoredValue::Present(settings) = store.load::<AdminSettings>(StorageKey::Settings) else {
        panic!("settings should be present after reopening");
    };
    assert!((settings.model_temperature - 0.3).abs() < f64::EPSILON);
}

#[test]
fn file_storage_reports_missing_and_removes_quietly() {
    let dir = tempfile::tempdir().unwrap();
    let storage = FileStorage::open(dir.path()).unwrap();

    assert_eq!(storage.read("funnel_templates").unwrap(), None);
    storage.remove("funnel_templates").unwrap();

    storage.write("funnel_templates", "[]").unwrap();
    assert_eq!(storage.read("funnel_templates").unwrap().as_deref(), Some("[]"));
    storage.remove("funnel_templates").unwrap();
    assert!(!dir.path().join("funnel_templates.json").exists());
}

#[test]
fn failed_replace_leaves_no_staging_file() {
    let dir = tempfile::tempdir().unwrap();
    let storage = FileStorage::open(dir.path()).unwrap();
    assert_eq!(storage.dir(), dir.path());

    // A non-empty directory in place of the record makes the rename fail.
    let blocked = dir.path().join("funnel_history.json");
    std::fs::create_dir(&blocked).unwrap();
    std::fs::write(blocked.join("keep"), "x").unwrap();

    assert!(storage.write("funnel_history", "[]").is_err());

    assert!(!dir.path().join(".funnel_history.json.tmp").exists());
    assert!(blocked.join("keep").is_file());
}
