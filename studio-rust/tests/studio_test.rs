mod common;

use common::{brief, funnel_response, memory_studio, studio_over};
use copyfunnel_sdk::LanguageModelError;
use copyfunnel_studio::{
    backup::{parse_backup, PartialEnvelope},
    storage::{MemoryStorage, PersistenceStore, StorageBackend, StorageKey},
    templates::{default_templates, TemplateField},
    AdminSettings, GenerationError, SettingsError, StudioError, StudioStats,
};
use serde_json::json;
use std::{io, sync::Arc};

/// Memory storage that refuses every write to one key.
struct RejectingStorage {
    inner: MemoryStorage,
    rejected: &'static str,
}

impl StorageBackend for RejectingStorage {
    fn read(&self, key: &str) -> io::Result<Option<String>> {
        self.inner.read(key)
    }

    fn write(&self, key: &str, value: &str) -> io::Result<()> {
        if key == self.rejected {
            return Err(io::Error::other("disk full"));
        }
        self.inner.write(key, value)
    }

    fn remove(&self, key: &str) -> io::Result<()> {
        self.inner.remove(key)
    }
}

#[test]
fn corrupt_records_fall_back_to_defaults_and_are_reported() {
    let backend = Arc::new(MemoryStorage::new());
    backend.write("admin_settings", "{\"modelTemperature\": ").unwrap();
    backend.write("funnel_templates", "42").unwrap();
    let store = PersistenceStore::new(backend.clone());

    let (studio, _) = studio_over(store);

    assert_eq!(studio.settings(), &AdminSettings::default());
    assert_eq!(studio.templates().list(), default_templates().as_slice());
    assert!(studio.history().is_empty());
    assert_eq!(
        studio.load_report().corrupt_keys(),
        vec![StorageKey::Settings, StorageKey::Templates]
    );
    // The unreadable data is left in place until something overwrites it.
    assert_eq!(backend.read("funnel_templates").unwrap().as_deref(), Some("42"));
}

#[tokio::test]
async fn stored_settings_out_of_range_are_replaced_by_defaults() {
    let backend = Arc::new(MemoryStorage::new());
    backend
        .write(
            "admin_settings",
            r#"{"systemInstruction":"s","basePromptTemplate":"b","modelTemperature":7.5}"#,
        )
        .unwrap();

    let (mut studio, model) = studio_over(PersistenceStore::new(backend));

    assert_eq!(studio.settings(), &AdminSettings::default());
    assert_eq!(studio.load_report().corrupt_keys(), vec![StorageKey::Settings]);
    let (_, reason) = &studio.load_report().corrupt_entries()[0];
    assert!(reason.contains("7.5"), "unexpected reason: {reason}");

    model.enqueue_generate(funnel_response());
    studio.generate(&brief()).await.unwrap();
    assert_eq!(model.tracked_generate_inputs()[0].temperature, Some(0.7));
}

#[test]
fn clean_store_has_a_clean_report() {
    let (studio, _, _) = memory_studio();
    assert!(studio.load_report().is_clean());
}

#[tokio::test]
async fn generate_records_the_funnel_in_history() {
    let (mut studio, store, model) = memory_studio();
    model.enqueue_generate(funnel_response());

    let funnel = studio.generate(&brief()).await.unwrap();

    assert_eq!(studio.history().latest(), Some(&funnel));
    let (reopened, _) = studio_over(store);
    assert_eq!(reopened.history().list(), &[funnel]);
    assert_eq!(
        reopened.stats(),
        StudioStats {
            total_generations: 1,
            templates: default_templates().len()
        }
    );
}

#[tokio::test]
async fn failed_generation_leaves_history_untouched() {
    let (mut studio, store, model) = memory_studio();
    model.enqueue_generate(LanguageModelError::MissingCredential("google"));

    let err = studio.generate(&brief()).await.unwrap_err();

    assert!(matches!(
        err,
        StudioError::Generation(GenerationError::Configuration("google"))
    ));
    assert!(studio.history().is_empty());
    assert!(!store.contains(StorageKey::History).unwrap());
}

#[tokio::test]
async fn generation_uses_the_saved_settings() {
    let (mut studio, _, model) = memory_studio();
    studio
        .save_settings(AdminSettings {
            model_temperature: 0.1,
            ..AdminSettings::default()
        })
        .unwrap();
    model.enqueue_generate(funnel_response());

    studio.generate(&brief()).await.unwrap();

    assert_eq!(model.tracked_generate_inputs()[0].temperature, Some(0.1));
}

#[test]
fn out_of_range_temperature_is_not_saved() {
    let (mut studio, store, _) = memory_studio();

    let err = studio
        .save_settings(AdminSettings {
            model_temperature: 1.2,
            ..AdminSettings::default()
        })
        .unwrap_err();

    assert!(matches!(
        err,
        StudioError::Settings(SettingsError::TemperatureOutOfRange(_))
    ));
    assert_eq!(studio.settings(), &AdminSettings::default());
    assert!(!store.contains(StorageKey::Settings).unwrap());
}

#[test]
fn reset_restores_and_persists_defaults() {
    let (mut studio, store, _) = memory_studio();
    studio
        .save_settings(AdminSettings {
            system_instruction: "Custom".to_string(),
            ..AdminSettings::default()
        })
        .unwrap();

    studio.reset_settings().unwrap();

    let (reopened, _) = studio_over(store);
    assert_eq!(reopened.settings(), &AdminSettings::default());
}

#[tokio::test]
async fn export_then_import_reproduces_the_data() {
    let (mut source, _, model) = memory_studio();
    model.enqueue_generate(funnel_response());
    source.generate(&brief()).await.unwrap();
    source
        .save_settings(AdminSettings {
            model_temperature: 0.4,
            ..AdminSettings::default()
        })
        .unwrap();
    source.templates_mut().delete("t3").unwrap();

    let exported = source.export_backup();
    let text = exported.to_pretty_json().unwrap();

    let (mut target, target_store, _) = memory_studio();
    target.import_backup(parse_backup(&text).unwrap()).unwrap();

    assert_eq!(target.settings(), source.settings());
    assert_eq!(target.templates().list(), source.templates().list());
    assert_eq!(target.history().list(), source.history().list());

    let (reopened, _) = studio_over(target_store);
    assert_eq!(reopened.export_backup().history, exported.history);
    assert_eq!(reopened.export_backup().templates, exported.templates);
}

#[tokio::test]
async fn partial_import_only_touches_present_records() {
    let (mut studio, _, model) = memory_studio();
    model.enqueue_generate(funnel_response());
    let funnel = studio.generate(&brief()).await.unwrap();
    studio
        .save_settings(AdminSettings {
            model_temperature: 0.9,
            ..AdminSettings::default()
        })
        .unwrap();
    let settings = studio.settings().clone();

    let backup = parse_backup(&json!({ "templates": [] }).to_string()).unwrap();
    studio.import_backup(backup).unwrap();

    assert!(studio.templates().is_empty());
    assert_eq!(studio.history().list(), &[funnel]);
    assert_eq!(studio.settings(), &settings);
}

#[test]
fn import_closes_a_session_on_a_removed_template() {
    let (mut studio, _, _) = memory_studio();
    studio.templates_mut().edit("t1").unwrap();
    studio
        .templates_mut()
        .update_field(TemplateField::Name, "Renamed")
        .unwrap();

    studio
        .import_backup(PartialEnvelope {
            templates: Some(default_templates().into_iter().skip(1).collect()),
            ..PartialEnvelope::default()
        })
        .unwrap();

    assert!(studio.templates().draft().is_none());
    assert!(studio.templates().get("t1").is_none());
}

#[test]
fn failed_import_puts_back_records_already_written() {
    let backend = Arc::new(RejectingStorage {
        inner: MemoryStorage::new(),
        rejected: "funnel_templates",
    });
    let store = PersistenceStore::new(backend);
    let (mut studio, _) = studio_over(store.clone());
    let backup = parse_backup(
        &json!({
            "settings": AdminSettings {
                model_temperature: 0.1,
                ..AdminSettings::default()
            },
            "templates": []
        })
        .to_string(),
    )
    .unwrap();

    let err = studio.import_backup(backup.clone()).unwrap_err();

    assert!(matches!(err, StudioError::Storage(_)));
    assert_eq!(studio.settings(), &AdminSettings::default());
    assert_eq!(studio.templates().list(), default_templates().as_slice());
    assert!(!store.contains(StorageKey::Settings).unwrap());

    let saved = AdminSettings {
        model_temperature: 0.3,
        ..AdminSettings::default()
    };
    studio.save_settings(saved.clone()).unwrap();

    studio.import_backup(backup).unwrap_err();

    assert_eq!(studio.settings(), &saved);
    let (reopened, _) = studio_over(store);
    assert_eq!(reopened.settings(), &saved);
    assert!(reopened.load_report().is_clean());
}
