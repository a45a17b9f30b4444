//! The application state, held as a write-through cache over the
//! [`PersistenceStore`].

use crate::{
    backup::{BackupEnvelope, PartialEnvelope, BACKUP_VERSION},
    generator::FunnelGenerator,
    history::HistoryLog,
    storage::{LoadReport, PersistenceStore, StorageKey},
    templates::TemplateLibrary,
    AdminSettings, FunnelInput, FunnelTemplate, GeneratedFunnel, StorageError, StudioResult,
};
use chrono::Utc;
use serde::Serialize;
use tracing::{info, warn};

/// Counts shown on the admin analytics view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StudioStats {
    pub total_generations: usize,
    pub templates: usize,
}

pub struct Studio {
    store: PersistenceStore,
    settings: AdminSettings,
    templates: TemplateLibrary,
    history: HistoryLog,
    generator: FunnelGenerator,
    load_report: LoadReport,
}

impl Studio {
    /// Load every record. Absent records get their defaults; corrupt ones
    /// get their defaults too and are listed in [`Studio::load_report`].
    pub fn open(store: PersistenceStore, generator: FunnelGenerator) -> Self {
        let mut report = LoadReport::default();

        let loaded = store
            .load(StorageKey::Settings)
            .validated(AdminSettings::validate);
        let settings = report.take(StorageKey::Settings, loaded).unwrap_or_default();
        let templates = TemplateLibrary::open_reporting(store.clone(), &mut report);
        let history = HistoryLog::open_reporting(store.clone(), &mut report);

        if !report.is_clean() {
            warn!(
                keys = ?report.corrupt_keys(),
                "some stored records were unreadable and were replaced by defaults"
            );
        }

        Self {
            store,
            settings,
            templates,
            history,
            generator,
            load_report: report,
        }
    }

    pub fn settings(&self) -> &AdminSettings {
        &self.settings
    }

    /// Validate and persist. The current settings stay in effect on failure.
    pub fn save_settings(&mut self, settings: AdminSettings) -> StudioResult<()> {
        settings.validate()?;
        self.store.save(StorageKey::Settings, &settings)?;
        info!(temperature = settings.model_temperature, "admin settings saved");
        self.settings = settings;
        Ok(())
    }

    pub fn reset_settings(&mut self) -> StudioResult<()> {
        self.save_settings(AdminSettings::default())
    }

    pub fn templates(&self) -> &TemplateLibrary {
        &self.templates
    }

    pub fn templates_mut(&mut self) -> &mut TemplateLibrary {
        &mut self.templates
    }

    pub fn history(&self) -> &HistoryLog {
        &self.history
    }

    pub fn generator(&self) -> &FunnelGenerator {
        &self.generator
    }

    /// Generate with the current settings and record the result. Nothing is
    /// recorded when generation fails.
    pub async fn generate(&mut self, input: &FunnelInput) -> StudioResult<GeneratedFunnel> {
        let funnel = self.generator.generate(input, &self.settings).await?;
        self.history.append(funnel.clone())?;
        Ok(funnel)
    }

    pub fn clear_history(&mut self) -> StudioResult<()> {
        self.history.clear()?;
        Ok(())
    }

    pub fn export_backup(&self) -> BackupEnvelope {
        BackupEnvelope {
            settings: self.settings.clone(),
            templates: self.templates.list().to_vec(),
            history: self.history.list().to_vec(),
            version: BACKUP_VERSION.to_string(),
            exported_at: Utc::now(),
        }
    }

    /// Overwrite each record present in the backup. Records the backup does
    /// not carry are left alone. If any write fails, the records already
    /// written are put back and nothing of the backup remains applied.
    pub fn import_backup(&mut self, backup: PartialEnvelope) -> StudioResult<()> {
        let summary = backup.summary();
        let PartialEnvelope {
            settings,
            templates,
            history,
            ..
        } = backup;
        if let Some(settings) = &settings {
            settings.validate()?;
        }

        let snapshot = ImportSnapshot::capture(self);
        let mut written = Vec::new();
        if let Err(error) = self.apply_import(settings, templates, history, &mut written) {
            warn!(%error, restored = ?written, "backup import failed, restoring previous records");
            self.roll_back(snapshot, &written);
            return Err(error);
        }

        info!(
            history_items = summary.history_items,
            templates = summary.templates,
            settings = summary.has_settings,
            "backup imported"
        );
        Ok(())
    }

    fn apply_import(
        &mut self,
        settings: Option<AdminSettings>,
        templates: Option<Vec<FunnelTemplate>>,
        history: Option<Vec<GeneratedFunnel>>,
        written: &mut Vec<StorageKey>,
    ) -> StudioResult<()> {
        if let Some(settings) = settings {
            self.store.save(StorageKey::Settings, &settings)?;
            self.settings = settings;
            written.push(StorageKey::Settings);
        }
        if let Some(templates) = templates {
            self.templates.replace_all(templates)?;
            written.push(StorageKey::Templates);
        }
        if let Some(history) = history {
            self.history.replace_all(history)?;
            written.push(StorageKey::History);
        }
        Ok(())
    }

    fn roll_back(&mut self, snapshot: ImportSnapshot, written: &[StorageKey]) {
        let ImportSnapshot {
            settings,
            templates,
            history,
            stored,
        } = snapshot;

        for &key in written {
            let was_stored = stored.contains(&key);
            let restored = match key {
                StorageKey::Settings => restore_record(&self.store, key, was_stored, &settings),
                StorageKey::Templates => restore_record(&self.store, key, was_stored, &templates),
                StorageKey::History => restore_record(&self.store, key, was_stored, &history),
            };
            if let Err(error) = restored {
                warn!(%key, %error, "could not restore record after a failed import");
            }
        }

        self.settings = settings;
        self.templates.restore_cache(templates);
        self.history.restore_cache(history);
    }

    pub fn stats(&self) -> StudioStats {
        StudioStats {
            total_generations: self.history.len(),
            templates: self.templates.len(),
        }
    }

    pub fn load_report(&self) -> &LoadReport {
        &self.load_report
    }
}

/// In-memory records and which keys existed in storage, taken before an
/// import touches anything.
struct ImportSnapshot {
    settings: AdminSettings,
    templates: Vec<FunnelTemplate>,
    history: Vec<GeneratedFunnel>,
    stored: Vec<StorageKey>,
}

impl ImportSnapshot {
    fn capture(studio: &Studio) -> Self {
        Self {
            settings: studio.settings.clone(),
            templates: studio.templates.list().to_vec(),
            history: studio.history.list().to_vec(),
            // An unreadable key is assumed present so it gets rewritten.
            stored: StorageKey::ALL
                .into_iter()
                .filter(|key| studio.store.contains(*key).unwrap_or(true))
                .collect(),
        }
    }
}

/// A key that did not exist before is removed again rather than rewritten.
fn restore_record<T: Serialize>(
    store: &PersistenceStore,
    key: StorageKey,
    was_stored: bool,
    value: &T,
) -> Result<(), StorageError> {
    if was_stored {
        store.save(key, value)
    } else {
        store.remove(key)
    }
}
