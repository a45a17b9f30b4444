use crate::{
    storage::{LoadReport, PersistenceStore, StorageKey},
    GeneratedFunnel, Language, StorageError,
};
use chrono::NaiveDate;
use tracing::info;

const UNTITLED_PRODUCT: &str = "Untitled product";

/// One row of the history listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistorySummary {
    pub id: String,
    pub product_name: String,
    pub created_on: NaiveDate,
    pub language: Language,
}

/// Past generations, most recent first. Grows without bound.
pub struct HistoryLog {
    store: PersistenceStore,
    entries: Vec<GeneratedFunnel>,
}

impl HistoryLog {
    pub fn open(store: PersistenceStore) -> Self {
        Self::open_reporting(store, &mut LoadReport::default())
    }

    pub fn open_reporting(store: PersistenceStore, report: &mut LoadReport) -> Self {
        let loaded = store.load(StorageKey::History);
        let entries = report.take(StorageKey::History, loaded).unwrap_or_default();
        Self { store, entries }
    }

    pub fn list(&self) -> &[GeneratedFunnel] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&GeneratedFunnel> {
        self.entries.iter().find(|f| f.id == id)
    }

    pub fn latest(&self) -> Option<&GeneratedFunnel> {
        self.entries.first()
    }

    /// Prepend and persist the whole list.
    pub fn append(&mut self, funnel: GeneratedFunnel) -> Result<(), StorageError> {
        let mut next = Vec::with_capacity(self.entries.len() + 1);
        next.push(funnel);
        next.extend(self.entries.iter().cloned());

        self.store.save(StorageKey::History, &next)?;
        self.entries = next;
        Ok(())
    }

    /// Empty the log and delete the stored record, rather than storing `[]`.
    pub fn clear(&mut self) -> Result<(), StorageError> {
        self.store.remove(StorageKey::History)?;
        info!(removed = self.entries.len(), "history cleared");
        self.entries.clear();
        Ok(())
    }

    pub fn summaries(&self) -> Vec<HistorySummary> {
        self.entries
            .iter()
            .map(|funnel| HistorySummary {
                id: funnel.id.clone(),
                product_name: if funnel.input.product_name.trim().is_empty() {
                    UNTITLED_PRODUCT.to_string()
                } else {
                    funnel.input.product_name.clone()
                },
                created_on: funnel.created_at.date_naive(),
                language: funnel.input.language,
            })
            .collect()
    }

    /// Overwrite the whole list, as done by a backup import.
    pub(crate) fn replace_all(
        &mut self,
        entries: Vec<GeneratedFunnel>,
    ) -> Result<(), StorageError> {
        self.store.save(StorageKey::History, &entries)?;
        self.entries = entries;
        Ok(())
    }

    /// Reset the in-memory list without writing, after the stored record
    /// has been restored elsewhere.
    pub(crate) fn restore_cache(&mut self, entries: Vec<GeneratedFunnel>) {
        self.entries = entries;
    }
}
