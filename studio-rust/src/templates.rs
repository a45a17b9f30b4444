use crate::{
    storage::{LoadReport, PersistenceStore, StorageKey},
    FunnelInput, FunnelTemplate, InvalidFieldValue, Language, StorageError, TemplateError, Tone,
};
use tracing::info;

pub const NEW_TEMPLATE_NAME: &str = "New Template";
pub const NEW_TEMPLATE_DESCRIPTION: &str = "Short description...";

/// Presets available before the user has saved any template.
pub fn default_templates() -> Vec<FunnelTemplate> {
    vec![
        FunnelTemplate {
            id: "t1".to_string(),
            name: "Curso Yoga Post-Parto".to_string(),
            description: "Nicho: Salud y Bienestar. Tono: Amigable.".to_string(),
            data: FunnelInput {
                product_name: "Programa Mamá Zen 15min".to_string(),
                target_audience: "Madres primerizas con bebés de 0-12 meses que se sienten \
                                  agotadas."
                    .to_string(),
                pain_points: "Dolor de espalda, estrés, falta de tiempo para ir al gimnasio, \
                              pérdida de identidad."
                    .to_string(),
                benefits: "Recuperación suelo pélvico, calma mental, ejercicios de 15 min desde \
                           casa, comunidad de apoyo."
                    .to_string(),
                tone: Tone::Friendly,
                language: Language::Es,
            },
        },
        FunnelTemplate {
            id: "t2".to_string(),
            name: "SaaS Gestión de Proyectos".to_string(),
            description: "Nicho: B2B Tecnología. Tono: Profesional.".to_string(),
            data: FunnelInput {
                product_name: "FlowMaster Pro".to_string(),
                target_audience: "Agencias de Marketing Digital con 5-20 empleados.".to_string(),
                pain_points: "Proyectos entregados tarde, clientes molestos, comunicación \
                              dispersa en emails y chats."
                    .to_string(),
                benefits: "Todo en un solo lugar, automatización de reportes, vista de carga de \
                           trabajo del equipo."
                    .to_string(),
                tone: Tone::Professional,
                language: Language::Es,
            },
        },
        FunnelTemplate {
            id: "t3".to_string(),
            name: "Asesoría Fiscal Premium".to_string(),
            description: "Nicho: High Ticket. Tono: Lujo/Exclusivo.".to_string(),
            data: FunnelInput {
                product_name: "Estrategia Fiscal 360".to_string(),
                target_audience: "Empresarios facturando >1M€ anuales.".to_string(),
                pain_points: "Pagan demasiados impuestos legalmente evitables, miedo a \
                              inspecciones, gestoría reactiva."
                    .to_string(),
                benefits: "Optimización fiscal agresiva pero legal, tranquilidad absoluta, \
                           reuniones trimestrales de estrategia."
                    .to_string(),
                tone: Tone::Luxury,
                language: Language::Es,
            },
        },
    ]
}

/// An editable field of a template or its brief.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateField {
    Name,
    Description,
    ProductName,
    TargetAudience,
    PainPoints,
    Benefits,
    Tone,
    Language,
}

/// A template open for editing. Changes stay here until saved.
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateDraft {
    template: FunnelTemplate,
    is_new: bool,
}

impl TemplateDraft {
    pub fn template(&self) -> &FunnelTemplate {
        &self.template
    }

    pub fn id(&self) -> &str {
        &self.template.id
    }

    /// Whether saving appends a record rather than replacing one.
    pub fn is_new(&self) -> bool {
        self.is_new
    }

    pub fn set(&mut self, field: TemplateField, value: &str) -> Result<(), InvalidFieldValue> {
        let template = &mut self.template;
        match field {
            TemplateField::Name => template.name = value.to_string(),
            TemplateField::Description => template.description = value.to_string(),
            TemplateField::ProductName => template.data.product_name = value.to_string(),
            TemplateField::TargetAudience => template.data.target_audience = value.to_string(),
            TemplateField::PainPoints => template.data.pain_points = value.to_string(),
            TemplateField::Benefits => template.data.benefits = value.to_string(),
            TemplateField::Tone => template.data.tone = value.parse()?,
            TemplateField::Language => template.data.language = value.parse()?,
        }
        Ok(())
    }
}

/// Saved briefs plus at most one editing session.
pub struct TemplateLibrary {
    store: PersistenceStore,
    templates: Vec<FunnelTemplate>,
    draft: Option<TemplateDraft>,
}

impl TemplateLibrary {
    /// Load the persisted list, or the defaults when none was ever saved.
    pub fn open(store: PersistenceStore) -> Self {
        Self::open_reporting(store, &mut LoadReport::default())
    }

    pub fn open_reporting(store: PersistenceStore, report: &mut LoadReport) -> Self {
        let loaded = store.load(StorageKey::Templates);
        let templates = report
            .take(StorageKey::Templates, loaded)
            .unwrap_or_else(default_templates);
        Self {
            store,
            templates,
            draft: None,
        }
    }

    pub fn list(&self) -> &[FunnelTemplate] {
        &self.templates
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&FunnelTemplate> {
        self.templates.iter().find(|t| t.id == id)
    }

    /// Open a blank draft with a fresh id. Replaces any open draft.
    pub fn create(&mut self) -> &mut TemplateDraft {
        self.draft.insert(TemplateDraft {
            template: FunnelTemplate {
                id: crate::new_id(),
                name: NEW_TEMPLATE_NAME.to_string(),
                description: NEW_TEMPLATE_DESCRIPTION.to_string(),
                data: FunnelInput::default(),
            },
            is_new: true,
        })
    }

    /// Open a copy of an existing template. Replaces any open draft.
    pub fn edit(&mut self, id: &str) -> Result<&mut TemplateDraft, TemplateError> {
        let template = self
            .get(id)
            .cloned()
            .ok_or_else(|| TemplateError::NotFound(id.to_string()))?;
        Ok(self.draft.insert(TemplateDraft {
            template,
            is_new: false,
        }))
    }

    pub fn draft(&self) -> Option<&TemplateDraft> {
        self.draft.as_ref()
    }

    pub fn update_field(&mut self, field: TemplateField, value: &str) -> Result<(), TemplateError> {
        let draft = self.draft.as_mut().ok_or(TemplateError::NoDraft)?;
        draft.set(field, value)?;
        Ok(())
    }

    pub fn discard_draft(&mut self) {
        self.draft = None;
    }

    /// Persist the open draft and close it. On failure the draft stays open
    /// and the library is unchanged.
    pub fn save_draft(&mut self) -> Result<FunnelTemplate, TemplateError> {
        let draft = self.draft.as_ref().ok_or(TemplateError::NoDraft)?;
        let saved = draft.template.clone();

        let mut next = self.templates.clone();
        if draft.is_new {
            next.push(saved.clone());
        } else {
            let slot = next
                .iter_mut()
                .find(|t| t.id == saved.id)
                .ok_or_else(|| TemplateError::NotFound(saved.id.clone()))?;
            *slot = saved.clone();
        }

        self.store.save(StorageKey::Templates, &next)?;
        info!(template_id = %saved.id, created = draft.is_new, "template saved");
        self.templates = next;
        self.draft = None;
        Ok(saved)
    }

    /// Remove a template. An editing session on it is closed.
    pub fn delete(&mut self, id: &str) -> Result<FunnelTemplate, TemplateError> {
        let index = self
            .templates
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| TemplateError::NotFound(id.to_string()))?;

        let mut next = self.templates.clone();
        let removed = next.remove(index);
        self.store.save(StorageKey::Templates, &next)?;
        self.templates = next;

        if self.draft.as_ref().is_some_and(|d| d.id() == id) {
            self.draft = None;
        }
        info!(template_id = %id, "template deleted");
        Ok(removed)
    }

    /// Overwrite the whole list, as done by a backup import.
    pub(crate) fn replace_all(
        &mut self,
        templates: Vec<FunnelTemplate>,
    ) -> Result<(), StorageError> {
        self.store.save(StorageKey::Templates, &templates)?;
        self.templates = templates;
        let orphaned = self
            .draft
            .as_ref()
            .is_some_and(|d| !d.is_new && self.get(d.id()).is_none());
        if orphaned {
            self.draft = None;
        }
        Ok(())
    }

    /// Reset the in-memory list without writing, after the stored record
    /// has been restored elsewhere.
    pub(crate) fn restore_cache(&mut self, templates: Vec<FunnelTemplate>) {
        self.templates = templates;
    }
}
