//! In-memory and directory-backed store implementations

use crate::error::{StoreError, StoreResult};
use crate::record::StoredReport;
use crate::store::{ReportStore, TemplateStore};
use async_trait::async_trait;
use checklist_model::{load_template_dir, template_key, ChecklistTemplate, ReportId};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::path::PathBuf;

/// Templates held in memory, keyed by [`template_key`]
#[derive(Debug, Default)]
pub struct InMemoryTemplateStore {
    templates: DashMap<String, ChecklistTemplate>,
}

impl InMemoryTemplateStore {
    #[must_use]
    pub fn new(templates: Vec<ChecklistTemplate>) -> Self {
        let store = Self::default();
        for template in templates {
            store.insert(template);
        }
        store
    }

    /// Add or replace a template
    pub fn insert(&self, template: ChecklistTemplate) {
        self.templates.insert(template_key(&template.id), template);
    }

    /// Remove a template
    pub fn remove(&self, id: &str) -> Option<ChecklistTemplate> {
        self.templates.remove(&template_key(id)).map(|(_, t)| t)
    }
}

#[async_trait]
impl TemplateStore for InMemoryTemplateStore {
    async fn get_template(&self, id: &str) -> StoreResult<Option<ChecklistTemplate>> {
        Ok(self.templates.get(&template_key(id)).map(|t| t.clone()))
    }

    async fn list_templates(&self) -> StoreResult<Vec<ChecklistTemplate>> {
        let mut templates: Vec<ChecklistTemplate> = self.templates.iter().map(|t| t.value().clone()).collect();
        templates.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(templates)
    }
}

/// Templates read from a directory of JSON/YAML files on every call
#[derive(Debug, Clone)]
pub struct DirTemplateStore {
    dir: PathBuf,
}

impl DirTemplateStore {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

#[async_trait]
impl TemplateStore for DirTemplateStore {
    async fn get_template(&self, id: &str) -> StoreResult<Option<ChecklistTemplate>> {
        let wanted = template_key(id);
        let templates = self.list_templates().await?;
        Ok(templates.into_iter().find(|t| template_key(&t.id) == wanted))
    }

    async fn list_templates(&self) -> StoreResult<Vec<ChecklistTemplate>> {
        let dir = self.dir.clone();
        let templates = tokio::task::spawn_blocking(move || load_template_dir(&dir))
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))??;
        Ok(templates)
    }
}

/// Reports held in memory
#[derive(Debug, Default)]
pub struct InMemoryReportStore {
    reports: DashMap<ReportId, StoredReport>,
}

impl InMemoryReportStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.reports.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.reports.is_empty()
    }
}

#[async_trait]
impl ReportStore for InMemoryReportStore {
    async fn get_report(&self, id: &ReportId) -> StoreResult<StoredReport> {
        self.reports
            .get(id)
            .map(|r| r.clone())
            .ok_or_else(|| StoreError::ReportNotFound(id.clone()))
    }

    async fn put_report(&self, mut record: StoredReport, expected_version: u64) -> StoreResult<StoredReport> {
        let id = record.report.id.clone();
        match self.reports.entry(id.clone()) {
            Entry::Occupied(mut slot) => {
                let actual = slot.get().version;
                let next = expected_version.checked_add(1).filter(|_| actual == expected_version);
                let Some(next) = next else {
                    return Err(StoreError::VersionConflict {
                        id,
                        expected: expected_version,
                        actual,
                    });
                };
                record.version = next;
                slot.insert(record.clone());
            }
            Entry::Vacant(slot) => {
                if expected_version != 0 {
                    return Err(StoreError::ReportNotFound(id));
                }
                record.version = 1;
                slot.insert(record.clone());
            }
        }
        tracing::debug!(report = %record.report.id, version = record.version, "stored report");
        Ok(record)
    }

    async fn list_reports(&self) -> StoreResult<Vec<ReportId>> {
        let mut ids: Vec<ReportId> = self.reports.iter().map(|r| r.key().clone()).collect();
        ids.sort();
        Ok(ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use checklist_model::ServiceReport;

    #[tokio::test]
    async fn put_checks_expected_version() {
        let store = InMemoryReportStore::new();
        let record = StoredReport::draft(ServiceReport::new("r1"));

        let stored = store.put_report(record.clone(), 0).await.unwrap();
        assert_eq!(stored.version, 1);

        let err = store.put_report(record.clone(), 0).await.unwrap_err();
        assert!(matches!(err, StoreError::VersionConflict { expected: 0, actual: 1, .. }));

        let stored = store.put_report(stored, 1).await.unwrap();
        assert_eq!(stored.version, 2);
        assert_eq!(store.get_report(&ReportId::from("r1")).await.unwrap().version, 2);
    }

    #[tokio::test]
    async fn exhausted_version_is_a_conflict() {
        let store = InMemoryReportStore::new();
        let mut record = StoredReport::draft(ServiceReport::new("r1"));
        record.version = u64::MAX;
        store.reports.insert(ReportId::from("r1"), record.clone());

        let err = store.put_report(record, u64::MAX).await.unwrap_err();
        assert!(matches!(
            err,
            StoreError::VersionConflict { expected: u64::MAX, actual: u64::MAX, .. }
        ));
        assert_eq!(store.get_report(&ReportId::from("r1")).await.unwrap().version, u64::MAX);
    }

    #[tokio::test]
    async fn put_with_version_requires_existing_report() {
        let store = InMemoryReportStore::new();
        let err = store
            .put_report(StoredReport::draft(ServiceReport::new("ny")), 4)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::ReportNotFound(_)));
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn directory_lookup_folds_non_ascii_case() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("kjol.json"),
            r#"{"id": "Kjøl", "name": "Fryserom", "checklistItems": [{"id": "a", "label": "Dør"}]}"#,
        )
        .unwrap();
        let store = DirTemplateStore::new(dir.path());
        let found = store.get_template("KJØL").await.unwrap();
        assert_eq!(found.map(|t| t.id), Some("Kjøl".to_string()));

        let memory = InMemoryTemplateStore::new(vec![ChecklistTemplate::new("Fryserom").with_id("Kjøl")]);
        assert!(memory.get_template("KJØL").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn template_lookup_ignores_case() {
        let store = InMemoryTemplateStore::new(vec![ChecklistTemplate::new("Varmepumpe").with_id("VP")]);
        assert!(store.get_template("vp").await.unwrap().is_some());
        assert!(store.remove("Vp").is_some());
        assert!(store.list_templates().await.unwrap().is_empty());
    }
}
