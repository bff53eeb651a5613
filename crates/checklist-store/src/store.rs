//! Collaborator traits for template and report persistence

use crate::error::StoreResult;
use crate::record::StoredReport;
use async_trait::async_trait;
use checklist_model::{ChecklistTemplate, ReportId};

/// Source of authored templates
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TemplateStore: Send + Sync {
    /// Template by id, `None` when absent
    async fn get_template(&self, id: &str) -> StoreResult<Option<ChecklistTemplate>>;

    /// Every authored template
    async fn list_templates(&self) -> StoreResult<Vec<ChecklistTemplate>>;
}

/// Whole-document report persistence with optimistic versioning
#[async_trait]
pub trait ReportStore: Send + Sync {
    /// Load a report
    async fn get_report(&self, id: &ReportId) -> StoreResult<StoredReport>;

    /// Replace a report if its stored version equals `expected_version`
    ///
    /// `expected_version` 0 creates a new report. Returns the record as
    /// stored, with its version incremented.
    async fn put_report(&self, record: StoredReport, expected_version: u64) -> StoreResult<StoredReport>;

    /// Ids of every stored report
    async fn list_reports(&self) -> StoreResult<Vec<ReportId>>;
}
