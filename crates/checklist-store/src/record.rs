//! Stored report records and finalize snapshots

use checklist_engine::Deviation;
use checklist_model::{ServiceReport, TemplateHash};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Lifecycle state of a report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportStatus {
    /// Open for capture
    #[default]
    Draft,
    /// Frozen with a deviation snapshot
    Finalized,
}

/// What finalize froze
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinalizedSnapshot {
    /// Numbered deviations at finalize time
    pub deviations: Vec<Deviation>,
    /// Hash of each template used, keyed by template id
    pub template_hashes: BTreeMap<String, TemplateHash>,
    pub finalized_at: DateTime<Utc>,
}

/// A report as persisted, with its version and lifecycle state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredReport {
    pub report: ServiceReport,
    /// Incremented on every successful write; 0 means never stored
    pub version: u64,
    #[serde(default)]
    pub status: ReportStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snapshot: Option<FinalizedSnapshot>,
}

impl StoredReport {
    /// Unsaved draft
    #[must_use]
    pub fn draft(report: ServiceReport) -> Self {
        Self {
            report,
            version: 0,
            status: ReportStatus::Draft,
            snapshot: None,
        }
    }

    #[inline]
    #[must_use]
    pub fn is_finalized(&self) -> bool {
        self.status == ReportStatus::Finalized
    }
}
