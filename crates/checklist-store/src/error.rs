//! Error types for stores and the report service

use checklist_engine::{EngineError, Incomplete};
use checklist_model::{ReportId, TemplateError};
use checklist_report::CompileError;
use serde::Serialize;
use std::fmt;

/// Storage errors
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// No report with this id
    #[error("report not found: {0}")]
    ReportNotFound(ReportId),

    /// A stored report changed since it was read
    #[error("version conflict on report {id}: expected {expected}, found {actual}")]
    VersionConflict { id: ReportId, expected: u64, actual: u64 },

    /// Stored template failed to load or validate
    #[error(transparent)]
    Template(#[from] TemplateError),

    /// Backend-specific failure
    #[error("store backend failed: {0}")]
    Backend(String),
}

/// Result type alias for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// One component that blocks finalize
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IncompleteComponent {
    pub position: usize,
    pub name: String,
    pub failure: Incomplete,
}

impl fmt::Display for IncompleteComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.failure)
    }
}

/// Report service errors
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error(transparent)]
    Compile(#[from] CompileError),

    /// Finalize refused; capture stays open
    #[error("report {id} has incomplete components: {}", join(.components))]
    Incomplete {
        id: ReportId,
        components: Vec<IncompleteComponent>,
    },

    /// Report is finalized and locked
    #[error("report {0} is finalized; amend it first")]
    Finalized(ReportId),

    /// Amend requested on a draft
    #[error("report {0} is not finalized")]
    NotFinalized(ReportId),

    /// Component position past the end of the report
    #[error("report {id} has no component at position {position}")]
    NoSuchComponent { id: ReportId, position: usize },

    /// Template could not be hashed
    #[error("template hash failed: {0}")]
    Hash(#[from] serde_json::Error),

    /// Background compilation task panicked or was cancelled
    #[error("background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl ServiceError {
    /// Whether the caller can fix this by editing the report
    #[must_use]
    pub fn is_user_facing(&self) -> bool {
        matches!(
            self,
            Self::Incomplete { .. } | Self::Finalized(_) | Self::NotFinalized(_) | Self::NoSuchComponent { .. }
        )
    }
}

/// Result type alias for service operations
pub type ServiceResult<T> = Result<T, ServiceError>;

fn join(components: &[IncompleteComponent]) -> String {
    components
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
