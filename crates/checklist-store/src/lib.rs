//! Checklist Store
//!
//! Persistence seams and the report lifecycle around the engine.
//!
//! - [`TemplateStore`] / [`ReportStore`]: collaborator traits, with
//!   in-memory and directory-backed implementations
//! - [`TemplateCache`]: injected moka cache with TTL and invalidation hooks
//! - [`ReportService`]: capture, finalize, amend, compile, regenerate
//!
//! Writes use optimistic versioning: every put names the version it was
//! based on, and a stale version fails with
//! [`StoreError::VersionConflict`].

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod cache;
pub mod config;
pub mod error;
pub mod memory;
pub mod record;
pub mod service;
pub mod store;

// Re-exports
pub use cache::{CacheStats, TemplateCache};
pub use config::ServiceConfig;
pub use error::{IncompleteComponent, ServiceError, ServiceResult, StoreError, StoreResult};
pub use memory::{DirTemplateStore, InMemoryReportStore, InMemoryTemplateStore};
pub use record::{FinalizedSnapshot, ReportStatus, StoredReport};
pub use service::{CaptureOutcome, ReportService};
pub use store::{ReportStore, TemplateStore};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
