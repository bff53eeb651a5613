//! Checklist Engine
//!
//! Shared evaluation logic for capture-time validation and report
//! compilation. Both call sites use this crate, so they cannot disagree
//! about completion or deviation numbering.
//!
//! # Pipeline
//!
//! ```text
//! equipment type → TemplateResolver → ChecklistTemplate
//! raw UI state   → collect          → Component
//! Component      → evaluate         → CompletionReport / ItemState
//! components     → extract          → numbered Deviations
//! ```
//!
//! Everything here is synchronous, pure computation over fetched data.
//!
//! # Example
//!
//! ```rust
//! use checklist_engine::{evaluate, TemplateResolver};
//! use checklist_model::{ChecklistItem, ChecklistTemplate, Component, InputType, ResponseValue, Status};
//!
//! let template = ChecklistTemplate::new("Pumpe")
//!     .with_item(ChecklistItem::new("i1", "Lager", InputType::OkAvvik).required());
//! let resolver = TemplateResolver::new(vec![template]).unwrap();
//!
//! let resolution = resolver.resolve("pumpe", None);
//! let component = Component::new("pumpe").with_response("i1", ResponseValue::status(Status::Ok));
//! assert!(evaluate(resolution.template, &component).complete);
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod collector;
pub mod completion;
pub mod deviation;
pub mod error;
pub mod resolver;

// Re-exports
pub use collector::{collect, CollectWarning, Collected, RawCapture};
pub use completion::{
    capture_view, check_item, evaluate, is_complete, item_states, CaptureView, CompletionReport,
    FailureReason, Incomplete, ItemState,
};
pub use deviation::{
    extract_deviations, extract_report_deviations, resolve_components, Deviation, DeviationId,
    ResolvedComponent,
};
pub use error::{EngineError, EngineResult};
pub use resolver::{fallback_template, MatchKind, Resolution, ResolutionWarning, TemplateResolver, FALLBACK_TEMPLATE_ID};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
