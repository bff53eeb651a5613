//! Checklist Model
//!
//! Schema of inspection checklists and the instances captured against it.
//!
//! # Core Concepts
//!
//! - [`ChecklistTemplate`]: authored schema for one equipment type
//! - [`ChecklistItem`]: recursive tree node with a closed [`InputType`]
//! - [`Component`]: one filled checklist for one physical unit
//! - [`ResponseValue`]: captured value, shaped by the item's input type
//! - [`ServiceReport`]: the ordered components of one service visit
//!
//! Templates are normalised on deserialisation (legacy `text` labels,
//! missing input types) and validated on load, so downstream code never
//! handles malformed shapes.
//!
//! # Example
//!
//! ```rust
//! use checklist_model::{parse_template, TemplateFormat};
//!
//! let json = r#"{"name": "Ventilasjon", "checklistItems": [{"id": "i1", "text": "Filter"}]}"#;
//! let template = parse_template(json, TemplateFormat::Json).unwrap();
//! assert_eq!(template.id, "ventilasjon");
//! assert_eq!(template.checklist_items[0].label, "Filter");
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod component;
pub mod error;
pub mod hash;
pub mod item;
pub mod load;
pub mod template;
pub mod validation;
pub mod visibility;

// Re-exports
pub use component::{
    AdditionalWork, Component, DriftSchedule, Photo, Product, ReportId, ResponseValue,
    ServiceReport, Status, StatusResponse,
};
pub use error::{TemplateDefect, TemplateError, TemplateResult};
pub use hash::TemplateHash;
pub use item::{in_order, placeholder_label, ChecklistItem, InputType, RawChecklistItem, ShowWhen};
pub use load::{load_template_dir, load_template_file, parse_catalog, parse_template, TemplateFormat};
pub use template::{derive_template_id, template_key, ChecklistTemplate, DriftScheduleConfig, RawTemplate, SystemField};
pub use validation::{find_defects, validate_template};
pub use visibility::{member_active, resolve_visibility, selected_member, subpoints_open, Responses};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
