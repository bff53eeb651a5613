//! Checklist Report
//!
//! Compiles stored service reports into renderer input.
//!
//! # Sections
//!
//! - one [`InfoBlock`] per component (identity and system fields)
//! - the visible checklist with formatted statuses and remarks
//! - numbered deviations, shared with the capture surface
//! - product and additional-work tables with computed totals
//! - drift schedule grid, summary and photo gallery
//!
//! Money is held as integer øre ([`Money`]), so the grand total is always
//! the literal sum of the rendered lines.

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod compiler;
pub mod document;
pub mod error;
pub mod money;
pub mod options;

// Re-exports
pub use compiler::ReportCompiler;
pub use document::{
    ChecklistRow, CompiledComponent, CompiledReport, DriftGrid, DriftRow, InfoBlock, InfoField, PriceLine,
    PriceTable, ReportTotals,
};
pub use error::{CompileError, CompileResult};
pub use money::Money;
pub use options::CompileOptions;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
