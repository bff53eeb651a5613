//! Renderer input produced by the compiler
//!
//! Everything here is presentation-ready: labels resolved, statuses
//! formatted, totals computed. A renderer only lays it out.

use crate::money::Money;
use checklist_engine::{Deviation, ResolutionWarning};
use checklist_model::{Photo, ReportId};
use serde::Serialize;

/// Compiled service report
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompiledReport {
    pub report_id: ReportId,
    /// Tenant/company block, passed through untouched
    pub header: serde_json::Value,
    pub components: Vec<CompiledComponent>,
    pub deviations: Vec<Deviation>,
    pub totals: ReportTotals,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    pub gallery: Vec<Photo>,
    pub currency: String,
    /// Components that fell back to the built-in template
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<ResolutionWarning>,
}

/// One component's section of the report
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompiledComponent {
    pub position: usize,
    pub template_id: String,
    pub complete: bool,
    pub info: InfoBlock,
    pub checklist: Vec<ChecklistRow>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub products: Option<PriceTable>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub additional_work: Option<PriceTable>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub drift_schedule: Option<DriftGrid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub images: Vec<String>,
}

/// Identity and system-field values of a component
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InfoBlock {
    pub title: String,
    pub equipment_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    pub fields: Vec<InfoField>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InfoField {
    pub label: String,
    /// Empty when not captured
    pub value: String,
}

/// One visible checklist item
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChecklistRow {
    pub item_id: String,
    pub label: String,
    pub depth: usize,
    /// Formatted status (`OK`, `Avvik`, `Ja`, ...)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// Measurement, free text or status comment
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remark: Option<String>,
}

/// Product or additional-work table with computed totals
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceTable {
    pub lines: Vec<PriceLine>,
    pub total: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceLine {
    pub description: String,
    /// Quantity for products, hours for work
    pub quantity: f64,
    pub unit_price: Money,
    pub total: Money,
}

/// Drift schedule: one row per field, one column per day
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DriftGrid {
    pub title: String,
    pub days: Vec<String>,
    pub rows: Vec<DriftRow>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DriftRow {
    pub field: String,
    pub cells: Vec<String>,
}

/// Sums over every rendered price table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportTotals {
    pub products: Money,
    pub additional_work: Money,
    pub grand_total: Money,
}
