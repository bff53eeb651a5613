//! Report compiler
//!
//! Assembles renderer input from a stored report: per-component info
//! blocks, the visible checklist, numbered deviations, price tables with
//! computed totals, drift schedule grids and the photo gallery.
//!
//! Completion, visibility and numbering all come from `checklist-engine`,
//! the same code the capture surface uses.

use crate::document::{
    ChecklistRow, CompiledComponent, CompiledReport, DriftGrid, DriftRow, InfoBlock, InfoField, PriceLine,
    PriceTable, ReportTotals,
};
use crate::error::{CompileError, CompileResult};
use crate::money::Money;
use crate::options::CompileOptions;
use checklist_engine::{
    extract_deviations, is_complete, item_states, resolve_components, Deviation, ResolvedComponent,
    TemplateResolver,
};
use checklist_model::{
    selected_member, ChecklistItem, ChecklistTemplate, Component, InputType, ResponseValue, ServiceReport,
};
use rayon::prelude::*;
use serde_json::Value;
use std::collections::HashMap;

/// Compiles reports against a fixed template set
#[derive(Debug, Clone)]
pub struct ReportCompiler {
    resolver: TemplateResolver,
    options: CompileOptions,
}

impl ReportCompiler {
    /// Create a compiler
    #[must_use]
    pub fn new(resolver: TemplateResolver, options: CompileOptions) -> Self {
        Self { resolver, options }
    }

    #[inline]
    #[must_use]
    pub fn resolver(&self) -> &TemplateResolver {
        &self.resolver
    }

    #[inline]
    #[must_use]
    pub fn options(&self) -> &CompileOptions {
        &self.options
    }

    /// Compile a report, numbering its deviations from the current state
    ///
    /// # Errors
    /// Fails when a captured price, quantity or hour count is unusable
    pub fn compile(&self, report: &ServiceReport, header: &Value) -> CompileResult<CompiledReport> {
        let resolved = resolve_components(&self.resolver, report);
        let deviations = extract_deviations(&resolved);
        self.assemble(report, header, &resolved, deviations)
    }

    /// Compile a report with an already numbered deviation list
    ///
    /// Used for finalized reports, whose deviations were frozen at
    /// finalize time.
    ///
    /// # Errors
    /// Fails when a captured price, quantity or hour count is unusable
    pub fn compile_with_deviations(
        &self,
        report: &ServiceReport,
        header: &Value,
        deviations: Vec<Deviation>,
    ) -> CompileResult<CompiledReport> {
        let resolved = resolve_components(&self.resolver, report);
        self.assemble(report, header, &resolved, deviations)
    }

    /// Compile many reports in parallel
    ///
    /// Results are in input order. Each report is compiled whole or fails
    /// whole; one failure does not affect the others.
    #[must_use]
    pub fn compile_batch(&self, reports: &[ServiceReport], header: &Value) -> Vec<CompileResult<CompiledReport>> {
        let results: Vec<_> = reports.par_iter().map(|report| self.compile(report, header)).collect();
        let failed = results.iter().filter(|r| r.is_err()).count();
        tracing::info!(reports = reports.len(), failed, "compiled batch");
        results
    }

    fn assemble(
        &self,
        report: &ServiceReport,
        header: &Value,
        resolved: &[ResolvedComponent<'_>],
        deviations: Vec<Deviation>,
    ) -> CompileResult<CompiledReport> {
        let components = resolved
            .iter()
            .map(compile_component)
            .collect::<CompileResult<Vec<_>>>()?;
        let totals = totals(&components)?;
        let warnings = resolved.iter().filter_map(|r| r.warning.clone()).collect();
        let gallery = if self.options.include_gallery {
            report.photos.clone()
        } else {
            Vec::new()
        };

        tracing::debug!(
            report = %report.id,
            components = components.len(),
            deviations = deviations.len(),
            "compiled report"
        );

        Ok(CompiledReport {
            report_id: report.id.clone(),
            header: header.clone(),
            components,
            deviations,
            totals,
            summary: report
                .overall_comment
                .as_deref()
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .map(ToString::to_string),
            gallery,
            currency: self.options.currency.clone(),
            warnings,
        })
    }
}

fn compile_component(resolved: &ResolvedComponent<'_>) -> CompileResult<CompiledComponent> {
    let template = resolved.template;
    let component = resolved.component;

    let products = if template.allow_products {
        let lines = component.products.iter().map(|p| (p.name.as_str(), p.quantity, p.price));
        Some(price_table(resolved.position, lines, "products")?)
    } else {
        None
    };
    let additional_work = if template.allow_additional_work {
        let lines = component
            .additional_work
            .iter()
            .map(|w| (w.description.as_str(), w.hours, w.price));
        Some(price_table(resolved.position, lines, "additional work")?)
    } else {
        None
    };

    Ok(CompiledComponent {
        position: resolved.position,
        template_id: template.id.clone(),
        complete: is_complete(template, component),
        info: info_block(resolved),
        checklist: checklist_rows(template, component),
        products,
        additional_work,
        drift_schedule: drift_grid(template, component),
        comment: template
            .allow_comments
            .then(|| component.comment.as_deref().map(str::trim).filter(|c| !c.is_empty()))
            .flatten()
            .map(ToString::to_string),
        images: component.images.clone(),
    })
}

fn info_block(resolved: &ResolvedComponent<'_>) -> InfoBlock {
    let component = resolved.component;
    InfoBlock {
        title: resolved.display_name(),
        equipment_type: component.equipment_type.clone(),
        name: component.name.clone(),
        location: component.location.clone(),
        fields: resolved
            .template
            .ordered_fields()
            .into_iter()
            .map(|f| InfoField {
                label: f.label.clone(),
                value: component.detail(&f.name).unwrap_or_default().to_string(),
            })
            .collect(),
    }
}

fn checklist_rows(template: &ChecklistTemplate, component: &Component) -> Vec<ChecklistRow> {
    let items: HashMap<&str, &ChecklistItem> = template
        .flatten()
        .into_iter()
        .map(|item| (item.id.as_str(), item))
        .collect();

    item_states(template, component)
        .into_iter()
        .filter(|state| state.visible)
        .filter_map(|state| {
            let item = items.get(state.item_id.as_str())?;
            let (status, remark) = format_response(item, component);
            Some(ChecklistRow {
                item_id: state.item_id,
                label: state.label,
                depth: state.depth,
                status,
                remark,
            })
        })
        .collect()
}

/// Formatted status and remark for one item
fn format_response(item: &ChecklistItem, component: &Component) -> (Option<String>, Option<String>) {
    let response = component.response(&item.id);
    let text = response.and_then(ResponseValue::as_text).map(str::trim);
    match item.input_type {
        InputType::OkAvvik | InputType::OkByttetAvvik => {
            let status = response.and_then(ResponseValue::as_status);
            (
                status.and_then(|s| s.status).map(|s| s.display_label().to_string()),
                status.and_then(|s| s.comment_text()).map(|c| c.trim().to_string()),
            )
        }
        InputType::Checkbox => (
            response
                .and_then(ResponseValue::as_flag)
                .map(|b| (if b { "Ja" } else { "Nei" }).to_string()),
            None,
        ),
        InputType::GroupSelection => (
            None,
            selected_member(item, &component.checklist).map(|member| member.label.clone()),
        ),
        InputType::Temperature => (None, text.map(|t| format!("{t} °C"))),
        InputType::Virkningsgrad => (None, text.map(|t| format!("{t} %"))),
        InputType::Numeric
        | InputType::Text
        | InputType::Textarea
        | InputType::Comment
        | InputType::SwitchSelect
        | InputType::Dropdown => (None, text.map(ToString::to_string)),
    }
}

fn price_table<'a, I>(component: usize, lines: I, section: &'static str) -> CompileResult<PriceTable>
where
    I: Iterator<Item = (&'a str, f64, f64)>,
{
    let lines = lines
        .map(|(description, quantity, price)| -> CompileResult<PriceLine> {
            let invalid = || CompileError::InvalidAmount {
                component,
                line: description.to_string(),
            };
            let unit_price = Money::from_kroner(price).ok_or_else(invalid)?;
            let total = unit_price.times(quantity).ok_or_else(invalid)?;
            Ok(PriceLine {
                description: description.to_string(),
                quantity,
                unit_price,
                total,
            })
        })
        .collect::<CompileResult<Vec<_>>>()?;
    let total = Money::checked_sum(lines.iter().map(|l| l.total)).ok_or(CompileError::AmountOverflow { section })?;
    Ok(PriceTable { lines, total })
}

fn drift_grid(template: &ChecklistTemplate, component: &Component) -> Option<DriftGrid> {
    if !template.has_drift_schedule {
        return None;
    }
    let config = template.drift_schedule_config.as_ref()?;
    let rows = config
        .fields
        .iter()
        .map(|field| DriftRow {
            field: field.clone(),
            cells: config
                .days
                .iter()
                .map(|day| {
                    component
                        .drift_schedule
                        .get(day)
                        .and_then(|values| values.get(field))
                        .cloned()
                        .unwrap_or_default()
                })
                .collect(),
        })
        .collect();
    Some(DriftGrid {
        title: config.title.clone(),
        days: config.days.clone(),
        rows,
    })
}

fn totals(components: &[CompiledComponent]) -> CompileResult<ReportTotals> {
    let products = Money::checked_sum(components.iter().filter_map(|c| c.products.as_ref()).map(|t| t.total))
        .ok_or(CompileError::AmountOverflow { section: "products" })?;
    let additional_work = Money::checked_sum(
        components
            .iter()
            .filter_map(|c| c.additional_work.as_ref())
            .map(|t| t.total),
    )
    .ok_or(CompileError::AmountOverflow {
        section: "additional work",
    })?;
    let grand_total = products
        .checked_add(additional_work)
        .ok_or(CompileError::AmountOverflow { section: "grand total" })?;
    Ok(ReportTotals {
        products,
        additional_work,
        grand_total,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use checklist_model::{Product, Status, StatusResponse};

    fn template() -> ChecklistTemplate {
        ChecklistTemplate::new("Pumpe")
            .with_item(ChecklistItem::new("s", "Lager", InputType::OkAvvik))
            .with_item(ChecklistItem::new("t", "Temperatur", InputType::Temperature))
            .with_item(ChecklistItem::new("v", "Virkningsgrad", InputType::Virkningsgrad))
            .with_item(ChecklistItem::new("c", "Alarm", InputType::Checkbox))
            .with_item(ChecklistItem::new("h", "Tiltak", InputType::Text).show_when("s", "avvik"))
            .allow_products()
    }

    fn compile_one(component: Component) -> CompiledReport {
        let resolver = TemplateResolver::new(vec![template()]).unwrap();
        let compiler = ReportCompiler::new(resolver, CompileOptions::default());
        let report = ServiceReport::new("r").with_component(component);
        compiler.compile(&report, &Value::Null).unwrap()
    }

    #[test]
    fn rows_format_by_input_type() {
        let component = Component::new("pumpe")
            .with_response("s", ResponseValue::Status(StatusResponse::new(Status::Ok).with_comment("Smurt")))
            .with_response("t", ResponseValue::text("19"))
            .with_response("v", ResponseValue::text("78"))
            .with_response("c", ResponseValue::Flag(false));
        let rows = &compile_one(component).components[0].checklist;
        let formatted: Vec<_> = rows
            .iter()
            .map(|r| (r.item_id.as_str(), r.status.as_deref(), r.remark.as_deref()))
            .collect();
        assert_eq!(
            formatted,
            vec![
                ("s", Some("OK"), Some("Smurt")),
                ("t", None, Some("19 °C")),
                ("v", None, Some("78 %")),
                ("c", Some("Nei"), None),
            ]
        );
    }

    #[test]
    fn hidden_items_are_omitted() {
        let component = Component::new("pumpe").with_response(
            "s",
            ResponseValue::Status(StatusResponse::new(Status::Avvik).with_comment("Slitt")),
        );
        let compiled = compile_one(component);
        assert!(compiled.components[0].checklist.iter().any(|r| r.item_id == "h"));
        assert_eq!(compiled.deviations.len(), 1);

        let ok = Component::new("pumpe").with_response("s", ResponseValue::status(Status::Ok));
        assert!(!compile_one(ok).components[0].checklist.iter().any(|r| r.item_id == "h"));
    }

    #[test]
    fn invalid_price_fails_the_report() {
        let mut component = Component::new("pumpe");
        component.products.push(Product {
            name: "Pakning".to_string(),
            quantity: 1.0,
            price: f64::NAN,
        });
        let resolver = TemplateResolver::new(vec![template()]).unwrap();
        let compiler = ReportCompiler::new(resolver, CompileOptions::default());
        let report = ServiceReport::new("r").with_component(component);
        let err = compiler.compile(&report, &Value::Null).unwrap_err();
        assert!(matches!(err, CompileError::InvalidAmount { component: 0, .. }));
    }

    #[test]
    fn disallowed_sections_are_not_rendered() {
        let mut component = Component::new("pumpe");
        component.comment = Some("Ikke med".to_string());
        let compiled = compile_one(component);
        assert!(compiled.components[0].additional_work.is_none());
        assert!(compiled.components[0].drift_schedule.is_none());
        assert!(compiled.components[0].comment.is_none());
        assert!(compiled.components[0].products.is_some());
    }
}
