//! Testing utilities for the checklist workspace
//!
//! Shared templates, components and reports used across crate tests.

#![allow(missing_docs)]

use checklist_model::{
    AdditionalWork, ChecklistItem, ChecklistTemplate, Component, DriftScheduleConfig, InputType,
    Product, ResponseValue, ServiceReport, Status, StatusResponse, SystemField,
};

/// One required system field and one required `ok_avvik` item
pub fn scenario_template() -> ChecklistTemplate {
    ChecklistTemplate::new("Aggregat")
        .with_field(SystemField::new("plassering", "Plassering").required())
        .with_item(ChecklistItem::new("i1", "Filter", InputType::OkAvvik).required())
}

/// Template exercising every input-type family and optional section
pub fn ventilation_template() -> ChecklistTemplate {
    ChecklistTemplate::new("Ventilasjonsaggregat")
        .with_id("ventilasjon")
        .with_field(SystemField::new("systemnummer", "Systemnummer").required())
        .with_field(SystemField::new("plassering", "Plassering").required())
        .with_field(SystemField::new("betjener", "Betjener"))
        .with_item(ChecklistItem::new("filter", "Filter", InputType::OkByttetAvvik).required())
        .with_item(
            ChecklistItem::new("vifte", "Vifte i drift", InputType::Checkbox)
                .required()
                .with_subpoints(vec![
                    ChecklistItem::new("vifte_lager", "Lager", InputType::OkAvvik)
                        .required()
                        .with_order(0),
                    ChecklistItem::new("vifte_strom", "Strømtrekk", InputType::Numeric)
                        .required()
                        .with_order(1),
                ]),
        )
        .with_item(ChecklistItem::new("temp_tilluft", "Tilluftstemperatur", InputType::Temperature).required())
        .with_item(ChecklistItem::new("virkningsgrad", "Virkningsgrad", InputType::Virkningsgrad))
        .with_item(
            ChecklistItem::new("modus", "Driftsmodus", InputType::GroupSelection)
                .required()
                .with_subpoints(vec![
                    ChecklistItem::new("modus_auto", "Automatisk", InputType::Checkbox)
                        .in_group("modus")
                        .with_order(0),
                    ChecklistItem::new("modus_manuell", "Manuell", InputType::Checkbox)
                        .in_group("modus")
                        .with_order(1),
                ]),
        )
        .with_item(
            ChecklistItem::new("rem", "Drift", InputType::SwitchSelect)
                .required()
                .with_options(["Direkte", "Reim"]),
        )
        .with_item(
            ChecklistItem::new("rem_status", "Reim", InputType::OkAvvik)
                .required()
                .show_when("rem", "Reim"),
        )
        .with_item(ChecklistItem::new("merknad", "Merknad", InputType::Textarea))
        .allow_products()
        .allow_additional_work()
        .allow_comments()
        .with_drift_schedule(DriftScheduleConfig {
            title: "Driftstider".to_string(),
            days: vec!["Mandag".to_string(), "Tirsdag".to_string()],
            fields: vec!["Start".to_string(), "Stopp".to_string()],
        })
}

/// Component satisfying [`scenario_template`]
pub fn scenario_component(status: Status, comment: Option<&str>) -> Component {
    let mut response = StatusResponse::new(status);
    response.comment = comment.map(ToString::to_string);
    Component::new("aggregat")
        .with_detail("plassering", "Tak")
        .with_response("i1", ResponseValue::Status(response))
}

/// Component satisfying [`ventilation_template`]
pub fn complete_ventilation_component() -> Component {
    let mut component = Component::new("ventilasjon")
        .with_name("Aggregat 360.01")
        .with_detail("systemnummer", "360.01")
        .with_detail("plassering", "Teknisk rom")
        .with_response("filter", ResponseValue::status(Status::Byttet).with_comment_if_status("Nytt filter F7"))
        .with_response("vifte", ResponseValue::Flag(true))
        .with_response("vifte_lager", ResponseValue::status(Status::Ok))
        .with_response("vifte_strom", ResponseValue::text("4.2"))
        .with_response("temp_tilluft", ResponseValue::text("19"))
        .with_response("virkningsgrad", ResponseValue::text("78"))
        .with_response("modus", ResponseValue::text("modus_auto"))
        .with_response("modus_auto", ResponseValue::Flag(true))
        .with_response("rem", ResponseValue::text("Direkte"));
    component.products = vec![Product {
        name: "Filter F7".to_string(),
        quantity: 2.0,
        price: 450.0,
    }];
    component.additional_work = vec![AdditionalWork {
        description: "Rengjøring av kanal".to_string(),
        hours: 1.5,
        price: 950.0,
    }];
    component
        .drift_schedule
        .entry("Mandag".to_string())
        .or_default()
        .insert("Start".to_string(), "06:00".to_string());
    component
}

/// Attach a comment to a status response, no-op for other shapes
pub trait WithComment {
    fn with_comment_if_status(self, comment: &str) -> Self;
}

impl WithComment for ResponseValue {
    fn with_comment_if_status(self, comment: &str) -> Self {
        match self {
            ResponseValue::Status(s) => ResponseValue::Status(s.with_comment(comment)),
            other => other,
        }
    }
}

/// Deviation response with images
pub fn avvik(comment: &str, images: &[&str]) -> ResponseValue {
    ResponseValue::Status(
        StatusResponse::new(Status::Avvik)
            .with_comment(comment)
            .with_images(images.iter().copied()),
    )
}

/// Report with the given components, in order
pub fn report_with(id: &str, components: Vec<Component>) -> ServiceReport {
    components
        .into_iter()
        .fold(ServiceReport::new(id), ServiceReport::with_component)
}
