use checklist_engine::RawCapture;
use checklist_model::{ChecklistItem, Component, InputType, ReportId, ServiceReport, Status};
use checklist_report::CompileOptions;
use checklist_store::{
    DirTemplateStore, InMemoryReportStore, InMemoryTemplateStore, ReportService, ReportStatus, ServiceConfig,
    ServiceError, StoreError,
};
use checklist_test_utils::{
    avvik, complete_ventilation_component, report_with, scenario_component, scenario_template,
    ventilation_template,
};
use pretty_assertions::assert_eq;
use serde_json::json;
use std::sync::Arc;

fn service_with(config: ServiceConfig) -> (ReportService, Arc<InMemoryTemplateStore>) {
    let templates = Arc::new(InMemoryTemplateStore::new(vec![scenario_template(), ventilation_template()]));
    let service = ReportService::new(
        templates.clone(),
        Arc::new(InMemoryReportStore::new()),
        config,
        CompileOptions::default(),
    );
    (service, templates)
}

fn service() -> ReportService {
    service_with(ServiceConfig::default()).0
}

#[tokio::test]
async fn finalize_names_every_incomplete_component() {
    let service = service();
    let report = report_with(
        "r1",
        vec![
            Component::new("aggregat").with_name("A1"),
            scenario_component(Status::Ok, None),
            Component::new("ventilasjon").with_name("V1"),
        ],
    );
    let stored = service.create_report(report).await.unwrap();

    let err = service.finalize(&stored.report.id, stored.version).await.unwrap_err();
    let ServiceError::Incomplete { components, .. } = &err else {
        panic!("expected incomplete, got {err:?}");
    };
    let positions: Vec<usize> = components.iter().map(|c| c.position).collect();
    assert_eq!(positions, vec![0, 2]);
    assert_eq!(components[1].name, "V1");
    assert!(err.is_user_facing());

    let still_draft = service.get_report(&stored.report.id).await.unwrap();
    assert_eq!(still_draft.status, ReportStatus::Draft);
    assert_eq!(still_draft.version, stored.version);
}

#[tokio::test]
async fn finalized_report_is_locked_until_amended() {
    let service = service();
    let report = report_with("r2", vec![scenario_component(Status::Avvik, Some("Filter tett"))]);
    let stored = service.create_report(report).await.unwrap();
    let id = stored.report.id.clone();

    let finalized = service.finalize(&id, stored.version).await.unwrap();
    assert_eq!(finalized.status, ReportStatus::Finalized);
    let snapshot = finalized.snapshot.as_ref().unwrap();
    assert_eq!(snapshot.deviations[0].id.to_string(), "001");
    assert!(snapshot.template_hashes.contains_key("aggregat"));

    let raw = RawCapture::from(&scenario_component(Status::Ok, None));
    let err = service
        .capture_component(&id, 0, &raw, finalized.version)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Finalized(_)));

    let amended = service.amend(&id, finalized.version).await.unwrap();
    assert_eq!(amended.status, ReportStatus::Draft);
    assert!(amended.snapshot.is_none());
    assert_eq!(amended.version, finalized.version + 1);

    let outcome = service.capture_component(&id, 0, &raw, amended.version).await.unwrap();
    assert!(outcome.view.completion.complete);
    let compiled = service.compile(&id, &json!(null)).await.unwrap();
    assert!(compiled.deviations.is_empty());
}

#[tokio::test]
async fn amend_on_draft_is_refused() {
    let service = service();
    let stored = service.create_report(ServiceReport::new("r3")).await.unwrap();
    let err = service.amend(&stored.report.id, stored.version).await.unwrap_err();
    assert!(matches!(err, ServiceError::NotFinalized(_)));
}

#[tokio::test]
async fn unlocked_edit_drops_snapshot_and_finalized_status() {
    let service = service_with(ServiceConfig::default().with_lock_finalized(false)).0;
    let report = report_with("r4", vec![scenario_component(Status::Avvik, Some("Filter tett"))]);
    let stored = service.create_report(report).await.unwrap();
    let finalized = service.finalize(&stored.report.id, stored.version).await.unwrap();

    let mut edited = finalized.report.clone();
    edited.components[0] = Component::new("aggregat");
    let replaced = service.replace_report(edited, finalized.version).await.unwrap();
    assert_eq!(replaced.status, ReportStatus::Draft);
    assert!(replaced.snapshot.is_none());

    let compiled = service.compile(&stored.report.id, &json!(null)).await.unwrap();
    assert!(compiled.deviations.is_empty());
    assert!(!compiled.components[0].complete);
    let row = &compiled.components[0].checklist[0];
    assert_eq!((row.item_id.as_str(), row.status.as_deref()), ("i1", None));

    let err = service.finalize(&stored.report.id, replaced.version).await.unwrap_err();
    assert!(matches!(err, ServiceError::Incomplete { .. }));
}

#[tokio::test]
async fn unlocked_capture_reopens_finalized_report() {
    let service = service_with(ServiceConfig::default().with_lock_finalized(false)).0;
    let report = report_with("r4b", vec![scenario_component(Status::Avvik, Some("Filter tett"))]);
    let stored = service.create_report(report).await.unwrap();
    let finalized = service.finalize(&stored.report.id, stored.version).await.unwrap();

    let raw = RawCapture::from(&scenario_component(Status::Avvik, Some("Filter byttet ut")));
    let outcome = service
        .capture_component(&stored.report.id, 0, &raw, finalized.version)
        .await
        .unwrap();
    assert_eq!(outcome.stored.status, ReportStatus::Draft);

    let compiled = service.compile(&stored.report.id, &json!(null)).await.unwrap();
    assert_eq!(compiled.deviations[0].description, "Filter byttet ut");
}

#[tokio::test]
async fn template_edit_after_finalize_keeps_numbering() {
    let (service, templates) = service_with(ServiceConfig::default());
    let report = report_with("r5", vec![scenario_component(Status::Avvik, Some("Filter tett"))]);
    let stored = service.create_report(report).await.unwrap();
    let finalized = service.finalize(&stored.report.id, stored.version).await.unwrap();

    templates.insert(
        scenario_template().with_item(ChecklistItem::new("i0", "Nytt punkt", InputType::OkAvvik).with_order(-1)),
    );
    service.template_cache().invalidate("aggregat").await;

    let compiled = service.compile(&stored.report.id, &json!(null)).await.unwrap();
    assert_eq!(compiled.deviations, finalized.snapshot.unwrap().deviations);
}

#[tokio::test]
async fn stale_writer_gets_version_conflict() {
    let service = service();
    let stored = service.create_report(ServiceReport::new("r6")).await.unwrap();
    let raw = RawCapture::from(&scenario_component(Status::Ok, None));

    service.capture_component(&stored.report.id, 0, &raw, stored.version).await.unwrap();
    let err = service
        .capture_component(&stored.report.id, 0, &raw, stored.version)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ServiceError::Store(StoreError::VersionConflict { expected: 1, actual: 2, .. })
    ));
}

#[tokio::test]
async fn capture_normalizes_form_state() {
    let service = service();
    let stored = service.create_report(ServiceReport::new("r7")).await.unwrap();
    let raw: RawCapture = serde_json::from_value(json!({
        "equipmentType": "ventilasjon",
        "details": {"systemnummer": "360.02"},
        "checklist": {"modus_auto": true, "modus_manuell": true, "rem": "Kjede"}
    }))
    .unwrap();

    let outcome = service.capture_component(&stored.report.id, 0, &raw, stored.version).await.unwrap();
    assert_eq!(outcome.warnings.len(), 2);
    assert!(!outcome.view.completion.complete);
    assert_eq!(outcome.view.template_id, "ventilasjon");

    let component = &outcome.stored.report.components[0];
    assert!(component.response("modus_manuell").is_none());
    assert!(component.response("rem").is_none());

    let view = service.capture_view(&stored.report.id, 0).await.unwrap();
    assert_eq!(view, outcome.view);
}

#[tokio::test]
async fn regenerate_isolates_missing_reports() {
    let service = service();
    let good = report_with(
        "r8",
        vec![complete_ventilation_component().with_response("vifte_lager", avvik("Slitt", &[]))],
    );
    service.create_report(good).await.unwrap();

    let ids = vec![ReportId::from("r8"), ReportId::from("mangler")];
    let results = service.regenerate(&ids, &json!({"firma": "Kulde AS"})).await.unwrap();
    assert_eq!(results.len(), 2);
    assert_eq!(results[0].0, ReportId::from("r8"));
    assert_eq!(results[0].1.as_ref().unwrap().deviations.len(), 1);
    assert!(matches!(
        results[1].1,
        Err(ServiceError::Store(StoreError::ReportNotFound(_)))
    ));
}

#[tokio::test]
async fn directory_store_feeds_the_service() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("pumpe.json"),
        r#"{"name": "Pumpe", "checklistItems": [{"id": "lager", "text": "Lager", "required": true}]}"#,
    )
    .unwrap();
    let service = ReportService::new(
        Arc::new(DirTemplateStore::new(dir.path())),
        Arc::new(InMemoryReportStore::new()),
        ServiceConfig::default(),
        CompileOptions::default(),
    );

    let report = ServiceReport::new("r9").with_component(Component::new("pumpe"));
    let stored = service.create_report(report).await.unwrap();
    let view = service.capture_view(&stored.report.id, 0).await.unwrap();
    assert_eq!(view.template_id, "pumpe");
    assert!(!view.completion.complete);
    assert_eq!(view.items[0].input_type, InputType::OkAvvik);
}
