use checklist_cli::{check, compile, load_resolver, read_json, CliConfig};
use checklist_engine::{RawCapture, TemplateResolver};
use checklist_model::{ServiceReport, Status};
use checklist_test_utils::{
    avvik, complete_ventilation_component, report_with, scenario_component, scenario_template, ventilation_template,
};
use pretty_assertions::assert_eq;
use serde_json::json;
use std::path::Path;
use tempfile::TempDir;

fn template_dir() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    for template in [scenario_template(), ventilation_template()] {
        let path = dir.path().join(format!("{}.json", template.id));
        std::fs::write(path, serde_json::to_string_pretty(&template).unwrap()).unwrap();
    }
    std::fs::write(dir.path().join("LESMEG.txt"), "ikke en mal").unwrap();
    dir
}

fn write_json(dir: &Path, name: &str, value: &impl serde::Serialize) -> std::path::PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, serde_json::to_string(value).unwrap()).unwrap();
    path
}

async fn resolver(dir: &TempDir) -> std::sync::Arc<TemplateResolver> {
    load_resolver(dir.path(), &CliConfig::default().service).await.unwrap()
}

#[tokio::test]
async fn template_directory_becomes_catalog() {
    let dir = template_dir();
    let resolver = resolver(&dir).await;
    let mut ids: Vec<&str> = resolver.templates().iter().map(|t| t.id.as_str()).collect();
    ids.sort_unstable();
    assert_eq!(ids, vec!["aggregat", "ventilasjon"]);
}

#[tokio::test]
async fn broken_template_directory_is_an_error() {
    let dir = template_dir();
    std::fs::write(dir.path().join("brutt.yaml"), "name: [").unwrap();
    let err = load_resolver(dir.path(), &CliConfig::default().service).await.unwrap_err();
    assert!(format!("{err:#}").contains("failed to load templates"));
}

#[tokio::test]
async fn check_reads_capture_file() {
    let dir = template_dir();
    let resolver = resolver(&dir).await;
    let capture = write_json(
        dir.path(),
        "komponent.json",
        &RawCapture::from(&scenario_component(Status::Avvik, Some("Filter tett"))),
    );

    let raw: RawCapture = read_json(&capture).unwrap();
    let outcome = check(&resolver, raw, None);
    assert!(outcome.view.completion.complete);
    assert!(outcome.warnings.is_empty());
}

#[tokio::test]
async fn compile_keeps_good_reports_when_one_fails() {
    let dir = template_dir();
    let resolver = resolver(&dir).await;
    let good = report_with(
        "god",
        vec![complete_ventilation_component().with_response("filter", avvik("Tett", &["f.jpg"]))],
    );
    let path = write_json(dir.path(), "god.json", &good);
    let mut broken = complete_ventilation_component();
    broken.products[0].price = 1e300;
    let bad = report_with("brutt", vec![broken]);

    let reports: Vec<ServiceReport> = vec![read_json(&path).unwrap(), bad];
    let outcome = compile(&resolver, CliConfig::default().compile, &reports, &json!({"firma": "Kulde AS"}));

    assert_eq!(outcome.reports.len(), 1);
    assert_eq!(outcome.reports[0].header, json!({"firma": "Kulde AS"}));
    assert_eq!(outcome.reports[0].deviations[0].images, vec!["f.jpg".to_string()]);
    assert_eq!(outcome.failures.len(), 1);
    assert_eq!(outcome.failures[0].report_id.to_string(), "brutt");
}
