//! Subcommand bodies
//!
//! Each command returns a serialisable outcome; `main` decides how to print
//! it and which exit status to use.

use anyhow::Context;
use checklist_engine::{
    capture_view, collect, CaptureView, CollectWarning, MatchKind, RawCapture, ResolutionWarning,
    TemplateResolver,
};
use checklist_model::{load_template_file, ReportId, ServiceReport};
use checklist_report::{CompileOptions, CompiledReport, ReportCompiler};
use checklist_store::{DirTemplateStore, ServiceConfig, TemplateCache};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Read and deserialize one JSON document
///
/// # Errors
/// Unreadable file or JSON that does not fit `T`
pub fn read_json<T: DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let content =
        std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("failed to parse {}", path.display()))
}

/// Validated catalog from a template directory
///
/// # Errors
/// Unreadable directory, or any template that fails to parse or validate
pub async fn load_resolver(dir: &Path, config: &ServiceConfig) -> anyhow::Result<Arc<TemplateResolver>> {
    let cache = TemplateCache::new(Arc::new(DirTemplateStore::new(dir)), config);
    let resolver = cache
        .resolver()
        .await
        .with_context(|| format!("failed to load templates from {}", dir.display()))?;
    tracing::info!(
        dir = %dir.display(),
        templates = resolver.templates().len(),
        "loaded template catalog"
    );
    Ok(resolver)
}

/// Outcome of validating one template file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileCheck {
    pub path: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl FileCheck {
    #[inline]
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.error.is_none()
    }
}

/// `validate`: load every file and report each one's defects
#[must_use]
pub fn validate(paths: &[PathBuf]) -> Vec<FileCheck> {
    paths
        .iter()
        .map(|path| match load_template_file(path) {
            Ok(template) => {
                tracing::debug!(path = %path.display(), template = %template.id, "template is valid");
                FileCheck {
                    path: path.clone(),
                    template_id: Some(template.id),
                    error: None,
                }
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "template rejected");
                FileCheck {
                    path: path.clone(),
                    template_id: None,
                    error: Some(e.to_string()),
                }
            }
        })
        .collect()
}

/// Result of `check`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckOutcome {
    pub matched_by: MatchKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolution_warning: Option<ResolutionWarning>,
    pub warnings: Vec<CollectWarning>,
    pub view: CaptureView,
}

/// `check`: resolve, normalise and evaluate one captured component
///
/// `equipment_type` overrides the type named in the capture.
#[must_use]
pub fn check(resolver: &TemplateResolver, mut raw: RawCapture, equipment_type: Option<&str>) -> CheckOutcome {
    if let Some(equipment_type) = equipment_type {
        raw.equipment_type = equipment_type.to_string();
    }
    let resolution = resolver.resolve(&raw.equipment_type, raw.name.as_deref());
    let collected = collect(resolution.template, &raw);
    CheckOutcome {
        matched_by: resolution.matched_by,
        resolution_warning: resolution.warning,
        warnings: collected.warnings,
        view: capture_view(resolution.template, &collected.component),
    }
}

/// Per-report failure in a `compile` batch
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompileFailure {
    pub report_id: ReportId,
    pub error: String,
}

/// Result of `compile`
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct CompileOutcome {
    pub reports: Vec<CompiledReport>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<CompileFailure>,
}

/// `compile`: compile every report against one catalog
#[must_use]
pub fn compile(
    resolver: &TemplateResolver,
    options: CompileOptions,
    reports: &[ServiceReport],
    header: &Value,
) -> CompileOutcome {
    let compiler = ReportCompiler::new(resolver.clone(), options);
    let mut outcome = CompileOutcome::default();
    for (report, result) in reports.iter().zip(compiler.compile_batch(reports, header)) {
        match result {
            Ok(compiled) => outcome.reports.push(compiled),
            Err(e) => {
                tracing::error!(report = %report.id, error = %e, "report failed to compile");
                outcome.failures.push(CompileFailure {
                    report_id: report.id.clone(),
                    error: e.to_string(),
                });
            }
        }
    }
    outcome
}
