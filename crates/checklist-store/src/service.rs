//! Report lifecycle service
//!
//! Ties the stores, the template cache and the engine together for the
//! two call sites: capture (collect, per-item state, finalize) and
//! rendering (compile, regenerate).
//!
//! Lifecycle:
//!
//! ```text
//! create → Draft ──finalize──► Finalized ──amend──► Draft (new version)
//!            ▲ capture                    │ compile uses snapshot
//! ```
//!
//! Every write goes through [`ReportStore::put_report`] with the version
//! the caller read, so concurrent writers cannot silently overwrite each
//! other.

use crate::cache::TemplateCache;
use crate::config::ServiceConfig;
use crate::error::{IncompleteComponent, ServiceError, ServiceResult};
use crate::record::{FinalizedSnapshot, ReportStatus, StoredReport};
use crate::store::{ReportStore, TemplateStore};
use checklist_engine::{
    capture_view, collect, evaluate, extract_deviations, resolve_components, CaptureView, CollectWarning,
    RawCapture, ResolvedComponent, TemplateResolver,
};
use checklist_model::{ReportId, ServiceReport, TemplateHash};
use checklist_report::{CompileOptions, CompiledReport, ReportCompiler};
use rayon::prelude::*;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Result of capturing one component
#[derive(Debug, Clone)]
pub struct CaptureOutcome {
    pub stored: StoredReport,
    pub warnings: Vec<CollectWarning>,
    pub view: CaptureView,
}

/// Report lifecycle over injected stores
#[derive(Clone)]
pub struct ReportService {
    templates: TemplateCache,
    reports: Arc<dyn ReportStore>,
    config: ServiceConfig,
    compile_options: CompileOptions,
}

impl std::fmt::Debug for ReportService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReportService")
            .field("templates", &self.templates)
            .field("config", &self.config)
            .field("compile_options", &self.compile_options)
            .finish_non_exhaustive()
    }
}

impl ReportService {
    /// Create a service with its own template cache
    #[must_use]
    pub fn new(
        templates: Arc<dyn TemplateStore>,
        reports: Arc<dyn ReportStore>,
        config: ServiceConfig,
        compile_options: CompileOptions,
    ) -> Self {
        Self {
            templates: TemplateCache::new(templates, &config),
            reports,
            config,
            compile_options,
        }
    }

    /// The template cache, for invalidation hooks
    #[inline]
    #[must_use]
    pub fn template_cache(&self) -> &TemplateCache {
        &self.templates
    }

    #[inline]
    #[must_use]
    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// Store a new draft report
    ///
    /// # Errors
    /// Fails if a report with the same id exists
    pub async fn create_report(&self, report: ServiceReport) -> ServiceResult<StoredReport> {
        let stored = self.reports.put_report(StoredReport::draft(report), 0).await?;
        tracing::info!(report = %stored.report.id, "created report");
        Ok(stored)
    }

    /// Load a report
    ///
    /// # Errors
    /// Fails if the report does not exist
    pub async fn get_report(&self, id: &ReportId) -> ServiceResult<StoredReport> {
        Ok(self.reports.get_report(id).await?)
    }

    /// Replace the whole report document
    ///
    /// A finalized report is reopened as a draft when
    /// [`ServiceConfig::lock_finalized`] is off.
    ///
    /// # Errors
    /// Refused on a locked finalized report or a stale version
    pub async fn replace_report(&self, report: ServiceReport, expected_version: u64) -> ServiceResult<StoredReport> {
        let mut stored = self.reports.get_report(&report.id).await?;
        self.open_for_write(&mut stored)?;
        stored.report = report;
        Ok(self.reports.put_report(stored, expected_version).await?)
    }

    /// Collect raw capture state into the component at `position`
    ///
    /// `position` equal to the component count appends a new component.
    ///
    /// # Errors
    /// Refused on a locked finalized report, a stale version or a
    /// position past the end
    pub async fn capture_component(
        &self,
        id: &ReportId,
        position: usize,
        raw: &RawCapture,
        expected_version: u64,
    ) -> ServiceResult<CaptureOutcome> {
        let mut stored = self.reports.get_report(id).await?;
        self.open_for_write(&mut stored)?;
        let count = stored.report.components.len();
        if position > count {
            return Err(ServiceError::NoSuchComponent {
                id: id.clone(),
                position,
            });
        }

        let resolver = self.templates.resolver().await?;
        let resolution = resolver.resolve(&raw.equipment_type, raw.name.as_deref());
        let collected = collect(resolution.template, raw);
        let view = capture_view(resolution.template, &collected.component);

        if position == count {
            stored.report.components.push(collected.component);
        } else {
            stored.report.components[position] = collected.component;
        }
        let stored = self.reports.put_report(stored, expected_version).await?;
        tracing::debug!(report = %id, position, complete = view.completion.complete, "captured component");

        Ok(CaptureOutcome {
            stored,
            warnings: collected.warnings,
            view,
        })
    }

    /// Per-item visibility and completion for one component
    ///
    /// # Errors
    /// Fails if the report or component does not exist
    pub async fn capture_view(&self, id: &ReportId, position: usize) -> ServiceResult<CaptureView> {
        let stored = self.reports.get_report(id).await?;
        let component = stored
            .report
            .components
            .get(position)
            .ok_or_else(|| ServiceError::NoSuchComponent {
                id: id.clone(),
                position,
            })?;
        let resolver = self.templates.resolver().await?;
        let resolution = resolver.resolve(&component.equipment_type, component.name.as_deref());
        Ok(capture_view(resolution.template, component))
    }

    /// Freeze a complete report and its numbered deviations
    ///
    /// # Errors
    /// [`ServiceError::Incomplete`] naming every incomplete component;
    /// [`ServiceError::Finalized`] if already finalized
    pub async fn finalize(&self, id: &ReportId, expected_version: u64) -> ServiceResult<StoredReport> {
        let mut stored = self.reports.get_report(id).await?;
        if stored.is_finalized() {
            return Err(ServiceError::Finalized(id.clone()));
        }

        let resolver = self.templates.resolver().await?;
        let snapshot = snapshot_if_complete(&resolver, &stored.report)?;
        let deviations = snapshot.deviations.len();

        stored.status = ReportStatus::Finalized;
        stored.snapshot = Some(snapshot);
        let stored = self.reports.put_report(stored, expected_version).await?;
        tracing::info!(report = %id, version = stored.version, deviations, "finalized report");
        Ok(stored)
    }

    /// Reopen a finalized report as a new draft version
    ///
    /// The snapshot is discarded; deviations are renumbered from the
    /// current state on the next compile or finalize.
    ///
    /// # Errors
    /// [`ServiceError::NotFinalized`] on a draft, or a stale version
    pub async fn amend(&self, id: &ReportId, expected_version: u64) -> ServiceResult<StoredReport> {
        let mut stored = self.reports.get_report(id).await?;
        if !stored.is_finalized() {
            return Err(ServiceError::NotFinalized(id.clone()));
        }
        stored.status = ReportStatus::Draft;
        stored.snapshot = None;
        let stored = self.reports.put_report(stored, expected_version).await?;
        tracing::info!(report = %id, version = stored.version, "amended report");
        Ok(stored)
    }

    /// Compile one report for rendering
    ///
    /// # Errors
    /// Store, catalog or compile failures
    pub async fn compile(&self, id: &ReportId, header: &Value) -> ServiceResult<CompiledReport> {
        let stored = self.reports.get_report(id).await?;
        let compiler = self.compiler().await?;
        compile_stored(&compiler, &stored, header)
    }

    /// Recompile many reports in parallel
    ///
    /// Each report succeeds or fails on its own; results are in input
    /// order.
    ///
    /// # Errors
    /// Only catalog failures abort the whole batch
    pub async fn regenerate(
        &self,
        ids: &[ReportId],
        header: &Value,
    ) -> ServiceResult<Vec<(ReportId, ServiceResult<CompiledReport>)>> {
        let compiler = self.compiler().await?;
        let loaded = futures::future::join_all(ids.iter().map(|id| self.reports.get_report(id))).await;

        let header = header.clone();
        let ids = ids.to_vec();
        let results = tokio::task::spawn_blocking(move || {
            ids.into_par_iter()
                .zip(loaded.into_par_iter())
                .map(|(id, stored)| {
                    let result = stored
                        .map_err(ServiceError::from)
                        .and_then(|stored| compile_stored(&compiler, &stored, &header));
                    (id, result)
                })
                .collect::<Vec<_>>()
        })
        .await?;

        let failed = results.iter().filter(|(_, r)| r.is_err()).count();
        tracing::info!(reports = results.len(), failed, "regenerated reports");
        Ok(results)
    }

    async fn compiler(&self) -> ServiceResult<ReportCompiler> {
        let resolver: Arc<TemplateResolver> = self.templates.resolver().await?;
        Ok(ReportCompiler::new((*resolver).clone(), self.compile_options.clone()))
    }

    /// Refuse a write to a locked finalized report; with the lock off,
    /// reopen it as a draft so no snapshot outlives the content it froze
    fn open_for_write(&self, stored: &mut StoredReport) -> ServiceResult<()> {
        if !stored.is_finalized() {
            return Ok(());
        }
        if self.config.lock_finalized {
            return Err(ServiceError::Finalized(stored.report.id.clone()));
        }
        stored.status = ReportStatus::Draft;
        stored.snapshot = None;
        tracing::info!(report = %stored.report.id, "write reopened finalized report");
        Ok(())
    }
}

/// Snapshot of a report whose components are all complete
fn snapshot_if_complete(resolver: &TemplateResolver, report: &ServiceReport) -> ServiceResult<FinalizedSnapshot> {
    let id = &report.id;
    let resolved = resolve_components(resolver, report);
    let incomplete: Vec<IncompleteComponent> = resolved
        .iter()
        .filter_map(|r| {
            evaluate(r.template, r.component)
                .first_failure
                .map(|failure| IncompleteComponent {
                    position: r.position,
                    name: r.display_name(),
                    failure,
                })
        })
        .collect();
    if !incomplete.is_empty() {
        tracing::info!(report = %id, incomplete = incomplete.len(), "finalize refused");
        return Err(ServiceError::Incomplete {
            id: id.clone(),
            components: incomplete,
        });
    }

    Ok(FinalizedSnapshot {
        deviations: extract_deviations(&resolved),
        template_hashes: template_hashes(&resolved)?,
        finalized_at: chrono::Utc::now(),
    })
}

fn compile_stored(compiler: &ReportCompiler, stored: &StoredReport, header: &Value) -> ServiceResult<CompiledReport> {
    let Some(snapshot) = stored.snapshot.as_ref().filter(|_| stored.is_finalized()) else {
        return Ok(compiler.compile(&stored.report, header)?);
    };

    let resolved = resolve_components(compiler.resolver(), &stored.report);
    let current = template_hashes(&resolved)?;
    for (template, hash) in &snapshot.template_hashes {
        if current.get(template) != Some(hash) {
            tracing::warn!(
                report = %stored.report.id,
                template = %template,
                "template changed since finalize"
            );
        }
    }
    Ok(compiler.compile_with_deviations(&stored.report, header, snapshot.deviations.clone())?)
}

fn template_hashes(resolved: &[ResolvedComponent<'_>]) -> ServiceResult<BTreeMap<String, TemplateHash>> {
    let mut hashes = BTreeMap::new();
    for r in resolved {
        if !hashes.contains_key(&r.template.id) {
            hashes.insert(r.template.id.clone(), TemplateHash::compute(r.template)?);
        }
    }
    Ok(hashes)
}
