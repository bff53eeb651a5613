//! Template cache using moka
//!
//! Wraps any [`TemplateStore`] with a bounded, TTL-expiring cache owned by
//! the caller. Templates are validated when loaded, so a defective
//! template is rejected once at the boundary and never cached.

use crate::config::ServiceConfig;
use crate::error::{StoreError, StoreResult};
use crate::store::TemplateStore;
use checklist_engine::TemplateResolver;
use checklist_model::{template_key, validate_template, ChecklistTemplate};
use moka::future::Cache;
use std::sync::Arc;

/// Statistics for cache monitoring
#[derive(Debug, Clone, Copy, Default)]
pub struct CacheStats {
    /// Cached templates
    pub template_count: u64,
    /// Whether a resolver over the full catalog is cached
    pub resolver_cached: bool,
}

/// Validated-template cache in front of a [`TemplateStore`]
#[derive(Clone)]
pub struct TemplateCache {
    store: Arc<dyn TemplateStore>,
    templates: Cache<String, Arc<ChecklistTemplate>>,
    resolver: Cache<(), Arc<TemplateResolver>>,
}

impl std::fmt::Debug for TemplateCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TemplateCache")
            .field("templates", &self.templates.entry_count())
            .finish_non_exhaustive()
    }
}

impl TemplateCache {
    /// Cache sized and timed by `config`
    #[must_use]
    pub fn new(store: Arc<dyn TemplateStore>, config: &ServiceConfig) -> Self {
        Self {
            store,
            templates: Cache::builder()
                .max_capacity(config.cache_capacity)
                .time_to_live(config.cache_ttl())
                .build(),
            resolver: Cache::builder().max_capacity(1).time_to_live(config.cache_ttl()).build(),
        }
    }

    /// Template by id, loading and validating on a miss
    ///
    /// # Errors
    /// Store failures, or [`StoreError::Template`] when the stored
    /// template is structurally invalid
    pub async fn get(&self, id: &str) -> StoreResult<Option<Arc<ChecklistTemplate>>> {
        let key = template_key(id);
        if let Some(hit) = self.templates.get(&key).await {
            return Ok(Some(hit));
        }

        tracing::debug!(template = %key, "template cache miss");
        let Some(template) = self.store.get_template(&key).await? else {
            return Ok(None);
        };
        if let Err(e) = validate_template(&template) {
            tracing::warn!(template = %key, error = %e, "rejected stored template");
            return Err(StoreError::Template(e));
        }
        let template = Arc::new(template);
        self.templates.insert(key, Arc::clone(&template)).await;
        Ok(Some(template))
    }

    /// Resolver over the whole catalog, built once per TTL
    ///
    /// # Errors
    /// Store failures, or an invalid/duplicate template in the catalog
    pub async fn resolver(&self) -> StoreResult<Arc<TemplateResolver>> {
        if let Some(hit) = self.resolver.get(&()).await {
            return Ok(hit);
        }

        tracing::debug!("template catalog cache miss");
        let templates = self.store.list_templates().await?;
        let resolver = TemplateResolver::new(templates).map_err(|e| {
            tracing::warn!(error = %e, "rejected template catalog");
            match e {
                checklist_engine::EngineError::InvalidTemplate(inner) => StoreError::Template(inner),
                other => StoreError::Backend(other.to_string()),
            }
        })?;
        let resolver = Arc::new(resolver);
        self.resolver.insert((), Arc::clone(&resolver)).await;
        Ok(resolver)
    }

    /// Drop one template and the catalog resolver
    pub async fn invalidate(&self, id: &str) {
        self.templates.invalidate(&template_key(id)).await;
        self.resolver.invalidate(&()).await;
    }

    /// Drop everything
    pub fn invalidate_all(&self) {
        self.templates.invalidate_all();
        self.resolver.invalidate_all();
    }

    /// Get cache statistics
    #[must_use]
    pub async fn stats(&self) -> CacheStats {
        CacheStats {
            template_count: self.templates.entry_count(),
            resolver_cached: self.resolver.get(&()).await.is_some(),
        }
    }
}
