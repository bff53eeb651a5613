//! Error types for the checklist engine
//!
//! Evaluation itself never fails: resolution misses, legacy shapes and
//! incomplete components are reported as values. Errors here are limited
//! to building the engine from defective template sets.

use checklist_model::TemplateError;

/// Engine construction errors
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// A template failed structural validation
    #[error("invalid template: {0}")]
    InvalidTemplate(#[from] TemplateError),

    /// Two templates share an id (case-insensitive)
    #[error("duplicate template id: '{0}'")]
    DuplicateTemplateId(String),
}

/// Result type alias for engine operations
pub type EngineResult<T> = Result<T, EngineError>;
