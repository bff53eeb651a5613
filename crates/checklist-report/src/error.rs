//! Error types for report compilation

/// Report compilation errors
///
/// Only captured money values can make compilation fail; every other
/// irregularity (unresolved templates, hidden items) is rendered.
#[derive(Debug, thiserror::Error)]
pub enum CompileError {
    /// Price, quantity or hours is not a usable number
    #[error("component {component}: invalid amount on line '{line}'")]
    InvalidAmount { component: usize, line: String },

    /// A total does not fit in the money range
    #[error("total overflows in {section}")]
    AmountOverflow { section: &'static str },
}

/// Result type alias for compilation
pub type CompileResult<T> = Result<T, CompileError>;
