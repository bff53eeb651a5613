//! Compilation options

use serde::{Deserialize, Serialize};

/// Options for [`ReportCompiler`](crate::ReportCompiler)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct CompileOptions {
    /// Currency label placed beside amounts
    pub currency: String,
    /// Include the report photo gallery
    pub include_gallery: bool,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            currency: "kr".to_string(),
            include_gallery: true,
        }
    }
}

impl CompileOptions {
    /// Set the currency label
    #[inline]
    #[must_use]
    pub fn with_currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = currency.into();
        self
    }

    /// Leave the photo gallery out
    #[inline]
    #[must_use]
    pub fn without_gallery(mut self) -> Self {
        self.include_gallery = false;
        self
    }
}
