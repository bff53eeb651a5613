//! Content hashing of templates
//!
//! A [`TemplateHash`] pins the exact template a finalized report was
//! evaluated against, so later drift can be detected.

use crate::template::ChecklistTemplate;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

/// Blake3 hash of a template's canonical JSON, hex-encoded
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TemplateHash(String);

impl TemplateHash {
    /// Hash a normalised template
    ///
    /// # Errors
    /// Returns error if the template cannot be serialised
    pub fn compute(template: &ChecklistTemplate) -> Result<Self, serde_json::Error> {
        let json = serde_json::to_vec(template)?;
        Ok(Self(hex::encode(blake3::hash(&json).as_bytes())))
    }

    /// Short string representation (first 16 hex chars)
    #[inline]
    #[must_use]
    pub fn short(&self) -> &str {
        &self.0[..self.0.len().min(16)]
    }

    /// Full hex string
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for TemplateHash {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
