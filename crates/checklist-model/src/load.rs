//! Template ingress from JSON and YAML sources
//!
//! Every loader normalises legacy item shapes and validates the result
//! before handing a template out.

use crate::error::{TemplateError, TemplateResult};
use crate::template::ChecklistTemplate;
use crate::validation::validate_template;
use std::path::Path;

/// Source format of a template document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateFormat {
    Json,
    Yaml,
}

impl TemplateFormat {
    /// Detect format from a file extension
    ///
    /// # Errors
    /// Returns [`TemplateError::UnsupportedFormat`] for unknown extensions
    pub fn from_path(path: &Path) -> TemplateResult<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase)
            .unwrap_or_default();
        match ext.as_str() {
            "json" => Ok(Self::Json),
            "yaml" | "yml" => Ok(Self::Yaml),
            _ => Err(TemplateError::UnsupportedFormat(ext)),
        }
    }

    /// Supported file extensions (without dot)
    #[must_use]
    pub const fn extensions() -> &'static [&'static str] {
        &["json", "yaml", "yml"]
    }
}

/// Parse and validate a single template
///
/// # Errors
/// Returns parse errors or validation defects
pub fn parse_template(content: &str, format: TemplateFormat) -> TemplateResult<ChecklistTemplate> {
    let template: ChecklistTemplate = match format {
        TemplateFormat::Json => serde_json::from_str(content)?,
        TemplateFormat::Yaml => serde_yaml::from_str(content)?,
    };
    validate_template(&template)?;
    Ok(template)
}

/// Parse and validate a list of templates (a template catalog document)
///
/// # Errors
/// Fails on the first template that does not parse or validate
pub fn parse_catalog(content: &str, format: TemplateFormat) -> TemplateResult<Vec<ChecklistTemplate>> {
    let templates: Vec<ChecklistTemplate> = match format {
        TemplateFormat::Json => serde_json::from_str(content)?,
        TemplateFormat::Yaml => serde_yaml::from_str(content)?,
    };
    for template in &templates {
        validate_template(template)?;
    }
    Ok(templates)
}

/// Load a template file, format chosen by extension
///
/// # Errors
/// Returns IO, format, parse or validation errors
pub fn load_template_file(path: &Path) -> TemplateResult<ChecklistTemplate> {
    let format = TemplateFormat::from_path(path)?;
    let content = std::fs::read_to_string(path).map_err(|e| TemplateError::io_error(path, e))?;
    parse_template(&content, format)
}

/// Load every template file in a directory, sorted by file name
///
/// Files with unsupported extensions are skipped.
///
/// # Errors
/// Returns the first IO, parse or validation error
pub fn load_template_dir(dir: &Path) -> TemplateResult<Vec<ChecklistTemplate>> {
    let entries = std::fs::read_dir(dir).map_err(|e| TemplateError::io_error(dir, e))?;
    let mut paths = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| TemplateError::io_error(dir, e))?.path();
        if path.is_file() && TemplateFormat::from_path(&path).is_ok() {
            paths.push(path);
        }
    }
    paths.sort();
    paths.iter().map(|p| load_template_file(p)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::InputType;

    #[test]
    fn yaml_and_json_agree() {
        let json = r#"{"name": "Pumpe", "checklistItems": [{"id": "p1", "label": "Lager", "required": true}]}"#;
        let yaml = "name: Pumpe\nchecklistItems:\n  - id: p1\n    label: Lager\n    required: true\n";
        let a = parse_template(json, TemplateFormat::Json).unwrap();
        let b = parse_template(yaml, TemplateFormat::Yaml).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.checklist_items[0].input_type, InputType::OkAvvik);
    }

    #[test]
    fn invalid_template_is_rejected_at_load() {
        let json = r#"{"name": "X", "checklistItems": [{"id": "a"}, {"id": "a"}]}"#;
        let err = parse_template(json, TemplateFormat::Json).unwrap_err();
        assert!(matches!(err, TemplateError::Invalid { .. }));
    }

    #[test]
    fn format_from_extension() {
        assert_eq!(TemplateFormat::from_path(Path::new("a.JSON")).unwrap(), TemplateFormat::Json);
        assert_eq!(TemplateFormat::from_path(Path::new("a.yml")).unwrap(), TemplateFormat::Yaml);
        assert!(TemplateFormat::from_path(Path::new("a.toml")).is_err());
    }
}
