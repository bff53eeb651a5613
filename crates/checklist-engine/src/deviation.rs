//! Deviation (avvik) extraction and numbering
//!
//! Numbering is a pure function of the ordered components, their
//! templates and the captured responses. Traversal always follows the
//! template tree in authored order; the response map is only used for
//! lookup, so its key order never leaks into the numbering.

use crate::resolver::{ResolutionWarning, TemplateResolver};
use checklist_model::{ChecklistTemplate, Component, ResponseValue, ServiceReport, Status};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Formatter};
use std::str::FromStr;

/// Sequential deviation number, rendered zero-padded to width 3
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DeviationId(u32);

impl DeviationId {
    /// First id of a report
    pub const FIRST: DeviationId = DeviationId(1);

    /// Id for a 1-based position
    #[inline]
    #[must_use]
    pub const fn new(number: u32) -> Self {
        Self(number)
    }

    /// Numeric value
    #[inline]
    #[must_use]
    pub const fn number(self) -> u32 {
        self.0
    }

    #[inline]
    fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }
}

impl fmt::Display for DeviationId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{:03}", self.0)
    }
}

impl FromStr for DeviationId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().parse::<u32>() {
            Ok(n) if n > 0 => Ok(Self(n)),
            _ => Err(format!("invalid deviation id '{s}'")),
        }
    }
}

impl Serialize for DeviationId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for DeviationId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        struct DeviationIdVisitor;

        impl serde::de::Visitor<'_> for DeviationIdVisitor {
            type Value = DeviationId;

            fn expecting(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
                formatter.write_str("a deviation number such as \"001\"")
            }

            fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                value.parse().map_err(E::custom)
            }

            fn visit_u64<E>(self, value: u64) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                u32::try_from(value)
                    .ok()
                    .filter(|n| *n > 0)
                    .map(DeviationId)
                    .ok_or_else(|| E::custom(format!("invalid deviation id {value}")))
            }
        }

        deserializer.deserialize_any(DeviationIdVisitor)
    }
}

/// One numbered nonconformity in a report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Deviation {
    pub id: DeviationId,
    pub component_name: String,
    pub checkpoint_label: String,
    /// The operator's comment on the avvik response
    pub description: String,
    #[serde(default)]
    pub images: Vec<String>,
    /// 0-based position of the component in its report
    pub component_index: usize,
    pub item_id: String,
}

/// A component paired with the template that evaluates it
#[derive(Debug, Clone)]
pub struct ResolvedComponent<'a> {
    /// 0-based position in the report
    pub position: usize,
    pub component: &'a Component,
    pub template: &'a ChecklistTemplate,
    pub warning: Option<ResolutionWarning>,
}

impl ResolvedComponent<'_> {
    /// Name shown in reports
    ///
    /// The component's own name, else the first filled system field in
    /// template order, else `Komponent {n}`.
    #[must_use]
    pub fn display_name(&self) -> String {
        self.component
            .name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .or_else(|| {
                self.template
                    .ordered_fields()
                    .into_iter()
                    .find_map(|f| self.component.detail(&f.name).map(str::trim))
            })
            .map_or_else(|| format!("Komponent {}", self.position + 1), ToString::to_string)
    }
}

/// Resolve the template of every component of a report, in order
#[must_use]
pub fn resolve_components<'a>(resolver: &'a TemplateResolver, report: &'a ServiceReport) -> Vec<ResolvedComponent<'a>> {
    report
        .components
        .iter()
        .enumerate()
        .map(|(position, component)| {
            let resolution = resolver.resolve(&component.equipment_type, component.name.as_deref());
            ResolvedComponent {
                position,
                component,
                template: resolution.template,
                warning: resolution.warning,
            }
        })
        .collect()
}

/// Extract and number every deviation, in one running sequence
#[must_use]
pub fn extract_deviations(components: &[ResolvedComponent<'_>]) -> Vec<Deviation> {
    let mut next = DeviationId::FIRST;
    let mut out = Vec::new();
    for resolved in components {
        let component_name = resolved.display_name();
        for item in resolved.template.traverse() {
            let Some(ResponseValue::Status(response)) = resolved.component.response(&item.id) else {
                continue;
            };
            if response.status != Some(Status::Avvik) {
                continue;
            }
            let Some(comment) = response.comment_text() else {
                continue;
            };
            out.push(Deviation {
                id: next,
                component_name: component_name.clone(),
                checkpoint_label: item.label.clone(),
                description: comment.trim().to_string(),
                images: response.images.clone(),
                component_index: resolved.position,
                item_id: item.id.clone(),
            });
            next = next.next();
        }
    }
    tracing::debug!(count = out.len(), "extracted deviations");
    out
}

/// Resolve and extract in one step
#[must_use]
pub fn extract_report_deviations(resolver: &TemplateResolver, report: &ServiceReport) -> Vec<Deviation> {
    extract_deviations(&resolve_components(resolver, report))
}
