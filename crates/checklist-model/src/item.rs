//! Checklist tree nodes
//!
//! Items are read through a lenient raw shape and normalised once, so
//! every consumer sees a closed [`InputType`] and a non-empty label.

use crate::error::TemplateError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Control type of a checklist item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputType {
    /// OK / avvik status with optional comment
    #[default]
    OkAvvik,
    /// OK / byttet / avvik status with optional comment
    OkByttetAvvik,
    /// Numeric measurement
    Numeric,
    /// Temperature in degrees Celsius
    Temperature,
    /// Efficiency in percent
    Virkningsgrad,
    /// Single line of text
    Text,
    /// Multi-line text
    Textarea,
    /// Free comment
    Comment,
    /// Boolean toggle, may gate its subpoints
    Checkbox,
    /// Radio-style choice among subpoints
    GroupSelection,
    /// One of a fixed option set
    SwitchSelect,
    /// One of a fixed option set, rendered as a dropdown
    Dropdown,
}

impl InputType {
    /// All input types, in declaration order
    pub const ALL: [InputType; 12] = [
        Self::OkAvvik,
        Self::OkByttetAvvik,
        Self::Numeric,
        Self::Temperature,
        Self::Virkningsgrad,
        Self::Text,
        Self::Textarea,
        Self::Comment,
        Self::Checkbox,
        Self::GroupSelection,
        Self::SwitchSelect,
        Self::Dropdown,
    ];

    /// Wire name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::OkAvvik => "ok_avvik",
            Self::OkByttetAvvik => "ok_byttet_avvik",
            Self::Numeric => "numeric",
            Self::Temperature => "temperature",
            Self::Virkningsgrad => "virkningsgrad",
            Self::Text => "text",
            Self::Textarea => "textarea",
            Self::Comment => "comment",
            Self::Checkbox => "checkbox",
            Self::GroupSelection => "group_selection",
            Self::SwitchSelect => "switch_select",
            Self::Dropdown => "dropdown",
        }
    }

    /// Captures a status token (`ok`, `avvik`, ...)
    #[inline]
    #[must_use]
    pub const fn is_status(self) -> bool {
        matches!(self, Self::OkAvvik | Self::OkByttetAvvik)
    }

    /// Captures a raw string
    #[inline]
    #[must_use]
    pub const fn is_scalar(self) -> bool {
        matches!(
            self,
            Self::Numeric
                | Self::Temperature
                | Self::Virkningsgrad
                | Self::Text
                | Self::Textarea
                | Self::Comment
        )
    }

    /// Takes its value from `dropdownOptions`
    #[inline]
    #[must_use]
    pub const fn is_dropdown_family(self) -> bool {
        matches!(self, Self::SwitchSelect | Self::Dropdown)
    }
}

impl fmt::Display for InputType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InputType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| s.to_string())
    }
}

/// Conditional visibility rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShowWhen {
    /// Item whose captured value is inspected
    pub parent_id: String,
    /// Value that makes the dependent item visible
    pub parent_value: String,
}

/// A node in the checklist tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "RawChecklistItem")]
pub struct ChecklistItem {
    pub id: String,
    pub label: String,
    pub order: i32,
    pub input_type: InputType,
    pub required: bool,
    pub has_subpoints: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub subpoints: Vec<ChecklistItem>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dropdown_options: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclusive_group: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_when: Option<ShowWhen>,
}

impl ChecklistItem {
    /// Create a leaf item
    #[must_use]
    pub fn new(id: impl Into<String>, label: impl Into<String>, input_type: InputType) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            order: 0,
            input_type,
            required: false,
            has_subpoints: false,
            subpoints: Vec::new(),
            dropdown_options: Vec::new(),
            exclusive_group: None,
            show_when: None,
        }
    }

    /// Mark as required
    #[inline]
    #[must_use]
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// With sibling order
    #[inline]
    #[must_use]
    pub fn with_order(mut self, order: i32) -> Self {
        self.order = order;
        self
    }

    /// With subpoints
    #[must_use]
    pub fn with_subpoints(mut self, subpoints: Vec<ChecklistItem>) -> Self {
        self.has_subpoints = true;
        self.subpoints = subpoints;
        self
    }

    /// With dropdown options
    #[must_use]
    pub fn with_options<I, S>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dropdown_options = options.into_iter().map(Into::into).collect();
        self
    }

    /// Member of an exclusive group
    #[must_use]
    pub fn in_group(mut self, group: impl Into<String>) -> Self {
        self.exclusive_group = Some(group.into());
        self
    }

    /// Visible only when `parent_id` captured `parent_value`
    #[must_use]
    pub fn show_when(mut self, parent_id: impl Into<String>, parent_value: impl Into<String>) -> Self {
        self.show_when = Some(ShowWhen {
            parent_id: parent_id.into(),
            parent_value: parent_value.into(),
        });
        self
    }

    /// Subpoints that take part in traversal, in authored order
    #[must_use]
    pub fn children(&self) -> Vec<&ChecklistItem> {
        if self.has_subpoints {
            in_order(&self.subpoints)
        } else {
            Vec::new()
        }
    }

    /// Find a direct subpoint by id
    #[must_use]
    pub fn subpoint(&self, id: &str) -> Option<&ChecklistItem> {
        self.subpoints.iter().find(|s| s.id == id)
    }
}

/// Siblings sorted by `order`, ties kept in authored position
#[must_use]
pub fn in_order(items: &[ChecklistItem]) -> Vec<&ChecklistItem> {
    let mut sorted: Vec<&ChecklistItem> = items.iter().collect();
    sorted.sort_by_key(|item| item.order);
    sorted
}

/// Placeholder label for items that have neither `label` nor `text`
#[must_use]
pub fn placeholder_label(id: &str) -> String {
    format!("Sjekkpunkt {id}")
}

/// Item shape as found in stored templates, including legacy fields
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawChecklistItem {
    id: String,
    #[serde(default)]
    label: Option<String>,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    order: Option<i32>,
    #[serde(default)]
    input_type: Option<String>,
    #[serde(default)]
    required: Option<bool>,
    #[serde(default)]
    has_subpoints: Option<bool>,
    #[serde(default)]
    subpoints: Vec<RawChecklistItem>,
    #[serde(default)]
    dropdown_options: Vec<String>,
    #[serde(default)]
    exclusive_group: Option<String>,
    #[serde(default)]
    show_when: Option<ShowWhen>,
}

impl TryFrom<RawChecklistItem> for ChecklistItem {
    type Error = TemplateError;

    fn try_from(raw: RawChecklistItem) -> Result<Self, Self::Error> {
        let input_type = match raw.input_type.as_deref().map(str::trim) {
            None | Some("") => InputType::default(),
            Some(name) => name.parse().map_err(|input_type| TemplateError::UnknownInputType {
                item_id: raw.id.clone(),
                input_type,
            })?,
        };

        let label = [raw.label, raw.text]
            .into_iter()
            .flatten()
            .find(|l| !l.trim().is_empty())
            .unwrap_or_else(|| placeholder_label(&raw.id));

        let mut subpoints = raw
            .subpoints
            .into_iter()
            .map(ChecklistItem::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        subpoints.sort_by_key(|s| s.order);

        let has_subpoints = raw.has_subpoints.unwrap_or(!subpoints.is_empty());

        Ok(Self {
            id: raw.id,
            label,
            order: raw.order.unwrap_or(0),
            input_type,
            required: raw.required.unwrap_or(false),
            has_subpoints,
            subpoints,
            dropdown_options: raw.dropdown_options,
            exclusive_group: raw.exclusive_group.filter(|g| !g.trim().is_empty()),
            show_when: raw.show_when,
        })
    }
}
