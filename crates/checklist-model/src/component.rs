//! Captured checklist instances and the reports that hold them

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use ulid::Ulid;

/// Status token captured by status-family items
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Ok,
    Avvik,
    Byttet,
    Rengjort,
}

impl Status {
    /// Wire token
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::Avvik => "avvik",
            Self::Byttet => "byttet",
            Self::Rengjort => "rengjort",
        }
    }

    /// Label used in rendered reports
    #[must_use]
    pub const fn display_label(self) -> &'static str {
        match self {
            Self::Ok => "OK",
            Self::Avvik => "Avvik",
            Self::Byttet => "Byttet",
            Self::Rengjort => "Rengjort",
        }
    }

    /// Statuses other than `ok` need a comment to be complete
    #[inline]
    #[must_use]
    pub const fn needs_comment(self) -> bool {
        !matches!(self, Self::Ok)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Status {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "ok" => Ok(Self::Ok),
            "avvik" => Ok(Self::Avvik),
            "byttet" => Ok(Self::Byttet),
            "rengjort" => Ok(Self::Rengjort),
            other => Err(other.to_string()),
        }
    }
}

/// Response of a status-family item
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub images: Vec<String>,
}

impl StatusResponse {
    /// Response with status and no comment
    #[must_use]
    pub fn new(status: Status) -> Self {
        Self {
            status: Some(status),
            comment: None,
            images: Vec::new(),
        }
    }

    /// With comment
    #[must_use]
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    /// With attached image urls
    #[must_use]
    pub fn with_images<I, S>(mut self, images: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.images = images.into_iter().map(Into::into).collect();
        self
    }

    /// Comment if it has visible content
    #[must_use]
    pub fn comment_text(&self) -> Option<&str> {
        self.comment.as_deref().filter(|c| !c.trim().is_empty())
    }
}

/// Captured value for one checklist item
///
/// The shape depends on the owning item's input type: status families
/// store an object, checkboxes a boolean, everything else a string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResponseValue {
    Status(StatusResponse),
    Flag(bool),
    Text(String),
}

impl ResponseValue {
    /// Status response helper
    #[must_use]
    pub fn status(status: Status) -> Self {
        Self::Status(StatusResponse::new(status))
    }

    /// Text response helper
    #[must_use]
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    /// String form compared against `showWhen.parentValue`
    #[must_use]
    pub fn comparable(&self) -> Option<String> {
        match self {
            Self::Status(s) => s.status.map(|st| st.as_str().to_string()),
            Self::Flag(b) => Some(b.to_string()),
            Self::Text(t) => Some(t.clone()),
        }
    }

    /// Non-blank text value
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(t) if !t.trim().is_empty() => Some(t),
            _ => None,
        }
    }

    /// Boolean value
    #[must_use]
    pub fn as_flag(&self) -> Option<bool> {
        match self {
            Self::Flag(b) => Some(*b),
            _ => None,
        }
    }

    /// Status response
    #[must_use]
    pub fn as_status(&self) -> Option<&StatusResponse> {
        match self {
            Self::Status(s) => Some(s),
            _ => None,
        }
    }

    /// Carries any captured content at all
    #[must_use]
    pub fn is_answered(&self) -> bool {
        match self {
            Self::Status(s) => s.status.is_some() || s.comment_text().is_some(),
            Self::Flag(_) => true,
            Self::Text(t) => !t.trim().is_empty(),
        }
    }

    /// Marks its item as chosen within an exclusive group
    ///
    /// Like [`is_answered`](Self::is_answered), except an unchecked
    /// checkbox is not a choice.
    #[must_use]
    pub fn is_selection(&self) -> bool {
        match self {
            Self::Flag(b) => *b,
            other => other.is_answered(),
        }
    }
}

/// Product line on a component
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub name: String,
    #[serde(default = "default_quantity")]
    pub quantity: f64,
    /// Unit price in kroner
    pub price: f64,
}

fn default_quantity() -> f64 {
    1.0
}

/// Additional work line on a component
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdditionalWork {
    pub description: String,
    pub hours: f64,
    /// Hourly rate in kroner
    pub price: f64,
}

/// Drift schedule values: day, then field
pub type DriftSchedule = BTreeMap<String, BTreeMap<String, String>>;

/// One filled checklist for one physical unit
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Component {
    /// Declared equipment/facility type, used for template resolution
    #[serde(default)]
    pub equipment_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default)]
    pub details: BTreeMap<String, String>,
    #[serde(default)]
    pub checklist: BTreeMap<String, ResponseValue>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub products: Vec<Product>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub additional_work: Vec<AdditionalWork>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub drift_schedule: DriftSchedule,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub images: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

impl Component {
    /// Empty component of the given equipment type
    #[must_use]
    pub fn new(equipment_type: impl Into<String>) -> Self {
        Self {
            equipment_type: equipment_type.into(),
            ..Self::default()
        }
    }

    /// With display name
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set a system field value
    #[must_use]
    pub fn with_detail(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.details.insert(name.into(), value.into());
        self
    }

    /// Set a checklist response
    #[must_use]
    pub fn with_response(mut self, item_id: impl Into<String>, value: ResponseValue) -> Self {
        self.checklist.insert(item_id.into(), value);
        self
    }

    /// Captured response for an item
    #[inline]
    #[must_use]
    pub fn response(&self, item_id: &str) -> Option<&ResponseValue> {
        self.checklist.get(item_id)
    }

    /// Non-blank system field value
    #[must_use]
    pub fn detail(&self, name: &str) -> Option<&str> {
        self.details
            .get(name)
            .map(String::as_str)
            .filter(|v| !v.trim().is_empty())
    }
}

/// Report identifier
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReportId(pub String);

impl ReportId {
    /// Generate a new sortable id
    #[must_use]
    pub fn generate() -> Self {
        Self(Ulid::new().to_string())
    }
}

impl fmt::Display for ReportId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ReportId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Photo attached to a report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Photo {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
}

/// Service report content as persisted: whole-document replace
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceReport {
    pub id: ReportId,
    #[serde(default)]
    pub components: Vec<Component>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overall_comment: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub photos: Vec<Photo>,
}

impl ServiceReport {
    /// Empty report
    #[must_use]
    pub fn new(id: impl Into<ReportId>) -> Self {
        Self {
            id: id.into(),
            components: Vec::new(),
            overall_comment: None,
            photos: Vec::new(),
        }
    }

    /// Append a component
    #[must_use]
    pub fn with_component(mut self, component: Component) -> Self {
        self.components.push(component);
        self
    }
}
