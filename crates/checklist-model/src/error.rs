//! Error types for template loading and validation
//!
//! Template defects are authoring problems: they cannot be repaired per
//! captured instance, so they are collected and rejected at load time.

use std::fmt;
use std::path::PathBuf;

/// A single structural problem found in a template
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateDefect {
    /// Item id appears more than once in the tree
    DuplicateItemId(String),

    /// `showWhen.parentId` refers to an id that is not in the template
    UnknownShowWhenParent { item_id: String, parent_id: String },

    /// `group_selection` item without subpoints
    EmptyGroupSelection(String),

    /// Dropdown-family item without options
    MissingDropdownOptions(String),

    /// `hasDriftSchedule` set but no `driftScheduleConfig`
    MissingDriftScheduleConfig,

    /// `exclusiveGroup` on an item whose parent is not a `group_selection`
    OrphanExclusiveGroup { item_id: String, group: String },

    /// Two system fields share a name
    DuplicateSystemField(String),

    /// Blank item id
    BlankItemId,
}

impl fmt::Display for TemplateDefect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateItemId(id) => write!(f, "duplicate item id '{id}'"),
            Self::UnknownShowWhenParent { item_id, parent_id } => write!(
                f,
                "item '{item_id}' depends on unknown item '{parent_id}'"
            ),
            Self::EmptyGroupSelection(id) => {
                write!(f, "group selection '{id}' has no subpoints")
            }
            Self::MissingDropdownOptions(id) => {
                write!(f, "dropdown item '{id}' has no options")
            }
            Self::MissingDriftScheduleConfig => {
                write!(f, "drift schedule enabled without configuration")
            }
            Self::OrphanExclusiveGroup { item_id, group } => write!(
                f,
                "item '{item_id}' is in exclusive group '{group}' outside a group selection"
            ),
            Self::DuplicateSystemField(name) => write!(f, "duplicate system field '{name}'"),
            Self::BlankItemId => write!(f, "item with blank id"),
        }
    }
}

/// Errors while loading or validating a template
#[derive(Debug, thiserror::Error)]
pub enum TemplateError {
    /// Input type string not in the supported set
    #[error("unknown input type '{input_type}' on item '{item_id}'")]
    UnknownInputType { item_id: String, input_type: String },

    /// Template failed structural validation
    #[error("template '{template}' is invalid: {}", join_defects(.defects))]
    Invalid {
        template: String,
        defects: Vec<TemplateDefect>,
    },

    /// Template has neither id nor a name to derive one from
    #[error("template has no id and no name")]
    MissingIdentity,

    /// JSON syntax or shape error
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML syntax or shape error
    #[error("yaml error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Unsupported file extension
    #[error("unsupported template format: '{0}'")]
    UnsupportedFormat(String),

    /// IO error during file read
    #[error("io error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl TemplateError {
    /// Create IO error for path
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Defects carried by an `Invalid` error, empty otherwise
    #[must_use]
    pub fn defects(&self) -> &[TemplateDefect] {
        match self {
            Self::Invalid { defects, .. } => defects,
            _ => &[],
        }
    }
}

fn join_defects(defects: &[TemplateDefect]) -> String {
    defects
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Result type alias for template operations
pub type TemplateResult<T> = Result<T, TemplateError>;
