//! Flows and flow versions

use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

use crate::table::TableRow;

use super::step::Action;
use super::step::Trigger;

/// Whether a flow reacts to its trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FlowStatus {
    Enabled,
    Disabled,
}

impl FlowStatus {
    /// The opposite status.
    pub fn toggled(self) -> Self {
        match self {
            Self::Enabled => Self::Disabled,
            Self::Disabled => Self::Enabled,
        }
    }

    pub fn is_enabled(self) -> bool {
        self == Self::Enabled
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Enabled => "Enabled",
            Self::Disabled => "Disabled",
        }
    }

    /// Wire name used in queries and request bodies.
    pub fn as_wire(self) -> &'static str {
        match self {
            Self::Enabled => "ENABLED",
            Self::Disabled => "DISABLED",
        }
    }
}

impl std::str::FromStr for FlowStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "enabled" | "enable" | "on" => Ok(Self::Enabled),
            "disabled" | "disable" | "off" => Ok(Self::Disabled),
            other => Err(format!("unknown flow status '{}'", other)),
        }
    }
}

/// Editing state of a flow version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FlowVersionState {
    /// Published; no longer editable.
    Locked,
    /// Work in progress.
    Draft,
}

/// One version of a flow: its name and step chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowVersion {
    pub id: String,
    pub flow_id: String,
    pub display_name: String,
    #[serde(default)]
    pub valid: bool,
    pub state: FlowVersionState,
    #[serde(default)]
    pub trigger: Option<Trigger>,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
}

impl FlowVersion {
    /// All actions reachable from the trigger, depth first.
    pub fn actions(&self) -> Vec<&Action> {
        let mut out = Vec::new();
        if let Some(first) = self.trigger.as_ref().and_then(|t| t.next_action.as_deref()) {
            collect_actions(first, &mut out);
        }
        out
    }

    /// Distinct piece names used by the trigger and actions, in step order.
    pub fn piece_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        let trigger_piece = self.trigger.as_ref().and_then(Trigger::piece_name);
        let action_pieces = self.actions().into_iter().filter_map(Action::piece_name);

        for name in trigger_piece.into_iter().chain(action_pieces) {
            if !names.contains(&name) {
                names.push(name);
            }
        }
        names
    }

    /// Find an action by its step name.
    pub fn action(&self, name: &str) -> Option<&Action> {
        self.actions().into_iter().find(|action| action.name() == name)
    }
}

fn collect_actions<'a>(action: &'a Action, out: &mut Vec<&'a Action>) {
    let mut current = Some(action);
    while let Some(action) = current {
        out.push(action);
        for child in action.children() {
            collect_actions(child, out);
        }
        current = action.next_action();
    }
}

/// A flow together with the version shown in listings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PopulatedFlow {
    pub id: String,
    pub project_id: String,
    #[serde(default)]
    pub folder_id: Option<String>,
    pub status: FlowStatus,
    #[serde(default)]
    pub published_version_id: Option<String>,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
    pub version: FlowVersion,
}

impl PopulatedFlow {
    /// Display name of the listed version.
    pub fn display_name(&self) -> &str {
        &self.version.display_name
    }
}

impl TableRow for PopulatedFlow {
    type Key = String;

    fn key(&self) -> String {
        self.id.clone()
    }
}
