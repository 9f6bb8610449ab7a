//! Flow cursor: which step and which sub-page the user is editing

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::CoreError;

/// Sub-page of a position in the editor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FlowPage {
    /// Pick a connection for an endpoint step
    ConnectionSelect,
    /// Pick an action of the chosen connection
    ActionSelect,
    /// Fill in the action's properties
    ActionConfigure,
    /// Pick a processing step kind
    StepSelect,
    /// Fill in the processing step's properties
    StepConfigure,
    /// Describe input or output data shapes
    DescribeData,
    /// Overview: save, or add another step
    SaveOrAddStep,
}

impl FlowPage {
    /// Route segment for the page
    pub fn as_str(&self) -> &'static str {
        match self {
            FlowPage::ConnectionSelect => "connection-select",
            FlowPage::ActionSelect => "action-select",
            FlowPage::ActionConfigure => "action-configure",
            FlowPage::StepSelect => "step-select",
            FlowPage::StepConfigure => "step-configure",
            FlowPage::DescribeData => "describe-data",
            FlowPage::SaveOrAddStep => "save-or-add-step",
        }
    }

    /// Whether the page is the entry page of a position (nothing to go back to)
    pub fn is_first_of_position(&self) -> bool {
        matches!(
            self,
            FlowPage::ConnectionSelect | FlowPage::StepSelect | FlowPage::SaveOrAddStep
        )
    }

    /// The page the back button leads to
    pub fn previous(&self) -> Option<FlowPage> {
        match self {
            FlowPage::ActionSelect => Some(FlowPage::ConnectionSelect),
            FlowPage::ActionConfigure => Some(FlowPage::ActionSelect),
            FlowPage::DescribeData => Some(FlowPage::ActionConfigure),
            FlowPage::StepConfigure => Some(FlowPage::StepSelect),
            FlowPage::ConnectionSelect | FlowPage::StepSelect | FlowPage::SaveOrAddStep => None,
        }
    }
}

impl fmt::Display for FlowPage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FlowPage {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "connection-select" => Ok(FlowPage::ConnectionSelect),
            "action-select" => Ok(FlowPage::ActionSelect),
            "action-configure" => Ok(FlowPage::ActionConfigure),
            "step-select" => Ok(FlowPage::StepSelect),
            "step-configure" => Ok(FlowPage::StepConfigure),
            "describe-data" => Ok(FlowPage::DescribeData),
            "save-or-add-step" => Ok(FlowPage::SaveOrAddStep),
            other => Err(CoreError::ValidationError(format!("Unknown flow page: {}", other))),
        }
    }
}

/// Transient cursor state, never persisted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowCursor {
    /// Position of the step being edited
    pub current_position: usize,
    /// Sub-page within that position
    pub current_state: FlowPage,
}

impl Default for FlowCursor {
    fn default() -> Self {
        Self {
            current_position: 0,
            current_state: FlowPage::SaveOrAddStep,
        }
    }
}

impl FlowCursor {
    /// Cursor at `position` on `page`
    pub fn new(position: usize, page: FlowPage) -> Self {
        Self {
            current_position: position,
            current_state: page,
        }
    }

    /// Route segments for the cursor: `[page, position]`
    pub fn route_segments(&self) -> Vec<String> {
        vec![
            self.current_state.as_str().to_string(),
            self.current_position.to_string(),
        ]
    }

    /// Parse `[page, position, ..]` route segments; trailing segments are ignored
    pub fn parse_route<S: AsRef<str>>(segments: &[S]) -> Result<Self, CoreError> {
        let page = segments
            .first()
            .ok_or_else(|| CoreError::ValidationError("Missing page segment".to_string()))?
            .as_ref()
            .parse::<FlowPage>()?;
        let position = segments
            .get(1)
            .ok_or_else(|| CoreError::ValidationError("Missing position segment".to_string()))?
            .as_ref();
        let position = position.parse::<usize>().map_err(|_| {
            CoreError::ValidationError(format!("Invalid position segment: {}", position))
        })?;
        Ok(Self::new(position, page))
    }
}
