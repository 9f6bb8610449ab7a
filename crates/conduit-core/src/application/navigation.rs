//! Navigation policy
//!
//! Derived purely from the current document and a cursor. Nothing here
//! mutates the store except [`CurrentFlow::goto`], which emits a
//! `integration-navigate` event once the current step is complete.

use tracing::debug;

use super::current_flow::CurrentFlow;
use crate::domain::cursor::{FlowCursor, FlowPage};
use crate::domain::events::FlowEvent;
use crate::domain::integration::DataShapeKind;

/// What the data flowing into a step asks of the user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataShapeAdvice {
    /// Nothing to do
    Compatible,
    /// The producing step emits `ANY` and should describe its output
    DescribePreviousOutput,
    /// Input and incoming output differ; a data mapper belongs in front of the step
    AddDataMapper,
}

impl CurrentFlow {
    /// False while the step under the cursor is absent or incomplete
    pub fn can_continue(&self, cursor: &FlowCursor) -> bool {
        self.get_step(cursor.current_position)
            .map_or(false, |step| step.is_complete())
    }

    /// Hidden on the entry page of a position
    pub fn show_back(&self, cursor: &FlowCursor) -> bool {
        !cursor.current_state.is_first_of_position()
    }

    /// At the finish position with a complete finish step
    pub fn show_finish(&self, cursor: &FlowCursor) -> bool {
        self.get_last_position() == Some(cursor.current_position) && self.can_continue(cursor)
    }

    /// Shown whenever finish is not
    pub fn show_next(&self, cursor: &FlowCursor) -> bool {
        !self.show_finish(cursor)
    }

    /// `"start"`, `"end"` or empty; labels only
    pub fn position_text(&self, position: usize) -> &'static str {
        if self.get_first_position() == Some(position) {
            "start"
        } else if self.get_last_position() == Some(position) {
            "end"
        } else {
            ""
        }
    }

    /// Label for the step at `position` in the flow overview
    pub fn step_text(&self, position: usize) -> String {
        let Some(step) = self.get_step(position) else {
            return "Set up this step".to_string();
        };
        let prefix = format!("Step {} - ", position + 1);

        if step.is_endpoint() {
            if let Some(name) = step.action.as_ref().and_then(|a| a.name.as_deref()) {
                return format!("{}{}", prefix, name);
            }
            if let Some(connection) = &step.connection {
                return format!("{}{}", prefix, connection.name.as_deref().unwrap_or_default());
            }
            if position == 0 {
                return format!("{}Start", prefix);
            }
            if self.get_last_position() == Some(position) {
                return format!("{}Finish", prefix);
            }
            return "Set up this connection".to_string();
        }

        match &step.name {
            Some(name) => format!("{}{}", prefix, name),
            None => "Set up this step".to_string(),
        }
    }

    /// Compare the input shape at `position` with the output of the nearest
    /// producing step before it. The start step never needs advice.
    pub fn data_shape_advice(&self, position: usize) -> DataShapeAdvice {
        if self.get_first_position() == Some(position) {
            return DataShapeAdvice::Compatible;
        }
        let Some(input) = self
            .get_step(position)
            .and_then(|step| step.data_shape(true).cloned())
        else {
            return DataShapeAdvice::Compatible;
        };
        if matches!(input.kind, Some(DataShapeKind::Any | DataShapeKind::None)) {
            return DataShapeAdvice::Compatible;
        }
        let Some(previous) = self.get_previous_step_with_data_shape(position) else {
            return DataShapeAdvice::Compatible;
        };
        let Some(output) = previous.data_shape(false) else {
            return DataShapeAdvice::Compatible;
        };

        if output.kind == Some(DataShapeKind::Any) {
            DataShapeAdvice::DescribePreviousOutput
        } else if !input.same_shape(output) {
            DataShapeAdvice::AddDataMapper
        } else {
            DataShapeAdvice::Compatible
        }
    }

    /// True when a data mapper should be inserted before `position`
    pub fn needs_data_mapper(&self, position: usize) -> bool {
        self.data_shape_advice(position) == DataShapeAdvice::AddDataMapper
    }

    /// Move the cursor to `page` at `position`.
    ///
    /// Refused while the step under the current cursor exists but is
    /// incomplete. An absent step (the overview page) never blocks.
    pub fn goto(&self, page: FlowPage, position: usize) -> bool {
        let cursor = self.cursor();
        if let Some(step) = self.get_step(cursor.current_position) {
            if !step.is_complete() {
                debug!(
                    from = cursor.current_position,
                    to = position,
                    page = %page,
                    "Navigation refused, current step is incomplete"
                );
                return false;
            }
        }
        self.emit(FlowEvent::navigate(position, page));
        true
    }
}
