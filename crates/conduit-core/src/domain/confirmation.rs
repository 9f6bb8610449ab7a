//! Confirmation prompts
//!
//! A page asks the user to confirm a destructive action (deleting a step,
//! discarding edits). Missing data degrades gracefully elsewhere in the
//! core, but confirming a prompt that has no handler is a programming
//! error and is reported immediately.

use super::events::Callback;
use crate::CoreError;

/// A pending confirmation with an optional handler
#[derive(Debug, Clone)]
pub struct Confirmation {
    /// Prompt title
    pub title: String,
    /// Prompt body
    pub message: String,
    on_confirm: Option<Callback>,
    on_cancel: Option<Callback>,
}

impl Confirmation {
    /// New prompt without handlers
    pub fn new(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
            on_confirm: None,
            on_cancel: None,
        }
    }

    /// Attach the handler run on confirmation
    pub fn on_confirm<F>(mut self, f: F) -> Self
    where
        F: Fn(()) + Send + Sync + 'static,
    {
        self.on_confirm = Some(Callback::new(f));
        self
    }

    /// Attach the handler run on cancellation
    pub fn on_cancel<F>(mut self, f: F) -> Self
    where
        F: Fn(()) + Send + Sync + 'static,
    {
        self.on_cancel = Some(Callback::new(f));
        self
    }

    /// Run the confirmation handler; fails fast when none was attached
    pub fn confirm(&self) -> Result<(), CoreError> {
        let handler = self
            .on_confirm
            .as_ref()
            .ok_or_else(|| CoreError::MissingHandler(format!("confirm: {}", self.title)))?;
        handler.call(());
        Ok(())
    }

    /// Run the cancel handler, if any. Cancelling needs no handler.
    pub fn cancel(&self) {
        if let Some(handler) = &self.on_cancel {
            handler.call(());
        }
    }
}
