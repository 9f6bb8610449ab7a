/// Integration, step and connection value model
pub mod integration;

/// Flow events
pub mod events;

/// Synchronous event bus
pub mod event_bus;

/// Cursor and sub-page model
pub mod cursor;

/// Collaborator interfaces
pub mod repository;

/// Confirmation prompts
pub mod confirmation;

/// Configured-property helpers
pub mod properties;
