//! Test implementations (fakes) of the collaborator interfaces.
//!
//! Unlike the mocks, these carry behaviour: failing on demand, holding a
//! save until the test releases it, or recording what the bus delivered.

pub mod event_recorder;
pub mod failing_repository;
pub mod gated_repository;

pub use event_recorder::EventRecorder;
pub use failing_repository::FailingRepository;
pub use gated_repository::GatedRepository;
