//! Headless dashboard session: parameter store, fetch orchestration, display
//! slots, debounced search, and the upload completion hook.
//!
//! A [`Dashboard`] may be shared across tasks. Each action updates the
//! parameter store, takes an immutable snapshot, and dispatches the matching
//! refresh; panels always end up showing data for the latest snapshot.
//! Renderers follow along through the [`EventBus`] and read slot contents
//! with [`Dashboard::slots`].

pub mod dashboard;
pub mod error;
pub mod events;
pub mod orchestrator;
pub mod search;
pub mod slots;
pub mod upload;

pub use dashboard::{Dashboard, DashboardSettings, UploadOutcome};
pub use error::DashboardError;
pub use events::{DashboardEvent, EventBus, Notification, NotificationLevel};
pub use orchestrator::{FetchOrchestrator, FullTickets, RefreshReport, SlotOutcome};
pub use search::{SearchFlow, SearchPhase, SearchView};
pub use slots::{DisplaySlots, Slot, SlotId, SlotState};
pub use upload::{upload_all, FileUpload, UploadReport, UploadStatus};
