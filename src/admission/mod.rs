//! Request admission: queueing, status tracking, notifier bookkeeping,
//! and garbage collection of abandoned requests.

mod notifiers;
mod queue;
mod reaper;
mod store;

pub use notifiers::{LiveNotifierSet, NotifierGuard};
pub use queue::AdmissionQueue;
pub use reaper::Reaper;
pub use store::{RequestStatus, RequestStore};
