//! Collaborators the directory drives: state observers, the confirmation
//! prompt, the notice channel and the record viewer.

use std::sync::Arc;

use async_trait::async_trait;
use student_directory_sdk::Student;

use super::state::DirectoryState;

/// Receives every published state snapshot, in publication order.
pub trait StateObserver: Send + Sync {
    fn on_state_change(&self, state: &DirectoryState);
}

/// Asks the operator to approve a destructive action.
#[async_trait]
pub trait Confirmer: Send + Sync {
    /// Resolves to `true` only on explicit approval.
    async fn request_confirmation(&self, message: &str) -> bool;
}

/// Severity of a user-facing notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifyKind {
    Success,
    Info,
    Error,
}

/// Transient success, info and error notices.
pub trait Notifier: Send + Sync {
    fn notify(&self, kind: NotifyKind, message: &str);
}

/// Presents a single record in detail.
pub trait RecordViewer: Send + Sync {
    fn show(&self, student: &Student);
}

/// The collaborators a controller is wired to.
#[derive(Clone)]
pub struct Collaborators {
    pub confirmer: Arc<dyn Confirmer>,
    pub notifier: Arc<dyn Notifier>,
    pub viewer: Arc<dyn RecordViewer>,
}
