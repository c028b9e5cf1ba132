//! Student Directory
//!
//! The public contract is defined in `student-directory-sdk` and re-exported
//! here. This crate adds the directory controller, the create/edit forms and
//! the HTTP gateway to the record store.

pub use student_directory_sdk::{
    ErrorKind, GatewayError, PageResult, PageSize, Student, StudentDraft, StudentGateway,
    StudentId,
};

pub mod config;
pub mod domain;
pub mod infra;

pub use config::DirectoryConfig;
pub use domain::controller::{CommandOutcome, ControllerSettings, DirectoryController};
pub use domain::forms::{
    FieldError, FieldProblem, FormError, FormField, FormInput, FormMode, StudentForm, SubmitOutcome,
};
pub use domain::ports::{
    Collaborators, Confirmer, Notifier, NotifyKind, RecordViewer, StateObserver,
};
pub use domain::state::{DirectoryMode, DirectoryState, Pagination, ViewStatus};
pub use infra::http_gateway::{GatewaySetupError, HttpStudentGateway};
