//! Student Directory SDK
//!
//! This crate provides the public contract of the student directory:
//!
//! - [`StudentGateway`] - the remote record store operations
//! - [`Student`], [`StudentDraft`], [`PageResult`], [`PageSize`] - models
//! - [`GatewayError`], [`ErrorKind`] - error types
//!
//! ## Usage
//!
//! ```ignore
//! use student_directory_sdk::{PageSize, StudentGateway};
//!
//! let page = gateway.list_page(1, PageSize::Ten.get()).await?;
//! for student in &page.items {
//!     println!("{} {}", student.id, student.name);
//! }
//! ```

pub mod api;
pub mod error;
pub mod models;

pub use api::StudentGateway;
pub use error::{ErrorKind, GatewayError, InvalidPageSize};
pub use models::{PageResult, PageSize, Student, StudentDraft, StudentId};
