use async_trait::async_trait;

use crate::error::GatewayError;
use crate::models::{PageResult, Student, StudentDraft, StudentId};

/// Remote record store operations.
///
/// Each method is exactly one round trip. Implementations never retry;
/// callers decide whether to re-issue a failed operation.
#[async_trait]
pub trait StudentGateway: Send + Sync {
    /// Fetch one page of `limit` students.
    ///
    /// `limit` is usually a [`crate::PageSize`], but bulk fetches (name
    /// search) ask for larger pages.
    async fn list_page(&self, page: u32, limit: u32) -> Result<PageResult, GatewayError>;

    /// Fetch a single student. `NotFound` when the store has no match.
    async fn get_by_id(&self, id: StudentId) -> Result<Student, GatewayError>;

    /// Create a student from a draft; the store assigns the id.
    async fn create(&self, draft: &StudentDraft) -> Result<Student, GatewayError>;

    /// Replace the fields of an existing student.
    async fn update(&self, id: StudentId, draft: &StudentDraft) -> Result<Student, GatewayError>;

    /// Delete a student.
    async fn delete(&self, id: StudentId) -> Result<(), GatewayError>;
}
