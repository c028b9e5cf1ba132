//! The directory controller.
//!
//! Every command bumps a sequence number and takes it as a ticket. A gateway
//! response is applied only while its ticket is still the latest, so the
//! newest command always decides what the table shows and stale responses
//! are dropped whatever order they arrive in.

use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use student_directory_sdk::{
    ErrorKind, GatewayError, InvalidPageSize, PageSize, Student, StudentGateway, StudentId,
};
use tracing::{debug, info, instrument, warn};

use super::forms::StudentForm;
use super::pagination::clamp_page;
use super::ports::{Collaborators, NotifyKind, StateObserver};
use super::search::{self, BULK_SEARCH_SIZE, SearchQuery};
use super::state::{DirectoryMode, DirectoryState, Pagination};
use crate::config::DirectoryConfig;

const FETCH_FAILED: &str = "Failed to fetch students";
const SEARCH_FAILED: &str = "Search failed";
const ID_NOT_FOUND: &str = "No match for this ID";
const DELETED: &str = "Student deleted successfully.";
const DELETE_FAILED: &str = "Failed to delete student";
const DETAILS_FAILED: &str = "Failed to fetch student details";

/// How a command ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandOutcome {
    /// The result was applied to the state.
    Applied,
    /// A newer command started first; the result was dropped.
    Superseded,
    /// The command does not apply in the current mode.
    Ignored,
    /// The operator declined the confirmation.
    Cancelled,
    /// The gateway call failed.
    Failed(ErrorKind),
}

/// Controller tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControllerSettings {
    pub page_size: PageSize,
    pub bulk_search_size: u32,
}

impl Default for ControllerSettings {
    fn default() -> Self {
        Self {
            page_size: PageSize::default(),
            bulk_search_size: BULK_SEARCH_SIZE,
        }
    }
}

impl TryFrom<&DirectoryConfig> for ControllerSettings {
    type Error = InvalidPageSize;

    fn try_from(config: &DirectoryConfig) -> Result<Self, Self::Error> {
        Ok(Self {
            page_size: config.page_size()?,
            bulk_search_size: config.bulk_search_size,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Ticket(u64);

/// The listing position the next fetch asks for.
#[derive(Debug, Clone, Copy)]
struct Cursor {
    page: u32,
    limit: PageSize,
}

struct Inner {
    state: DirectoryState,
    seq: u64,
    cursor: Cursor,
}

/// Drives the directory view: listing, paging, search, delete, and the
/// entry points for viewing and editing records.
///
/// Observers are called with the internal lock held and must not call back
/// into the controller.
pub struct DirectoryController {
    gateway: Arc<dyn StudentGateway>,
    collaborators: Collaborators,
    settings: ControllerSettings,
    inner: Mutex<Inner>,
    observers: RwLock<Vec<Arc<dyn StateObserver>>>,
}

impl DirectoryController {
    #[must_use]
    pub fn new(
        gateway: Arc<dyn StudentGateway>,
        collaborators: Collaborators,
        settings: ControllerSettings,
    ) -> Self {
        Self {
            gateway,
            collaborators,
            settings,
            inner: Mutex::new(Inner {
                state: DirectoryState::new(settings.page_size),
                seq: 0,
                cursor: Cursor {
                    page: 1,
                    limit: settings.page_size,
                },
            }),
            observers: RwLock::new(Vec::new()),
        }
    }

    /// Register an observer for every subsequent state change.
    pub fn subscribe(&self, observer: Arc<dyn StateObserver>) {
        self.observers.write().push(observer);
    }

    /// A snapshot of the current state.
    #[must_use]
    pub fn state(&self) -> DirectoryState {
        self.inner.lock().state.clone()
    }

    /// Fetch the current listing page with the current limit.
    #[instrument(skip(self))]
    pub async fn refresh(&self) -> CommandOutcome {
        let (ticket, cursor) = {
            let mut inner = self.inner.lock();
            self.begin_listing(&mut inner)
        };
        self.load_listing(ticket, cursor).await
    }

    /// Move to `requested`, clamped to the known page range.
    ///
    /// Only meaningful while listing; search results are a single page.
    #[instrument(skip(self))]
    pub async fn change_page(&self, requested: i64) -> CommandOutcome {
        let started = {
            let mut inner = self.inner.lock();
            if inner.state.mode == DirectoryMode::Listing {
                inner.cursor.page = clamp_page(requested, inner.state.pagination.total_pages);
                Some(self.begin_listing(&mut inner))
            } else {
                None
            }
        };
        let Some((ticket, cursor)) = started else {
            debug!("paging ignored outside listing");
            return CommandOutcome::Ignored;
        };
        self.load_listing(ticket, cursor).await
    }

    /// Load the listing at `requested` without knowing the page count yet.
    ///
    /// A page past the end is answered with the last page, so this takes a
    /// single round trip when the page exists.
    #[instrument(skip(self))]
    pub async fn open_page(&self, requested: i64) -> CommandOutcome {
        let (ticket, cursor) = {
            let mut inner = self.inner.lock();
            inner.cursor.page = u32::try_from(requested.max(1)).unwrap_or(u32::MAX);
            self.begin_listing(&mut inner)
        };
        self.load_listing(ticket, cursor).await
    }

    /// Switch the page size and go back to page 1.
    #[instrument(skip(self), fields(limit = size.get()))]
    pub async fn change_limit(&self, size: PageSize) -> CommandOutcome {
        let (ticket, cursor) = {
            let mut inner = self.inner.lock();
            inner.cursor = Cursor {
                page: 1,
                limit: size,
            };
            self.begin_listing(&mut inner)
        };
        self.load_listing(ticket, cursor).await
    }

    /// Search by id or by name. A blank query returns to the listing.
    #[instrument(skip(self))]
    pub async fn search(&self, query: &str) -> CommandOutcome {
        let query = SearchQuery::parse(query);
        if query == SearchQuery::Empty {
            return self.refresh().await;
        }

        let (ticket, limit) = {
            let mut inner = self.inner.lock();
            (self.start(&mut inner), inner.cursor.limit)
        };

        match search::resolve(self.gateway.as_ref(), &query, self.settings.bulk_search_size).await
        {
            Ok(resolution) => {
                let id_not_found = resolution.id_not_found;
                let matched = resolution.rows.len();
                let applied = self.finish(ticket, move |state, _| {
                    state.mode = resolution.mode;
                    state.pagination = Pagination::single_page(matched, limit.get());
                    state.rows = resolution.rows;
                    state.last_error = None;
                });
                if !applied {
                    return CommandOutcome::Superseded;
                }
                debug!(matched, "search applied");
                if id_not_found {
                    self.notify(NotifyKind::Info, ID_NOT_FOUND);
                }
                CommandOutcome::Applied
            }
            Err(err) => {
                let kind = err.kind();
                if !self.finish(ticket, |state, _| state.last_error = Some(kind)) {
                    return CommandOutcome::Superseded;
                }
                warn!(error = %err, "search failed");
                self.notify(NotifyKind::Error, SEARCH_FAILED);
                CommandOutcome::Failed(kind)
            }
        }
    }

    /// Delete a record after confirmation, then reload the listing once.
    ///
    /// The reload is skipped when another command started while the delete
    /// was in flight; that command's result stands instead.
    #[instrument(skip(self))]
    pub async fn delete_record(&self, id: StudentId) -> CommandOutcome {
        let message = self.confirmation_message(id);
        if !self
            .collaborators
            .confirmer
            .request_confirmation(&message)
            .await
        {
            info!("delete cancelled");
            return CommandOutcome::Cancelled;
        }

        let ticket = {
            let mut inner = self.inner.lock();
            self.start(&mut inner)
        };

        match self.gateway.delete(id).await {
            Ok(()) => {
                info!("student deleted");
                self.notify(NotifyKind::Success, DELETED);
                let reload = {
                    let mut inner = self.inner.lock();
                    if inner.seq == ticket.0 {
                        Some(self.begin_listing(&mut inner))
                    } else {
                        None
                    }
                };
                match reload {
                    Some((ticket, cursor)) => self.load_listing(ticket, cursor).await,
                    None => {
                        debug!("delete superseded, skipping reload");
                        CommandOutcome::Superseded
                    }
                }
            }
            Err(err) => {
                let kind = err.kind();
                self.finish(ticket, |state, _| state.last_error = Some(kind));
                warn!(error = %err, "delete failed");
                self.notify(NotifyKind::Error, DELETE_FAILED);
                CommandOutcome::Failed(kind)
            }
        }
    }

    /// Fetch a record and hand it to the record viewer. State is untouched.
    ///
    /// # Errors
    /// Returns the gateway error after notifying the operator.
    #[instrument(skip(self))]
    pub async fn view_record(&self, id: StudentId) -> Result<Student, GatewayError> {
        let student = self.fetch_record(id).await?;
        self.collaborators.viewer.show(&student);
        Ok(student)
    }

    /// An empty create form bound to this directory.
    #[must_use]
    pub fn request_create(&self) -> StudentForm<'_> {
        StudentForm::create(self)
    }

    /// An edit form pre-filled from `student`.
    #[must_use]
    pub fn request_edit(&self, student: &Student) -> StudentForm<'_> {
        StudentForm::edit(self, student)
    }

    /// Fetch a record by id and open an edit form for it.
    ///
    /// # Errors
    /// Returns the gateway error after notifying the operator.
    pub async fn request_edit_by_id(&self, id: StudentId) -> Result<StudentForm<'_>, GatewayError> {
        let student = self.fetch_record(id).await?;
        Ok(self.request_edit(&student))
    }

    pub(crate) fn gateway(&self) -> &dyn StudentGateway {
        self.gateway.as_ref()
    }

    pub(crate) fn notify(&self, kind: NotifyKind, message: &str) {
        self.collaborators.notifier.notify(kind, message);
    }

    async fn fetch_record(&self, id: StudentId) -> Result<Student, GatewayError> {
        self.gateway.get_by_id(id).await.map_err(|err| {
            warn!(error = %err, "fetching student failed");
            self.notify(NotifyKind::Error, DETAILS_FAILED);
            err
        })
    }

    fn confirmation_message(&self, id: StudentId) -> String {
        let inner = self.inner.lock();
        match inner.state.rows.iter().find(|s| s.id == id) {
            Some(student) if !student.name.is_empty() => {
                format!("You are about to delete {}.", student.name)
            }
            _ => format!("You are about to delete student #{id}."),
        }
    }

    fn publish(&self, state: &DirectoryState) {
        for observer in self.observers.read().iter() {
            observer.on_state_change(state);
        }
    }

    fn start(&self, inner: &mut Inner) -> Ticket {
        inner.seq += 1;
        inner.state.loading = true;
        self.publish(&inner.state);
        Ticket(inner.seq)
    }

    fn begin_listing(&self, inner: &mut Inner) -> (Ticket, Cursor) {
        (self.start(inner), inner.cursor)
    }

    fn is_current(&self, ticket: Ticket) -> bool {
        self.inner.lock().seq == ticket.0
    }

    /// Apply a response if `ticket` is still the latest. Returns whether it was.
    fn finish(&self, ticket: Ticket, apply: impl FnOnce(&mut DirectoryState, &mut Cursor)) -> bool {
        let mut inner = self.inner.lock();
        if inner.seq != ticket.0 {
            debug!(
                ticket = ticket.0,
                latest = inner.seq,
                "dropping stale response"
            );
            return false;
        }
        let Inner { state, cursor, .. } = &mut *inner;
        apply(state, cursor);
        state.loading = false;
        self.publish(state);
        true
    }

    async fn load_listing(&self, ticket: Ticket, cursor: Cursor) -> CommandOutcome {
        let limit = cursor.limit.get();
        let mut result = self.gateway.list_page(cursor.page, limit).await;

        // The page shrank under us (e.g. its last record was deleted).
        if let Ok(listing) = &result
            && listing.is_past_end()
        {
            let page = clamp_page(i64::from(listing.page), listing.total_pages);
            debug!(requested = cursor.page, page, "page past end, fetching last page");
            if !self.is_current(ticket) {
                return CommandOutcome::Superseded;
            }
            result = self.gateway.list_page(page, limit).await;
        }

        match result {
            Ok(listing) => {
                let applied = self.finish(ticket, move |state, cursor| {
                    cursor.page = listing.page;
                    state.mode = DirectoryMode::Listing;
                    state.pagination = Pagination {
                        page: listing.page,
                        page_size: listing.page_size,
                        total_pages: listing.total_pages,
                        total_records: listing.total_records,
                    };
                    state.rows = listing.items;
                    state.last_error = None;
                });
                if applied {
                    CommandOutcome::Applied
                } else {
                    CommandOutcome::Superseded
                }
            }
            Err(err) => {
                let kind = err.kind();
                let applied = self.finish(ticket, |state, cursor| {
                    state.mode = DirectoryMode::Listing;
                    state.rows.clear();
                    state.pagination.page = cursor.page;
                    state.pagination.page_size = cursor.limit.get();
                    state.last_error = Some(kind);
                });
                if !applied {
                    return CommandOutcome::Superseded;
                }
                warn!(error = %err, "listing failed");
                self.notify(NotifyKind::Error, FETCH_FAILED);
                CommandOutcome::Failed(kind)
            }
        }
    }
}
