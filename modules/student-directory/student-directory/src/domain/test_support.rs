//! In-memory gateway and recording collaborators for controller tests.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use student_directory_sdk::{
    GatewayError, PageResult, Student, StudentDraft, StudentGateway, StudentId,
};
use tokio::sync::oneshot;

use super::ports::{Collaborators, Confirmer, Notifier, NotifyKind, RecordViewer, StateObserver};
use super::state::DirectoryState;

pub fn student(id: StudentId, name: &str) -> Student {
    Student {
        id,
        name: name.to_owned(),
        email: format!("student{id}@example.com"),
        age: Some(20),
        average_score: Some(80.0),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    List { page: u32, limit: u32 },
    Get(StudentId),
    Create(StudentDraft),
    Update(StudentId, StudentDraft),
    Delete(StudentId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    List,
    Get,
    Create,
    Update,
    Delete,
}

/// Store-backed gateway. Failures can be queued per operation, and list
/// responses for a page or a delete of an id can be held back until released.
#[derive(Default)]
pub struct ScriptedGateway {
    students: Mutex<Vec<Student>>,
    next_id: Mutex<StudentId>,
    calls: Mutex<Vec<Call>>,
    failures: Mutex<HashMap<Op, VecDeque<GatewayError>>>,
    gates: Mutex<HashMap<u32, oneshot::Receiver<()>>>,
    delete_gates: Mutex<HashMap<StudentId, oneshot::Receiver<()>>>,
}

impl ScriptedGateway {
    pub fn new(students: Vec<Student>) -> Self {
        let next_id = students.iter().map(|s| s.id).max().unwrap_or(0) + 1;
        Self {
            students: Mutex::new(students),
            next_id: Mutex::new(next_id),
            ..Self::default()
        }
    }

    /// `count` students named "Student 1" onwards.
    pub fn with_students(count: u64) -> Self {
        Self::new(
            (1..=count)
                .map(|id| student(id, &format!("Student {id}")))
                .collect(),
        )
    }

    pub fn fail_next(&self, op: Op, error: GatewayError) {
        self.failures.lock().entry(op).or_default().push_back(error);
    }

    /// Hold the next `list_page` for `page` until the returned sender fires
    /// or is dropped.
    pub fn gate_list_page(&self, page: u32) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.gates.lock().insert(page, rx);
        tx
    }

    /// Hold the next `delete` of `id` until the returned sender fires or is
    /// dropped.
    pub fn gate_delete(&self, id: StudentId) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.delete_gates.lock().insert(id, rx);
        tx
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    pub fn list_calls(&self) -> Vec<(u32, u32)> {
        self.calls
            .lock()
            .iter()
            .filter_map(|c| match c {
                Call::List { page, limit } => Some((*page, *limit)),
                _ => None,
            })
            .collect()
    }

    pub fn stored(&self) -> Vec<Student> {
        self.students.lock().clone()
    }

    fn record(&self, call: Call) {
        self.calls.lock().push(call);
    }

    fn take_failure(&self, op: Op) -> Option<GatewayError> {
        self.failures.lock().get_mut(&op).and_then(VecDeque::pop_front)
    }
}

#[async_trait]
impl StudentGateway for ScriptedGateway {
    async fn list_page(&self, page: u32, limit: u32) -> Result<PageResult, GatewayError> {
        self.record(Call::List { page, limit });
        let gate = self.gates.lock().remove(&page);
        if let Some(rx) = gate {
            rx.await.ok();
        }
        if let Some(err) = self.take_failure(Op::List) {
            return Err(err);
        }

        let students = self.students.lock();
        let total = u64::try_from(students.len()).unwrap_or(u64::MAX);
        let size = u64::from(limit.max(1));
        let total_pages = u32::try_from(total.div_ceil(size)).unwrap_or(u32::MAX);
        let skip = usize::try_from(u64::from(page.saturating_sub(1)) * size).unwrap_or(usize::MAX);
        let items = students
            .iter()
            .skip(skip)
            .take(usize::try_from(limit).unwrap_or(usize::MAX))
            .cloned()
            .collect();
        Ok(PageResult::new(items, page, limit, total_pages, total))
    }

    async fn get_by_id(&self, id: StudentId) -> Result<Student, GatewayError> {
        self.record(Call::Get(id));
        if let Some(err) = self.take_failure(Op::Get) {
            return Err(err);
        }
        self.students
            .lock()
            .iter()
            .find(|s| s.id == id)
            .cloned()
            .ok_or(GatewayError::NotFound { id })
    }

    async fn create(&self, draft: &StudentDraft) -> Result<Student, GatewayError> {
        self.record(Call::Create(draft.clone()));
        if let Some(err) = self.take_failure(Op::Create) {
            return Err(err);
        }
        let id = {
            let mut next = self.next_id.lock();
            let id = *next;
            *next += 1;
            id
        };
        let created = Student {
            id,
            name: draft.name.clone(),
            email: draft.email.clone(),
            age: Some(draft.age),
            average_score: Some(draft.average_marks),
        };
        self.students.lock().push(created.clone());
        Ok(created)
    }

    async fn update(&self, id: StudentId, draft: &StudentDraft) -> Result<Student, GatewayError> {
        self.record(Call::Update(id, draft.clone()));
        if let Some(err) = self.take_failure(Op::Update) {
            return Err(err);
        }
        let mut students = self.students.lock();
        let existing = students
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or(GatewayError::NotFound { id })?;
        existing.name.clone_from(&draft.name);
        existing.email.clone_from(&draft.email);
        existing.age = Some(draft.age);
        existing.average_score = Some(draft.average_marks);
        Ok(existing.clone())
    }

    async fn delete(&self, id: StudentId) -> Result<(), GatewayError> {
        self.record(Call::Delete(id));
        let gate = self.delete_gates.lock().remove(&id);
        if let Some(rx) = gate {
            rx.await.ok();
        }
        if let Some(err) = self.take_failure(Op::Delete) {
            return Err(err);
        }
        let mut students = self.students.lock();
        let before = students.len();
        students.retain(|s| s.id != id);
        if students.len() == before {
            return Err(GatewayError::NotFound { id });
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    notices: Mutex<Vec<(NotifyKind, String)>>,
}

impl RecordingNotifier {
    pub fn notices(&self) -> Vec<(NotifyKind, String)> {
        self.notices.lock().clone()
    }

    pub fn of_kind(&self, kind: NotifyKind) -> Vec<String> {
        self.notices
            .lock()
            .iter()
            .filter(|(k, _)| *k == kind)
            .map(|(_, m)| m.clone())
            .collect()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, kind: NotifyKind, message: &str) {
        self.notices.lock().push((kind, message.to_owned()));
    }
}

pub struct ScriptedConfirmer {
    answer: bool,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedConfirmer {
    pub fn answering(answer: bool) -> Self {
        Self {
            answer,
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().clone()
    }
}

#[async_trait]
impl Confirmer for ScriptedConfirmer {
    async fn request_confirmation(&self, message: &str) -> bool {
        self.prompts.lock().push(message.to_owned());
        self.answer
    }
}

#[derive(Default)]
pub struct RecordingViewer {
    shown: Mutex<Vec<Student>>,
}

impl RecordingViewer {
    pub fn shown(&self) -> Vec<Student> {
        self.shown.lock().clone()
    }
}

impl RecordViewer for RecordingViewer {
    fn show(&self, student: &Student) {
        self.shown.lock().push(student.clone());
    }
}

#[derive(Default)]
pub struct RecordingObserver {
    snapshots: Mutex<Vec<DirectoryState>>,
}

impl RecordingObserver {
    pub fn snapshots(&self) -> Vec<DirectoryState> {
        self.snapshots.lock().clone()
    }
}

impl StateObserver for RecordingObserver {
    fn on_state_change(&self, state: &DirectoryState) {
        self.snapshots.lock().push(state.clone());
    }
}

/// Recording collaborators with a confirmer that always gives `answer`.
pub struct Probes {
    pub notifier: Arc<RecordingNotifier>,
    pub confirmer: Arc<ScriptedConfirmer>,
    pub viewer: Arc<RecordingViewer>,
}

impl Probes {
    pub fn confirming(answer: bool) -> Self {
        Self {
            notifier: Arc::new(RecordingNotifier::default()),
            confirmer: Arc::new(ScriptedConfirmer::answering(answer)),
            viewer: Arc::new(RecordingViewer::default()),
        }
    }

    pub fn collaborators(&self) -> Collaborators {
        Collaborators {
            confirmer: self.confirmer.clone(),
            notifier: self.notifier.clone(),
            viewer: self.viewer.clone(),
        }
    }
}
