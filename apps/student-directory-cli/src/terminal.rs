//! Terminal renditions of the directory collaborators.

use std::io;
use std::sync::Arc;

use async_trait::async_trait;
use student_directory::domain::pagination::{PageLink, page_links};
use student_directory::{
    Confirmer, DirectoryMode, DirectoryState, ErrorKind, Notifier, NotifyKind, RecordViewer,
    StateObserver, Student, ViewStatus,
};
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tokio::sync::Mutex;

/// Line-oriented stdin shared by the shell loop and the confirmation prompt.
pub struct TerminalInput {
    lines: Mutex<Lines<BufReader<Stdin>>>,
}

impl Default for TerminalInput {
    fn default() -> Self {
        Self {
            lines: Mutex::new(BufReader::new(tokio::io::stdin()).lines()),
        }
    }
}

impl TerminalInput {
    /// The next line, or `None` at end of input.
    pub async fn next_line(&self) -> io::Result<Option<String>> {
        self.lines.lock().await.next_line().await
    }
}

/// Prompts on stderr and reads the answer from stdin.
pub struct TerminalConfirmer {
    input: Arc<TerminalInput>,
    assume_yes: bool,
}

impl TerminalConfirmer {
    pub fn new(input: Arc<TerminalInput>, assume_yes: bool) -> Self {
        Self { input, assume_yes }
    }
}

#[async_trait]
impl Confirmer for TerminalConfirmer {
    async fn request_confirmation(&self, message: &str) -> bool {
        if self.assume_yes {
            return true;
        }
        eprint!("{message} Continue? [y/N] ");
        match self.input.next_line().await {
            Ok(Some(answer)) => is_yes(&answer),
            Ok(None) => false,
            Err(err) => {
                tracing::warn!(error = %err, "could not read confirmation");
                false
            }
        }
    }
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

/// Notices go to stderr, tagged by kind.
pub struct TerminalNotifier;

impl Notifier for TerminalNotifier {
    fn notify(&self, kind: NotifyKind, message: &str) {
        let tag = match kind {
            NotifyKind::Success => "ok",
            NotifyKind::Info => "info",
            NotifyKind::Error => "error",
        };
        eprintln!("[{tag}] {message}");
    }
}

/// Prints a record's details to stdout.
pub struct TerminalViewer;

impl RecordViewer for TerminalViewer {
    fn show(&self, student: &Student) {
        println!("{}", render_record(student));
    }
}

/// Redraws the table whenever a command settles.
pub struct TableObserver;

impl StateObserver for TableObserver {
    fn on_state_change(&self, state: &DirectoryState) {
        if !state.loading {
            println!("{}", render_table(state));
        }
    }
}

pub fn render_record(student: &Student) -> String {
    let age = student.age.map_or_else(String::new, |a| a.to_string());
    format!(
        "Student #{}\n  Name:          {}\n  Email:         {}\n  Age:           {}\n  Average score: {:.2}",
        student.id,
        student.name,
        student.email,
        age,
        student.display_score()
    )
}

pub fn render_table(state: &DirectoryState) -> String {
    let mut lines = match state.status() {
        ViewStatus::Loading => vec!["Loading...".to_owned()],
        ViewStatus::Empty => vec!["No students found".to_owned()],
        ViewStatus::Errored(kind) => vec![format!("Could not load students: {}", describe(kind))],
        ViewStatus::Populated => {
            let mut lines = Vec::with_capacity(state.rows.len() + 2);
            lines.push(format!(
                "{:>6}  {:<24}  {:<30}  {:>4}  {:>7}",
                "ID", "Name", "Email", "Age", "Score"
            ));
            lines.extend(state.rows.iter().map(|student| {
                format!(
                    "{:>6}  {:<24}  {:<30}  {:>4}  {:>7.2}",
                    student.id,
                    student.name,
                    student.email,
                    student.age.map_or_else(String::new, |a| a.to_string()),
                    student.display_score()
                )
            }));
            lines.push(state.display_range().to_string());
            lines
        }
    };
    if state.mode == DirectoryMode::Listing && state.pagination.total_records > 0 {
        lines.push(render_links(&page_links(
            state.pagination.page,
            state.pagination.total_pages,
        )));
    }
    lines.join("\n")
}

fn describe(kind: ErrorKind) -> &'static str {
    match kind {
        ErrorKind::Network => "the record store is unreachable",
        ErrorKind::Server => "the record store reported an error",
        ErrorKind::Validation => "the request was rejected",
        ErrorKind::NotFound => "not found",
    }
}

/// `[n]` marks the current page, parentheses a disabled control.
fn render_links(links: &[PageLink]) -> String {
    links
        .iter()
        .map(|link| {
            if link.active {
                format!("[{}]", link.label)
            } else if link.disabled {
                format!("({})", link.label)
            } else {
                link.label.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
