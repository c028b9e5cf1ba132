//! Create and edit forms.
//!
//! A form keeps the operator's raw text until submission. Submitting
//! validates locally first, so malformed input never reaches the store.

use std::fmt;

use student_directory_sdk::{GatewayError, Student, StudentDraft, StudentId};
use thiserror::Error;
use tracing::{debug, info, warn};

use super::controller::DirectoryController;
use super::ports::NotifyKind;

/// Whether the form adds a new record or replaces an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Edit(StudentId),
}

impl FormMode {
    fn success_message(self) -> &'static str {
        match self {
            Self::Create => "Student added successfully",
            Self::Edit(_) => "Student updated successfully",
        }
    }

    fn failure_message(self) -> &'static str {
        match self {
            Self::Create => "Failed to add student",
            Self::Edit(_) => "Failed to update student",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormField {
    Name,
    Email,
    Age,
    AverageMarks,
}

impl fmt::Display for FormField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Name => "name",
            Self::Email => "email",
            Self::Age => "age",
            Self::AverageMarks => "average marks",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FieldProblem {
    #[error("is required")]
    Required,
    #[error("must be an email address")]
    InvalidEmail,
    #[error("must be a whole number")]
    NotAnInteger,
    #[error("must be a number")]
    NotANumber,
    #[error("must be at least {min}")]
    TooSmall { min: u32 },
    #[error("must be at most {max}")]
    TooLarge { max: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("{field} {problem}")]
pub struct FieldError {
    pub field: FormField,
    pub problem: FieldProblem,
}

/// Every field that failed validation, in form order.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid input: {}", join_errors(.errors))]
pub struct FormError {
    pub errors: Vec<FieldError>,
}

impl FormError {
    /// The problem reported for `field`, if any.
    #[must_use]
    pub fn problem(&self, field: FormField) -> Option<FieldProblem> {
        self.errors
            .iter()
            .find(|e| e.field == field)
            .map(|e| e.problem)
    }
}

fn join_errors(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Raw text of the four form fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormInput {
    pub name: String,
    pub email: String,
    pub age: String,
    pub average_marks: String,
}

impl FormInput {
    /// Pre-fill from a stored record. Absent numbers become empty fields.
    #[must_use]
    pub fn from_student(student: &Student) -> Self {
        Self {
            name: student.name.clone(),
            email: student.email.clone(),
            age: student.age.map_or_else(String::new, |a| a.to_string()),
            average_marks: student
                .average_score
                .map_or_else(String::new, |m| m.to_string()),
        }
    }

    #[must_use]
    pub fn get(&self, field: FormField) -> &str {
        match field {
            FormField::Name => &self.name,
            FormField::Email => &self.email,
            FormField::Age => &self.age,
            FormField::AverageMarks => &self.average_marks,
        }
    }

    fn slot(&mut self, field: FormField) -> &mut String {
        match field {
            FormField::Name => &mut self.name,
            FormField::Email => &mut self.email,
            FormField::Age => &mut self.age,
            FormField::AverageMarks => &mut self.average_marks,
        }
    }

    /// Check every field and build the outbound payload.
    ///
    /// # Errors
    /// Returns a `FormError` listing each invalid field.
    pub fn validate(&self) -> Result<StudentDraft, FormError> {
        let mut errors = Vec::new();
        let mut check = |field, result: Result<(), FieldProblem>| {
            if let Err(problem) = result {
                errors.push(FieldError { field, problem });
            }
        };

        let name = self.name.trim();
        check(FormField::Name, required(name));

        let email = self.email.trim();
        check(
            FormField::Email,
            required(email).and_then(|()| {
                if email.contains('@') {
                    Ok(())
                } else {
                    Err(FieldProblem::InvalidEmail)
                }
            }),
        );

        let age = parse_age(self.age.trim());
        check(FormField::Age, age.map(|_| ()));

        let marks = parse_marks(self.average_marks.trim());
        check(FormField::AverageMarks, marks.map(|_| ()));

        match (age, marks) {
            (Ok(age), Ok(average_marks)) if errors.is_empty() => Ok(StudentDraft {
                name: name.to_owned(),
                email: email.to_owned(),
                age,
                average_marks,
            }),
            _ => Err(FormError { errors }),
        }
    }
}

fn required(value: &str) -> Result<(), FieldProblem> {
    if value.is_empty() {
        Err(FieldProblem::Required)
    } else {
        Ok(())
    }
}

fn parse_age(raw: &str) -> Result<u32, FieldProblem> {
    required(raw)?;
    let age = raw
        .parse::<i64>()
        .map_err(|_| FieldProblem::NotAnInteger)?;
    if age < 1 {
        return Err(FieldProblem::TooSmall { min: 1 });
    }
    u32::try_from(age).map_err(|_| FieldProblem::TooLarge { max: u32::MAX })
}

fn parse_marks(raw: &str) -> Result<f64, FieldProblem> {
    required(raw)?;
    let marks = raw
        .parse::<f64>()
        .ok()
        .filter(|m| m.is_finite())
        .ok_or(FieldProblem::NotANumber)?;
    if marks < 0.0 {
        Err(FieldProblem::TooSmall { min: 0 })
    } else if marks > 100.0 {
        Err(FieldProblem::TooLarge { max: 100 })
    } else {
        Ok(marks)
    }
}

/// Result of submitting a form.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// Stored; the form closed and the listing was reloaded.
    Saved(Student),
    /// Local validation failed; nothing was sent.
    Invalid(FormError),
    /// The store rejected the request; the form stays open with its input.
    Failed(GatewayError),
    /// The form was already closed.
    Closed,
}

/// A create or edit form bound to the directory it reloads on success.
pub struct StudentForm<'a> {
    directory: &'a DirectoryController,
    mode: FormMode,
    input: FormInput,
    open: bool,
}

impl<'a> StudentForm<'a> {
    pub(crate) fn create(directory: &'a DirectoryController) -> Self {
        Self {
            directory,
            mode: FormMode::Create,
            input: FormInput::default(),
            open: true,
        }
    }

    pub(crate) fn edit(directory: &'a DirectoryController, student: &Student) -> Self {
        Self {
            directory,
            mode: FormMode::Edit(student.id),
            input: FormInput::from_student(student),
            open: true,
        }
    }

    #[must_use]
    pub fn mode(&self) -> FormMode {
        self.mode
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        self.open
    }

    #[must_use]
    pub fn input(&self) -> &FormInput {
        &self.input
    }

    pub fn set(&mut self, field: FormField, value: impl Into<String>) {
        *self.input.slot(field) = value.into();
    }

    /// Close without saving.
    pub fn cancel(&mut self) {
        self.open = false;
    }

    /// Validate, send to the store, and on success close and reload the
    /// listing. A create form is also cleared.
    pub async fn submit(&mut self) -> SubmitOutcome {
        if !self.open {
            return SubmitOutcome::Closed;
        }
        let draft = match self.input.validate() {
            Ok(draft) => draft,
            Err(err) => {
                debug!(error = %err, "form rejected locally");
                return SubmitOutcome::Invalid(err);
            }
        };

        let gateway = self.directory.gateway();
        let result = match self.mode {
            FormMode::Create => gateway.create(&draft).await,
            FormMode::Edit(id) => gateway.update(id, &draft).await,
        };

        match result {
            Ok(student) => {
                info!(id = student.id, "student saved");
                self.open = false;
                if self.mode == FormMode::Create {
                    self.input = FormInput::default();
                }
                self.directory
                    .notify(NotifyKind::Success, self.mode.success_message());
                self.directory.refresh().await;
                SubmitOutcome::Saved(student)
            }
            Err(err) => {
                warn!(error = %err, "saving student failed");
                let message = err
                    .server_message()
                    .unwrap_or_else(|| self.mode.failure_message());
                self.directory.notify(NotifyKind::Error, message);
                SubmitOutcome::Failed(err)
            }
        }
    }
}
