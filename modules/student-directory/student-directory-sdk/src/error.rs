//! Error types for the student directory.

use std::fmt;

use thiserror::Error;

use crate::models::StudentId;

/// Coarse classification of a gateway failure, kept in directory state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Transport or connectivity failure.
    Network,
    /// Non-2xx response without field detail.
    Server,
    /// The store rejected specific fields.
    Validation,
    /// The entity does not exist.
    NotFound,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Network => "network error",
            Self::Server => "server error",
            Self::Validation => "validation error",
            Self::NotFound => "not found",
        })
    }
}

/// Errors returned by [`crate::StudentGateway`] operations.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum GatewayError {
    /// The store could not be reached or its reply could not be read.
    #[error("network error: {0}")]
    Network(String),

    /// The store answered with a non-2xx status.
    #[error("server responded with HTTP {status}")]
    Server {
        /// HTTP status code.
        status: u16,
        /// `message` from the error body, if any.
        message: Option<String>,
    },

    /// The store rejected one or more fields.
    #[error("validation failed{}", format_fields(.fields))]
    Validation {
        /// `message` from the error body, if any.
        message: Option<String>,
        /// Names of the rejected fields, when reported.
        fields: Vec<String>,
    },

    /// No student with this id.
    #[error("student not found: {id}")]
    NotFound {
        /// The id that was looked up.
        id: StudentId,
    },
}

impl GatewayError {
    /// The coarse kind recorded in directory state.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Network(_) => ErrorKind::Network,
            Self::Server { .. } => ErrorKind::Server,
            Self::Validation { .. } => ErrorKind::Validation,
            Self::NotFound { .. } => ErrorKind::NotFound,
        }
    }

    /// Operator-facing message supplied by the store, if it sent one.
    #[must_use]
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::Server { message, .. } | Self::Validation { message, .. } => message.as_deref(),
            Self::Network(_) | Self::NotFound { .. } => None,
        }
    }
}

fn format_fields(fields: &[String]) -> String {
    if fields.is_empty() {
        String::new()
    } else {
        format!(": {}", fields.join(", "))
    }
}

/// A page size outside the offered options.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
#[error("page size {0} is not one of 5, 10, 25, 50")]
pub struct InvalidPageSize(pub u32);
