//! Status: the error type of the metadata service
//!
//! Every fallible operation returns `Result<T, Status>`. A `Status` is a
//! chain: the kind at the tip, the source location where it was raised, an
//! optional human message, and an optional cause (another `Status`).
//!
//! The kinds map one-to-one onto the wire error codes. Store-level
//! "key not found" is deliberately not a kind: point reads return
//! `Option::None` and never surface a missing key as an error.
//!
//! Rendering the chain is lazy: building a `Status` on the hot path costs a
//! `String` for the tip message; the full chain is only formatted when the
//! response is serialized or the status is logged.

use std::fmt;
use std::panic::Location;

use serde::{Deserialize, Serialize};

/// Result type alias used throughout the workspace
pub type Result<T> = std::result::Result<T, Status>;

/// Classification of a failure, mapped onto the wire error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatusKind {
    /// Lower-layer failure (store I/O, serialization, broken invariant)
    System,
    /// Malformed input (bad name, non-regular mknod mode, misused transaction)
    InvalidArgument,
    /// Permission check failed
    Permission,
    /// Uniqueness-violating create
    AlreadyExists,
    /// Named entry does not exist
    NotFound,
    /// Entry exists but is not a directory
    NotDir,
    /// Parent inode does not exist
    ParentNotFound,
    /// Parent inode exists but is not a directory
    ParentNotDir,
    /// Optimistic concurrency conflict; the caller may retry
    Conflict,
}

impl StatusKind {
    /// Wire error code for this kind
    pub fn code(self) -> i16 {
        match self {
            StatusKind::System => 1,
            StatusKind::InvalidArgument => 2,
            StatusKind::Permission => 3,
            StatusKind::AlreadyExists => 4,
            StatusKind::NotFound => 5,
            StatusKind::NotDir => 6,
            StatusKind::ParentNotFound => 7,
            StatusKind::ParentNotDir => 8,
            StatusKind::Conflict => 1002,
        }
    }

    /// Short name used when rendering a chain
    pub fn name(self) -> &'static str {
        match self {
            StatusKind::System => "system",
            StatusKind::InvalidArgument => "invalid argument",
            StatusKind::Permission => "permission denied",
            StatusKind::AlreadyExists => "already exists",
            StatusKind::NotFound => "not found",
            StatusKind::NotDir => "not a directory",
            StatusKind::ParentNotFound => "parent not found",
            StatusKind::ParentNotDir => "parent not a directory",
            StatusKind::Conflict => "transaction conflict",
        }
    }
}

/// An error with kind, origin, message, and optional cause
#[derive(Debug, Clone)]
pub struct Status {
    kind: StatusKind,
    location: &'static Location<'static>,
    message: String,
    cause: Option<Box<Status>>,
}

impl Status {
    #[track_caller]
    fn new(kind: StatusKind, message: impl Into<String>) -> Self {
        Status {
            kind,
            location: Location::caller(),
            message: message.into(),
            cause: None,
        }
    }

    /// Raise a system error
    #[track_caller]
    pub fn system(message: impl Into<String>) -> Self {
        Self::new(StatusKind::System, message)
    }

    /// Raise an invalid-argument error
    #[track_caller]
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::new(StatusKind::InvalidArgument, message)
    }

    /// Raise a permission error
    #[track_caller]
    pub fn permission(message: impl Into<String>) -> Self {
        Self::new(StatusKind::Permission, message)
    }

    /// Raise an already-exists error
    #[track_caller]
    pub fn already_exists(message: impl Into<String>) -> Self {
        Self::new(StatusKind::AlreadyExists, message)
    }

    /// Raise a not-found error
    #[track_caller]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusKind::NotFound, message)
    }

    /// Raise a not-a-directory error
    #[track_caller]
    pub fn not_dir(message: impl Into<String>) -> Self {
        Self::new(StatusKind::NotDir, message)
    }

    /// Raise a parent-not-found error
    #[track_caller]
    pub fn parent_not_found(message: impl Into<String>) -> Self {
        Self::new(StatusKind::ParentNotFound, message)
    }

    /// Raise a parent-not-a-directory error
    #[track_caller]
    pub fn parent_not_dir(message: impl Into<String>) -> Self {
        Self::new(StatusKind::ParentNotDir, message)
    }

    /// Raise a transaction-conflict error
    #[track_caller]
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(StatusKind::Conflict, message)
    }

    /// Attach a cause to this status, keeping this status at the tip
    pub fn caused_by(mut self, cause: Status) -> Self {
        self.cause = Some(Box::new(cause));
        self
    }

    /// The kind at the tip of the chain
    pub fn kind(&self) -> StatusKind {
        self.kind
    }

    /// Wire error code for the tip kind
    pub fn code(&self) -> i16 {
        self.kind.code()
    }

    /// The tip message (without the chain)
    pub fn message(&self) -> &str {
        &self.message
    }

    /// The cause, if one was attached
    pub fn cause(&self) -> Option<&Status> {
        self.cause.as_deref()
    }

    /// Whether this status is retryable by starting a fresh transaction
    pub fn is_conflict(&self) -> bool {
        self.kind == StatusKind::Conflict
    }

    /// Whether this status reports a lower-layer failure
    pub fn is_system(&self) -> bool {
        self.kind == StatusKind::System
    }

    /// Render the full chain, tip first
    pub fn render(&self) -> String {
        let mut out = String::new();
        let mut next = Some(self);
        while let Some(status) = next {
            if !out.is_empty() {
                out.push_str("; caused by: ");
            }
            out.push_str(status.kind.name());
            if !status.message.is_empty() {
                out.push_str(": ");
                out.push_str(&status.message);
            }
            out.push_str(&format!(
                " (at {}:{})",
                status.location.file(),
                status.location.line()
            ));
            next = status.cause.as_deref();
        }
        out
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

impl std::error::Error for Status {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.cause.as_ref().map(|c| c.as_ref() as _)
    }
}
