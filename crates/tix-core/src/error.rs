use std::fmt;

use crate::store::StoreError;

/// Machine-readable error codes for scripts and operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    NotInitialized,
    ConfigParseError,
    AlreadyInitialized,
    ValidationFailed,
    TicketNotFound,
    MalformedTicketId,
    StorageFailure,
    CorruptDocument,
    InternalUnexpected,
}

impl ErrorCode {
    /// Stable code identifier (`E####`) for machine parsing.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::NotInitialized => "E1001",
            Self::ConfigParseError => "E1002",
            Self::AlreadyInitialized => "E1003",
            Self::ValidationFailed => "E2001",
            Self::TicketNotFound => "E2002",
            Self::MalformedTicketId => "E2003",
            Self::StorageFailure => "E5001",
            Self::CorruptDocument => "E5002",
            Self::InternalUnexpected => "E9001",
        }
    }

    /// Short human-facing summary for logs and terminal output.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::NotInitialized => "Project not initialized",
            Self::ConfigParseError => "Config file parse error",
            Self::AlreadyInitialized => "Project already initialized",
            Self::ValidationFailed => "Validation failed",
            Self::TicketNotFound => "Ticket not found",
            Self::MalformedTicketId => "Malformed ticket ID",
            Self::StorageFailure => "Storage failure",
            Self::CorruptDocument => "Corrupt ticket document",
            Self::InternalUnexpected => "Internal unexpected error",
        }
    }

    /// Optional remediation hint that can be surfaced to operators.
    #[must_use]
    pub const fn hint(self) -> Option<&'static str> {
        match self {
            Self::NotInitialized => Some("Run `tix init` to initialize this directory."),
            Self::ConfigParseError => Some("Fix syntax in .tix/config.toml and retry."),
            Self::AlreadyInitialized => Some("Use `tix init --force` to rewrite the config."),
            Self::ValidationFailed => {
                Some("Provide every required field; status must be pending, accepted, resolved, or rejected.")
            }
            Self::TicketNotFound => Some("Use `tix list` to see available tickets."),
            Self::MalformedTicketId => Some("Ticket IDs look like tk-0123456789ab."),
            Self::StorageFailure => Some("Check that the database file is writable and retry."),
            Self::CorruptDocument => None,
            Self::InternalUnexpected => Some("Retry once. If persistent, report a bug with logs."),
        }
    }

    /// Status class an HTTP surface would answer with.
    #[must_use]
    pub const fn http_status(self) -> u16 {
        match self {
            Self::ValidationFailed | Self::MalformedTicketId | Self::AlreadyInitialized => 400,
            Self::TicketNotFound => 404,
            Self::NotInitialized
            | Self::ConfigParseError
            | Self::StorageFailure
            | Self::CorruptDocument
            | Self::InternalUnexpected => 500,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Failures surfaced by ticket operations.
#[derive(Debug, thiserror::Error)]
pub enum TicketError {
    /// Missing or blank required fields, or a status outside the enum.
    #[error("Validation failed: {}", errors.join("; "))]
    Validation { errors: Vec<String> },

    /// No stored ticket has this identifier.
    #[error("Ticket not found: {id}")]
    NotFound { id: String },

    /// The identifier is not in the storage layer's format.
    #[error("malformed ticket id '{id}'")]
    MalformedId { id: String },

    /// Any other persistence failure.
    #[error("storage error: {0}")]
    Storage(#[source] StoreError),
}

impl TicketError {
    /// Single-message validation failure.
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::Validation {
            errors: vec![message.into()],
        }
    }

    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Validation { .. } => ErrorCode::ValidationFailed,
            Self::NotFound { .. } => ErrorCode::TicketNotFound,
            Self::MalformedId { .. } => ErrorCode::MalformedTicketId,
            Self::Storage(StoreError::Codec(_)) => ErrorCode::CorruptDocument,
            Self::Storage(_) => ErrorCode::StorageFailure,
        }
    }

    /// Validation messages, empty for every other variant.
    #[must_use]
    pub fn validation_errors(&self) -> &[String] {
        match self {
            Self::Validation { errors } => errors,
            _ => &[],
        }
    }
}

impl From<StoreError> for TicketError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { id } => Self::NotFound { id },
            StoreError::MalformedId { id } => Self::MalformedId { id },
            other => Self::Storage(other),
        }
    }
}
