//! Error types for report synchronization.

use crate::types::{ReportId, ReportStatus, Role};
use chrono::NaiveDate;
use thiserror::Error;

/// Failure talking to the Report Service or identity service
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ServiceError {
    /// Request never produced a response
    #[error("Request failed: {0}")]
    Transport(String),

    /// Service answered with a status other than the expected one
    #[error("{message}")]
    Rejected {
        /// HTTP status code
        status: u16,
        /// Message from the error body, verbatim
        message: String,
    },

    /// Response body did not have the expected shape
    #[error("Failed to parse response: {0}")]
    Decode(String),

    /// Session token missing or no longer accepted (401)
    #[error("{message}")]
    Unauthorized {
        /// Message from the error body, or "Unauthorized"
        message: String,
    },
}

impl ServiceError {
    /// Message the service sent with a rejection, if any
    #[must_use]
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::Rejected { message, .. } | Self::Unauthorized { message } if !message.is_empty() => {
                Some(message)
            },
            _ => None,
        }
    }
}

/// Input rejected before any request is made
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Required field is empty
    #[error("{0} is required")]
    MissingField(&'static str),

    /// Incident date lies after today
    #[error("Incident date {incident} cannot be in the future (today is {today})")]
    FutureIncidentDate {
        /// Date entered
        incident: NaiveDate,
        /// Today's date per the environment clock
        today: NaiveDate,
    },

    /// Update carries no field
    #[error("No data to update")]
    EmptyChanges,

    /// Status change not on the workflow graph
    #[error("Cannot move a report from {from} to {to}")]
    IllegalTransition {
        /// Current status
        from: ReportStatus,
        /// Requested status
        to: ReportStatus,
    },
}

/// Operation refused by the lifecycle policy
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PolicyViolation {
    /// Report left the editable statuses
    #[error("Report {id} is {} and can no longer be modified", status.label())]
    Immutable {
        /// Report concerned
        id: ReportId,
        /// Its current status
        status: ReportStatus,
    },

    /// Role may not perform the action
    #[error("The {role} role may not {action}")]
    Forbidden {
        /// Acting role
        role: Role,
        /// What was attempted
        action: &'static str,
    },

    /// Another operation on the same report has not settled
    #[error("Report {id} has an operation in progress")]
    Busy {
        /// Report concerned
        id: ReportId,
    },

    /// A creation request has not settled
    #[error("A report submission is already in progress")]
    SubmissionInProgress,
}

/// Everything a sync operation can fail with
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SyncError {
    /// Input rejected locally
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Refused by the lifecycle policy
    #[error(transparent)]
    Policy(#[from] PolicyViolation),

    /// Remote call failed
    #[error(transparent)]
    Service(#[from] ServiceError),

    /// Report is not in the store
    #[error("Report {0} not found")]
    NotFound(ReportId),
}

/// Result alias for sync operations
pub type Result<T> = std::result::Result<T, SyncError>;
