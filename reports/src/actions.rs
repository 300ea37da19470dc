//! Actions of the sync controller.
//!
//! Commands come from the view; outcome events are produced by effects once
//! the Report Service (or the geolocation collaborator) has answered.

use crate::error::ServiceError;
use crate::forms::{EditForm, ReportDraft};
use crate::geolocation::LocationError;
use crate::types::{Location, Report, ReportChanges, ReportId, ReportStatus, StatusFacet};

/// Everything the sync controller reacts to
#[derive(Clone, Debug, PartialEq)]
pub enum ReportsAction {
    // ========== Commands ==========
    /// Load the collection for the session's scope
    Fetch,
    /// Replace the creation form
    SetDraft {
        /// New form contents
        draft: ReportDraft,
    },
    /// Create a report from the current draft
    SubmitDraft,
    /// Ask the geolocation collaborator for the current position
    RequestLocation,
    /// Open the edit form for a report
    BeginEdit {
        /// Report to edit
        id: ReportId,
    },
    /// Replace the open edit form
    SetEditForm {
        /// New form contents
        form: EditForm,
    },
    /// Send the fields changed in the open edit form
    SubmitEdit,
    /// Close the edit form without sending
    CancelEdit,
    /// Send a partial update
    UpdateReport {
        /// Report to update
        id: ReportId,
        /// Fields to change
        changes: ReportChanges,
    },
    /// Delete a report
    DeleteReport {
        /// Report to delete
        id: ReportId,
    },
    /// Move a report to another status (administrators)
    ChangeStatus {
        /// Report to move
        id: ReportId,
        /// Target status
        status: ReportStatus,
    },
    /// Set the view filter's search term
    SetSearchTerm {
        /// Case-insensitive substring
        term: String,
    },
    /// Set the view filter's status facet
    SetStatusFacet {
        /// Facet to apply
        facet: StatusFacet,
    },
    /// Remove a notification
    DismissNotification {
        /// Notification to remove
        id: u64,
    },

    // ========== Outcomes ==========
    /// Fetch succeeded
    ReportsLoaded {
        /// Full collection for the scope
        reports: Vec<Report>,
    },
    /// Fetch failed
    FetchFailed {
        /// Cause
        error: ServiceError,
    },
    /// Creation confirmed; the report is rebuilt from the request
    ReportCreated {
        /// Created report with its service-assigned id
        report: Report,
    },
    /// Creation failed
    CreateFailed {
        /// Cause
        error: ServiceError,
    },
    /// Update confirmed
    ReportUpdated {
        /// Updated report
        id: ReportId,
        /// Changes the service accepted
        changes: ReportChanges,
    },
    /// Update failed
    UpdateFailed {
        /// Report concerned
        id: ReportId,
        /// Cause
        error: ServiceError,
    },
    /// Deletion confirmed
    ReportDeleted {
        /// Deleted report
        id: ReportId,
    },
    /// Deletion failed
    DeleteFailed {
        /// Report concerned
        id: ReportId,
        /// Cause
        error: ServiceError,
    },
    /// Status change confirmed
    StatusChanged {
        /// Report concerned
        id: ReportId,
        /// New status
        status: ReportStatus,
    },
    /// Status change failed
    StatusChangeFailed {
        /// Report concerned
        id: ReportId,
        /// Cause
        error: ServiceError,
    },
    /// Position obtained
    LocationAcquired {
        /// Current position
        location: Location,
    },
    /// Position could not be obtained
    LocationUnavailable {
        /// Cause
        error: LocationError,
    },
}

impl ReportsAction {
    /// Whether this action reports the answer to a remote call
    #[must_use]
    pub const fn is_outcome(&self) -> bool {
        matches!(
            self,
            Self::ReportsLoaded { .. }
                | Self::FetchFailed { .. }
                | Self::ReportCreated { .. }
                | Self::CreateFailed { .. }
                | Self::ReportUpdated { .. }
                | Self::UpdateFailed { .. }
                | Self::ReportDeleted { .. }
                | Self::DeleteFailed { .. }
                | Self::StatusChanged { .. }
                | Self::StatusChangeFailed { .. }
                | Self::LocationAcquired { .. }
                | Self::LocationUnavailable { .. }
        )
    }
}
