//! State owned by one mounted report view.

use crate::error::SyncError;
use crate::filter::project;
use crate::forms::{EditForm, ReportDraft};
use crate::store::ReportStore;
use crate::types::{Report, ReportId, StatusFacet};
use std::collections::HashSet;

/// Severity of a notification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    /// Operation confirmed
    Success,
    /// Operation refused or failed
    Error,
}

/// Transient message for the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    /// Handle for dismissal
    pub id: u64,
    /// Severity
    pub level: NotificationLevel,
    /// Text shown to the user
    pub message: String,
}

/// Report view state
#[derive(Debug, Clone, Default)]
pub struct ReportsState {
    /// Reports known to the view
    pub reports: ReportStore,
    /// View filter search term
    pub search_term: String,
    /// View filter status facet
    pub status_facet: StatusFacet,
    /// Creation form
    pub draft: ReportDraft,
    /// A creation request is outstanding
    pub submitting: bool,
    /// Open edit form, if any
    pub editing: Option<EditForm>,
    /// Reports with a mutation outstanding
    pub in_flight: HashSet<ReportId>,
    /// A fetch is outstanding
    pub loading: bool,
    /// Why the last fetch failed (cleared by a successful one)
    pub load_error: Option<String>,
    /// A location lookup is outstanding
    pub locating: bool,
    /// Why the last location lookup failed
    pub location_error: Option<String>,
    /// Last refused or failed operation
    pub last_error: Option<SyncError>,
    /// Notifications not yet dismissed, oldest first
    pub notifications: Vec<Notification>,
    next_notification: u64,
}

impl ReportsState {
    /// Reports passing the current search term and status facet
    #[must_use]
    pub fn visible_reports(&self) -> Vec<&Report> {
        project(&self.reports, &self.search_term, self.status_facet)
    }

    /// Whether a mutation of `id` is outstanding
    #[must_use]
    pub fn is_busy(&self, id: &ReportId) -> bool {
        self.in_flight.contains(id)
    }

    /// Most recent notification
    #[must_use]
    pub fn latest_notification(&self) -> Option<&Notification> {
        self.notifications.last()
    }

    pub(crate) fn push_notification(&mut self, level: NotificationLevel, message: impl Into<String>) -> u64 {
        self.next_notification += 1;
        let id = self.next_notification;
        self.notifications.push(Notification {
            id,
            level,
            message: message.into(),
        });
        id
    }

    pub(crate) fn dismiss_notification(&mut self, id: u64) {
        self.notifications.retain(|n| n.id != id);
    }
}
