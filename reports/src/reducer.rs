//! Sync controller reducer.
//!
//! Commands are checked against the lifecycle policy and validation rules
//! before any remote call is described. The store only changes when an
//! outcome arrives: created reports are rebuilt from the request plus the
//! service-assigned id, every other mutation is applied once confirmed.
//!
//! At most one mutation per report is outstanding at a time; the ids are
//! tracked in [`ReportsState::in_flight`].

use crate::actions::ReportsAction;
use crate::environment::ReportsEnvironment;
use crate::error::{PolicyViolation, ServiceError, SyncError};
use crate::forms::{EditForm, ReportDraft};
use crate::geolocation::LocationError;
use crate::policy::{can_mutate, check_transition};
use crate::service::NewReport;
use crate::session::ViewScope;
use crate::state::{NotificationLevel, ReportsState};
use crate::types::{Report, ReportChanges, ReportId, ReportStatus};
use crate::validation::{validate_changes, validate_draft};
use redflag_core::{async_effect, delay, effect::Effect, reducer::Reducer, smallvec, SmallVec};

type Effects = SmallVec<[Effect<ReportsAction>; 4]>;

const FETCH_FAILED: &str = "Failed to fetch reports. Please try again later.";
const CREATE_FAILED: &str = "An unexpected error occurred. Please try again.";
const UPDATE_FAILED: &str = "Failed to update report";
const DELETE_FAILED: &str = "Failed to delete report. Please try again.";
const STATUS_FAILED: &str = "Failed to update status. Please try again.";
const LOCATION_FAILED: &str = "Failed to get location. Please try again.";

/// Reducer driving one report view
#[derive(Clone, Debug, Default)]
pub struct ReportsReducer;

impl ReportsReducer {
    /// Creates a new `ReportsReducer`
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn notify(
        state: &mut ReportsState,
        env: &ReportsEnvironment,
        level: NotificationLevel,
        message: impl Into<String>,
    ) -> Effects {
        let id = state.push_notification(level, message);
        match env.notification_ttl {
            Some(ttl) => smallvec![delay! {
                duration: ttl,
                action: ReportsAction::DismissNotification { id }
            }],
            None => SmallVec::new(),
        }
    }

    /// Record a refused command. No request is issued.
    fn refuse(state: &mut ReportsState, env: &ReportsEnvironment, error: SyncError) -> Effects {
        tracing::warn!(%error, "Command refused");
        metrics::counter!("reports.commands.refused").increment(1);
        let message = error.to_string();
        state.last_error = Some(error);
        Self::notify(state, env, NotificationLevel::Error, message)
    }

    /// Record a failed remote call
    fn failed(
        state: &mut ReportsState,
        env: &ReportsEnvironment,
        error: ServiceError,
        message: String,
    ) -> Effects {
        tracing::warn!(%error, "Report Service call failed");
        metrics::counter!("reports.service.failures").increment(1);
        state.last_error = Some(error.into());
        Self::notify(state, env, NotificationLevel::Error, message)
    }

    fn succeeded(state: &mut ReportsState, env: &ReportsEnvironment, message: &str) -> Effects {
        state.last_error = None;
        Self::notify(state, env, NotificationLevel::Success, message)
    }

    /// Look up a report that is about to be mutated
    fn mutable_target<'a>(state: &'a ReportsState, id: &ReportId) -> Result<&'a Report, SyncError> {
        let report = state
            .reports
            .get(id)
            .ok_or_else(|| SyncError::NotFound(id.clone()))?;
        if state.is_busy(id) {
            return Err(PolicyViolation::Busy { id: id.clone() }.into());
        }
        if !can_mutate(report) {
            return Err(PolicyViolation::Immutable {
                id: id.clone(),
                status: report.status,
            }
            .into());
        }
        Ok(report)
    }

    // ========== Fetch ==========

    fn fetch(state: &mut ReportsState, env: &ReportsEnvironment) -> Effects {
        state.loading = true;
        state.load_error = None;

        let call = match env.session.scope() {
            ViewScope::AllReports => env.service.fetch_all(),
            ViewScope::OwnReports(user_id) => env.service.fetch_for_user(&user_id),
        };
        tracing::debug!(role = %env.session.role, "Fetching reports");

        smallvec![async_effect! {
            match call.await {
                Ok(reports) => Some(ReportsAction::ReportsLoaded { reports }),
                Err(error) => Some(ReportsAction::FetchFailed { error }),
            }
        }]
    }

    // ========== Create ==========

    fn submit_draft(state: &mut ReportsState, env: &ReportsEnvironment) -> Effects {
        if state.submitting {
            return Self::refuse(state, env, PolicyViolation::SubmissionInProgress.into());
        }

        let today = env.clock.today();
        let incident_date = match validate_draft(&state.draft, today) {
            Ok(date) => date,
            Err(error) => return Self::refuse(state, env, error.into()),
        };

        let request = NewReport {
            report_type: state.draft.report_type,
            title: state.draft.title.clone(),
            description: state.draft.description.clone(),
            incident_date,
            report_date: today,
            location: state.draft.location,
            user_id: env.session.user_id.clone(),
        };
        state.submitting = true;
        state.last_error = None;

        let call = env.service.create(&request);
        smallvec![async_effect! {
            match call.await {
                Ok(created) => Some(ReportsAction::ReportCreated {
                    report: request.into_report(created.id),
                }),
                Err(error) => Some(ReportsAction::CreateFailed { error }),
            }
        }]
    }

    // ========== Update ==========

    fn update(
        state: &mut ReportsState,
        env: &ReportsEnvironment,
        id: ReportId,
        changes: ReportChanges,
    ) -> Effects {
        if let Err(error) = Self::mutable_target(state, &id) {
            return Self::refuse(state, env, error);
        }
        if changes.status.is_some() {
            let error = PolicyViolation::Forbidden {
                role: env.session.role,
                action: "change a report's status through an edit",
            };
            return Self::refuse(state, env, error.into());
        }
        if let Err(error) = validate_changes(&changes, env.clock.today()) {
            return Self::refuse(state, env, error.into());
        }

        tracing::debug!(report_id = %id, "Updating report");
        state.in_flight.insert(id.clone());

        let call = env.service.update(&id, &changes);
        smallvec![async_effect! {
            match call.await {
                Ok(()) => Some(ReportsAction::ReportUpdated { id, changes }),
                Err(error) => Some(ReportsAction::UpdateFailed { id, error }),
            }
        }]
    }

    fn submit_edit(state: &mut ReportsState, env: &ReportsEnvironment) -> Effects {
        let Some(form) = &state.editing else {
            return SmallVec::new();
        };
        let id = form.id.clone();
        let changes = match state.reports.get(&id) {
            Some(original) => form.changes_from(original),
            None => return Self::refuse(state, env, SyncError::NotFound(id)),
        };
        Self::update(state, env, id, changes)
    }

    // ========== Delete ==========

    fn delete(state: &mut ReportsState, env: &ReportsEnvironment, id: ReportId) -> Effects {
        if let Err(error) = Self::mutable_target(state, &id) {
            return Self::refuse(state, env, error);
        }

        tracing::debug!(report_id = %id, "Deleting report");
        state.in_flight.insert(id.clone());

        let call = env.service.delete(&id);
        smallvec![async_effect! {
            match call.await {
                Ok(()) => Some(ReportsAction::ReportDeleted { id }),
                Err(error) => Some(ReportsAction::DeleteFailed { id, error }),
            }
        }]
    }

    // ========== Status change ==========

    fn change_status(
        state: &mut ReportsState,
        env: &ReportsEnvironment,
        id: ReportId,
        status: ReportStatus,
    ) -> Effects {
        let Some(current) = state.reports.get(&id).map(|report| report.status) else {
            return Self::refuse(state, env, SyncError::NotFound(id));
        };
        if state.is_busy(&id) {
            return Self::refuse(state, env, PolicyViolation::Busy { id }.into());
        }
        if let Err(error) = check_transition(current, status, env.session.role, env.transitions) {
            return Self::refuse(state, env, error);
        }

        tracing::debug!(report_id = %id, from = %current, to = %status, "Changing report status");
        state.in_flight.insert(id.clone());

        let call = env.service.set_status(&id, status);
        smallvec![async_effect! {
            match call.await {
                Ok(()) => Some(ReportsAction::StatusChanged { id, status }),
                Err(error) => Some(ReportsAction::StatusChangeFailed { id, error }),
            }
        }]
    }

    // ========== Geolocation ==========

    fn request_location(state: &mut ReportsState, env: &ReportsEnvironment) -> Effects {
        if state.locating {
            return SmallVec::new();
        }
        state.locating = true;
        state.location_error = None;

        let lookup = env.locator.current_location();
        smallvec![async_effect! {
            match lookup.await {
                Ok(location) => Some(ReportsAction::LocationAcquired { location }),
                Err(error) => Some(ReportsAction::LocationUnavailable { error }),
            }
        }]
    }
}

impl Reducer for ReportsReducer {
    type State = ReportsState;
    type Action = ReportsAction;
    type Environment = ReportsEnvironment;

    #[allow(clippy::too_many_lines)] // One arm per action
    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            // ========== Commands ==========
            ReportsAction::Fetch => Self::fetch(state, env),

            ReportsAction::SetDraft { draft } => {
                state.draft = draft;
                SmallVec::new()
            },

            ReportsAction::SubmitDraft => Self::submit_draft(state, env),

            ReportsAction::RequestLocation => Self::request_location(state, env),

            ReportsAction::BeginEdit { id } => match Self::mutable_target(state, &id) {
                Ok(report) => {
                    let form = EditForm::from_report(report);
                    state.editing = Some(form);
                    SmallVec::new()
                },
                Err(error) => Self::refuse(state, env, error),
            },

            ReportsAction::SetEditForm { form } => {
                if let Some(editing) = state.editing.as_mut().filter(|e| e.id == form.id) {
                    *editing = form;
                }
                SmallVec::new()
            },

            ReportsAction::SubmitEdit => Self::submit_edit(state, env),

            ReportsAction::CancelEdit => {
                state.editing = None;
                SmallVec::new()
            },

            ReportsAction::UpdateReport { id, changes } => Self::update(state, env, id, changes),

            ReportsAction::DeleteReport { id } => Self::delete(state, env, id),

            ReportsAction::ChangeStatus { id, status } => {
                Self::change_status(state, env, id, status)
            },

            ReportsAction::SetSearchTerm { term } => {
                state.search_term = term;
                SmallVec::new()
            },

            ReportsAction::SetStatusFacet { facet } => {
                state.status_facet = facet;
                SmallVec::new()
            },

            ReportsAction::DismissNotification { id } => {
                state.dismiss_notification(id);
                SmallVec::new()
            },

            // ========== Outcomes ==========
            ReportsAction::ReportsLoaded { reports } => {
                tracing::debug!(count = reports.len(), "Reports loaded");
                state.loading = false;
                state.load_error = None;
                state.reports.load(reports);
                SmallVec::new()
            },

            ReportsAction::FetchFailed { error } => {
                state.loading = false;
                state.load_error = Some(FETCH_FAILED.to_string());
                Self::failed(state, env, error, FETCH_FAILED.to_string())
            },

            ReportsAction::ReportCreated { report } => {
                tracing::debug!(report_id = %report.id, "Report created");
                state.submitting = false;
                state.reports.insert(report);
                state.draft = ReportDraft::new(state.draft.report_type);
                state.location_error = None;
                Self::succeeded(state, env, "Report submitted successfully")
            },

            ReportsAction::CreateFailed { error } => {
                state.submitting = false;
                let message = error.server_message().unwrap_or(CREATE_FAILED).to_string();
                Self::failed(state, env, error, message)
            },

            ReportsAction::ReportUpdated { id, changes } => {
                state.in_flight.remove(&id);
                state.reports.patch(&id, &changes);
                if state.editing.as_ref().is_some_and(|form| form.id == id) {
                    state.editing = None;
                }
                Self::succeeded(state, env, "Report updated successfully")
            },

            ReportsAction::UpdateFailed { id, error } => {
                state.in_flight.remove(&id);
                let message = error.server_message().unwrap_or(UPDATE_FAILED).to_string();
                Self::failed(state, env, error, message)
            },

            ReportsAction::ReportDeleted { id } => {
                state.in_flight.remove(&id);
                state.reports.remove(&id);
                if state.editing.as_ref().is_some_and(|form| form.id == id) {
                    state.editing = None;
                }
                Self::succeeded(state, env, "Report deleted successfully")
            },

            ReportsAction::DeleteFailed { id, error } => {
                state.in_flight.remove(&id);
                let message = error.server_message().unwrap_or(DELETE_FAILED).to_string();
                Self::failed(state, env, error, message)
            },

            ReportsAction::StatusChanged { id, status } => {
                state.in_flight.remove(&id);
                state.reports.patch(&id, &ReportChanges::status(status));
                Self::succeeded(state, env, "Status updated successfully")
            },

            ReportsAction::StatusChangeFailed { id, error } => {
                state.in_flight.remove(&id);
                let message = error.server_message().map_or_else(
                    || STATUS_FAILED.to_string(),
                    |reason| format!("Failed to update status: {reason}"),
                );
                Self::failed(state, env, error, message)
            },

            ReportsAction::LocationAcquired { location } => {
                state.locating = false;
                state.location_error = None;
                match state.editing.as_mut() {
                    Some(form) => form.location = Some(location),
                    None => state.draft.location = Some(location),
                }
                Self::notify(state, env, NotificationLevel::Success, "Location fetched successfully")
            },

            ReportsAction::LocationUnavailable { error } => {
                tracing::warn!(%error, "Location unavailable");
                state.locating = false;
                state.location_error = Some(error.to_string());
                let message = match error {
                    LocationError::Unsupported => error.to_string(),
                    LocationError::Unavailable(_) => LOCATION_FAILED.to_string(),
                };
                Self::notify(state, env, NotificationLevel::Error, message)
            },
        }
    }
}
