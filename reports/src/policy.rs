//! Lifecycle policy: which statuses exist, which moves are legal and who may
//! make them.
//!
//! ```text
//! draft               → PENDING                (on confirmed creation)
//! PENDING             → UNDER_INVESTIGATION | RESOLVED | REJECTED
//! UNDER_INVESTIGATION → RESOLVED | REJECTED
//! RESOLVED, REJECTED  : terminal
//! ```
//!
//! `draft → PENDING` happens only when the Report Service confirms a
//! creation; nobody selects it. All other moves belong to administrators.

use crate::error::{PolicyViolation, SyncError, ValidationError};
use crate::types::{Report, ReportStatus, Role};
use std::str::FromStr;

/// How strictly administrator status changes are checked before sending
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AdminTransitionMode {
    /// Only moves along the workflow graph
    #[default]
    Strict,
    /// Any submitted status from any submitted status; the Report Service
    /// has the final word
    Permissive,
}

impl FromStr for AdminTransitionMode {
    type Err = crate::types::UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "strict" => Ok(Self::Strict),
            "permissive" => Ok(Self::Permissive),
            _ => Err(crate::types::UnknownVariant(s.to_string())),
        }
    }
}

/// Whether a report in `status` may still be edited or deleted
#[must_use]
pub const fn status_is_mutable(status: ReportStatus) -> bool {
    matches!(status, ReportStatus::Draft | ReportStatus::Pending)
}

/// Whether `report` may still be edited or deleted
#[must_use]
pub const fn can_mutate(report: &Report) -> bool {
    status_is_mutable(report.status)
}

/// Whether no further move leaves `status`
#[must_use]
pub const fn is_terminal(status: ReportStatus) -> bool {
    matches!(status, ReportStatus::Resolved | ReportStatus::Rejected)
}

/// Administrator moves out of `status` on the workflow graph
#[must_use]
pub const fn successors(status: ReportStatus) -> &'static [ReportStatus] {
    match status {
        ReportStatus::Pending => &[
            ReportStatus::UnderInvestigation,
            ReportStatus::Resolved,
            ReportStatus::Rejected,
        ],
        ReportStatus::UnderInvestigation => &[ReportStatus::Resolved, ReportStatus::Rejected],
        ReportStatus::Draft | ReportStatus::Resolved | ReportStatus::Rejected => &[],
    }
}

/// Statuses `role` may move a report in `from` to, in display order
#[must_use]
pub fn allowed_transitions(
    from: ReportStatus,
    role: Role,
    mode: AdminTransitionMode,
) -> Vec<ReportStatus> {
    match (role, mode) {
        (Role::Submitter, _) => Vec::new(),
        (Role::Administrator, AdminTransitionMode::Strict) => successors(from).to_vec(),
        (Role::Administrator, AdminTransitionMode::Permissive) => {
            if from == ReportStatus::Draft {
                return Vec::new();
            }
            ReportStatus::SUBMITTED
                .into_iter()
                .filter(|status| *status != from)
                .collect()
        }
    }
}

/// Check a requested status change before it is sent
///
/// # Errors
///
/// - [`PolicyViolation::Forbidden`] if `role` is not an administrator
/// - [`ValidationError::IllegalTransition`] if `to` is not reachable from
///   `from` under `mode`
pub fn check_transition(
    from: ReportStatus,
    to: ReportStatus,
    role: Role,
    mode: AdminTransitionMode,
) -> Result<(), SyncError> {
    if role != Role::Administrator {
        return Err(PolicyViolation::Forbidden {
            role,
            action: "change a report's status",
        }
        .into());
    }

    if allowed_transitions(from, role, mode).contains(&to) {
        Ok(())
    } else {
        Err(ValidationError::IllegalTransition { from, to }.into())
    }
}
