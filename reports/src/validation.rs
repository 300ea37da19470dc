//! Pre-flight checks. A failing check means no request is sent.

use crate::error::ValidationError;
use crate::forms::ReportDraft;
use crate::types::ReportChanges;
use chrono::NaiveDate;

/// Check a draft before creation, returning its incident date
///
/// # Errors
///
/// - [`ValidationError::MissingField`] for a blank title or description or
///   an unset incident date
/// - [`ValidationError::FutureIncidentDate`] if the incident date is after
///   `today`
pub fn validate_draft(draft: &ReportDraft, today: NaiveDate) -> Result<NaiveDate, ValidationError> {
    require_text("title", &draft.title)?;
    require_text("description", &draft.description)?;
    let incident = draft
        .incident_date
        .ok_or(ValidationError::MissingField("incident date"))?;
    not_in_future(incident, today)?;
    Ok(incident)
}

/// Check a partial update before sending it
///
/// # Errors
///
/// - [`ValidationError::EmptyChanges`] if no field is set
/// - [`ValidationError::MissingField`] if a text field is set to blank
/// - [`ValidationError::FutureIncidentDate`] if the new incident date is
///   after `today`
pub fn validate_changes(changes: &ReportChanges, today: NaiveDate) -> Result<(), ValidationError> {
    if changes.is_empty() {
        return Err(ValidationError::EmptyChanges);
    }
    if let Some(title) = &changes.title {
        require_text("title", title)?;
    }
    if let Some(description) = &changes.description {
        require_text("description", description)?;
    }
    if let Some(incident) = changes.incident_date {
        not_in_future(incident, today)?;
    }
    Ok(())
}

fn require_text(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError::MissingField(field))
    } else {
        Ok(())
    }
}

fn not_in_future(incident: NaiveDate, today: NaiveDate) -> Result<(), ValidationError> {
    if incident > today {
        Err(ValidationError::FutureIncidentDate { incident, today })
    } else {
        Ok(())
    }
}
