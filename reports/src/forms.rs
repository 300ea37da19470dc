//! Report creation and edit forms.

use crate::types::{Location, Report, ReportChanges, ReportId, ReportType};
use chrono::NaiveDate;

/// Report being composed (status `draft`)
///
/// The report date is not part of the form: it is stamped from the clock
/// when the draft is submitted. Images are never attached.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ReportDraft {
    /// Kind of report
    pub report_type: ReportType,
    /// Short summary
    pub title: String,
    /// Full account
    pub description: String,
    /// When it happened
    pub incident_date: Option<NaiveDate>,
    /// Where it happened
    pub location: Option<Location>,
}

impl ReportDraft {
    /// Start a draft of the given type
    #[must_use]
    pub fn new(report_type: ReportType) -> Self {
        Self {
            report_type,
            ..Self::default()
        }
    }

    /// Set the title
    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Set the description
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set the incident date
    #[must_use]
    pub fn incident_date(mut self, date: NaiveDate) -> Self {
        self.incident_date = Some(date);
        self
    }

    /// Set the location
    #[must_use]
    pub fn location(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }
}

/// Edit form for an existing report, seeded from its current values
#[derive(Debug, Clone, PartialEq)]
pub struct EditForm {
    /// Report being edited
    pub id: ReportId,
    /// Title
    pub title: String,
    /// Description
    pub description: String,
    /// Incident date
    pub incident_date: NaiveDate,
    /// Location
    pub location: Option<Location>,
}

impl EditForm {
    /// Seed a form from a report
    #[must_use]
    pub fn from_report(report: &Report) -> Self {
        Self {
            id: report.id.clone(),
            title: report.title.clone(),
            description: report.description.clone(),
            incident_date: report.incident_date,
            location: report.location,
        }
    }

    /// Fields that differ from `original`
    #[must_use]
    pub fn changes_from(&self, original: &Report) -> ReportChanges {
        ReportChanges {
            title: (self.title != original.title).then(|| self.title.clone()),
            description: (self.description != original.description)
                .then(|| self.description.clone()),
            incident_date: (self.incident_date != original.incident_date)
                .then_some(self.incident_date),
            location: self.location.filter(|l| Some(*l) != original.location),
            status: None,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)] // Test code can use unwrap
mod tests {
    use super::*;
    use crate::types::ReportStatus;

    fn report() -> Report {
        Report {
            id: ReportId::new("5"),
            report_type: ReportType::Intervention,
            status: ReportStatus::Pending,
            title: "Flooded road".to_string(),
            description: "Drain blocked".to_string(),
            location: Some(Location::new(1.0, 2.0)),
            incident_date: NaiveDate::from_ymd_opt(2024, 8, 1).unwrap(),
            report_date: NaiveDate::from_ymd_opt(2024, 8, 2),
            images: Vec::new(),
        }
    }

    #[test]
    fn test_draft_defaults_to_red_flag() {
        let draft = ReportDraft::default();
        assert_eq!(draft.report_type, ReportType::RedFlag);
        assert!(draft.title.is_empty());
        assert!(draft.location.is_none());
    }

    #[test]
    fn test_unchanged_form_yields_no_changes() {
        let report = report();
        assert!(EditForm::from_report(&report).changes_from(&report).is_empty());
    }

    #[test]
    fn test_changes_carry_only_edited_fields() {
        let report = report();
        let mut form = EditForm::from_report(&report);
        form.description = "Drain cleared, road still closed".to_string();
        form.location = Some(Location::new(1.5, 2.0));

        let changes = form.changes_from(&report);
        assert_eq!(changes.title, None);
        assert_eq!(changes.description.as_deref(), Some("Drain cleared, road still closed"));
        assert_eq!(changes.location, Some(Location::new(1.5, 2.0)));
        assert_eq!(changes.incident_date, None);
    }
}
