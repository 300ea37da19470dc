//! Report Service abstraction.
//!
//! The Report Service is the remote authority over reports. The sync
//! controller only talks to it through [`ReportService`], so views can run
//! against the HTTP client in production and an in-memory mock in tests.

use crate::error::ServiceError;
use crate::types::{
    calendar_date, Coordinates, Location, Report, ReportChanges, ReportId, ReportStatus,
    ReportType, UserId,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize, Serializer};
use std::future::Future;
use std::pin::Pin;

pub mod http;

pub use http::HttpReportService;

/// Result type for Report Service calls
pub type ServiceResult<T> = Result<T, ServiceError>;

/// Boxed future returned by Report Service calls
pub type ServiceFuture<T> = Pin<Box<dyn Future<Output = ServiceResult<T>> + Send>>;

/// Remote report authority
///
/// Every call either succeeds with the documented status or fails; the
/// controller never applies a change the service has not confirmed (apart
/// from rebuilding a created report from its own request).
pub trait ReportService: Send + Sync {
    /// Fetch every report
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the body cannot be decoded
    fn fetch_all(&self) -> ServiceFuture<Vec<Report>>;

    /// Fetch the reports filed by one submitter
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the body cannot be decoded
    fn fetch_for_user(&self, user_id: &UserId) -> ServiceFuture<Vec<Report>>;

    /// Create a report, returning the id the service assigned
    ///
    /// # Errors
    ///
    /// Returns error unless the service answers `201 Created`
    fn create(&self, report: &NewReport) -> ServiceFuture<CreatedReport>;

    /// Apply a partial update
    ///
    /// # Errors
    ///
    /// Returns error unless the service answers `200 OK`
    fn update(&self, id: &ReportId, changes: &ReportChanges) -> ServiceFuture<()>;

    /// Move a report to another status
    ///
    /// # Errors
    ///
    /// Returns error unless the service answers `200 OK`
    fn set_status(&self, id: &ReportId, status: ReportStatus) -> ServiceFuture<()>;

    /// Delete a report
    ///
    /// # Errors
    ///
    /// Returns error unless the service answers `200 OK`
    fn delete(&self, id: &ReportId) -> ServiceFuture<()>;
}

#[allow(clippy::ref_option)] // serde's `serialize_with` hands us `&Option<T>`
fn as_coordinates<S: Serializer>(location: &Option<Location>, serializer: S) -> Result<S::Ok, S::Error> {
    Coordinates::from(*location).serialize(serializer)
}

/// Creation request body
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewReport {
    /// Kind of report
    #[serde(rename = "type")]
    pub report_type: ReportType,
    /// Short summary
    pub title: String,
    /// Full account
    pub description: String,
    /// When it happened
    #[serde(serialize_with = "calendar_date::serialize")]
    pub incident_date: NaiveDate,
    /// Filing date (today)
    #[serde(serialize_with = "calendar_date::serialize")]
    pub report_date: NaiveDate,
    /// Where it happened; an unknown location is sent as an empty object
    #[serde(serialize_with = "as_coordinates")]
    pub location: Option<Location>,
    /// Submitting user
    pub user_id: UserId,
}

impl NewReport {
    /// Rebuild the created report locally from the request and the id the
    /// service assigned
    #[must_use]
    pub fn into_report(self, id: ReportId) -> Report {
        Report {
            id,
            report_type: self.report_type,
            status: ReportStatus::Pending,
            title: self.title,
            description: self.description,
            location: self.location,
            incident_date: self.incident_date,
            report_date: Some(self.report_date),
            images: Vec::new(),
        }
    }
}

/// What the service returns for a created report
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CreatedReport {
    /// Assigned identifier
    pub id: ReportId,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)] // Test code can use unwrap
mod tests {
    use super::*;
    use serde_json::json;

    fn request(location: Option<Location>) -> NewReport {
        NewReport {
            report_type: ReportType::RedFlag,
            title: "Bribe at checkpoint".to_string(),
            description: "Officer demanded cash".to_string(),
            incident_date: NaiveDate::from_ymd_opt(2024, 12, 30).unwrap(),
            report_date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            location,
            user_id: UserId::new("42"),
        }
    }

    #[test]
    fn test_new_report_body() {
        let body = serde_json::to_value(request(Some(Location::new(9.05, 7.49)))).unwrap();
        assert_eq!(
            body,
            json!({
                "type": "RED_FLAG",
                "title": "Bribe at checkpoint",
                "description": "Officer demanded cash",
                "incidentDate": "2024-12-30",
                "reportDate": "2025-01-01",
                "location": { "latitude": 9.05, "longitude": 7.49 },
                "userId": "42"
            })
        );
    }

    #[test]
    fn test_unknown_location_sent_as_empty_object() {
        let body = serde_json::to_value(request(None)).unwrap();
        assert_eq!(body["location"], json!({}));
    }

    #[test]
    fn test_into_report_is_pending_with_server_id() {
        let report = request(None).into_report(ReportId::new("r-9"));
        assert_eq!(report.id, ReportId::new("r-9"));
        assert_eq!(report.status, ReportStatus::Pending);
        assert_eq!(report.report_date, NaiveDate::from_ymd_opt(2025, 1, 1));
        assert!(report.images.is_empty());
    }
}
