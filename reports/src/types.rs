//! Report domain model.
//!
//! These types mirror the Report Service's JSON payloads. Identifiers are
//! opaque: the service has been seen to emit them both as strings and as
//! numbers, so both are accepted and kept as text.

use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// Identifiers
// ============================================================================

/// Accepts a JSON string or integer and keeps it as text.
fn opaque_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Signed(i64),
        Unsigned(u64),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(text) => text,
        Raw::Signed(n) => n.to_string(),
        Raw::Unsigned(n) => n.to_string(),
    })
}

/// Report identifier, assigned by the Report Service
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ReportId(String);

impl ReportId {
    /// Wrap a service-assigned identifier
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Identifier as it appears in request paths
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl<'de> Deserialize<'de> for ReportId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        opaque_id(deserializer).map(Self)
    }
}

impl fmt::Display for ReportId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ReportId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Submitter identifier, issued by the identity service
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    /// Wrap an identity-issued identifier
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Identifier as it appears in request paths
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl<'de> Deserialize<'de> for UserId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        opaque_id(deserializer).map(Self)
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ============================================================================
// Enumerations
// ============================================================================

/// Kind of report. Fixed at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReportType {
    /// Corruption or misconduct
    #[default]
    RedFlag,
    /// Request for government intervention
    Intervention,
}

impl ReportType {
    /// Wire representation
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::RedFlag => "RED_FLAG",
            Self::Intervention => "INTERVENTION",
        }
    }
}

impl fmt::Display for ReportType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReportType {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().replace('-', "_").as_str() {
            "RED_FLAG" | "REDFLAG" => Ok(Self::RedFlag),
            "INTERVENTION" => Ok(Self::Intervention),
            _ => Err(UnknownVariant(s.to_string())),
        }
    }
}

/// Lifecycle status of a report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReportStatus {
    /// Being composed; never sent to the Report Service
    #[serde(rename = "draft")]
    Draft,
    /// Created, awaiting triage
    Pending,
    /// Picked up by an administrator
    UnderInvestigation,
    /// Closed with an outcome (terminal)
    Resolved,
    /// Closed without action (terminal)
    Rejected,
}

impl ReportStatus {
    /// Statuses a report held by the Report Service can have
    pub const SUBMITTED: [Self; 4] = [
        Self::Pending,
        Self::UnderInvestigation,
        Self::Resolved,
        Self::Rejected,
    ];

    /// Wire representation
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Pending => "PENDING",
            Self::UnderInvestigation => "UNDER_INVESTIGATION",
            Self::Resolved => "RESOLVED",
            Self::Rejected => "REJECTED",
        }
    }

    /// Human-readable label
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Draft => "Draft",
            Self::Pending => "Pending",
            Self::UnderInvestigation => "Under Investigation",
            Self::Resolved => "Resolved",
            Self::Rejected => "Rejected",
        }
    }
}

impl fmt::Display for ReportStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReportStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().replace(['-', ' '], "_").as_str() {
            "DRAFT" => Ok(Self::Draft),
            "PENDING" => Ok(Self::Pending),
            "UNDER_INVESTIGATION" => Ok(Self::UnderInvestigation),
            "RESOLVED" => Ok(Self::Resolved),
            "REJECTED" => Ok(Self::Rejected),
            _ => Err(UnknownVariant(s.to_string())),
        }
    }
}

/// Text that names no variant of the enum being parsed
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown value: {0}")]
pub struct UnknownVariant(pub String);

/// Actor role, decided by the identity service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    /// Citizen reporting incidents; sees only their own reports
    Submitter,
    /// Triage staff; sees all reports and moves them through the workflow
    Administrator,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Submitter => "submitter",
            Self::Administrator => "administrator",
        })
    }
}

/// Status facet of the view filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFacet {
    /// No status restriction
    #[default]
    All,
    /// Only reports in this status
    Only(ReportStatus),
}

impl StatusFacet {
    /// Whether `status` passes the facet
    #[must_use]
    pub fn admits(self, status: ReportStatus) -> bool {
        match self {
            Self::All => true,
            Self::Only(wanted) => wanted == status,
        }
    }
}

impl FromStr for StatusFacet {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("all") {
            Ok(Self::All)
        } else {
            s.parse().map(Self::Only)
        }
    }
}

// ============================================================================
// Report
// ============================================================================

/// Geographic position of an incident
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    /// Degrees north (negative is south)
    pub latitude: f64,
    /// Degrees east (negative is west)
    pub longitude: f64,
}

impl Location {
    /// Create a location from signed degrees
    #[must_use]
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// Coordinate pair as it travels over the wire: either half may be missing,
/// and stored values sometimes come back as decimal strings.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub(crate) struct Coordinates {
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "loose_coordinate"
    )]
    pub latitude: Option<f64>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "loose_coordinate"
    )]
    pub longitude: Option<f64>,
}

impl Coordinates {
    pub(crate) fn complete(self) -> Option<Location> {
        Some(Location::new(self.latitude?, self.longitude?))
    }
}

impl From<Option<Location>> for Coordinates {
    fn from(location: Option<Location>) -> Self {
        location.map_or_else(Self::default, |l| Self {
            latitude: Some(l.latitude),
            longitude: Some(l.longitude),
        })
    }
}

fn loose_coordinate<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(f64),
        Text(String),
    }

    match Option::<Raw>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Raw::Number(n)) => Ok(Some(n)),
        Some(Raw::Text(text)) => text
            .trim()
            .parse()
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}

fn partial_location<'de, D>(deserializer: D) -> Result<Option<Location>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Coordinates>::deserialize(deserializer)?.and_then(Coordinates::complete))
}

/// Calendar dates travel as `YYYY-MM-DD`; some stored values come back as
/// full RFC 3339 timestamps, of which only the date part is kept.
pub(crate) mod calendar_date {
    use super::{DateTime, NaiveDate};
    use serde::{Deserialize, Deserializer, Serializer};

    pub(crate) fn parse(raw: &str) -> Result<NaiveDate, chrono::ParseError> {
        NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .or_else(|_| DateTime::parse_from_rfc3339(raw).map(|dt| dt.date_naive()))
    }

    pub(crate) fn serialize<S: Serializer>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(date)
    }

    pub(crate) fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).map_err(serde::de::Error::custom)
    }

    pub(crate) mod option {
        use super::{parse, NaiveDate};
        use serde::{Deserialize, Deserializer, Serializer};

        #[allow(clippy::ref_option)] // serde's `with` hands us `&Option<T>`
        pub(crate) fn serialize<S: Serializer>(
            date: &Option<NaiveDate>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match date {
                Some(date) => serializer.collect_str(date),
                None => serializer.serialize_none(),
            }
        }

        pub(crate) fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<NaiveDate>, D::Error> {
            Option::<String>::deserialize(deserializer)?
                .map(|raw| parse(&raw).map_err(serde::de::Error::custom))
                .transpose()
        }
    }
}

/// A report as known to the client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    /// Service-assigned identifier
    pub id: ReportId,
    /// Kind of report
    #[serde(rename = "type")]
    pub report_type: ReportType,
    /// Lifecycle status
    pub status: ReportStatus,
    /// Short summary
    pub title: String,
    /// Full account
    pub description: String,
    /// Where it happened, if known
    #[serde(default, deserialize_with = "partial_location")]
    pub location: Option<Location>,
    /// When it happened
    #[serde(with = "calendar_date")]
    pub incident_date: NaiveDate,
    /// When it was filed
    #[serde(default, with = "calendar_date::option")]
    pub report_date: Option<NaiveDate>,
    /// Attachment references
    #[serde(default)]
    pub images: Vec<String>,
}

impl Report {
    /// Merge confirmed changes into this report
    pub fn apply(&mut self, changes: &ReportChanges) {
        if let Some(title) = &changes.title {
            self.title.clone_from(title);
        }
        if let Some(description) = &changes.description {
            self.description.clone_from(description);
        }
        if let Some(incident_date) = changes.incident_date {
            self.incident_date = incident_date;
        }
        if let Some(location) = changes.location {
            self.location = Some(location);
        }
        if let Some(status) = changes.status {
            self.status = status;
        }
    }
}

/// Partial update of a report. Absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportChanges {
    /// New title
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// New description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// New incident date
    #[serde(
        skip_serializing_if = "Option::is_none",
        with = "calendar_date::option"
    )]
    pub incident_date: Option<NaiveDate>,
    /// New location
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
    /// New status (administrator workflow only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ReportStatus>,
}

impl ReportChanges {
    /// Change only the status
    #[must_use]
    pub fn status(status: ReportStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    /// Set the title
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set the description
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the incident date
    #[must_use]
    pub fn with_incident_date(mut self, date: NaiveDate) -> Self {
        self.incident_date = Some(date);
        self
    }

    /// Set the location
    #[must_use]
    pub fn with_location(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }

    /// True when no field is set
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.incident_date.is_none()
            && self.location.is_none()
            && self.status.is_none()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)] // Test code can use unwrap
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_report_from_service_json() {
        let report: Report = serde_json::from_value(json!({
            "id": 17,
            "type": "INTERVENTION",
            "status": "UNDER_INVESTIGATION",
            "title": "Broken bridge",
            "description": "Bridge collapsed",
            "location": { "latitude": "6.5244", "longitude": 3.3792 },
            "incidentDate": "2024-11-02T00:00:00.000Z",
            "reportDate": "2024-11-03",
            "images": []
        }))
        .unwrap();

        assert_eq!(report.id, ReportId::new("17"));
        assert_eq!(report.report_type, ReportType::Intervention);
        assert_eq!(report.status, ReportStatus::UnderInvestigation);
        assert_eq!(report.location, Some(Location::new(6.5244, 3.3792)));
        assert_eq!(report.incident_date, NaiveDate::from_ymd_opt(2024, 11, 2).unwrap());
        assert_eq!(report.report_date, NaiveDate::from_ymd_opt(2024, 11, 3));
    }

    #[test]
    fn test_report_with_partial_location() {
        let report: Report = serde_json::from_value(json!({
            "id": "a1",
            "type": "RED_FLAG",
            "status": "PENDING",
            "title": "t",
            "description": "d",
            "location": {},
            "incidentDate": "2024-01-01"
        }))
        .unwrap();

        assert_eq!(report.location, None);
        assert_eq!(report.report_date, None);
        assert!(report.images.is_empty());
    }

    #[test]
    fn test_changes_serialize_only_set_fields() {
        let changes = ReportChanges::default()
            .with_title("New title")
            .with_incident_date(NaiveDate::from_ymd_opt(2024, 3, 9).unwrap());

        assert_eq!(
            serde_json::to_value(&changes).unwrap(),
            json!({ "title": "New title", "incidentDate": "2024-03-09" })
        );
    }

    #[test]
    fn test_apply_merges_changes() {
        let mut report: Report = serde_json::from_value(json!({
            "id": "1",
            "type": "RED_FLAG",
            "status": "PENDING",
            "title": "Pothole",
            "description": "Deep",
            "incidentDate": "2024-01-01"
        }))
        .unwrap();

        report.apply(&ReportChanges::default().with_description("Very deep"));
        assert_eq!(report.title, "Pothole");
        assert_eq!(report.description, "Very deep");

        report.apply(&ReportChanges::status(ReportStatus::Resolved));
        assert_eq!(report.status, ReportStatus::Resolved);
    }

    #[test]
    fn test_status_wire_names_and_labels() {
        assert_eq!(serde_json::to_value(ReportStatus::Draft).unwrap(), json!("draft"));
        assert_eq!(
            serde_json::to_value(ReportStatus::UnderInvestigation).unwrap(),
            json!("UNDER_INVESTIGATION")
        );
        assert_eq!(ReportStatus::UnderInvestigation.label(), "Under Investigation");
        assert_eq!("under-investigation".parse(), Ok(ReportStatus::UnderInvestigation));
        assert!("closed".parse::<ReportStatus>().is_err());
    }

    #[test]
    fn test_status_facet_parsing() {
        assert_eq!("All".parse(), Ok(StatusFacet::All));
        assert_eq!("PENDING".parse(), Ok(StatusFacet::Only(ReportStatus::Pending)));
        assert!(StatusFacet::All.admits(ReportStatus::Rejected));
        assert!(!StatusFacet::Only(ReportStatus::Pending).admits(ReportStatus::Rejected));
    }

    #[test]
    fn test_report_type_parsing() {
        assert_eq!("red-flag".parse(), Ok(ReportType::RedFlag));
        assert_eq!("INTERVENTION".parse(), Ok(ReportType::Intervention));
        assert_eq!(ReportType::default(), ReportType::RedFlag);
    }
}
