//! Mock collaborators for testing.
//!
//! In-memory implementations of the Report Service and geolocation traits
//! for use in unit and integration tests.

pub mod location;
pub mod service;

pub use location::MockLocationProvider;
pub use service::{MockGate, MockReportService, Operation, ServiceCall};
