//! # Redflag Reports
//!
//! Lifecycle and client-side synchronization of red-flag and intervention
//! reports.
//!
//! - [`policy`]: which statuses exist, which moves are legal, who may make them
//! - [`store`]: the view's in-memory report collection, keyed by id
//! - [`filter`]: the search-term and status-facet projection
//! - [`reducer`]: the sync controller, reconciling Report Service answers
//!   into the store (confirm, then apply)
//! - [`service`]: the Report Service trait and its HTTP client
//!
//! ## Example
//!
//! ```ignore
//! use redflag_reports::{controller, HttpReportService, IdentityClient, ReportsAction, ReportsEnvironment};
//!
//! let session = IdentityClient::new(&config.api.url).login(&credentials).await?;
//! let service = HttpReportService::new(&config.api.url).with_token(&session.token);
//! let env = ReportsEnvironment::new(Arc::new(service), Arc::new(SystemClock), session);
//!
//! let view = controller::mount_and_fetch(env, Duration::from_secs(30)).await?;
//! view.send(ReportsAction::SetSearchTerm { term: "bribe".into() }).await?;
//! let titles = view.state(|s| s.visible_reports().iter().map(|r| r.title.clone()).collect::<Vec<_>>()).await;
//! ```

pub mod actions;
pub mod config;
pub mod controller;
pub mod environment;
pub mod error;
pub mod filter;
pub mod forms;
pub mod geolocation;
pub mod identity;
pub mod policy;
pub mod reducer;
pub mod service;
pub mod session;
pub mod state;
pub mod store;
pub mod types;
pub mod validation;

#[cfg(any(test, feature = "test-utils"))]
pub mod mocks;

pub use actions::ReportsAction;
pub use config::Config;
pub use controller::{mount, mount_and_fetch, SyncController};
pub use environment::ReportsEnvironment;
pub use error::{PolicyViolation, ServiceError, SyncError, ValidationError};
pub use filter::project;
pub use forms::{EditForm, ReportDraft};
pub use identity::{Credentials, IdentityClient, Registration};
pub use policy::{allowed_transitions, can_mutate, check_transition, is_terminal, AdminTransitionMode};
pub use reducer::ReportsReducer;
pub use service::{HttpReportService, NewReport, ReportService};
pub use session::{Session, ViewScope};
pub use state::{Notification, NotificationLevel, ReportsState};
pub use store::ReportStore;
pub use types::{Location, Report, ReportChanges, ReportId, ReportStatus, ReportType, Role, StatusFacet, UserId};
