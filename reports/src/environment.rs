//! Dependencies injected into the sync controller.

use crate::geolocation::{LocationProvider, NoGeolocation};
use crate::policy::AdminTransitionMode;
use crate::service::ReportService;
use crate::session::Session;
use redflag_core::environment::Clock;
use std::sync::Arc;
use std::time::Duration;

/// Environment for [`ReportsReducer`](crate::reducer::ReportsReducer)
#[derive(Clone)]
pub struct ReportsEnvironment {
    /// Remote report authority
    pub service: Arc<dyn ReportService>,
    /// Position source for the forms
    pub locator: Arc<dyn LocationProvider>,
    /// Source of "today" for date validation and report dates
    pub clock: Arc<dyn Clock>,
    /// Acting user
    pub session: Session,
    /// How administrator status changes are checked
    pub transitions: AdminTransitionMode,
    /// Dismiss notifications automatically after this long
    pub notification_ttl: Option<Duration>,
}

impl ReportsEnvironment {
    /// Create an environment with strict transitions, no geolocation and
    /// notifications kept until dismissed
    #[must_use]
    pub fn new(service: Arc<dyn ReportService>, clock: Arc<dyn Clock>, session: Session) -> Self {
        Self {
            service,
            locator: Arc::new(NoGeolocation),
            clock,
            session,
            transitions: AdminTransitionMode::Strict,
            notification_ttl: None,
        }
    }

    /// Use `locator` for location requests
    #[must_use]
    pub fn with_locator(mut self, locator: Arc<dyn LocationProvider>) -> Self {
        self.locator = locator;
        self
    }

    /// Check administrator status changes under `mode`
    #[must_use]
    pub fn with_transitions(mut self, mode: AdminTransitionMode) -> Self {
        self.transitions = mode;
        self
    }

    /// Dismiss each notification after `ttl`
    #[must_use]
    pub fn with_notification_ttl(mut self, ttl: Duration) -> Self {
        self.notification_ttl = Some(ttl);
        self
    }
}

impl std::fmt::Debug for ReportsEnvironment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReportsEnvironment")
            .field("session", &self.session)
            .field("transitions", &self.transitions)
            .field("notification_ttl", &self.notification_ttl)
            .finish_non_exhaustive()
    }
}
