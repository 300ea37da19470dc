//! Session context handed to the sync controller when a view is mounted.

use crate::types::{Role, UserId};

/// Identity of the acting user for the lifetime of one view
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// Opaque bearer token
    pub token: String,
    /// Submitter identifier
    pub user_id: UserId,
    /// Role the identity service granted
    pub role: Role,
}

/// Which reports a view works over
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewScope {
    /// Every report (administrator dashboard)
    AllReports,
    /// One submitter's reports
    OwnReports(UserId),
}

impl Session {
    /// Create a session
    #[must_use]
    pub fn new(token: impl Into<String>, user_id: UserId, role: Role) -> Self {
        Self {
            token: token.into(),
            user_id,
            role,
        }
    }

    /// View scope for this session's role
    #[must_use]
    pub fn scope(&self) -> ViewScope {
        match self.role {
            Role::Administrator => ViewScope::AllReports,
            Role::Submitter => ViewScope::OwnReports(self.user_id.clone()),
        }
    }

    /// Whether the session belongs to an administrator
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == Role::Administrator
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_routes_scope() {
        let admin = Session::new("t", UserId::new("1"), Role::Administrator);
        assert_eq!(admin.scope(), ViewScope::AllReports);
        assert!(admin.is_admin());

        let citizen = Session::new("t", UserId::new("7"), Role::Submitter);
        assert_eq!(citizen.scope(), ViewScope::OwnReports(UserId::new("7")));
    }
}
