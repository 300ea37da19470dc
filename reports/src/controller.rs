//! Mounting a report view.
//!
//! A view owns one [`SyncController`]: the [`ReportsReducer`] running in a
//! [`Store`]. Dropping the controller discards the view's report store;
//! answers still in flight for it are dropped with it.

use crate::actions::ReportsAction;
use crate::environment::ReportsEnvironment;
use crate::reducer::ReportsReducer;
use crate::state::ReportsState;
use redflag_runtime::{Store, StoreError};
use std::time::Duration;

/// Sync controller of one mounted view
pub type SyncController = Store<ReportsState, ReportsAction, ReportsEnvironment, ReportsReducer>;

/// Mount a view with an empty report store
#[must_use]
pub fn mount(env: ReportsEnvironment) -> SyncController {
    Store::new(ReportsState::default(), ReportsReducer::new(), env)
}

/// Mount a view and wait for its initial fetch to settle
///
/// A failed fetch still yields a mounted view; its `load_error` is set.
///
/// # Errors
///
/// Returns [`StoreError::Timeout`] if the fetch does not settle within
/// `timeout`.
pub async fn mount_and_fetch(
    env: ReportsEnvironment,
    timeout: Duration,
) -> Result<SyncController, StoreError> {
    let controller = mount(env);
    let mut handle = controller.send(ReportsAction::Fetch).await?;
    handle.wait_with_timeout(timeout).await?;
    Ok(controller)
}
