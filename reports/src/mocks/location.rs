//! Mock geolocation provider.

use crate::geolocation::{LocationError, LocationFuture, LocationProvider};
use crate::types::Location;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Mock location provider.
///
/// Answers every lookup with the same result and counts lookups.
#[derive(Debug, Clone)]
pub struct MockLocationProvider {
    result: Result<Location, LocationError>,
    lookups: Arc<AtomicUsize>,
}

impl MockLocationProvider {
    /// Provider that always finds `location`
    #[must_use]
    pub fn at(location: Location) -> Self {
        Self {
            result: Ok(location),
            lookups: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Provider that always fails with `error`
    #[must_use]
    pub fn failing(error: LocationError) -> Self {
        Self {
            result: Err(error),
            lookups: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Number of lookups so far
    #[must_use]
    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

impl LocationProvider for MockLocationProvider {
    fn current_location(&self) -> LocationFuture {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        let result = self.result.clone();
        Box::pin(async move { result })
    }
}
