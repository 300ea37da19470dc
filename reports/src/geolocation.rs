//! Geolocation collaborator.
//!
//! A failed lookup is a recoverable gap in the form, never a fatal error.

use crate::types::Location;
use std::future::Future;
use std::pin::Pin;
use thiserror::Error;

/// Why no position could be obtained
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LocationError {
    /// Device or platform offers no positioning
    #[error("Geolocation is not supported")]
    Unsupported,

    /// Positioning exists but failed this time
    #[error("Failed to get location: {0}")]
    Unavailable(String),
}

/// Boxed future returned by [`LocationProvider::current_location`]
pub type LocationFuture = Pin<Box<dyn Future<Output = Result<Location, LocationError>> + Send>>;

/// Source of the device's current position
pub trait LocationProvider: Send + Sync {
    /// Look up the current position
    ///
    /// # Errors
    ///
    /// Returns [`LocationError`] when no position can be obtained
    fn current_location(&self) -> LocationFuture;
}

/// Always reports the same position (configured coordinates)
#[derive(Debug, Clone, Copy)]
pub struct FixedLocation(pub Location);

impl LocationProvider for FixedLocation {
    fn current_location(&self) -> LocationFuture {
        let location = self.0;
        Box::pin(async move { Ok(location) })
    }
}

/// No positioning available
#[derive(Debug, Clone, Copy, Default)]
pub struct NoGeolocation;

impl LocationProvider for NoGeolocation {
    fn current_location(&self) -> LocationFuture {
        Box::pin(async { Err(LocationError::Unsupported) })
    }
}
