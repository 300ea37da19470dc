//! Configuration for the report client.
//!
//! Loads configuration from environment variables with sensible defaults.
//! The log level is not part of it: the binary reads `REDFLAG_LOG_LEVEL`
//! itself so logging is up before any setting is parsed.

use crate::identity::Credentials;
use crate::policy::AdminTransitionMode;
use crate::types::Location;
use std::env;
use std::fmt::Display;
use std::str::FromStr;
use std::time::Duration;

/// Client configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Report Service and identity endpoints
    pub api: ApiConfig,
    /// Lifecycle policy options
    pub policy: PolicyConfig,
    /// Command-line client options
    pub cli: CliConfig,
}

/// Remote endpoints
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Base URL shared by the Report Service and identity endpoints
    pub url: String,
    /// Request timeout in seconds (unset keeps the transport default)
    pub request_timeout: Option<u64>,
}

/// Lifecycle policy options
#[derive(Debug, Clone, Copy)]
pub struct PolicyConfig {
    /// How administrator status changes are checked
    pub admin_transitions: AdminTransitionMode,
}

/// Command-line client options
#[derive(Debug, Clone)]
pub struct CliConfig {
    /// Upper bound in seconds on waiting for a command's remote call
    pub effect_timeout: u64,
    /// Login used by commands that need a session
    pub credentials: Option<Credentials>,
    /// Position reported when a location is requested
    pub location: Option<Location>,
}

impl ApiConfig {
    /// Request timeout, if configured
    #[must_use]
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout.map(Duration::from_secs)
    }
}

impl CliConfig {
    /// Wait bound for a command's remote call
    #[must_use]
    pub const fn effect_timeout(&self) -> Duration {
        Duration::from_secs(self.effect_timeout)
    }
}

/// Parse a raw setting, warning when it is present but malformed
fn parse_setting<T>(name: &str, raw: Option<String>) -> Option<T>
where
    T: FromStr,
    T::Err: Display,
{
    let raw = raw?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(error) => {
            tracing::warn!(variable = name, value = %raw, %error, "Ignoring unparseable setting, using the default");
            None
        },
    }
}

fn parsed<T>(name: &str) -> Option<T>
where
    T: FromStr,
    T::Err: Display,
{
    parse_setting(name, env::var(name).ok())
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Unparseable values fall back to their defaults with a warning.
    #[must_use]
    pub fn from_env() -> Self {
        let credentials = match (env::var("REDFLAG_EMAIL"), env::var("REDFLAG_PASSWORD")) {
            (Ok(email), Ok(password)) => Some(Credentials { email, password }),
            _ => None,
        };
        let location = match (
            parsed::<f64>("REDFLAG_LATITUDE"),
            parsed::<f64>("REDFLAG_LONGITUDE"),
        ) {
            (Some(latitude), Some(longitude)) => Some(Location::new(latitude, longitude)),
            _ => None,
        };

        Self {
            api: ApiConfig {
                url: env::var("REDFLAG_API_URL")
                    .unwrap_or_else(|_| "http://localhost:3000".to_string()),
                request_timeout: parsed("REDFLAG_REQUEST_TIMEOUT_SECS"),
            },
            policy: PolicyConfig {
                admin_transitions: parsed("REDFLAG_ADMIN_TRANSITIONS").unwrap_or_default(),
            },
            cli: CliConfig {
                effect_timeout: parsed("REDFLAG_EFFECT_TIMEOUT_SECS").unwrap_or(30),
                credentials,
                location,
            },
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api: ApiConfig {
                url: "http://localhost:3000".to_string(),
                request_timeout: None,
            },
            policy: PolicyConfig {
                admin_transitions: AdminTransitionMode::Strict,
            },
            cli: CliConfig {
                effect_timeout: 30,
                credentials: None,
                location: None,
            },
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)] // Test code can use unwrap
mod tests {
    use super::*;
    use std::io;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn logged<T>(f: impl FnOnce() -> T) -> (T, String) {
        let captured = Captured::default();
        let sink = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || sink.clone())
            .with_ansi(false)
            .finish();
        let value = tracing::subscriber::with_default(subscriber, f);
        let output = String::from_utf8(captured.0.lock().unwrap().clone()).unwrap();
        (value, output)
    }

    #[test]
    fn test_malformed_setting_warns_and_falls_back() {
        let (mode, output) = logged(|| {
            parse_setting::<AdminTransitionMode>("REDFLAG_ADMIN_TRANSITIONS", Some("lenient".into()))
        });
        assert_eq!(mode, None);
        assert!(output.contains("WARN"));
        assert!(output.contains("REDFLAG_ADMIN_TRANSITIONS"));
        assert!(output.contains("lenient"));
    }

    #[test]
    fn test_valid_or_absent_setting_is_silent() {
        let (mode, output) = logged(|| {
            parse_setting::<AdminTransitionMode>("REDFLAG_ADMIN_TRANSITIONS", Some(" permissive ".into()))
        });
        assert_eq!(mode, Some(AdminTransitionMode::Permissive));
        assert!(output.is_empty());

        let (timeout, output) = logged(|| parse_setting::<u64>("REDFLAG_EFFECT_TIMEOUT_SECS", None));
        assert_eq!(timeout, None);
        assert!(output.is_empty());
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.api.url, "http://localhost:3000");
        assert_eq!(config.api.request_timeout(), None);
        assert_eq!(config.policy.admin_transitions, AdminTransitionMode::Strict);
        assert_eq!(config.cli.effect_timeout(), Duration::from_secs(30));
    }
}
