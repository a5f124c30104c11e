//! Log verbosity profiles and subscriber setup.
//!
//! The library never reads the environment for verbosity; the binary maps
//! `PROMPTROUTE_ENV` / `PROMPTROUTE_DEBUG` to a `LogProfile` and passes it in.

use std::fmt::{Debug, Display};
use tracing::Level;

/// How much diagnostic detail to emit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogProfile {
    /// Info logs and full error detail
    Development,
    /// Warnings and errors with detail
    #[default]
    Standard,
    /// Errors only, without detail
    Production,
}

impl LogProfile {
    /// Map an environment name (`PROMPTROUTE_ENV`) and debug flag to a profile.
    ///
    /// `production` wins over the debug flag so error detail stays
    /// suppressed in production deployments.
    pub fn resolve(env: Option<&str>, debug: bool) -> Self {
        let env = env.map(|e| e.trim().to_lowercase());
        if env.as_deref() == Some("production") {
            return LogProfile::Production;
        }
        if env.as_deref() == Some("development") || debug {
            return LogProfile::Development;
        }
        LogProfile::Standard
    }

    pub fn max_level(&self) -> Level {
        match self {
            LogProfile::Development => Level::DEBUG,
            LogProfile::Standard => Level::WARN,
            LogProfile::Production => Level::ERROR,
        }
    }

    /// Whether error messages may include the underlying error
    pub fn shows_detail(&self) -> bool {
        !matches!(self, LogProfile::Production)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LogProfile::Development => "development",
            LogProfile::Standard => "standard",
            LogProfile::Production => "production",
        }
    }
}

/// Install the global stderr subscriber. Safe to call more than once.
pub fn init(profile: LogProfile, verbose: bool) {
    let level = if verbose {
        Level::DEBUG
    } else {
        profile.max_level()
    };

    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Log a failure according to the profile
pub fn report_failure<E: Display + Debug>(profile: LogProfile, what: &str, err: &E) {
    if profile.shows_detail() {
        tracing::error!("{}: {}", what, err);
        tracing::debug!("{} detail: {:?}", what, err);
    } else {
        tracing::error!("{}", what);
    }
}
