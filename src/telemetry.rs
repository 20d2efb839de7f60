use std::fmt;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::ParseError;

/// Dependencies (axum, hyper, tower) stay at this level unless a full
/// directive list is given.
const DEPENDENCY_LEVEL: &str = "warn";

#[derive(Debug)]
pub enum TelemetryError {
    BadLogLevel { level: String, source: ParseError },
    AlreadyInstalled(Box<dyn std::error::Error + Send + Sync>),
}

impl fmt::Display for TelemetryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TelemetryError::BadLogLevel { level, .. } => write!(
                f,
                "--log-level '{level}' is neither a level (error, warn, info, debug, trace) nor a tracing directive list"
            ),
            TelemetryError::AlreadyInstalled(err) => {
                write!(f, "smartmoney logging was already set up: {err}")
            }
        }
    }
}

impl std::error::Error for TelemetryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TelemetryError::BadLogLevel { source, .. } => Some(source),
            TelemetryError::AlreadyInstalled(err) => Some(&**err),
        }
    }
}

/// Installs the global fmt subscriber for the HTTP server. `RUST_LOG` wins
/// over `log_level`.
pub fn init(log_level: &str) -> Result<(), TelemetryError> {
    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => build_filter(log_level)?,
    };

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .try_init()
        .map_err(TelemetryError::AlreadyInstalled)
}

/// A bare level such as `debug` applies to this crate only; anything with a
/// `=` or `,` is taken as a full directive list.
fn directives(log_level: &str) -> String {
    let log_level = log_level.trim();
    if log_level.contains('=') || log_level.contains(',') {
        log_level.to_string()
    } else {
        format!("{DEPENDENCY_LEVEL},smartmoney={log_level}")
    }
}

fn build_filter(log_level: &str) -> Result<EnvFilter, TelemetryError> {
    EnvFilter::try_new(directives(log_level)).map_err(|source| TelemetryError::BadLogLevel {
        level: log_level.to_string(),
        source,
    })
}
