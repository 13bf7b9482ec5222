//! Logging support

use log::{debug, error, info, log_enabled, warn, Level};

/// Enum that describes level associated with a log message
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum PeLogLevels {
    /// Common error logging level
    PeError,
    /// Common info logging level
    PeInfo,
    /// Common warn logging level
    PeWarn,
    /// Common debug logging level
    PeDebug,
}

impl From<PeLogLevels> for Level {
    fn from(level: PeLogLevels) -> Level {
        match level {
            PeLogLevels::PeError => Level::Error,
            PeLogLevels::PeWarn => Level::Warn,
            PeLogLevels::PeInfo => Level::Info,
            PeLogLevels::PeDebug => Level::Debug,
        }
    }
}

/// `log_message` forwards a message to the `log` facade at the indicated level. The backend (i.e.,
/// log4rs) is selected by the application.
pub fn log_message(level: &PeLogLevels, message: &str) {
    match level {
        PeLogLevels::PeError => error!("{}", message),
        PeLogLevels::PeWarn => warn!("{}", message),
        PeLogLevels::PeInfo => info!("{}", message),
        PeLogLevels::PeDebug => debug!("{}", message),
    }
}

/// `is_log_enabled` returns true if a message at the indicated level would be emitted. It is used
/// to avoid formatting diagnostic dumps that nobody will read.
pub fn is_log_enabled(level: &PeLogLevels) -> bool {
    match level {
        PeLogLevels::PeError => log_enabled!(Level::Error),
        PeLogLevels::PeWarn => log_enabled!(Level::Warn),
        PeLogLevels::PeInfo => log_enabled!(Level::Info),
        PeLogLevels::PeDebug => log_enabled!(Level::Debug),
    }
}

#[test]
fn log_level_mapping_test() {
    assert_eq!(Level::Error, Level::from(PeLogLevels::PeError));
    assert_eq!(Level::Warn, Level::from(PeLogLevels::PeWarn));
    assert_eq!(Level::Info, Level::from(PeLogLevels::PeInfo));
    assert_eq!(Level::Debug, Level::from(PeLogLevels::PeDebug));
    // no logger is installed in unit tests
    assert!(!is_log_enabled(&PeLogLevels::PeDebug));
    log_message(&PeLogLevels::PeDebug, "not emitted");
}
