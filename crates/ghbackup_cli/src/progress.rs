//! Progress reporting for backup runs.
//!
//! This module provides two modes of progress reporting:
//! - Verbose mode: every event is logged through tracing
//! - Quiet mode: a dot on stderr every heartbeat, with only warnings logged
//!
//! Events reach the reporter over the library's progress channel; the
//! heartbeat is driven by a timer in `main`.

mod heartbeat;
mod logging;

pub use heartbeat::HeartbeatReporter;
pub use logging::LoggingReporter;

use ghbackup::sync::SyncProgress;

/// Progress reporter that handles both verbose and quiet modes.
pub enum ProgressReporter {
    /// Structured logging for every event.
    Logging(LoggingReporter),
    /// Heartbeat dots; events still go through the logger, whose filter
    /// lets only warnings through.
    Heartbeat(LoggingReporter, HeartbeatReporter),
}

impl ProgressReporter {
    pub fn new(verbose: bool) -> Self {
        if verbose {
            Self::Logging(LoggingReporter::new())
        } else {
            Self::Heartbeat(LoggingReporter::new(), HeartbeatReporter::new())
        }
    }

    /// Handle a progress event.
    pub fn handle(&self, event: SyncProgress) {
        match self {
            Self::Logging(r) | Self::Heartbeat(r, _) => r.handle(event),
        }
    }

    /// Called on every heartbeat interval.
    pub fn tick(&self) {
        if let Self::Heartbeat(_, h) = self {
            h.tick();
        }
    }

    /// Terminate any heartbeat output before the final summary.
    pub fn finish(&self) {
        if let Self::Heartbeat(_, h) = self {
            h.finish();
        }
    }
}
