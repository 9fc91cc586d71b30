//! Progress, status and error reporting for a run.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Channel through which a run talks to its host.
///
/// Status lines and per-feature problems go to separate methods so a host can
/// show them differently. Progress is a percentage that never decreases
/// during a run.
pub trait Feedback {
    /// A human-readable status line.
    fn push_info(&mut self, message: &str);

    /// A recoverable per-feature or export problem.
    fn report_error(&mut self, message: &str);

    /// Progress in percent, 0 to 100.
    fn set_progress(&mut self, percent: u8);

    /// Whether the host asked the run to stop. Checked between features.
    fn is_canceled(&self) -> bool {
        false
    }
}

/// Feedback that forwards everything to `tracing`.
#[derive(Debug, Clone, Default)]
pub struct LogFeedback {
    cancel: Option<Arc<AtomicBool>>,
    last_progress: u8,
}

impl LogFeedback {
    /// Feedback that is never canceled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Feedback canceled once `flag` is set.
    pub fn with_cancel_flag(flag: Arc<AtomicBool>) -> Self {
        Self {
            cancel: Some(flag),
            last_progress: 0,
        }
    }

    /// Last progress value seen.
    pub fn progress(&self) -> u8 {
        self.last_progress
    }
}

impl Feedback for LogFeedback {
    fn push_info(&mut self, message: &str) {
        info!("{}", message);
    }

    fn report_error(&mut self, message: &str) {
        warn!("{}", message);
    }

    fn set_progress(&mut self, percent: u8) {
        self.last_progress = percent;
        debug!(percent, "progress");
    }

    fn is_canceled(&self) -> bool {
        self.cancel
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::Relaxed))
    }
}
