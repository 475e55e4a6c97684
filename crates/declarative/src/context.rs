//! Apply context and callback traits
//!
//! These traits let the executor report progress and ask for confirmation
//! without depending on a particular terminal UI.

use crate::diff::ResourceDiff;
use crate::types::ApplyResult;
use anyhow::Result;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

/// Progress callback for execution operations
///
/// Implement this trait to receive progress updates during execution.
pub trait ProgressCallback: Send {
    /// Called when refresh reads start for `count` managed instances
    fn on_refresh_start(&mut self, count: usize);

    /// Called with the planned changes, before confirmation
    fn on_plan(&mut self, _diffs: &[ResourceDiff]) {}

    /// Called when starting to apply a batch of instances
    fn on_batch_start(&mut self, count: usize);

    /// Called when starting to apply a single instance
    fn on_resource_start(&mut self, address: &str, description: &str);

    /// Called when an instance completes
    fn on_resource_complete(&mut self, address: &str, result: &ApplyResult);

    /// Called when a batch completes
    fn on_batch_complete(&mut self);
}

/// Confirmation callback for user interaction
pub trait ConfirmCallback: Send {
    /// Ask the user to confirm an action
    ///
    /// # Returns
    /// `true` if the user confirmed, `false` otherwise
    fn confirm(&mut self, prompt: &str) -> Result<bool>;
}

/// No-op progress callback
pub struct NoProgress;

impl ProgressCallback for NoProgress {
    fn on_refresh_start(&mut self, _count: usize) {}
    fn on_batch_start(&mut self, _count: usize) {}
    fn on_resource_start(&mut self, _address: &str, _description: &str) {}
    fn on_resource_complete(&mut self, _address: &str, _result: &ApplyResult) {}
    fn on_batch_complete(&mut self) {}
}

/// Auto-confirm callback (always returns true)
pub struct AutoConfirm;

impl ConfirmCallback for AutoConfirm {
    fn confirm(&mut self, _prompt: &str) -> Result<bool> {
        Ok(true)
    }
}

/// Auto-decline callback (always returns false)
pub struct AutoDecline;

impl ConfirmCallback for AutoDecline {
    fn confirm(&mut self, _prompt: &str) -> Result<bool> {
        Ok(false)
    }
}

/// Context passed to lifecycle operations
///
/// Carries the caller's cancellation flag and deadline. Clones share the
/// same flag.
#[derive(Debug, Clone, Default)]
pub struct ApplyContext {
    /// Whether to output verbose information
    pub verbose: bool,
    cancel: Arc<AtomicBool>,
    deadline: Option<Instant>,
}

impl ApplyContext {
    pub fn new(verbose: bool) -> Self {
        Self {
            verbose,
            ..Self::default()
        }
    }

    /// Share an existing cancellation flag (e.g. one set by a signal handler)
    pub fn with_cancel(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = flag;
        self
    }

    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    pub fn cancel(&self) {
        self.cancel.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.load(Ordering::SeqCst)
    }

    /// The shared cancellation flag
    pub fn cancel_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancel)
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Whether work should stop before starting the next step
    pub fn is_done(&self) -> bool {
        self.is_cancelled() || self.deadline.is_some_and(|d| Instant::now() >= d)
    }
}
