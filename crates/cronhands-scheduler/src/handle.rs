//! Cancellable handles to live schedules.

use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::debug;

const SCHEDULED: u8 = 0;
const CANCELLED: u8 = 1;
const COMPLETED: u8 = 2;

/// Capability to cancel a recurring execution.
///
/// Decouples owners of a schedule from the runtime that drives it.
pub trait JobHandle: Send + Sync + fmt::Debug {
    /// Prevent future firings.
    ///
    /// Returns `true` only for the call that actually cancelled a live
    /// schedule. Returns `false` if it was already cancelled or completed.
    /// With `may_interrupt_running` the firing in progress is aborted.
    fn cancel(&self, may_interrupt_running: bool) -> bool;

    /// Whether the schedule was cancelled.
    fn is_cancelled(&self) -> bool;

    /// Whether the schedule will never fire again.
    fn is_done(&self) -> bool;
}

struct HandleState {
    label: String,
    state: AtomicU8,
    stop: CancellationToken,
    interrupt: CancellationToken,
    remove_on_cancel: bool,
}

/// Handle returned by [`WorkerPool::schedule`](crate::WorkerPool::schedule).
#[derive(Clone)]
pub struct ScheduledHandle {
    inner: Arc<HandleState>,
}

impl ScheduledHandle {
    pub(crate) fn new(
        label: String,
        stop: CancellationToken,
        interrupt: CancellationToken,
        remove_on_cancel: bool,
    ) -> Self {
        Self {
            inner: Arc::new(HandleState {
                label,
                state: AtomicU8::new(SCHEDULED),
                stop,
                interrupt,
                remove_on_cancel,
            }),
        }
    }

    /// Label given at schedule time.
    pub fn label(&self) -> &str {
        &self.inner.label
    }

    /// Mark an exhausted schedule as completed.
    pub(crate) fn complete(&self) {
        let _ = self.inner.state.compare_exchange(
            SCHEDULED,
            COMPLETED,
            Ordering::SeqCst,
            Ordering::SeqCst,
        );
    }

    /// Whether the driver should stop: cancelled, or the pool shut down.
    pub(crate) fn should_stop(&self) -> bool {
        self.inner.state.load(Ordering::SeqCst) != SCHEDULED || self.inner.stop.is_cancelled()
    }

    pub(crate) async fn stopped(&self) {
        self.inner.stop.cancelled().await
    }

    pub(crate) async fn interrupted(&self) {
        self.inner.interrupt.cancelled().await
    }
}

impl JobHandle for ScheduledHandle {
    fn cancel(&self, may_interrupt_running: bool) -> bool {
        if self
            .inner
            .state
            .compare_exchange(SCHEDULED, CANCELLED, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return false;
        }

        if may_interrupt_running {
            self.inner.interrupt.cancel();
        }
        if self.inner.remove_on_cancel {
            self.inner.stop.cancel();
        }

        debug!("Schedule '{}' cancelled", self.inner.label);
        true
    }

    fn is_cancelled(&self) -> bool {
        self.inner.state.load(Ordering::SeqCst) == CANCELLED
    }

    fn is_done(&self) -> bool {
        self.inner.state.load(Ordering::SeqCst) != SCHEDULED
    }
}

impl fmt::Debug for ScheduledHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScheduledHandle")
            .field("label", &self.inner.label)
            .field("cancelled", &self.is_cancelled())
            .field("done", &self.is_done())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn handle(remove_on_cancel: bool) -> ScheduledHandle {
        ScheduledHandle::new(
            "test".to_string(),
            CancellationToken::new(),
            CancellationToken::new(),
            remove_on_cancel,
        )
    }

    #[test]
    fn test_cancel_once() {
        let h = handle(true);
        assert!(!h.is_done());
        assert!(h.cancel(false));
        assert!(h.is_cancelled());
        assert!(h.is_done());
        assert!(!h.cancel(true));
    }

    #[test]
    fn test_cancel_after_complete() {
        let h = handle(true);
        h.complete();
        assert!(h.is_done());
        assert!(!h.is_cancelled());
        assert!(!h.cancel(true));
    }

    #[test]
    fn test_remove_on_cancel_wakes_driver() {
        let h = handle(true);
        h.cancel(false);
        assert!(h.inner.stop.is_cancelled());
        assert!(!h.inner.interrupt.is_cancelled());
    }

    #[test]
    fn test_lingering_cancel() {
        let h = handle(false);
        h.cancel(true);
        assert!(!h.inner.stop.is_cancelled());
        assert!(h.inner.interrupt.is_cancelled());
        assert!(h.should_stop());
    }

    #[test]
    fn test_clones_share_state() {
        let h = handle(true);
        let other = h.clone();
        assert!(other.cancel(false));
        assert!(h.is_cancelled());
        assert!(!h.cancel(false));
    }
}
