use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use crate::store::StoreError;

/// Execution context handed to every activity invocation.
///
/// Transforms never inspect it themselves. It is passed through to the
/// store so the I/O layer can honour cancellation and deadlines.
#[derive(Debug, Clone, Default)]
pub struct ActivityContext {
    label: String,
    deadline: Option<Instant>,
    cancelled: Arc<AtomicBool>,
}

impl ActivityContext {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            ..Default::default()
        }
    }

    /// Fail store calls once `timeout` has elapsed from now
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.deadline = Some(Instant::now() + timeout);
        self
    }

    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Request cancellation. Clones of this context observe it too.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Called by store backends before doing I/O
    pub fn ensure_active(&self) -> Result<(), StoreError> {
        if self.is_cancelled() {
            return Err(StoreError::Cancelled);
        }
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Err(StoreError::DeadlineExceeded),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_context_is_active() {
        let ctx = ActivityContext::new("transform.Merge");
        assert_eq!(ctx.label(), "transform.Merge");
        assert!(ctx.ensure_active().is_ok());
    }

    #[test]
    fn test_cancel_is_shared_between_clones() {
        let ctx = ActivityContext::new("a");
        let clone = ctx.clone();
        ctx.cancel();
        assert!(clone.is_cancelled());
        assert!(matches!(clone.ensure_active(), Err(StoreError::Cancelled)));
    }

    #[test]
    fn test_expired_deadline() {
        let ctx = ActivityContext::new("a").with_deadline(Instant::now());
        assert!(matches!(ctx.ensure_active(), Err(StoreError::DeadlineExceeded)));

        let ctx = ActivityContext::new("b").with_timeout(Duration::from_secs(3600));
        assert!(ctx.ensure_active().is_ok());
    }
}
