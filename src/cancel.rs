//! Cooperative cancellation token.
//!
//! A single token is shared (by cloning the handle, which is cheap — an
//! `Arc<AtomicBool>`) between the caller and the flow controller. The
//! controller polls it at every suspension point named in the design:
//! before/after each source read, before/after each renderer call, and
//! before each sink write. The core never looks at wall-clock time itself;
//! a caller wanting a deadline arms a timer of its own that calls
//! [`CancellationToken::cancel`].

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// A cheap, cloneable, cooperative cancellation flag.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    flag: Arc<AtomicBool>,
}

impl CancellationToken {
    /// Create a fresh, unset token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Trip the token. Idempotent.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    /// Whether the token has been tripped.
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    /// Poll the token, returning `Err(FlowError::Cancelled)` if tripped.
    ///
    /// Called at every suspension point in the flow controller; kept as a
    /// tiny free function here (rather than inlined `is_cancelled` checks
    /// scattered through `flow.rs`) so every call site logs identically.
    pub(crate) fn check(&self) -> Result<(), crate::error::FlowError> {
        if self.is_cancelled() {
            log::debug!("flow: cancellation token tripped, aborting");
            Err(crate::error::FlowError::Cancelled)
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_token_is_not_cancelled() {
        let token = CancellationToken::new();
        assert!(!token.is_cancelled());
        assert!(token.check().is_ok());
    }

    #[test]
    fn cancel_is_observed_through_clones() {
        let token = CancellationToken::new();
        let clone = token.clone();
        clone.cancel();
        assert!(token.is_cancelled());
        assert!(token.check().is_err());
    }

    #[test]
    fn cancel_is_idempotent() {
        let token = CancellationToken::new();
        token.cancel();
        token.cancel();
        assert!(token.is_cancelled());
    }
}
