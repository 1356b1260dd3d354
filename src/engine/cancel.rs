//! Cooperative cancellation for bulk commands.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// A cooperative stop flag shared between a caller and a bulk command.
///
/// Bulk commands (the auto-closure sweep, payroll builds, period
/// recalculation) check the token between per-employee iterations and
/// stop early once it is cancelled. Work committed before the check
/// stays committed; cancellation never rolls anything back.
///
/// Cloning the token shares the underlying flag.
///
/// # Examples
///
/// ```
/// use gaji_engine::engine::CancelToken;
///
/// let token = CancelToken::new();
/// let shared = token.clone();
/// assert!(!shared.is_cancelled());
/// token.cancel();
/// assert!(shared.is_cancelled());
/// ```
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    /// Creates a token in the not-cancelled state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation. Idempotent.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Release);
    }

    /// Whether cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ====
    // CT-001: a fresh token is not cancelled
    // ====
    #[test]
    fn test_fresh_token_not_cancelled() {
        let token = CancelToken::new();
        assert!(!token.is_cancelled());
    }

    // ====
    // CT-002: cancellation is visible through every clone
    // ====
    #[test]
    fn test_cancel_shared_across_clones() {
        let token = CancelToken::new();
        let clone = token.clone();
        clone.cancel();
        assert!(token.is_cancelled());
        assert!(clone.is_cancelled());
    }

    // ====
    // CT-003: cancelling twice is harmless
    // ====
    #[test]
    fn test_cancel_idempotent() {
        let token = CancelToken::new();
        token.cancel();
        token.cancel();
        assert!(token.is_cancelled());
    }
}
