//! Reentrancy guard
//!
//! One guard per pool. Every mutating entry point holds a `GuardToken` for
//! its whole duration, including the await on the transport; the token's
//! `Drop` releases the guard on every exit path, error paths included.

use std::sync::atomic::{AtomicBool, Ordering};

use crate::error::{LendingError, LendingResult};

#[derive(Debug, Default)]
pub struct ReentrancyGuard {
    entered: AtomicBool,
}

/// Proof that the guard is held; releases it when dropped
#[must_use = "the guard is released as soon as the token is dropped"]
#[derive(Debug)]
pub struct GuardToken<'a> {
    guard: &'a ReentrancyGuard,
}

impl ReentrancyGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire the guard, failing with `Reentrancy` if it is already held
    pub fn enter(&self) -> LendingResult<GuardToken<'_>> {
        self.entered
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map(|_| GuardToken { guard: self })
            .map_err(|_| LendingError::Reentrancy)
    }

    pub fn is_entered(&self) -> bool {
        self.entered.load(Ordering::Acquire)
    }
}

impl Drop for GuardToken<'_> {
    fn drop(&mut self) {
        self.guard.entered.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nested_enter_rejected() {
        let guard = ReentrancyGuard::new();
        let token = guard.enter().unwrap();
        assert!(guard.is_entered());
        assert!(matches!(guard.enter(), Err(LendingError::Reentrancy)));
        drop(token);
        assert!(!guard.is_entered());
    }

    #[test]
    fn test_released_on_error_path() {
        fn failing(guard: &ReentrancyGuard) -> LendingResult<()> {
            let _token = guard.enter()?;
            Err(LendingError::Paused)
        }

        let guard = ReentrancyGuard::new();
        assert!(failing(&guard).is_err());
        assert!(guard.enter().is_ok());
    }
}
