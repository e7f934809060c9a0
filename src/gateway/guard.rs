//! In-flight guards for user-initiated ledger operations
//!
//! The UI in front of this crate disables a button while its operation
//! runs, but a disabled button is a convention, not a lock. Each logical
//! operation gets an atomic flag so a second submission fails fast instead
//! of producing a duplicate transaction.

use std::sync::atomic::{AtomicBool, Ordering};

use crate::error::{Error, Result};

#[derive(Debug, Default)]
pub struct OperationGuard {
    in_flight: AtomicBool,
}

impl OperationGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim the guard. Fails while a previous operation of this kind is
    /// still running.
    pub fn acquire(&self, operation: &'static str) -> Result<OperationPermit<'_>> {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(Error::OperationInFlight { operation });
        }
        Ok(OperationPermit { guard: self })
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }
}

/// Releases the guard when dropped, on success and on every failure path
pub struct OperationPermit<'a> {
    guard: &'a OperationGuard,
}

impl Drop for OperationPermit<'_> {
    fn drop(&mut self) {
        self.guard.in_flight.store(false, Ordering::Release);
    }
}
